//! Splits a line of input into whitespace-separated tokens.
//!
//! Unlike a general SQL tokenizer, no quoting or parenthesis handling is
//! needed: usernames and emails are themselves bare tokens in this grammar
//! (see `SPEC_FULL.md` §4.8), so a line is exactly as many tokens as it has
//! whitespace-separated words.

use std::collections::VecDeque;

pub fn tokenize(line: &str) -> VecDeque<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_runs_of_whitespace() {
        let tokens = tokenize("insert   1  alice   alice@example.com");
        assert_eq!(
            tokens,
            VecDeque::from(vec![
                "insert".to_string(),
                "1".to_string(),
                "alice".to_string(),
                "alice@example.com".to_string(),
            ])
        );
    }

    #[test]
    fn empty_line_yields_no_tokens() {
        assert!(tokenize("   ").is_empty());
    }
}
