//! Recognizes the five statement/meta-command forms from a token stream.
//!
//! Grammar (whitespace-separated, case-sensitive keywords):
//!   insert <id> <username> <email>
//!   update <id> <username> <email>
//!   delete <id>
//!   select
//!   .exit | .btree | .constant

use std::collections::VecDeque;

use crate::errors::Error;
use crate::sql::statement::{Input, MetaCommand, Statement};
use crate::sql::tokenizer::tokenize;
use crate::storage::row::{EMAIL_MAX_LEN, USERNAME_MAX_LEN};

/// Parses one line of REPL input into a meta-command or a statement.
/// Negative/non-numeric ids and oversize username/email fields are rejected
/// here, before the table driver ever sees them (`SPEC_FULL.md` §4.8, §7).
pub fn parse(line: &str) -> Result<Input, Error> {
    if let Some(meta) = line.strip_prefix('.') {
        return parse_meta(meta);
    }

    let mut tokens = tokenize(line);
    let keyword = tokens
        .pop_front()
        .ok_or_else(|| err!(Syntax, "empty statement"))?;

    match keyword.as_str() {
        "insert" => parse_insert(tokens),
        "update" => parse_update(tokens),
        "delete" => parse_delete(tokens),
        "select" => {
            if !tokens.is_empty() {
                return Err(err!(Syntax, "select takes no arguments"));
            }
            Ok(Input::Statement(Statement::Select))
        }
        other => Err(err!(Syntax, "unrecognized keyword '{}'", other)),
    }
}

fn parse_meta(name: &str) -> Result<Input, Error> {
    match name {
        "exit" => Ok(Input::Meta(MetaCommand::Exit)),
        "btree" => Ok(Input::Meta(MetaCommand::Btree)),
        "constant" => Ok(Input::Meta(MetaCommand::Constants)),
        other => Err(err!(Syntax, "unrecognized meta-command '.{}'", other)),
    }
}

fn parse_insert(mut tokens: VecDeque<String>) -> Result<Input, Error> {
    let id = parse_id(tokens.pop_front())?;
    let username = parse_username(tokens.pop_front())?;
    let email = parse_email(tokens.pop_front())?;
    if !tokens.is_empty() {
        return Err(err!(Syntax, "insert takes exactly 3 arguments"));
    }
    Ok(Input::Statement(Statement::Insert { id, username, email }))
}

fn parse_update(mut tokens: VecDeque<String>) -> Result<Input, Error> {
    let id = parse_id(tokens.pop_front())?;
    let username = parse_username(tokens.pop_front())?;
    let email = parse_email(tokens.pop_front())?;
    if !tokens.is_empty() {
        return Err(err!(Syntax, "update takes exactly 3 arguments"));
    }
    Ok(Input::Statement(Statement::Update { id, username, email }))
}

fn parse_delete(mut tokens: VecDeque<String>) -> Result<Input, Error> {
    let id = parse_id(tokens.pop_front())?;
    if !tokens.is_empty() {
        return Err(err!(Syntax, "delete takes exactly 1 argument"));
    }
    Ok(Input::Statement(Statement::Delete { id }))
}

fn parse_id(token: Option<String>) -> Result<u32, Error> {
    let token = token.ok_or_else(|| err!(Syntax, "missing id"))?;
    let value: i64 = token
        .parse()
        .map_err(|_| err!(Syntax, "id '{}' is not an integer", token))?;
    if value < 0 {
        return Err(err!(Validation, "id must be non-negative, got {}", value));
    }
    u32::try_from(value).map_err(|_| err!(Validation, "id {} exceeds u32 range", value))
}

fn parse_username(token: Option<String>) -> Result<String, Error> {
    let token = token.ok_or_else(|| err!(Syntax, "missing username"))?;
    if token.len() > USERNAME_MAX_LEN {
        return Err(err!(
            Validation,
            "username '{}' exceeds {} bytes",
            token,
            USERNAME_MAX_LEN
        ));
    }
    Ok(token)
}

fn parse_email(token: Option<String>) -> Result<String, Error> {
    let token = token.ok_or_else(|| err!(Syntax, "missing email"))?;
    if token.len() > EMAIL_MAX_LEN {
        return Err(err!(
            Validation,
            "email '{}' exceeds {} bytes",
            token,
            EMAIL_MAX_LEN
        ));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_insert() {
        let input = parse("insert 1 alice alice@example.com").unwrap();
        assert_eq!(
            input,
            Input::Statement(Statement::Insert {
                id: 1,
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            })
        );
    }

    #[test]
    fn parses_select_with_no_arguments() {
        assert_eq!(parse("select").unwrap(), Input::Statement(Statement::Select));
    }

    #[test]
    fn parses_delete() {
        assert_eq!(
            parse("delete 5").unwrap(),
            Input::Statement(Statement::Delete { id: 5 })
        );
    }

    #[test]
    fn parses_meta_commands() {
        assert_eq!(parse(".exit").unwrap(), Input::Meta(MetaCommand::Exit));
        assert_eq!(parse(".btree").unwrap(), Input::Meta(MetaCommand::Btree));
        assert_eq!(parse(".constant").unwrap(), Input::Meta(MetaCommand::Constants));
    }

    #[test]
    fn rejects_negative_id() {
        let err = parse("insert -1 alice alice@x.com").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_oversize_username() {
        let long = "x".repeat(USERNAME_MAX_LEN + 1);
        let err = parse(&format!("insert 1 {} alice@x.com", long)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_unrecognized_keyword() {
        assert!(matches!(parse("frobnicate 1"), Err(Error::Syntax(_))));
    }

    #[test]
    fn rejects_unrecognized_meta_command() {
        assert!(matches!(parse(".bogus"), Err(Error::Syntax(_))));
    }
}
