//! Typed output of the parser: either a meta-command or a table statement.

/// A `.`-prefixed command, handled by the REPL directly rather than routed
/// through the table driver.
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Btree,
    Constants,
}

/// One of the four statements the tokenizer/parser recognizes.
#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert {
        id: u32,
        username: String,
        email: String,
    },
    Update {
        id: u32,
        username: String,
        email: String,
    },
    Delete {
        id: u32,
    },
    Select,
}

/// What a parsed line resolves to.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Meta(MetaCommand),
    Statement(Statement),
}
