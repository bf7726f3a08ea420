//! The external command collaborator (`SPEC_FULL.md` §4.8): splits a line of
//! REPL input into tokens and recognizes the five statement/meta-command
//! forms. Kept thin and out of the core's correctness surface on purpose.

pub mod parser;
pub mod statement;
pub mod tokenizer;

pub use parser::parse;
pub use statement::{Input, MetaCommand, Statement};
