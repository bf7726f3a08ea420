//! Single-file, single-table B+ tree key-value store.
//!
//! `storage` is the core engine (pager, node layout, leaf/internal
//! operations, tree navigation, cursor, row codec, table driver). `sql` and
//! `repl` are the external collaborators that turn typed lines of input
//! into calls against the table driver; see `SPEC_FULL.md` §1 for the
//! boundary between the two.
#![allow(dead_code)]

#[macro_use]
pub mod errors;
pub mod repl;
pub mod sql;
pub mod storage;
