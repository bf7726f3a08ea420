//! End-to-end seed scenarios from `SPEC_FULL.md` §8, driven through the
//! tokenizer/parser and the table driver directly (no terminal emulation
//! needed, since the REPL shell itself is an external collaborator).

use btreedb::errors::Error;
use btreedb::sql::{self, Input, MetaCommand, Statement};
use btreedb::storage::row::Row;
use btreedb::storage::table::Table;
use tempfile::NamedTempFile;

fn open_table() -> (Table, NamedTempFile) {
    let tmp = NamedTempFile::new().unwrap();
    let table = Table::open(tmp.path()).unwrap();
    (table, tmp)
}

/// Applies one line of input to `table` the same way the REPL would,
/// returning the rows printed by a `select` (empty for every other statement).
fn apply(table: &mut Table, line: &str) -> Result<Vec<Row>, Error> {
    match sql::parse(line)? {
        Input::Statement(Statement::Insert { id, username, email }) => {
            table.insert(&Row::new(id, &username, &email)?)?;
            Ok(Vec::new())
        }
        Input::Statement(Statement::Update { id, username, email }) => {
            table.update(id, &username, &email)?;
            Ok(Vec::new())
        }
        Input::Statement(Statement::Delete { id }) => {
            table.delete(id)?;
            Ok(Vec::new())
        }
        Input::Statement(Statement::Select) => table.select_all(),
        Input::Meta(_) => panic!("meta-commands are not routed through apply()"),
    }
}

#[test]
fn scenario_1_ordered_insert_and_select() {
    let (mut table, _tmp) = open_table();
    apply(&mut table, "insert 1 a a@x").unwrap();
    apply(&mut table, "insert 2 b b@x").unwrap();
    let rows = apply(&mut table, "select").unwrap();
    let rendered: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
    assert_eq!(rendered, vec!["(1, a, a@x)", "(2, b, b@x)"]);
}

#[test]
fn scenario_2_duplicate_insert_is_rejected_and_first_row_survives() {
    let (mut table, _tmp) = open_table();
    apply(&mut table, "insert 1 a a@x").unwrap();
    let err = apply(&mut table, "insert 1 z z@x").unwrap_err();
    assert!(matches!(err, Error::DuplicateKey(1)));
    let rows = apply(&mut table, "select").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username(), "a");
}

#[test]
fn scenario_3_ascending_inserts_split_one_leaf() {
    let (mut table, _tmp) = open_table();
    for id in 1..=14u32 {
        apply(&mut table, &format!("insert {} u e@x", id)).unwrap();
    }
    let rows = apply(&mut table, "select").unwrap();
    assert_eq!(rows.len(), 14);
    assert_eq!(
        rows.iter().map(|r| r.id).collect::<Vec<_>>(),
        (1..=14).collect::<Vec<_>>()
    );
}

#[test]
fn scenario_4_out_of_order_inserts_force_internal_split_and_stay_sorted() {
    let (mut table, _tmp) = open_table();
    let ids = [18u32, 7, 10, 29, 23, 4, 14, 30, 15, 26, 22, 19, 2, 1, 21, 11, 6, 20, 5, 8];
    for id in ids {
        apply(&mut table, &format!("insert {} u e@x", id)).unwrap();
    }
    let rows = apply(&mut table, "select").unwrap();
    let mut expected = ids.to_vec();
    expected.sort_unstable();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), expected);

    let dump = table.dump_tree().unwrap();
    match dump {
        btreedb::storage::table::TreeDump::Internal { num_keys, .. } => {
            assert!(num_keys <= 3, "root should have <= MAX_INTERNAL_CELLS keys, got {}", num_keys);
        }
        btreedb::storage::table::TreeDump::Leaf { .. } => panic!("expected an internal root after splitting"),
    }
}

#[test]
fn scenario_5_delete_then_select_is_empty() {
    let (mut table, _tmp) = open_table();
    apply(&mut table, "insert 5 a a@x").unwrap();
    apply(&mut table, "delete 5").unwrap();
    assert!(apply(&mut table, "select").unwrap().is_empty());
}

#[test]
fn scenario_6_reopen_after_close_preserves_fifty_rows() {
    let tmp = NamedTempFile::new().unwrap();
    {
        let mut table = Table::open(tmp.path()).unwrap();
        for id in 1..=50u32 {
            apply(&mut table, &format!("insert {} u e@x", id)).unwrap();
        }
        table.close().unwrap();
    }
    {
        let mut table = Table::open(tmp.path()).unwrap();
        let rows = apply(&mut table, "select").unwrap();
        assert_eq!(rows.len(), 50);
        assert_eq!(
            rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            (1..=50).collect::<Vec<_>>()
        );
    }
}

#[test]
fn update_past_filled_cells_is_not_found_not_silent_overwrite() {
    let (mut table, _tmp) = open_table();
    let err = apply(&mut table, "update 999 nobody nobody@x").unwrap_err();
    assert!(matches!(err, Error::NotFound(999)));
}

#[test]
fn meta_commands_parse_but_are_routed_separately() {
    assert_eq!(sql::parse(".exit").unwrap(), Input::Meta(MetaCommand::Exit));
    assert_eq!(sql::parse(".btree").unwrap(), Input::Meta(MetaCommand::Btree));
    assert_eq!(sql::parse(".constant").unwrap(), Input::Meta(MetaCommand::Constants));
}
