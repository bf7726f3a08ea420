//! Table driver: the single entry point the REPL talks to. Owns the pager
//! and exposes insert/update/delete/select plus read-only tree introspection
//! for the `.btree` and `.constant` meta-commands.

use std::path::Path;

use tracing::info;

use crate::errors::Error;
use crate::storage::cursor::Cursor;
use crate::storage::leaf;
use crate::storage::node::{
    NodeType, MAX_INTERNAL_CELLS, MAX_LEAF_CELLS, PAGE_SIZE,
};
use crate::storage::pager::Pager;
use crate::storage::row::{Row, ROW_SIZE};
use crate::storage::tree;

pub struct Table {
    pager: Pager,
}

/// One indentation level of the `.btree` debug dump.
pub enum TreeDump {
    Leaf { num_cells: usize, keys: Vec<u32> },
    Internal { num_keys: usize, children: Vec<TreeDump> },
}

impl Table {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let mut pager = Pager::open(path)?;
        if pager.num_pages() == 0 {
            pager.allocate_new_page()?;
            leaf::initialize_root(&mut pager)?;
            info!(path = %path.display(), "initialized fresh table");
        }
        Ok(Table { pager })
    }

    pub fn close(&mut self) -> Result<(), Error> {
        self.pager.close()
    }

    /// Inserts a new row, rejecting a duplicate `id`.
    pub fn insert(&mut self, row: &Row) -> Result<(), Error> {
        let cursor = Cursor::find(&mut self.pager, row.id)?;
        if !cursor.end_of_table {
            let existing_key = self.pager.read(cursor.page_num, |n| n.leaf_key(cursor.cell_num))??;
            if existing_key == row.id {
                return Err(err!(DuplicateKey, "{}", row.id));
            }
        }
        leaf::insert(&mut self.pager, cursor.page_num, cursor.cell_num, row.id, row)
    }

    /// Overwrites the string fields of the row with key `id`. The key is not
    /// changed. Not-found if `id` has no existing cell.
    pub fn update(&mut self, id: u32, username: &str, email: &str) -> Result<(), Error> {
        let cursor = Cursor::find(&mut self.pager, id)?;
        if cursor.end_of_table {
            return Err(err!(NotFound, "{}", id));
        }
        let existing_key = self.pager.read(cursor.page_num, |n| n.leaf_key(cursor.cell_num))??;
        if existing_key != id {
            return Err(err!(NotFound, "{}", id));
        }
        let new_row = Row::new(id, username, email)?;
        self.pager
            .write(cursor.page_num, |n| n.set_leaf_cell(cursor.cell_num, id, &new_row))?;
        Ok(())
    }

    /// Removes the row with key `id`. Does not rebalance the tree or free pages.
    pub fn delete(&mut self, id: u32) -> Result<(), Error> {
        let cursor = Cursor::find(&mut self.pager, id)?;
        let num_cells = self.pager.read(cursor.page_num, |n| n.num_cells())?? as usize;
        if cursor.cell_num >= num_cells {
            return Err(err!(NotFound, "{}", id));
        }
        self.pager.write(cursor.page_num, |n| {
            for i in (cursor.cell_num + 1)..num_cells {
                n.copy_leaf_cell(i - 1, i);
            }
            n.set_num_cells((num_cells - 1) as u32);
        })?;
        Ok(())
    }

    /// Returns every row in ascending key order.
    pub fn select_all(&mut self) -> Result<Vec<Row>, Error> {
        let mut rows = Vec::new();
        let mut cursor = Cursor::start(&mut self.pager)?;
        while !cursor.end_of_table {
            rows.push(cursor.row(&mut self.pager)?);
            cursor.advance(&mut self.pager)?;
        }
        Ok(rows)
    }

    /// Read-only traversal of the tree structure, for the `.btree` meta-command.
    pub fn dump_tree(&mut self) -> Result<TreeDump, Error> {
        self.dump_node(0)
    }

    fn dump_node(&mut self, page_num: u32) -> Result<TreeDump, Error> {
        let node_type = self.pager.read(page_num, |n| n.node_type())??;
        match node_type {
            NodeType::Leaf => {
                let num_cells = self.pager.read(page_num, |n| n.num_cells())?? as usize;
                let keys = (0..num_cells)
                    .map(|i| -> Result<u32, Error> { self.pager.read(page_num, |n| n.leaf_key(i))? })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TreeDump::Leaf { num_cells, keys })
            }
            NodeType::Internal => {
                let num_keys = self.pager.read(page_num, |n| n.num_keys())?? as usize;
                let mut children = Vec::with_capacity(num_keys + 1);
                for i in 0..num_keys {
                    let child = self.pager.read(page_num, |n| n.internal_child(i))??;
                    children.push(self.dump_node(child)?);
                }
                let right = self.pager.read(page_num, |n| n.internal_right_child())??;
                children.push(self.dump_node(right)?);
                Ok(TreeDump::Internal { num_keys, children })
            }
        }
    }

    /// Compiled-in layout constants, for the `.constant` meta-command.
    pub fn constants() -> Vec<(&'static str, usize)> {
        vec![
            ("ROW_SIZE", ROW_SIZE),
            ("PAGE_SIZE", PAGE_SIZE),
            ("MAX_LEAF_CELLS", MAX_LEAF_CELLS),
            ("MAX_INTERNAL_CELLS", MAX_INTERNAL_CELLS),
        ]
    }
}

/// Renders a `.btree` dump with the indentation the REPL prints.
pub fn format_tree_dump(dump: &TreeDump, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    match dump {
        TreeDump::Leaf { num_cells, keys } => {
            let mut s = format!("{}- leaf (size {})\n", indent, num_cells);
            for key in keys {
                s.push_str(&format!("{}  - {}\n", indent, key));
            }
            s
        }
        TreeDump::Internal { num_keys, children } => {
            let mut s = format!("{}- internal (size {})\n", indent, num_keys);
            for child in children {
                s.push_str(&format_tree_dump(child, depth + 1));
            }
            s
        }
    }
}
