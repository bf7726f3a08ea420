//! A positioned, forward-only view into the tree's leaves.

use crate::errors::Error;
use crate::storage::pager::Pager;
use crate::storage::row::Row;
use crate::storage::tree;

pub struct Cursor {
    pub page_num: u32,
    pub cell_num: usize,
    pub end_of_table: bool,
}

impl Cursor {
    /// Positions at the first key in the table (equivalent to `find(0)`),
    /// flagging end-of-table when the leaf it lands on has no cells.
    pub fn start(pager: &mut Pager) -> Result<Self, Error> {
        let target = tree::find_by_key(pager, 0)?;
        let num_cells = pager.read(target.page_num, |n| n.num_cells())?? as usize;
        Ok(Cursor {
            page_num: target.page_num,
            cell_num: target.cell_num,
            end_of_table: num_cells == 0,
        })
    }

    /// Positions at `key`'s cell, or its would-be insertion slot if absent.
    pub fn find(pager: &mut Pager, key: u32) -> Result<Self, Error> {
        let target = tree::find_by_key(pager, key)?;
        let num_cells = pager.read(target.page_num, |n| n.num_cells())?? as usize;
        Ok(Cursor {
            page_num: target.page_num,
            cell_num: target.cell_num,
            end_of_table: target.cell_num >= num_cells,
        })
    }

    pub fn row(&self, pager: &mut Pager) -> Result<Row, Error> {
        pager.read(self.page_num, |n| n.leaf_row(self.cell_num))?
    }

    /// Moves to the next cell, following the sibling pointer across leaves.
    pub fn advance(&mut self, pager: &mut Pager) -> Result<(), Error> {
        let num_cells = pager.read(self.page_num, |n| n.num_cells())?? as usize;
        self.cell_num += 1;
        if self.cell_num >= num_cells {
            let next_leaf = pager.read(self.page_num, |n| n.next_leaf())??;
            if next_leaf == 0 {
                self.end_of_table = true;
            } else {
                self.page_num = next_leaf;
                self.cell_num = 0;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::leaf;
    use crate::storage::node::MAX_LEAF_CELLS;
    use tempfile::NamedTempFile;

    #[test]
    fn walks_every_row_in_ascending_order_across_a_split() {
        let tmp = NamedTempFile::new().unwrap();
        let mut pager = Pager::open(tmp.path()).unwrap();
        pager.allocate_new_page().unwrap();
        leaf::initialize_root(&mut pager).unwrap();

        let total = MAX_LEAF_CELLS as u32 + 1;
        for id in 1..=total {
            let target = tree::find_by_key(&mut pager, id).unwrap();
            let row = Row::new(id, "u", "e@x").unwrap();
            leaf::insert(&mut pager, target.page_num, target.cell_num, id, &row).unwrap();
        }

        let mut cursor = Cursor::start(&mut pager).unwrap();
        let mut seen = Vec::new();
        while !cursor.end_of_table {
            seen.push(cursor.row(&mut pager).unwrap().id);
            cursor.advance(&mut pager).unwrap();
        }
        let expected: Vec<u32> = (1..=total).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn empty_table_starts_at_end() {
        let tmp = NamedTempFile::new().unwrap();
        let mut pager = Pager::open(tmp.path()).unwrap();
        pager.allocate_new_page().unwrap();
        leaf::initialize_root(&mut pager).unwrap();
        let cursor = Cursor::start(&mut pager).unwrap();
        assert!(cursor.end_of_table);
    }
}
