//! Leaf-node search, insertion, and splitting.

use tracing::debug;

use crate::errors::Error;
use crate::storage::internal;
use crate::storage::node::{LEFT_SPLIT_COUNT, MAX_LEAF_CELLS, RIGHT_SPLIT_COUNT};
use crate::storage::pager::Pager;
use crate::storage::row::Row;
use crate::storage::tree;

/// Binary search over `page_num`'s cells for the first key `>= target`.
/// Returns the matching cell index, or the insertion slot (which may equal `num_cells`).
pub fn find_cell(pager: &mut Pager, page_num: u32, target: u32) -> Result<usize, Error> {
    pager.read(page_num, |node| {
        let num_cells = node.num_cells()? as usize;
        let mut lo = 0usize;
        let mut hi = num_cells;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let key = node.leaf_key(mid)?;
            if key == target {
                return Ok(mid);
            } else if target < key {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(lo)
    })?
}

/// Inserts `(key, row)` at `cell_num`, splitting the leaf first if it is full.
pub fn insert(
    pager: &mut Pager,
    page_num: u32,
    cell_num: usize,
    key: u32,
    row: &Row,
) -> Result<(), Error> {
    let num_cells = pager.read(page_num, |n| n.num_cells())?? as usize;
    if num_cells >= MAX_LEAF_CELLS {
        return split_and_insert(pager, page_num, cell_num, key, row);
    }

    pager.write(page_num, |node| {
        for i in (cell_num..num_cells).rev() {
            node.copy_leaf_cell(i + 1, i);
        }
        node.set_leaf_cell(cell_num, key, row);
        node.set_num_cells((num_cells + 1) as u32);
    })?;
    Ok(())
}

/// Splits a full leaf, inserting the new `(key, row)` into the correct half,
/// then wires the new leaf into its parent (creating a new root if needed).
fn split_and_insert(
    pager: &mut Pager,
    old_page_num: u32,
    insert_pos: usize,
    key: u32,
    row: &Row,
) -> Result<(), Error> {
    let old_max = tree::max_key(pager, old_page_num)?;
    let new_page_num = pager.allocate_new_page()?;

    let (old_next, old_parent) =
        pager.read(old_page_num, |n| Ok((n.next_leaf()?, n.parent()?)))??;
    pager.write(new_page_num, |n| {
        n.initialize_leaf();
        n.set_next_leaf(old_next);
        n.set_parent(old_parent);
    })?;
    pager.write(old_page_num, |n| n.set_next_leaf(new_page_num))?;

    // Collect the pre-split cells once; the old page gets overwritten in place below.
    let old_cells: Vec<(u32, Row)> = pager.read(old_page_num, |n| {
        (0..MAX_LEAF_CELLS)
            .map(|i| Ok((n.leaf_key(i)?, n.leaf_row(i)?)))
            .collect::<Result<Vec<_>, Error>>()
    })??;

    for i in (0..=MAX_LEAF_CELLS).rev() {
        let dest_page = if i < LEFT_SPLIT_COUNT {
            old_page_num
        } else {
            new_page_num
        };
        let dest_index = i % LEFT_SPLIT_COUNT;
        let cell = if i == insert_pos {
            (key, row.clone())
        } else if i > insert_pos {
            old_cells[i - 1].clone()
        } else {
            old_cells[i].clone()
        };
        pager.write(dest_page, |n| n.set_leaf_cell(dest_index, cell.0, &cell.1))?;
    }

    pager.write(old_page_num, |n| n.set_num_cells(LEFT_SPLIT_COUNT as u32))?;
    pager.write(new_page_num, |n| n.set_num_cells(RIGHT_SPLIT_COUNT as u32))?;

    debug!(old_page_num, new_page_num, "split leaf node");

    let is_root = pager.read(old_page_num, |n| n.is_root())?;
    if is_root {
        tree::create_new_root(pager, new_page_num)?;
    } else {
        let new_max = tree::max_key(pager, old_page_num)?;
        let parent = pager.read(old_page_num, |n| n.parent())??;
        internal::update_key(pager, parent, old_max, new_max)?;
        internal::insert_child(pager, parent, new_page_num)?;
    }
    Ok(())
}

/// Initializes page 0 as an empty leaf root. Used when opening a fresh table file.
pub fn initialize_root(pager: &mut Pager) -> Result<(), Error> {
    pager.write(0, |n| {
        n.initialize_leaf();
        n.set_is_root(true);
        n.set_parent(0);
    })?;
    Ok(())
}
