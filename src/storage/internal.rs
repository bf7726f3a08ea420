//! Internal-node search, child insertion, and splitting.

use tracing::debug;

use crate::errors::Error;
use crate::storage::node::{INVALID_PAGE_NUM, MAX_INTERNAL_CELLS};
use crate::storage::pager::Pager;
use crate::storage::tree;

/// Smallest index `i` such that `target <= key[i]`; `num_keys` if `target`
/// exceeds every key (meaning the right-child covers it).
pub fn find_child_index(pager: &mut Pager, page_num: u32, target: u32) -> Result<usize, Error> {
    pager.read(page_num, |node| {
        let num_keys = node.num_keys()? as usize;
        let mut lo = 0usize;
        let mut hi = num_keys;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if target <= node.internal_key(mid)? {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(lo)
    })?
}

/// Overwrites the key slot that used to reference `old_key` with `new_key`.
pub fn update_key(pager: &mut Pager, page_num: u32, old_key: u32, new_key: u32) -> Result<(), Error> {
    let index = find_child_index(pager, page_num, old_key)?;
    pager.write(page_num, |node| node.set_internal_key(index, new_key))?;
    Ok(())
}

/// Inserts `child_page_num` as a child of `parent_page_num`, splitting the
/// parent first if it is already full.
pub fn insert_child(pager: &mut Pager, parent_page_num: u32, child_page_num: u32) -> Result<(), Error> {
    let child_max = tree::max_key(pager, child_page_num)?;
    let old_num_keys = pager.read(parent_page_num, |n| n.num_keys())??;

    if old_num_keys as usize >= MAX_INTERNAL_CELLS {
        return split_and_insert(pager, parent_page_num, child_page_num);
    }

    let index = find_child_index(pager, parent_page_num, child_max)?;
    let right_child = pager.read(parent_page_num, |n| n.internal_right_child())??;

    if right_child == INVALID_PAGE_NUM {
        pager.write(parent_page_num, |n| n.set_internal_right_child(child_page_num))?;
    } else {
        let right_child_max = tree::max_key(pager, right_child)?;
        pager.write(parent_page_num, |node| {
            node.set_num_keys(old_num_keys + 1);
            if child_max > right_child_max {
                node.set_internal_cell(old_num_keys as usize, right_child, right_child_max);
                node.set_internal_right_child(child_page_num);
            } else {
                for i in (index..old_num_keys as usize).rev() {
                    node.copy_internal_cell(i + 1, i);
                }
                node.set_internal_cell(index, child_page_num, child_max);
            }
        })?;
    }

    pager.write(child_page_num, |n| n.set_parent(parent_page_num))?;
    Ok(())
}

/// Splits a full internal node to make room for a new child, recursing into
/// the grandparent (or creating a new root) as needed.
fn split_and_insert(pager: &mut Pager, old_page_num: u32, child_page_num: u32) -> Result<(), Error> {
    let old_max = tree::max_key(pager, old_page_num)?;
    let child_max = tree::max_key(pager, child_page_num)?;
    let was_root = pager.read(old_page_num, |n| n.is_root())?;

    let new_page_num = pager.allocate_new_page()?;

    // When splitting the root, create_new_root copies page 0's current bytes
    // into a fresh left-child page (and, since the root is internal here,
    // initializes both the left child and new_page_num as internal nodes).
    // Subsequent redistribution continues against that left-child page.
    let old_page_num = if was_root {
        tree::create_new_root(pager, new_page_num)?
    } else {
        pager.write(new_page_num, |n| n.initialize_internal())?;
        old_page_num
    };

    let old_right_child = pager.read(old_page_num, |n| n.internal_right_child())??;
    insert_child(pager, new_page_num, old_right_child)?;
    pager.write(old_page_num, |n| n.set_internal_right_child(INVALID_PAGE_NUM))?;

    let mut i = MAX_INTERNAL_CELLS - 1;
    loop {
        if i <= MAX_INTERNAL_CELLS / 2 {
            break;
        }
        let moved_child = pager.read(old_page_num, |n| n.internal_child(i))??;
        insert_child(pager, new_page_num, moved_child)?;
        pager.write(old_page_num, |n| -> Result<(), Error> {
            let num_keys = n.num_keys()?;
            n.set_num_keys(num_keys - 1);
            Ok(())
        })??;
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let last = pager.read(old_page_num, |n| n.num_keys())?? as usize - 1;
    let last_child = pager.read(old_page_num, |n| n.internal_child(last))??;
    pager.write(old_page_num, |n| -> Result<(), Error> {
        let num_keys = n.num_keys()?;
        n.set_internal_right_child(last_child);
        n.set_num_keys(num_keys - 1);
        Ok(())
    })??;

    let new_old_max = tree::max_key(pager, old_page_num)?;
    if child_max < new_old_max {
        insert_child(pager, old_page_num, child_page_num)?;
    } else {
        insert_child(pager, new_page_num, child_page_num)?;
    }

    debug!(old_page_num, new_page_num, "split internal node");

    if !was_root {
        let grandparent = pager.read(old_page_num, |n| n.parent())??;
        update_key(pager, grandparent, old_max, new_old_max)?;
        insert_child(pager, grandparent, new_page_num)?;
        pager.write(new_page_num, |n| n.set_parent(grandparent))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::node::NodeType;
    use crate::storage::row::Row;
    use crate::storage::{leaf, tree};
    use tempfile::NamedTempFile;

    #[test]
    fn find_child_index_returns_num_keys_past_all_keys() {
        let tmp = NamedTempFile::new().unwrap();
        let mut pager = Pager::open(tmp.path()).unwrap();
        pager.allocate_new_page().unwrap();
        pager
            .write(0, |n| {
                n.initialize_internal();
                n.set_num_keys(2);
                n.set_internal_cell(0, 1, 10);
                n.set_internal_cell(1, 2, 20);
                n.set_internal_right_child(3);
            })
            .unwrap();
        assert_eq!(find_child_index(&mut pager, 0, 5).unwrap(), 0);
        assert_eq!(find_child_index(&mut pager, 0, 15).unwrap(), 1);
        assert_eq!(find_child_index(&mut pager, 0, 25).unwrap(), 2);
    }

    #[test]
    fn forcing_internal_split_keeps_all_keys_findable() {
        let tmp = NamedTempFile::new().unwrap();
        let mut pager = Pager::open(tmp.path()).unwrap();
        pager.allocate_new_page().unwrap();
        leaf::initialize_root(&mut pager).unwrap();

        let ids = [18u32, 7, 10, 29, 23, 4, 14, 30, 15, 26, 22, 19, 2, 1, 21, 11, 6, 20, 5, 8];
        for id in ids {
            let row = Row::new(id, "u", "e@x").unwrap();
            let target = tree::find_by_key(&mut pager, id).unwrap();
            leaf::insert(&mut pager, target.page_num, target.cell_num, id, &row).unwrap();
        }

        assert_eq!(
            pager.read(0, |n| n.node_type().unwrap()).unwrap(),
            NodeType::Internal
        );
        for id in ids {
            let target = tree::find_by_key(&mut pager, id).unwrap();
            let found_key = pager.read(target.page_num, |n| n.leaf_key(target.cell_num)).unwrap().unwrap();
            assert_eq!(found_key, id);
        }
    }
}
