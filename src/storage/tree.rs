//! Whole-tree navigation: descent from the root, max-key computation, and
//! root replacement when the tree grows a new level.

use tracing::debug;

use crate::errors::Error;
use crate::storage::internal;
use crate::storage::leaf;
use crate::storage::node::NodeType;
use crate::storage::pager::Pager;

/// Result of descending the tree for a key: the leaf page that would hold it
/// and the cell position (a match, or the slot where it should be inserted).
pub struct Target {
    pub page_num: u32,
    pub cell_num: usize,
}

/// Descends from the root, selecting children via `internal::find_child_index`
/// at each internal node, then binary-searches the leaf it lands on.
pub fn find_by_key(pager: &mut Pager, key: u32) -> Result<Target, Error> {
    let mut page_num = 0u32;
    loop {
        let node_type = pager.read(page_num, |n| n.node_type())??;
        match node_type {
            NodeType::Leaf => {
                let cell_num = leaf::find_cell(pager, page_num, key)?;
                return Ok(Target { page_num, cell_num });
            }
            NodeType::Internal => {
                let child_index = internal::find_child_index(pager, page_num, key)?;
                page_num = pager.read(page_num, |n| n.internal_child(child_index))??;
            }
        }
    }
}

/// Leaf: the key of its last cell. Internal: recurses into the right child.
pub fn max_key(pager: &mut Pager, page_num: u32) -> Result<u32, Error> {
    let node_type = pager.read(page_num, |n| n.node_type())??;
    match node_type {
        NodeType::Leaf => {
            let num_cells = pager.read(page_num, |n| n.num_cells())?? as usize;
            pager.read(page_num, |n| n.leaf_key(num_cells - 1))?
        }
        NodeType::Internal => {
            let right_child = pager.read(page_num, |n| n.internal_right_child())??;
            max_key(pager, right_child)
        }
    }
}

/// Grows the tree by one level: copies the current root (page 0) into a
/// freshly allocated left-child page, makes `right_child_page_num` the new
/// root's right child, and reinitializes page 0 as the new internal root.
/// Returns the left child's page number, since callers continue a split
/// against the node that used to live at page 0.
pub fn create_new_root(pager: &mut Pager, right_child_page_num: u32) -> Result<u32, Error> {
    let root_was_internal = pager.read(0, |n| n.node_type())?? == NodeType::Internal;
    let left_child_page_num = pager.allocate_new_page()?;

    if root_was_internal {
        pager.write(right_child_page_num, |n| n.initialize_internal())?;
    }

    let root_bytes = pager.read(0, |n| *n.bytes())?;
    pager.write(left_child_page_num, |n| {
        n.overwrite_with(&root_bytes);
        n.set_is_root(false);
    })?;

    if root_was_internal {
        let num_keys = pager.read(left_child_page_num, |n| n.num_keys())?? as usize;
        for i in 0..num_keys {
            let child = pager.read(left_child_page_num, |n| n.internal_child(i))??;
            pager.write(child, |n| n.set_parent(left_child_page_num))?;
        }
        let right = pager.read(left_child_page_num, |n| n.internal_right_child())??;
        pager.write(right, |n| n.set_parent(left_child_page_num))?;
    }

    let left_max = max_key(pager, left_child_page_num)?;
    pager.write(0, |n| {
        n.initialize_internal();
        n.set_is_root(true);
        n.set_num_keys(1);
        n.set_internal_cell(0, left_child_page_num, left_max);
        n.set_internal_right_child(right_child_page_num);
    })?;
    pager.write(left_child_page_num, |n| n.set_parent(0))?;
    pager.write(right_child_page_num, |n| n.set_parent(0))?;

    debug!(left_child_page_num, right_child_page_num, "created new root");
    Ok(left_child_page_num)
}
