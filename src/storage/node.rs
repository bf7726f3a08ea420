//! Page layout: header fields, cell geometry, and the split-size constants
//! derived from them. A `Node` wraps one page's raw bytes and exposes typed
//! accessors over fixed byte offsets; it never allocates or does I/O itself.

use crate::errors::Error;
use crate::storage::row::{Row, ROW_SIZE};

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;

/// Reserved page number marking a child slot that exists but isn't wired up yet.
pub const INVALID_PAGE_NUM: u32 = u32::MAX;

// --- Common header ---------------------------------------------------

const NODE_TYPE_OFFSET: usize = 0;
const NODE_TYPE_SIZE: usize = 1;
const IS_ROOT_OFFSET: usize = NODE_TYPE_OFFSET + NODE_TYPE_SIZE;
const IS_ROOT_SIZE: usize = 1;
const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
const PARENT_POINTER_SIZE: usize = 4;
const COMMON_NODE_HEADER_SIZE: usize = PARENT_POINTER_OFFSET + PARENT_POINTER_SIZE;

// --- Leaf header/body --------------------------------------------------

const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
const LEAF_NODE_NUM_CELLS_SIZE: usize = 4;
const LEAF_NODE_NEXT_LEAF_OFFSET: usize = LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE;
const LEAF_NODE_NEXT_LEAF_SIZE: usize = 4;
const LEAF_NODE_HEADER_SIZE: usize = LEAF_NODE_NEXT_LEAF_OFFSET + LEAF_NODE_NEXT_LEAF_SIZE;

const LEAF_NODE_KEY_SIZE: usize = 4;
const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + ROW_SIZE;
const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;

/// Maximum number of `(key, row)` cells a leaf page can hold.
pub const MAX_LEAF_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;
pub const RIGHT_SPLIT_COUNT: usize = (MAX_LEAF_CELLS + 1) / 2;
pub const LEFT_SPLIT_COUNT: usize = (MAX_LEAF_CELLS + 1) - RIGHT_SPLIT_COUNT;

// --- Internal header/body -----------------------------------------------

const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
const INTERNAL_NODE_NUM_KEYS_SIZE: usize = 4;
const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize =
    INTERNAL_NODE_NUM_KEYS_OFFSET + INTERNAL_NODE_NUM_KEYS_SIZE;
const INTERNAL_NODE_RIGHT_CHILD_SIZE: usize = 4;
const INTERNAL_NODE_HEADER_SIZE: usize =
    INTERNAL_NODE_RIGHT_CHILD_OFFSET + INTERNAL_NODE_RIGHT_CHILD_SIZE;

const INTERNAL_NODE_CHILD_SIZE: usize = 4;
const INTERNAL_NODE_KEY_SIZE: usize = 4;
const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;

/// Deliberately small so ordinary test fixtures exercise internal-node splits.
pub const MAX_INTERNAL_CELLS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal,
    Leaf,
}

impl NodeType {
    fn to_byte(self) -> u8 {
        match self {
            NodeType::Internal => 0,
            NodeType::Leaf => 1,
        }
    }

    fn from_byte(b: u8) -> Result<Self, Error> {
        match b {
            0 => Ok(NodeType::Internal),
            1 => Ok(NodeType::Leaf),
            other => Err(err!(Corruption, "invalid node_type byte {}", other)),
        }
    }
}

/// One page's worth of bytes, interpreted per the leaf/internal layout above.
#[derive(Debug, Clone)]
pub struct Node {
    pub page_num: u32,
    buf: [u8; PAGE_SIZE],
}

impl Node {
    pub fn from_bytes(page_num: u32, buf: [u8; PAGE_SIZE]) -> Self {
        Node { page_num, buf }
    }

    pub fn bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.buf
    }

    pub fn zeroed(page_num: u32) -> Self {
        Node {
            page_num,
            buf: [0u8; PAGE_SIZE],
        }
    }

    /// Replaces this page's raw bytes wholesale (e.g. copying the root's
    /// bytes into a freshly allocated left-child page during a split). The
    /// page's own `page_num` identity is preserved.
    pub fn overwrite_with(&mut self, bytes: &[u8; PAGE_SIZE]) {
        self.buf = *bytes;
    }

    // --- common header ---

    pub fn node_type(&self) -> Result<NodeType, Error> {
        NodeType::from_byte(self.buf[NODE_TYPE_OFFSET])
    }

    pub fn set_node_type(&mut self, t: NodeType) {
        self.buf[NODE_TYPE_OFFSET] = t.to_byte();
    }

    pub fn is_root(&self) -> bool {
        self.buf[IS_ROOT_OFFSET] != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.buf[IS_ROOT_OFFSET] = is_root as u8;
    }

    pub fn parent(&self) -> Result<u32, Error> {
        read_u32(&self.buf, PARENT_POINTER_OFFSET)
    }

    pub fn set_parent(&mut self, parent: u32) {
        write_u32(&mut self.buf, PARENT_POINTER_OFFSET, parent);
    }

    // --- leaf header ---

    pub fn num_cells(&self) -> Result<u32, Error> {
        read_u32(&self.buf, LEAF_NODE_NUM_CELLS_OFFSET)
    }

    pub fn set_num_cells(&mut self, n: u32) {
        write_u32(&mut self.buf, LEAF_NODE_NUM_CELLS_OFFSET, n);
    }

    pub fn next_leaf(&self) -> Result<u32, Error> {
        read_u32(&self.buf, LEAF_NODE_NEXT_LEAF_OFFSET)
    }

    pub fn set_next_leaf(&mut self, next: u32) {
        write_u32(&mut self.buf, LEAF_NODE_NEXT_LEAF_OFFSET, next);
    }

    fn leaf_cell_offset(cell_num: usize) -> usize {
        LEAF_NODE_HEADER_SIZE + cell_num * LEAF_NODE_CELL_SIZE
    }

    pub fn leaf_key(&self, cell_num: usize) -> Result<u32, Error> {
        read_u32(&self.buf, Self::leaf_cell_offset(cell_num))
    }

    pub fn set_leaf_key(&mut self, cell_num: usize, key: u32) {
        write_u32(&mut self.buf, Self::leaf_cell_offset(cell_num), key);
    }

    pub fn leaf_row(&self, cell_num: usize) -> Result<Row, Error> {
        let off = Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        Row::deserialize(&self.buf[off..off + ROW_SIZE])
    }

    pub fn set_leaf_cell(&mut self, cell_num: usize, key: u32, row: &Row) {
        self.set_leaf_key(cell_num, key);
        let off = Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        self.buf[off..off + ROW_SIZE].copy_from_slice(&row.serialize());
    }

    /// Copies the whole `(key, row)` cell at `src` into `dst` within this page.
    pub fn copy_leaf_cell(&mut self, dst: usize, src: usize) {
        let src_off = Self::leaf_cell_offset(src);
        let dst_off = Self::leaf_cell_offset(dst);
        let mut tmp = [0u8; LEAF_NODE_CELL_SIZE];
        tmp.copy_from_slice(&self.buf[src_off..src_off + LEAF_NODE_CELL_SIZE]);
        self.buf[dst_off..dst_off + LEAF_NODE_CELL_SIZE].copy_from_slice(&tmp);
    }

    pub fn initialize_leaf(&mut self) {
        self.buf = [0u8; PAGE_SIZE];
        self.set_node_type(NodeType::Leaf);
        self.set_is_root(false);
        self.set_num_cells(0);
        self.set_next_leaf(0);
    }

    // --- internal header ---

    pub fn num_keys(&self) -> Result<u32, Error> {
        read_u32(&self.buf, INTERNAL_NODE_NUM_KEYS_OFFSET)
    }

    pub fn set_num_keys(&mut self, n: u32) {
        write_u32(&mut self.buf, INTERNAL_NODE_NUM_KEYS_OFFSET, n);
    }

    pub fn internal_right_child(&self) -> Result<u32, Error> {
        read_u32(&self.buf, INTERNAL_NODE_RIGHT_CHILD_OFFSET)
    }

    pub fn set_internal_right_child(&mut self, page_num: u32) {
        write_u32(&mut self.buf, INTERNAL_NODE_RIGHT_CHILD_OFFSET, page_num);
    }

    fn internal_cell_offset(cell_num: usize) -> usize {
        INTERNAL_NODE_HEADER_SIZE + cell_num * INTERNAL_NODE_CELL_SIZE
    }

    /// Returns the child page number at position `i`. Rejects the invalid-page sentinel.
    pub fn internal_child(&self, i: usize) -> Result<u32, Error> {
        let child = if i as u32 == self.num_keys()? {
            self.internal_right_child()?
        } else {
            read_u32(&self.buf, Self::internal_cell_offset(i))?
        };
        if child == INVALID_PAGE_NUM {
            return Err(err!(Corruption, "dereferenced invalid-page sentinel"));
        }
        Ok(child)
    }

    pub fn set_internal_child(&mut self, i: usize, page_num: u32) -> Result<(), Error> {
        if i as u32 == self.num_keys()? {
            self.set_internal_right_child(page_num);
        } else {
            write_u32(&mut self.buf, Self::internal_cell_offset(i), page_num);
        }
        Ok(())
    }

    pub fn internal_key(&self, i: usize) -> Result<u32, Error> {
        read_u32(&self.buf, Self::internal_cell_offset(i) + INTERNAL_NODE_CHILD_SIZE)
    }

    pub fn set_internal_key(&mut self, i: usize, key: u32) {
        write_u32(
            &mut self.buf,
            Self::internal_cell_offset(i) + INTERNAL_NODE_CHILD_SIZE,
            key,
        );
    }

    pub fn set_internal_cell(&mut self, i: usize, child_page_num: u32, key: u32) {
        write_u32(&mut self.buf, Self::internal_cell_offset(i), child_page_num);
        self.set_internal_key(i, key);
    }

    pub fn copy_internal_cell(&mut self, dst: usize, src: usize) {
        let src_off = Self::internal_cell_offset(src);
        let dst_off = Self::internal_cell_offset(dst);
        let mut tmp = [0u8; INTERNAL_NODE_CELL_SIZE];
        tmp.copy_from_slice(&self.buf[src_off..src_off + INTERNAL_NODE_CELL_SIZE]);
        self.buf[dst_off..dst_off + INTERNAL_NODE_CELL_SIZE].copy_from_slice(&tmp);
    }

    pub fn initialize_internal(&mut self) {
        self.buf = [0u8; PAGE_SIZE];
        self.set_node_type(NodeType::Internal);
        self.set_is_root(false);
        self.set_num_keys(0);
        // Right child starts unwired; callers must set it before the node is navigable.
        self.set_internal_right_child(INVALID_PAGE_NUM);
    }
}

fn read_u32(buf: &[u8; PAGE_SIZE], offset: usize) -> Result<u32, Error> {
    buf[offset..offset + 4]
        .try_into()
        .map(u32::from_le_bytes)
        .map_err(|e| err!(Corruption, "failed to decode u32 at offset {}: {:?}", offset, e))
}

fn write_u32(buf: &mut [u8; PAGE_SIZE], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
