//! Page cache and file I/O.
//!
//! The pager owns the table's file handle and a fixed-capacity cache of
//! page buffers. It has no notion of leaf vs. internal nodes; callers
//! interpret the bytes it hands back via [`Node`](crate::storage::node::Node).
//!
//! Each cache slot is an `Arc<Mutex<Node>>` so callers can hold onto a page
//! (e.g. a parent) while fetching another (e.g. a child) without fighting the
//! borrow checker. `try_lock` is used rather than `lock` so that an
//! accidental double-borrow of the same page surfaces as a `Corruption`
//! error instead of a silent deadlock.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use heapless::Vec as HVec;
use tracing::{debug, trace};

use crate::errors::Error;
use crate::storage::node::{Node, PAGE_SIZE, TABLE_MAX_PAGES};

type PageSlot = Option<Arc<Mutex<Node>>>;

pub struct Pager {
    file: File,
    num_pages: usize,
    pages: HVec<PageSlot, TABLE_MAX_PAGES>,
}

impl Pager {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let file_len = file.metadata()?.len() as usize;
        if file_len % PAGE_SIZE != 0 {
            return Err(err!(
                Corruption,
                "db file length {} is not a multiple of page size {}",
                file_len,
                PAGE_SIZE
            ));
        }
        let num_pages = file_len / PAGE_SIZE;
        let mut pages = HVec::new();
        for _ in 0..TABLE_MAX_PAGES {
            pages.push(None).ok();
        }
        debug!(path = %path.display(), num_pages, "opened pager");
        Ok(Pager {
            file,
            num_pages,
            pages,
        })
    }

    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    /// Returns the next unused page number; the caller is expected to
    /// populate it via [`Pager::get`] immediately after.
    pub fn allocate_new_page(&mut self) -> Result<u32, Error> {
        if self.num_pages >= TABLE_MAX_PAGES {
            return Err(err!(
                Capacity,
                "table full: cannot exceed {} pages",
                TABLE_MAX_PAGES
            ));
        }
        let page_num = self.num_pages as u32;
        trace!(page_num, "allocated new page");
        Ok(page_num)
    }

    fn slot(&mut self, page_num: u32) -> Result<Arc<Mutex<Node>>, Error> {
        let idx = page_num as usize;
        if idx >= TABLE_MAX_PAGES {
            return Err(err!(
                Capacity,
                "page {} exceeds table capacity of {} pages",
                page_num,
                TABLE_MAX_PAGES
            ));
        }
        if self.pages[idx].is_none() {
            let mut buf = [0u8; PAGE_SIZE];
            if idx < self.num_pages {
                self.file.seek(SeekFrom::Start((idx * PAGE_SIZE) as u64))?;
                self.file.read_exact(&mut buf)?;
                trace!(page_num, "read page from disk");
            }
            self.pages[idx] = Some(Arc::new(Mutex::new(Node::from_bytes(page_num, buf))));
            if idx >= self.num_pages {
                self.num_pages = idx + 1;
            }
        }
        Ok(self.pages[idx].clone().unwrap())
    }

    /// Runs `f` against a read-only view of `page_num`, loading it on miss.
    pub fn read<R>(&mut self, page_num: u32, f: impl FnOnce(&Node) -> R) -> Result<R, Error> {
        let slot = self.slot(page_num)?;
        let guard = slot
            .try_lock()
            .map_err(|_| err!(Corruption, "page {} is already borrowed", page_num))?;
        Ok(f(&guard))
    }

    /// Runs `f` against a mutable view of `page_num`, loading it on miss.
    pub fn write<R>(&mut self, page_num: u32, f: impl FnOnce(&mut Node) -> R) -> Result<R, Error> {
        let slot = self.slot(page_num)?;
        let mut guard = slot
            .try_lock()
            .map_err(|_| err!(Corruption, "page {} is already borrowed", page_num))?;
        Ok(f(&mut guard))
    }

    pub fn flush(&mut self, page_num: u32) -> Result<(), Error> {
        let idx = page_num as usize;
        let slot = self.pages[idx]
            .clone()
            .ok_or_else(|| err!(Corruption, "attempted to flush never-loaded page {}", page_num))?;
        let guard = slot
            .try_lock()
            .map_err(|_| err!(Corruption, "page {} is already borrowed", page_num))?;
        self.file
            .seek(SeekFrom::Start((idx * PAGE_SIZE) as u64))?;
        self.file.write_all(guard.bytes())?;
        trace!(page_num, "flushed page to disk");
        Ok(())
    }

    /// Flushes every populated cache slot and releases them. The file handle
    /// closes implicitly when `self.file` drops.
    pub fn close(&mut self) -> Result<(), Error> {
        for page_num in 0..self.num_pages as u32 {
            if self.pages[page_num as usize].is_some() {
                self.flush(page_num)?;
            }
        }
        for slot in self.pages.iter_mut() {
            *slot = None;
        }
        self.file.flush()?;
        debug!(num_pages = self.num_pages, "closed pager");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::node::NodeType;
    use tempfile::NamedTempFile;

    #[test]
    fn allocate_then_write_then_reopen_round_trips() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        {
            let mut pager = Pager::open(&path).unwrap();
            let page_num = pager.allocate_new_page().unwrap();
            pager
                .write(page_num, |node| {
                    node.initialize_leaf();
                    node.set_is_root(true);
                })
                .unwrap();
            pager.close().unwrap();
        }
        {
            let mut pager = Pager::open(&path).unwrap();
            assert_eq!(pager.num_pages(), 1);
            let kind = pager.read(0, |node| node.node_type().unwrap()).unwrap();
            assert_eq!(kind, NodeType::Leaf);
        }
    }

    #[test]
    fn rejects_file_length_not_multiple_of_page_size() {
        use std::io::Write as _;
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&[0u8; 10]).unwrap();
        assert!(matches!(Pager::open(tmp.path()), Err(Error::Corruption(_))));
    }
}
