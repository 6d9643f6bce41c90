use crate::history::arena::BlockRun;
use crate::history::error::{HistoryError, Result};

/// One saved command line: the blocks holding its text and its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub blocks: BlockRun,
    /// Length of the saved line in bytes, terminator excluded.
    pub len: usize,
}

impl HistoryEntry {
    pub fn new(blocks: BlockRun, len: usize) -> Self {
        HistoryEntry { blocks, len }
    }
}

struct Node {
    entry: HistoryEntry,
    /// Next-older entry.
    next: Option<Box<Node>>,
}

/// Singly linked registry of history entries, newest at the head.
///
/// Entries are addressed from outside by display index: `1` is the oldest
/// surviving entry, `len()` the newest.
pub struct HistoryList {
    head: Option<Box<Node>>,
    len: usize,
}

impl HistoryList {
    /// Create an empty HistoryList.
    pub fn new() -> Self {
        HistoryList { head: None, len: 0 }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Make `entry` the newest entry.
    pub fn push_front(&mut self, entry: HistoryEntry) {
        let next = self.head.take();
        self.head = Some(Box::new(Node { entry, next }));
        self.len += 1;
    }

    /// Detach and return the oldest entry.
    pub fn remove_tail(&mut self) -> Result<HistoryEntry> {
        if self.is_empty() {
            return Err(HistoryError::EmptyList);
        }
        self.detach(self.len - 1)
    }

    /// Detach and return the entry at `display_index` (1 = oldest).
    pub fn remove_at(&mut self, display_index: usize) -> Result<HistoryEntry> {
        let position = self.position_of(display_index)?;
        self.detach(position)
    }

    /// Entry at `display_index` (1 = oldest), if there is one.
    pub fn get(&self, display_index: usize) -> Option<&HistoryEntry> {
        let position = self.position_of(display_index).ok()?;
        self.iter_newest_first().nth(position)
    }

    /// Entries oldest first, produced lazily by display index.
    ///
    /// Each step walks from the head, which is quadratic overall; the list
    /// never holds more than `MAX_BLOCKS` entries.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        (1..=self.len).filter_map(move |display_index| self.get(display_index))
    }

    /// Entries newest first, following the links from the head.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        let mut cursor = self.head.as_deref();
        std::iter::from_fn(move || {
            let node = cursor?;
            cursor = node.next.as_deref();
            Some(&node.entry)
        })
    }

    /// Drop every entry. Block bookkeeping is the caller's concern.
    pub fn clear(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
        self.len = 0;
    }

    /// Distance from the head of the entry shown at `display_index`.
    fn position_of(&self, display_index: usize) -> Result<usize> {
        if display_index == 0 || display_index > self.len {
            return Err(HistoryError::IndexOutOfRange {
                index: display_index,
                max: self.len,
            });
        }
        Ok(self.len - display_index)
    }

    fn detach(&mut self, position: usize) -> Result<HistoryEntry> {
        let mut cursor = &mut self.head;
        for _ in 0..position {
            cursor = match cursor {
                Some(node) => &mut node.next,
                None => return Err(HistoryError::EmptyList),
            };
        }
        let mut node = cursor.take().ok_or(HistoryError::EmptyList)?;
        *cursor = node.next.take();
        self.len -= 1;
        Ok(node.entry)
    }
}

impl Default for HistoryList {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HistoryList {
    fn drop(&mut self) {
        self.clear();
    }
}
