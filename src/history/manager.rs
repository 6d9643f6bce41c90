use tracing::{debug, trace};

use crate::config::{BLOCK_SIZE, INPUT_BUFSIZE, MAX_BLOCKS, MAX_ENTRY_BLOCKS};
use crate::history::arena::{BlockArena, BlockRun};
use crate::history::error::{HistoryError, Result};
use crate::history::list::{HistoryEntry, HistoryList};

/// Receives a line recalled from history, exactly as if it had been typed.
///
/// The manager hands itself back to the dispatcher so a recalled line may
/// use history commands too.
pub trait Dispatcher {
    type Output;

    fn dispatch(&mut self, history: &mut HistoryManager, line: &str) -> Self::Output;
}

/// Result of a successful [`HistoryManager::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { blocks: usize, evicted: usize },
    /// The line was empty; nothing was stored.
    Skipped,
}

/// A stored line as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLine {
    /// Display index, 1 = oldest.
    pub index: usize,
    pub text: String,
}

/// Command history kept in a fixed [`BlockArena`], oldest entries evicted first.
pub struct HistoryManager {
    arena: BlockArena,
    list: HistoryList,
}

impl HistoryManager {
    /// Create an empty store over a fresh arena.
    pub fn new() -> Self {
        HistoryManager {
            arena: BlockArena::new(),
            list: HistoryList::new(),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The backing arena, for inspection.
    pub fn arena(&self) -> &BlockArena {
        &self.arena
    }

    /// Store `line`, evicting the oldest entries until it fits.
    ///
    /// One trailing `\n` (or `\r\n`) is not stored. Empty lines are skipped.
    pub fn save(&mut self, line: &str) -> Result<SaveOutcome> {
        let text = strip_terminator(line);
        if text.is_empty() {
            return Ok(SaveOutcome::Skipped);
        }
        let len = text.len();
        if len > INPUT_BUFSIZE {
            return Err(HistoryError::LineTooLong(len));
        }

        let needed = len.div_ceil(BLOCK_SIZE);
        let (blocks, evicted) = self.allocate_evicting(needed)?;
        for (index, chunk) in blocks.iter().zip(text.as_bytes().chunks(BLOCK_SIZE)) {
            self.arena.write(index, chunk)?;
        }
        self.list.push_front(HistoryEntry::new(blocks, len));

        debug!(len, blocks = needed, evicted, entries = self.list.len(), "saved history entry");
        self.trace_arena();
        Ok(SaveOutcome::Saved {
            blocks: needed,
            evicted,
        })
    }

    /// Stored lines, oldest first, numbered from 1.
    pub fn list(&self) -> impl Iterator<Item = HistoryLine> + '_ {
        self.list
            .iter_oldest_first()
            .enumerate()
            .map(move |(pos, entry)| HistoryLine {
                index: pos + 1,
                text: self.entry_text(entry),
            })
    }

    /// Text of the entry at `display_index`, if there is one.
    pub fn get(&self, display_index: usize) -> Option<String> {
        self.list
            .get(display_index)
            .map(|entry| self.entry_text(entry))
    }

    /// Delete the entry at `display_index` (1 = oldest) and release its blocks.
    pub fn delete_at(&mut self, display_index: usize) -> Result<()> {
        let blocks = self
            .list
            .get(display_index)
            .map(|entry| entry.blocks)
            .ok_or(HistoryError::IndexOutOfRange {
                index: display_index,
                max: self.list.len(),
            })?;
        self.release(&blocks)?;
        self.list.remove_at(display_index)?;

        debug!(index = display_index, entries = self.list.len(), "deleted history entry");
        self.trace_arena();
        Ok(())
    }

    /// Re-run the entry at `display_index` through `dispatcher`.
    ///
    /// The newest entry cannot be re-run: it is the command asking for the re-run.
    pub fn run_at<D: Dispatcher>(&mut self, display_index: usize, dispatcher: &mut D) -> Result<D::Output> {
        let max = self.list.len().saturating_sub(1);
        if display_index == 0 || display_index > max {
            return Err(HistoryError::IndexOutOfRange {
                index: display_index,
                max,
            });
        }
        let line = self
            .get(display_index)
            .ok_or(HistoryError::IndexOutOfRange {
                index: display_index,
                max,
            })?;
        debug!(index = display_index, line = %line, "re-running history entry");
        Ok(dispatcher.dispatch(self, &line))
    }

    /// Check that allocated blocks and entry references match one to one and
    /// that every entry respects the size bounds.
    pub fn check_invariant(&self) -> bool {
        let mut referenced = [false; MAX_BLOCKS];
        for entry in self.list.iter_newest_first() {
            if entry.len == 0
                || entry.len > INPUT_BUFSIZE
                || entry.blocks.len() > MAX_ENTRY_BLOCKS
                || entry.blocks.len() != entry.len.div_ceil(BLOCK_SIZE)
            {
                return false;
            }
            for index in entry.blocks.iter() {
                if index >= MAX_BLOCKS || referenced[index] {
                    return false;
                }
                referenced[index] = true;
            }
        }
        (0..MAX_BLOCKS).all(|index| referenced[index] == self.arena.is_allocated(index))
    }

    /// Tear the store down at shell exit. Returns how many entries were dropped.
    pub fn shutdown(mut self) -> usize {
        let dropped = self.list.len();
        self.list.clear();
        debug!(dropped, "history store released");
        dropped
    }

    /// Allocate `needed` blocks, evicting from the tail while space is short.
    /// Never evicts more entries than existed when the save started.
    fn allocate_evicting(&mut self, needed: usize) -> Result<(BlockRun, usize)> {
        let budget = self.list.len();
        let mut evicted = 0;
        loop {
            match self.arena.try_allocate(needed) {
                Ok(blocks) => return Ok((blocks, evicted)),
                Err(HistoryError::InsufficientSpace { .. }) if evicted < budget => {
                    self.evict_oldest()?;
                    evicted += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn evict_oldest(&mut self) -> Result<()> {
        let entry = self.list.remove_tail()?;
        self.release(&entry.blocks)?;
        debug!(len = entry.len, blocks = entry.blocks.len(), "evicted oldest history entry");
        Ok(())
    }

    fn release(&mut self, blocks: &BlockRun) -> Result<()> {
        for index in blocks.iter() {
            self.arena.free(index)?;
        }
        Ok(())
    }

    fn entry_text(&self, entry: &HistoryEntry) -> String {
        let mut bytes = Vec::with_capacity(entry.len);
        for index in entry.blocks.iter() {
            let Ok(block) = self.arena.read(index) else {
                break;
            };
            match block.iter().position(|&b| b == 0) {
                Some(end) => {
                    bytes.extend_from_slice(&block[..end]);
                    break;
                }
                None => bytes.extend_from_slice(&block),
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn trace_arena(&self) {
        trace!("bitmap\n{}", self.arena.bitmap_dump());
        trace!("datablocks\n{}", self.arena.blocks_dump());
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}
