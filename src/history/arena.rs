use std::fmt::Write as _;

use tracing::trace;

use crate::config::{BITMAP_BYTES, BLOCK_SIZE, MAX_BLOCKS, MAX_ENTRY_BLOCKS};
use crate::history::error::{HistoryError, Result};

/// Position of a block inside the arena, in `0..MAX_BLOCKS`.
pub type BlockIndex = usize;

/// A bounded, ordered run of block indices belonging to one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRun {
    indices: [BlockIndex; MAX_ENTRY_BLOCKS],
    len: usize,
}

impl BlockRun {
    /// Create an empty run.
    pub fn new() -> Self {
        BlockRun {
            indices: [0; MAX_ENTRY_BLOCKS],
            len: 0,
        }
    }

    /// Append an index. Fails once the run already holds `MAX_ENTRY_BLOCKS`.
    pub fn push(&mut self, index: BlockIndex) -> Result<()> {
        if self.len == MAX_ENTRY_BLOCKS {
            return Err(HistoryError::InvalidBlockCount(self.len + 1));
        }
        self.indices[self.len] = index;
        self.len += 1;
        Ok(())
    }

    /// Number of blocks in the run.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The indices, in the order the text was written.
    pub fn as_slice(&self) -> &[BlockIndex] {
        &self.indices[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = BlockIndex> + '_ {
        self.as_slice().iter().copied()
    }
}

impl Default for BlockRun {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed pool of `MAX_BLOCKS` blocks of `BLOCK_SIZE` bytes with a packed
/// allocation bitmap.
pub struct BlockArena {
    bitmap: [u8; BITMAP_BYTES],
    blocks: [u8; MAX_BLOCKS * BLOCK_SIZE],
}

impl BlockArena {
    /// Create an arena with every block free and zeroed.
    pub fn new() -> Self {
        BlockArena {
            bitmap: [0; BITMAP_BYTES],
            blocks: [0; MAX_BLOCKS * BLOCK_SIZE],
        }
    }

    fn set_bit(&mut self, index: BlockIndex) {
        self.bitmap[index / 8] |= 1 << (index % 8);
    }

    fn clear_bit(&mut self, index: BlockIndex) {
        self.bitmap[index / 8] &= !(1 << (index % 8));
    }

    fn test_bit(&self, index: BlockIndex) -> bool {
        self.bitmap[index / 8] & (1 << (index % 8)) != 0
    }

    fn check_range(index: BlockIndex) -> Result<()> {
        if index >= MAX_BLOCKS {
            return Err(HistoryError::OutOfRange(index));
        }
        Ok(())
    }

    fn block_mut(&mut self, index: BlockIndex) -> &mut [u8] {
        let start = index * BLOCK_SIZE;
        &mut self.blocks[start..start + BLOCK_SIZE]
    }

    /// Whether `index` is currently handed out. Out-of-range indices are never allocated.
    pub fn is_allocated(&self, index: BlockIndex) -> bool {
        index < MAX_BLOCKS && self.test_bit(index)
    }

    /// Number of blocks not handed out.
    pub fn free_count(&self) -> usize {
        self.bitmap
            .iter()
            .map(|byte| byte.count_zeros() as usize)
            .sum()
    }

    /// Indices of every allocated block, ascending.
    pub fn allocated_indices(&self) -> Vec<BlockIndex> {
        (0..MAX_BLOCKS).filter(|&i| self.test_bit(i)).collect()
    }

    /// Allocate `n` blocks, lowest free indices first.
    ///
    /// Either all `n` blocks are committed or none are: the free count is
    /// checked before any bit is set.
    pub fn try_allocate(&mut self, n: usize) -> Result<BlockRun> {
        if n == 0 || n > MAX_ENTRY_BLOCKS {
            return Err(HistoryError::InvalidBlockCount(n));
        }
        let free = self.free_count();
        if free < n {
            return Err(HistoryError::InsufficientSpace { requested: n, free });
        }

        let mut run = BlockRun::new();
        for index in 0..MAX_BLOCKS {
            if run.len() == n {
                break;
            }
            if !self.test_bit(index) {
                self.set_bit(index);
                run.push(index)?;
            }
        }
        trace!(blocks = ?run.as_slice(), "allocated history blocks");
        Ok(run)
    }

    /// Release a block and scrub its bytes.
    pub fn free(&mut self, index: BlockIndex) -> Result<()> {
        Self::check_range(index)?;
        if !self.test_bit(index) {
            return Err(HistoryError::DoubleFree(index));
        }
        self.clear_bit(index);
        self.block_mut(index).fill(0);
        Ok(())
    }

    /// Copy up to `BLOCK_SIZE` bytes into a block.
    ///
    /// A `\n` or NUL ends the text: it and the rest of the block become NUL.
    pub fn write(&mut self, index: BlockIndex, bytes: &[u8]) -> Result<()> {
        Self::check_range(index)?;
        let block = self.block_mut(index);
        let mut terminated = false;
        for (pos, slot) in block.iter_mut().enumerate() {
            let byte = if terminated { 0 } else { bytes.get(pos).copied().unwrap_or(0) };
            if byte == b'\n' || byte == 0 {
                terminated = true;
                *slot = 0;
            } else {
                *slot = byte;
            }
        }
        Ok(())
    }

    /// Copy of the raw bytes of one block, NUL padding included.
    pub fn read(&self, index: BlockIndex) -> Result<[u8; BLOCK_SIZE]> {
        Self::check_range(index)?;
        let start = index * BLOCK_SIZE;
        let mut out = [0u8; BLOCK_SIZE];
        out.copy_from_slice(&self.blocks[start..start + BLOCK_SIZE]);
        Ok(out)
    }

    /// Bitmap as two rows of 32 bits, block 0 first.
    pub fn bitmap_dump(&self) -> String {
        let mut out = String::with_capacity(MAX_BLOCKS + 2);
        for index in 0..MAX_BLOCKS {
            if index > 0 && index % 32 == 0 {
                out.push('\n');
            }
            out.push(if self.test_bit(index) { '1' } else { '0' });
        }
        out
    }

    /// Block contents, four blocks per row, NUL shown as `.`.
    pub fn blocks_dump(&self) -> String {
        let mut out = String::new();
        for (index, block) in self.blocks.chunks(BLOCK_SIZE).enumerate() {
            if index > 0 && index % 4 == 0 {
                out.push_str("##\n");
            }
            let text: String = block
                .iter()
                .map(|&b| if b == 0 { '.' } else { b as char })
                .collect();
            let _ = write!(out, "##{text:<8}");
        }
        out.push_str("##");
        out
    }
}

impl Default for BlockArena {
    fn default() -> Self {
        Self::new()
    }
}
