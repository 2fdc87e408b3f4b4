//! The weak-sum hash index.
//!
//! An open-addressed bucket array sized to at least twice the block count
//! (rounded up to a power of two, so the modulo is a mask) maps a weak sum
//! to the first block that has it. Blocks sharing a weak sum are linked
//! through a parallel `next` array in ascending block order, which is what
//! gives lookups their lowest-index-wins result.

use crate::sumset::BlockSig;

const EMPTY: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub(crate) struct BlockIndex {
    mask: usize,
    buckets: Vec<u32>,
    next: Vec<u32>,
}

impl BlockIndex {
    pub(crate) fn build(blocks: &[BlockSig]) -> Self {
        debug_assert!(blocks.len() < EMPTY as usize);

        let capacity = (blocks.len() * 2).next_power_of_two();
        let mut index = Self {
            mask: capacity - 1,
            buckets: vec![EMPTY; capacity],
            next: vec![EMPTY; blocks.len()],
        };
        for i in 0..blocks.len() {
            index.insert(blocks, i as u32);
        }
        index
    }

    fn insert(&mut self, blocks: &[BlockSig], block: u32) {
        let weak = blocks[block as usize].weak();
        let mut slot = weak as usize & self.mask;
        loop {
            let head = self.buckets[slot];
            if head == EMPTY {
                self.buckets[slot] = block;
                return;
            }
            if blocks[head as usize].weak() == weak {
                // chain in insertion order so the earliest block stays first
                let mut tail = head;
                while self.next[tail as usize] != EMPTY {
                    tail = self.next[tail as usize];
                }
                self.next[tail as usize] = block;
                return;
            }
            slot = (slot + 1) & self.mask;
        }
    }

    /// First block carrying `weak`, if any.
    pub(crate) fn chain_head(&self, blocks: &[BlockSig], weak: u32) -> Option<u32> {
        let mut slot = weak as usize & self.mask;
        loop {
            let head = self.buckets[slot];
            if head == EMPTY {
                return None;
            }
            if blocks[head as usize].weak() == weak {
                return Some(head);
            }
            slot = (slot + 1) & self.mask;
        }
    }

    /// Next block in the same weak-sum chain.
    pub(crate) fn chain_next(&self, block: u32) -> Option<u32> {
        match self.next[block as usize] {
            EMPTY => None,
            next => Some(next),
        }
    }
}
