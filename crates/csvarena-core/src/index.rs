//! Column-name lookup table.
//!
//! A fixed number of buckets, each a singly linked chain of entries carved from
//! the arena. Inserting prepends to the chain, so when a header repeats a name
//! the right-most column wins.

use std::hash::Hasher;

use rustc_hash::FxHasher;

use crate::arena::{AllocError, Arena};
use crate::span::TextSpan;

pub const BUCKETS: usize = 16;

#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    key: TextSpan<'a>,
    ordinal: usize,
    next: Option<&'a Entry<'a>>,
}

/// Maps a column name to its ordinal position. Lookups are case-sensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnIndex<'a> {
    buckets: [Option<&'a Entry<'a>>; BUCKETS],
    len: usize,
}

/// FxHash is unseeded, so bucket placement is identical across runs.
fn bucket_of(key: &[u8]) -> usize {
    let mut hasher = FxHasher::default();
    hasher.write(key);
    (hasher.finish() % BUCKETS as u64) as usize
}

impl<'a> ColumnIndex<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name -> ordinal`. Never fails on duplicates: the newest entry
    /// shadows older ones with the same name.
    pub fn insert(
        &mut self,
        arena: &'a Arena,
        name: TextSpan<'a>,
        ordinal: usize,
    ) -> Result<(), AllocError> {
        let bucket = bucket_of(name.as_bytes());
        let entry = arena.alloc(Entry {
            key: name,
            ordinal,
            next: self.buckets[bucket],
        })?;
        self.buckets[bucket] = Some(entry);
        self.len += 1;
        Ok(())
    }

    pub fn lookup(&self, name: &[u8]) -> Option<usize> {
        let mut cursor = self.buckets[bucket_of(name)];
        while let Some(entry) = cursor {
            if entry.key.as_bytes() == name {
                return Some(entry.ordinal);
            }
            cursor = entry.next;
        }
        None
    }

    /// Number of inserted entries, duplicates included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the longest bucket chain
    pub fn max_chain_len(&self) -> usize {
        self.buckets
            .iter()
            .map(|head| {
                let mut len = 0;
                let mut cursor = *head;
                while let Some(entry) = cursor {
                    len += 1;
                    cursor = entry.next;
                }
                len
            })
            .max()
            .unwrap_or(0)
    }
}
