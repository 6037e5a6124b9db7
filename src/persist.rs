//! Binary persistence.
//!
//! A dictionary is saved as one flat little-endian file:
//!
//! ```text
//! [u32 hash_size]
//! [u32 entry_count]
//! [u32 * hash_size]        bucket heads (arena index or the nil sentinel)
//! [20 bytes * entry_count] entries, in arena order
//! ```
//!
//! There is no magic number or version field; the layout is pinned for
//! compatibility with existing dictionary files. Save writes the live arena
//! length, not its capacity. Load restores everything verbatim and reserves
//! one growth block of head-room past the entry count.
//!
//! Any short read or write fails the whole operation: a load error never
//! hands back a partially built table. Load additionally bounds-checks every
//! bucket head and chain link, so a truncated or bit-flipped file is
//! rejected as [`DictError::Corrupt`] instead of producing a table that
//! indexes out of range.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::constants::ARENA_BLOCK_ENTRIES;
use crate::dict::SignDict;
use crate::entry::Entry;
use crate::error::DictError;
use crate::slot::Slot;

fn read_u32(reader: &mut impl Read) -> Result<u32, DictError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// A slot is valid in a persisted file iff it is nil or indexes a stored entry.
fn check_slot(slot: Slot, entry_count: u32, what: &str, at: usize) -> Result<(), DictError> {
    if !slot.is_nil() && slot.raw() >= entry_count {
        return Err(DictError::corrupt(format!(
            "{} {} points at entry {} but only {} entries are stored",
            what,
            at,
            slot.raw(),
            entry_count
        )));
    }
    Ok(())
}

impl SignDict {
    /// Save the dictionary to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DictError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(&self.hash_size.to_le_bytes())?;
        writer.write_all(&(self.arena.len() as u32).to_le_bytes())?;

        for bucket in &self.buckets {
            writer.write_all(&bucket.raw().to_le_bytes())?;
        }
        for entry in &self.arena {
            writer.write_all(&entry.encode())?;
        }
        writer.flush()?;

        debug!(
            path = %path.display(),
            hash_size = self.hash_size,
            entries = self.arena.len(),
            "dictionary saved"
        );
        Ok(())
    }

    /// Load a dictionary from `path`.
    ///
    /// The file dictates the bucket count and entry count; the arena is
    /// allocated with one growth block of head-room past the stored entries.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let hash_size = read_u32(&mut reader)?;
        if hash_size == 0 {
            return Err(DictError::corrupt("zero hash size in header"));
        }
        let entry_count = read_u32(&mut reader)?;

        let mut dict = Self::create(hash_size, entry_count as usize + ARENA_BLOCK_ENTRIES)?;

        for at in 0..hash_size as usize {
            let head = Slot::from_raw(read_u32(&mut reader)?);
            check_slot(head, entry_count, "bucket", at)?;
            dict.buckets[at] = head;
        }

        let mut buf = [0u8; Entry::SIZE];
        for at in 0..entry_count as usize {
            reader.read_exact(&mut buf)?;
            let entry = Entry::decode(&buf);
            check_slot(entry.next, entry_count, "entry link", at)?;
            dict.arena.push(entry);
        }

        debug!(
            path = %path.display(),
            hash_size,
            entries = entry_count,
            "dictionary loaded"
        );
        Ok(dict)
    }
}
