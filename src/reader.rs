//! The Read-Side Engine.
//!
//! Validates the container structure of a capture held in memory and provides
//! per-category access to block payloads and their decoded entries. Nothing
//! here is replay-specific; the inspector walks captures through the same
//! views.

use std::borrow::Cow;
use std::marker::PhantomData;

use crate::compression::CompressorRegistry;
use crate::error::{CaptureError, Result};
use crate::format::{BlockHeader, FILE_HEADER_SIZE, FileHeader, block_checksum};
use crate::ids::Category;
use crate::wire::{WireEntry, decode_codec};

/// A validated capture: the file header plus one view per category.
#[derive(Debug)]
pub struct BlobReader<'a> {
    header: FileHeader,
    blocks: Vec<BlockView<'a>>,
    total_len: usize,
}

/// A view into one category block. Borrows the capture; owns nothing.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    header: BlockHeader,
    offset: usize,
    stored: &'a [u8],
}

impl<'a> BlobReader<'a> {
    /// Parses the header and walks every block header.
    ///
    /// The capture must contain exactly one block per category, in replay
    /// order, with no bytes after the last block.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let header = FileHeader::from_bytes(bytes)?;
        let mut cursor = FILE_HEADER_SIZE;
        let mut blocks = Vec::with_capacity(Category::REPLAY_ORDER.len());

        for expected in Category::REPLAY_ORDER {
            let rest = bytes.get(cursor..).unwrap_or_default();
            let block = BlockHeader::from_bytes(rest).map_err(|e| match e {
                CaptureError::Format(reason) => {
                    CaptureError::Format(format!("{expected} block at offset {cursor}: {reason}"))
                }
                other => other,
            })?;

            if block.category != expected {
                return Err(CaptureError::Format(format!(
                    "expected the {expected} block at offset {cursor}, found {}",
                    block.category
                )));
            }

            let start = cursor + BlockHeader::SIZE;
            let end = usize::try_from(block.stored_len)
                .ok()
                .and_then(|len| start.checked_add(len))
                .filter(|&end| end <= bytes.len())
                .ok_or_else(|| {
                    CaptureError::Format(format!(
                        "{expected} block declares {} payload bytes but only {} remain",
                        block.stored_len,
                        bytes.len().saturating_sub(start)
                    ))
                })?;

            blocks.push(BlockView {
                header: block,
                offset: cursor,
                stored: bytes.get(start..end).unwrap_or_default(),
            });
            cursor = end;
        }

        if cursor != bytes.len() {
            return Err(CaptureError::Format(format!(
                "{} trailing bytes after the last block",
                bytes.len() - cursor
            )));
        }

        Ok(Self {
            header,
            blocks,
            total_len: bytes.len(),
        })
    }

    /// The parsed file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Total size of the capture in bytes.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// The block holding `category`.
    pub fn block(&self, category: Category) -> Result<&BlockView<'a>> {
        self.blocks
            .get(category.position())
            .ok_or_else(|| CaptureError::Internal(format!("missing view for the {category} block")))
    }

    /// All blocks, in replay order.
    pub fn blocks(&self) -> &[BlockView<'a>] {
        &self.blocks
    }
}

impl<'a> BlockView<'a> {
    /// The block header.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Category of the block.
    pub fn category(&self) -> Category {
        self.header.category
    }

    /// Number of entries declared by the header.
    pub fn entry_count(&self) -> u32 {
        self.header.entry_count
    }

    /// Absolute offset of the block header within the capture.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The payload as stored.
    pub fn stored(&self) -> &'a [u8] {
        self.stored
    }

    /// Checks the stored payload against the header checksum.
    pub fn verify(&self) -> Result<()> {
        let actual = block_checksum(self.stored);
        if actual != self.header.checksum {
            return Err(CaptureError::Format(format!(
                "{} block checksum mismatch: stored {:#018x}, computed {actual:#018x}",
                self.category(),
                self.header.checksum
            )));
        }
        Ok(())
    }

    /// Returns the decompressed payload, optionally verifying the checksum
    /// first.
    pub fn payload(&self, registry: &CompressorRegistry, verify: bool) -> Result<Cow<'a, [u8]>> {
        if verify {
            self.verify()?;
        }
        let raw_len = usize::try_from(self.header.raw_len).map_err(|_| {
            CaptureError::Format(format!(
                "{} block raw length {} exceeds the address space",
                self.category(),
                self.header.raw_len
            ))
        })?;
        let compressor = registry.get(self.header.meta.compression_method())?;
        compressor.decompress(self.stored, raw_len)
    }

    /// Iterates the entries of a decompressed payload.
    ///
    /// # Errors
    /// The iterator yields a [`CaptureError::Structural`] naming the entry
    /// that failed to decode, and a [`CaptureError::Format`] if bytes remain
    /// once every declared entry has been read.
    pub fn entries<'p, T: WireEntry>(&self, payload: &'p [u8]) -> Result<EntryIter<'p, T>> {
        if T::CATEGORY != self.category() {
            return Err(CaptureError::Internal(format!(
                "decoding {} entries from the {} block",
                T::CATEGORY,
                self.category()
            )));
        }
        Ok(EntryIter {
            payload,
            cursor: 0,
            position: 0,
            count: self.header.entry_count,
            finished: false,
            _entry: PhantomData,
        })
    }
}

/// Streaming decoder over one block's entries.
#[derive(Debug)]
pub struct EntryIter<'p, T> {
    payload: &'p [u8],
    cursor: usize,
    position: u32,
    count: u32,
    finished: bool,
    _entry: PhantomData<fn() -> T>,
}

impl<T: WireEntry> Iterator for EntryIter<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if self.position == self.count {
            self.finished = true;
            let trailing = self.payload.len() - self.cursor;
            return (trailing != 0).then(|| {
                Err(CaptureError::Format(format!(
                    "{} block has {trailing} bytes after its {} entries",
                    T::CATEGORY,
                    self.count
                )))
            });
        }

        let index = self.position + 1;
        let rest = self.payload.get(self.cursor..).unwrap_or_default();
        match bincode::serde::decode_from_slice::<T, _>(rest, decode_codec()) {
            Ok((entry, read)) => {
                self.cursor += read;
                self.position = index;
                Some(Ok(entry))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(CaptureError::structural(
                    T::CATEGORY,
                    index,
                    "entry",
                    e.to_string(),
                )))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let remaining = (self.count - self.position) as usize;
        (remaining, Some(remaining + 1))
    }
}
