//! Block encoding.
//!
//! Each category table becomes one [`BlockJob`]. Jobs are independent of each
//! other, so they can run on the Rayon pool; results are stitched back together
//! in replay order, so the produced bytes never depend on scheduling.

use std::io::Write;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::compression::Compressor;
use crate::error::{CaptureError, Result};
use crate::format::{BlockHeader, FileHeader, MetaByte, block_checksum};
use crate::ids::Category;
use crate::wire::{MAX_ENTRY_SIZE, WireEntry, codec};

/// A unit of work: one category table that knows how to serialize itself.
pub trait BlockJob: Send + Sync {
    /// Category the block is written under.
    fn category(&self) -> Category;

    /// Number of entries in the block.
    fn entry_count(&self) -> usize;

    /// Serializes every entry, in table order, into one raw payload.
    fn execute(&self) -> Result<Vec<u8>>;

    /// Returns an estimated payload size in bytes, used to presize buffers.
    fn estimated_size(&self) -> usize {
        self.entry_count() * 64
    }
}

impl std::fmt::Debug for dyn BlockJob + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BlockJob({}, entries={})",
            self.category(),
            self.entry_count()
        )
    }
}

/// Job over a borrowed table of wire records.
#[derive(Debug)]
pub struct CategoryJob<'a, T> {
    entries: &'a [T],
}

impl<'a, T: WireEntry> CategoryJob<'a, T> {
    /// Wraps a category table.
    pub fn new(entries: &'a [T]) -> Self {
        Self { entries }
    }
}

impl<T: WireEntry> BlockJob for CategoryJob<'_, T> {
    fn category(&self) -> Category {
        T::CATEGORY
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn execute(&self) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(self.estimated_size());
        for (position, entry) in self.entries.iter().enumerate() {
            let written =
                bincode::serde::encode_into_std_write(entry, &mut payload, codec()).map_err(|e| {
                    CaptureError::Serialization(format!("{} #{}: {e}", T::CATEGORY, position + 1))
                })?;
            if written > MAX_ENTRY_SIZE {
                return Err(CaptureError::Serialization(format!(
                    "{} #{}: entry encodes to {written} bytes, limit is {MAX_ENTRY_SIZE}",
                    T::CATEGORY,
                    position + 1
                )));
            }
        }
        Ok(payload)
    }
}

/// A finished block: header plus stored payload.
#[derive(Debug, Clone)]
pub struct EncodedBlock {
    /// The block header.
    pub header: BlockHeader,
    /// The payload as stored (possibly compressed).
    pub payload: Vec<u8>,
}

impl EncodedBlock {
    /// Total bytes this block occupies in the capture.
    pub fn encoded_len(&self) -> usize {
        BlockHeader::SIZE + self.payload.len()
    }
}

/// Serialization -> Compression -> Checksum for one block.
pub fn encode_block(job: &dyn BlockJob, compressor: &dyn Compressor) -> Result<EncodedBlock> {
    let category = job.category();
    let entry_count = u32::try_from(job.entry_count()).map_err(|_| {
        CaptureError::Format(format!(
            "{category} table holds {} entries, more than a block can index",
            job.entry_count()
        ))
    })?;

    let raw = job.execute()?;
    let stored = compressor.compress(&raw)?.into_owned();
    let header = BlockHeader {
        category,
        meta: MetaByte::new(compressor.id()),
        entry_count,
        stored_len: stored.len() as u64,
        raw_len: raw.len() as u64,
        checksum: block_checksum(&stored),
    };

    trace!(
        category = %category,
        entries = entry_count,
        raw = raw.len(),
        stored = stored.len(),
        "Encoded block"
    );

    Ok(EncodedBlock {
        header,
        payload: stored,
    })
}

/// Encodes one block per job and writes the complete capture to `out`.
///
/// `jobs` must hold exactly one job per category, in replay order.
pub fn write_capture<W: Write>(
    jobs: &[&dyn BlockJob],
    compressor: &dyn Compressor,
    parallel: bool,
    out: &mut W,
) -> Result<()> {
    let order_ok = jobs.len() == Category::REPLAY_ORDER.len()
        && jobs
            .iter()
            .zip(Category::REPLAY_ORDER)
            .all(|(job, category)| job.category() == category);
    if !order_ok {
        return Err(CaptureError::Internal(
            "block jobs do not match the replay order".into(),
        ));
    }

    let blocks: Vec<EncodedBlock> = if parallel {
        jobs.par_iter()
            .map(|job| encode_block(*job, compressor))
            .collect::<Result<_>>()?
    } else {
        jobs.iter()
            .map(|job| encode_block(*job, compressor))
            .collect::<Result<_>>()?
    };

    out.write_all(&FileHeader::new().to_bytes())?;
    for block in &blocks {
        out.write_all(&block.header.to_bytes())?;
        out.write_all(&block.payload)?;
    }

    debug!(
        blocks = blocks.len(),
        bytes = blocks.iter().map(EncodedBlock::encoded_len).sum::<usize>(),
        compression = compressor.name(),
        parallel,
        "Capture written"
    );
    Ok(())
}
