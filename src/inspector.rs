// src/inspector.rs

//! Tools for inspecting the physical structure of captures.
//! Useful for debugging deduplication and verifying recorder output.

use std::fmt;

use serde::Serialize;

use crate::compression::CompressorRegistry;
use crate::error::Result;
use crate::hasher::Hash;
use crate::ids::Category;
use crate::reader::{BlobReader, BlockView};
use crate::wire::{
    WireComputePipeline, WireDescriptorSetLayout, WireEntry, WireGraphicsPipeline,
    WirePipelineLayout, WireRenderPass, WireSampler, WireShaderModule,
};

/// A structural report of a capture.
#[derive(Debug, Serialize)]
pub struct DebugReport {
    /// Total size of the capture in bytes.
    pub total_size: u64,
    /// Format version.
    pub version: u16,
    /// One entry per category block, in replay order.
    pub blocks: Vec<BlockInfo>,
}

/// Metadata for a single category block.
#[derive(Debug, Serialize)]
pub struct BlockInfo {
    /// Category name.
    pub category: &'static str,
    /// Absolute offset of the block header.
    pub offset: u64,
    /// Number of entries.
    pub entry_count: u32,
    /// Payload size as stored.
    pub stored_size: u64,
    /// Payload size after decompression.
    pub raw_size: u64,
    /// Compression algorithm used.
    pub compression_algo: String,
    /// Stored checksum of the payload.
    pub checksum: u64,
    /// Content hash of every entry, in index order.
    pub entry_hashes: Vec<Hash>,
}

/// The capture inspector.
#[derive(Debug)]
pub struct CaptureInspector;

impl CaptureInspector {
    /// Validates a capture and returns a structural report.
    ///
    /// Checksums are always verified and every entry is decoded, so a report
    /// is only produced for a capture the replayer would accept structurally.
    pub fn inspect_bytes(bytes: &[u8]) -> Result<DebugReport> {
        let reader = BlobReader::new(bytes)?;
        let registry = CompressorRegistry::new();

        let blocks = reader
            .blocks()
            .iter()
            .map(|block| Self::inspect_block(&registry, block))
            .collect::<Result<Vec<_>>>()?;

        Ok(DebugReport {
            total_size: reader.total_len() as u64,
            version: reader.header().version,
            blocks,
        })
    }

    fn inspect_block(registry: &CompressorRegistry, block: &BlockView<'_>) -> Result<BlockInfo> {
        let header = block.header();
        let algo_id = header.meta.compression_method();
        let compression_algo = match registry.get(algo_id) {
            Ok(c) => c.name().to_string(),
            Err(_) => format!("Unknown({algo_id})"),
        };

        let payload = block.payload(registry, true)?;
        let entry_hashes = match block.category() {
            Category::Sampler => Self::hashes::<WireSampler>(block, &payload)?,
            Category::DescriptorSetLayout => {
                Self::hashes::<WireDescriptorSetLayout>(block, &payload)?
            }
            Category::PipelineLayout => Self::hashes::<WirePipelineLayout>(block, &payload)?,
            Category::ShaderModule => Self::hashes::<WireShaderModule>(block, &payload)?,
            Category::RenderPass => Self::hashes::<WireRenderPass>(block, &payload)?,
            Category::ComputePipeline => Self::hashes::<WireComputePipeline>(block, &payload)?,
            Category::GraphicsPipeline => Self::hashes::<WireGraphicsPipeline>(block, &payload)?,
        };

        Ok(BlockInfo {
            category: block.category().name(),
            offset: block.offset() as u64,
            entry_count: block.entry_count(),
            stored_size: header.stored_len,
            raw_size: header.raw_len,
            compression_algo,
            checksum: header.checksum,
            entry_hashes,
        })
    }

    fn hashes<T: WireEntry>(block: &BlockView<'_>, payload: &[u8]) -> Result<Vec<Hash>> {
        block
            .entries::<T>(payload)?
            .map(|entry| entry.map(|e| e.hash()))
            .collect()
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== CAPTURE INSPECTOR REPORT ===")?;
        writeln!(f, "Total Size:     {}b", self.total_size)?;
        writeln!(f, "Version:        {}", self.version)?;
        writeln!(f, "\n[BLOCK LAYOUT]")?;
        for (i, block) in self.blocks.iter().enumerate() {
            block.fmt_tree(f, "", i + 1 == self.blocks.len())?;
        }
        Ok(())
    }
}

impl BlockInfo {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, prefix: &str, is_last: bool) -> fmt::Result {
        let connector = if is_last { "└── " } else { "├── " };
        let child_prefix = if is_last { "    " } else { "│   " };

        writeln!(
            f,
            "{prefix}{connector}[{}] @{} | Entries: {} | Size: {}b ({}b raw) | Algo: {} | Checksum: {:#018x}",
            self.category,
            self.offset,
            self.entry_count,
            self.stored_size,
            self.raw_size,
            self.compression_algo,
            self.checksum,
        )?;

        for (i, hash) in self.entry_hashes.iter().enumerate() {
            let connector = if i + 1 == self.entry_hashes.len() {
                "└── "
            } else {
                "├── "
            };
            writeln!(f, "{prefix}{child_prefix}{connector}#{} {hash:#018x}", i + 1)?;
        }
        Ok(())
    }
}
