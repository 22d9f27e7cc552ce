//! Options for serialization and replay.
//!
//! Both option sets are small `Copy` builders:
//!
//! ```rust
//! use psocapture::{ReplayOptions, SerializeOptions};
//!
//! let save = SerializeOptions::new().compression(true).parallel(true);
//! let load = ReplayOptions::new().arena_block_size(4096);
//! assert!(save.is_parallel());
//! assert_eq!(load.block_size(), 4096);
//! ```

use crate::constants::DEFAULT_ARENA_BLOCK_SIZE;

/// Controls how [`StateRecorder`](crate::StateRecorder) encodes a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    compression: bool,
    parallel: bool,
}

impl SerializeOptions {
    /// Uncompressed, sequential encoding.
    pub fn new() -> Self {
        Self {
            compression: false,
            parallel: false,
        }
    }

    /// Compresses each block with LZ4 when the `lz4_flex` feature is enabled.
    /// Without the feature, blocks are stored uncompressed.
    pub fn compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Encodes the seven category blocks concurrently on the Rayon pool.
    /// The produced bytes do not depend on this setting.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Whether compression was requested.
    pub fn is_compressed(&self) -> bool {
        self.compression
    }

    /// Whether parallel encoding was requested.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Controls how [`StateReplayer`](crate::StateReplayer) parses a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    arena_block_size: usize,
    verify_checksums: bool,
}

impl ReplayOptions {
    /// Default block size, checksums verified.
    pub fn new() -> Self {
        Self {
            arena_block_size: DEFAULT_ARENA_BLOCK_SIZE,
            verify_checksums: true,
        }
    }

    /// Minimum size of each scratch arena block.
    pub fn arena_block_size(mut self, bytes: usize) -> Self {
        self.arena_block_size = bytes;
        self
    }

    /// Whether block checksums are checked before decoding.
    pub fn verify_checksums(mut self, enabled: bool) -> Self {
        self.verify_checksums = enabled;
        self
    }

    /// The configured arena block size.
    pub fn block_size(&self) -> usize {
        self.arena_block_size
    }

    /// Whether checksums will be verified.
    pub fn checks_integrity(&self) -> bool {
        self.verify_checksums
    }
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self::new()
    }
}
