//! Pluggable block compression.
//!
//! Every category block is compressed independently. The algorithm ID is
//! stored in the block's [`MetaByte`](crate::format::MetaByte), together with
//! the uncompressed length in the block header, so decompression never has to
//! guess an output size.

use std::borrow::Cow;

use crate::error::{CaptureError, Result};

/// Interface for compression algorithms.
///
/// Each compressor is identified by an ID in `0..8`; `0` is reserved for
/// [`NoCompression`].
pub trait Compressor: Send + Sync + std::fmt::Debug {
    /// The ID stored in the block `MetaByte`.
    fn id(&self) -> u8;

    /// Short human readable name, used by the inspector.
    fn name(&self) -> &'static str;

    /// Compresses a block payload.
    fn compress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>>;

    /// Restores a payload whose uncompressed length is `raw_len`.
    fn decompress<'a>(&self, data: &'a [u8], raw_len: usize) -> Result<Cow<'a, [u8]>>;
}

/// Pass-through strategy (ID 0).
#[derive(Debug, Clone, Copy)]
pub struct NoCompression;

impl Compressor for NoCompression {
    fn id(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "None"
    }

    fn compress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(data))
    }

    fn decompress<'a>(&self, data: &'a [u8], raw_len: usize) -> Result<Cow<'a, [u8]>> {
        if data.len() != raw_len {
            return Err(CaptureError::Compression(format!(
                "uncompressed block holds {} bytes, header declares {raw_len}",
                data.len()
            )));
        }
        Ok(Cow::Borrowed(data))
    }
}

/// Upper bound on how much an LZ4 block can expand.
#[cfg(feature = "lz4_flex")]
const LZ4_MAX_EXPANSION: usize = 255;

#[cfg(feature = "lz4_flex")]
/// LZ4 block compression (ID 1), available with the `lz4_flex` feature.
#[derive(Debug, Clone, Copy)]
pub struct Lz4Compressor;

#[cfg(feature = "lz4_flex")]
impl Compressor for Lz4Compressor {
    fn id(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "LZ4"
    }

    fn compress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Owned(lz4_flex::block::compress(data)))
    }

    fn decompress<'a>(&self, data: &'a [u8], raw_len: usize) -> Result<Cow<'a, [u8]>> {
        let bound = data.len().saturating_mul(LZ4_MAX_EXPANSION);
        if raw_len > bound {
            return Err(CaptureError::Compression(format!(
                "LZ4 block of {} bytes cannot restore to {raw_len} bytes",
                data.len()
            )));
        }
        let restored = lz4_flex::block::decompress(data, raw_len)
            .map_err(|e| CaptureError::Compression(e.to_string()))?;
        if restored.len() != raw_len {
            return Err(CaptureError::Compression(format!(
                "LZ4 block restored {} bytes, header declares {raw_len}",
                restored.len()
            )));
        }
        Ok(Cow::Owned(restored))
    }
}

/// Maps the IDs found in block headers to compressor implementations.
#[derive(Debug)]
pub struct CompressorRegistry {
    algorithms: Vec<Option<Box<dyn Compressor>>>,
}

impl CompressorRegistry {
    /// Creates a registry with the built-in algorithms.
    ///
    /// *   ID 0: `NoCompression`
    /// *   ID 1: `Lz4Compressor` (if `lz4_flex` feature is enabled)
    pub fn new() -> Self {
        let mut reg = Self {
            algorithms: (0..8).map(|_| None).collect(),
        };

        reg.register(Box::new(NoCompression));

        #[cfg(feature = "lz4_flex")]
        reg.register(Box::new(Lz4Compressor));

        reg
    }

    /// Registers a compressor under its own ID, replacing any previous one.
    pub fn register(&mut self, algo: Box<dyn Compressor>) {
        let id = usize::from(algo.id());
        if id >= self.algorithms.len() {
            self.algorithms.resize_with(id + 1, || None);
        }
        if let Some(slot) = self.algorithms.get_mut(id) {
            *slot = Some(algo);
        }
    }

    /// Retrieves a compressor by its ID.
    ///
    /// # Errors
    /// Returns `CaptureError::Compression` if the ID is not registered.
    pub fn get(&self, id: u8) -> Result<&dyn Compressor> {
        if let Some(algo) = self
            .algorithms
            .get(usize::from(id))
            .and_then(|opt| opt.as_ref())
        {
            return Ok(algo.as_ref());
        }

        Err(CaptureError::Compression(format!(
            "Algorithm ID {id} is not registered or available"
        )))
    }

    /// The compressor used when compression is requested: LZ4 if built in,
    /// otherwise pass-through.
    pub fn preferred(&self, compress: bool) -> &dyn Compressor {
        let wanted = if compress { 1 } else { 0 };
        self.get(wanted)
            .or_else(|_| self.get(0))
            .unwrap_or(&NoCompression)
    }
}

impl Default for CompressorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
