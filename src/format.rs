//! Defines the physical binary layout of a capture.
//!
//! # Layout
//! A capture is a fixed 16-byte header followed by exactly one block per
//! category, in replay order.
//!
//! File: `[FileHeader] [Block 1] ... [Block 7]`
//!
//! ## Block Anatomy
//! Each block is self-delimiting:
//! `[ BlockHeader (30 bytes) ] [ Payload (stored_len bytes) ]`
//!
//! All integers are little-endian.

use std::hash::Hasher as _;

use twox_hash::XxHash64;

use crate::constants::FORMAT_VERSION;
use crate::error::{CaptureError, Result};
use crate::ids::Category;

/// Magic bytes identifying the container: "PSOCAPT\0".
pub const MAGIC_BYTES: [u8; 8] = *b"PSOCAPT\0";

/// Variant tag of the binary encoding: "BIN\0".
pub const VARIANT_BINARY: [u8; 4] = *b"BIN\0";

/// The fixed size of the file header.
/// Magic(8) + Variant(4) + Version(2) + Flags(1) + Reserved(1) = 16
pub const FILE_HEADER_SIZE: usize = 16;

/// Configuration flags for a block, stored right after its category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaByte(u8);

impl MetaByte {
    const COMPRESSION_MASK: u8 = 0b0000_0111; // Bits 0-2
    const RESERVED_MASK: u8 = !Self::COMPRESSION_MASK;

    /// Creates a MetaByte for the given compression algorithm ID (0-7).
    pub fn new(compression_id: u8) -> Self {
        Self(compression_id & Self::COMPRESSION_MASK)
    }

    /// Decodes the byte, rejecting reserved bits.
    pub fn from_byte(byte: u8) -> Result<Self> {
        if byte & Self::RESERVED_MASK != 0 {
            return Err(CaptureError::Format(format!(
                "block meta byte {byte:#04x} sets reserved bits"
            )));
        }
        Ok(Self(byte))
    }

    /// Returns the compression algorithm ID (0-7).
    pub fn compression_method(&self) -> u8 {
        self.0 & Self::COMPRESSION_MASK
    }

    /// Returns the raw byte representation.
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

/// XxHash64 (seed 0) of a stored block payload.
pub fn block_checksum(payload: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(payload);
    hasher.finish()
}

/// Reads `N` bytes at `at`. Callers check the total length first.
fn array_at<const N: usize>(bytes: &[u8], at: usize) -> Result<[u8; N]> {
    bytes
        .get(at..at + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| CaptureError::Format("unexpected end of header".into()))
}

/// The header opening every capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Container magic.
    pub magic: [u8; 8],
    /// Encoding variant.
    pub variant: [u8; 4],
    /// Schema version.
    pub version: u16,
    /// Header flags. No flag is currently defined.
    pub flags: u8,
}

impl FileHeader {
    /// Creates a header for the current schema version.
    pub fn new() -> Self {
        Self {
            magic: MAGIC_BYTES,
            variant: VARIANT_BINARY,
            version: FORMAT_VERSION,
            flags: 0,
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.magic);
        buf[8..12].copy_from_slice(&self.variant);
        buf[12..14].copy_from_slice(&self.version.to_le_bytes());
        buf[14] = self.flags;
        buf
    }

    /// Parses and validates a header.
    ///
    /// Wrong magic, an unknown variant, another schema version, or any
    /// flag or reserved bit set is a [`CaptureError::Format`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(CaptureError::Format(format!(
                "buffer of {} bytes is smaller than the {FILE_HEADER_SIZE}-byte header",
                bytes.len()
            )));
        }

        let magic: [u8; 8] = array_at(bytes, 0)?;
        if magic != MAGIC_BYTES {
            return Err(CaptureError::Format("Invalid Magic Bytes".into()));
        }

        let variant: [u8; 4] = array_at(bytes, 8)?;
        if variant != VARIANT_BINARY {
            return Err(CaptureError::Format(format!(
                "Unsupported encoding variant: {:?}",
                String::from_utf8_lossy(&variant)
            )));
        }

        let version = u16::from_le_bytes(array_at(bytes, 12)?);
        if version != FORMAT_VERSION {
            return Err(CaptureError::Format(format!("Unsupported version: {version}")));
        }

        let [flags, reserved] = array_at::<2>(bytes, 14)?;
        if flags != 0 || reserved != 0 {
            return Err(CaptureError::Format(format!(
                "Unknown header flags {flags:#04x}/{reserved:#04x}"
            )));
        }

        Ok(Self {
            magic,
            variant,
            version,
            flags,
        })
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed-size prefix of a category block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Category of every entry in the block.
    pub category: Category,
    /// Compression settings.
    pub meta: MetaByte,
    /// Number of entries.
    pub entry_count: u32,
    /// Payload length as stored (after compression).
    pub stored_len: u64,
    /// Payload length once decompressed.
    pub raw_len: u64,
    /// XxHash64 of the stored payload.
    pub checksum: u64,
}

impl BlockHeader {
    /// The size in bytes of a serialized block header.
    /// Category(1) + Meta(1) + Entries(4) + Stored(8) + Raw(8) + Checksum(8) = 30
    pub const SIZE: usize = 30;

    /// Serializes to a fixed-size byte array.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.category.tag();
        buf[1] = self.meta.as_u8();
        buf[2..6].copy_from_slice(&self.entry_count.to_le_bytes());
        buf[6..14].copy_from_slice(&self.stored_len.to_le_bytes());
        buf[14..22].copy_from_slice(&self.raw_len.to_le_bytes());
        buf[22..30].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserializes from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(CaptureError::Format(format!(
                "truncated block header: {} of {} bytes",
                bytes.len(),
                Self::SIZE
            )));
        }
        let [tag, meta] = array_at::<2>(bytes, 0)?;
        let category = Category::from_tag(tag)
            .ok_or_else(|| CaptureError::Format(format!("Unknown category tag {tag}")))?;
        Ok(Self {
            category,
            meta: MetaByte::from_byte(meta)?,
            entry_count: u32::from_le_bytes(array_at(bytes, 2)?),
            stored_len: u64::from_le_bytes(array_at(bytes, 6)?),
            raw_len: u64::from_le_bytes(array_at(bytes, 14)?),
            checksum: u64::from_le_bytes(array_at(bytes, 22)?),
        })
    }
}
