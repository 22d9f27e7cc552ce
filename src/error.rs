//! Centralized error handling for capture and replay.
//!
//! Every failure is reported through [`CaptureError`]; the library never
//! panics on malformed input. Errors raised while processing a specific object
//! name the category, the 1-based index and, where one applies, the field, so
//! a caller can correlate the failure with the offending source data.
//!
//! ## Error Categories
//!
//! - **Structural** ([`CaptureError::Structural`]): a required value is missing
//!   or has the wrong encoding.
//! - **Referential** ([`CaptureError::Reference`]): an index points outside the
//!   table it addresses, or forward into entries not yet replayed.
//! - **Resource** ([`CaptureError::Allocation`]): the scratch arena could not
//!   obtain memory. Fatal to the whole operation.
//! - **Interface** ([`CaptureError::Interface`]): the caller's creation callback
//!   rejected an object or never produced its handle.
//! - **Misuse** ([`CaptureError::UnknownHandle`]): a create-info handed to the
//!   recorder embeds a handle that was never bound to a recorded index.
//!
//! Container-level problems (bad magic, truncated blocks, checksum mismatch)
//! surface as [`CaptureError::Format`]; codec failures as
//! [`CaptureError::Serialization`] or [`CaptureError::Compression`].
//!
//! ```rust
//! use psocapture::{CaptureError, StateReplayer, StateCreatorInterface};
//!
//! fn replay(blob: &[u8], iface: &mut dyn StateCreatorInterface) {
//!     let mut replayer = StateReplayer::new();
//!     match replayer.parse(iface, blob) {
//!         Ok(()) => {}
//!         Err(CaptureError::Reference { category, index, field, .. }) => {
//!             eprintln!("{category} #{index} has a dangling `{field}`");
//!         }
//!         Err(e) => eprintln!("replay failed: {e}"),
//!     }
//! }
//! ```

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::ids::Category;

/// A specialized `Result` type for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// The master error enum covering all failure domains.
///
/// The type is `Clone`; I/O errors are wrapped in an `Arc` for that purpose.
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Low-level I/O failure.
    Io(Arc<io::Error>),

    /// bincode could not encode a wire entry.
    Serialization(String),

    /// A block could not be compressed or decompressed.
    Compression(String),

    /// The container is invalid: wrong magic, unsupported version, truncated
    /// or duplicated blocks, checksum mismatch, trailing bytes.
    Format(String),

    /// An entry is malformed: a required value is absent or has the wrong
    /// encoding.
    Structural {
        /// Category of the offending entry.
        category: Category,
        /// 1-based index of the offending entry.
        index: u32,
        /// Field (or sub-structure) that failed to decode or validate.
        field: &'static str,
        /// Description of the violation.
        reason: String,
    },

    /// A reference field holds an index that cannot be resolved.
    Reference {
        /// Category of the entry holding the reference.
        category: Category,
        /// 1-based index of the entry holding the reference.
        index: u32,
        /// Name of the reference field.
        field: &'static str,
        /// Category the reference points into.
        target: Category,
        /// The offending 1-based value.
        value: u32,
        /// Number of entries of `target` available at resolution time.
        available: usize,
    },

    /// The recorder was handed a create-info embedding a handle that was never
    /// bound with the matching `set_*_handle` call.
    UnknownHandle {
        /// Category of the create-info being registered or hashed.
        category: Category,
        /// Name of the field carrying the handle.
        field: &'static str,
        /// Category the handle belongs to.
        target: Category,
        /// The raw handle value.
        handle: u64,
    },

    /// The scratch arena failed to allocate.
    Allocation {
        /// Number of bytes requested.
        requested: usize,
    },

    /// The caller-supplied creation interface reported a failure.
    Interface {
        /// Category being replayed.
        category: Category,
        /// 1-based index of the object, if the failure concerns one object.
        index: Option<u32>,
        /// Description of the failure.
        reason: String,
    },

    /// A logic error inside the library. Should not occur; please report.
    Internal(String),
}

impl CaptureError {
    pub(crate) fn structural(
        category: Category,
        index: u32,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Structural {
            category,
            index,
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn interface(
        category: Category,
        index: Option<u32>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Interface {
            category,
            index,
            reason: reason.into(),
        }
    }

    /// The category the error is attributed to, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Structural { category, .. }
            | Self::Reference { category, .. }
            | Self::UnknownHandle { category, .. }
            | Self::Interface { category, .. } => Some(*category),
            _ => None,
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O Error: {e}"),
            Self::Serialization(s) => write!(f, "Serialization Error: {s}"),
            Self::Compression(s) => write!(f, "Compression Error: {s}"),
            Self::Format(s) => write!(f, "Format Error: {s}"),
            Self::Structural {
                category,
                index,
                field,
                reason,
            } => write!(f, "Structural Error: {category} #{index}, field `{field}`: {reason}"),
            Self::Reference {
                category,
                index,
                field,
                target,
                value,
                available,
            } => write!(
                f,
                "Reference Error: {category} #{index}, field `{field}` refers to {target} #{value} \
                 but only {available} are available"
            ),
            Self::UnknownHandle {
                category,
                field,
                target,
                handle,
            } => write!(
                f,
                "Unknown Handle: {category} field `{field}` holds {target} handle {handle:#x} \
                 which was never bound to a recorded index"
            ),
            Self::Allocation { requested } => {
                write!(f, "Allocation Error: scratch arena could not provide {requested} bytes")
            }
            Self::Interface {
                category,
                index: Some(index),
                reason,
            } => write!(f, "Interface Error: {category} #{index}: {reason}"),
            Self::Interface {
                category,
                index: None,
                reason,
            } => write!(f, "Interface Error: {category}: {reason}"),
            Self::Internal(s) => write!(f, "Internal Logic Error: {s}"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
