//! # psocapture
//!
//! Content-addressed capture and replay of graphics pipeline state.
//!
//! ## Overview
//!
//! An application that builds pipelines at runtime pays for shader compilation and
//! pipeline linking on every launch. `psocapture` records the complete description of
//! every object needed to recreate those pipelines (samplers, descriptor-set layouts,
//! pipeline layouts, shader modules, render passes, compute and graphics pipelines),
//! stores it as one self-describing blob, and later walks that blob to rebuild
//! equivalent objects through a caller-supplied creation interface, without the
//! original runtime context.
//!
//! ### Key Features
//!
//! *   **Content Identity:** Every recorded object carries a deterministic 64-bit
//!     [`Hash`] computed from its field values and the hashes of the objects it
//!     references, never from pointer identity.
//! *   **Typed References:** Cross-object references are 1-based indices scoped to one
//!     category ([`Index<K>`](ids::Index)). Mixing up which table an index belongs to is a
//!     compile error.
//! *   **Arena Replay:** Every nested array, string and state block rebuilt during replay
//!     lives in a [`ScratchArena`] owned by the [`StateReplayer`]. References handed to the
//!     creation interface stay valid for the whole parse.
//! *   **Deferred Creation:** The [`StateCreatorInterface`] may queue creation work on its
//!     own threads; [`wait_enqueue`](StateCreatorInterface::wait_enqueue) is the barrier the
//!     replayer calls between dependent categories.
//! *   **Parallel Encoding:** The seven category blocks are independent and can be encoded
//!     and compressed concurrently on the Rayon pool. Output is byte-identical to the
//!     sequential path.
//!
//! ## Architecture
//!
//! ```text
//! caller ──register_*──► StateRecorder ──serialize──► [Header][Block × 7]
//!                                                          │
//! caller ◄──enqueue_create_*── StateReplayer ◄──parse──────┘
//! ```
//!
//! ### File Format
//!
//! ```text
//! [FileHeader 16B] [Samplers] [Set Layouts] [Pipeline Layouts] [Shader Modules]
//! [Render Passes] [Compute Pipelines] [Graphics Pipelines]
//! ```
//!
//! Blocks appear in replay order. Each block is self-delimiting:
//! ```text
//! [Category u8] [MetaByte] [Entries u32] [Stored u64] [Raw u64] [XxHash64 u64] [Payload]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use psocapture::{
//!     Hash, HandleSlot, SamplerCreateInfo, SamplerIndex, StateCreatorInterface,
//!     StateRecorder, StateReplayer, handles::Sampler, hashing,
//! };
//!
//! # fn main() -> psocapture::Result<()> {
//! let mut recorder = StateRecorder::new();
//! let info = SamplerCreateInfo {
//!     mag_filter: 1,
//!     min_filter: 1,
//!     ..SamplerCreateInfo::default()
//! };
//! let hash = hashing::compute_hash_sampler(&info);
//! let index = recorder.register_sampler(hash, &info)?;
//! let blob = recorder.serialize()?;
//!
//! struct Creator(u64);
//! impl StateCreatorInterface for Creator {
//!     fn enqueue_create_sampler(
//!         &mut self,
//!         _hash: Hash,
//!         _index: SamplerIndex,
//!         _info: &SamplerCreateInfo,
//!         out: HandleSlot<Sampler>,
//!     ) -> bool {
//!         self.0 += 1;
//!         Sampler::from_raw(self.0).is_some_and(|h| out.set(h))
//!     }
//! }
//!
//! let mut replayer = StateReplayer::new();
//! replayer.parse(&mut Creator(0), &blob)?;
//! assert_eq!(replayer.replayed_samplers().len(), 1);
//! # let _ = index;
//! # Ok(())
//! # }
//! ```
//!
//! ### Safety and Error Handling
//!
//! * **Encapsulated Unsafe:** `unsafe` code lives only in the [`arena`] module.
//! * **No Panics:** No `unwrap()` or `panic!()` calls in the library (enforced by clippy lints).
//! * **Comprehensive Errors:** All failures correspond to a [`CaptureError`] naming the
//!   category, index and field at fault.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod arena;
pub mod compression;
pub mod config;
pub mod creator;
pub mod error;
pub mod handles;
pub mod hasher;
pub mod hashing;
pub mod ids;
pub mod info;
pub mod inspector;
pub mod recorder;
pub mod replayer;

// --- INTERNAL IMPLEMENTATION MODULES (Hidden from Docs) ---
#[doc(hidden)]
pub mod format;
#[doc(hidden)]
pub mod reader;
#[doc(hidden)]
pub mod wire;
#[doc(hidden)]
pub mod writer;

// --- RE-EXPORTS ---

#[cfg(feature = "lz4_flex")]
pub use compression::Lz4Compressor;
pub use compression::{Compressor, NoCompression};

pub use arena::ScratchArena;
pub use config::{ReplayOptions, SerializeOptions};
pub use creator::{HandleSlot, StateCreatorInterface};
pub use error::{CaptureError, Result};
pub use handles::{
    DescriptorSetLayout, NativeHandle, Pipeline, PipelineLayout, RenderPass, Sampler, ShaderModule,
};
pub use hasher::{Hash, Hasher};
pub use ids::{
    Category, ComputePipelineIndex, DescriptorSetLayoutIndex, GraphicsPipelineIndex, Index,
    PipelineLayoutIndex, RenderPassIndex, SamplerIndex, ShaderModuleIndex,
};
pub use info::*;
pub use inspector::{CaptureInspector, DebugReport};
pub use recorder::StateRecorder;
pub use replayer::StateReplayer;

/// Constants used throughout the library.
pub mod constants {
    /// Minimum size of a scratch arena block.
    pub const DEFAULT_ARENA_BLOCK_SIZE: usize = 64 * 1024;

    /// Schema version written into every capture header.
    pub const FORMAT_VERSION: u16 = 1;
}
