//! Opaque native object handles.
//!
//! Handles are only meaningful within one runtime session. They are never
//! written to a capture; the recorder translates them to category indices and
//! the replayer translates indices back to whatever handles the caller's
//! [`StateCreatorInterface`](crate::StateCreatorInterface) produced.

use std::fmt;
use std::num::NonZeroU64;

/// Common behaviour of every native handle type.
pub trait NativeHandle: Copy + Eq + std::hash::Hash + fmt::Debug + Send + Sync + 'static {
    /// Wraps a raw handle value. `0` is the null handle and yields `None`.
    fn from_raw(raw: u64) -> Option<Self>;

    /// The raw handle value.
    fn as_raw(self) -> u64;
}

macro_rules! native_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Wraps a raw handle value. `0` is the null handle and yields `None`.
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// The raw handle value.
            pub fn as_raw(self) -> u64 {
                self.0.get()
            }
        }

        impl NativeHandle for $name {
            fn from_raw(raw: u64) -> Option<Self> {
                $name::from_raw(raw)
            }

            fn as_raw(self) -> u64 {
                $name::as_raw(self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:#x})"), self.0.get())
            }
        }
    };
}

native_handle!(
    /// Handle of a created sampler.
    Sampler
);
native_handle!(
    /// Handle of a created descriptor-set layout.
    DescriptorSetLayout
);
native_handle!(
    /// Handle of a created pipeline layout.
    PipelineLayout
);
native_handle!(
    /// Handle of a created shader module.
    ShaderModule
);
native_handle!(
    /// Handle of a created render pass.
    RenderPass
);
native_handle!(
    /// Handle of a created pipeline, graphics or compute.
    Pipeline
);
