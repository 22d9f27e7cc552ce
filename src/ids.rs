//! Object categories and their strongly typed, 1-based table indices.
//!
//! Every cross-reference in a capture is an index scoped to one category.
//! On the wire the index is a plain `u32` where `0` means "none"; in memory it
//! is an [`Index<K>`] whose marker type `K` names the category, so a pipeline
//! layout index can never be used to look up a render pass.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::num::NonZeroU32;

use crate::handles::{
    DescriptorSetLayout, NativeHandle, Pipeline, PipelineLayout, RenderPass, Sampler, ShaderModule,
};

/// One of the seven object kinds tracked by a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Sampler objects.
    Sampler,
    /// Descriptor-set layouts.
    DescriptorSetLayout,
    /// Pipeline layouts.
    PipelineLayout,
    /// Shader modules.
    ShaderModule,
    /// Render passes.
    RenderPass,
    /// Compute pipelines.
    ComputePipeline,
    /// Graphics pipelines.
    GraphicsPipeline,
}

impl Category {
    /// The mandatory replay order. Later categories reference earlier ones.
    /// This is also the order in which blocks appear in a capture.
    pub const REPLAY_ORDER: [Category; 7] = [
        Category::Sampler,
        Category::DescriptorSetLayout,
        Category::PipelineLayout,
        Category::ShaderModule,
        Category::RenderPass,
        Category::ComputePipeline,
        Category::GraphicsPipeline,
    ];

    /// Tag byte written in the block header.
    pub fn tag(self) -> u8 {
        match self {
            Self::Sampler => 1,
            Self::DescriptorSetLayout => 2,
            Self::PipelineLayout => 3,
            Self::ShaderModule => 4,
            Self::RenderPass => 5,
            Self::ComputePipeline => 6,
            Self::GraphicsPipeline => 7,
        }
    }

    /// Decodes a block header tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::REPLAY_ORDER.into_iter().find(|c| c.tag() == tag)
    }

    /// Position of this category in [`Category::REPLAY_ORDER`].
    pub fn position(self) -> usize {
        usize::from(self.tag() - 1)
    }

    /// Human readable name, used in diagnostics and inspector reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sampler => "sampler",
            Self::DescriptorSetLayout => "descriptor set layout",
            Self::PipelineLayout => "pipeline layout",
            Self::ShaderModule => "shader module",
            Self::RenderPass => "render pass",
            Self::ComputePipeline => "compute pipeline",
            Self::GraphicsPipeline => "graphics pipeline",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-level tag tying an [`Index`] to its category and native handle type.
pub trait CategoryKind: 'static {
    /// The runtime category this marker stands for.
    const CATEGORY: Category;
    /// The native handle produced when an object of this kind is created.
    type Handle: NativeHandle;
}

macro_rules! category_kind {
    ($(#[$doc:meta])* $kind:ident, $category:ident, $handle:ty, $alias:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $kind {}

        impl CategoryKind for $kind {
            const CATEGORY: Category = Category::$category;
            type Handle = $handle;
        }

        #[doc = concat!("1-based index into the ", stringify!($category), " table.")]
        pub type $alias = Index<$kind>;
    };
}

category_kind!(
    /// Marker for the sampler category.
    SamplerKind, Sampler, Sampler, SamplerIndex
);
category_kind!(
    /// Marker for the descriptor-set layout category.
    DescriptorSetLayoutKind, DescriptorSetLayout, DescriptorSetLayout, DescriptorSetLayoutIndex
);
category_kind!(
    /// Marker for the pipeline layout category.
    PipelineLayoutKind, PipelineLayout, PipelineLayout, PipelineLayoutIndex
);
category_kind!(
    /// Marker for the shader module category.
    ShaderModuleKind, ShaderModule, ShaderModule, ShaderModuleIndex
);
category_kind!(
    /// Marker for the render pass category.
    RenderPassKind, RenderPass, RenderPass, RenderPassIndex
);
category_kind!(
    /// Marker for the compute pipeline category.
    ComputePipelineKind, ComputePipeline, Pipeline, ComputePipelineIndex
);
category_kind!(
    /// Marker for the graphics pipeline category.
    GraphicsPipelineKind, GraphicsPipeline, Pipeline, GraphicsPipelineIndex
);

/// A 1-based index into the table of category `K`.
///
/// The zero value is not representable; "no reference" is `Option<Index<K>>`,
/// which has the same size as a bare `u32`.
pub struct Index<K: CategoryKind> {
    raw: NonZeroU32,
    _kind: PhantomData<fn() -> K>,
}

impl<K: CategoryKind> Index<K> {
    /// Builds the index for the entry at 0-based table position `position`.
    pub fn from_position(position: usize) -> Self {
        let offset = u32::try_from(position).unwrap_or(u32::MAX);
        Self {
            raw: NonZeroU32::MIN.saturating_add(offset),
            _kind: PhantomData,
        }
    }

    /// Decodes a wire reference. `0` decodes to `None`.
    pub fn from_wire(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(|raw| Self {
            raw,
            _kind: PhantomData,
        })
    }

    /// Encodes an optional reference for the wire. `None` encodes to `0`.
    pub fn to_wire(index: Option<Self>) -> u32 {
        index.map_or(0, Self::get)
    }

    /// The 1-based numeric value.
    pub fn get(self) -> u32 {
        self.raw.get()
    }

    /// The 0-based table position this index designates.
    pub fn position(self) -> usize {
        (self.raw.get() - 1) as usize
    }

    /// The category this index belongs to.
    pub fn category(self) -> Category {
        K::CATEGORY
    }
}

// Manual impls keep `K` free of derive bounds; `K` is an uninhabited marker.
impl<K: CategoryKind> Clone for Index<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: CategoryKind> Copy for Index<K> {}

impl<K: CategoryKind> PartialEq for Index<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: CategoryKind> Eq for Index<K> {}

impl<K: CategoryKind> PartialOrd for Index<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: CategoryKind> Ord for Index<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<K: CategoryKind> Hash for Index<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K: CategoryKind> fmt::Debug for Index<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}Index({})", K::CATEGORY, self.raw)
    }
}

impl<K: CategoryKind> fmt::Display for Index<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", K::CATEGORY, self.raw)
    }
}
