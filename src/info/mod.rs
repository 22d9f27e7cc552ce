//! Native create-info structures.
//!
//! These are the structures the recorder accepts and the replayer hands to a
//! [`StateCreatorInterface`](crate::StateCreatorInterface). They borrow every
//! variable-length field: arrays are slices (an empty slice stands for a null
//! pointer with zero count), strings are `&str`, optional sub-blocks are
//! `Option<&T>`. References to other objects are native handles.
//!
//! Plain value structures with no borrowed data or handles are shared verbatim
//! with the wire format and therefore derive serde traits.
//!
//! Enumerations and flag masks are carried as raw `u32` values; this crate
//! never interprets them.

mod pipeline;
mod render_pass;

pub use pipeline::*;
pub use render_pass::*;

use serde::{Deserialize, Serialize};

use crate::handles::{DescriptorSetLayout, Sampler};

/// Describes a sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplerCreateInfo {
    /// Creation flags.
    pub flags: u32,
    /// Magnification filter.
    pub mag_filter: u32,
    /// Minification filter.
    pub min_filter: u32,
    /// Mipmap filter.
    pub mipmap_mode: u32,
    /// Addressing mode outside `[0, 1)` along U.
    pub address_mode_u: u32,
    /// Addressing mode along V.
    pub address_mode_v: u32,
    /// Addressing mode along W.
    pub address_mode_w: u32,
    /// Bias added to the computed LOD.
    pub mip_lod_bias: f32,
    /// Enables anisotropic filtering.
    pub anisotropy_enable: bool,
    /// Anisotropy clamp.
    pub max_anisotropy: f32,
    /// Enables depth comparison.
    pub compare_enable: bool,
    /// Comparison operator.
    pub compare_op: u32,
    /// Minimum LOD clamp.
    pub min_lod: f32,
    /// Maximum LOD clamp.
    pub max_lod: f32,
    /// Predefined border color.
    pub border_color: u32,
    /// Addresses texels with unnormalized coordinates.
    pub unnormalized_coordinates: bool,
}

/// One binding of a descriptor-set layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescriptorSetLayoutBinding<'a> {
    /// Binding number.
    pub binding: u32,
    /// Descriptor type.
    pub descriptor_type: u32,
    /// Number of descriptors in the binding.
    pub descriptor_count: u32,
    /// Shader stages that can access the binding.
    pub stage_flags: u32,
    /// Samplers baked into the layout, if any.
    pub immutable_samplers: Option<&'a [Sampler]>,
}

/// Describes a descriptor-set layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescriptorSetLayoutCreateInfo<'a> {
    /// Creation flags.
    pub flags: u32,
    /// Bindings, in declaration order.
    pub bindings: &'a [DescriptorSetLayoutBinding<'a>],
}

/// A push-constant range of a pipeline layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConstantRange {
    /// Shader stages that access the range.
    pub stage_flags: u32,
    /// Start offset in bytes.
    pub offset: u32,
    /// Size in bytes.
    pub size: u32,
}

/// Describes a pipeline layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineLayoutCreateInfo<'a> {
    /// Creation flags.
    pub flags: u32,
    /// Descriptor-set layouts, one per set number.
    pub set_layouts: &'a [DescriptorSetLayout],
    /// Push-constant ranges.
    pub push_constant_ranges: &'a [PushConstantRange],
}

/// Describes a shader module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaderModuleCreateInfo<'a> {
    /// Creation flags.
    pub flags: u32,
    /// SPIR-V words.
    pub code: &'a [u32],
}
