//! Owned wire records.
//!
//! One record type per category. Records own all their data and carry
//! cross-object references as `u32` indices (1-based, `0` = none), so they can
//! outlive the caller's create-infos and be encoded with bincode as-is.
//!
//! Plain value structures (attachment descriptions, blend attachments, ...)
//! are shared with [`crate::info`].

use bincode::config::{self, Configuration, Fixint, Limit, LittleEndian};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::hasher::Hash;
use crate::ids::Category;
use crate::info::{
    AttachmentDescription, AttachmentReference, ColorBlendAttachment, ColorBlendState,
    DepthStencilState, DynamicState, InputAssemblyState, MultisampleState, PushConstantRange,
    RasterizationState, Rect2D, SamplerCreateInfo, SpecializationInfo, SpecializationMapEntry,
    SubpassDependency, TessellationState, VertexInputAttribute, VertexInputBinding,
    VertexInputState, Viewport, ViewportState,
};

/// bincode configuration shared by the writer and the reader: fixed-width
/// little-endian integers, so every field has its natural width on the wire.
pub fn codec() -> Configuration<LittleEndian, Fixint> {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

/// Largest encoded size of a single wire record.
pub const MAX_ENTRY_SIZE: usize = 64 * 1024 * 1024;

/// [`codec`] with a decode limit of [`MAX_ENTRY_SIZE`]. bincode checks every
/// length prefix against the limit before allocating for it.
pub fn decode_codec() -> Configuration<LittleEndian, Fixint, Limit<MAX_ENTRY_SIZE>> {
    codec().with_limit::<MAX_ENTRY_SIZE>()
}

/// Checks that every specialization constant lies within `data_len` bytes.
/// Returns the field name and a description of the first offender.
pub fn check_specialization(
    map_entries: &[SpecializationMapEntry],
    data_len: usize,
) -> std::result::Result<(), (&'static str, String)> {
    let data_len = data_len as u64;
    match map_entries
        .iter()
        .find(|e| u64::from(e.offset).saturating_add(e.size) > data_len)
    {
        Some(bad) => Err((
            "stage.specialization",
            format!(
                "constant {} spans {}+{} past {data_len} data bytes",
                bad.constant_id, bad.offset, bad.size
            ),
        )),
        None => Ok(()),
    }
}

/// Checks that static viewport and scissor arrays are either empty or as long
/// as their declared counts.
pub fn check_viewport_counts(
    viewports: usize,
    viewport_count: u32,
    scissors: usize,
    scissor_count: u32,
) -> std::result::Result<(), (&'static str, String)> {
    let declared = [
        ("viewport_state.viewports", viewports, viewport_count),
        ("viewport_state.scissors", scissors, scissor_count),
    ];
    for (field, len, count) in declared {
        if len != 0 && len != count as usize {
            return Err((
                field,
                format!("{len} static entries for a declared count of {count}"),
            ));
        }
    }
    Ok(())
}

/// A record stored in one category block.
pub trait WireEntry: Serialize + DeserializeOwned + Send + Sync {
    /// Category of the block holding records of this type.
    const CATEGORY: Category;

    /// Content hash of the recorded object.
    fn hash(&self) -> Hash;
}

macro_rules! wire_entry {
    ($ty:ty, $category:ident) => {
        impl WireEntry for $ty {
            const CATEGORY: Category = Category::$category;

            fn hash(&self) -> Hash {
                self.hash
            }
        }
    };
}

/// Recorded sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSampler {
    /// Content hash.
    pub hash: Hash,
    /// Sampler parameters; samplers embed no references.
    pub info: SamplerCreateInfo,
}

/// Recorded descriptor-set layout binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBinding {
    /// Binding number.
    pub binding: u32,
    /// Descriptor type.
    pub descriptor_type: u32,
    /// Descriptor count.
    pub descriptor_count: u32,
    /// Stage flags.
    pub stage_flags: u32,
    /// Sampler indices.
    pub immutable_samplers: Option<Vec<u32>>,
}

/// Recorded descriptor-set layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDescriptorSetLayout {
    /// Content hash.
    pub hash: Hash,
    /// Creation flags.
    pub flags: u32,
    /// Bindings.
    pub bindings: Vec<WireBinding>,
}

/// Recorded pipeline layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePipelineLayout {
    /// Content hash.
    pub hash: Hash,
    /// Creation flags.
    pub flags: u32,
    /// Descriptor-set layout indices.
    pub set_layouts: Vec<u32>,
    /// Push-constant ranges.
    pub push_constant_ranges: Vec<PushConstantRange>,
}

/// Recorded shader module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireShaderModule {
    /// Content hash.
    pub hash: Hash,
    /// Creation flags.
    pub flags: u32,
    /// SPIR-V words.
    pub code: Vec<u32>,
}

/// Recorded subpass.
///
/// `color_attachments` is omitted when a subpass has none; a missing node
/// reads back as an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSubpass {
    /// Subpass flags.
    pub flags: u32,
    /// Pipeline bind point.
    pub pipeline_bind_point: u32,
    /// Input attachments.
    pub input_attachments: Vec<AttachmentReference>,
    /// Color attachments.
    pub color_attachments: Option<Vec<AttachmentReference>>,
    /// Resolve attachments.
    pub resolve_attachments: Option<Vec<AttachmentReference>>,
    /// Depth-stencil attachment.
    pub depth_stencil_attachment: Option<AttachmentReference>,
    /// Preserved attachment numbers.
    pub preserve_attachments: Vec<u32>,
}

/// Recorded render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRenderPass {
    /// Content hash.
    pub hash: Hash,
    /// Creation flags.
    pub flags: u32,
    /// Attachments.
    pub attachments: Vec<AttachmentDescription>,
    /// Subpasses.
    pub subpasses: Vec<WireSubpass>,
    /// Dependencies.
    pub dependencies: Vec<SubpassDependency>,
}

/// Recorded specialization constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSpecialization {
    /// Map entries.
    pub map_entries: Vec<SpecializationMapEntry>,
    /// Constant data.
    pub data: Vec<u8>,
}

impl WireSpecialization {
    /// Copies a native specialization block.
    pub fn from_native(info: &SpecializationInfo<'_>) -> Self {
        Self {
            map_entries: info.map_entries.to_vec(),
            data: info.data.to_vec(),
        }
    }
}

/// Recorded shader stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireShaderStage {
    /// Stage flags.
    pub flags: u32,
    /// Stage bit.
    pub stage: u32,
    /// Shader module index.
    pub module: u32,
    /// Entry-point name.
    pub name: String,
    /// Specialization constants.
    pub specialization: Option<WireSpecialization>,
}

/// Recorded compute pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireComputePipeline {
    /// Content hash.
    pub hash: Hash,
    /// Creation flags.
    pub flags: u32,
    /// Compute stage.
    pub stage: WireShaderStage,
    /// Pipeline layout index.
    pub layout: u32,
    /// Base compute pipeline index.
    pub base_pipeline: u32,
    /// Base pipeline position in a batched create call.
    pub base_pipeline_index: i32,
}

/// Recorded vertex input state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireVertexInputState {
    /// State flags.
    pub flags: u32,
    /// Buffer bindings.
    pub bindings: Vec<VertexInputBinding>,
    /// Attributes.
    pub attributes: Vec<VertexInputAttribute>,
}

impl WireVertexInputState {
    /// Copies a native vertex input block.
    pub fn from_native(state: &VertexInputState<'_>) -> Self {
        Self {
            flags: state.flags,
            bindings: state.bindings.to_vec(),
            attributes: state.attributes.to_vec(),
        }
    }
}

/// Recorded viewport state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireViewportState {
    /// State flags.
    pub flags: u32,
    /// Declared viewport count.
    pub viewport_count: u32,
    /// Static viewports.
    pub viewports: Vec<Viewport>,
    /// Declared scissor count.
    pub scissor_count: u32,
    /// Static scissors.
    pub scissors: Vec<Rect2D>,
}

impl WireViewportState {
    /// Copies a native viewport block.
    pub fn from_native(state: &ViewportState<'_>) -> Self {
        Self {
            flags: state.flags,
            viewport_count: state.viewport_count,
            viewports: state.viewports.to_vec(),
            scissor_count: state.scissor_count,
            scissors: state.scissors.to_vec(),
        }
    }
}

/// Recorded multisample state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMultisampleState {
    /// State flags.
    pub flags: u32,
    /// Sample count.
    pub rasterization_samples: u32,
    /// Sample shading toggle.
    pub sample_shading_enable: bool,
    /// Minimum sample shading.
    pub min_sample_shading: f32,
    /// Coverage mask words.
    pub sample_mask: Option<Vec<u32>>,
    /// Alpha-to-coverage toggle.
    pub alpha_to_coverage_enable: bool,
    /// Alpha-to-one toggle.
    pub alpha_to_one_enable: bool,
}

impl WireMultisampleState {
    /// Copies a native multisample block.
    pub fn from_native(state: &MultisampleState<'_>) -> Self {
        Self {
            flags: state.flags,
            rasterization_samples: state.rasterization_samples,
            sample_shading_enable: state.sample_shading_enable,
            min_sample_shading: state.min_sample_shading,
            sample_mask: state.sample_mask.map(<[u32]>::to_vec),
            alpha_to_coverage_enable: state.alpha_to_coverage_enable,
            alpha_to_one_enable: state.alpha_to_one_enable,
        }
    }
}

/// Recorded color blend state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireColorBlendState {
    /// State flags.
    pub flags: u32,
    /// Logic op toggle.
    pub logic_op_enable: bool,
    /// Logic op.
    pub logic_op: u32,
    /// Per-attachment blend state.
    pub attachments: Vec<ColorBlendAttachment>,
    /// Blend constants.
    pub blend_constants: [f32; 4],
}

impl WireColorBlendState {
    /// Copies a native color blend block.
    pub fn from_native(state: &ColorBlendState<'_>) -> Self {
        Self {
            flags: state.flags,
            logic_op_enable: state.logic_op_enable,
            logic_op: state.logic_op,
            attachments: state.attachments.to_vec(),
            blend_constants: state.blend_constants,
        }
    }
}

/// Recorded dynamic state list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDynamicState {
    /// State flags.
    pub flags: u32,
    /// Dynamic state enumerants.
    pub dynamic_states: Vec<u32>,
}

impl WireDynamicState {
    /// Copies a native dynamic state block.
    pub fn from_native(state: &DynamicState<'_>) -> Self {
        Self {
            flags: state.flags,
            dynamic_states: state.dynamic_states.to_vec(),
        }
    }
}

/// Recorded graphics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGraphicsPipeline {
    /// Content hash.
    pub hash: Hash,
    /// Creation flags.
    pub flags: u32,
    /// Shader stages.
    pub stages: Vec<WireShaderStage>,
    /// Vertex input.
    pub vertex_input_state: Option<WireVertexInputState>,
    /// Input assembly.
    pub input_assembly_state: Option<InputAssemblyState>,
    /// Tessellation.
    pub tessellation_state: Option<TessellationState>,
    /// Viewports and scissors.
    pub viewport_state: Option<WireViewportState>,
    /// Rasterization.
    pub rasterization_state: Option<RasterizationState>,
    /// Multisampling.
    pub multisample_state: Option<WireMultisampleState>,
    /// Depth and stencil.
    pub depth_stencil_state: Option<DepthStencilState>,
    /// Color blending.
    pub color_blend_state: Option<WireColorBlendState>,
    /// Dynamic states.
    pub dynamic_state: Option<WireDynamicState>,
    /// Pipeline layout index.
    pub layout: u32,
    /// Render pass index.
    pub render_pass: u32,
    /// Subpass number.
    pub subpass: u32,
    /// Base graphics pipeline index.
    pub base_pipeline: u32,
    /// Base pipeline position in a batched create call.
    pub base_pipeline_index: i32,
}

wire_entry!(WireSampler, Sampler);
wire_entry!(WireDescriptorSetLayout, DescriptorSetLayout);
wire_entry!(WirePipelineLayout, PipelineLayout);
wire_entry!(WireShaderModule, ShaderModule);
wire_entry!(WireRenderPass, RenderPass);
wire_entry!(WireComputePipeline, ComputePipeline);
wire_entry!(WireGraphicsPipeline, GraphicsPipeline);
