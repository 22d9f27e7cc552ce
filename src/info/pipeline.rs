use serde::{Deserialize, Serialize};

use crate::handles::{Pipeline, PipelineLayout, RenderPass, ShaderModule};

/// Maps one specialization constant to a range of the data blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecializationMapEntry {
    /// Constant ID in the shader.
    pub constant_id: u32,
    /// Byte offset into the data blob.
    pub offset: u32,
    /// Byte size of the constant.
    pub size: u64,
}

/// Specialization constants for one shader stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecializationInfo<'a> {
    /// Constant-to-range map.
    pub map_entries: &'a [SpecializationMapEntry],
    /// Raw constant data, copied verbatim.
    pub data: &'a [u8],
}

/// One programmable stage of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineShaderStage<'a> {
    /// Stage flags.
    pub flags: u32,
    /// The stage bit.
    pub stage: u32,
    /// Module holding the stage's code.
    pub module: ShaderModule,
    /// Entry-point name.
    pub name: &'a str,
    /// Specialization constants, if any.
    pub specialization: Option<&'a SpecializationInfo<'a>>,
}

/// Describes a compute pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputePipelineCreateInfo<'a> {
    /// Creation flags.
    pub flags: u32,
    /// The compute stage.
    pub stage: PipelineShaderStage<'a>,
    /// Pipeline layout.
    pub layout: Option<PipelineLayout>,
    /// Pipeline to derive from.
    pub base_pipeline_handle: Option<Pipeline>,
    /// Position of the parent within a batched create call, or `-1`.
    pub base_pipeline_index: i32,
}

/// One vertex buffer binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexInputBinding {
    /// Binding number.
    pub binding: u32,
    /// Distance between elements in bytes.
    pub stride: u32,
    /// Per-vertex or per-instance stepping.
    pub input_rate: u32,
}

/// One vertex attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexInputAttribute {
    /// Shader input location.
    pub location: u32,
    /// Binding the attribute reads from.
    pub binding: u32,
    /// Attribute format.
    pub format: u32,
    /// Byte offset within the element.
    pub offset: u32,
}

/// Vertex input state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexInputState<'a> {
    /// State flags.
    pub flags: u32,
    /// Buffer bindings.
    pub bindings: &'a [VertexInputBinding],
    /// Attributes.
    pub attributes: &'a [VertexInputAttribute],
}

/// Input assembly state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputAssemblyState {
    /// State flags.
    pub flags: u32,
    /// Primitive topology.
    pub topology: u32,
    /// Enables primitive restart.
    pub primitive_restart_enable: bool,
}

/// Tessellation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TessellationState {
    /// State flags.
    pub flags: u32,
    /// Control points per patch.
    pub patch_control_points: u32,
}

/// A viewport rectangle with depth range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Near depth.
    pub min_depth: f32,
    /// Far depth.
    pub max_depth: f32,
}

/// An integer rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect2D {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Viewport state.
///
/// The counts are independent of the array lengths: with dynamic viewports or
/// scissors the arrays are empty while the counts still declare how many will
/// be bound.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState<'a> {
    /// State flags.
    pub flags: u32,
    /// Number of viewports.
    pub viewport_count: u32,
    /// Static viewports.
    pub viewports: &'a [Viewport],
    /// Number of scissors.
    pub scissor_count: u32,
    /// Static scissors.
    pub scissors: &'a [Rect2D],
}

/// Rasterization state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RasterizationState {
    /// State flags.
    pub flags: u32,
    /// Clamps fragment depth instead of clipping.
    pub depth_clamp_enable: bool,
    /// Discards primitives before rasterization.
    pub rasterizer_discard_enable: bool,
    /// Polygon fill mode.
    pub polygon_mode: u32,
    /// Face culling mode.
    pub cull_mode: u32,
    /// Front-face winding.
    pub front_face: u32,
    /// Enables depth bias.
    pub depth_bias_enable: bool,
    /// Constant depth bias.
    pub depth_bias_constant_factor: f32,
    /// Depth bias clamp.
    pub depth_bias_clamp: f32,
    /// Slope-scaled depth bias.
    pub depth_bias_slope_factor: f32,
    /// Rasterized line width.
    pub line_width: f32,
}

/// Multisample state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MultisampleState<'a> {
    /// State flags.
    pub flags: u32,
    /// Sample count.
    pub rasterization_samples: u32,
    /// Enables sample shading.
    pub sample_shading_enable: bool,
    /// Minimum fraction of sample shading.
    pub min_sample_shading: f32,
    /// Coverage mask words, if any.
    pub sample_mask: Option<&'a [u32]>,
    /// Enables alpha-to-coverage.
    pub alpha_to_coverage_enable: bool,
    /// Enables alpha-to-one.
    pub alpha_to_one_enable: bool,
}

/// Stencil operations for one face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StencilOpState {
    /// Action when the stencil test fails.
    pub fail_op: u32,
    /// Action when both tests pass.
    pub pass_op: u32,
    /// Action when the depth test fails.
    pub depth_fail_op: u32,
    /// Stencil comparison.
    pub compare_op: u32,
    /// Compare mask.
    pub compare_mask: u32,
    /// Write mask.
    pub write_mask: u32,
    /// Reference value.
    pub reference: u32,
}

/// Depth-stencil state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthStencilState {
    /// State flags.
    pub flags: u32,
    /// Enables depth testing.
    pub depth_test_enable: bool,
    /// Enables depth writes.
    pub depth_write_enable: bool,
    /// Depth comparison.
    pub depth_compare_op: u32,
    /// Enables the depth bounds test.
    pub depth_bounds_test_enable: bool,
    /// Enables stencil testing.
    pub stencil_test_enable: bool,
    /// Front-face stencil state.
    pub front: StencilOpState,
    /// Back-face stencil state.
    pub back: StencilOpState,
    /// Lower depth bound.
    pub min_depth_bounds: f32,
    /// Upper depth bound.
    pub max_depth_bounds: f32,
}

/// Blend state of one color attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBlendAttachment {
    /// Enables blending.
    pub blend_enable: bool,
    /// Source color factor.
    pub src_color_blend_factor: u32,
    /// Destination color factor.
    pub dst_color_blend_factor: u32,
    /// Color blend operation.
    pub color_blend_op: u32,
    /// Source alpha factor.
    pub src_alpha_blend_factor: u32,
    /// Destination alpha factor.
    pub dst_alpha_blend_factor: u32,
    /// Alpha blend operation.
    pub alpha_blend_op: u32,
    /// Channel write mask.
    pub color_write_mask: u32,
}

/// Color blend state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorBlendState<'a> {
    /// State flags.
    pub flags: u32,
    /// Enables logical operations.
    pub logic_op_enable: bool,
    /// Logical operation.
    pub logic_op: u32,
    /// Per-attachment blend state.
    pub attachments: &'a [ColorBlendAttachment],
    /// Blend constant color.
    pub blend_constants: [f32; 4],
}

/// States left to be set by commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DynamicState<'a> {
    /// State flags.
    pub flags: u32,
    /// Dynamic state enumerants.
    pub dynamic_states: &'a [u32],
}

/// Describes a graphics pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GraphicsPipelineCreateInfo<'a> {
    /// Creation flags.
    pub flags: u32,
    /// Shader stages.
    pub stages: &'a [PipelineShaderStage<'a>],
    /// Vertex input.
    pub vertex_input_state: Option<&'a VertexInputState<'a>>,
    /// Input assembly.
    pub input_assembly_state: Option<&'a InputAssemblyState>,
    /// Tessellation.
    pub tessellation_state: Option<&'a TessellationState>,
    /// Viewports and scissors.
    pub viewport_state: Option<&'a ViewportState<'a>>,
    /// Rasterization.
    pub rasterization_state: Option<&'a RasterizationState>,
    /// Multisampling.
    pub multisample_state: Option<&'a MultisampleState<'a>>,
    /// Depth and stencil testing.
    pub depth_stencil_state: Option<&'a DepthStencilState>,
    /// Color blending.
    pub color_blend_state: Option<&'a ColorBlendState<'a>>,
    /// Dynamic states.
    pub dynamic_state: Option<&'a DynamicState<'a>>,
    /// Pipeline layout.
    pub layout: Option<PipelineLayout>,
    /// Render pass the pipeline is compatible with.
    pub render_pass: Option<RenderPass>,
    /// Subpass within `render_pass`.
    pub subpass: u32,
    /// Pipeline to derive from.
    pub base_pipeline_handle: Option<Pipeline>,
    /// Position of the parent within a batched create call, or `-1`.
    pub base_pipeline_index: i32,
}
