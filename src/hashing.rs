//! Content hashes of create-infos.
//!
//! Fields are folded in declaration order. Arrays fold their length before
//! their elements, optional blocks fold a `0`/`1` presence marker, so absent
//! and zeroed values hash differently. A referenced object contributes its
//! recorded hash, looked up through the [`StateRecorder`]; referencing a handle
//! the recorder has never seen bound is an error.

use crate::error::{CaptureError, Result};
use crate::handles::NativeHandle;
use crate::hasher::{Hash, Hasher};
use crate::ids::Category;
use crate::info::{
    AttachmentDescription, AttachmentReference, ColorBlendState, ComputePipelineCreateInfo,
    DepthStencilState, DescriptorSetLayoutCreateInfo, DynamicState, GraphicsPipelineCreateInfo,
    InputAssemblyState, MultisampleState, PipelineLayoutCreateInfo, PipelineShaderStage,
    RasterizationState, RenderPassCreateInfo, SamplerCreateInfo, ShaderModuleCreateInfo,
    StencilOpState, SubpassDependency, SubpassDescription, TessellationState, VertexInputState,
    ViewportState,
};
use crate::recorder::StateRecorder;

fn count(h: &mut Hasher, len: usize) {
    h.u32(u32::try_from(len).unwrap_or(u32::MAX));
}

fn present<T>(h: &mut Hasher, value: Option<T>) -> Option<T> {
    h.bool(value.is_some());
    value
}

fn child<H: NativeHandle>(
    owner: Category,
    field: &'static str,
    target: Category,
    handle: H,
    hash: Option<Hash>,
) -> Result<Hash> {
    hash.ok_or(CaptureError::UnknownHandle {
        category: owner,
        field,
        target,
        handle: handle.as_raw(),
    })
}

/// Hash of a sampler.
pub fn compute_hash_sampler(info: &SamplerCreateInfo) -> Hash {
    let mut h = Hasher::new();
    h.u32(info.flags);
    h.u32(info.mag_filter);
    h.u32(info.min_filter);
    h.u32(info.mipmap_mode);
    h.u32(info.address_mode_u);
    h.u32(info.address_mode_v);
    h.u32(info.address_mode_w);
    h.f32(info.mip_lod_bias);
    h.bool(info.anisotropy_enable);
    h.f32(info.max_anisotropy);
    h.bool(info.compare_enable);
    h.u32(info.compare_op);
    h.f32(info.min_lod);
    h.f32(info.max_lod);
    h.u32(info.border_color);
    h.bool(info.unnormalized_coordinates);
    h.get()
}

/// Hash of a descriptor-set layout, folding the hashes of its immutable
/// samplers.
pub fn compute_hash_descriptor_set_layout(
    recorder: &StateRecorder,
    info: &DescriptorSetLayoutCreateInfo<'_>,
) -> Result<Hash> {
    let mut h = Hasher::new();
    h.u32(info.flags);
    count(&mut h, info.bindings.len());
    for binding in info.bindings {
        h.u32(binding.binding);
        h.u32(binding.descriptor_type);
        h.u32(binding.descriptor_count);
        h.u32(binding.stage_flags);
        if let Some(samplers) = present(&mut h, binding.immutable_samplers) {
            count(&mut h, samplers.len());
            for &sampler in samplers {
                h.u64(child(
                    Category::DescriptorSetLayout,
                    "immutable_samplers",
                    Category::Sampler,
                    sampler,
                    recorder.get_hash_for_sampler(sampler),
                )?);
            }
        }
    }
    Ok(h.get())
}

/// Hash of a pipeline layout, folding the hashes of its set layouts.
pub fn compute_hash_pipeline_layout(
    recorder: &StateRecorder,
    info: &PipelineLayoutCreateInfo<'_>,
) -> Result<Hash> {
    let mut h = Hasher::new();
    h.u32(info.flags);
    count(&mut h, info.set_layouts.len());
    for &layout in info.set_layouts {
        h.u64(child(
            Category::PipelineLayout,
            "set_layouts",
            Category::DescriptorSetLayout,
            layout,
            recorder.get_hash_for_descriptor_set_layout(layout),
        )?);
    }
    count(&mut h, info.push_constant_ranges.len());
    for range in info.push_constant_ranges {
        h.u32(range.stage_flags);
        h.u32(range.offset);
        h.u32(range.size);
    }
    Ok(h.get())
}

/// Hash of a shader module.
pub fn compute_hash_shader_module(info: &ShaderModuleCreateInfo<'_>) -> Hash {
    let mut h = Hasher::new();
    h.u32(info.flags);
    count(&mut h, info.code.len());
    h.data(info.code);
    h.get()
}

fn hash_attachment(h: &mut Hasher, a: &AttachmentDescription) {
    h.u32(a.flags);
    h.u32(a.format);
    h.u32(a.samples);
    h.u32(a.load_op);
    h.u32(a.store_op);
    h.u32(a.stencil_load_op);
    h.u32(a.stencil_store_op);
    h.u32(a.initial_layout);
    h.u32(a.final_layout);
}

fn hash_references(h: &mut Hasher, refs: &[AttachmentReference]) {
    count(h, refs.len());
    for r in refs {
        h.u32(r.attachment);
        h.u32(r.layout);
    }
}

fn hash_subpass(h: &mut Hasher, s: &SubpassDescription<'_>) {
    h.u32(s.flags);
    h.u32(s.pipeline_bind_point);
    hash_references(h, s.input_attachments);
    hash_references(h, s.color_attachments);
    if let Some(resolve) = present(h, s.resolve_attachments) {
        hash_references(h, resolve);
    }
    if let Some(depth) = present(h, s.depth_stencil_attachment) {
        h.u32(depth.attachment);
        h.u32(depth.layout);
    }
    count(h, s.preserve_attachments.len());
    h.data(s.preserve_attachments);
}

fn hash_dependency(h: &mut Hasher, d: &SubpassDependency) {
    h.u32(d.src_subpass);
    h.u32(d.dst_subpass);
    h.u32(d.src_stage_mask);
    h.u32(d.dst_stage_mask);
    h.u32(d.src_access_mask);
    h.u32(d.dst_access_mask);
    h.u32(d.dependency_flags);
}

/// Hash of a render pass.
pub fn compute_hash_render_pass(info: &RenderPassCreateInfo<'_>) -> Hash {
    let mut h = Hasher::new();
    h.u32(info.flags);
    count(&mut h, info.attachments.len());
    for a in info.attachments {
        hash_attachment(&mut h, a);
    }
    count(&mut h, info.subpasses.len());
    for s in info.subpasses {
        hash_subpass(&mut h, s);
    }
    count(&mut h, info.dependencies.len());
    for d in info.dependencies {
        hash_dependency(&mut h, d);
    }
    h.get()
}

fn hash_stage(
    h: &mut Hasher,
    recorder: &StateRecorder,
    owner: Category,
    stage: &PipelineShaderStage<'_>,
) -> Result<()> {
    h.u32(stage.flags);
    h.u32(stage.stage);
    h.u64(child(
        owner,
        "stage.module",
        Category::ShaderModule,
        stage.module,
        recorder.get_hash_for_shader_module(stage.module),
    )?);
    h.string(stage.name);
    if let Some(spec) = present(h, stage.specialization) {
        count(h, spec.map_entries.len());
        for entry in spec.map_entries {
            h.u32(entry.constant_id);
            h.u32(entry.offset);
            h.u64(entry.size);
        }
        count(h, spec.data.len());
        h.data(spec.data);
    }
    Ok(())
}

/// Hash of a compute pipeline, folding the hashes of its shader module,
/// layout and base pipeline.
pub fn compute_hash_compute_pipeline(
    recorder: &StateRecorder,
    info: &ComputePipelineCreateInfo<'_>,
) -> Result<Hash> {
    let owner = Category::ComputePipeline;
    let mut h = Hasher::new();
    h.u32(info.flags);
    hash_stage(&mut h, recorder, owner, &info.stage)?;
    if let Some(layout) = present(&mut h, info.layout) {
        h.u64(child(
            owner,
            "layout",
            Category::PipelineLayout,
            layout,
            recorder.get_hash_for_pipeline_layout(layout),
        )?);
    }
    if let Some(base) = present(&mut h, info.base_pipeline_handle) {
        h.u64(child(
            owner,
            "base_pipeline_handle",
            Category::ComputePipeline,
            base,
            recorder.get_hash_for_compute_pipeline(base),
        )?);
    }
    h.s32(info.base_pipeline_index);
    Ok(h.get())
}

fn hash_vertex_input(h: &mut Hasher, state: &VertexInputState<'_>) {
    h.u32(state.flags);
    count(h, state.bindings.len());
    for b in state.bindings {
        h.u32(b.binding);
        h.u32(b.stride);
        h.u32(b.input_rate);
    }
    count(h, state.attributes.len());
    for a in state.attributes {
        h.u32(a.location);
        h.u32(a.binding);
        h.u32(a.format);
        h.u32(a.offset);
    }
}

fn hash_input_assembly(h: &mut Hasher, state: &InputAssemblyState) {
    h.u32(state.flags);
    h.u32(state.topology);
    h.bool(state.primitive_restart_enable);
}

fn hash_tessellation(h: &mut Hasher, state: &TessellationState) {
    h.u32(state.flags);
    h.u32(state.patch_control_points);
}

fn hash_viewport(h: &mut Hasher, state: &ViewportState<'_>) {
    h.u32(state.flags);
    h.u32(state.viewport_count);
    count(h, state.viewports.len());
    for v in state.viewports {
        h.f32(v.x);
        h.f32(v.y);
        h.f32(v.width);
        h.f32(v.height);
        h.f32(v.min_depth);
        h.f32(v.max_depth);
    }
    h.u32(state.scissor_count);
    count(h, state.scissors.len());
    for s in state.scissors {
        h.s32(s.x);
        h.s32(s.y);
        h.u32(s.width);
        h.u32(s.height);
    }
}

fn hash_rasterization(h: &mut Hasher, state: &RasterizationState) {
    h.u32(state.flags);
    h.bool(state.depth_clamp_enable);
    h.bool(state.rasterizer_discard_enable);
    h.u32(state.polygon_mode);
    h.u32(state.cull_mode);
    h.u32(state.front_face);
    h.bool(state.depth_bias_enable);
    h.f32(state.depth_bias_constant_factor);
    h.f32(state.depth_bias_clamp);
    h.f32(state.depth_bias_slope_factor);
    h.f32(state.line_width);
}

fn hash_multisample(h: &mut Hasher, state: &MultisampleState<'_>) {
    h.u32(state.flags);
    h.u32(state.rasterization_samples);
    h.bool(state.sample_shading_enable);
    h.f32(state.min_sample_shading);
    if let Some(mask) = present(h, state.sample_mask) {
        count(h, mask.len());
        h.data(mask);
    }
    h.bool(state.alpha_to_coverage_enable);
    h.bool(state.alpha_to_one_enable);
}

fn hash_stencil(h: &mut Hasher, s: &StencilOpState) {
    h.u32(s.fail_op);
    h.u32(s.pass_op);
    h.u32(s.depth_fail_op);
    h.u32(s.compare_op);
    h.u32(s.compare_mask);
    h.u32(s.write_mask);
    h.u32(s.reference);
}

fn hash_depth_stencil(h: &mut Hasher, state: &DepthStencilState) {
    h.u32(state.flags);
    h.bool(state.depth_test_enable);
    h.bool(state.depth_write_enable);
    h.u32(state.depth_compare_op);
    h.bool(state.depth_bounds_test_enable);
    h.bool(state.stencil_test_enable);
    hash_stencil(h, &state.front);
    hash_stencil(h, &state.back);
    h.f32(state.min_depth_bounds);
    h.f32(state.max_depth_bounds);
}

fn hash_color_blend(h: &mut Hasher, state: &ColorBlendState<'_>) {
    h.u32(state.flags);
    h.bool(state.logic_op_enable);
    h.u32(state.logic_op);
    count(h, state.attachments.len());
    for a in state.attachments {
        h.bool(a.blend_enable);
        h.u32(a.src_color_blend_factor);
        h.u32(a.dst_color_blend_factor);
        h.u32(a.color_blend_op);
        h.u32(a.src_alpha_blend_factor);
        h.u32(a.dst_alpha_blend_factor);
        h.u32(a.alpha_blend_op);
        h.u32(a.color_write_mask);
    }
    for c in state.blend_constants {
        h.f32(c);
    }
}

fn hash_dynamic(h: &mut Hasher, state: &DynamicState<'_>) {
    h.u32(state.flags);
    count(h, state.dynamic_states.len());
    h.data(state.dynamic_states);
}

/// Hash of a graphics pipeline, folding the hashes of its shader modules,
/// layout, render pass and base pipeline.
pub fn compute_hash_graphics_pipeline(
    recorder: &StateRecorder,
    info: &GraphicsPipelineCreateInfo<'_>,
) -> Result<Hash> {
    let owner = Category::GraphicsPipeline;
    let mut h = Hasher::new();
    h.u32(info.flags);

    count(&mut h, info.stages.len());
    for stage in info.stages {
        hash_stage(&mut h, recorder, owner, stage)?;
    }

    if let Some(s) = present(&mut h, info.vertex_input_state) {
        hash_vertex_input(&mut h, s);
    }
    if let Some(s) = present(&mut h, info.input_assembly_state) {
        hash_input_assembly(&mut h, s);
    }
    if let Some(s) = present(&mut h, info.tessellation_state) {
        hash_tessellation(&mut h, s);
    }
    if let Some(s) = present(&mut h, info.viewport_state) {
        hash_viewport(&mut h, s);
    }
    if let Some(s) = present(&mut h, info.rasterization_state) {
        hash_rasterization(&mut h, s);
    }
    if let Some(s) = present(&mut h, info.multisample_state) {
        hash_multisample(&mut h, s);
    }
    if let Some(s) = present(&mut h, info.depth_stencil_state) {
        hash_depth_stencil(&mut h, s);
    }
    if let Some(s) = present(&mut h, info.color_blend_state) {
        hash_color_blend(&mut h, s);
    }
    if let Some(s) = present(&mut h, info.dynamic_state) {
        hash_dynamic(&mut h, s);
    }

    if let Some(layout) = present(&mut h, info.layout) {
        h.u64(child(
            owner,
            "layout",
            Category::PipelineLayout,
            layout,
            recorder.get_hash_for_pipeline_layout(layout),
        )?);
    }
    if let Some(render_pass) = present(&mut h, info.render_pass) {
        h.u64(child(
            owner,
            "render_pass",
            Category::RenderPass,
            render_pass,
            recorder.get_hash_for_render_pass(render_pass),
        )?);
    }
    h.u32(info.subpass);
    if let Some(base) = present(&mut h, info.base_pipeline_handle) {
        h.u64(child(
            owner,
            "base_pipeline_handle",
            Category::GraphicsPipeline,
            base,
            recorder.get_hash_for_graphics_pipeline(base),
        )?);
    }
    h.s32(info.base_pipeline_index);
    Ok(h.get())
}
