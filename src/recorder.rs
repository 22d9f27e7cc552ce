//! The capture side.
//!
//! [`StateRecorder`] accumulates one table per category. Each `register_*`
//! call deep-copies a create-info into an owned wire record, translating every
//! embedded handle into the 1-based index it was bound to with the matching
//! `set_*_handle` call, and appends it. Nothing is deduplicated: registering
//! the same hash twice yields two rows. Callers that want one row per object
//! check `get_hash_for_*` first.

use std::collections::HashMap;
use std::io::Write;

use tracing::{debug, trace};

use crate::compression::CompressorRegistry;
use crate::config::SerializeOptions;
use crate::error::{CaptureError, Result};
use crate::handles::{
    DescriptorSetLayout, NativeHandle, Pipeline, PipelineLayout, RenderPass, Sampler, ShaderModule,
};
use crate::hasher::Hash;
use crate::ids::{
    Category, CategoryKind, ComputePipelineIndex, ComputePipelineKind, DescriptorSetLayoutIndex,
    DescriptorSetLayoutKind, GraphicsPipelineIndex, GraphicsPipelineKind, Index,
    PipelineLayoutIndex, PipelineLayoutKind, RenderPassIndex, RenderPassKind, SamplerIndex,
    SamplerKind, ShaderModuleIndex, ShaderModuleKind,
};
use crate::info::{
    ComputePipelineCreateInfo, DescriptorSetLayoutCreateInfo, GraphicsPipelineCreateInfo,
    PipelineLayoutCreateInfo, PipelineShaderStage, RenderPassCreateInfo, SamplerCreateInfo,
    ShaderModuleCreateInfo, SubpassDescription,
};
use crate::wire::{
    WireBinding, WireColorBlendState, WireComputePipeline, WireDescriptorSetLayout,
    WireDynamicState, WireEntry, WireGraphicsPipeline, WireMultisampleState, WirePipelineLayout,
    WireRenderPass, WireSampler, WireShaderModule, WireShaderStage, WireSpecialization,
    WireSubpass, WireVertexInputState, WireViewportState, check_specialization,
    check_viewport_counts,
};
use crate::writer::{BlockJob, CategoryJob, write_capture};

/// One category: rows in insertion order plus the handle -> index map.
#[derive(Debug)]
struct Table<K: CategoryKind, W> {
    rows: Vec<W>,
    lookup: HashMap<K::Handle, Index<K>>,
}

impl<K: CategoryKind, W: WireEntry> Table<K, W> {
    fn next_index(&self) -> Index<K> {
        Index::from_position(self.rows.len())
    }

    fn push(&mut self, row: W) -> Index<K> {
        let index = self.next_index();
        trace!(
            category = %K::CATEGORY,
            index = index.get(),
            hash = %format!("{:#018x}", row.hash()),
            "Registered"
        );
        self.rows.push(row);
        index
    }

    /// Binds `handle` to `index`. A handle keeps the first index it was bound to.
    fn bind(&mut self, index: Index<K>, handle: K::Handle) -> Result<()> {
        if index.position() >= self.rows.len() {
            return Err(CaptureError::Reference {
                category: K::CATEGORY,
                index: index.get(),
                field: "handle binding",
                target: K::CATEGORY,
                value: index.get(),
                available: self.rows.len(),
            });
        }
        let bound = *self.lookup.entry(handle).or_insert(index);
        if bound != index {
            trace!(
                category = %K::CATEGORY,
                handle = ?handle,
                kept = bound.get(),
                ignored = index.get(),
                "Handle already bound"
            );
        }
        Ok(())
    }

    fn hash_of(&self, handle: K::Handle) -> Option<Hash> {
        let index = self.lookup.get(&handle)?;
        self.rows.get(index.position()).map(WireEntry::hash)
    }

    /// Translates an embedded handle into its index.
    fn resolve(&self, owner: Category, field: &'static str, handle: K::Handle) -> Result<u32> {
        self.lookup
            .get(&handle)
            .map(|index| index.get())
            .ok_or(CaptureError::UnknownHandle {
                category: owner,
                field,
                target: K::CATEGORY,
                handle: handle.as_raw(),
            })
    }

    fn resolve_opt(
        &self,
        owner: Category,
        field: &'static str,
        handle: Option<K::Handle>,
    ) -> Result<u32> {
        handle.map_or(Ok(0), |h| self.resolve(owner, field, h))
    }
}

impl<K: CategoryKind, W> Default for Table<K, W> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

/// Records create-infos and serializes them into a capture.
///
/// ```rust
/// use psocapture::{StateRecorder, ShaderModuleCreateInfo, handles::ShaderModule, hashing};
///
/// # fn main() -> psocapture::Result<()> {
/// let mut recorder = StateRecorder::new();
/// let code = [0x0723_0203u32, 0x0001_0000];
/// let info = ShaderModuleCreateInfo { flags: 0, code: &code };
///
/// let index = recorder.register_shader_module(hashing::compute_hash_shader_module(&info), &info)?;
/// let handle = ShaderModule::from_raw(0xdead).expect("non-null");
/// recorder.set_shader_module_handle(index, handle)?;
///
/// assert!(recorder.get_hash_for_shader_module(handle).is_some());
/// let blob = recorder.serialize()?;
/// assert!(!blob.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StateRecorder {
    samplers: Table<SamplerKind, WireSampler>,
    descriptor_set_layouts: Table<DescriptorSetLayoutKind, WireDescriptorSetLayout>,
    pipeline_layouts: Table<PipelineLayoutKind, WirePipelineLayout>,
    shader_modules: Table<ShaderModuleKind, WireShaderModule>,
    render_passes: Table<RenderPassKind, WireRenderPass>,
    compute_pipelines: Table<ComputePipelineKind, WireComputePipeline>,
    graphics_pipelines: Table<GraphicsPipelineKind, WireGraphicsPipeline>,
}

impl StateRecorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows recorded for `category`.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Sampler => self.samplers.rows.len(),
            Category::DescriptorSetLayout => self.descriptor_set_layouts.rows.len(),
            Category::PipelineLayout => self.pipeline_layouts.rows.len(),
            Category::ShaderModule => self.shader_modules.rows.len(),
            Category::RenderPass => self.render_passes.rows.len(),
            Category::ComputePipeline => self.compute_pipelines.rows.len(),
            Category::GraphicsPipeline => self.graphics_pipelines.rows.len(),
        }
    }

    // --- REGISTRATION ---

    /// Records a sampler.
    pub fn register_sampler(&mut self, hash: Hash, info: &SamplerCreateInfo) -> Result<SamplerIndex> {
        Ok(self.samplers.push(WireSampler { hash, info: *info }))
    }

    /// Records a descriptor-set layout. Immutable samplers must already be
    /// bound.
    pub fn register_descriptor_set_layout(
        &mut self,
        hash: Hash,
        info: &DescriptorSetLayoutCreateInfo<'_>,
    ) -> Result<DescriptorSetLayoutIndex> {
        let owner = Category::DescriptorSetLayout;
        let bindings = info
            .bindings
            .iter()
            .map(|b| -> Result<WireBinding> {
                let immutable_samplers = b
                    .immutable_samplers
                    .map(|list| {
                        list.iter()
                            .map(|&s| self.samplers.resolve(owner, "immutable_samplers", s))
                            .collect::<Result<Vec<_>>>()
                    })
                    .transpose()?;
                Ok(WireBinding {
                    binding: b.binding,
                    descriptor_type: b.descriptor_type,
                    descriptor_count: b.descriptor_count,
                    stage_flags: b.stage_flags,
                    immutable_samplers,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.descriptor_set_layouts.push(WireDescriptorSetLayout {
            hash,
            flags: info.flags,
            bindings,
        }))
    }

    /// Records a pipeline layout. Every set layout must already be bound.
    pub fn register_pipeline_layout(
        &mut self,
        hash: Hash,
        info: &PipelineLayoutCreateInfo<'_>,
    ) -> Result<PipelineLayoutIndex> {
        let set_layouts = info
            .set_layouts
            .iter()
            .map(|&l| {
                self.descriptor_set_layouts
                    .resolve(Category::PipelineLayout, "set_layouts", l)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.pipeline_layouts.push(WirePipelineLayout {
            hash,
            flags: info.flags,
            set_layouts,
            push_constant_ranges: info.push_constant_ranges.to_vec(),
        }))
    }

    /// Records a shader module.
    pub fn register_shader_module(
        &mut self,
        hash: Hash,
        info: &ShaderModuleCreateInfo<'_>,
    ) -> Result<ShaderModuleIndex> {
        Ok(self.shader_modules.push(WireShaderModule {
            hash,
            flags: info.flags,
            code: info.code.to_vec(),
        }))
    }

    /// Records a render pass.
    pub fn register_render_pass(
        &mut self,
        hash: Hash,
        info: &RenderPassCreateInfo<'_>,
    ) -> Result<RenderPassIndex> {
        let index = self.render_passes.next_index().get();
        let subpasses = info
            .subpasses
            .iter()
            .map(|s| copy_subpass(index, s))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.render_passes.push(WireRenderPass {
            hash,
            flags: info.flags,
            attachments: info.attachments.to_vec(),
            subpasses,
            dependencies: info.dependencies.to_vec(),
        }))
    }

    /// Records a compute pipeline. The shader module, layout and base
    /// pipeline (if any) must already be bound.
    pub fn register_compute_pipeline(
        &mut self,
        hash: Hash,
        info: &ComputePipelineCreateInfo<'_>,
    ) -> Result<ComputePipelineIndex> {
        let owner = Category::ComputePipeline;
        let index = self.compute_pipelines.next_index().get();
        let row = WireComputePipeline {
            hash,
            flags: info.flags,
            stage: self.copy_stage(owner, index, &info.stage)?,
            layout: self.pipeline_layouts.resolve_opt(owner, "layout", info.layout)?,
            base_pipeline: self.compute_pipelines.resolve_opt(
                owner,
                "base_pipeline_handle",
                info.base_pipeline_handle,
            )?,
            base_pipeline_index: info.base_pipeline_index,
        };
        Ok(self.compute_pipelines.push(row))
    }

    /// Records a graphics pipeline. Shader modules, layout, render pass and
    /// base pipeline (if any) must already be bound.
    pub fn register_graphics_pipeline(
        &mut self,
        hash: Hash,
        info: &GraphicsPipelineCreateInfo<'_>,
    ) -> Result<GraphicsPipelineIndex> {
        let owner = Category::GraphicsPipeline;
        let index = self.graphics_pipelines.next_index().get();
        let stages = info
            .stages
            .iter()
            .map(|s| self.copy_stage(owner, index, s))
            .collect::<Result<Vec<_>>>()?;
        if let Some(vp) = info.viewport_state {
            check_viewport_counts(
                vp.viewports.len(),
                vp.viewport_count,
                vp.scissors.len(),
                vp.scissor_count,
            )
            .map_err(|(field, detail)| CaptureError::structural(owner, index, field, detail))?;
        }

        let row = WireGraphicsPipeline {
            hash,
            flags: info.flags,
            stages,
            vertex_input_state: info.vertex_input_state.map(WireVertexInputState::from_native),
            input_assembly_state: info.input_assembly_state.copied(),
            tessellation_state: info.tessellation_state.copied(),
            viewport_state: info.viewport_state.map(WireViewportState::from_native),
            rasterization_state: info.rasterization_state.copied(),
            multisample_state: info.multisample_state.map(WireMultisampleState::from_native),
            depth_stencil_state: info.depth_stencil_state.copied(),
            color_blend_state: info.color_blend_state.map(WireColorBlendState::from_native),
            dynamic_state: info.dynamic_state.map(WireDynamicState::from_native),
            layout: self.pipeline_layouts.resolve_opt(owner, "layout", info.layout)?,
            render_pass: self
                .render_passes
                .resolve_opt(owner, "render_pass", info.render_pass)?,
            subpass: info.subpass,
            base_pipeline: self.graphics_pipelines.resolve_opt(
                owner,
                "base_pipeline_handle",
                info.base_pipeline_handle,
            )?,
            base_pipeline_index: info.base_pipeline_index,
        };
        Ok(self.graphics_pipelines.push(row))
    }

    fn copy_stage(
        &self,
        owner: Category,
        index: u32,
        stage: &PipelineShaderStage<'_>,
    ) -> Result<WireShaderStage> {
        if let Some(spec) = stage.specialization {
            check_specialization(spec.map_entries, spec.data.len())
                .map_err(|(field, detail)| CaptureError::structural(owner, index, field, detail))?;
        }
        Ok(WireShaderStage {
            flags: stage.flags,
            stage: stage.stage,
            module: self.shader_modules.resolve(owner, "stage.module", stage.module)?,
            name: stage.name.to_owned(),
            specialization: stage.specialization.map(WireSpecialization::from_native),
        })
    }

    // --- HANDLE BINDING ---

    /// Binds the sampler created for `index`.
    pub fn set_sampler_handle(&mut self, index: SamplerIndex, handle: Sampler) -> Result<()> {
        self.samplers.bind(index, handle)
    }

    /// Binds the descriptor-set layout created for `index`.
    pub fn set_descriptor_set_layout_handle(
        &mut self,
        index: DescriptorSetLayoutIndex,
        handle: DescriptorSetLayout,
    ) -> Result<()> {
        self.descriptor_set_layouts.bind(index, handle)
    }

    /// Binds the pipeline layout created for `index`.
    pub fn set_pipeline_layout_handle(
        &mut self,
        index: PipelineLayoutIndex,
        handle: PipelineLayout,
    ) -> Result<()> {
        self.pipeline_layouts.bind(index, handle)
    }

    /// Binds the shader module created for `index`.
    pub fn set_shader_module_handle(
        &mut self,
        index: ShaderModuleIndex,
        handle: ShaderModule,
    ) -> Result<()> {
        self.shader_modules.bind(index, handle)
    }

    /// Binds the render pass created for `index`.
    pub fn set_render_pass_handle(&mut self, index: RenderPassIndex, handle: RenderPass) -> Result<()> {
        self.render_passes.bind(index, handle)
    }

    /// Binds the compute pipeline created for `index`.
    pub fn set_compute_pipeline_handle(
        &mut self,
        index: ComputePipelineIndex,
        handle: Pipeline,
    ) -> Result<()> {
        self.compute_pipelines.bind(index, handle)
    }

    /// Binds the graphics pipeline created for `index`.
    pub fn set_graphics_pipeline_handle(
        &mut self,
        index: GraphicsPipelineIndex,
        handle: Pipeline,
    ) -> Result<()> {
        self.graphics_pipelines.bind(index, handle)
    }

    // --- REVERSE LOOKUPS ---

    /// Hash recorded for a bound sampler.
    pub fn get_hash_for_sampler(&self, handle: Sampler) -> Option<Hash> {
        self.samplers.hash_of(handle)
    }

    /// Hash recorded for a bound descriptor-set layout.
    pub fn get_hash_for_descriptor_set_layout(&self, handle: DescriptorSetLayout) -> Option<Hash> {
        self.descriptor_set_layouts.hash_of(handle)
    }

    /// Hash recorded for a bound pipeline layout.
    pub fn get_hash_for_pipeline_layout(&self, handle: PipelineLayout) -> Option<Hash> {
        self.pipeline_layouts.hash_of(handle)
    }

    /// Hash recorded for a bound shader module.
    pub fn get_hash_for_shader_module(&self, handle: ShaderModule) -> Option<Hash> {
        self.shader_modules.hash_of(handle)
    }

    /// Hash recorded for a bound render pass.
    pub fn get_hash_for_render_pass(&self, handle: RenderPass) -> Option<Hash> {
        self.render_passes.hash_of(handle)
    }

    /// Hash recorded for a bound compute pipeline.
    pub fn get_hash_for_compute_pipeline(&self, handle: Pipeline) -> Option<Hash> {
        self.compute_pipelines.hash_of(handle)
    }

    /// Hash recorded for a bound graphics pipeline.
    pub fn get_hash_for_graphics_pipeline(&self, handle: Pipeline) -> Option<Hash> {
        self.graphics_pipelines.hash_of(handle)
    }

    // --- SERIALIZATION ---

    /// Serializes every table with default options.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.serialize_with(&SerializeOptions::default())
    }

    /// Serializes every table with explicit options.
    pub fn serialize_with(&self, options: &SerializeOptions) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.serialize_into(options, &mut out)?;
        Ok(out)
    }

    /// Serializes every table into a writer.
    pub fn serialize_into<W: Write>(&self, options: &SerializeOptions, out: &mut W) -> Result<()> {
        let samplers = CategoryJob::new(&self.samplers.rows);
        let set_layouts = CategoryJob::new(&self.descriptor_set_layouts.rows);
        let pipeline_layouts = CategoryJob::new(&self.pipeline_layouts.rows);
        let shader_modules = CategoryJob::new(&self.shader_modules.rows);
        let render_passes = CategoryJob::new(&self.render_passes.rows);
        let compute = CategoryJob::new(&self.compute_pipelines.rows);
        let graphics = CategoryJob::new(&self.graphics_pipelines.rows);
        let jobs: [&dyn BlockJob; 7] = [
            &samplers,
            &set_layouts,
            &pipeline_layouts,
            &shader_modules,
            &render_passes,
            &compute,
            &graphics,
        ];

        debug!(
            samplers = self.samplers.rows.len(),
            descriptor_set_layouts = self.descriptor_set_layouts.rows.len(),
            pipeline_layouts = self.pipeline_layouts.rows.len(),
            shader_modules = self.shader_modules.rows.len(),
            render_passes = self.render_passes.rows.len(),
            compute_pipelines = self.compute_pipelines.rows.len(),
            graphics_pipelines = self.graphics_pipelines.rows.len(),
            "Serializing capture"
        );

        let registry = CompressorRegistry::new();
        let compressor = registry.preferred(options.is_compressed());
        write_capture(&jobs, compressor, options.is_parallel(), out)
    }
}

fn copy_subpass(render_pass: u32, subpass: &SubpassDescription<'_>) -> Result<WireSubpass> {
    if let Some(resolve) = subpass.resolve_attachments
        && resolve.len() != subpass.color_attachments.len()
    {
        return Err(CaptureError::structural(
            Category::RenderPass,
            render_pass,
            "resolve_attachments",
            format!(
                "{} resolve attachments for {} color attachments",
                resolve.len(),
                subpass.color_attachments.len()
            ),
        ));
    }

    Ok(WireSubpass {
        flags: subpass.flags,
        pipeline_bind_point: subpass.pipeline_bind_point,
        input_attachments: subpass.input_attachments.to_vec(),
        color_attachments: (!subpass.color_attachments.is_empty())
            .then(|| subpass.color_attachments.to_vec()),
        resolve_attachments: subpass.resolve_attachments.map(<[_]>::to_vec),
        depth_stencil_attachment: subpass.depth_stencil_attachment.copied(),
        preserve_attachments: subpass.preserve_attachments.to_vec(),
    })
}
