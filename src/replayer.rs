// src/replayer.rs

//! The replay side.
//!
//! [`StateReplayer::parse`] validates a capture, then walks its blocks in the
//! fixed dependency order: samplers, descriptor-set layouts, pipeline layouts,
//! shader modules, render passes, compute pipelines, graphics pipelines.
//!
//! For every entry it rebuilds the native create-info inside the replayer's
//! [`ScratchArena`], resolving each index field against the handles already
//! produced for earlier entries, and hands it to the
//! [`StateCreatorInterface`]. Index `0` always resolves to "none" without a
//! table lookup. An index beyond the entries replayed so far is a
//! [`CaptureError::Reference`]; a required reference of `0` is a
//! [`CaptureError::Structural`]. Every failure aborts the parse.

use tracing::{debug, trace, warn};

use crate::arena::ScratchArena;
use crate::compression::CompressorRegistry;
use crate::config::ReplayOptions;
use crate::creator::{HandleSlot, StateCreatorInterface};
use crate::error::{CaptureError, Result};
use crate::handles::{
    DescriptorSetLayout, Pipeline, PipelineLayout, RenderPass, Sampler, ShaderModule,
};
use crate::ids::{
    Category, CategoryKind, ComputePipelineKind, DescriptorSetLayoutKind, GraphicsPipelineKind,
    Index, PipelineLayoutKind, RenderPassKind, SamplerKind, ShaderModuleKind,
};
use crate::info::{
    AttachmentReference, ColorBlendState, ComputePipelineCreateInfo, DescriptorSetLayoutBinding,
    DescriptorSetLayoutCreateInfo, DynamicState, GraphicsPipelineCreateInfo, MultisampleState,
    PipelineLayoutCreateInfo, PipelineShaderStage, RenderPassCreateInfo, SpecializationInfo,
    ShaderModuleCreateInfo, SubpassDescription, VertexInputState, ViewportState,
};
use crate::reader::BlobReader;
use crate::wire::{
    WireColorBlendState, WireComputePipeline, WireDescriptorSetLayout, WireDynamicState,
    WireEntry, WireGraphicsPipeline, WireMultisampleState, WirePipelineLayout, WireRenderPass,
    WireSampler, WireShaderModule, WireShaderStage, WireSpecialization, WireSubpass,
    WireVertexInputState, WireViewportState, check_specialization, check_viewport_counts,
};

/// Handles produced so far for one category, indexed by position.
#[derive(Debug)]
struct ReplayedTable<K: CategoryKind> {
    slots: Vec<HandleSlot<K::Handle>>,
}

impl<K: CategoryKind> ReplayedTable<K> {
    fn handles(&self) -> Vec<Option<K::Handle>> {
        self.slots.iter().map(HandleSlot::get).collect()
    }

    fn first_unset(&self) -> Option<usize> {
        self.slots.iter().position(|slot| !slot.is_set())
    }

    /// Resolves a wire reference held by entry `owner_index` of `owner`.
    fn resolve(
        &self,
        owner: Category,
        owner_index: u32,
        field: &'static str,
        raw: u32,
    ) -> Result<Option<K::Handle>> {
        let Some(index) = Index::<K>::from_wire(raw) else {
            return Ok(None);
        };
        let slot = self.slots.get(index.position()).ok_or(CaptureError::Reference {
            category: owner,
            index: owner_index,
            field,
            target: K::CATEGORY,
            value: raw,
            available: self.slots.len(),
        })?;
        slot.get().map(Some).ok_or_else(|| {
            CaptureError::interface(
                K::CATEGORY,
                Some(raw),
                format!("no handle was produced, needed by {owner} #{owner_index} `{field}`"),
            )
        })
    }

    /// Like [`resolve`](Self::resolve), but `0` is a structural error.
    fn require(
        &self,
        owner: Category,
        owner_index: u32,
        field: &'static str,
        raw: u32,
    ) -> Result<K::Handle> {
        self.resolve(owner, owner_index, field, raw)?.ok_or_else(|| {
            CaptureError::structural(
                owner,
                owner_index,
                field,
                format!("a {} reference is required, found 0", K::CATEGORY),
            )
        })
    }
}

impl<K: CategoryKind> Default for ReplayedTable<K> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

#[derive(Debug, Default)]
struct ReplayTables {
    samplers: ReplayedTable<SamplerKind>,
    descriptor_set_layouts: ReplayedTable<DescriptorSetLayoutKind>,
    pipeline_layouts: ReplayedTable<PipelineLayoutKind>,
    shader_modules: ReplayedTable<ShaderModuleKind>,
    render_passes: ReplayedTable<RenderPassKind>,
    compute_pipelines: ReplayedTable<ComputePipelineKind>,
    graphics_pipelines: ReplayedTable<GraphicsPipelineKind>,
}

/// Type-directed access to the table of one category.
trait TableFor<K: CategoryKind> {
    fn table(&self) -> &ReplayedTable<K>;
    fn table_mut(&mut self) -> &mut ReplayedTable<K>;
}

macro_rules! table_for {
    ($kind:ty, $field:ident) => {
        impl TableFor<$kind> for ReplayTables {
            fn table(&self) -> &ReplayedTable<$kind> {
                &self.$field
            }

            fn table_mut(&mut self) -> &mut ReplayedTable<$kind> {
                &mut self.$field
            }
        }
    };
}

table_for!(SamplerKind, samplers);
table_for!(DescriptorSetLayoutKind, descriptor_set_layouts);
table_for!(PipelineLayoutKind, pipeline_layouts);
table_for!(ShaderModuleKind, shader_modules);
table_for!(RenderPassKind, render_passes);
table_for!(ComputePipelineKind, compute_pipelines);
table_for!(GraphicsPipelineKind, graphics_pipelines);

/// Parses captures and drives a [`StateCreatorInterface`].
///
/// The replayer owns the scratch arena backing every create-info it hands out
/// and the handle tables filled during the last parse.
#[derive(Debug)]
pub struct StateReplayer {
    arena: ScratchArena,
    options: ReplayOptions,
    registry: CompressorRegistry,
    tables: ReplayTables,
}

impl StateReplayer {
    /// A replayer with default options.
    pub fn new() -> Self {
        Self::with_options(ReplayOptions::default())
    }

    /// A replayer with explicit options.
    pub fn with_options(options: ReplayOptions) -> Self {
        Self {
            arena: ScratchArena::with_block_size(options.block_size()),
            options,
            registry: CompressorRegistry::new(),
            tables: ReplayTables::default(),
        }
    }

    /// The options in effect.
    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    /// The scratch arena used by the last parse.
    pub fn arena(&self) -> &ScratchArena {
        &self.arena
    }

    /// Replays every object in `buffer` through `iface`.
    ///
    /// Previous results are discarded first. On success, every replayed handle
    /// table is complete.
    pub fn parse<I>(&mut self, iface: &mut I, buffer: &[u8]) -> Result<()>
    where
        I: StateCreatorInterface + ?Sized,
    {
        self.arena.reset();
        self.tables = ReplayTables::default();

        let reader = BlobReader::new(buffer)?;
        debug!(
            bytes = reader.total_len(),
            version = reader.header().version,
            "Replaying capture"
        );

        let Self {
            arena,
            options,
            registry,
            tables,
        } = &mut *self;
        let mut ctx = ReplayContext {
            arena,
            tables,
            reader: &reader,
            registry,
            verify: options.checks_integrity(),
        };

        ctx.replay_samplers(iface)?;
        ctx.replay_descriptor_set_layouts(iface)?;
        ctx.replay_pipeline_layouts(iface)?;
        ctx.replay_shader_modules(iface)?;
        ctx.replay_render_passes(iface)?;
        ctx.replay_compute_pipelines(iface)?;
        ctx.replay_graphics_pipelines(iface)?;

        debug!(
            arena_blocks = self.arena.block_count(),
            arena_bytes = self.arena.allocated_bytes(),
            "Capture replayed"
        );
        Ok(())
    }

    /// Samplers produced by the last parse, by position.
    pub fn replayed_samplers(&self) -> Vec<Option<Sampler>> {
        self.tables.samplers.handles()
    }

    /// Descriptor-set layouts produced by the last parse, by position.
    pub fn replayed_descriptor_set_layouts(&self) -> Vec<Option<DescriptorSetLayout>> {
        self.tables.descriptor_set_layouts.handles()
    }

    /// Pipeline layouts produced by the last parse, by position.
    pub fn replayed_pipeline_layouts(&self) -> Vec<Option<PipelineLayout>> {
        self.tables.pipeline_layouts.handles()
    }

    /// Shader modules produced by the last parse, by position.
    pub fn replayed_shader_modules(&self) -> Vec<Option<ShaderModule>> {
        self.tables.shader_modules.handles()
    }

    /// Render passes produced by the last parse, by position.
    pub fn replayed_render_passes(&self) -> Vec<Option<RenderPass>> {
        self.tables.render_passes.handles()
    }

    /// Compute pipelines produced by the last parse, by position.
    pub fn replayed_compute_pipelines(&self) -> Vec<Option<Pipeline>> {
        self.tables.compute_pipelines.handles()
    }

    /// Graphics pipelines produced by the last parse, by position.
    pub fn replayed_graphics_pipelines(&self) -> Vec<Option<Pipeline>> {
        self.tables.graphics_pipelines.handles()
    }
}

impl Default for StateReplayer {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one parse. Create-infos borrow the arena for `'r`.
struct ReplayContext<'r, 'b> {
    arena: &'r ScratchArena,
    tables: &'r mut ReplayTables,
    reader: &'r BlobReader<'b>,
    registry: &'r CompressorRegistry,
    verify: bool,
}

impl<'r> ReplayContext<'r, '_> {
    /// Decodes one block and feeds each entry to `enqueue`, then drains the
    /// interface and checks that every handle of the category was produced.
    fn walk<K, T, I, A, E>(&mut self, iface: &mut I, announce: A, mut enqueue: E) -> Result<()>
    where
        K: CategoryKind,
        T: WireEntry,
        I: StateCreatorInterface + ?Sized,
        ReplayTables: TableFor<K>,
        A: FnOnce(&mut I, u32) -> bool,
        E: FnMut(&mut Self, &mut I, Index<K>, &T, HandleSlot<K::Handle>) -> Result<bool>,
    {
        let category = K::CATEGORY;
        let reader = self.reader;
        let block = reader.block(category)?;
        let count = block.entry_count();

        if !announce(iface, count) {
            warn!(category = %category, count, "Creator rejected entry count");
            return Err(CaptureError::interface(
                category,
                None,
                format!("set_num rejected a count of {count}"),
            ));
        }

        let payload = block.payload(self.registry, self.verify)?;
        for (position, entry) in block.entries::<T>(&payload)?.enumerate() {
            let entry = entry?;
            let index = Index::<K>::from_position(position);
            let slot = HandleSlot::new();
            TableFor::<K>::table_mut(&mut *self.tables)
                .slots
                .push(slot.clone());

            trace!(
                category = %category,
                index = index.get(),
                hash = %format!("{:#018x}", entry.hash()),
                "Enqueue"
            );
            if !enqueue(self, iface, index, &entry, slot)? {
                warn!(category = %category, index = index.get(), "Creator rejected entry");
                return Err(CaptureError::interface(
                    category,
                    Some(index.get()),
                    "creation callback reported failure",
                ));
            }
        }

        iface.wait_enqueue();

        if let Some(position) = TableFor::<K>::table(&*self.tables).first_unset() {
            let index = Index::<K>::from_position(position).get();
            warn!(category = %category, index, "Handle missing after wait_enqueue");
            return Err(CaptureError::interface(
                category,
                Some(index),
                "no handle was produced by the time wait_enqueue returned",
            ));
        }

        debug!(category = %category, entries = count, "Category replayed");
        Ok(())
    }

    /// Resolves a same-category base pipeline. Only earlier entries may be
    /// referenced; a slot still pending is given one `wait_enqueue` to land.
    fn resolve_base<K, I>(&self, iface: &mut I, owner: Index<K>, raw: u32) -> Result<Option<K::Handle>>
    where
        K: CategoryKind,
        I: StateCreatorInterface + ?Sized,
        ReplayTables: TableFor<K>,
    {
        if raw >= owner.get() {
            return Err(CaptureError::Reference {
                category: K::CATEGORY,
                index: owner.get(),
                field: "base_pipeline",
                target: K::CATEGORY,
                value: raw,
                available: owner.position(),
            });
        }
        let table = TableFor::<K>::table(&*self.tables);
        if let Some(pending) = Index::<K>::from_wire(raw)
            .and_then(|i| table.slots.get(i.position()))
            .filter(|slot| !slot.is_set())
        {
            trace!(category = %K::CATEGORY, base = raw, "Draining queue for base pipeline");
            iface.wait_enqueue();
            if !pending.is_set() {
                return Err(CaptureError::interface(
                    K::CATEGORY,
                    Some(raw),
                    format!("base of #{} was never produced", owner.get()),
                ));
            }
        }
        table.resolve(K::CATEGORY, owner.get(), "base_pipeline", raw)
    }

    // --- SAMPLERS ---

    fn replay_samplers<I: StateCreatorInterface + ?Sized>(&mut self, iface: &mut I) -> Result<()> {
        self.walk::<SamplerKind, WireSampler, I, _, _>(
            iface,
            |iface, n| iface.set_num_samplers(n),
            |ctx, iface, index, entry, out| {
                let info = ctx.arena.alloc(entry.info)?;
                Ok(iface.enqueue_create_sampler(entry.hash, index, info, out))
            },
        )
    }

    // --- DESCRIPTOR SET LAYOUTS ---

    fn build_descriptor_set_layout(
        &self,
        index: u32,
        entry: &WireDescriptorSetLayout,
    ) -> Result<&'r DescriptorSetLayoutCreateInfo<'r>> {
        let arena = self.arena;
        let owner = Category::DescriptorSetLayout;
        let bindings = arena.alloc_slice_fill_with(entry.bindings.len(), |i| {
            let b = &entry.bindings[i];
            let immutable_samplers = match &b.immutable_samplers {
                None => None,
                Some(list) => Some(&*arena.alloc_slice_fill_with(list.len(), |j| {
                    self.tables
                        .samplers
                        .require(owner, index, "immutable_samplers", list[j])
                })?),
            };
            Ok(DescriptorSetLayoutBinding {
                binding: b.binding,
                descriptor_type: b.descriptor_type,
                descriptor_count: b.descriptor_count,
                stage_flags: b.stage_flags,
                immutable_samplers,
            })
        })?;

        Ok(arena.alloc(DescriptorSetLayoutCreateInfo {
            flags: entry.flags,
            bindings,
        })?)
    }

    fn replay_descriptor_set_layouts<I: StateCreatorInterface + ?Sized>(
        &mut self,
        iface: &mut I,
    ) -> Result<()> {
        self.walk::<DescriptorSetLayoutKind, WireDescriptorSetLayout, I, _, _>(
            iface,
            |iface, n| iface.set_num_descriptor_set_layouts(n),
            |ctx, iface, index, entry, out| {
                let info = ctx.build_descriptor_set_layout(index.get(), entry)?;
                Ok(iface.enqueue_create_descriptor_set_layout(entry.hash, index, info, out))
            },
        )
    }

    // --- PIPELINE LAYOUTS ---

    fn build_pipeline_layout(
        &self,
        index: u32,
        entry: &WirePipelineLayout,
    ) -> Result<&'r PipelineLayoutCreateInfo<'r>> {
        let arena = self.arena;
        let set_layouts = arena.alloc_slice_fill_with(entry.set_layouts.len(), |i| {
            self.tables.descriptor_set_layouts.require(
                Category::PipelineLayout,
                index,
                "set_layouts",
                entry.set_layouts[i],
            )
        })?;
        let push_constant_ranges = arena.alloc_slice_copy(&entry.push_constant_ranges)?;

        Ok(arena.alloc(PipelineLayoutCreateInfo {
            flags: entry.flags,
            set_layouts,
            push_constant_ranges,
        })?)
    }

    fn replay_pipeline_layouts<I: StateCreatorInterface + ?Sized>(
        &mut self,
        iface: &mut I,
    ) -> Result<()> {
        self.walk::<PipelineLayoutKind, WirePipelineLayout, I, _, _>(
            iface,
            |iface, n| iface.set_num_pipeline_layouts(n),
            |ctx, iface, index, entry, out| {
                let info = ctx.build_pipeline_layout(index.get(), entry)?;
                Ok(iface.enqueue_create_pipeline_layout(entry.hash, index, info, out))
            },
        )
    }

    // --- SHADER MODULES ---

    fn replay_shader_modules<I: StateCreatorInterface + ?Sized>(
        &mut self,
        iface: &mut I,
    ) -> Result<()> {
        self.walk::<ShaderModuleKind, WireShaderModule, I, _, _>(
            iface,
            |iface, n| iface.set_num_shader_modules(n),
            |ctx, iface, index, entry, out| {
                let arena = ctx.arena;
                let code = arena.alloc_slice_copy(&entry.code)?;
                let info = arena.alloc(ShaderModuleCreateInfo {
                    flags: entry.flags,
                    code,
                })?;
                Ok(iface.enqueue_create_shader_module(entry.hash, index, info, out))
            },
        )
    }

    // --- RENDER PASSES ---

    fn build_subpass(&self, index: u32, s: &WireSubpass) -> Result<SubpassDescription<'r>> {
        let arena = self.arena;
        let color_attachments: &[AttachmentReference] = match &s.color_attachments {
            Some(list) => arena.alloc_slice_copy(list)?,
            None => &[],
        };

        let resolve_attachments = match &s.resolve_attachments {
            None => None,
            Some(list) if list.len() != color_attachments.len() => {
                return Err(CaptureError::structural(
                    Category::RenderPass,
                    index,
                    "resolve_attachments",
                    format!(
                        "{} resolve attachments for {} color attachments",
                        list.len(),
                        color_attachments.len()
                    ),
                ));
            }
            Some(list) => Some(&*arena.alloc_slice_copy(list)?),
        };

        let depth_stencil_attachment = match s.depth_stencil_attachment {
            None => None,
            Some(reference) => Some(&*arena.alloc(reference)?),
        };

        Ok(SubpassDescription {
            flags: s.flags,
            pipeline_bind_point: s.pipeline_bind_point,
            input_attachments: arena.alloc_slice_copy(&s.input_attachments)?,
            color_attachments,
            resolve_attachments,
            depth_stencil_attachment,
            preserve_attachments: arena.alloc_slice_copy(&s.preserve_attachments)?,
        })
    }

    fn build_render_pass(
        &self,
        index: u32,
        entry: &WireRenderPass,
    ) -> Result<&'r RenderPassCreateInfo<'r>> {
        let arena = self.arena;
        let subpasses = arena.alloc_slice_fill_with(entry.subpasses.len(), |i| {
            self.build_subpass(index, &entry.subpasses[i])
        })?;

        Ok(arena.alloc(RenderPassCreateInfo {
            flags: entry.flags,
            attachments: arena.alloc_slice_copy(&entry.attachments)?,
            subpasses,
            dependencies: arena.alloc_slice_copy(&entry.dependencies)?,
        })?)
    }

    fn replay_render_passes<I: StateCreatorInterface + ?Sized>(
        &mut self,
        iface: &mut I,
    ) -> Result<()> {
        self.walk::<RenderPassKind, WireRenderPass, I, _, _>(
            iface,
            |iface, n| iface.set_num_render_passes(n),
            |ctx, iface, index, entry, out| {
                let info = ctx.build_render_pass(index.get(), entry)?;
                Ok(iface.enqueue_create_render_pass(entry.hash, index, info, out))
            },
        )
    }

    // --- SHADER STAGES ---

    fn build_specialization(
        &self,
        owner: Category,
        index: u32,
        spec: &WireSpecialization,
    ) -> Result<&'r SpecializationInfo<'r>> {
        check_specialization(&spec.map_entries, spec.data.len())
            .map_err(|(field, detail)| CaptureError::structural(owner, index, field, detail))?;

        let arena = self.arena;
        Ok(arena.alloc(SpecializationInfo {
            map_entries: arena.alloc_slice_copy(&spec.map_entries)?,
            data: arena.alloc_slice_copy(&spec.data)?,
        })?)
    }

    fn build_stage(
        &self,
        owner: Category,
        index: u32,
        stage: &WireShaderStage,
    ) -> Result<PipelineShaderStage<'r>> {
        let module = self
            .tables
            .shader_modules
            .require(owner, index, "stage.module", stage.module)?;
        let specialization = match &stage.specialization {
            None => None,
            Some(spec) => Some(self.build_specialization(owner, index, spec)?),
        };

        Ok(PipelineShaderStage {
            flags: stage.flags,
            stage: stage.stage,
            module,
            name: self.arena.alloc_str(&stage.name)?,
            specialization,
        })
    }

    // --- COMPUTE PIPELINES ---

    fn build_compute_pipeline<I: StateCreatorInterface + ?Sized>(
        &self,
        iface: &mut I,
        index: Index<ComputePipelineKind>,
        entry: &WireComputePipeline,
    ) -> Result<&'r ComputePipelineCreateInfo<'r>> {
        let owner = Category::ComputePipeline;
        let stage = self.build_stage(owner, index.get(), &entry.stage)?;
        let layout = self
            .tables
            .pipeline_layouts
            .resolve(owner, index.get(), "layout", entry.layout)?;
        let base_pipeline_handle = self.resolve_base(iface, index, entry.base_pipeline)?;

        Ok(self.arena.alloc(ComputePipelineCreateInfo {
            flags: entry.flags,
            stage,
            layout,
            base_pipeline_handle,
            base_pipeline_index: entry.base_pipeline_index,
        })?)
    }

    fn replay_compute_pipelines<I: StateCreatorInterface + ?Sized>(
        &mut self,
        iface: &mut I,
    ) -> Result<()> {
        self.walk::<ComputePipelineKind, WireComputePipeline, I, _, _>(
            iface,
            |iface, n| iface.set_num_compute_pipelines(n),
            |ctx, iface, index, entry, out| {
                let info = ctx.build_compute_pipeline(iface, index, entry)?;
                Ok(iface.enqueue_create_compute_pipeline(entry.hash, index, info, out))
            },
        )
    }

    // --- GRAPHICS PIPELINES ---

    fn build_vertex_input(&self, s: &WireVertexInputState) -> Result<&'r VertexInputState<'r>> {
        let arena = self.arena;
        Ok(arena.alloc(VertexInputState {
            flags: s.flags,
            bindings: arena.alloc_slice_copy(&s.bindings)?,
            attributes: arena.alloc_slice_copy(&s.attributes)?,
        })?)
    }

    fn build_viewport(&self, index: u32, s: &WireViewportState) -> Result<&'r ViewportState<'r>> {
        check_viewport_counts(
            s.viewports.len(),
            s.viewport_count,
            s.scissors.len(),
            s.scissor_count,
        )
        .map_err(|(field, detail)| {
            CaptureError::structural(Category::GraphicsPipeline, index, field, detail)
        })?;

        let arena = self.arena;
        Ok(arena.alloc(ViewportState {
            flags: s.flags,
            viewport_count: s.viewport_count,
            viewports: arena.alloc_slice_copy(&s.viewports)?,
            scissor_count: s.scissor_count,
            scissors: arena.alloc_slice_copy(&s.scissors)?,
        })?)
    }

    fn build_multisample(&self, s: &WireMultisampleState) -> Result<&'r MultisampleState<'r>> {
        let arena = self.arena;
        let sample_mask = match &s.sample_mask {
            None => None,
            Some(mask) => Some(&*arena.alloc_slice_copy(mask)?),
        };
        Ok(arena.alloc(MultisampleState {
            flags: s.flags,
            rasterization_samples: s.rasterization_samples,
            sample_shading_enable: s.sample_shading_enable,
            min_sample_shading: s.min_sample_shading,
            sample_mask,
            alpha_to_coverage_enable: s.alpha_to_coverage_enable,
            alpha_to_one_enable: s.alpha_to_one_enable,
        })?)
    }

    fn build_color_blend(&self, s: &WireColorBlendState) -> Result<&'r ColorBlendState<'r>> {
        let arena = self.arena;
        Ok(arena.alloc(ColorBlendState {
            flags: s.flags,
            logic_op_enable: s.logic_op_enable,
            logic_op: s.logic_op,
            attachments: arena.alloc_slice_copy(&s.attachments)?,
            blend_constants: s.blend_constants,
        })?)
    }

    fn build_dynamic(&self, s: &WireDynamicState) -> Result<&'r DynamicState<'r>> {
        let arena = self.arena;
        Ok(arena.alloc(DynamicState {
            flags: s.flags,
            dynamic_states: arena.alloc_slice_copy(&s.dynamic_states)?,
        })?)
    }

    fn build_graphics_pipeline<I: StateCreatorInterface + ?Sized>(
        &self,
        iface: &mut I,
        index: Index<GraphicsPipelineKind>,
        entry: &WireGraphicsPipeline,
    ) -> Result<&'r GraphicsPipelineCreateInfo<'r>> {
        let owner = Category::GraphicsPipeline;
        let arena = self.arena;
        let raw = index.get();

        let stages = arena.alloc_slice_fill_with(entry.stages.len(), |i| {
            self.build_stage(owner, raw, &entry.stages[i])
        })?;

        let vertex_input_state = match &entry.vertex_input_state {
            None => None,
            Some(s) => Some(self.build_vertex_input(s)?),
        };
        let input_assembly_state = match entry.input_assembly_state {
            None => None,
            Some(s) => Some(&*arena.alloc(s)?),
        };
        let tessellation_state = match entry.tessellation_state {
            None => None,
            Some(s) => Some(&*arena.alloc(s)?),
        };
        let viewport_state = match &entry.viewport_state {
            None => None,
            Some(s) => Some(self.build_viewport(raw, s)?),
        };
        let rasterization_state = match entry.rasterization_state {
            None => None,
            Some(s) => Some(&*arena.alloc(s)?),
        };
        let multisample_state = match &entry.multisample_state {
            None => None,
            Some(s) => Some(self.build_multisample(s)?),
        };
        let depth_stencil_state = match entry.depth_stencil_state {
            None => None,
            Some(s) => Some(&*arena.alloc(s)?),
        };
        let color_blend_state = match &entry.color_blend_state {
            None => None,
            Some(s) => Some(self.build_color_blend(s)?),
        };
        let dynamic_state = match &entry.dynamic_state {
            None => None,
            Some(s) => Some(self.build_dynamic(s)?),
        };

        let layout = self
            .tables
            .pipeline_layouts
            .resolve(owner, raw, "layout", entry.layout)?;
        let render_pass = self
            .tables
            .render_passes
            .resolve(owner, raw, "render_pass", entry.render_pass)?;
        let base_pipeline_handle = self.resolve_base(iface, index, entry.base_pipeline)?;

        Ok(arena.alloc(GraphicsPipelineCreateInfo {
            flags: entry.flags,
            stages,
            vertex_input_state,
            input_assembly_state,
            tessellation_state,
            viewport_state,
            rasterization_state,
            multisample_state,
            depth_stencil_state,
            color_blend_state,
            dynamic_state,
            layout,
            render_pass,
            subpass: entry.subpass,
            base_pipeline_handle,
            base_pipeline_index: entry.base_pipeline_index,
        })?)
    }

    fn replay_graphics_pipelines<I: StateCreatorInterface + ?Sized>(
        &mut self,
        iface: &mut I,
    ) -> Result<()> {
        self.walk::<GraphicsPipelineKind, WireGraphicsPipeline, I, _, _>(
            iface,
            |iface, n| iface.set_num_graphics_pipelines(n),
            |ctx, iface, index, entry, out| {
                let info = ctx.build_graphics_pipeline(iface, index, entry)?;
                Ok(iface.enqueue_create_graphics_pipeline(entry.hash, index, info, out))
            },
        )
    }
}
