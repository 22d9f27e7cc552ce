//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use psocapture::handles::NativeHandle;
use psocapture::hashing::*;
use psocapture::*;

pub fn handle<H: NativeHandle>(raw: u64) -> H {
    H::from_raw(raw).expect("test handles are non-zero")
}

/// One call received by [`PassThrough`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub category: Category,
    pub index: u32,
    pub hash: Hash,
    pub handle: u64,
}

/// Owned copy of the interesting parts of a replayed graphics pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsSnapshot {
    pub stage_modules: Vec<ShaderModule>,
    pub stage_names: Vec<String>,
    pub layout: Option<PipelineLayout>,
    pub render_pass: Option<RenderPass>,
    pub base: Option<Pipeline>,
    pub has_depth_stencil: bool,
    pub color_attachments: Option<usize>,
    pub dynamic_states: Vec<u32>,
    pub viewport_count: Option<u32>,
}

/// A creator that accepts everything, fabricating handles `1, 2, 3...`
/// in call order and keeping owned copies of what it was handed.
#[derive(Debug, Default)]
pub struct PassThrough {
    next: u64,
    pub announced: Vec<(Category, u32)>,
    pub calls: Vec<Call>,
    pub waits: usize,
    pub samplers: Vec<SamplerCreateInfo>,
    pub immutable_samplers: Vec<Vec<Option<Vec<Sampler>>>>,
    pub set_layouts: Vec<Vec<DescriptorSetLayout>>,
    pub push_constants: Vec<Vec<PushConstantRange>>,
    pub shader_code: Vec<Vec<u32>>,
    pub subpass_depth: Vec<Vec<Option<AttachmentReference>>>,
    pub subpass_colors: Vec<Vec<Vec<AttachmentReference>>>,
    pub compute: Vec<(ShaderModule, Option<PipelineLayout>, String, Option<Vec<u8>>)>,
    pub graphics: Vec<GraphicsSnapshot>,
}

impl PassThrough {
    pub fn new() -> Self {
        Self::default()
    }

    fn produce<H: NativeHandle>(
        &mut self,
        category: Category,
        index: u32,
        hash: Hash,
        out: HandleSlot<H>,
    ) -> bool {
        self.next += 1;
        self.calls.push(Call {
            category,
            index,
            hash,
            handle: self.next,
        });
        out.set(handle(self.next))
    }

    pub fn categories(&self) -> Vec<Category> {
        self.calls.iter().map(|c| c.category).collect()
    }
}

impl StateCreatorInterface for PassThrough {
    fn set_num_samplers(&mut self, count: u32) -> bool {
        self.announced.push((Category::Sampler, count));
        true
    }

    fn set_num_graphics_pipelines(&mut self, count: u32) -> bool {
        self.announced.push((Category::GraphicsPipeline, count));
        true
    }

    fn enqueue_create_sampler(
        &mut self,
        hash: Hash,
        index: SamplerIndex,
        info: &SamplerCreateInfo,
        out: HandleSlot<Sampler>,
    ) -> bool {
        self.samplers.push(*info);
        self.produce(Category::Sampler, index.get(), hash, out)
    }

    fn enqueue_create_descriptor_set_layout(
        &mut self,
        hash: Hash,
        index: DescriptorSetLayoutIndex,
        info: &DescriptorSetLayoutCreateInfo<'_>,
        out: HandleSlot<DescriptorSetLayout>,
    ) -> bool {
        self.immutable_samplers.push(
            info.bindings
                .iter()
                .map(|b| b.immutable_samplers.map(<[Sampler]>::to_vec))
                .collect(),
        );
        self.produce(Category::DescriptorSetLayout, index.get(), hash, out)
    }

    fn enqueue_create_pipeline_layout(
        &mut self,
        hash: Hash,
        index: PipelineLayoutIndex,
        info: &PipelineLayoutCreateInfo<'_>,
        out: HandleSlot<PipelineLayout>,
    ) -> bool {
        self.set_layouts.push(info.set_layouts.to_vec());
        self.push_constants.push(info.push_constant_ranges.to_vec());
        self.produce(Category::PipelineLayout, index.get(), hash, out)
    }

    fn enqueue_create_shader_module(
        &mut self,
        hash: Hash,
        index: ShaderModuleIndex,
        info: &ShaderModuleCreateInfo<'_>,
        out: HandleSlot<ShaderModule>,
    ) -> bool {
        self.shader_code.push(info.code.to_vec());
        self.produce(Category::ShaderModule, index.get(), hash, out)
    }

    fn enqueue_create_render_pass(
        &mut self,
        hash: Hash,
        index: RenderPassIndex,
        info: &RenderPassCreateInfo<'_>,
        out: HandleSlot<RenderPass>,
    ) -> bool {
        self.subpass_depth.push(
            info.subpasses
                .iter()
                .map(|s| s.depth_stencil_attachment.copied())
                .collect(),
        );
        self.subpass_colors.push(
            info.subpasses
                .iter()
                .map(|s| s.color_attachments.to_vec())
                .collect(),
        );
        self.produce(Category::RenderPass, index.get(), hash, out)
    }

    fn enqueue_create_compute_pipeline(
        &mut self,
        hash: Hash,
        index: ComputePipelineIndex,
        info: &ComputePipelineCreateInfo<'_>,
        out: HandleSlot<Pipeline>,
    ) -> bool {
        self.compute.push((
            info.stage.module,
            info.layout,
            info.stage.name.to_owned(),
            info.stage.specialization.map(|s| s.data.to_vec()),
        ));
        self.produce(Category::ComputePipeline, index.get(), hash, out)
    }

    fn enqueue_create_graphics_pipeline(
        &mut self,
        hash: Hash,
        index: GraphicsPipelineIndex,
        info: &GraphicsPipelineCreateInfo<'_>,
        out: HandleSlot<Pipeline>,
    ) -> bool {
        self.graphics.push(GraphicsSnapshot {
            stage_modules: info.stages.iter().map(|s| s.module).collect(),
            stage_names: info.stages.iter().map(|s| s.name.to_owned()).collect(),
            layout: info.layout,
            render_pass: info.render_pass,
            base: info.base_pipeline_handle,
            has_depth_stencil: info.depth_stencil_state.is_some(),
            color_attachments: info.color_blend_state.map(|c| c.attachments.len()),
            dynamic_states: info
                .dynamic_state
                .map(|d| d.dynamic_states.to_vec())
                .unwrap_or_default(),
            viewport_count: info.viewport_state.map(|v| v.viewport_count),
        });
        self.produce(Category::GraphicsPipeline, index.get(), hash, out)
    }

    fn wait_enqueue(&mut self) {
        self.waits += 1;
    }
}

pub fn linear_sampler() -> SamplerCreateInfo {
    SamplerCreateInfo {
        mag_filter: 1,
        min_filter: 1,
        mipmap_mode: 1,
        address_mode_u: 2,
        address_mode_v: 2,
        address_mode_w: 2,
        mip_lod_bias: 0.5,
        anisotropy_enable: true,
        max_anisotropy: 16.0,
        max_lod: 12.0,
        ..Default::default()
    }
}

/// Hashes recorded for the scene built by [`record_scene`].
#[derive(Debug, Clone)]
pub struct SceneHashes {
    pub sampler: Hash,
    pub set_layout: Hash,
    pub pipeline_layout: Hash,
    pub vertex: Hash,
    pub fragment: Hash,
    pub compute_module: Hash,
    pub render_pass: Hash,
    pub compute: Hash,
    pub opaque: Hash,
    pub derived: Hash,
}

/// Records one object of every category, binding handles the way an
/// application would after creating each one. Graphics pipeline #2 derives
/// from #1 and has no depth-stencil state.
pub fn record_scene(recorder: &mut StateRecorder) -> Result<SceneHashes> {
    // Samplers
    let sampler_info = linear_sampler();
    let sampler = compute_hash_sampler(&sampler_info);
    let idx = recorder.register_sampler(sampler, &sampler_info)?;
    recorder.set_sampler_handle(idx, handle(0x100))?;

    // Descriptor-set layouts
    let immutable = [handle::<Sampler>(0x100)];
    let bindings = [
        DescriptorSetLayoutBinding {
            binding: 0,
            descriptor_type: 1,
            descriptor_count: 1,
            stage_flags: 0x10,
            immutable_samplers: Some(&immutable[..]),
        },
        DescriptorSetLayoutBinding {
            binding: 1,
            descriptor_type: 6,
            descriptor_count: 1,
            stage_flags: 0x1,
            immutable_samplers: None,
        },
    ];
    let set_layout_info = DescriptorSetLayoutCreateInfo {
        flags: 0,
        bindings: &bindings,
    };
    let set_layout = compute_hash_descriptor_set_layout(recorder, &set_layout_info)?;
    let idx = recorder.register_descriptor_set_layout(set_layout, &set_layout_info)?;
    recorder.set_descriptor_set_layout_handle(idx, handle(0x200))?;

    // Pipeline layouts
    let set_layouts = [handle::<DescriptorSetLayout>(0x200)];
    let ranges = [PushConstantRange {
        stage_flags: 0x1,
        offset: 0,
        size: 64,
    }];
    let layout_info = PipelineLayoutCreateInfo {
        flags: 0,
        set_layouts: &set_layouts,
        push_constant_ranges: &ranges,
    };
    let pipeline_layout = compute_hash_pipeline_layout(recorder, &layout_info)?;
    let idx = recorder.register_pipeline_layout(pipeline_layout, &layout_info)?;
    recorder.set_pipeline_layout_handle(idx, handle(0x300))?;

    // Shader modules
    let mut module_hashes = Vec::new();
    for (raw, code) in [
        (0x401_u64, &[0x0723_0203_u32, 1, 2, 3][..]),
        (0x402, &[0x0723_0203, 4, 5][..]),
        (0x403, &[0x0723_0203, 6][..]),
    ] {
        let info = ShaderModuleCreateInfo { flags: 0, code };
        let hash = compute_hash_shader_module(&info);
        let idx = recorder.register_shader_module(hash, &info)?;
        recorder.set_shader_module_handle(idx, handle(raw))?;
        module_hashes.push(hash);
    }

    // Render passes
    let attachments = [
        AttachmentDescription {
            format: 44,
            samples: 1,
            final_layout: 1000001002,
            ..Default::default()
        },
        AttachmentDescription {
            format: 126,
            samples: 1,
            final_layout: 3,
            ..Default::default()
        },
    ];
    let color = [AttachmentReference {
        attachment: 0,
        layout: 2,
    }];
    let depth = AttachmentReference {
        attachment: 1,
        layout: 3,
    };
    let subpasses = [SubpassDescription {
        color_attachments: &color,
        depth_stencil_attachment: Some(&depth),
        ..Default::default()
    }];
    let render_pass_info = RenderPassCreateInfo {
        flags: 0,
        attachments: &attachments,
        subpasses: &subpasses,
        dependencies: &[],
    };
    let render_pass = compute_hash_render_pass(&render_pass_info);
    let idx = recorder.register_render_pass(render_pass, &render_pass_info)?;
    recorder.set_render_pass_handle(idx, handle(0x500))?;

    // Compute pipelines
    let spec_entries = [SpecializationMapEntry {
        constant_id: 0,
        offset: 0,
        size: 4,
    }];
    let spec = SpecializationInfo {
        map_entries: &spec_entries,
        data: &[8, 0, 0, 0],
    };
    let compute_info = ComputePipelineCreateInfo {
        flags: 0,
        stage: PipelineShaderStage {
            flags: 0,
            stage: 0x20,
            module: handle(0x403),
            name: "cs_main",
            specialization: Some(&spec),
        },
        layout: Some(handle(0x300)),
        base_pipeline_handle: None,
        base_pipeline_index: -1,
    };
    let compute = compute_hash_compute_pipeline(recorder, &compute_info)?;
    let idx = recorder.register_compute_pipeline(compute, &compute_info)?;
    recorder.set_compute_pipeline_handle(idx, handle(0x600))?;

    // Graphics pipelines
    let stages = [
        PipelineShaderStage {
            flags: 0,
            stage: 0x1,
            module: handle(0x401),
            name: "vs_main",
            specialization: None,
        },
        PipelineShaderStage {
            flags: 0,
            stage: 0x10,
            module: handle(0x402),
            name: "fs_main",
            specialization: None,
        },
    ];
    let vertex_bindings = [VertexInputBinding {
        binding: 0,
        stride: 32,
        input_rate: 0,
    }];
    let vertex_attributes = [
        VertexInputAttribute {
            location: 0,
            binding: 0,
            format: 106,
            offset: 0,
        },
        VertexInputAttribute {
            location: 1,
            binding: 0,
            format: 103,
            offset: 12,
        },
    ];
    let vertex_input = VertexInputState {
        flags: 0,
        bindings: &vertex_bindings,
        attributes: &vertex_attributes,
    };
    let input_assembly = InputAssemblyState {
        topology: 3,
        ..Default::default()
    };
    let viewport = ViewportState {
        viewport_count: 1,
        scissor_count: 1,
        ..Default::default()
    };
    let raster = RasterizationState {
        cull_mode: 2,
        line_width: 1.0,
        ..Default::default()
    };
    let multisample = MultisampleState {
        rasterization_samples: 1,
        ..Default::default()
    };
    let depth_stencil = DepthStencilState {
        depth_test_enable: true,
        depth_write_enable: true,
        depth_compare_op: 3,
        ..Default::default()
    };
    let blend_attachments = [ColorBlendAttachment {
        color_write_mask: 0xf,
        ..Default::default()
    }];
    let color_blend = ColorBlendState {
        attachments: &blend_attachments,
        ..Default::default()
    };
    let dynamic = DynamicState {
        flags: 0,
        dynamic_states: &[0, 1],
    };

    let opaque_info = GraphicsPipelineCreateInfo {
        flags: 0x2,
        stages: &stages,
        vertex_input_state: Some(&vertex_input),
        input_assembly_state: Some(&input_assembly),
        viewport_state: Some(&viewport),
        rasterization_state: Some(&raster),
        multisample_state: Some(&multisample),
        depth_stencil_state: Some(&depth_stencil),
        color_blend_state: Some(&color_blend),
        dynamic_state: Some(&dynamic),
        layout: Some(handle(0x300)),
        render_pass: Some(handle(0x500)),
        subpass: 0,
        base_pipeline_index: -1,
        ..Default::default()
    };
    let opaque = compute_hash_graphics_pipeline(recorder, &opaque_info)?;
    let idx = recorder.register_graphics_pipeline(opaque, &opaque_info)?;
    recorder.set_graphics_pipeline_handle(idx, handle(0x700))?;

    let derived_info = GraphicsPipelineCreateInfo {
        flags: 0x4,
        depth_stencil_state: None,
        base_pipeline_handle: Some(handle(0x700)),
        ..opaque_info
    };
    let derived = compute_hash_graphics_pipeline(recorder, &derived_info)?;
    let idx = recorder.register_graphics_pipeline(derived, &derived_info)?;
    recorder.set_graphics_pipeline_handle(idx, handle(0x701))?;

    Ok(SceneHashes {
        sampler,
        set_layout,
        pipeline_layout,
        vertex: module_hashes[0],
        fragment: module_hashes[1],
        compute_module: module_hashes[2],
        render_pass,
        compute,
        opaque,
        derived,
    })
}
