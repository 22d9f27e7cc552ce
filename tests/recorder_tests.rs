mod common;

use common::{handle, linear_sampler, record_scene};
use psocapture::hashing::*;
use psocapture::*;

#[test]
fn test_indices_are_dense_and_one_based() -> Result<()> {
    let mut recorder = StateRecorder::new();
    let info = linear_sampler();
    let hash = compute_hash_sampler(&info);

    let first = recorder.register_sampler(hash, &info)?;
    let second = recorder.register_sampler(hash, &info)?;

    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 2);
    assert_eq!(first.category(), Category::Sampler);
    assert_eq!(recorder.count(Category::Sampler), 2);
    assert_eq!(recorder.count(Category::GraphicsPipeline), 0);
    Ok(())
}

#[test]
fn test_unbound_handle_is_rejected() -> Result<()> {
    let mut recorder = StateRecorder::new();
    let set_layouts = [handle::<DescriptorSetLayout>(0x42)];
    let info = PipelineLayoutCreateInfo {
        flags: 0,
        set_layouts: &set_layouts,
        push_constant_ranges: &[],
    };

    let err = compute_hash_pipeline_layout(&recorder, &info).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::UnknownHandle {
            category: Category::PipelineLayout,
            target: Category::DescriptorSetLayout,
            handle: 0x42,
            ..
        }
    ));

    let err = recorder.register_pipeline_layout(1, &info).unwrap_err();
    assert!(matches!(err, CaptureError::UnknownHandle { .. }));
    assert_eq!(recorder.count(Category::PipelineLayout), 0);
    Ok(())
}

#[test]
fn test_set_handle_out_of_range() {
    let mut recorder = StateRecorder::new();
    let err = recorder
        .set_sampler_handle(Index::from_position(3), handle(1))
        .unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Reference {
            category: Category::Sampler,
            value: 4,
            available: 0,
            ..
        }
    ));
}

#[test]
fn test_first_binding_wins() -> Result<()> {
    let mut recorder = StateRecorder::new();
    let a = SamplerCreateInfo {
        mag_filter: 0,
        ..Default::default()
    };
    let b = SamplerCreateInfo {
        mag_filter: 1,
        ..Default::default()
    };
    let (hash_a, hash_b) = (compute_hash_sampler(&a), compute_hash_sampler(&b));
    let ia = recorder.register_sampler(hash_a, &a)?;
    let ib = recorder.register_sampler(hash_b, &b)?;

    let shared = handle::<Sampler>(0x10);
    recorder.set_sampler_handle(ia, shared)?;
    recorder.set_sampler_handle(ib, shared)?;

    assert_eq!(recorder.get_hash_for_sampler(shared), Some(hash_a));
    Ok(())
}

#[test]
fn test_hash_lookup_for_unknown_handle() -> Result<()> {
    let mut recorder = StateRecorder::new();
    let hashes = record_scene(&mut recorder)?;

    assert_eq!(recorder.get_hash_for_sampler(handle(0x100)), Some(hashes.sampler));
    assert_eq!(recorder.get_hash_for_sampler(handle(0x999)), None);
    assert_eq!(
        recorder.get_hash_for_graphics_pipeline(handle(0x701)),
        Some(hashes.derived)
    );
    // Compute and graphics pipelines are looked up in separate tables.
    assert_eq!(recorder.get_hash_for_compute_pipeline(handle(0x701)), None);
    assert_eq!(
        recorder.get_hash_for_compute_pipeline(handle(0x600)),
        Some(hashes.compute)
    );
    Ok(())
}

#[test]
fn test_child_hashes_feed_parent_hashes() -> Result<()> {
    let mut one = StateRecorder::new();
    let mut two = StateRecorder::new();

    // Same layout contents, different sampler bound to the same handle.
    let sampler_a = linear_sampler();
    let sampler_b = SamplerCreateInfo {
        max_lod: 1.0,
        ..linear_sampler()
    };
    for (recorder, info) in [(&mut one, sampler_a), (&mut two, sampler_b)] {
        let idx = recorder.register_sampler(compute_hash_sampler(&info), &info)?;
        recorder.set_sampler_handle(idx, handle(0x1))?;
    }

    let samplers = [handle::<Sampler>(0x1)];
    let bindings = [DescriptorSetLayoutBinding {
        binding: 0,
        descriptor_type: 1,
        descriptor_count: 1,
        stage_flags: 0x10,
        immutable_samplers: Some(&samplers[..]),
    }];
    let info = DescriptorSetLayoutCreateInfo {
        flags: 0,
        bindings: &bindings,
    };

    assert_ne!(
        compute_hash_descriptor_set_layout(&one, &info)?,
        compute_hash_descriptor_set_layout(&two, &info)?
    );
    Ok(())
}

#[test]
fn test_optional_state_presence_changes_hash() -> Result<()> {
    let mut recorder = StateRecorder::new();
    let hashes = record_scene(&mut recorder)?;
    assert_ne!(hashes.opaque, hashes.derived);

    let zeroed = DepthStencilState::default();
    let base = GraphicsPipelineCreateInfo::default();
    let with_zeroed = GraphicsPipelineCreateInfo {
        depth_stencil_state: Some(&zeroed),
        ..base
    };
    assert_ne!(
        compute_hash_graphics_pipeline(&recorder, &base)?,
        compute_hash_graphics_pipeline(&recorder, &with_zeroed)?
    );
    Ok(())
}

#[test]
fn test_mismatched_resolve_attachments_rejected() {
    let mut recorder = StateRecorder::new();
    let color = [AttachmentReference::default(); 2];
    let resolve = [AttachmentReference::default(); 1];
    let subpasses = [SubpassDescription {
        color_attachments: &color,
        resolve_attachments: Some(&resolve[..]),
        ..Default::default()
    }];
    let info = RenderPassCreateInfo {
        subpasses: &subpasses,
        ..Default::default()
    };

    let err = recorder.register_render_pass(1, &info).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Structural {
            category: Category::RenderPass,
            index: 1,
            field: "resolve_attachments",
            ..
        }
    ));
}

fn bound_module(recorder: &mut StateRecorder) -> Result<ShaderModule> {
    let code = [0x0723_0203_u32, 1];
    let info = ShaderModuleCreateInfo { flags: 0, code: &code };
    let idx = recorder.register_shader_module(compute_hash_shader_module(&info), &info)?;
    let module = handle::<ShaderModule>(0x40);
    recorder.set_shader_module_handle(idx, module)?;
    Ok(module)
}

#[test]
fn test_specialization_past_data_rejected() -> Result<()> {
    let mut recorder = StateRecorder::new();
    let module = bound_module(&mut recorder)?;
    let entries = [SpecializationMapEntry {
        constant_id: 3,
        offset: 0,
        size: 16,
    }];
    let spec = SpecializationInfo {
        map_entries: &entries,
        data: &[1, 0, 0, 0],
    };
    let info = ComputePipelineCreateInfo {
        flags: 0,
        stage: PipelineShaderStage {
            flags: 0,
            stage: 0x20,
            module,
            name: "main",
            specialization: Some(&spec),
        },
        layout: None,
        base_pipeline_handle: None,
        base_pipeline_index: -1,
    };

    let err = recorder.register_compute_pipeline(7, &info).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Structural {
            category: Category::ComputePipeline,
            index: 1,
            field: "stage.specialization",
            ..
        }
    ));
    assert_eq!(recorder.count(Category::ComputePipeline), 0);
    Ok(())
}

#[test]
fn test_static_viewports_must_match_declared_count() -> Result<()> {
    let mut recorder = StateRecorder::new();
    let module = bound_module(&mut recorder)?;
    let stages = [PipelineShaderStage {
        flags: 0,
        stage: 0x1,
        module,
        name: "main",
        specialization: None,
    }];
    let viewports = [Viewport::default(); 2];
    let scissors = [Rect2D::default(); 3];

    let too_many_viewports = ViewportState {
        viewport_count: 1,
        viewports: &viewports,
        ..Default::default()
    };
    let info = GraphicsPipelineCreateInfo {
        stages: &stages,
        viewport_state: Some(&too_many_viewports),
        ..Default::default()
    };
    let err = recorder.register_graphics_pipeline(8, &info).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Structural {
            category: Category::GraphicsPipeline,
            index: 1,
            field: "viewport_state.viewports",
            ..
        }
    ));

    let wrong_scissors = ViewportState {
        viewport_count: 2,
        viewports: &viewports,
        scissor_count: 2,
        scissors: &scissors,
        ..Default::default()
    };
    let info = GraphicsPipelineCreateInfo {
        stages: &stages,
        viewport_state: Some(&wrong_scissors),
        ..Default::default()
    };
    let err = recorder.register_graphics_pipeline(8, &info).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Structural {
            field: "viewport_state.scissors",
            ..
        }
    ));

    // Dynamic viewports: counts without static arrays.
    let dynamic = ViewportState {
        viewport_count: 2,
        scissor_count: 2,
        ..Default::default()
    };
    let info = GraphicsPipelineCreateInfo {
        stages: &stages,
        viewport_state: Some(&dynamic),
        ..Default::default()
    };
    let index = recorder.register_graphics_pipeline(8, &info)?;
    assert_eq!(index.get(), 1);
    Ok(())
}

#[test]
fn test_serialize_is_deterministic() -> Result<()> {
    let mut a = StateRecorder::new();
    let mut b = StateRecorder::new();
    record_scene(&mut a)?;
    record_scene(&mut b)?;

    assert_eq!(a.serialize()?, b.serialize()?);
    Ok(())
}

#[test]
fn test_serialize_into_matches_serialize() -> Result<()> {
    let mut recorder = StateRecorder::new();
    record_scene(&mut recorder)?;

    let mut out = Vec::new();
    recorder.serialize_into(&SerializeOptions::default(), &mut out)?;
    assert_eq!(out, recorder.serialize()?);
    Ok(())
}
