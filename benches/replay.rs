#![allow(missing_docs)]

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use psocapture::hashing::*;
use psocapture::*;
use std::hint::black_box;

fn h<T: handles::NativeHandle>(raw: u64) -> T {
    T::from_raw(raw).expect("non-zero")
}

/// A recorder holding `count` graphics pipelines that share one layout, one
/// render pass and a pair of shader modules.
fn build_recorder(count: u32) -> Result<StateRecorder> {
    let mut rec = StateRecorder::new();

    let layout_info = PipelineLayoutCreateInfo::default();
    let idx = rec.register_pipeline_layout(compute_hash_pipeline_layout(&rec, &layout_info)?, &layout_info)?;
    rec.set_pipeline_layout_handle(idx, h(1))?;

    let code = vec![0x0723_0203u32; 256];
    for raw in [2, 3] {
        let info = ShaderModuleCreateInfo { flags: 0, code: &code };
        let idx = rec.register_shader_module(compute_hash_shader_module(&info), &info)?;
        rec.set_shader_module_handle(idx, h(raw))?;
    }

    let color = [AttachmentReference::default()];
    let subpasses = [SubpassDescription {
        color_attachments: &color,
        ..Default::default()
    }];
    let attachments = [AttachmentDescription::default()];
    let pass_info = RenderPassCreateInfo {
        attachments: &attachments,
        subpasses: &subpasses,
        ..Default::default()
    };
    let idx = rec.register_render_pass(compute_hash_render_pass(&pass_info), &pass_info)?;
    rec.set_render_pass_handle(idx, h(4))?;

    let stages = [
        PipelineShaderStage {
            flags: 0,
            stage: 0x1,
            module: h(2),
            name: "vs_main",
            specialization: None,
        },
        PipelineShaderStage {
            flags: 0,
            stage: 0x10,
            module: h(3),
            name: "fs_main",
            specialization: None,
        },
    ];
    let blend = [ColorBlendAttachment::default()];
    let color_blend = ColorBlendState {
        attachments: &blend,
        ..Default::default()
    };
    let multisample = MultisampleState {
        rasterization_samples: 1,
        ..Default::default()
    };

    for i in 0..count {
        let raster = RasterizationState {
            cull_mode: i % 4,
            line_width: 1.0 + i as f32,
            ..Default::default()
        };
        let info = GraphicsPipelineCreateInfo {
            stages: &stages,
            rasterization_state: Some(&raster),
            multisample_state: Some(&multisample),
            color_blend_state: Some(&color_blend),
            layout: Some(h(1)),
            render_pass: Some(h(4)),
            ..Default::default()
        };
        let idx = rec.register_graphics_pipeline(compute_hash_graphics_pipeline(&rec, &info)?, &info)?;
        rec.set_graphics_pipeline_handle(idx, h(0x1000 + u64::from(i)))?;
    }
    Ok(rec)
}

struct Null(u64);

impl Null {
    fn next<H: handles::NativeHandle>(&mut self, out: HandleSlot<H>) -> bool {
        self.0 += 1;
        out.set(h(self.0))
    }
}

impl StateCreatorInterface for Null {
    fn enqueue_create_pipeline_layout(
        &mut self,
        _: Hash,
        _: PipelineLayoutIndex,
        _: &PipelineLayoutCreateInfo<'_>,
        out: HandleSlot<PipelineLayout>,
    ) -> bool {
        self.next(out)
    }

    fn enqueue_create_shader_module(
        &mut self,
        _: Hash,
        _: ShaderModuleIndex,
        _: &ShaderModuleCreateInfo<'_>,
        out: HandleSlot<ShaderModule>,
    ) -> bool {
        self.next(out)
    }

    fn enqueue_create_render_pass(
        &mut self,
        _: Hash,
        _: RenderPassIndex,
        _: &RenderPassCreateInfo<'_>,
        out: HandleSlot<RenderPass>,
    ) -> bool {
        self.next(out)
    }

    fn enqueue_create_graphics_pipeline(
        &mut self,
        _: Hash,
        _: GraphicsPipelineIndex,
        info: &GraphicsPipelineCreateInfo<'_>,
        out: HandleSlot<Pipeline>,
    ) -> bool {
        black_box(info.stages.len());
        self.next(out)
    }
}

// --- BENCHMARKS ---

fn bench_serialize(c: &mut Criterion) {
    let count = 10_000;
    let rec = build_recorder(count).expect("recorder");
    let size = rec.serialize().expect("serialize").len();

    let mut group = c.benchmark_group("Capture Write");
    group.throughput(Throughput::Bytes(size as u64));

    group.bench_function("sequential", |b| {
        let options = SerializeOptions::new();
        b.iter(|| black_box(rec.serialize_with(&options).expect("serialize")))
    });

    group.bench_function("parallel", |b| {
        let options = SerializeOptions::new().parallel(true);
        b.iter(|| black_box(rec.serialize_with(&options).expect("serialize")))
    });

    #[cfg(feature = "lz4_flex")]
    group.bench_function("parallel_lz4", |b| {
        let options = SerializeOptions::new().parallel(true).compression(true);
        b.iter(|| black_box(rec.serialize_with(&options).expect("serialize")))
    });

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let count = 10_000;
    let blob = build_recorder(count)
        .and_then(|rec| rec.serialize())
        .expect("capture");

    let mut group = c.benchmark_group("Capture Replay");
    group.throughput(Throughput::Elements(u64::from(count)));

    group.bench_function("parse_verified", |b| {
        let mut replayer = StateReplayer::new();
        b.iter(|| {
            replayer
                .parse(&mut Null(0), black_box(&blob))
                .expect("parse");
        })
    });

    group.bench_function("parse_unverified", |b| {
        let mut replayer =
            StateReplayer::with_options(ReplayOptions::new().verify_checksums(false));
        b.iter(|| {
            replayer
                .parse(&mut Null(0), black_box(&blob))
                .expect("parse");
        })
    });

    group.finish();
}

fn bench_hashing(c: &mut Criterion) {
    let rec = build_recorder(0).expect("recorder");
    let stages = [PipelineShaderStage {
        flags: 0,
        stage: 0x1,
        module: h(2),
        name: "vs_main",
        specialization: None,
    }];
    let raster = RasterizationState::default();
    let info = GraphicsPipelineCreateInfo {
        stages: &stages,
        rasterization_state: Some(&raster),
        layout: Some(h(1)),
        render_pass: Some(h(4)),
        ..Default::default()
    };

    c.bench_function("hash_graphics_pipeline", |b| {
        b.iter(|| black_box(compute_hash_graphics_pipeline(&rec, black_box(&info)).expect("hash")))
    });
}

criterion_group!(benches, bench_serialize, bench_replay, bench_hashing);
criterion_main!(benches);
