//! The caller-side extension point of replay.
//!
//! [`StateReplayer`](crate::StateReplayer) never creates objects itself. For
//! each entry it hands a fully materialized create-info to one
//! `enqueue_create_*` method of a [`StateCreatorInterface`] together with a
//! [`HandleSlot`] that the implementation fills, immediately or later from
//! another thread.
//!
//! Categories are processed strictly in replay order. After the last entry of
//! each category the replayer calls
//! [`wait_enqueue`](StateCreatorInterface::wait_enqueue); once it returns, every
//! slot of that category must hold a handle.

use std::sync::{Arc, OnceLock};

use crate::handles::{
    DescriptorSetLayout, NativeHandle, Pipeline, PipelineLayout, RenderPass, Sampler, ShaderModule,
};
use crate::hasher::Hash;
use crate::ids::{
    ComputePipelineIndex, DescriptorSetLayoutIndex, GraphicsPipelineIndex, PipelineLayoutIndex,
    RenderPassIndex, SamplerIndex, ShaderModuleIndex,
};
use crate::info::{
    ComputePipelineCreateInfo, DescriptorSetLayoutCreateInfo, GraphicsPipelineCreateInfo,
    PipelineLayoutCreateInfo, RenderPassCreateInfo, SamplerCreateInfo, ShaderModuleCreateInfo,
};

/// Write-once output cell for a created handle.
///
/// Cloning yields another reference to the same cell, so a clone can be moved
/// to a worker thread while the replayer keeps its own. The first `set` wins.
#[derive(Debug, Clone)]
pub struct HandleSlot<H>(Arc<OnceLock<H>>);

impl<H: NativeHandle> HandleSlot<H> {
    /// An empty slot.
    pub fn new() -> Self {
        Self(Arc::new(OnceLock::new()))
    }

    /// Stores the handle. Returns `false` if the slot was already filled, in
    /// which case the earlier handle is kept.
    pub fn set(&self, handle: H) -> bool {
        self.0.set(handle).is_ok()
    }

    /// The stored handle, if any.
    pub fn get(&self) -> Option<H> {
        self.0.get().copied()
    }

    /// Whether a handle has been stored.
    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }
}

impl<H: NativeHandle> Default for HandleSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Materializes replayed objects.
///
/// Every `set_num_*` hook defaults to accepting the count. Every
/// `enqueue_create_*` method defaults to rejecting the object, so an
/// implementation only overrides the categories it supports; replaying a
/// capture with entries in any other category fails with
/// [`CaptureError::Interface`](crate::CaptureError::Interface).
///
/// A method returning `false` aborts the parse. A method returning `true` must
/// fill `out` before the next [`wait_enqueue`](Self::wait_enqueue) returns.
///
/// The create-infos live in the replayer's arena until the next parse, but the
/// borrow handed out only covers the call; implementations that defer creation
/// copy what they need.
#[allow(unused_variables)]
pub trait StateCreatorInterface {
    /// Announces the number of samplers about to be enqueued.
    fn set_num_samplers(&mut self, count: u32) -> bool {
        true
    }

    /// Announces the number of descriptor-set layouts about to be enqueued.
    fn set_num_descriptor_set_layouts(&mut self, count: u32) -> bool {
        true
    }

    /// Announces the number of pipeline layouts about to be enqueued.
    fn set_num_pipeline_layouts(&mut self, count: u32) -> bool {
        true
    }

    /// Announces the number of shader modules about to be enqueued.
    fn set_num_shader_modules(&mut self, count: u32) -> bool {
        true
    }

    /// Announces the number of render passes about to be enqueued.
    fn set_num_render_passes(&mut self, count: u32) -> bool {
        true
    }

    /// Announces the number of compute pipelines about to be enqueued.
    fn set_num_compute_pipelines(&mut self, count: u32) -> bool {
        true
    }

    /// Announces the number of graphics pipelines about to be enqueued.
    fn set_num_graphics_pipelines(&mut self, count: u32) -> bool {
        true
    }

    /// Creates (or queues creation of) a sampler.
    fn enqueue_create_sampler(
        &mut self,
        hash: Hash,
        index: SamplerIndex,
        info: &SamplerCreateInfo,
        out: HandleSlot<Sampler>,
    ) -> bool {
        false
    }

    /// Creates (or queues creation of) a descriptor-set layout.
    fn enqueue_create_descriptor_set_layout(
        &mut self,
        hash: Hash,
        index: DescriptorSetLayoutIndex,
        info: &DescriptorSetLayoutCreateInfo<'_>,
        out: HandleSlot<DescriptorSetLayout>,
    ) -> bool {
        false
    }

    /// Creates (or queues creation of) a pipeline layout.
    fn enqueue_create_pipeline_layout(
        &mut self,
        hash: Hash,
        index: PipelineLayoutIndex,
        info: &PipelineLayoutCreateInfo<'_>,
        out: HandleSlot<PipelineLayout>,
    ) -> bool {
        false
    }

    /// Creates (or queues creation of) a shader module.
    fn enqueue_create_shader_module(
        &mut self,
        hash: Hash,
        index: ShaderModuleIndex,
        info: &ShaderModuleCreateInfo<'_>,
        out: HandleSlot<ShaderModule>,
    ) -> bool {
        false
    }

    /// Creates (or queues creation of) a render pass.
    fn enqueue_create_render_pass(
        &mut self,
        hash: Hash,
        index: RenderPassIndex,
        info: &RenderPassCreateInfo<'_>,
        out: HandleSlot<RenderPass>,
    ) -> bool {
        false
    }

    /// Creates (or queues creation of) a compute pipeline.
    fn enqueue_create_compute_pipeline(
        &mut self,
        hash: Hash,
        index: ComputePipelineIndex,
        info: &ComputePipelineCreateInfo<'_>,
        out: HandleSlot<Pipeline>,
    ) -> bool {
        false
    }

    /// Creates (or queues creation of) a graphics pipeline.
    fn enqueue_create_graphics_pipeline(
        &mut self,
        hash: Hash,
        index: GraphicsPipelineIndex,
        info: &GraphicsPipelineCreateInfo<'_>,
        out: HandleSlot<Pipeline>,
    ) -> bool {
        false
    }

    /// Blocks until every creation queued so far has written its handle.
    fn wait_enqueue(&mut self) {}
}
