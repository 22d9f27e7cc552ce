use serde::{Deserialize, Serialize};

/// Describes one render-pass attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescription {
    /// Attachment flags.
    pub flags: u32,
    /// Image format.
    pub format: u32,
    /// Sample count.
    pub samples: u32,
    /// Color/depth load operation.
    pub load_op: u32,
    /// Color/depth store operation.
    pub store_op: u32,
    /// Stencil load operation.
    pub stencil_load_op: u32,
    /// Stencil store operation.
    pub stencil_store_op: u32,
    /// Layout on render-pass entry.
    pub initial_layout: u32,
    /// Layout on render-pass exit.
    pub final_layout: u32,
}

/// Reference from a subpass to one attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentReference {
    /// Attachment number, or the unused sentinel.
    pub attachment: u32,
    /// Layout during the subpass.
    pub layout: u32,
}

/// Describes one subpass.
///
/// `resolve_attachments`, when present, pairs one entry with each color
/// attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubpassDescription<'a> {
    /// Subpass flags.
    pub flags: u32,
    /// Pipeline type bound by this subpass.
    pub pipeline_bind_point: u32,
    /// Input attachments.
    pub input_attachments: &'a [AttachmentReference],
    /// Color attachments.
    pub color_attachments: &'a [AttachmentReference],
    /// Multisample resolve targets.
    pub resolve_attachments: Option<&'a [AttachmentReference]>,
    /// Depth-stencil attachment.
    pub depth_stencil_attachment: Option<&'a AttachmentReference>,
    /// Attachments preserved across this subpass.
    pub preserve_attachments: &'a [u32],
}

/// An execution and memory dependency between two subpasses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubpassDependency {
    /// Source subpass.
    pub src_subpass: u32,
    /// Destination subpass.
    pub dst_subpass: u32,
    /// Source stage mask.
    pub src_stage_mask: u32,
    /// Destination stage mask.
    pub dst_stage_mask: u32,
    /// Source access mask.
    pub src_access_mask: u32,
    /// Destination access mask.
    pub dst_access_mask: u32,
    /// Dependency flags.
    pub dependency_flags: u32,
}

/// Describes a render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderPassCreateInfo<'a> {
    /// Creation flags.
    pub flags: u32,
    /// Attachments.
    pub attachments: &'a [AttachmentDescription],
    /// Subpasses.
    pub subpasses: &'a [SubpassDescription<'a>],
    /// Dependencies between subpasses.
    pub dependencies: &'a [SubpassDependency],
}
