// Render pass for presenting with depth
//
// Two attachments and one graphics subpass:
//   0: depth/stencil  (UNDEFINED -> DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
//   1: color          (UNDEFINED -> PRESENT_SRC_KHR)
// No explicit subpass dependencies; the implicit external ones apply.

use ash::vk;

use super::context::PresentationDevice;
use super::error::{Result, VkResultExt};

pub const DEPTH_ATTACHMENT: u32 = 0;
pub const COLOR_ATTACHMENT: u32 = 1;

/// Static description, kept separate from the compiled object so the
/// attachment graph can be inspected without a device.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassLayout {
    pub attachments: [vk::AttachmentDescription; 2],
    pub color_refs: [vk::AttachmentReference; 1],
    pub depth_ref: vk::AttachmentReference,
}

impl RenderPassLayout {
    pub fn new(color_format: vk::Format, depth_format: vk::Format) -> Self {
        // Depth/stencil attachment (stencil contents are kept)
        let depth_attachment = vk::AttachmentDescription::builder()
            .format(depth_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::LOAD)
            .stencil_store_op(vk::AttachmentStoreOp::STORE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
            .build();

        // Color attachment (the swapchain image)
        let color_attachment = vk::AttachmentDescription::builder()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
            .build();

        let color_ref = vk::AttachmentReference::builder()
            .attachment(COLOR_ATTACHMENT)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .build();

        let depth_ref = vk::AttachmentReference::builder()
            .attachment(DEPTH_ATTACHMENT)
            .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
            .build();

        Self {
            attachments: [depth_attachment, color_attachment],
            color_refs: [color_ref],
            depth_ref,
        }
    }

    pub fn create<D: PresentationDevice + ?Sized>(&self, device: &D) -> Result<vk::RenderPass> {
        // Location 0 in the fragment shader writes color_refs[0]
        let subpasses = [vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&self.color_refs)
            .depth_stencil_attachment(&self.depth_ref)
            .build()];

        let render_pass_info = vk::RenderPassCreateInfo::builder()
            .attachments(&self.attachments)
            .subpasses(&subpasses);

        device
            .create_render_pass(&render_pass_info)
            .checked("vkCreateRenderPass")
    }
}

pub struct PresentRenderPass {
    pub render_pass: vk::RenderPass,
}

impl PresentRenderPass {
    pub fn new<D: PresentationDevice + ?Sized>(
        device: &D,
        color_format: vk::Format,
        depth_format: vk::Format,
    ) -> Result<Self> {
        let render_pass = RenderPassLayout::new(color_format, depth_format).create(device)?;
        log::info!("Created render pass ({:?} + {:?})", depth_format, color_format);

        Ok(Self { render_pass })
    }

    pub fn destroy<D: PresentationDevice + ?Sized>(self, device: &D) {
        device.destroy_render_pass(self.render_pass);
    }
}
