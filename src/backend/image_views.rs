// Swapchain image views
//
// The swapchain owns its images; we own one 2D color view per image.
// All-or-nothing: a failed view destroys the views made before it.

use ash::vk;

use super::context::PresentationDevice;
use super::error::{Result, VkResultExt};
use super::swapchain::Swapchain;

/// Views only; the images stay owned by the swapchain
pub struct SwapchainViews {
    pub views: Vec<vk::ImageView>,
}

impl SwapchainViews {
    pub fn new<D: PresentationDevice + ?Sized>(device: &D, swapchain: &Swapchain) -> Result<Self> {
        let images = device
            .swapchain_images(swapchain.swapchain)
            .checked("vkGetSwapchainImagesKHR")?;
        if images.len() as u32 != swapchain.image_count {
            log::warn!(
                "Swapchain reported {} images, expected {}",
                images.len(),
                swapchain.image_count
            );
        }

        let mut views = Vec::with_capacity(images.len());
        for &image in &images {
            let create_info = vk::ImageViewCreateInfo::builder()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(swapchain.format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            match device.create_image_view(&create_info).checked("vkCreateImageView") {
                Ok(view) => views.push(view),
                Err(e) => {
                    for view in views {
                        device.destroy_image_view(view);
                    }
                    return Err(e);
                }
            }
        }

        log::info!("Created {} swapchain image views", views.len());

        Ok(Self { views })
    }

    pub fn destroy<D: PresentationDevice + ?Sized>(self, device: &D) {
        for view in self.views {
            device.destroy_image_view(view);
        }
    }
}
