// Swapchain - Window presentation
//
// Manages the chain of images we render to and present to the screen.
// Image count and present mode are negotiated against the surface; the
// count the driver actually created is read back and is authoritative.

use ash::vk;

use super::context::PresentationDevice;
use super::error::{Result, VkResultExt};
use super::surface::PresentSurface;

/// Image count asked for when nothing else is configured
pub const DEFAULT_IMAGE_COUNT: u32 = 2;

/// What the caller wants from the swapchain
#[derive(Debug, Clone, Copy)]
pub struct SwapchainRequest {
    pub extent: vk::Extent2D,
    pub image_count: u32,
    pub allow_mailbox: bool,
}

impl Default for SwapchainRequest {
    fn default() -> Self {
        Self {
            extent: vk::Extent2D { width: 1280, height: 720 },
            image_count: DEFAULT_IMAGE_COUNT,
            allow_mailbox: true,
        }
    }
}

pub struct Swapchain {
    pub swapchain: vk::SwapchainKHR,
    pub image_count: u32,
    pub present_mode: vk::PresentModeKHR,
    pub format: vk::Format,
}

impl Swapchain {
    pub fn new<D: PresentationDevice + ?Sized>(
        device: &D,
        surface: &PresentSurface,
        request: &SwapchainRequest,
    ) -> Result<Self> {
        let image_count = clamp_image_count(request.image_count, &surface.capabilities);

        let present_modes = device
            .surface_present_modes(surface.surface)
            .checked("vkGetPhysicalDeviceSurfacePresentModesKHR")?;
        log::debug!("Present modes: {:?}", present_modes);
        let present_mode = select_present_mode(&present_modes, request.allow_mailbox);

        log::info!(
            "Creating swapchain: {}x{}, {} images requested, {:?}",
            surface.extent.width, surface.extent.height, image_count, present_mode
        );

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface.surface)
            .min_image_count(image_count)
            .image_format(surface.format.format)
            .image_color_space(surface.format.color_space)
            .image_extent(surface.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(vk::SurfaceTransformFlagsKHR::IDENTITY)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());

        let swapchain = device
            .create_swapchain(&create_info)
            .checked("vkCreateSwapchainKHR")?;

        // The driver may hand back more images than requested
        let actual = match device.swapchain_images(swapchain) {
            Ok(images) => images.len() as u32,
            Err(result) => {
                device.destroy_swapchain(swapchain);
                return Err::<Self, _>(result).checked("vkGetSwapchainImagesKHR");
            }
        };
        if actual != image_count {
            log::info!("Driver created {} swapchain images ({} requested)", actual, image_count);
        }

        Ok(Self {
            swapchain,
            image_count: actual,
            present_mode,
            format: surface.format.format,
        })
    }

    /// Images owned by the swapchain go with it.
    pub fn destroy<D: PresentationDevice + ?Sized>(self, device: &D) {
        device.destroy_swapchain(self.swapchain);
    }
}

/// Clamp into `[min + 1, max]`. The lower bound always applies; the upper
/// bound only when the surface reports one (0 means unbounded).
pub fn clamp_image_count(requested: u32, caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let floor = caps.min_image_count.saturating_add(1);
    let mut count = requested;
    if count < floor {
        count = floor;
    }
    if caps.max_image_count > 0 && count > caps.max_image_count {
        count = caps.max_image_count;
    }
    count
}

/// FIFO is always available. MAILBOX replaces it when offered.
pub fn select_present_mode(modes: &[vk::PresentModeKHR], allow_mailbox: bool) -> vk::PresentModeKHR {
    if allow_mailbox && modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}
