// Surface - window connection and color format negotiation
//
// Creates the platform surface, checks the graphics queue can present to
// it, adopts the extent the device mandates and picks the color format
// the swapchain, its views and the render pass will all use.

use ash::vk;

use super::context::{NativeHandles, PresentationDevice};
use super::error::{EnvironmentError, Result, VkResultExt};

/// Format used when the device reports it has no preference
pub const FALLBACK_SURFACE_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_UNORM,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
};

/// A created surface plus everything negotiated against it
pub struct PresentSurface {
    pub surface: vk::SurfaceKHR,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub format: vk::SurfaceFormatKHR,
    pub extent: vk::Extent2D,
}

impl PresentSurface {
    pub fn negotiate<D: PresentationDevice + ?Sized>(
        device: &D,
        handles: NativeHandles,
        requested: vk::Extent2D,
    ) -> Result<Self> {
        let surface = device
            .create_surface(handles)
            .checked("vkCreateSurfaceKHR")?;

        match Self::query(device, surface, requested) {
            Ok(negotiated) => Ok(negotiated),
            Err(e) => {
                device.destroy_surface(surface);
                Err(e)
            }
        }
    }

    fn query<D: PresentationDevice + ?Sized>(
        device: &D,
        surface: vk::SurfaceKHR,
        requested: vk::Extent2D,
    ) -> Result<Self> {
        // Verify the graphics queue can present to this surface
        let queue_family = device.graphics_queue_family();
        let supported = device
            .surface_support(queue_family, surface)
            .checked("vkGetPhysicalDeviceSurfaceSupportKHR")?;
        if !supported {
            return Err(EnvironmentError::PresentUnsupported { queue_family }.into());
        }

        let capabilities = device
            .surface_capabilities(surface)
            .checked("vkGetPhysicalDeviceSurfaceCapabilitiesKHR")?;
        let extent = resolve_extent(&capabilities, requested);
        if extent != requested {
            log::info!(
                "Surface extent fixed by device: {}x{} (requested {}x{})",
                extent.width, extent.height, requested.width, requested.height
            );
        }

        let formats = device
            .surface_formats(surface)
            .checked("vkGetPhysicalDeviceSurfaceFormatsKHR")?;
        log::debug!("Surface formats: {:?}", formats);
        let format = select_surface_format(&formats)?;

        log::info!("Surface format: {:?} / {:?}", format.format, format.color_space);

        Ok(Self {
            surface,
            capabilities,
            format,
            extent,
        })
    }

    pub fn destroy<D: PresentationDevice + ?Sized>(self, device: &D) {
        device.destroy_surface(self.surface);
    }
}

/// A defined current extent overrides whatever size was asked for.
/// `u32::MAX` width means the surface takes its size from the swapchain.
pub fn resolve_extent(caps: &vk::SurfaceCapabilitiesKHR, requested: vk::Extent2D) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        requested
    }
}

/// First reported format, unless the device only reports UNDEFINED
/// ("no preference"), in which case BGRA8 unorm / sRGB nonlinear.
pub fn select_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Result<vk::SurfaceFormatKHR> {
    let first = formats.first().ok_or(EnvironmentError::NoSurfaceFormats)?;

    if first.format == vk::Format::UNDEFINED {
        log::debug!("Device has no surface format preference");
        Ok(FALLBACK_SURFACE_FORMAT)
    } else {
        Ok(*first)
    }
}
