// Depth/stencil buffer
//
// Image, backing memory and view, owned as one unit.
// Teardown: view, then memory, then image.

use ash::vk;

use super::context::PresentationDevice;
use super::error::{EnvironmentError, Result, VkResultExt};
use super::memory::find_memory_type_index;

/// Candidate formats with the optimal-tiling feature each must support.
/// Scanned in order, first match wins: combined depth+stencil formats by
/// precision first, pure depth last.
pub const DEPTH_STENCIL_PREFERENCE: [(vk::Format, vk::FormatFeatureFlags); 5] = [
    (vk::Format::D32_SFLOAT_S8_UINT, vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT),
    (vk::Format::D24_UNORM_S8_UINT, vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT),
    (vk::Format::D16_UNORM_S8_UINT, vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT),
    (vk::Format::D32_SFLOAT, vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT),
    (vk::Format::D16_UNORM, vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT),
];

/// True for formats carrying a stencil channel
pub fn has_stencil(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D32_SFLOAT_S8_UINT
            | vk::Format::D24_UNORM_S8_UINT
            | vk::Format::D16_UNORM_S8_UINT
            | vk::Format::S8_UINT
    )
}

/// First preferred format whose optimal-tiling features include the
/// required bit.
pub fn select_depth_format<F>(format_properties: F) -> Result<vk::Format>
where
    F: Fn(vk::Format) -> vk::FormatProperties,
{
    DEPTH_STENCIL_PREFERENCE
        .iter()
        .find(|&&(format, feature)| format_properties(format).optimal_tiling_features.contains(feature))
        .map(|&(format, _)| format)
        .ok_or_else(|| {
            EnvironmentError::NoDepthStencilFormat {
                candidates: DEPTH_STENCIL_PREFERENCE.iter().map(|&(f, _)| f).collect(),
            }
            .into()
        })
}

pub struct DepthStencilBuffer {
    pub format: vk::Format,
    pub stencil_available: bool,
    pub image: vk::Image,
    pub memory: vk::DeviceMemory,
    pub view: vk::ImageView,
}

impl DepthStencilBuffer {
    pub fn new<D: PresentationDevice + ?Sized>(device: &D, extent: vk::Extent2D) -> Result<Self> {
        let format = select_depth_format(|f| device.format_properties(f))?;
        let stencil_available = has_stencil(format);
        log::info!("Depth/stencil format: {:?} (stencil: {})", format, stencil_available);

        // Create depth image
        let image_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = device.create_image(&image_info).checked("vkCreateImage")?;

        // Allocate + bind memory
        let memory = match Self::bind_memory(device, image) {
            Ok(memory) => memory,
            Err(e) => {
                device.destroy_image(image);
                return Err(e);
            }
        };

        // Create image view
        let mut aspect_mask = vk::ImageAspectFlags::DEPTH;
        if stencil_available {
            aspect_mask |= vk::ImageAspectFlags::STENCIL;
        }

        let view_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let view = match device.create_image_view(&view_info).checked("vkCreateImageView") {
            Ok(view) => view,
            Err(e) => {
                device.free_memory(memory);
                device.destroy_image(image);
                return Err(e);
            }
        };

        Ok(Self {
            format,
            stencil_available,
            image,
            memory,
            view,
        })
    }

    fn bind_memory<D: PresentationDevice + ?Sized>(device: &D, image: vk::Image) -> Result<vk::DeviceMemory> {
        let requirements = device.image_memory_requirements(image);

        let memory_type_index = find_memory_type_index(
            device.memory_properties(),
            &requirements,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);

        let memory = device
            .allocate_memory(&alloc_info)
            .checked("vkAllocateMemory")?;

        if let Err(e) = device.bind_image_memory(image, memory, 0).checked("vkBindImageMemory") {
            device.free_memory(memory);
            return Err(e);
        }

        log::debug!(
            "Depth image memory: {} bytes, type {}",
            requirements.size,
            memory_type_index
        );

        Ok(memory)
    }

    pub fn destroy<D: PresentationDevice + ?Sized>(self, device: &D) {
        device.destroy_image_view(self.view);
        device.free_memory(self.memory);
        device.destroy_image(self.image);
    }
}
