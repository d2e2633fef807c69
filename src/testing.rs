//! Mock device and platform for unit tests (no GPU required)
//!
//! `MockDevice` answers capability queries from plain tables and records
//! every create/destroy in a shared log, so tests can check what was built
//! and the order it was torn down in. `MockPlatform` shares the same log
//! and records its own drop as the window going away.

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::backend::context::{NativeHandles, PresentationDevice};
use crate::backend::error::Result;
use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    CreateSurface,
    DestroySurface,
    CreateSwapchain,
    DestroySwapchain,
    CreateImageView,
    DestroyImageView,
    CreateImage,
    DestroyImage,
    AllocateMemory,
    BindImageMemory,
    FreeMemory,
    CreateRenderPass,
    DestroyRenderPass,
    DestroyWindow,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// What the mock saw in the last swapchain create info
#[derive(Debug, Clone, Copy)]
pub struct SwapchainSeen {
    pub min_image_count: u32,
    pub image_format: vk::Format,
    pub image_color_space: vk::ColorSpaceKHR,
    pub image_extent: vk::Extent2D,
    pub image_array_layers: u32,
    pub image_usage: vk::ImageUsageFlags,
    pub image_sharing_mode: vk::SharingMode,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
    pub present_mode: vk::PresentModeKHR,
    pub clipped: bool,
}

/// What the mock saw in one image view create info
#[derive(Debug, Clone, Copy)]
pub struct ViewSeen {
    pub format: vk::Format,
    pub aspect: vk::ImageAspectFlags,
    pub view_type: vk::ImageViewType,
    pub components: vk::ComponentMapping,
    pub base_mip_level: u32,
    pub level_count: u32,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

/// What the mock saw in one subpass description
#[derive(Debug, Clone)]
pub struct SubpassSeen {
    pub bind_point: vk::PipelineBindPoint,
    pub color_refs: Vec<(u32, vk::ImageLayout)>,
    pub depth_ref: Option<(u32, vk::ImageLayout)>,
    pub input_count: u32,
    pub preserve_count: u32,
    pub has_resolve: bool,
}

/// What the mock saw in the last render pass create info
#[derive(Debug, Clone)]
pub struct RenderPassSeen {
    pub attachment_formats: Vec<vk::Format>,
    pub subpasses: Vec<SubpassSeen>,
    pub dependency_count: u32,
}

pub struct MockDevice {
    pub log: CallLog,

    pub present_supported: bool,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    /// Image count the "driver" hands back; `None` echoes the request
    pub actual_image_count: Option<u32>,
    pub depth_formats: Vec<vk::Format>,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub memory_type_bits: u32,

    /// Call name that fails with ERROR_INITIALIZATION_FAILED
    pub fail_call: Option<&'static str>,
    /// Fail the n-th image view creation (0-based)
    pub fail_view_at: Option<usize>,

    pub swapchain_seen: Cell<Option<SwapchainSeen>>,
    pub image_seen: Cell<Option<vk::ImageCreateInfo>>,
    pub views_seen: RefCell<Vec<ViewSeen>>,
    pub memory_seen: Cell<Option<(vk::DeviceSize, u32)>>,
    pub bind_offset_seen: Cell<Option<vk::DeviceSize>>,
    pub render_pass_seen: RefCell<Option<RenderPassSeen>>,

    next_handle: Cell<u64>,
    requested_images: Cell<u32>,
    views_created: Cell<usize>,
}

impl MockDevice {
    pub fn new() -> Self {
        let mut memory_properties = vk::PhysicalDeviceMemoryProperties::default();
        memory_properties.memory_type_count = 2;
        memory_properties.memory_types[0] = vk::MemoryType {
            property_flags: vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
            heap_index: 1,
        };
        memory_properties.memory_types[1] = vk::MemoryType {
            property_flags: vk::MemoryPropertyFlags::DEVICE_LOCAL,
            heap_index: 0,
        };

        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            current_extent: vk::Extent2D { width: 800, height: 600 },
            ..Default::default()
        };

        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            present_supported: true,
            capabilities,
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            actual_image_count: None,
            depth_formats: vec![vk::Format::D24_UNORM_S8_UINT, vk::Format::D32_SFLOAT],
            memory_properties,
            memory_type_bits: 0b11,
            fail_call: None,
            fail_view_at: None,
            swapchain_seen: Cell::new(None),
            image_seen: Cell::new(None),
            views_seen: RefCell::new(Vec::new()),
            memory_seen: Cell::new(None),
            bind_offset_seen: Cell::new(None),
            render_pass_seen: RefCell::new(None),
            next_handle: Cell::new(1),
            requested_images: Cell::new(0),
            views_created: Cell::new(0),
        }
    }

    pub fn platform(&self) -> MockPlatform {
        MockPlatform::new(self.log.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.log.borrow().iter().filter(|&&c| c == call).count()
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn handle<H: Handle>(&self) -> H {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 1);
        H::from_raw(raw)
    }

    fn gate(&self, name: &'static str) -> VkResult<()> {
        if self.fail_call == Some(name) {
            Err(vk::Result::ERROR_INITIALIZATION_FAILED)
        } else {
            Ok(())
        }
    }
}

impl PresentationDevice for MockDevice {
    fn graphics_queue_family(&self) -> u32 {
        0
    }

    fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.memory_properties
    }

    fn format_properties(&self, format: vk::Format) -> vk::FormatProperties {
        let optimal_tiling_features = if self.depth_formats.contains(&format) {
            vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT
        } else {
            vk::FormatFeatureFlags::empty()
        };
        vk::FormatProperties {
            optimal_tiling_features,
            ..Default::default()
        }
    }

    fn create_surface(&self, _handles: NativeHandles) -> VkResult<vk::SurfaceKHR> {
        self.gate("vkCreateSurfaceKHR")?;
        self.record(Call::CreateSurface);
        Ok(self.handle())
    }

    fn destroy_surface(&self, _surface: vk::SurfaceKHR) {
        self.record(Call::DestroySurface);
    }

    fn surface_support(&self, _queue_family: u32, _surface: vk::SurfaceKHR) -> VkResult<bool> {
        self.gate("vkGetPhysicalDeviceSurfaceSupportKHR")?;
        Ok(self.present_supported)
    }

    fn surface_capabilities(&self, _surface: vk::SurfaceKHR) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        self.gate("vkGetPhysicalDeviceSurfaceCapabilitiesKHR")?;
        Ok(self.capabilities)
    }

    fn surface_formats(&self, _surface: vk::SurfaceKHR) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        self.gate("vkGetPhysicalDeviceSurfaceFormatsKHR")?;
        Ok(self.formats.clone())
    }

    fn surface_present_modes(&self, _surface: vk::SurfaceKHR) -> VkResult<Vec<vk::PresentModeKHR>> {
        self.gate("vkGetPhysicalDeviceSurfacePresentModesKHR")?;
        Ok(self.present_modes.clone())
    }

    fn create_swapchain(&self, info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR> {
        self.gate("vkCreateSwapchainKHR")?;
        self.requested_images.set(info.min_image_count);
        self.swapchain_seen.set(Some(SwapchainSeen {
            min_image_count: info.min_image_count,
            image_format: info.image_format,
            image_color_space: info.image_color_space,
            image_extent: info.image_extent,
            image_array_layers: info.image_array_layers,
            image_usage: info.image_usage,
            image_sharing_mode: info.image_sharing_mode,
            pre_transform: info.pre_transform,
            composite_alpha: info.composite_alpha,
            present_mode: info.present_mode,
            clipped: info.clipped == vk::TRUE,
        }));
        self.record(Call::CreateSwapchain);
        Ok(self.handle())
    }

    fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        self.gate("vkGetSwapchainImagesKHR")?;
        let count = self
            .actual_image_count
            .unwrap_or_else(|| self.requested_images.get());
        // Stable handles per call, like a real swapchain
        Ok((0..count)
            .map(|i| vk::Image::from_raw(0x1000 + u64::from(i)))
            .collect())
    }

    fn destroy_swapchain(&self, _swapchain: vk::SwapchainKHR) {
        self.record(Call::DestroySwapchain);
    }

    fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        self.gate("vkCreateImageView")?;
        let index = self.views_created.get();
        self.views_created.set(index + 1);
        if self.fail_view_at == Some(index) {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        }
        let range = info.subresource_range;
        self.views_seen.borrow_mut().push(ViewSeen {
            format: info.format,
            aspect: range.aspect_mask,
            view_type: info.view_type,
            components: info.components,
            base_mip_level: range.base_mip_level,
            level_count: range.level_count,
            base_array_layer: range.base_array_layer,
            layer_count: range.layer_count,
        });
        self.record(Call::CreateImageView);
        Ok(self.handle())
    }

    fn destroy_image_view(&self, _view: vk::ImageView) {
        self.record(Call::DestroyImageView);
    }

    fn create_image(&self, info: &vk::ImageCreateInfo) -> VkResult<vk::Image> {
        self.gate("vkCreateImage")?;
        self.image_seen.set(Some(*info));
        self.record(Call::CreateImage);
        Ok(self.handle())
    }

    fn image_memory_requirements(&self, _image: vk::Image) -> vk::MemoryRequirements {
        vk::MemoryRequirements {
            size: 800 * 600 * 4,
            alignment: 1024,
            memory_type_bits: self.memory_type_bits,
        }
    }

    fn destroy_image(&self, _image: vk::Image) {
        self.record(Call::DestroyImage);
    }

    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo) -> VkResult<vk::DeviceMemory> {
        self.gate("vkAllocateMemory")?;
        self.memory_seen.set(Some((info.allocation_size, info.memory_type_index)));
        self.record(Call::AllocateMemory);
        Ok(self.handle())
    }

    fn bind_image_memory(
        &self,
        _image: vk::Image,
        _memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> VkResult<()> {
        self.gate("vkBindImageMemory")?;
        self.bind_offset_seen.set(Some(offset));
        self.record(Call::BindImageMemory);
        Ok(())
    }

    fn free_memory(&self, _memory: vk::DeviceMemory) {
        self.record(Call::FreeMemory);
    }

    fn create_render_pass(&self, info: &vk::RenderPassCreateInfo) -> VkResult<vk::RenderPass> {
        self.gate("vkCreateRenderPass")?;
        // The create info points at arrays that live for the duration of the call
        let (attachments, subpasses) = unsafe {
            (
                raw_slice(info.p_attachments, info.attachment_count),
                raw_slice(info.p_subpasses, info.subpass_count),
            )
        };
        let subpasses = subpasses
            .iter()
            .map(|subpass| {
                let color_refs = unsafe {
                    raw_slice(subpass.p_color_attachments, subpass.color_attachment_count)
                };
                let depth_ref = unsafe { subpass.p_depth_stencil_attachment.as_ref() };
                SubpassSeen {
                    bind_point: subpass.pipeline_bind_point,
                    color_refs: color_refs.iter().map(|r| (r.attachment, r.layout)).collect(),
                    depth_ref: depth_ref.map(|r| (r.attachment, r.layout)),
                    input_count: subpass.input_attachment_count,
                    preserve_count: subpass.preserve_attachment_count,
                    has_resolve: !subpass.p_resolve_attachments.is_null(),
                }
            })
            .collect();
        *self.render_pass_seen.borrow_mut() = Some(RenderPassSeen {
            attachment_formats: attachments.iter().map(|a| a.format).collect(),
            subpasses,
            dependency_count: info.dependency_count,
        });
        self.record(Call::CreateRenderPass);
        Ok(self.handle())
    }

    fn destroy_render_pass(&self, _render_pass: vk::RenderPass) {
        self.record(Call::DestroyRenderPass);
    }
}

/// Slice behind a Vulkan (pointer, count) pair; null with count 0 is empty
unsafe fn raw_slice<'a, T>(ptr: *const T, count: u32) -> &'a [T] {
    if ptr.is_null() || count == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, count as usize)
    }
}

pub fn mock_handles() -> NativeHandles {
    NativeHandles {
        display: RawDisplayHandle::Xlib(XlibDisplayHandle::empty()),
        window: RawWindowHandle::Xlib(XlibWindowHandle::empty()),
    }
}

/// Platform stand-in; each poll pops the next scripted answer
pub struct MockPlatform {
    log: CallLog,
    pub polls: Rc<Cell<usize>>,
    pub script: VecDeque<bool>,
}

impl MockPlatform {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            polls: Rc::new(Cell::new(0)),
            script: VecDeque::new(),
        }
    }

    pub fn scripted(mut self, answers: &[bool]) -> Self {
        self.script = answers.iter().copied().collect();
        self
    }
}

impl Platform for MockPlatform {
    fn native_handles(&self) -> Result<NativeHandles> {
        Ok(mock_handles())
    }

    fn poll_events(&mut self) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.script.pop_front().unwrap_or(true)
    }
}

impl Drop for MockPlatform {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Call::DestroyWindow);
    }
}
