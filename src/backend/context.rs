// Device context seam
//
// Everything the presentation chain asks of the device owner goes through
// this trait: capability queries plus create/destroy of the objects the
// chain owns. The real implementation lives on VulkanDevice; tests use a
// recording mock.
//
// The context is only ever borrowed (&self). Nothing here mutates it.

use ash::prelude::VkResult;
use ash::vk;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

/// Native handles a surface is created from
#[derive(Debug, Clone, Copy)]
pub struct NativeHandles {
    pub display: RawDisplayHandle,
    pub window: RawWindowHandle,
}

pub trait PresentationDevice {
    // ─────────────────────────────────────────────────────────────────────
    // Capability tables
    // ─────────────────────────────────────────────────────────────────────
    fn graphics_queue_family(&self) -> u32;
    fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties;
    fn format_properties(&self, format: vk::Format) -> vk::FormatProperties;

    // ─────────────────────────────────────────────────────────────────────
    // Surface (instance level)
    // ─────────────────────────────────────────────────────────────────────
    fn create_surface(&self, handles: NativeHandles) -> VkResult<vk::SurfaceKHR>;
    fn destroy_surface(&self, surface: vk::SurfaceKHR);
    fn surface_support(&self, queue_family: u32, surface: vk::SurfaceKHR) -> VkResult<bool>;
    fn surface_capabilities(&self, surface: vk::SurfaceKHR) -> VkResult<vk::SurfaceCapabilitiesKHR>;
    fn surface_formats(&self, surface: vk::SurfaceKHR) -> VkResult<Vec<vk::SurfaceFormatKHR>>;
    fn surface_present_modes(&self, surface: vk::SurfaceKHR) -> VkResult<Vec<vk::PresentModeKHR>>;

    // ─────────────────────────────────────────────────────────────────────
    // Swapchain
    // ─────────────────────────────────────────────────────────────────────
    fn create_swapchain(&self, info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR>;
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;
    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);

    // ─────────────────────────────────────────────────────────────────────
    // Images, views, memory
    // ─────────────────────────────────────────────────────────────────────
    fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView>;
    fn destroy_image_view(&self, view: vk::ImageView);
    fn create_image(&self, info: &vk::ImageCreateInfo) -> VkResult<vk::Image>;
    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements;
    fn destroy_image(&self, image: vk::Image);
    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo) -> VkResult<vk::DeviceMemory>;
    fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> VkResult<()>;
    fn free_memory(&self, memory: vk::DeviceMemory);

    // ─────────────────────────────────────────────────────────────────────
    // Render pass
    // ─────────────────────────────────────────────────────────────────────
    fn create_render_pass(&self, info: &vk::RenderPassCreateInfo) -> VkResult<vk::RenderPass>;
    fn destroy_render_pass(&self, render_pass: vk::RenderPass);
}
