// Backend module - Vulkan presentation layer
//
// Design: Thin wrapper around ash with safety and ergonomics
// Bring-up order: surface -> swapchain -> image views -> depth -> render pass

pub mod context;
pub mod depth_stencil;
pub mod device;
pub mod error;
pub mod image_views;
pub mod memory;
pub mod presentation;
pub mod render_pass;
pub mod surface;
pub mod swapchain;

pub use device::VulkanDevice;
pub use presentation::PresentationSurface;
