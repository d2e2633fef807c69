// Presentation surface - ordered bring-up and teardown
//
// Five stages, each depending on the one before:
//
//   Uninitialized
//     -> SurfaceReady      surface + color format
//     -> SwapchainReady    swapchain + authoritative image count
//     -> ImagesReady       one view per swapchain image
//     -> DepthReady        depth/stencil image, memory, view
//     -> RenderPassReady   render pass
//
// `advance` performs exactly one forward transition, `retreat` undoes the
// latest one. Teardown walks back to Uninitialized; the platform window is
// released after that, when the struct's fields drop.

use ash::vk;

use super::context::PresentationDevice;
use super::depth_stencil::DepthStencilBuffer;
use super::error::{PresentError, Result};
use super::image_views::SwapchainViews;
use super::render_pass::PresentRenderPass;
use super::surface::PresentSurface;
use super::swapchain::{Swapchain, SwapchainRequest};
use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InitStage {
    Uninitialized,
    SurfaceReady,
    SwapchainReady,
    ImagesReady,
    DepthReady,
    RenderPassReady,
}

impl InitStage {
    pub fn next(self) -> Option<Self> {
        match self {
            InitStage::Uninitialized => Some(InitStage::SurfaceReady),
            InitStage::SurfaceReady => Some(InitStage::SwapchainReady),
            InitStage::SwapchainReady => Some(InitStage::ImagesReady),
            InitStage::ImagesReady => Some(InitStage::DepthReady),
            InitStage::DepthReady => Some(InitStage::RenderPassReady),
            InitStage::RenderPassReady => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            InitStage::Uninitialized => None,
            InitStage::SurfaceReady => Some(InitStage::Uninitialized),
            InitStage::SwapchainReady => Some(InitStage::SurfaceReady),
            InitStage::ImagesReady => Some(InitStage::SwapchainReady),
            InitStage::DepthReady => Some(InitStage::ImagesReady),
            InitStage::RenderPassReady => Some(InitStage::DepthReady),
        }
    }
}

/// Owns the surface chain for one window.
///
/// The device is borrowed for the whole lifetime and only queried; every
/// object created through it is owned here and destroyed in reverse order.
pub struct PresentationSurface<'r, D: PresentationDevice + ?Sized, P: Platform> {
    device: &'r D,
    request: SwapchainRequest,
    stage: InitStage,
    running: bool,

    surface: Option<PresentSurface>,
    swapchain: Option<Swapchain>,
    views: Option<SwapchainViews>,
    depth: Option<DepthStencilBuffer>,
    render_pass: Option<PresentRenderPass>,

    // Dropped after all GPU objects are gone
    platform: P,
}

impl<'r, D: PresentationDevice + ?Sized, P: Platform> PresentationSurface<'r, D, P> {
    /// Build the whole chain. On failure the stages already built are torn
    /// down in reverse before the error is returned.
    pub fn new(device: &'r D, platform: P, request: SwapchainRequest) -> Result<Self> {
        let mut this = Self::uninitialized(device, platform, request);

        while this.stage != InitStage::RenderPassReady {
            if let Err(e) = this.advance() {
                log::error!("Presentation setup failed at {:?}: {}", this.stage, e);
                this.teardown();
                return Err(e);
            }
        }

        log::info!("Presentation surface ready");
        Ok(this)
    }

    /// Nothing built yet; drive with `advance`.
    pub fn uninitialized(device: &'r D, platform: P, request: SwapchainRequest) -> Self {
        Self {
            device,
            request,
            stage: InitStage::Uninitialized,
            running: true,
            surface: None,
            swapchain: None,
            views: None,
            depth: None,
            render_pass: None,
            platform,
        }
    }

    /// Run the next forward transition. A failed transition leaves the
    /// stage unchanged and nothing from it allocated.
    pub fn advance(&mut self) -> Result<InitStage> {
        let device = self.device;

        match self.stage {
            InitStage::Uninitialized => {
                let handles = self.platform.native_handles()?;
                self.surface = Some(PresentSurface::negotiate(device, handles, self.request.extent)?);
            }
            InitStage::SurfaceReady => {
                let surface = require(&self.surface, "swapchain")?;
                self.swapchain = Some(Swapchain::new(device, surface, &self.request)?);
            }
            InitStage::SwapchainReady => {
                let swapchain = require(&self.swapchain, "swapchain image views")?;
                self.views = Some(SwapchainViews::new(device, swapchain)?);
            }
            InitStage::ImagesReady => {
                let surface = require(&self.surface, "depth/stencil buffer")?;
                self.depth = Some(DepthStencilBuffer::new(device, surface.extent)?);
            }
            InitStage::DepthReady => {
                let surface = require(&self.surface, "render pass")?;
                let depth = require(&self.depth, "render pass")?;
                self.render_pass = Some(PresentRenderPass::new(
                    device,
                    surface.format.format,
                    depth.format,
                )?);
            }
            InitStage::RenderPassReady => return Ok(self.stage),
        }

        let next = self.stage.next().ok_or(PresentError::StageOrder("stage past the render pass"))?;
        log::debug!("Presentation stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
        Ok(next)
    }

    /// Undo the latest transition. Returns the new stage, or `None` when
    /// already uninitialized.
    pub fn retreat(&mut self) -> Option<InitStage> {
        let previous = self.stage.previous()?;
        let device = self.device;

        match self.stage {
            InitStage::RenderPassReady => {
                if let Some(render_pass) = self.render_pass.take() {
                    render_pass.destroy(device);
                }
            }
            InitStage::DepthReady => {
                if let Some(depth) = self.depth.take() {
                    depth.destroy(device);
                }
            }
            InitStage::ImagesReady => {
                if let Some(views) = self.views.take() {
                    views.destroy(device);
                }
            }
            InitStage::SwapchainReady => {
                if let Some(swapchain) = self.swapchain.take() {
                    swapchain.destroy(device);
                }
            }
            InitStage::SurfaceReady => {
                if let Some(surface) = self.surface.take() {
                    surface.destroy(device);
                }
            }
            InitStage::Uninitialized => {}
        }

        log::debug!("Presentation stage {:?} -> {:?}", self.stage, previous);
        self.stage = previous;
        Some(previous)
    }

    /// Tear everything down, render pass first, surface last.
    pub fn teardown(&mut self) {
        if self.stage != InitStage::Uninitialized {
            log::info!("Tearing down presentation surface from {:?}", self.stage);
        }
        while self.retreat().is_some() {}
    }

    /// Stop running. Idempotent; touches nothing else.
    pub fn close(&mut self) {
        self.running = false;
    }

    /// Pump platform events; returns whether to keep running.
    pub fn update(&mut self) -> bool {
        if !self.platform.poll_events() {
            self.close();
        }
        self.running
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn stage(&self) -> InitStage {
        self.stage
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn surface_format(&self) -> Option<vk::SurfaceFormatKHR> {
        self.surface.as_ref().map(|s| s.format)
    }

    pub fn extent(&self) -> Option<vk::Extent2D> {
        self.surface.as_ref().map(|s| s.extent)
    }

    pub fn image_count(&self) -> Option<u32> {
        self.swapchain.as_ref().map(|s| s.image_count)
    }

    pub fn present_mode(&self) -> Option<vk::PresentModeKHR> {
        self.swapchain.as_ref().map(|s| s.present_mode)
    }

    pub fn swapchain(&self) -> Option<vk::SwapchainKHR> {
        self.swapchain.as_ref().map(|s| s.swapchain)
    }

    pub fn image_views(&self) -> &[vk::ImageView] {
        self.views.as_ref().map(|v| v.views.as_slice()).unwrap_or(&[])
    }

    pub fn depth_format(&self) -> Option<vk::Format> {
        self.depth.as_ref().map(|d| d.format)
    }

    pub fn depth_view(&self) -> Option<vk::ImageView> {
        self.depth.as_ref().map(|d| d.view)
    }

    pub fn stencil_available(&self) -> bool {
        self.depth.as_ref().is_some_and(|d| d.stencil_available)
    }

    pub fn render_pass(&self) -> Option<vk::RenderPass> {
        self.render_pass.as_ref().map(|r| r.render_pass)
    }
}

impl<D: PresentationDevice + ?Sized, P: Platform> Drop for PresentationSurface<'_, D, P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn require<'a, T>(slot: &'a Option<T>, what: &'static str) -> Result<&'a T> {
    slot.as_ref().ok_or(PresentError::StageOrder(what))
}
