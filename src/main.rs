// =============================================================================
// VULKAN PRESENTATION SURFACE
// =============================================================================
//
// Brings up everything a render loop needs to put pixels on screen, and
// tears it down again in reverse:
//
// ┌─────────────────────────────────────────────────────────────────┐
// │  WinitPlatform (OS window, event pump)                          │
// │    └── VulkanDevice (instance, GPU, logical device)             │
// │          └── PresentationSurface                                │
// │                ├── Surface + color format                       │
// │                ├── Swapchain (image count, present mode)        │
// │                ├── Swapchain image views                        │
// │                ├── Depth/stencil image + memory + view          │
// │                └── Render pass (depth + color, one subpass)     │
// └─────────────────────────────────────────────────────────────────┘
//
// Any failure during bring-up is fatal: log the diagnostic and exit.
//
// =============================================================================

mod backend;
mod config;
mod platform;
#[cfg(test)]
mod testing;

use anyhow::Result;
use backend::error::PresentError;
use backend::{PresentationSurface, VulkanDevice};
use config::Config;
use platform::{Platform, WinitPlatform};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() {
    // Load configuration from config.toml; report problems once logging is up
    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize logging
    init_logging(&config);
    if let Some(e) = load_error {
        log::warn!("{:#}. Using defaults.", e);
    }
    log::debug!("Config: {:?}", config);
    log::info!("Starting Vulkan presentation");

    if let Err(e) = run(&config) {
        log::error!("Fatal: {:#}", e);
        if e.downcast_ref::<PresentError>().is_some_and(PresentError::is_environment) {
            log::error!("This GPU or window system cannot present the configured window");
        }
        std::process::exit(1);
    }
}

/// Initialize logging; RUST_LOG still overrides the configured level
fn init_logging(config: &Config) {
    use env_logger::Builder;

    let level = config.log_level();

    let mut builder = Builder::new();
    builder.filter_level(*level.as_ref().unwrap_or(&log::LevelFilter::Info));
    builder.parse_default_env();
    builder.init();

    if let Err(e) = level {
        log::warn!("{:#}, defaulting to info", e);
    }
}

fn run(config: &Config) -> Result<()> {
    // ─────────────────────────────────────────────────────────────────────
    // STEP 1: OS window
    // ─────────────────────────────────────────────────────────────────────
    let platform = WinitPlatform::open(&config.window)?;
    let handles = platform.native_handles()?;

    // ─────────────────────────────────────────────────────────────────────
    // STEP 2: Vulkan device
    // ─────────────────────────────────────────────────────────────────────
    // Enable validation layers based on config (and debug build)
    let enable_validation = cfg!(debug_assertions) && config.debug.validation_layers;
    let device = VulkanDevice::new(&config.window.title, enable_validation, handles.display)?;

    // ─────────────────────────────────────────────────────────────────────
    // STEP 3: Presentation chain (owns the window from here on)
    // ─────────────────────────────────────────────────────────────────────
    let mut presentation = PresentationSurface::new(&device, platform, config.swapchain_request())?;

    if let (Some(extent), Some(format), Some(count), Some(mode)) = (
        presentation.extent(),
        presentation.surface_format(),
        presentation.image_count(),
        presentation.present_mode(),
    ) {
        log::info!(
            "Presenting {}x{} {:?}, {} images, {:?}, depth {:?} (stencil: {})",
            extent.width,
            extent.height,
            format.format,
            count,
            mode,
            presentation.depth_format(),
            presentation.stencil_available()
        );
    }
    log::debug!(
        "Stage {:?}: swapchain {:?}, {} image views, depth view {:?}, render pass {:?}",
        presentation.stage(),
        presentation.swapchain(),
        presentation.image_views().len(),
        presentation.depth_view(),
        presentation.render_pass()
    );

    // ─────────────────────────────────────────────────────────────────────
    // STEP 4: Heartbeat until the window closes
    // ─────────────────────────────────────────────────────────────────────
    while presentation.is_running() {
        presentation.update();
    }

    // ─────────────────────────────────────────────────────────────────────
    // STEP 5: Cleanup (reverse order)
    // ─────────────────────────────────────────────────────────────────────
    device.wait_idle()?;
    drop(presentation);

    log::info!("Cleanup complete");
    Ok(())
}
