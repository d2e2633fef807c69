// =============================================================================
// PLATFORM - OS window and event pumping
// =============================================================================
//
// The presentation chain needs two things from the OS side: native handles
// to build a surface from, and a non-blocking event poll that says whether
// to keep running. `WinitPlatform` provides both on top of winit's
// pump_events extension, so the caller keeps control of the loop.

use anyhow::{Context, Result};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::time::Duration;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowAttributes, WindowId},
};

use crate::backend::context::NativeHandles;
use crate::backend::error::PresentError;
use crate::config::WindowConfig;

/// OS-side collaborator of the presentation surface
pub trait Platform {
    /// Handles the device creates the surface from
    fn native_handles(&self) -> Result<NativeHandles, PresentError>;

    /// Process pending events; false once the window should close
    fn poll_events(&mut self) -> bool;
}

/// winit-side state, driven by the event loop
struct WindowState {
    attributes: WindowAttributes,
    window: Option<Window>,
    close_requested: bool,
    creation_error: Option<String>,
}

impl ApplicationHandler for WindowState {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => self.window = Some(window),
            Err(e) => self.creation_error = Some(e.to_string()),
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                self.close_requested = true;
            }

            // The swapchain keeps the size it was created with
            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    log::info!("ESC pressed, closing");
                    self.close_requested = true;
                }
            }

            _ => {}
        }
    }
}

pub struct WinitPlatform {
    // State (and its window) drops before the event loop
    state: WindowState,
    event_loop: EventLoop<()>,
    poll_timeout: Duration,
}

impl WinitPlatform {
    /// Open the window and pump until it exists.
    pub fn open(config: &WindowConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("Failed to create event loop")?;

        let attributes = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height))
            .with_resizable(false);

        let mut state = WindowState {
            attributes,
            window: None,
            close_requested: false,
            creation_error: None,
        };

        while state.window.is_none() {
            if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut state) {
                anyhow::bail!("Event loop exited with code {} before the window opened", code);
            }
            if let Some(error) = state.creation_error.take() {
                anyhow::bail!("Failed to create window: {}", error);
            }
        }

        log::info!("Window: {}x{} ({})", config.width, config.height, config.title);

        Ok(Self {
            state,
            event_loop,
            poll_timeout: Duration::from_millis(config.poll_timeout_ms),
        })
    }

    pub fn window(&self) -> Option<&Window> {
        self.state.window.as_ref()
    }
}

impl Platform for WinitPlatform {
    fn native_handles(&self) -> Result<NativeHandles, PresentError> {
        let window = self
            .window()
            .ok_or_else(|| PresentError::Platform("window is not open".to_string()))?;

        Ok(NativeHandles {
            display: window.raw_display_handle(),
            window: window.raw_window_handle(),
        })
    }

    fn poll_events(&mut self) -> bool {
        let status = self
            .event_loop
            .pump_app_events(Some(self.poll_timeout), &mut self.state);

        if let PumpStatus::Exit(code) = status {
            log::info!("Event loop exited with code {}", code);
            return false;
        }

        !self.state.close_requested
    }
}

impl Drop for WinitPlatform {
    fn drop(&mut self) {
        log::info!("Closing window");
        self.state.window = None;
    }
}
