// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// A missing file means defaults. Loading runs before the logger exists, so
// problems are returned to the caller instead of logged here.

use anyhow::{Context, Result};
use ash::vk;
use serde::Deserialize;
use std::path::Path;

use crate::backend::swapchain::{SwapchainRequest, DEFAULT_IMAGE_COUNT};

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub swapchain: SwapchainConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// How long one update() may wait for events
    pub poll_timeout_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Presentation".to_string(),
            width: 1280,
            height: 720,
            poll_timeout_ms: 16,
        }
    }
}

/// Swapchain negotiation settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SwapchainConfig {
    /// Requested image count; clamped against the surface
    pub image_count: u32,
    /// Use MAILBOX when the device offers it, FIFO otherwise
    pub allow_mailbox: bool,
}

impl Default for SwapchainConfig {
    fn default() -> Self {
        Self {
            image_count: DEFAULT_IMAGE_COUNT,
            allow_mailbox: true,
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Only honored in debug builds
    pub validation_layers: bool,
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config.toml from the working directory
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the log level as a `log` filter
    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.debug
            .log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown log level '{}'", self.debug.log_level))
    }

    /// What to ask the swapchain for
    pub fn swapchain_request(&self) -> SwapchainRequest {
        SwapchainRequest {
            extent: vk::Extent2D {
                width: self.window.width,
                height: self.window.height,
            },
            image_count: self.swapchain.image_count,
            allow_mailbox: self.swapchain.allow_mailbox,
        }
    }
}
