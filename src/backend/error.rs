// Presentation errors
//
// Two families: the environment cannot support presentation at all
// (no present support, no formats, no depth format, no memory type), or a
// single device call returned a non-success code. Both end the program;
// keeping them apart lets callers and tests tell "bad device" from
// "bad call".

use ash::prelude::VkResult;
use ash::vk;

pub type Result<T, E = PresentError> = std::result::Result<T, E>;

/// The device or surface cannot support presentation as configured.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("queue family {queue_family} cannot present to the surface (WSI not supported)")]
    PresentUnsupported { queue_family: u32 },

    #[error("surface reports no supported formats")]
    NoSurfaceFormats,

    #[error("none of the depth/stencil formats {candidates:?} support optimal-tiling attachments")]
    NoDepthStencilFormat { candidates: Vec<vk::Format> },

    #[error("no memory type in mask {type_bits:#x} has properties {flags:?}")]
    NoMemoryType {
        type_bits: u32,
        flags: vk::MemoryPropertyFlags,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("{call} failed: {result}")]
    Device {
        call: &'static str,
        result: vk::Result,
    },

    #[error("platform error: {0}")]
    Platform(String),

    #[error("{0} was requested before the stage that builds it")]
    StageOrder(&'static str),
}

impl PresentError {
    pub fn is_environment(&self) -> bool {
        matches!(self, PresentError::Environment(_))
    }
}

/// Shared check for raw device results.
pub trait VkResultExt<T> {
    fn checked(self, call: &'static str) -> Result<T>;
}

impl<T> VkResultExt<T> for VkResult<T> {
    fn checked(self, call: &'static str) -> Result<T> {
        self.map_err(|result| {
            log::error!("[Vulkan] {} returned {:?}", call, result);
            PresentError::Device { call, result }
        })
    }
}
