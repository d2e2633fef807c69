// Device memory helpers

use ash::vk;

use super::error::{EnvironmentError, Result};

/// Find a memory type index allowed by `requirements` whose property flags
/// contain all of `flags`. First match in table order wins.
pub fn find_memory_type_index(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    requirements: &vk::MemoryRequirements,
    flags: vk::MemoryPropertyFlags,
) -> Result<u32> {
    let type_filter = requirements.memory_type_bits;

    for i in 0..memory_properties.memory_type_count {
        let has_type = (type_filter & (1 << i)) != 0;
        let has_properties = memory_properties.memory_types[i as usize]
            .property_flags
            .contains(flags);

        if has_type && has_properties {
            return Ok(i);
        }
    }

    Err(EnvironmentError::NoMemoryType {
        type_bits: type_filter,
        flags,
    }
    .into())
}
