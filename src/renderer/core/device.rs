use std::ffi::{c_char, CStr};
use ash::vk;
use smallvec::SmallVec;
use crate::renderer::core::error::BringUpError;
use crate::renderer::core::queue::QueueFamilies;

pub fn get_required_device_extensions() -> Vec<&'static CStr> {
    vec![
        ash::khr::swapchain::NAME,

        #[cfg(target_os = "macos")]
        ash::khr::portability_subset::NAME,
    ]
}

/// One queue request per distinct family, all at the same priority
fn queue_create_infos<'a>(
    queue_families: QueueFamilies,
    priorities: &'a [f32],
) -> SmallVec<[vk::DeviceQueueCreateInfo<'a>; 2]> {
    queue_families
        .unique()
        .into_iter()
        .map(|family| {
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(family)
                .queue_priorities(priorities)
        })
        .collect()
}

/// Creates the logical device, returning it with its graphics and present queues.
pub fn create_logical_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    queue_families: QueueFamilies,
) -> Result<(ash::Device, vk::Queue, vk::Queue), BringUpError> {
    let queue_priorities = [1.0];
    let queue_create_infos = queue_create_infos(queue_families, &queue_priorities);

    let enabled_extension_names = get_required_device_extensions()
        .iter()
        .map(|ext| ext.as_ptr())
        .collect::<Vec<*const c_char>>();
    let enabled_features = vk::PhysicalDeviceFeatures::default();

    let device_create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_create_infos)
        .enabled_extension_names(&enabled_extension_names)
        .enabled_features(&enabled_features);

    let device = unsafe {
        instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(BringUpError::DeviceCreation)?
    };

    let graphics_queue = unsafe {
        device.get_device_queue(queue_families.graphics, 0)
    };
    let present_queue = unsafe {
        device.get_device_queue(queue_families.present, 0)
    };

    log::info!(
        "Created logical device ({} queue family request(s): graphics {}, present {})",
        queue_create_infos.len(),
        queue_families.graphics,
        queue_families.present,
    );

    Ok((device, graphics_queue, present_queue))
}
