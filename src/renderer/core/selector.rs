use std::ffi::CStr;
use ash::prelude::VkResult;
use ash::vk;
use crate::renderer::core::error::BringUpError;
use crate::renderer::core::probe::{probe_device, CapabilityProbe, SurfaceSupport};
use crate::renderer::core::queue::QueueFamilies;

/// The physical device chosen for bring-up, with the capabilities it was judged on
#[derive(Debug, Clone)]
pub struct SelectedDevice {
    pub physical: vk::PhysicalDevice,
    pub queue_families: QueueFamilies,
    pub surface: SurfaceSupport,
}

/// Picks the first device in enumeration order that is suitable. No scoring.
pub fn select_physical_device(
    probe: &dyn CapabilityProbe,
    devices: &[vk::PhysicalDevice],
    required_extensions: &[&CStr],
) -> Result<SelectedDevice, BringUpError> {
    for &device in devices {
        let name = probe.device_name(device);
        let support = match probe_device(probe, device, required_extensions) {
            Ok(support) => support,
            Err(e) => {
                log::warn!("Skipping device {}: capability query failed: {}", name, e);
                continue;
            }
        };

        if !support.is_suitable() {
            log::debug!(
                "Skipping device {}: queue families {:?}, extensions supported: {}, \
                 {} format(s), {} present mode(s)",
                name,
                support.queue_families,
                support.extensions_supported,
                support.surface.formats.len(),
                support.surface.present_modes.len(),
            );
            continue;
        }

        // Suitability implies both families are assigned
        let Some(queue_families) = support.queue_families.complete() else {
            continue;
        };

        log::info!("Selected physical device: {}", name);
        return Ok(SelectedDevice {
            physical: device,
            queue_families,
            surface: support.surface,
        });
    }

    Err(BringUpError::NoSuitableDevice {
        candidates: devices.len(),
    })
}

/// Selects from the result of device enumeration, keeping the driver's error if
/// enumeration itself failed.
pub fn select_from_enumeration(
    probe: &dyn CapabilityProbe,
    enumerated: VkResult<Vec<vk::PhysicalDevice>>,
    required_extensions: &[&CStr],
) -> Result<SelectedDevice, BringUpError> {
    let devices = enumerated.map_err(BringUpError::DeviceEnumeration)?;
    log::debug!("Enumerated {} physical device(s)", devices.len());
    select_physical_device(probe, &devices, required_extensions)
}
