use std::ffi::{CStr, CString};
use ash::prelude::VkResult;
use ash::vk;
use crate::renderer::core::queue::{find_queue_families, QueueFamilyIndices};

/// Raw capability queries against one physical device and the bound surface.
/// Implementations must not retain or create anything; every call is a pure query.
pub trait CapabilityProbe {
    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    fn supports_present(&self, device: vk::PhysicalDevice, family_index: u32) -> VkResult<bool>;

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<CString>>;

    fn surface_capabilities(&self, device: vk::PhysicalDevice) -> VkResult<vk::SurfaceCapabilitiesKHR>;

    fn surface_formats(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::SurfaceFormatKHR>>;

    fn present_modes(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::PresentModeKHR>>;

    /// Human-readable device name for logs.
    fn device_name(&self, device: vk::PhysicalDevice) -> String {
        format!("{device:?}")
    }

    fn surface_support(&self, device: vk::PhysicalDevice) -> VkResult<SurfaceSupport> {
        Ok(SurfaceSupport {
            capabilities: self.surface_capabilities(device)?,
            formats: self.surface_formats(device)?,
            present_modes: self.present_modes(device)?,
        })
    }
}

/// Snapshot of what the surface accepts from a given device.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SurfaceSupport {
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Everything the selector needs to judge one candidate.
#[derive(Debug, Clone)]
pub struct DeviceSupport {
    pub queue_families: QueueFamilyIndices,
    pub extensions_supported: bool,
    pub surface: SurfaceSupport,
}

impl DeviceSupport {
    pub fn is_suitable(&self) -> bool {
        self.queue_families.is_complete()
            && self.extensions_supported
            && self.surface.is_adequate()
    }
}

pub fn probe_device(
    probe: &dyn CapabilityProbe,
    device: vk::PhysicalDevice,
    required_extensions: &[&CStr],
) -> VkResult<DeviceSupport> {
    let queue_families = find_queue_families(
        &probe.queue_families(device),
        |i| match probe.supports_present(device, i) {
            Ok(supported) => supported,
            Err(e) => {
                log::warn!("Present support query failed for queue family {}: {}", i, e);
                false
            }
        },
    );

    let available = probe.device_extensions(device)?;
    let extensions_supported = extensions_supported(&available, required_extensions);

    let surface = probe.surface_support(device)?;

    Ok(DeviceSupport {
        queue_families,
        extensions_supported,
        surface,
    })
}

/// True iff every required name appears in `available` (exact, case-sensitive).
pub fn extensions_supported(available: &[CString], required: &[&CStr]) -> bool {
    required.iter().all(|req_ext| {
        let supported = available.iter().any(|ext| ext.as_c_str() == *req_ext);
        if !supported {
            log::debug!("Device extension not supported: {:?}", req_ext);
        }
        supported
    })
}

/// Probe backed by the live instance and surface.
pub struct VulkanProbe<'a> {
    instance: &'a ash::Instance,
    surface_loader: &'a ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
}

impl<'a> VulkanProbe<'a> {
    pub fn new(
        instance: &'a ash::Instance,
        surface_loader: &'a ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Self {
        Self {
            instance,
            surface_loader,
            surface,
        }
    }
}

impl CapabilityProbe for VulkanProbe<'_> {
    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        unsafe {
            self.instance.get_physical_device_queue_family_properties(device)
        }
    }

    fn supports_present(&self, device: vk::PhysicalDevice, family_index: u32) -> VkResult<bool> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_support(device, family_index, self.surface)
        }
    }

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<CString>> {
        let props = unsafe {
            self.instance.enumerate_device_extension_properties(device)?
        };
        Ok(props
            .iter()
            .filter_map(|p| p.extension_name_as_c_str().ok())
            .map(CStr::to_owned)
            .collect())
    }

    fn surface_capabilities(&self, device: vk::PhysicalDevice) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(device, self.surface)
        }
    }

    fn surface_formats(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(device, self.surface)
        }
    }

    fn present_modes(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(device, self.surface)
        }
    }

    fn device_name(&self, device: vk::PhysicalDevice) -> String {
        let props = unsafe {
            self.instance.get_physical_device_properties(device)
        };
        props
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| format!("{device:?}"))
    }
}
