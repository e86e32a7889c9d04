use std::time::Duration;
use ash::vk;

pub const ENABLE_VALIDATION_LAYERS: bool = cfg!(debug_assertions);

/// Swapchain extent used when the surface leaves the choice to us
pub const DEFAULT_EXTENT: vk::Extent2D = vk::Extent2D {
    width: 1280,
    height: 720,
};

pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (800, 600);

pub const TARGET_FRAME_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderingBackend {
    Vulkan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBackend {
    Winit,
    /// No native window; closes after `frame_limit` frames when set
    Headless { frame_limit: Option<u64> },
}

/// Contains configuration options for the renderer like the window size, diagnostics, and frame cadence
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub application_name: String,
    pub window_title: String,
    pub window_size: (u32, u32),
    pub enable_validation: bool,
    pub default_extent: vk::Extent2D,
    pub frame_period: Duration,
    pub rendering_backend: RenderingBackend,
    pub window_backend: WindowBackend,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            application_name: "vkbringup".to_owned(),
            window_title: "vkbringup (Vulkan)".to_owned(),
            window_size: DEFAULT_WINDOW_SIZE,
            enable_validation: ENABLE_VALIDATION_LAYERS,
            default_extent: DEFAULT_EXTENT,
            frame_period: TARGET_FRAME_PERIOD,
            rendering_backend: RenderingBackend::Vulkan,
            window_backend: WindowBackend::Winit,
        }
    }
}
