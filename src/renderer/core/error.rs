use ash::vk;
use thiserror::Error;

/// Fatal conditions raised while bringing up the graphics context.
/// None of these are retried: the caller reports and terminates.
#[derive(Debug, Error)]
pub enum BringUpError {
    #[error("Failed to create instance: {0}")]
    InstanceCreation(#[from] InstanceCreationError),

    #[error("Failed to set up debug messenger: {0}")]
    DebugSetup(vk::Result),

    #[error("Failed to create window surface: {0}")]
    SurfaceCreation(#[from] SurfaceCreationError),

    #[error("Failed to enumerate physical devices: {0}")]
    DeviceEnumeration(vk::Result),

    #[error("Failed to find a suitable GPU ({candidates} candidate(s) enumerated)")]
    NoSuitableDevice { candidates: usize },

    #[error("Failed to create logical device: {0}")]
    DeviceCreation(vk::Result),

    #[error("Failed to create swapchain: {0}")]
    SwapchainCreation(vk::Result),

    #[error("Failed to create swapchain image view: {0}")]
    ImageViewCreation(vk::Result),
}

#[derive(Debug, Error)]
pub enum InstanceCreationError {
    #[error("Vulkan library could not be loaded: {0}")]
    LibraryUnavailable(#[from] ash::LoadingError),

    #[error("Validation layer {0} requested, but not available")]
    MissingValidationLayer(String),

    #[error("Window handle unavailable: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),

    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
}

#[derive(Debug, Error)]
pub enum SurfaceCreationError {
    #[error("Window manager has no native window to present to")]
    NoNativeWindow,

    #[error("Window handle unavailable: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),

    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
}
