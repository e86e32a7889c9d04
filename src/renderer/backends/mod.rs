pub mod headless;
pub mod vulkan;
pub mod winit_wm;
