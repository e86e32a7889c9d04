/// "Core" holds the Vulkan objects behind a bring-up: instance, surface, device and swapchain,
/// plus the capability checks and teardown ledger that tie them together.

pub mod context;
pub mod device;
pub mod error;
pub mod instance;
pub mod probe;
pub mod queue;
pub mod selector;
pub mod state;
pub mod swapchain;
pub mod teardown;
