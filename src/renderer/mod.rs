pub mod api;
pub mod backends;
pub mod config;
pub mod core;
pub mod pacing;

use color_eyre::Result;
use crate::renderer::api::{RenderingApi, WindowManagerApi};
use crate::renderer::backends::headless::HeadlessWindowManager;
use crate::renderer::backends::vulkan::VulkanRenderingApi;
use crate::renderer::backends::winit_wm::WinitWindowManager;
use crate::renderer::config::{RenderConfig, RenderingBackend, WindowBackend};

/// Binds one rendering backend and one window manager for the lifetime of the process
pub struct Renderer {
    config: RenderConfig,
    // Field order matters: the graphics context must be torn down before the window it presents to
    rendering: Box<dyn RenderingApi>,
    window: Box<dyn WindowManagerApi>,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        let rendering: Box<dyn RenderingApi> = match config.rendering_backend {
            RenderingBackend::Vulkan => Box::new(VulkanRenderingApi::new(config.clone())),
        };
        let window: Box<dyn WindowManagerApi> = match config.window_backend {
            WindowBackend::Winit => Box::new(WinitWindowManager::new(config)),
            WindowBackend::Headless { frame_limit } => {
                Box::new(HeadlessWindowManager::new(config, frame_limit))
            }
        };
        log::info!(
            "Selected {:?} rendering with {:?} window manager",
            config.rendering_backend,
            config.window_backend
        );
        Self::with_backends(config, rendering, window)
    }

    pub fn with_backends(
        config: &RenderConfig,
        rendering: Box<dyn RenderingApi>,
        window: Box<dyn WindowManagerApi>,
    ) -> Self {
        Self {
            config: config.clone(),
            rendering,
            window,
        }
    }

    /// Opens the window, then brings up the rendering backend against it
    pub fn init(&mut self) -> Result<()> {
        self.window.init(&self.config)?;
        self.rendering.init(self.window.native_window())?;
        Ok(())
    }

    /// Drives the window manager's main loop, handing both tables to `frame` each iteration
    pub fn run<F>(&mut self, mut frame: F) -> Result<()>
    where
        F: FnMut(&mut dyn RenderingApi, &mut dyn WindowManagerApi) -> Result<()>,
    {
        let rendering = &mut self.rendering;
        self.window
            .main_loop(&mut |wapi: &mut dyn WindowManagerApi| frame(rendering.as_mut(), wapi))
    }

    pub fn rendering(&self) -> &dyn RenderingApi {
        self.rendering.as_ref()
    }

    pub fn window(&self) -> &dyn WindowManagerApi {
        self.window.as_ref()
    }
}
