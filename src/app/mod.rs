use color_eyre::Result;
use crate::renderer::api::{RenderingApi, WindowManagerApi};
use crate::renderer::config::RenderConfig;
use crate::renderer::Renderer;

pub struct App {
    renderer: Renderer,
    frame_count: u64,
}

impl App {
    pub fn new() -> Result<Self> {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Result<Self> {
        let mut renderer = Renderer::new(&config);
        renderer.init()?;

        Ok(Self {
            renderer,
            frame_count: 0,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let frame_count = &mut self.frame_count;
        self.renderer.run(|rapi, wapi| {
            run_one_frame(rapi, wapi)?;
            *frame_count += 1;
            Ok(())
        })?;

        log::info!(
            "Main loop finished after {} frames ({:.2}s)",
            self.frame_count,
            self.renderer.window().get_time()
        );
        Ok(())
    }
}

fn run_one_frame(rapi: &mut dyn RenderingApi, wapi: &mut dyn WindowManagerApi) -> Result<()> {
    if !wapi.start_frame() {
        return Ok(());
    }
    rapi.start_frame()?;

    let (width, height) = wapi.get_dimensions();
    let (width, height) = (width as i32, height as i32);
    rapi.set_viewport(0, 0, width, height);
    rapi.set_scissor(0, 0, width, height);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use super::*;
    use crate::renderer::backends::headless::HeadlessWindowManager;
    use crate::renderer::backends::vulkan::VulkanRenderingApi;

    #[test]
    fn frame_covers_the_whole_window() {
        let config = RenderConfig {
            window_size: (640, 360),
            frame_period: Duration::ZERO,
            ..RenderConfig::default()
        };
        let mut rapi = VulkanRenderingApi::new(config.clone());
        let mut wapi = HeadlessWindowManager::new(&config, Some(1));

        run_one_frame(&mut rapi, &mut wapi).unwrap();

        let state = rapi.state();
        assert_eq!((state.viewport.width, state.viewport.height), (640.0, 360.0));
        assert_eq!(state.scissor.extent.width, 640);
        assert_eq!(state.scissor.extent.height, 360);
    }
}
