use std::time::Instant;
use color_eyre::Result;
use crate::renderer::api::{GameIteration, NativeWindow, WindowManagerApi};
use crate::renderer::config::RenderConfig;
use crate::renderer::pacing::{run_paced, FramePacer};

/// Window manager without a native window.
///
/// Reports fixed dimensions and closes after `frame_limit` presented frames, if set.
pub struct HeadlessWindowManager {
    dimensions: (u32, u32),
    frame_limit: Option<u64>,
    frames_presented: u64,
    pacer: FramePacer,
    started: Instant,
}

impl HeadlessWindowManager {
    pub fn new(config: &RenderConfig, frame_limit: Option<u64>) -> Self {
        Self {
            dimensions: config.window_size,
            frame_limit,
            frames_presented: 0,
            pacer: FramePacer::new(config.frame_period),
            started: Instant::now(),
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl WindowManagerApi for HeadlessWindowManager {
    fn init(&mut self, config: &RenderConfig) -> Result<()> {
        self.dimensions = config.window_size;
        self.frames_presented = 0;
        self.started = Instant::now();
        log::info!(
            "Headless window manager at {}x{}, frame limit {:?}",
            self.dimensions.0,
            self.dimensions.1,
            self.frame_limit
        );
        Ok(())
    }

    fn main_loop(&mut self, run_one_game_iter: &mut GameIteration<'_>) -> Result<()> {
        let pacer = self.pacer;
        run_paced(self, pacer, run_one_game_iter)
    }

    fn get_dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn handle_events(&mut self) {}

    fn start_frame(&mut self) -> bool {
        true
    }

    fn swap_buffers_begin(&mut self) {}

    fn swap_buffers_end(&mut self) {
        self.frames_presented += 1;
    }

    fn get_time(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn should_close(&self) -> bool {
        self.frame_limit
            .is_some_and(|limit| self.frames_presented >= limit)
    }

    fn native_window(&self) -> Option<&dyn NativeWindow> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use color_eyre::eyre::eyre;

    fn config() -> RenderConfig {
        RenderConfig {
            window_size: (320, 240),
            frame_period: Duration::ZERO,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn main_loop_runs_until_frame_limit() {
        let mut wm = HeadlessWindowManager::new(&config(), Some(3));
        wm.init(&config()).unwrap();

        let mut iterations = 0;
        wm.main_loop(&mut |wapi: &mut dyn WindowManagerApi| {
            assert_eq!(wapi.get_dimensions(), (320, 240));
            iterations += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(iterations, 3);
        assert_eq!(wm.frames_presented(), 3);
        assert!(wm.should_close());
    }

    #[test]
    fn zero_limit_never_runs_an_iteration() {
        let mut wm = HeadlessWindowManager::new(&config(), Some(0));
        let mut iterations = 0;
        wm.main_loop(&mut |_: &mut dyn WindowManagerApi| {
            iterations += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(iterations, 0);
    }

    #[test]
    fn iteration_error_stops_the_loop() {
        let mut wm = HeadlessWindowManager::new(&config(), None);
        let mut iterations = 0;
        let result = wm.main_loop(&mut |_: &mut dyn WindowManagerApi| {
            iterations += 1;
            if iterations == 2 {
                return Err(eyre!("device lost"));
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(iterations, 2);
        assert_eq!(wm.frames_presented(), 1);
    }

    #[test]
    fn has_no_native_window() {
        let wm = HeadlessWindowManager::new(&config(), None);
        assert!(wm.native_window().is_none());
        assert!(!wm.should_close());
    }
}
