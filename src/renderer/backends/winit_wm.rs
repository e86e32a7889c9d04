use std::sync::Arc;
use std::time::{Duration, Instant};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};
use crate::renderer::api::{GameIteration, NativeWindow, WindowManagerApi};
use crate::renderer::config::RenderConfig;
use crate::renderer::pacing::{run_paced, FramePacer};

const WINDOW_CREATION_PUMPS: usize = 64;

/// Window flags updated from winit events
#[derive(Debug, Default)]
pub struct WindowEvents {
    pub close_requested: bool,
    pub resized_to: Option<(u32, u32)>,
}

impl WindowEvents {
    pub fn process_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                self.resized_to = Some((size.width, size.height));
            }
            _ => {}
        }
    }
}

/// Receives winit callbacks while events are pumped
struct WinitHandler {
    attributes: WindowAttributes,
    window: Option<Arc<Window>>,
    creation_error: Option<OsError>,
    events: WindowEvents,
}

impl ApplicationHandler for WinitHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.creation_error = Some(e),
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }
        self.events.process_window_event(&event);
    }
}

/// Window manager backed by a native winit window
pub struct WinitWindowManager {
    // Dropped before the event loop
    handler: Option<WinitHandler>,
    event_loop: Option<EventLoop<()>>,
    pacer: FramePacer,
    started: Instant,
    exited: bool,
}

impl WinitWindowManager {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            handler: None,
            event_loop: None,
            pacer: FramePacer::new(config.frame_period),
            started: Instant::now(),
            exited: false,
        }
    }

    fn window(&self) -> Option<&Arc<Window>> {
        self.handler.as_ref().and_then(|h| h.window.as_ref())
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        let (Some(event_loop), Some(handler)) = (self.event_loop.as_mut(), self.handler.as_mut()) else {
            return;
        };
        if let PumpStatus::Exit(code) = event_loop.pump_app_events(timeout, handler) {
            log::info!("Event loop exited with code {}", code);
            self.exited = true;
        }
    }
}

impl WindowManagerApi for WinitWindowManager {
    fn init(&mut self, config: &RenderConfig) -> Result<()> {
        let event_loop = EventLoop::new()?;
        let (width, height) = config.window_size;
        let attributes = Window::default_attributes()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(true);

        self.event_loop = Some(event_loop);
        self.handler = Some(WinitHandler {
            attributes,
            window: None,
            creation_error: None,
            events: WindowEvents::default(),
        });

        // The window is created from the first `resumed` callback
        for _ in 0..WINDOW_CREATION_PUMPS {
            self.pump(Some(Duration::ZERO));
            if let Some(e) = self.handler.as_mut().and_then(|h| h.creation_error.take()) {
                return Err(eyre!("Failed to create window: {}", e));
            }
            if self.window().is_some() {
                break;
            }
        }
        if self.window().is_none() {
            return Err(eyre!("Event loop never resumed; no window was created"));
        }

        self.started = Instant::now();
        log::info!("Created {}x{} window \"{}\"", width, height, config.window_title);
        Ok(())
    }

    fn main_loop(&mut self, run_one_game_iter: &mut GameIteration<'_>) -> Result<()> {
        let pacer = self.pacer;
        run_paced(self, pacer, run_one_game_iter)
    }

    fn get_dimensions(&self) -> (u32, u32) {
        self.window()
            .map(|w| {
                let size = w.inner_size();
                (size.width, size.height)
            })
            .unwrap_or((0, 0))
    }

    fn handle_events(&mut self) {
        self.pump(Some(Duration::ZERO));
        if let Some(handler) = self.handler.as_mut() {
            if let Some((width, height)) = handler.events.resized_to.take() {
                log::debug!("Window resized to {}x{}", width, height);
            }
        }
    }

    fn start_frame(&mut self) -> bool {
        true
    }

    fn swap_buffers_begin(&mut self) {
        if let Some(window) = self.window() {
            window.pre_present_notify();
        }
    }

    fn swap_buffers_end(&mut self) {}

    fn get_time(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn should_close(&self) -> bool {
        self.exited
            || self
                .handler
                .as_ref()
                .map_or(true, |h| h.events.close_requested)
    }

    fn native_window(&self) -> Option<&dyn NativeWindow> {
        self.window().map(|w| &**w as &dyn NativeWindow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn close_request_is_latched() {
        let mut events = WindowEvents::default();
        events.process_window_event(&WindowEvent::Focused(true));
        assert!(!events.close_requested);

        events.process_window_event(&WindowEvent::CloseRequested);
        events.process_window_event(&WindowEvent::Focused(false));
        assert!(events.close_requested);
    }

    #[test]
    fn resize_records_latest_size() {
        let mut events = WindowEvents::default();
        events.process_window_event(&WindowEvent::Resized(PhysicalSize::new(640, 480)));
        events.process_window_event(&WindowEvent::Resized(PhysicalSize::new(1024, 768)));
        assert_eq!(events.resized_to, Some((1024, 768)));
    }

    #[test]
    fn uninitialized_manager_reports_closed_and_windowless() {
        let wm = WinitWindowManager::new(&RenderConfig::default());
        assert!(wm.should_close());
        assert!(wm.native_window().is_none());
        assert_eq!(wm.get_dimensions(), (0, 0));
    }
}
