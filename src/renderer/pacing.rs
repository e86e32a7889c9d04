use std::time::{Duration, Instant};
use color_eyre::Result;
use crate::renderer::api::{GameIteration, WindowManagerApi};

/// Coarse frame limiter: sleeps away whatever is left of the target period.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    period: Duration,
}

impl FramePacer {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Time left in the period after `elapsed`, if any.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.period
            .checked_sub(elapsed)
            .filter(|rest| !rest.is_zero())
    }

    pub fn pace(&self, elapsed: Duration) {
        if let Some(rest) = self.remaining(elapsed) {
            std::thread::sleep(rest);
        }
    }
}

/// Shared main loop: pump events, run the iteration, sleep off the rest of the period,
/// then swap. Stops when the window manager wants to close or an iteration fails.
pub fn run_paced<W: WindowManagerApi>(
    window_manager: &mut W,
    pacer: FramePacer,
    run_one_game_iter: &mut GameIteration<'_>,
) -> Result<()> {
    while !window_manager.should_close() {
        window_manager.handle_events();
        if window_manager.should_close() {
            break;
        }

        let started = Instant::now();
        run_one_game_iter(window_manager)?;
        pacer.pace(started.elapsed());

        window_manager.swap_buffers_begin();
        window_manager.swap_buffers_end();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::renderer::api::NativeWindow;
    use crate::renderer::config::RenderConfig;

    type CallLog = Rc<RefCell<Vec<&'static str>>>;

    /// Window manager that logs every loop-facing call and closes on demand
    struct RecordingWindow {
        calls: CallLog,
        frames_left: u32,
        close_on_events: bool,
        closed: bool,
    }

    impl RecordingWindow {
        fn new(calls: &CallLog, frames: u32) -> Self {
            Self {
                calls: calls.clone(),
                frames_left: frames,
                close_on_events: false,
                closed: false,
            }
        }
    }

    impl WindowManagerApi for RecordingWindow {
        fn init(&mut self, _: &RenderConfig) -> Result<()> {
            Ok(())
        }
        fn main_loop(&mut self, run_one_game_iter: &mut GameIteration<'_>) -> Result<()> {
            run_paced(self, FramePacer::new(Duration::ZERO), run_one_game_iter)
        }
        fn get_dimensions(&self) -> (u32, u32) {
            (0, 0)
        }
        fn handle_events(&mut self) {
            self.calls.borrow_mut().push("handle_events");
            if self.close_on_events {
                self.closed = true;
            }
        }
        fn start_frame(&mut self) -> bool {
            true
        }
        fn swap_buffers_begin(&mut self) {
            self.calls.borrow_mut().push("swap_begin");
        }
        fn swap_buffers_end(&mut self) {
            self.calls.borrow_mut().push("swap_end");
            self.frames_left = self.frames_left.saturating_sub(1);
        }
        fn get_time(&self) -> f64 {
            0.0
        }
        fn should_close(&self) -> bool {
            self.closed || self.frames_left == 0
        }
        fn native_window(&self) -> Option<&dyn NativeWindow> {
            None
        }
    }

    #[test]
    fn each_frame_pumps_events_then_iterates_then_swaps() {
        let calls = CallLog::default();
        let mut window = RecordingWindow::new(&calls, 2);
        let iter_calls = calls.clone();

        window
            .main_loop(&mut |_: &mut dyn WindowManagerApi| {
                iter_calls.borrow_mut().push("iter");
                Ok(())
            })
            .unwrap();

        assert_eq!(
            *calls.borrow(),
            [
                "handle_events", "iter", "swap_begin", "swap_end",
                "handle_events", "iter", "swap_begin", "swap_end",
            ]
        );
    }

    #[test]
    fn close_raised_while_pumping_skips_the_iteration() {
        let calls = CallLog::default();
        let mut window = RecordingWindow::new(&calls, 5);
        window.close_on_events = true;
        let iter_calls = calls.clone();

        window
            .main_loop(&mut |_: &mut dyn WindowManagerApi| {
                iter_calls.borrow_mut().push("iter");
                Ok(())
            })
            .unwrap();

        assert_eq!(*calls.borrow(), ["handle_events"]);
    }

    #[test]
    fn early_frame_sleeps_the_remainder() {
        let pacer = FramePacer::new(Duration::from_millis(33));
        assert_eq!(pacer.remaining(Duration::from_millis(10)), Some(Duration::from_millis(23)));
    }

    #[test]
    fn late_or_exact_frame_does_not_sleep() {
        let pacer = FramePacer::new(Duration::from_millis(33));
        assert_eq!(pacer.remaining(Duration::from_millis(33)), None);
        assert_eq!(pacer.remaining(Duration::from_millis(50)), None);
    }

    #[test]
    fn pace_waits_at_least_the_remainder() {
        let pacer = FramePacer::new(Duration::from_millis(20));
        let started = Instant::now();
        pacer.pace(Duration::from_millis(5));
        assert!(started.elapsed() >= Duration::from_millis(15));
    }
}
