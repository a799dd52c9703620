use spin_sleep::LoopHelper;

/// How a countdown timer behaves once it has run down to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// stay at zero until reloaded
    #[default]
    Saturate,
    /// jump back to 0xff on the tick after reaching zero
    Reload,
}

/// An 8-bit countdown timer, ticked once per frame rather than per
/// instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timer(u8);

impl Timer {
    pub fn new(value: u8) -> Self {
        Timer(value)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn set(&mut self, value: u8) {
        self.0 = value;
    }

    pub fn is_running(&self) -> bool {
        self.0 != 0
    }

    pub fn tick(&mut self, mode: TimerMode) {
        self.0 = match (self.0, mode) {
            (0, TimerMode::Saturate) => 0,
            (0, TimerMode::Reload) => 0xff,
            (n, _) => n - 1,
        };
    }
}

/// Paces the host loop to a fixed frame rate.
pub struct FrameClock {
    helper: LoopHelper,
}

impl FrameClock {
    pub fn new(rate: f64) -> Self {
        FrameClock {
            helper: LoopHelper::builder().build_with_target_rate(rate),
        }
    }

    /// mark the start of a frame
    pub fn start(&mut self) {
        self.helper.loop_start();
    }

    /// sleep off whatever is left of the frame
    pub fn sleep(&mut self) {
        self.helper.loop_sleep();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_saturates_at_zero() {
        let mut t = Timer::new(5);
        for _ in 0..5 {
            t.tick(TimerMode::Saturate);
        }
        assert_eq!(t.get(), 0);
        for _ in 0..10 {
            t.tick(TimerMode::Saturate);
            assert_eq!(t.get(), 0);
        }
        assert!(!t.is_running());
    }

    #[test]
    fn test_reload_mode_wraps() {
        let mut t = Timer::new(1);
        t.tick(TimerMode::Reload);
        assert_eq!(t.get(), 0);
        t.tick(TimerMode::Reload);
        assert_eq!(t.get(), 0xff);
        t.tick(TimerMode::Reload);
        assert_eq!(t.get(), 0xfe);
    }

    #[test]
    fn test_set_reloads() {
        let mut t = Timer::default();
        t.tick(TimerMode::Saturate);
        t.set(3);
        assert!(t.is_running());
        t.tick(TimerMode::Saturate);
        assert_eq!(t.get(), 2);
    }

    #[test]
    fn test_clock_paces_frames() {
        let mut clock = FrameClock::new(100.0);
        let start = Instant::now();
        for _ in 0..5 {
            clock.start();
            clock.sleep();
        }
        // first frame may be short; the remaining four take ~10ms each
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
