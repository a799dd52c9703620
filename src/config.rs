use crate::input::{KeyMap, CHIP8_CONVENTIONAL_KEYMAP};
use crate::timer::TimerMode;
use std::time::Duration;
use tui::style::Color;

/// Which register the 8xy6/8xyE shifts read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftSource {
    /// shift Vx in place, ignoring Vy
    #[default]
    Vx,
    /// shift Vy and store the result in Vx
    Vy,
}

/// Runtime knobs for the interpreter and its host loop.
#[derive(Debug, Clone)]
pub struct Config {
    /// instructions executed per presented frame
    pub cycles_per_frame: u32,
    /// frames per second the host loop is paced to
    pub frame_rate: f64,
    pub timer_mode: TimerMode,
    pub shift_source: ShiftSource,
    /// fixed seed for the random source; None seeds from the clock
    pub seed: Option<u64>,
    pub on_color: Color,
    pub off_color: Color,
    pub keymap: KeyMap,
    /// how long a terminal key press counts as held
    pub key_hold: Duration,
    /// stop after this many frames
    pub max_frames: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_frame: 1,
            frame_rate: 60.0,
            timer_mode: TimerMode::Saturate,
            shift_source: ShiftSource::Vx,
            seed: None,
            on_color: Color::White,
            off_color: Color::Black,
            keymap: CHIP8_CONVENTIONAL_KEYMAP,
            key_hold: Duration::from_millis(150),
            max_frames: None,
        }
    }
}

impl Config {
    /// swap the lit and unlit colours
    pub fn inverted(mut self) -> Self {
        std::mem::swap(&mut self.on_color, &mut self.off_color);
        self
    }
}
