//! # interpreter
//!
//! Glues the machine to the outside world. Each frame the host loop:
//!
//!  1. polls input
//!  2. executes `cycles_per_frame` instructions (fewer if Fx0A is waiting)
//!  3. ticks the delay and sound timers once
//!  4. presents the framebuffer, but only if it changed
//!  5. starts or stops the tone to follow the sound timer
//!  6. sleeps off the rest of the frame
//!
//! With the default of one instruction per frame this is exactly
//! execute -> tick -> present per iteration.
use crate::config::Config;
use crate::cpu::{Cpu, Step};
use crate::display::Display;
use crate::error::MachineError;
use crate::input::{Input, Keypad};
use crate::machine::Machine;
use crate::memory::LoadReport;
use crate::sound::Sound;
use crate::timer::FrameClock;
use std::error::Error;
use std::io;

pub struct Chip8Interpreter<'a> {
    machine: Machine,
    cpu: Cpu,
    config: Config,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    frames: u64,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        config: Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Chip8Interpreter<'a> {
        Chip8Interpreter {
            machine: Machine::new(),
            cpu: Cpu::new(config.seed, config.shift_source),
            config,
            display,
            input,
            sound,
            frames: 0,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<LoadReport, io::Error> {
        let report = self.machine.load_program(reader)?;
        log::info!("loaded {} byte program", report.loaded);
        if report.truncated > 0 {
            log::warn!(
                "program too large; dropped the last {} bytes",
                report.truncated
            );
        }
        Ok(report)
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// execute a single instruction against the current input state
    pub fn step(&mut self) -> Result<Step, MachineError> {
        let keypad = Keypad::new(&self.config.keymap, &*self.input);
        self.cpu.step(&mut self.machine, &keypad)
    }

    /// run one frame's worth of work
    pub fn frame(&mut self) -> Result<(), Box<dyn Error>> {
        self.input.poll()?;
        for _ in 0..self.config.cycles_per_frame {
            if self.step()? == Step::WaitingForKey {
                break;
            }
        }

        let mode = self.config.timer_mode;
        self.machine.delay_timer.tick(mode);
        self.machine.sound_timer.tick(mode);

        if let Some(rows) = self.machine.display.take_dirty() {
            self.display
                .present(rows, self.config.on_color, self.config.off_color)?;
        }
        self.sound.set_tone(self.machine.sound_timer.is_running())?;
        self.frames += 1;
        Ok(())
    }

    pub fn should_close(&self) -> bool {
        self.display.should_close() || self.input.should_close()
    }

    /// run frames until asked to close, the frame limit is hit or the machine
    /// faults
    pub fn main_loop(&mut self) -> Result<(), Box<dyn Error>> {
        let mut clock = FrameClock::new(self.config.frame_rate);
        log::info!(
            "running at {} instruction(s) per frame, {} frames/s",
            self.config.cycles_per_frame,
            self.config.frame_rate
        );
        while !self.should_close() && self.config.max_frames.map_or(true, |max| self.frames < max)
        {
            clock.start();
            self.frame()?;
            clock.sleep();
        }
        self.sound.set_tone(false)?;
        log::info!("stopped after {} frames", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::sound::Mute;
    use crate::timer::TimerMode;

    fn fast() -> Config {
        Config {
            frame_rate: 1000.0,
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_program_load_ok() -> Result<(), io::Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(fast(), &mut display, &mut input, &mut sound);
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        let report = i.load_program(&mut prog)?;
        assert_eq!(report.loaded, 2);
        Ok(())
    }

    #[test]
    fn test_one_instruction_per_frame() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(fast(), &mut display, &mut input, &mut sound);
        i.load_program(&mut &[0x61u8, 0x00, 0x71, 0x01, 0x12, 0x02][..])?;
        for _ in 0..3 {
            i.frame()?;
        }
        assert_eq!(i.machine().registers[1], 1);
        assert_eq!(i.machine().pc, 0x202);
        assert_eq!(i.frames(), 3);
        Ok(())
    }

    #[test]
    fn test_presents_only_dirty_frames() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        let mut sound = Mute::new();
        {
            let mut i = Chip8Interpreter::new(fast(), &mut display, &mut input, &mut sound);
            // LD I, 0; DRW V0, V0, 5; JP 204
            i.load_program(&mut &[0xa0u8, 0x00, 0xd0, 0x05, 0x12, 0x04][..])?;
            for _ in 0..6 {
                i.frame()?;
            }
        }
        assert_eq!(display.frames, 1);
        let rows = display.last.ok_or("nothing presented")?;
        assert_eq!(rows[0], 0xf);
        Ok(())
    }

    #[test]
    fn test_timers_tick_per_frame() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        let mut sound = Mute::new();
        let config = Config {
            cycles_per_frame: 10,
            ..fast()
        };
        {
            let mut i = Chip8Interpreter::new(config, &mut display, &mut input, &mut sound);
            // LD V1, 5; LD DT, V1; LD ST, V1; JP 206
            i.load_program(&mut &[0x61u8, 0x05, 0xf1, 0x15, 0xf1, 0x18, 0x12, 0x06][..])?;
            i.frame()?;
            // ten instructions ran but the timers only ticked once
            assert_eq!(i.machine().delay_timer.get(), 4);
            for _ in 0..4 {
                i.frame()?;
            }
            assert_eq!(i.machine().delay_timer.get(), 0);
            i.frame()?;
            assert_eq!(i.machine().delay_timer.get(), 0);
            assert_eq!(i.machine().sound_timer.get(), 0);
        }
        assert_eq!((sound.beeps, sound.stops), (1, 1));
        Ok(())
    }

    #[test]
    fn test_reload_timer_mode() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        let mut sound = Mute::new();
        let config = Config {
            timer_mode: TimerMode::Reload,
            ..fast()
        };
        let mut i = Chip8Interpreter::new(config, &mut display, &mut input, &mut sound);
        i.load_program(&mut &[0x12u8, 0x00][..])?;
        i.frame()?;
        assert_eq!(i.machine().delay_timer.get(), 0xff);
        Ok(())
    }

    #[test]
    fn test_key_wait_ends_frame_early() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        let mut sound = Mute::new();
        let config = Config {
            cycles_per_frame: 8,
            ..fast()
        };
        let mut i = Chip8Interpreter::new(config, &mut display, &mut input, &mut sound);
        // LD V2, K; ADD V2, 1; JP 204
        i.load_program(&mut &[0xf2u8, 0x0a, 0x72, 0x01, 0x12, 0x04][..])?;
        i.frame()?;
        assert_eq!(i.machine().pc, 0x200);
        Ok(())
    }

    #[test]
    fn test_key_wait_resumes() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&['3']);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(fast(), &mut display, &mut input, &mut sound);
        i.load_program(&mut &[0xf2u8, 0x0a, 0x72, 0x01, 0x12, 0x04][..])?;
        i.frame()?;
        i.frame()?;
        assert_eq!(i.machine().registers[2], 4);
        Ok(())
    }

    #[test]
    fn test_fatal_error_stops_loop() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(fast(), &mut display, &mut input, &mut sound);
        i.load_program(&mut &[0x00u8, 0xee][..])?;
        let err = i.main_loop().err().ok_or("expected a fault")?;
        assert_eq!(
            err.downcast_ref::<MachineError>(),
            Some(&MachineError::StackUnderflow { pc: 0x200 })
        );
        Ok(())
    }

    #[test]
    fn test_main_loop_frame_limit() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        let mut sound = Mute::new();
        let config = Config {
            max_frames: Some(5),
            ..fast()
        };
        let mut i = Chip8Interpreter::new(config, &mut display, &mut input, &mut sound);
        i.load_program(&mut &[0x12u8, 0x00][..])?;
        i.main_loop()?;
        assert_eq!(i.frames(), 5);
        Ok(())
    }

    #[test]
    fn test_main_loop_honours_close() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::default();
        input.close = true;
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(fast(), &mut display, &mut input, &mut sound);
        i.main_loop()?;
        assert_eq!(i.frames(), 0);
        Ok(())
    }
}
