use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use chip8_vm::config::{Config, ShiftSource};
use chip8_vm::display::MonoTermDisplay;
use chip8_vm::input::StdinInput;
use chip8_vm::interpreter::Chip8Interpreter;
use chip8_vm::sound::{Mute, SimpleBeep, Sound};
use chip8_vm::timer::TimerMode;

use clap::{Parser, ValueEnum};

/// CHIP-8 virtual machine, in a terminal
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// program image to load at 0x200
    rom: PathBuf,

    /// instructions executed per frame
    #[arg(long, default_value_t = 1)]
    cycles_per_frame: u32,

    /// frames per second
    #[arg(long, default_value_t = 60.0)]
    frame_rate: f64,

    /// what the timers do once they reach zero
    #[arg(long, value_enum, default_value_t = TimerArg::Saturate)]
    timer_mode: TimerArg,

    /// register the 8xy6/8xyE shifts read from
    #[arg(long, value_enum, default_value_t = ShiftArg::Vx)]
    shift_source: ShiftArg,

    /// fixed random seed
    #[arg(long)]
    seed: Option<u64>,

    /// swap the lit and unlit colours
    #[arg(long)]
    invert: bool,

    /// how long a key press counts as held, in milliseconds
    #[arg(long, default_value_t = 150)]
    key_hold_ms: u64,

    /// stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// don't beep
    #[arg(long)]
    mute: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimerArg {
    Saturate,
    Reload,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShiftArg {
    Vx,
    Vy,
}

impl Args {
    fn config(&self) -> Config {
        let config = Config {
            cycles_per_frame: self.cycles_per_frame,
            frame_rate: self.frame_rate,
            timer_mode: match self.timer_mode {
                TimerArg::Saturate => TimerMode::Saturate,
                TimerArg::Reload => TimerMode::Reload,
            },
            shift_source: match self.shift_source {
                ShiftArg::Vx => ShiftSource::Vx,
                ShiftArg::Vy => ShiftSource::Vy,
            },
            seed: self.seed,
            key_hold: Duration::from_millis(self.key_hold_ms),
            max_frames: self.max_frames,
            ..Default::default()
        };
        if self.invert {
            config.inverted()
        } else {
            config
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let env = env_logger::Env::default()
        .filter_or("CHIP8_LOG", "warn")
        .write_style_or("CHIP8_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    let args = Args::parse();
    let config = args.config();

    // open the program before touching the terminal so a bad path is reported
    // cleanly
    let mut f = File::open(&args.rom).map_err(|e| {
        log::error!("cannot open {:?}: {}", args.rom, e);
        e
    })?;

    let mut display = MonoTermDisplay::new()?;
    let mut input = StdinInput::new(config.keymap, config.key_hold)?;
    let mut beeper = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if args.mute { &mut mute } else { &mut beeper };

    let mut interpreter = Chip8Interpreter::new(config, &mut display, &mut input, sound);
    interpreter.load_program(&mut f)?;
    let result = interpreter.main_loop();
    drop(interpreter);
    drop(input);
    drop(display);

    // shove a newline on stdout to stop the cli messing up the last frame
    println!();
    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("chip8-vm: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
