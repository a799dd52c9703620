//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * architecture-exact arithmetic: 8-bit wraparound, VF as the
//!   carry/not-borrow/collision flag, toroidal sprite drawing
//! * one `step()` per instruction; the cpu keeps no state between steps,
//!   so the host loop is free to interleave input, timers and rendering
//! * timers tick once per presented frame, not once per instruction
//! * abstract display, input and sound so alternatives can be plugged in;
//!   starting with a TUI in-console display and crossterm keyboard input
//! * fatal machine conditions (stack under/overflow, bad key index, memory
//!   access past the end) are errors, never panics
//!
//! Model
//!
//! ```text
//! main
//!  |-- config, display, input, sound
//!  `-- interpreter(config, display, input, sound)
//!       |-- machine: memory (font + program), registers, stack, framebuffer, timers
//!       |-- cpu: fetch -> decode (instruction) -> execute
//!       `-- main loop, once per frame:
//!             poll input; step x cycles_per_frame; tick timers;
//!             present if dirty; follow the sound timer; sleep
//! ```
pub mod config;
pub mod cpu;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod sound;
pub mod timer;

pub use error::MachineError;
