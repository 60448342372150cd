//! A CHIP-8 interpreter.
//!
//! [`Chip8`] is a plain state machine: something else decides how often to
//! call [`Chip8::step`] and [`Chip8::tick_timers`] (see [`Clock`]), and
//! supplies the [`Display`] and [`Input`] devices it draws to and reads
//! keys from.

pub mod clock;
pub mod config;
pub mod cpu;
pub mod error;
pub mod terminal_io;

pub use clock::{Clock, Due};
pub use config::Config;
pub use cpu::io::{Display, Input};
pub use cpu::{Chip8, FrameBuffer, Instruction, KeyWait, Keypad, Snapshot, UnknownOpcode};
pub use error::LoadError;
