use anyhow::{Context, Result};
use chip_8::{
    config::{DEFAULT_CLOCK_SPEED, MAX_CLOCK_SPEED},
    cpu::Mem,
    terminal_io::{Command, Keyboard, Screen, Terminal},
    Chip8, Clock, Config,
};
use clap::Parser;
use log::info;
use std::{path::PathBuf, thread, time::Duration};

/// Upper bound on one sleep of the main loop, so key events stay snappy.
const MAX_SLEEP: Duration = Duration::from_millis(5);

/// Run a CHIP-8 ROM in the terminal.
///
/// Keys: the 4x4 block `1234`/`qwer`/`asdf`/`zxcv` is the hex keypad.
/// Space pauses, `.` steps one instruction while paused, `+`/`-` change
/// the clock speed, Esc quits.
/// Logs go to stderr; redirect it (e.g. `2>chip8.log`) when using `RUST_LOG`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the ROM file to run.
    rom: PathBuf,

    /// Instructions per second.
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_CLOCK_SPEED,
        value_parser = clap::value_parser!(u32).range(1..=MAX_CLOCK_SPEED as i64),
    )]
    clock_speed: u32,

    /// Load address and entry point, in hex.
    #[arg(long, value_parser = parse_hex, default_value = "200")]
    origin: u16,

    /// Warn (in the log) about stack overflows and index register overruns.
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            clock_speed: self.clock_speed,
            origin: self.origin,
            strict: self.strict,
            ..Config::default()
        }
    }
}

fn parse_hex(s: &str) -> Result<u16, String> {
    let s = s.trim_start_matches("0x");
    let addr = u16::from_str_radix(s, 16).map_err(|e| e.to_string())?;
    if addr >= Mem::LEN {
        return Err(format!("0x{addr:x} is outside memory"));
    }
    Ok(addr)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.config();

    // Read the ROM before touching the terminal, so errors print normally.
    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("failed to read {}", args.rom.display()))?;

    let terminal = Terminal::setup()?;
    let keyboard = Keyboard::new(terminal.reports_key_releases());
    let mut chip8 = Chip8::with_config(Screen::new(), keyboard, &config);
    chip8.load(&rom, config.origin)?;

    let result = run(&mut chip8, &config);

    // After leaving the Alternate Screen in the terminal, the text goes away,
    // so we print it again here. This lets us see the last state the screen was
    // in when the emulator exited.
    drop(terminal);
    print!("{:?}", chip8.display());

    result
}

fn run(chip8: &mut Chip8<Screen, Keyboard>, config: &Config) -> Result<()> {
    let mut clock = Clock::new(config);
    let mut paused = false;

    loop {
        for command in chip8.input_mut().poll()? {
            match command {
                Command::Quit => return Ok(()),
                Command::TogglePause => {
                    paused = !paused;
                    clock.restart();
                    info!("{}", if paused { "paused" } else { "resumed" });
                }
                Command::Step if paused => {
                    chip8.step();
                    info!("{:?}", chip8.snapshot());
                }
                Command::Step => {}
                Command::Faster => info!("clock speed {} Hz", clock.faster()),
                Command::Slower => info!("clock speed {} Hz", clock.slower()),
            }
        }

        let due = clock.poll();
        if !paused {
            for _ in 0..due.steps {
                chip8.step();
            }
            for _ in 0..due.ticks {
                chip8.tick_timers();
            }
        }

        chip8.display_mut().render()?;
        thread::sleep(clock.until_next().min(MAX_SLEEP));
    }
}
