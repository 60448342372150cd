use crate::cpu::io::Input;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

/// Without release events, a key counts as down for this long after its
/// last press (or auto-repeat).
const HOLD: Duration = Duration::from_millis(150);

/// Requests for the front end itself, rather than the CHIP-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePause,
    /// Run one instruction while paused.
    Step,
    Faster,
    Slower,
}

/// An [`Input`] fed by terminal key events.
#[derive(Debug)]
pub struct Keyboard {
    pressed: [bool; 16],
    /// Set when the terminal won't tell us about releases.
    held_until: Option<[Option<Instant>; 16]>,
}

impl Keyboard {
    pub fn new(reports_releases: bool) -> Self {
        Self {
            pressed: [false; 16],
            held_until: (!reports_releases).then_some([None; 16]),
        }
    }

    /// Consume pending input events; update key state. Returns any front
    /// end commands that came in.
    pub fn poll(&mut self) -> Result<Vec<Command>> {
        let mut commands = vec![];
        while event::poll(Duration::from_secs(0))? {
            if let Event::Key(e) = event::read()? {
                commands.extend(self.handle(e, Instant::now()));
            }
        }
        self.expire(Instant::now());
        Ok(commands)
    }

    fn handle(&mut self, e: KeyEvent, now: Instant) -> Option<Command> {
        let pressed = match e.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => true,
            KeyEventKind::Release => false,
        };

        if let Some(command) = filter_command(&e) {
            return pressed.then_some(command);
        }

        let KeyCode::Char(c) = e.code else {
            return None;
        };
        let k = keycode_to_chip8(c)?;
        self.pressed[k as usize] = pressed;
        if let Some(held_until) = &mut self.held_until {
            held_until[k as usize] = pressed.then_some(now + HOLD);
        }
        None
    }

    fn expire(&mut self, now: Instant) {
        let Some(held_until) = &mut self.held_until else {
            return;
        };
        for (pressed, until) in self.pressed.iter_mut().zip(held_until.iter_mut()) {
            if until.is_some_and(|t| t <= now) {
                *pressed = false;
                *until = None;
            }
        }
    }
}

impl Input for Keyboard {
    fn is_down(&self, key: u8) -> bool {
        self.pressed.get(key as usize).copied().unwrap_or(false)
    }
}

fn filter_command(e: &KeyEvent) -> Option<Command> {
    match e.code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('c' | 'C') if e.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Command::Quit)
        }
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Char('.' | '>') => Some(Command::Step),
        KeyCode::Char('+' | '=') => Some(Command::Faster),
        KeyCode::Char('-' | '_') => Some(Command::Slower),
        _ => None,
    }
}

/// Translate a key from the physical keyboard into one of the 16 virtual keys
/// on the CHIP-8.
///
/// The hex keypad is laid over the 4x4 block from `1` to `v`:
///
/// ```text
/// 1 2 3 C      1 2 3 4
/// 4 5 6 D  ->  q w e r
/// 7 8 9 E      a s d f
/// A 0 B F      z x c v
/// ```
fn keycode_to_chip8(c: char) -> Option<u8> {
    let key = match c.to_ascii_lowercase() {
        '1' => 0x1,
        '2' => 0x2,
        '3' => 0x3,
        '4' => 0xc,
        'q' => 0x4,
        'w' => 0x5,
        'e' => 0x6,
        'r' => 0xd,
        'a' => 0x7,
        's' => 0x8,
        'd' => 0x9,
        'f' => 0xe,
        'z' => 0xa,
        'x' => 0x0,
        'c' => 0xb,
        'v' => 0xf,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, kind)
    }

    #[test]
    fn layout_covers_every_key() {
        let mut keys: Vec<u8> = "1234qwerasdfzxcv"
            .chars()
            .filter_map(keycode_to_chip8)
            .collect();
        keys.sort();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
        assert_eq!(keycode_to_chip8('X'), Some(0x0));
        assert_eq!(keycode_to_chip8('p'), None);
    }

    #[test]
    fn press_and_release() {
        let mut kb = Keyboard::new(true);
        let now = Instant::now();
        assert_eq!(kb.handle(key('w', KeyEventKind::Press), now), None);
        assert!(kb.is_down(0x5));
        assert_eq!(kb.first_down(), Some(0x5));

        kb.handle(key('w', KeyEventKind::Release), now);
        assert!(!kb.is_down(0x5));

        // Releases are trusted: no expiry.
        kb.handle(key('v', KeyEventKind::Press), now);
        kb.expire(now + HOLD * 10);
        assert!(kb.is_down(0xf));
    }

    #[test]
    fn keys_expire_without_release_events() {
        let mut kb = Keyboard::new(false);
        let now = Instant::now();
        kb.handle(key('x', KeyEventKind::Press), now);
        kb.expire(now + HOLD / 2);
        assert!(kb.is_down(0x0));
        kb.expire(now + HOLD);
        assert!(!kb.is_down(0x0));
    }

    #[test]
    fn commands() {
        let mut kb = Keyboard::new(true);
        let now = Instant::now();
        assert_eq!(
            kb.handle(key(' ', KeyEventKind::Press), now),
            Some(Command::TogglePause)
        );
        assert_eq!(kb.handle(key(' ', KeyEventKind::Release), now), None);
        assert_eq!(kb.handle(key('.', KeyEventKind::Press), now), Some(Command::Step));
        assert_eq!(kb.handle(key('+', KeyEventKind::Press), now), Some(Command::Faster));
        assert_eq!(kb.handle(key('=', KeyEventKind::Repeat), now), Some(Command::Faster));
        assert_eq!(kb.handle(key('-', KeyEventKind::Press), now), Some(Command::Slower));
        assert_eq!(kb.handle(key('-', KeyEventKind::Release), now), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(kb.handle(ctrl_c, now), Some(Command::Quit));
        assert!(!kb.is_down(0xb));

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(kb.handle(esc, now), Some(Command::Quit));
    }
}
