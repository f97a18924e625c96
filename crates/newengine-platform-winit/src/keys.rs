//! Host key codes sent through the bridge.
//!
//! Keyboard keys use Win32-style virtual key numbers; gamepad buttons live in
//! their own range above [`PAD_BASE`].

use gilrs::Button;
use winit::keyboard::{KeyCode, PhysicalKey};

pub const BACKSPACE: i32 = 8;
pub const TAB: i32 = 9;
pub const ENTER: i32 = 13;
pub const SHIFT: i32 = 16;
pub const CONTROL: i32 = 17;
pub const ALT: i32 = 18;
pub const ESCAPE: i32 = 27;
pub const SPACE: i32 = 32;
pub const LEFT: i32 = 37;
pub const UP: i32 = 38;
pub const RIGHT: i32 = 39;
pub const DOWN: i32 = 40;
pub const F1: i32 = 112;

pub const PAD_BASE: i32 = 0x1000;

pub fn map_physical_key(key: PhysicalKey) -> Option<i32> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };

    let letter = |c: char| Some(c as i32);
    match code {
        KeyCode::KeyA => letter('A'),
        KeyCode::KeyB => letter('B'),
        KeyCode::KeyC => letter('C'),
        KeyCode::KeyD => letter('D'),
        KeyCode::KeyE => letter('E'),
        KeyCode::KeyF => letter('F'),
        KeyCode::KeyG => letter('G'),
        KeyCode::KeyH => letter('H'),
        KeyCode::KeyI => letter('I'),
        KeyCode::KeyJ => letter('J'),
        KeyCode::KeyK => letter('K'),
        KeyCode::KeyL => letter('L'),
        KeyCode::KeyM => letter('M'),
        KeyCode::KeyN => letter('N'),
        KeyCode::KeyO => letter('O'),
        KeyCode::KeyP => letter('P'),
        KeyCode::KeyQ => letter('Q'),
        KeyCode::KeyR => letter('R'),
        KeyCode::KeyS => letter('S'),
        KeyCode::KeyT => letter('T'),
        KeyCode::KeyU => letter('U'),
        KeyCode::KeyV => letter('V'),
        KeyCode::KeyW => letter('W'),
        KeyCode::KeyX => letter('X'),
        KeyCode::KeyY => letter('Y'),
        KeyCode::KeyZ => letter('Z'),

        KeyCode::Digit0 => letter('0'),
        KeyCode::Digit1 => letter('1'),
        KeyCode::Digit2 => letter('2'),
        KeyCode::Digit3 => letter('3'),
        KeyCode::Digit4 => letter('4'),
        KeyCode::Digit5 => letter('5'),
        KeyCode::Digit6 => letter('6'),
        KeyCode::Digit7 => letter('7'),
        KeyCode::Digit8 => letter('8'),
        KeyCode::Digit9 => letter('9'),

        KeyCode::Backspace => Some(BACKSPACE),
        KeyCode::Tab => Some(TAB),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(ENTER),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(SHIFT),
        KeyCode::ControlLeft | KeyCode::ControlRight => Some(CONTROL),
        KeyCode::AltLeft | KeyCode::AltRight => Some(ALT),
        KeyCode::Escape => Some(ESCAPE),
        KeyCode::Space => Some(SPACE),
        KeyCode::ArrowLeft => Some(LEFT),
        KeyCode::ArrowUp => Some(UP),
        KeyCode::ArrowRight => Some(RIGHT),
        KeyCode::ArrowDown => Some(DOWN),

        KeyCode::F1 => Some(F1),
        KeyCode::F2 => Some(F1 + 1),
        KeyCode::F3 => Some(F1 + 2),
        KeyCode::F4 => Some(F1 + 3),
        KeyCode::F5 => Some(F1 + 4),
        KeyCode::F6 => Some(F1 + 5),
        KeyCode::F7 => Some(F1 + 6),
        KeyCode::F8 => Some(F1 + 7),
        KeyCode::F9 => Some(F1 + 8),
        KeyCode::F10 => Some(F1 + 9),
        KeyCode::F11 => Some(F1 + 10),
        KeyCode::F12 => Some(F1 + 11),

        _ => None,
    }
}

pub fn map_pad_button(button: Button) -> Option<i32> {
    let idx = match button {
        Button::South => 0,
        Button::East => 1,
        Button::North => 2,
        Button::West => 3,
        Button::LeftTrigger => 4,
        Button::RightTrigger => 5,
        Button::LeftTrigger2 => 6,
        Button::RightTrigger2 => 7,
        Button::Select => 8,
        Button::Start => 9,
        Button::LeftThumb => 10,
        Button::RightThumb => 11,
        Button::DPadUp => 12,
        Button::DPadDown => 13,
        Button::DPadLeft => 14,
        Button::DPadRight => 15,
        _ => return None,
    };
    Some(PAD_BASE + idx)
}
