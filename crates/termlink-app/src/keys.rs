//! Host key events to the bytes a PTY expects (xterm encoding).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// xterm modifier parameter: 1 + shift(1) + alt(2) + ctrl(4).
fn modifier_param(modifiers: KeyModifiers) -> u8 {
    let mut param = 1;
    if modifiers.contains(KeyModifiers::SHIFT) {
        param += 1;
    }
    if modifiers.contains(KeyModifiers::ALT) {
        param += 2;
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        param += 4;
    }
    param
}

/// `ESC [ <final>` or `ESC [ 1 ; <mod> <final>` for cursor-style keys.
fn csi_letter(final_byte: char, modifiers: KeyModifiers) -> Vec<u8> {
    match modifier_param(modifiers) {
        1 => format!("\x1b[{final_byte}").into_bytes(),
        m => format!("\x1b[1;{m}{final_byte}").into_bytes(),
    }
}

/// `ESC [ <n> ~` or `ESC [ <n> ; <mod> ~` for editing keys.
fn csi_tilde(n: u8, modifiers: KeyModifiers) -> Vec<u8> {
    match modifier_param(modifiers) {
        1 => format!("\x1b[{n}~").into_bytes(),
        m => format!("\x1b[{n};{m}~").into_bytes(),
    }
}

fn ctrl_char(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    match c {
        'a'..='z' => Some(c as u8 - b'a' + 1),
        '@' | ' ' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' => Some(0x1f),
        '?' | '8' => Some(0x7f),
        _ => None,
    }
}

/// Encode one key press. `None` for releases and keys with no encoding.
pub fn key_to_bytes(event: &KeyEvent) -> Option<Vec<u8>> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let mods = event.modifiers;
    let ctrl = mods.contains(KeyModifiers::CONTROL);
    let alt = mods.contains(KeyModifiers::ALT);

    let bytes = match event.code {
        KeyCode::Char(c) => {
            let base = if ctrl {
                vec![ctrl_char(c)?]
            } else {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf).as_bytes().to_vec()
            };
            if alt {
                let mut prefixed = vec![0x1b];
                prefixed.extend(base);
                prefixed
            } else {
                base
            }
        }
        KeyCode::Enter => vec![b'\r'],
        KeyCode::Tab if mods.contains(KeyModifiers::SHIFT) => b"\x1b[Z".to_vec(),
        KeyCode::Tab => vec![b'\t'],
        KeyCode::BackTab => b"\x1b[Z".to_vec(),
        KeyCode::Backspace if ctrl => vec![0x17],
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Esc => vec![0x1b],
        KeyCode::Up => csi_letter('A', mods),
        KeyCode::Down => csi_letter('B', mods),
        KeyCode::Right => csi_letter('C', mods),
        KeyCode::Left => csi_letter('D', mods),
        KeyCode::Home => csi_letter('H', mods),
        KeyCode::End => csi_letter('F', mods),
        KeyCode::Insert => csi_tilde(2, mods),
        KeyCode::Delete => csi_tilde(3, mods),
        KeyCode::PageUp => csi_tilde(5, mods),
        KeyCode::PageDown => csi_tilde(6, mods),
        KeyCode::F(n @ 1..=4) => vec![0x1b, b'O', b'P' + (n - 1)],
        KeyCode::F(n) => {
            let code = match n {
                5 => 15,
                6 => 17,
                7 => 18,
                8 => 19,
                9 => 20,
                10 => 21,
                11 => 23,
                12 => 24,
                _ => return None,
            };
            csi_tilde(code, mods)
        }
        _ => return None,
    };
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<Vec<u8>> {
        key_to_bytes(&KeyEvent::new(code, modifiers))
    }

    #[test]
    fn plain_and_unicode_chars() {
        assert_eq!(press(KeyCode::Char('a'), KeyModifiers::NONE), Some(b"a".to_vec()));
        assert_eq!(
            press(KeyCode::Char('é'), KeyModifiers::NONE),
            Some("é".as_bytes().to_vec())
        );
        // Shift is already reflected in the char
        assert_eq!(press(KeyCode::Char('A'), KeyModifiers::SHIFT), Some(b"A".to_vec()));
    }

    #[test]
    fn control_chars() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(vec![0x03]));
        assert_eq!(press(KeyCode::Char('D'), KeyModifiers::CONTROL), Some(vec![0x04]));
        assert_eq!(press(KeyCode::Char('['), KeyModifiers::CONTROL), Some(vec![0x1b]));
        assert_eq!(press(KeyCode::Char(' '), KeyModifiers::CONTROL), Some(vec![0x00]));
        assert_eq!(press(KeyCode::Char('='), KeyModifiers::CONTROL), None);
    }

    #[test]
    fn alt_prefixes_escape() {
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::ALT), Some(vec![0x1b, b'x']));
        assert_eq!(
            press(KeyCode::Char('x'), KeyModifiers::ALT | KeyModifiers::CONTROL),
            Some(vec![0x1b, 0x18])
        );
    }

    #[test]
    fn editing_keys() {
        assert_eq!(press(KeyCode::Enter, KeyModifiers::NONE), Some(b"\r".to_vec()));
        assert_eq!(press(KeyCode::Backspace, KeyModifiers::NONE), Some(vec![0x7f]));
        assert_eq!(press(KeyCode::Tab, KeyModifiers::NONE), Some(b"\t".to_vec()));
        assert_eq!(press(KeyCode::BackTab, KeyModifiers::SHIFT), Some(b"\x1b[Z".to_vec()));
        assert_eq!(press(KeyCode::Delete, KeyModifiers::NONE), Some(b"\x1b[3~".to_vec()));
    }

    #[test]
    fn cursor_keys_with_modifiers() {
        assert_eq!(press(KeyCode::Up, KeyModifiers::NONE), Some(b"\x1b[A".to_vec()));
        assert_eq!(press(KeyCode::Left, KeyModifiers::CONTROL), Some(b"\x1b[1;5D".to_vec()));
        assert_eq!(press(KeyCode::Right, KeyModifiers::SHIFT), Some(b"\x1b[1;2C".to_vec()));
        assert_eq!(press(KeyCode::PageUp, KeyModifiers::CONTROL), Some(b"\x1b[5;5~".to_vec()));
    }

    #[test]
    fn function_keys() {
        assert_eq!(press(KeyCode::F(1), KeyModifiers::NONE), Some(b"\x1bOP".to_vec()));
        assert_eq!(press(KeyCode::F(4), KeyModifiers::NONE), Some(b"\x1bOS".to_vec()));
        assert_eq!(press(KeyCode::F(5), KeyModifiers::NONE), Some(b"\x1b[15~".to_vec()));
        assert_eq!(press(KeyCode::F(12), KeyModifiers::NONE), Some(b"\x1b[24~".to_vec()));
        assert_eq!(press(KeyCode::F(13), KeyModifiers::NONE), None);
    }

    #[test]
    fn releases_are_ignored() {
        let mut event = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(key_to_bytes(&event), None);
    }
}
