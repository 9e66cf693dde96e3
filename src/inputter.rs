use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single line editor used by the search prompt. Cursor positions count chars.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    cursor: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub cursor: usize,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.finished = true,
            (KeyCode::Esc, _) => {
                self.clear();
                self.canceled = true;
                self.finished = true;
            }
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor = (self.cursor + 1).min(self.len()),
            (KeyCode::Home, _) => self.cursor = 0,
            (KeyCode::End, _) => self.cursor = self.len(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear(),
            (code, modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(chr) = code.as_char() {
                    let at = self.byte_pos(self.cursor);
                    self.current_input.insert(at, chr);
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        trace!("Input \"{}\" cursor {}", self.current_input, self.cursor);
        self.get()
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.cursor = self.len();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            finished: self.finished,
            canceled: self.canceled,
            cursor: self.cursor,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.cursor = 0;
    }

    fn len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_pos(self.cursor);
            self.current_input.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_pos(self.cursor);
            self.current_input.remove(at);
        }
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.current_input
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut Inputter, s: &str) {
        for c in s.chars() {
            input.read(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn edits_in_the_middle() {
        let mut input = Inputter::default();
        type_str(&mut input, "fnance");
        for _ in 0..5 {
            input.read(key(KeyCode::Left));
        }
        input.read(key(KeyCode::Char('i')));
        let res = input.read(key(KeyCode::Enter));
        assert_eq!(res.input, "finance");
        assert!(res.finished);
        assert!(!res.canceled);
    }

    #[test]
    fn backspace_removes_char_before_cursor() {
        let mut input = Inputter::default();
        type_str(&mut input, "zürich");
        for _ in 0..4 {
            input.read(key(KeyCode::Left));
        }
        input.read(key(KeyCode::Backspace));
        assert_eq!(input.get().input, "zrich");
        assert_eq!(input.get().cursor, 1);
    }

    #[test]
    fn escape_cancels() {
        let mut input = Inputter::default();
        type_str(&mut input, "abc");
        let res = input.read(key(KeyCode::Esc));
        assert!(res.canceled && res.finished);
        assert!(res.input.is_empty());
    }
}
