use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use crate::domain::{AppConfig, DeskError, Message};

/// Turns terminal events into `Message`s for the model.
pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    /// `raw` forwards every key press untranslated, used while an input line is active.
    pub fn handle_event(&self, raw: bool) -> Result<Option<Message>, DeskError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    if raw {
                        Ok(Some(Message::RawKey(key)))
                    } else {
                        Ok(self.handle_key(key))
                    }
                }
                Event::Resize(width, height) => {
                    Ok(Some(Message::Resize(width as usize, height as usize)))
                }
                _ => Ok(None),
            };
        }
        Ok(None)
    }

    pub fn handle_key(&self, key: KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('j') | KeyCode::Down, _) => Some(Message::MoveDown),
            (KeyCode::Char('k') | KeyCode::Up, _) => Some(Message::MoveUp),
            (KeyCode::Char('h') | KeyCode::Left, _) => Some(Message::MoveLeft),
            (KeyCode::Char('l') | KeyCode::Right, _) => Some(Message::MoveRight),
            (KeyCode::Char('n') | KeyCode::PageDown, _) => Some(Message::NextPage),
            (KeyCode::Char('p') | KeyCode::PageUp, _) => Some(Message::PrevPage),
            (KeyCode::Char('g') | KeyCode::Home, _) => Some(Message::FirstPage),
            (KeyCode::Char('G') | KeyCode::End, _) => Some(Message::LastPage),
            (KeyCode::Char('+'), _) => Some(Message::GrowPage),
            (KeyCode::Char('-'), _) => Some(Message::ShrinkPage),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('s'), _) => Some(Message::Sort),
            (KeyCode::Char(' '), _) => Some(Message::ToggleSelect),
            (KeyCode::Char('a'), _) => Some(Message::SelectPage),
            (KeyCode::Char('A'), _) => Some(Message::ClearSelection),
            (KeyCode::Char('d'), _) => Some(Message::Delete),
            (KeyCode::Char('c'), _) => Some(Message::Copy),
            (KeyCode::Char('x'), _) => Some(Message::ClearFilters),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<Message> {
        Controller::new(&AppConfig::default()).handle_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn maps_keys() {
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::NONE), Some(Message::Quit));
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(Message::Quit));
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::NONE), Some(Message::Copy));
        assert_eq!(press(KeyCode::Char('G'), KeyModifiers::SHIFT), Some(Message::LastPage));
        assert_eq!(press(KeyCode::PageDown, KeyModifiers::NONE), Some(Message::NextPage));
        assert_eq!(press(KeyCode::Char('z'), KeyModifiers::NONE), None);
    }
}
