//! Single-line form field with cursor editing and inline validation.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One labeled text field.
#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    /// Cursor position in chars.
    pub cursor: usize,
    /// Render as dots (password entry).
    pub masked: bool,
    /// Inline validation error, shown under the field until it revalidates.
    pub error: Option<&'static str>,
}

impl Field {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            cursor: 0,
            masked: false,
            error: None,
        }
    }

    pub fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }

    /// The string to draw: dots for masked fields.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
        self.error = None;
    }

    /// Applies an editing key; returns false for keys this field ignores.
    ///
    /// Any edit clears the inline error so the user isn't shouting at a
    /// stale message while fixing the value.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let handled = match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.chars().count() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.chars().count();
                true
            }
            _ => false,
        };
        if handled {
            self.error = None;
        }
        handled
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(field: &mut Field, code: KeyCode) {
        field.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(field: &mut Field, s: &str) {
        for c in s.chars() {
            press(field, KeyCode::Char(c));
        }
    }

    #[test]
    fn inserts_at_cursor() {
        let mut field = Field::new("Email");
        type_str(&mut field, "ac");
        press(&mut field, KeyCode::Left);
        press(&mut field, KeyCode::Char('b'));
        assert_eq!(field.value, "abc");
        assert_eq!(field.cursor, 2);
    }

    #[test]
    fn backspace_and_delete() {
        let mut field = Field::new("Email");
        type_str(&mut field, "abc");
        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.value, "ab");
        press(&mut field, KeyCode::Home);
        press(&mut field, KeyCode::Delete);
        assert_eq!(field.value, "b");
    }

    #[test]
    fn editing_clears_inline_error() {
        let mut field = Field::new("Email");
        field.error = Some("Email is required");
        press(&mut field, KeyCode::Char('a'));
        assert_eq!(field.error, None);
    }

    #[test]
    fn masked_display_hides_value() {
        let mut field = Field::masked("Password");
        type_str(&mut field, "secret1");
        assert_eq!(field.display(), "•••••••");
        assert_eq!(field.value, "secret1");
    }

    #[test]
    fn multibyte_values_edit_by_char() {
        let mut field = Field::new("Title");
        type_str(&mut field, "café");
        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.value, "caf");
    }
}
