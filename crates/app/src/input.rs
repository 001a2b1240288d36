//! Answer line editing.
//!
//! Owns the text buffer and cursor of the input box and turns key presses
//! into edits. A finished line is handed back on Enter for command parsing.

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Esc,
    Left,
    Right,
    Home,
    End,
    /// Ctrl+C, which raw mode delivers as a key instead of a signal.
    Interrupt,
}

/// What a key press did to the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Edited,
    Submitted(String),
    Quit,
    Unchanged,
}

/// Text buffer for the answer line. The cursor counts characters, not bytes,
/// so accented answers edit correctly.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn handle_key(&mut self, key: KeyInput) -> InputOutcome {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor = self.cursor.saturating_add(1);
                InputOutcome::Edited
            }
            KeyInput::Backspace => {
                if self.cursor == 0 {
                    return InputOutcome::Unchanged;
                }
                self.cursor = self.cursor.saturating_sub(1);
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                InputOutcome::Edited
            }
            KeyInput::Delete => {
                if self.cursor >= self.len() {
                    return InputOutcome::Unchanged;
                }
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                InputOutcome::Edited
            }
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                InputOutcome::Edited
            }
            KeyInput::Right => {
                self.cursor = self.cursor.saturating_add(1).min(self.len());
                InputOutcome::Edited
            }
            KeyInput::Home => {
                self.cursor = 0;
                InputOutcome::Edited
            }
            KeyInput::End => {
                self.cursor = self.len();
                InputOutcome::Edited
            }
            KeyInput::Enter => {
                self.cursor = 0;
                InputOutcome::Submitted(std::mem::take(&mut self.buffer))
            }
            KeyInput::Esc | KeyInput::Interrupt => InputOutcome::Quit,
        }
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(chars)
            .map_or(self.buffer.len(), |(at, _)| at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputState {
        let mut input = InputState::new();
        for c in text.chars() {
            input.handle_key(KeyInput::Char(c));
        }
        input
    }

    #[test]
    fn char_input_adds_to_buffer() {
        let input = typed("hi");
        assert_eq!(input.buffer(), "hi");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn editing_handles_multibyte_characters() {
        let mut input = typed("été");
        input.handle_key(KeyInput::Left);
        input.handle_key(KeyInput::Backspace);
        assert_eq!(input.buffer(), "ée");
        input.handle_key(KeyInput::Home);
        input.handle_key(KeyInput::Delete);
        assert_eq!(input.buffer(), "e");
        input.handle_key(KeyInput::Char('É'));
        assert_eq!(input.buffer(), "Ée");
    }

    #[test]
    fn enter_hands_back_the_line_and_clears() {
        let mut input = typed("thank you");
        assert_eq!(
            input.handle_key(KeyInput::Enter),
            InputOutcome::Submitted("thank you".into())
        );
        assert!(input.buffer().is_empty());
        assert_eq!(input.cursor(), 0);

        assert_eq!(
            input.handle_key(KeyInput::Enter),
            InputOutcome::Submitted(String::new())
        );
    }

    #[test]
    fn cursor_stays_inside_the_buffer() {
        let mut input = typed("abc");
        input.handle_key(KeyInput::Right);
        assert_eq!(input.cursor(), 3);
        input.handle_key(KeyInput::Home);
        assert_eq!(input.handle_key(KeyInput::Backspace), InputOutcome::Unchanged);
        input.handle_key(KeyInput::End);
        assert_eq!(input.handle_key(KeyInput::Delete), InputOutcome::Unchanged);
    }

    #[test]
    fn escape_and_interrupt_quit() {
        let mut input = typed("x");
        assert_eq!(input.handle_key(KeyInput::Esc), InputOutcome::Quit);
        assert_eq!(input.handle_key(KeyInput::Interrupt), InputOutcome::Quit);
        assert_eq!(input.buffer(), "x");
    }
}
