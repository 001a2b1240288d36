//! Lines typed at the practice prompt.

use std::fmt;

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Empty line: start, continue, or skip the feedback delay depending on
    /// the screen.
    Blank,
    /// Anything that is not a command. Submitted as an answer.
    Text(String),
    Retry,
    Skip,
    End,
    Delete,
    Restart,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command :{} (try :help)", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

impl Entry {
    /// Commands start with `:`. Answers keep their inner whitespace; grading
    /// normalizes them later.
    pub fn parse(line: &str) -> Result<Self, UnknownCommand> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Self::Blank);
        }
        let Some(name) = trimmed.strip_prefix(':') else {
            return Ok(Self::Text(line.trim_end_matches(['\r', '\n']).to_string()));
        };

        match name.trim().to_ascii_lowercase().as_str() {
            "r" | "retry" => Ok(Self::Retry),
            "s" | "skip" => Ok(Self::Skip),
            "e" | "end" => Ok(Self::End),
            "d" | "delete" => Ok(Self::Delete),
            "restart" => Ok(Self::Restart),
            "h" | "help" => Ok(Self::Help),
            "q" | "quit" => Ok(Self::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

pub const HELP: &str = "\
Type an answer and press Enter.
  (empty line)  start, continue, or skip the feedback pause
  :retry        try a wrong card again
  :skip         move on from a wrong card
  :end          end the session and show results
  :delete       delete the current card
  :restart      start the deck over
  :help         show or hide this help
  :quit, Esc    leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_lines_are_blank() {
        assert_eq!(Entry::parse(""), Ok(Entry::Blank));
        assert_eq!(Entry::parse("   \t"), Ok(Entry::Blank));
    }

    #[test]
    fn answers_are_passed_through() {
        assert_eq!(
            Entry::parse("  thank you\n"),
            Ok(Entry::Text("  thank you".into()))
        );
    }

    #[test]
    fn commands_have_short_forms() {
        assert_eq!(Entry::parse(":r"), Ok(Entry::Retry));
        assert_eq!(Entry::parse(" :SKIP "), Ok(Entry::Skip));
        assert_eq!(Entry::parse(":quit"), Ok(Entry::Quit));
        assert_eq!(
            Entry::parse(":fly"),
            Err(UnknownCommand("fly".into()))
        );
    }
}
