//! Status bar: deck name plus the latest notice or the key hints.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::View;

const KEY_HINTS: &str = "Enter submit | :help commands | Esc quit";

pub fn render(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let notice = match view.status {
        Some(message) => Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled(KEY_HINTS, Style::default().fg(Color::Gray)),
    };

    let status_line = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            view.deck_name.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        notice,
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use ui::PracticeScreen;

    use super::super::testing::draw;
    use super::*;
    use crate::input::InputState;

    fn status_row(status: Option<&str>) -> String {
        let input = InputState::new();
        let out = draw(&View {
            deck_name: "Spanish",
            screen: &PracticeScreen::Loading,
            input: &input,
            status,
            show_help: false,
        });
        out.lines().last().unwrap_or_default().to_string()
    }

    #[test]
    fn hints_show_when_nothing_happened() {
        assert_eq!(status_row(None), format!(" Spanish | {KEY_HINTS}"));
    }

    #[test]
    fn notices_replace_the_hints() {
        let row = status_row(Some("No card to delete."));
        assert_eq!(row, " Spanish | No card to delete.");
    }
}
