//! Screen rendering.
//!
//! Pure functions from presentation state to ratatui widgets. Nothing here
//! touches the engine or storage.

mod card;
mod input;
mod screens;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};
use ui::PracticeScreen;

use crate::input::InputState;

/// Everything one frame needs.
pub struct View<'a> {
    pub deck_name: &'a str,
    pub screen: &'a PracticeScreen,
    pub input: &'a InputState,
    pub status: Option<&'a str>,
    pub show_help: bool,
}

/// Render the whole practice screen.
pub fn render(frame: &mut Frame, view: &View<'_>) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, view, *main_area);
    input::render(frame, view.input, *input_area);
    status::render(frame, view, *status_area);
}

fn render_main_area(frame: &mut Frame, view: &View<'_>, area: Rect) {
    if view.show_help {
        screens::help(frame, area);
        return;
    }
    match view.screen {
        PracticeScreen::Start(vm) => screens::start(frame, vm, area),
        PracticeScreen::Loading => card::loading(frame, area),
        PracticeScreen::Active(vm) => card::active(frame, vm, area),
        PracticeScreen::RoundSummary(vm) => screens::round_summary(frame, vm, area),
        PracticeScreen::Completion(vm) => screens::completion(frame, vm, area),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use ratatui::{Terminal, backend::TestBackend};

    use super::{View, render};

    pub const WIDTH: u16 = 64;
    pub const HEIGHT: u16 = 18;

    /// Draw one frame and return its rows as text.
    pub fn draw(view: &View<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
        terminal.draw(|frame| render(frame, view)).unwrap();

        let buffer = terminal.backend().buffer();
        let symbols: Vec<&str> = buffer.content.iter().map(|cell| cell.symbol()).collect();
        symbols
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.concat().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use ui::vm::StartScreenVm;

    use super::testing::draw;
    use super::*;

    fn start_screen() -> PracticeScreen {
        PracticeScreen::Start(StartScreenVm {
            deck_name: "French Basics".into(),
            card_count_label: "2 cards ready to practice".into(),
            hint: None,
            can_start: true,
        })
    }

    #[test]
    fn layout_has_main_input_and_status_rows() {
        let screen = start_screen();
        let input = InputState::new();
        let out = draw(&View {
            deck_name: "French Basics",
            screen: &screen,
            input: &input,
            status: None,
            show_help: false,
        });

        let rows: Vec<&str> = out.lines().collect();
        assert!(rows[0].contains("French Basics"));
        assert!(rows[rows.len() - 2].starts_with('└'));
        assert!(rows[rows.len() - 3].starts_with("│>"));
        assert!(rows[rows.len() - 1].contains("French Basics"));
    }

    #[test]
    fn help_replaces_the_main_area() {
        let screen = start_screen();
        let input = InputState::new();
        let out = draw(&View {
            deck_name: "French Basics",
            screen: &screen,
            input: &input,
            status: None,
            show_help: true,
        });

        assert!(out.contains(":retry"));
        assert!(!out.contains("2 cards ready to practice"));
    }
}
