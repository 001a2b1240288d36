//! The card being practiced.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use ui::vm::{ActiveCardVm, StageVm};

pub fn loading(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("Loading card...")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

pub fn active(frame: &mut Frame, vm: &ActiveCardVm, area: Rect) {
    let title = format!(" {} · {} ", vm.phase_label, vm.progress_label);
    let block = Block::default().borders(Borders::ALL).title(title);

    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            vm.prompt.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::default(),
    ];
    lines.extend(stage_lines(vm));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(paragraph, area);
}

fn stage_lines(vm: &ActiveCardVm) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    match &vm.stage {
        StageVm::Answering { retrying: false } => {
            vec![Line::styled("Type your answer and press Enter.", dim)]
        }
        StageVm::Answering { retrying: true } => vec![Line::styled(
            "Try again.",
            Style::default().fg(Color::Yellow),
        )],
        StageVm::RetryOffered { submitted } => {
            let mut lines = reveal(vm, submitted);
            lines.push(Line::default());
            lines.push(Line::styled(":retry to try again, :skip to move on", dim));
            lines
        }
        StageVm::Feedback {
            was_correct,
            submitted,
            ..
        } => {
            let mut lines = if *was_correct {
                vec![Line::styled(
                    "Correct!",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )]
            } else {
                reveal(vm, submitted)
            };
            lines.push(Line::default());
            if let Some(label) = vm.stage.advance_label() {
                lines.push(Line::styled(label, dim));
            }
            lines.push(Line::styled("Press Enter to continue now.", dim));
            lines
        }
    }
}

fn reveal(vm: &ActiveCardVm, submitted: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled("Incorrect: ", Style::default().fg(Color::Red)),
            Span::raw(submitted.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Answer:    ", Style::default().fg(Color::Green)),
            Span::raw(vm.correct_answer.clone()),
        ]),
    ]
}
