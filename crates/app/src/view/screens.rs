//! Screens around the card: start, round summary, completion and help.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use ui::vm::{CompletionVm, RoundSummaryVm, StartScreenVm, StatsVm};

use crate::command::HELP;

fn heading(text: impl Into<String>) -> Line<'static> {
    Line::styled(
        text.into(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
}

fn centered(lines: Vec<Line<'static>>, title: &str) -> Paragraph<'static> {
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(format!(" {title} ")))
}

pub fn start(frame: &mut Frame, vm: &StartScreenVm, area: Rect) {
    let mut lines = vec![
        Line::default(),
        heading(vm.deck_name.clone()),
        Line::raw(vm.card_count_label.clone()),
    ];
    if let Some(hint) = &vm.hint {
        lines.push(Line::default());
        lines.push(Line::styled(hint.clone(), Style::default().fg(Color::Yellow)));
    }
    if vm.can_start {
        lines.push(Line::default());
        lines.push(Line::raw("Press Enter to start."));
    }
    frame.render_widget(centered(lines, &vm.deck_name), area);
}

fn stats_lines(stats: &StatsVm) -> Vec<Line<'static>> {
    vec![
        Line::raw(format!("Accuracy {}", stats.accuracy_label)),
        Line::from(vec![
            Span::styled(
                format!("{} correct", stats.correct),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} wrong", stats.wrong),
                Style::default().fg(Color::Red),
            ),
        ]),
    ]
}

pub fn round_summary(frame: &mut Frame, vm: &RoundSummaryVm, area: Rect) {
    let mut lines = vec![Line::default(), heading("Round complete")];
    lines.extend(stats_lines(&vm.stats));
    lines.push(Line::raw(vm.missed_label.clone()));
    lines.push(Line::default());
    lines.push(Line::raw(format!("Press Enter: {}", vm.continue_label)));
    frame.render_widget(centered(lines, "Summary"), area);
}

pub fn completion(frame: &mut Frame, vm: &CompletionVm, area: Rect) {
    let mut lines = vec![Line::default(), heading("Session complete")];
    lines.extend(stats_lines(&vm.stats));
    lines.push(Line::raw(vm.encouragement));
    lines.push(Line::default());
    lines.push(Line::styled(
        ":restart to practice again, Esc to leave",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(centered(lines, "Done"), area);
}

pub fn help(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line<'static>> = HELP.lines().map(Line::raw).collect();
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help (:help to close) "),
    );
    frame.render_widget(paragraph, area);
}
