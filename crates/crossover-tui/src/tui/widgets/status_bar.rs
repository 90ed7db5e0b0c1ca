// Status bar widget: data source, appearance count, comparison phase.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{Phase, ViewState};

/// Render the status bar into the given area.
///
/// Layout: [load indicator] [source] | [appearances] | [phase] [notice]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let (dot, dot_color) = load_indicator(state.catalog.is_some());
    spans.push(Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)));

    match &state.catalog {
        Some(catalog) => {
            spans.push(Span::styled(
                catalog.source.clone(),
                Style::default().fg(Color::White),
            ));
            spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                format!(
                    "{} appearances, {} pitchers",
                    catalog.observation_count,
                    catalog.pitchers.len()
                ),
                Style::default().fg(Color::White),
            ));
        }
        None => spans.push(Span::styled("Loading...", Style::default().fg(Color::Gray))),
    }

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    let (label, color) = phase_label(&state.phase);
    spans.push(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));

    if let Some(notice) = &state.notice {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Dot character and color for the dataset load state.
pub fn load_indicator(loaded: bool) -> (&'static str, Color) {
    if loaded {
        ("●", Color::Green)
    } else {
        ("●", Color::Yellow)
    }
}

/// Short label and color for the comparison phase.
pub fn phase_label(phase: &Phase) -> (&'static str, Color) {
    match phase {
        Phase::AwaitingSelection => ("Select two appearances", Color::Gray),
        Phase::Computing => ("Computing...", Color::Cyan),
        Phase::ResultDisplayed(_) => ("Result", Color::Green),
        Phase::Failed(_) => ("Failed", Color::Red),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
