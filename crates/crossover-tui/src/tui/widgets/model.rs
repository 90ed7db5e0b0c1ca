// Model panel: the fitted WHIP regression shared by every comparison.

use crossover_baseball::report::model_lines;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::protocol::Catalog;
use crate::tui::ViewState;

/// Render the model summary into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines = match &state.catalog {
        Some(catalog) => build_lines(catalog),
        None => vec![Line::from(Span::styled(
            " Loading...",
            Style::default().fg(Color::Gray),
        ))],
    };
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("WHIP Model"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn build_lines(catalog: &Catalog) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = model_lines(&catalog.model)
        .into_iter()
        .map(|l| Line::from(Span::styled(format!(" {l}"), Style::default().fg(Color::White))))
        .collect();
    lines.push(Line::from(Span::styled(
        format!(" Fit over {} appearances", catalog.observation_count),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
