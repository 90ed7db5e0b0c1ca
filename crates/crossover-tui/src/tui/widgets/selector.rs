// Selector widgets: pitcher and date pickers for both appearances, plus the
// compare button.
//
// Each side shows "◀ name ▶" and "◀ date ▶"; the focused control is
// highlighted and Up/Down steps it.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::layout::AppLayout;
use crate::tui::{Focus, Slot, ViewState};

/// Render both selectors and the compare button.
pub fn render(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    render_side(frame, layout.selector_a, state, Slot::A);
    render_side(frame, layout.selector_b, state, Slot::B);
    render_compare(frame, layout.compare, state.focus == Focus::Compare);
}

fn render_side(frame: &mut Frame, area: Rect, state: &ViewState, slot: Slot) {
    let (title, pitcher_focus, date_focus) = match slot {
        Slot::A => (" Appearance A ", Focus::PitcherA, Focus::DateA),
        Slot::B => (" Appearance B ", Focus::PitcherB, Focus::DateB),
    };
    let focused = state.focus == pitcher_focus || state.focus == date_focus;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);

    let pitcher = state.pitcher_name(slot).unwrap_or("-").to_string();
    let date = state
        .date(slot)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    frame.render_widget(
        Paragraph::new(picker_line(pitcher, state.focus == pitcher_focus)),
        halves[0],
    );
    frame.render_widget(
        Paragraph::new(picker_line(date, state.focus == date_focus)),
        halves[1],
    );
}

fn render_compare(frame: &mut Frame, area: Rect, focused: bool) {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let paragraph = Paragraph::new(Span::styled("Compare", style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused)),
        );
    frame.render_widget(paragraph, area);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// "◀ value ▶", highlighted when focused.
pub fn picker_line(value: String, focused: bool) -> Line<'static> {
    let arrow = Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray });
    let value_style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled("◀ ", arrow),
        Span::styled(value, value_style),
        Span::styled(" ▶", arrow),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
