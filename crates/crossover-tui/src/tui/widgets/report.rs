// Report panel: the comparison result for the current selection.
//
// Shows a prompt until Compare is pressed, then the crossover headline,
// current fatigue, recommendation and both sides' derived indices.

use crossover_baseball::report::ComparisonReport;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::{Phase, ViewState};

/// Render the report panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(build_lines(&state.phase))
        .block(Block::default().borders(Borders::ALL).title("Crossover"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn build_lines(phase: &Phase) -> Vec<Line<'static>> {
    match phase {
        Phase::AwaitingSelection => vec![Line::from(Span::styled(
            " Choose two appearances and press c to compare.",
            Style::default().fg(Color::Gray),
        ))],
        Phase::Computing => vec![Line::from(Span::styled(
            " Computing...",
            Style::default().fg(Color::Cyan),
        ))],
        Phase::Failed(message) => vec![
            Line::from(Span::styled(
                " Comparison failed",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(Color::Red),
            )),
        ],
        Phase::ResultDisplayed(report) => result_lines(report),
    }
}

/// Lines for a finished comparison.
pub fn result_lines(report: &ComparisonReport) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!(" {}", report.headline()),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))];

    if report.recommendation().is_some() {
        lines.push(Line::from(Span::styled(
            format!(" {}", report.fatigue_line()),
            Style::default().fg(Color::White),
        )));
    }
    if let Some(recommendation) = report.recommendation() {
        lines.push(Line::from(Span::styled(
            format!(" {recommendation}"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Derived indices",
        Style::default().fg(Color::Gray),
    )));
    for index_line in report.index_lines() {
        lines.push(Line::from(Span::styled(
            format!(" {index_line}"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::test_report;
    use crossover_baseball::crossover::Verdict;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn awaiting_shows_prompt() {
        let lines = text(&build_lines(&Phase::AwaitingSelection));
        assert!(lines[0].contains("press c to compare"));
    }

    #[test]
    fn failed_shows_message() {
        let lines = text(&build_lines(&Phase::Failed("crossover undefined".into())));
        assert_eq!(lines[1], " crossover undefined");
    }

    #[test]
    fn result_lists_headline_fatigue_and_recommendation() {
        let report = test_report(("Kim", 2), ("Lee", 3));
        let lines = text(&result_lines(&report));
        assert!(lines[0].starts_with(" Crossover at fatigue 44.0:"));
        assert_eq!(lines[1], " Current fatigue: Kim 31.0, Lee 45.0");
        assert_eq!(lines[2], " Kim (2024-04-02) is more efficient to use now.");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn unreachable_result_has_no_recommendation() {
        let mut report = test_report(("Kim", 2), ("Lee", 3));
        report.comparison.verdict = Verdict::Unreachable;
        let lines = text(&result_lines(&report));
        assert!(lines[0].contains("never degrades"));
        assert!(!lines.iter().any(|l| l.contains("more efficient")));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(60, 12);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.phase = Phase::ResultDisplayed(Box::new(test_report(("Kim", 2), ("Lee", 3))));
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
