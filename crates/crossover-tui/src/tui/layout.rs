// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the comparison dashboard:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +----------------------+-----------------------+---+
// | Appearance A (45%)   | Appearance B (45%)    |Go |
// +----------------------+-----------------------+---+
// | Report (65%)             | Model (35%)            |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: data source, observation count, notices.
    pub status_bar: Rect,
    /// Pitcher and date selectors for appearance A.
    pub selector_a: Rect,
    /// Pitcher and date selectors for appearance B.
    pub selector_b: Rect,
    /// Compare button.
    pub compare: Rect,
    /// Left side of the middle section: the comparison result.
    pub report: Rect,
    /// Right side of the middle section: fitted model summary.
    pub model: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | selectors(3) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // selectors
            Constraint::Min(8),    // report + model
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let selectors = vertical[1];
    let middle = vertical[2];
    let help_bar = vertical[3];

    // Selectors: A (45%) | B (45%) | compare (10%)
    let selector_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(45),
            Constraint::Percentage(10),
        ])
        .split(selectors);

    // Middle: report (65%) | model (35%)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(middle);

    AppLayout {
        status_bar,
        selector_a: selector_row[0],
        selector_b: selector_row[1],
        compare: selector_row[2],
        report: horizontal[0],
        model: horizontal[1],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
