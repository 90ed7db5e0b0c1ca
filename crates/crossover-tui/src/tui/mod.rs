// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the selector positions and the latest
// comparison. The app orchestrator pushes `UiUpdate` messages over an mpsc
// channel; the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use chrono::NaiveDate;
use crossover_baseball::dataset::Selection;
use crossover_baseball::report::ComparisonReport;
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::{Catalog, UiUpdate, UserCommand};

use layout::{build_layout, AppLayout};

// ---------------------------------------------------------------------------
// Focus and phase
// ---------------------------------------------------------------------------

/// Which control receives Up/Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    PitcherA,
    DateA,
    PitcherB,
    DateB,
    Compare,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::PitcherA,
        Focus::DateA,
        Focus::PitcherB,
        Focus::DateB,
        Focus::Compare,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Focus {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Focus {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// One side of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

/// Where the comparison flow stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    AwaitingSelection,
    /// Compare sent; waiting for the orchestrator.
    Computing,
    ResultDisplayed(Box<ComparisonReport>),
    Failed(String),
}

/// Selector indices for one side: pitcher index and date index within it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectorState {
    pub pitcher: usize,
    pub date: usize,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator
/// and by key handling in `input`.
pub struct ViewState {
    /// Pitchers, dates and model summary; `None` until the orchestrator sends it.
    pub catalog: Option<Catalog>,
    pub a: SelectorState,
    pub b: SelectorState,
    pub focus: Focus,
    pub phase: Phase,
    /// One-line hint shown in the status bar (e.g. incomplete selection).
    pub notice: Option<String>,
    /// Whether the quit confirmation dialog is shown.
    pub confirm_quit: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            catalog: None,
            a: SelectorState::default(),
            b: SelectorState::default(),
            focus: Focus::PitcherA,
            phase: Phase::AwaitingSelection,
            notice: None,
            confirm_quit: false,
        }
    }
}

impl ViewState {
    pub fn slot(&self, slot: Slot) -> SelectorState {
        match slot {
            Slot::A => self.a,
            Slot::B => self.b,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut SelectorState {
        match slot {
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
        }
    }

    pub fn pitcher_name(&self, slot: Slot) -> Option<&str> {
        let catalog = self.catalog.as_ref()?;
        catalog
            .pitchers
            .get(self.slot(slot).pitcher)
            .map(|p| p.name.as_str())
    }

    pub fn dates(&self, slot: Slot) -> &[NaiveDate] {
        self.catalog
            .as_ref()
            .and_then(|c| c.pitchers.get(self.slot(slot).pitcher))
            .map(|p| p.dates.as_slice())
            .unwrap_or(&[])
    }

    pub fn date(&self, slot: Slot) -> Option<NaiveDate> {
        self.dates(slot).get(self.slot(slot).date).copied()
    }

    /// The selected pitcher/date, or `None` while incomplete.
    pub fn selection(&self, slot: Slot) -> Option<Selection> {
        Some(Selection::new(self.pitcher_name(slot)?, self.date(slot)?))
    }

    fn pitcher_count(&self) -> usize {
        self.catalog.as_ref().map(|c| c.pitchers.len()).unwrap_or(0)
    }

    /// Step the pitcher selector; the date resets to the first appearance.
    pub fn step_pitcher(&mut self, slot: Slot, delta: isize) {
        let count = self.pitcher_count();
        let sel = self.slot_mut(slot);
        let next = step_index(sel.pitcher, delta, count);
        if next != sel.pitcher {
            sel.pitcher = next;
            sel.date = 0;
            self.selection_changed();
        }
    }

    pub fn step_date(&mut self, slot: Slot, delta: isize) {
        let count = self.dates(slot).len();
        let sel = self.slot_mut(slot);
        let next = step_index(sel.date, delta, count);
        if next != sel.date {
            sel.date = next;
            self.selection_changed();
        }
    }

    /// Any selection change drops the previous result.
    fn selection_changed(&mut self) {
        self.phase = Phase::AwaitingSelection;
        self.notice = None;
    }

    fn selection_matches(&self, a: &Selection, b: &Selection) -> bool {
        self.selection(Slot::A).as_ref() == Some(a) && self.selection(Slot::B).as_ref() == Some(b)
    }
}

/// Move `index` by `delta` within `0..count`, clamping at both ends.
fn step_index(index: usize, delta: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let max = (count - 1) as isize;
    (index as isize + delta).clamp(0, max) as usize
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
///
/// Results for a selection that has since changed are dropped.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Catalog(catalog) => {
            state.catalog = Some(*catalog);
            state.a = SelectorState::default();
            // Default B to the second pitcher when there is one.
            state.b = SelectorState {
                pitcher: usize::from(state.pitcher_count() > 1),
                date: 0,
            };
            state.phase = Phase::AwaitingSelection;
        }
        UiUpdate::ComparisonReady(report) => {
            let a = Selection::new(report.a.record.pitcher.clone(), report.a.record.date);
            let b = Selection::new(report.b.record.pitcher.clone(), report.b.record.date);
            if state.selection_matches(&a, &b) {
                state.phase = Phase::ResultDisplayed(report);
            } else {
                debug!("dropping stale comparison result");
            }
        }
        UiUpdate::ComparisonFailed { a, b, message } => {
            if state.selection_matches(&a, &b) {
                state.phase = Phase::Failed(message);
            } else {
                debug!("dropping stale comparison failure");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::selector::render(frame, &layout, state);
    widgets::report::render(frame, layout.report, state);
    widgets::model::render(frame, layout.model, state);
    render_help_bar(frame, &layout);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout) {
    let text = " q:Quit | Tab/←→:Focus | ↑↓/jk:Select | Enter/c:Compare";
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Set panic hook to restore terminal on crash.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    // 3. Render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    // 4. Restore terminal
    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
