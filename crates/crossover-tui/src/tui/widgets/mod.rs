// TUI widget modules for each dashboard panel.

pub mod model;
pub mod quit_confirm;
pub mod report;
pub mod selector;
pub mod status_bar;
