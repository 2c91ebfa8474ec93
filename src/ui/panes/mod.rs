//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: program text with the current line, breakpoints and folds
//! - [`variables`]: the current frame's description and frozen variables
//! - [`scenarios`]: scenario results and task progress
//! - [`terminal`]: output logged up to the current time
//! - [`status`]: status bar with keybindings and playback state
//! - `utils`: value highlighting and border styles
//!
//! Each pane module exports a `render_*` function plus the data and scroll
//! state types it takes.

mod utils;

pub mod scenarios;
pub mod source;
pub mod status;
pub mod terminal;
pub mod variables;

pub use scenarios::{render_scenarios_pane, ScenariosRenderData};
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use terminal::render_terminal_pane;
pub use variables::{render_variables_pane, VariablesRenderData, VariablesScrollState};
