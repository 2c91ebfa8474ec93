//! # Introduction
//!
//! steptrace runs small programs written in JikiScript or a subset of
//! JavaScript and records a [`runtime::Frame`] for every executed step.  The
//! resulting trace is scrubbed forward and backward by time, with
//! breakpoints and folded lines, through a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Executor → Frames → Orchestrator → TUI
//! ```
//!
//! 1. [`jikiscript`] and [`javascript`]: one lexer, parser and executor per
//!    language, sharing [`syntax`] locations.
//! 2. [`runtime`]: values, the execution clock, frames with frozen variable
//!    snapshots, error kinds, and the external function bridge.
//! 3. [`interpreter`]: the language-dispatching entry points `interpret`
//!    and `evaluate_function`.
//! 4. [`exercise`]: exercises, scenarios, code checks and task progress.
//! 5. [`timeline`]: frame lookup, fold-aware stepping, breakpoints and the
//!    animation clock.
//! 6. [`orchestrator`]: the run/playback state machine driving the UI.
//! 7. [`config`]: `steptrace.toml` settings.
//! 8. [`ui`]: ratatui-based TUI; not part of the stable library API.

pub mod config;
pub mod exercise;
pub mod interpreter;
pub mod javascript;
pub mod jikiscript;
pub mod orchestrator;
pub mod runtime;
pub mod syntax;
pub mod timeline;
pub mod ui;
