//! # Focustimer Core Library
//!
//! Core business logic for the focustimer focus/break timer. All
//! operations are available through this library; the CLI binary is a
//! thin layer over it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()`; elapsed time is pure
//!   timestamp arithmetic, never tick counting
//! - **Storage**: SQLite-backed sessions, categories, and settings,
//!   plus TOML-based host configuration
//! - **Platform**: injected capabilities for screen-wake suppression
//!   and desktop notifications
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: the timer state machine
//! - [`Database`]: session, category, settings, and statistics persistence
//! - [`Event`]: notifications fanned out to presentation and side-effect
//!   collaborators

pub mod error;
pub mod events;
pub mod platform;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use storage::{Category, Config, Database, SessionRecord, SessionStatus, SessionStore, Settings};
pub use timer::{Clock, Phase, SystemClock, TimerContext, TimerEngine};
