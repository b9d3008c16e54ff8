//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically. Remaining time is always recomputed from timestamps, so
//! missed or delayed ticks cause display lag, never drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Focus -> Break -> (Focus | Idle)
//!            \       \
//!             Paused  Paused
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(db);
//! let events = engine.start_focus(25, 5, None)?;
//! // In a loop:
//! let events = engine.tick()?; // completion transitions happen here
//! ```

use crate::error::CoreError;
use crate::events::Event;
use crate::storage::{SessionRecord, SessionStatus, SessionStore};

use super::context::{Clock, Phase, SystemClock, TimerContext};

/// Core timer engine.
///
/// Owns the [`TimerContext`] exclusively; collaborators only ever see
/// snapshots carried by events. Commands issued in a guard-violating
/// state are silent no-ops returning an empty event list - UI layers
/// send duplicate or late commands and the engine absorbs them.
///
/// The only errors surfaced are failures of the [`SessionStore`]
/// collaborator. When a save fails mid-transition the engine still
/// finishes the transition (so a host never observes a stuck context)
/// and then propagates the error; the caller resynchronizes from
/// [`TimerEngine::context`].
pub struct TimerEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    ctx: TimerContext,
}

impl<S: SessionStore> TimerEngine<S, SystemClock> {
    /// Create an idle engine backed by the given store.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }

    /// Rehydrate an engine from a previously parked context.
    ///
    /// The wall-clock timestamps inside the context make this lossless:
    /// a Focus phase parked by one process invocation keeps elapsing
    /// until the next invocation ticks it.
    pub fn with_context(store: S, ctx: TimerContext) -> Self {
        Self {
            store,
            clock: SystemClock,
            ctx,
        }
    }
}

impl<S: SessionStore, C: Clock> TimerEngine<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            ctx: TimerContext::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn context(&self) -> &TimerContext {
        &self.ctx
    }

    pub fn phase(&self) -> Phase {
        self.ctx.phase
    }

    pub fn is_idle(&self) -> bool {
        self.ctx.phase == Phase::Idle
    }

    /// Actively counting down (not paused, not idle).
    pub fn is_running(&self) -> bool {
        self.ctx.phase.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.ctx.phase == Phase::Paused
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new focus session.
    ///
    /// A session already active or paused is first stopped and persisted
    /// as interrupted - never silently discarded.
    pub fn start_focus(
        &mut self,
        focus_minutes: u32,
        break_minutes: u32,
        category_id: Option<i64>,
    ) -> Result<Vec<Event>, CoreError> {
        let mut events = Vec::new();
        if self.ctx.phase != Phase::Idle {
            self.stop_and_save(true, &mut events)?;
        }
        self.ctx.focus_minutes = focus_minutes.max(1);
        self.ctx.break_minutes = break_minutes.max(1);
        self.ctx.category_id = category_id;
        self.begin_phase(Phase::Focus, &mut events);
        Ok(events)
    }

    /// Transition into the break phase.
    ///
    /// When invoked from Focus this persists the focus session as
    /// completed. Break duration comes from the context's
    /// `break_minutes`.
    pub fn start_break(&mut self) -> Result<Vec<Event>, CoreError> {
        let mut events = Vec::new();
        let effective = match self.ctx.phase {
            Phase::Paused => self.ctx.paused_from.unwrap_or(Phase::Idle),
            phase => phase,
        };
        let save = if effective == Phase::Focus {
            let record = self.build_record(SessionStatus::Completed, false);
            self.persist_record(record, &mut events)
        } else {
            Ok(())
        };
        self.begin_phase(Phase::Break, &mut events);
        save?;
        Ok(events)
    }

    /// Pause the running phase. No-op unless Focus or Break.
    pub fn pause(&mut self) -> Result<Vec<Event>, CoreError> {
        if !self.ctx.phase.is_active() {
            return Ok(Vec::new());
        }
        let old = self.ctx.phase;
        let now = self.clock.now();
        // Freeze an up-to-date remaining, not the last tick's.
        let elapsed = now - self.ctx.session_start_ts - self.ctx.total_paused_seconds;
        self.ctx.remaining_seconds =
            (self.ctx.total_seconds - elapsed).clamp(0, self.ctx.total_seconds);
        self.ctx.paused_from = Some(old);
        self.ctx.phase = Phase::Paused;
        self.ctx.pause_start_ts = now;
        Ok(vec![
            Event::phase_changed(old, Phase::Paused),
            self.tick_event(),
        ])
    }

    /// Resume the phase suspended by `pause()`. No-op unless Paused.
    pub fn resume(&mut self) -> Result<Vec<Event>, CoreError> {
        let Some(restored) = self.ctx.paused_from else {
            return Ok(Vec::new());
        };
        if self.ctx.phase != Phase::Paused {
            return Ok(Vec::new());
        }
        let pause_duration = (self.clock.now() - self.ctx.pause_start_ts).max(0);
        self.ctx.total_paused_seconds += pause_duration;
        self.ctx.phase = restored;
        self.ctx.paused_from = None;
        self.ctx.pause_start_ts = 0;
        Ok(vec![
            Event::phase_changed(Phase::Paused, restored),
            self.tick_event(),
        ])
    }

    /// Stop the active or paused phase, persisting it as interrupted.
    pub fn stop(&mut self) -> Result<Vec<Event>, CoreError> {
        if self.ctx.phase == Phase::Idle {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        self.stop_and_save(true, &mut events)?;
        Ok(events)
    }

    /// Skip the current break and return to idle. No-op unless Break.
    pub fn skip_break(&mut self) -> Result<Vec<Event>, CoreError> {
        if self.ctx.phase != Phase::Break {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        self.stop_and_save(true, &mut events)?;
        Ok(events)
    }

    /// Recompute remaining time and run completion handling when it
    /// reaches zero. Call periodically; while Paused only a frozen
    /// snapshot is republished, while Idle nothing is.
    pub fn tick(&mut self) -> Result<Vec<Event>, CoreError> {
        match self.ctx.phase {
            Phase::Idle => Ok(Vec::new()),
            Phase::Paused => Ok(vec![self.tick_event()]),
            Phase::Focus | Phase::Break => {
                let now = self.clock.now();
                let elapsed = now - self.ctx.session_start_ts - self.ctx.total_paused_seconds;
                self.ctx.remaining_seconds =
                    (self.ctx.total_seconds - elapsed).clamp(0, self.ctx.total_seconds);
                let mut events = vec![self.tick_event()];
                if self.ctx.remaining_seconds <= 0 {
                    // The completion transition moves the phase, so a
                    // repeat tick cannot fire it twice.
                    self.complete_phase(&mut events)?;
                }
                Ok(events)
            }
        }
    }

    /// Host shutdown hook: interrupt and persist anything in flight.
    pub fn cleanup(&mut self) -> Result<Vec<Event>, CoreError> {
        if self.ctx.phase == Phase::Idle {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        self.stop_and_save(true, &mut events)?;
        Ok(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Completion handling for the phase whose remaining time hit zero.
    ///
    /// Persists exactly one record per completed phase; the follow-up
    /// phase (auto-continue) is entered through `begin_phase`, which
    /// performs no save of its own.
    fn complete_phase(&mut self, events: &mut Vec<Event>) -> Result<(), CoreError> {
        match self.ctx.phase {
            Phase::Focus => {
                let record = self.build_record(SessionStatus::Completed, false);
                if let Err(e) = self.persist_record(record, events) {
                    self.settle_idle(events);
                    return Err(e);
                }
                let settings = match self.store.settings() {
                    Ok(s) => s,
                    Err(e) => {
                        self.settle_idle(events);
                        return Err(e.into());
                    }
                };
                if settings.auto_start_break {
                    self.begin_phase(Phase::Break, events);
                } else {
                    self.settle_idle(events);
                }
                Ok(())
            }
            Phase::Break => {
                let settings = match self.store.settings() {
                    Ok(s) => s,
                    Err(e) => {
                        self.settle_idle(events);
                        return Err(e.into());
                    }
                };
                if settings.log_breaks {
                    let record = self.build_record(SessionStatus::Completed, true);
                    if let Err(e) = self.persist_record(record, events) {
                        self.settle_idle(events);
                        return Err(e);
                    }
                }
                if settings.auto_start_focus {
                    // Restart with the previous minutes and category.
                    self.begin_phase(Phase::Focus, events);
                } else {
                    self.settle_idle(events);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Enter Focus or Break with fresh timestamps. Performs no save.
    fn begin_phase(&mut self, phase: Phase, events: &mut Vec<Event>) {
        let old = self.ctx.phase;
        let minutes = match phase {
            Phase::Focus => self.ctx.focus_minutes,
            _ => self.ctx.break_minutes,
        };
        self.ctx.phase = phase;
        self.ctx.total_seconds = i64::from(minutes) * 60;
        self.ctx.remaining_seconds = self.ctx.total_seconds;
        self.ctx.session_start_ts = self.clock.now();
        self.ctx.pause_start_ts = 0;
        self.ctx.total_paused_seconds = 0;
        self.ctx.paused_from = None;
        events.push(Event::phase_changed(old, phase));
        events.push(self.tick_event());
    }

    /// Persist the active (or pause-suspended) phase and reset to idle.
    ///
    /// Focus sessions are always recorded; breaks only when the
    /// `log_breaks` setting is enabled. The context lands in Idle even
    /// when the store fails, after which the error propagates.
    fn stop_and_save(&mut self, interrupted: bool, events: &mut Vec<Event>) -> Result<(), CoreError> {
        let effective = match self.ctx.phase {
            Phase::Paused => self.ctx.paused_from.unwrap_or(Phase::Idle),
            phase => phase,
        };
        let status = if interrupted {
            SessionStatus::Interrupted
        } else {
            SessionStatus::Completed
        };

        let save = match effective {
            Phase::Focus => {
                let record = self.build_record(status, false);
                self.persist_record(record, events)
            }
            Phase::Break => match self.store.settings() {
                Ok(s) if s.log_breaks => {
                    let record = self.build_record(status, true);
                    self.persist_record(record, events)
                }
                Ok(_) => Ok(()),
                Err(e) => Err(e.into()),
            },
            _ => Ok(()),
        };

        self.settle_idle(events);
        save
    }

    /// Reset to idle defaults and emit the transition events.
    ///
    /// Focus/break minutes and the category id survive the reset so an
    /// auto-restarted or re-issued start reuses them.
    fn settle_idle(&mut self, events: &mut Vec<Event>) {
        let old = self.ctx.phase;
        self.ctx.phase = Phase::Idle;
        self.ctx.total_seconds = 0;
        self.ctx.remaining_seconds = 0;
        self.ctx.session_start_ts = 0;
        self.ctx.pause_start_ts = 0;
        self.ctx.total_paused_seconds = 0;
        self.ctx.paused_from = None;
        events.push(Event::phase_changed(old, Phase::Idle));
        events.push(self.tick_event());
    }

    /// Build the record for the current phase.
    ///
    /// Actual time honors an in-progress pause: while paused, elapsing
    /// stopped at `pause_start_ts`. The result is clamped to
    /// `[0, planned]` to guard against clock anomalies.
    fn build_record(&self, status: SessionStatus, is_break: bool) -> SessionRecord {
        let now = self.clock.now();
        let stop_mark = if self.ctx.pause_start_ts > 0 {
            self.ctx.pause_start_ts
        } else {
            now
        };
        let raw = stop_mark - self.ctx.session_start_ts - self.ctx.total_paused_seconds;
        SessionRecord {
            id: None,
            category_id: self.ctx.category_id,
            start_ts: self.ctx.session_start_ts,
            end_ts: now,
            planned_seconds: self.ctx.total_seconds,
            actual_seconds: raw.clamp(0, self.ctx.total_seconds),
            status,
            note: None,
            is_break,
            created_at: now,
        }
    }

    fn persist_record(
        &mut self,
        mut record: SessionRecord,
        events: &mut Vec<Event>,
    ) -> Result<(), CoreError> {
        let id = self.store.create_session(&record)?;
        record.id = Some(id);
        events.push(Event::session_completed(record));
        Ok(())
    }

    fn tick_event(&self) -> Event {
        Event::tick(self.ctx.clone())
    }
}
