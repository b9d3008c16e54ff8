use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The engine's current mode.
///
/// Exactly one value at any instant. While `Paused`, the suspended phase
/// (`Focus` or `Break`) is remembered in [`TimerContext::paused_from`]
/// so `resume()` can restore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Focus,
    Break,
    Paused,
}

impl Phase {
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Focus | Phase::Break)
    }
}

/// Source of wall-clock time, in unix seconds.
///
/// The engine never counts ticks; all elapsed-time accounting is
/// timestamp arithmetic against this clock, so scheduler jitter or a
/// suspended process cause no drift.
pub trait Clock {
    fn now(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Current timer state, owned and mutated exclusively by the engine.
///
/// External readers only ever see clones of this struct, carried by
/// [`crate::events::Event::Tick`]. It is serializable so a host can park
/// it between process invocations and hand it back to
/// [`crate::timer::TimerEngine::with_context`]; the wall-clock
/// timestamps inside make that round trip lossless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerContext {
    pub phase: Phase,
    /// Planned duration of the active phase, in seconds.
    pub total_seconds: i64,
    /// Derived: recomputed from timestamps on every tick, frozen while
    /// Paused.
    pub remaining_seconds: i64,
    /// Opaque category id, set at focus start and kept through the
    /// paired break.
    pub category_id: Option<i64>,
    pub focus_minutes: u32,
    pub break_minutes: u32,
    /// Wall-clock mark (unix seconds) of the current phase start.
    pub session_start_ts: i64,
    /// Wall-clock mark of when the current pause began; 0 when not
    /// paused.
    pub pause_start_ts: i64,
    /// Cumulative pause time subtracted from elapsed, reset at each new
    /// phase start.
    pub total_paused_seconds: i64,
    /// Phase suspended by the current pause.
    pub paused_from: Option<Phase>,
}

impl TimerContext {
    pub fn elapsed_seconds(&self) -> i64 {
        self.total_seconds - self.remaining_seconds
    }

    /// 0.0 .. 100.0 progress within the current phase.
    pub fn progress_pct(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        (self.elapsed_seconds() as f64 / self.total_seconds as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Remaining time formatted as MM:SS.
    pub fn format_remaining(&self) -> String {
        let remaining = self.remaining_seconds.max(0);
        format!("{:02}:{:02}", remaining / 60, remaining % 60)
    }
}

impl Default for TimerContext {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            total_seconds: 0,
            remaining_seconds: 0,
            category_id: None,
            focus_minutes: 25,
            break_minutes: 5,
            session_start_ts: 0,
            pause_start_ts: 0,
            total_paused_seconds: 0,
            paused_from: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_remaining_pads_digits() {
        let ctx = TimerContext {
            remaining_seconds: 65,
            ..TimerContext::default()
        };
        assert_eq!(ctx.format_remaining(), "01:05");
    }

    #[test]
    fn progress_pct_empty_phase_is_zero() {
        let ctx = TimerContext::default();
        assert_eq!(ctx.progress_pct(), 0.0);
    }

    #[test]
    fn progress_pct_halfway() {
        let ctx = TimerContext {
            total_seconds: 1500,
            remaining_seconds: 750,
            ..TimerContext::default()
        };
        assert_eq!(ctx.progress_pct(), 50.0);
    }
}
