use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::SessionRecord;
use crate::timer::{Phase, TimerContext};

/// Every state-affecting engine call produces one or more events, in
/// order. Hosts fan them out to whatever is listening (display, desktop
/// notifications, keep-awake).
///
/// Ordering guarantee: when a single call both changes phase and
/// republishes state, `PhaseChanged` precedes `Tick`; `SessionCompleted`
/// is emitted at the moment a record is persisted, before the transition
/// events that follow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// State snapshot, fired after every state-affecting call and on
    /// every scheduler wake-up while non-Idle.
    Tick {
        context: TimerContext,
        at: DateTime<Utc>,
    },
    /// Fired once per transition.
    PhaseChanged {
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    /// Fired once per persisted record.
    SessionCompleted {
        record: SessionRecord,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub(crate) fn tick(context: TimerContext) -> Self {
        Event::Tick {
            context,
            at: Utc::now(),
        }
    }

    pub(crate) fn phase_changed(from: Phase, to: Phase) -> Self {
        Event::PhaseChanged {
            from,
            to,
            at: Utc::now(),
        }
    }

    pub(crate) fn session_completed(record: SessionRecord) -> Self {
        Event::SessionCompleted {
            record,
            at: Utc::now(),
        }
    }
}
