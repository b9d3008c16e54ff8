mod context;
mod engine;

pub use context::{Clock, Phase, SystemClock, TimerContext};
pub use engine::TimerEngine;
