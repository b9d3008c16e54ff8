use std::io::Write as _;
use std::time::Duration;

use clap::Subcommand;
use focustimer_core::platform::{platform_keep_awake, DesktopNotifier, KeepAwake, Notifier};
use focustimer_core::storage::{Config, Database};
use focustimer_core::{Event, Phase, TimerContext, TimerEngine};
use log::debug;

use super::common::resolve_category;

const CTX_KEY: &str = "timer_context";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus session (interrupts any session in progress)
    Start {
        /// Focus duration in minutes
        #[arg(long)]
        focus: Option<u32>,
        /// Break duration in minutes
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Category to record the session against
        #[arg(long)]
        category: Option<String>,
        /// Named preset from the config file
        #[arg(long, conflicts_with_all = ["focus", "break_minutes"])]
        preset: Option<String>,
    },
    /// Move to the break phase (completes a running focus session)
    Break,
    /// Pause the running phase
    Pause,
    /// Resume a paused phase
    Resume,
    /// Stop and record the session as interrupted
    Stop,
    /// Skip the current break
    Skip,
    /// Recompute and print the current timer state
    Status,
    /// Run the ticker in the foreground until the timer goes idle
    Watch,
}

fn load_context(db: &Database) -> TimerContext {
    if let Ok(Some(json)) = db.kv_get(CTX_KEY) {
        if let Ok(ctx) = serde_json::from_str::<TimerContext>(&json) {
            return ctx;
        }
        debug!("discarding unreadable parked timer context");
    }
    TimerContext::default()
}

fn save_context(engine: &TimerEngine<Database>) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine.context())?;
    engine.store().kv_set(CTX_KEY, &json)?;
    Ok(())
}

/// Print returned events; fall back to a state snapshot for no-ops so
/// the caller always sees where the timer stands.
fn emit(engine: &TimerEngine<Database>, events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    if events.is_empty() {
        println!("{}", serde_json::to_string_pretty(engine.context())?);
        return Ok(());
    }
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let ctx = load_context(&db);
    let mut engine = TimerEngine::with_context(db, ctx);

    match action {
        TimerAction::Start {
            focus,
            break_minutes,
            category,
            preset,
        } => {
            let config = Config::load()?;
            let category = match &category {
                Some(name) => Some(resolve_category(engine.store(), name)?),
                None => engine.context().category_id,
            };

            // Explicit durations win, then the preset, then the
            // category's defaults, then whatever the context last used.
            let (mut focus_min, mut break_min) =
                (engine.context().focus_minutes, engine.context().break_minutes);
            if let Some(id) = category {
                if let Some(cat) = engine.store().get_category(id)? {
                    focus_min = cat.default_focus_minutes;
                    break_min = cat.default_break_minutes;
                }
            }
            if let Some(name) = &preset {
                let preset = config
                    .find_preset(name)
                    .ok_or_else(|| format!("unknown preset '{name}'"))?;
                focus_min = preset.focus_minutes;
                break_min = preset.break_minutes;
            }
            if let Some(f) = focus {
                focus_min = f;
            }
            if let Some(b) = break_minutes {
                break_min = b;
            }

            let events = engine.start_focus(focus_min, break_min, category)?;
            emit(&engine, &events)?;
        }
        TimerAction::Break => {
            let events = engine.start_break()?;
            emit(&engine, &events)?;
        }
        TimerAction::Pause => {
            let events = engine.pause()?;
            emit(&engine, &events)?;
        }
        TimerAction::Resume => {
            let events = engine.resume()?;
            emit(&engine, &events)?;
        }
        TimerAction::Stop => {
            let events = engine.stop()?;
            emit(&engine, &events)?;
        }
        TimerAction::Skip => {
            let events = engine.skip_break()?;
            emit(&engine, &events)?;
        }
        TimerAction::Status => {
            // Tick first so the elapsed time since the last invocation
            // is reflected (and a phase that ran out completes).
            let events = engine.tick()?;
            println!("{}", serde_json::to_string_pretty(engine.context())?);
            for event in events
                .iter()
                .filter(|e| matches!(e, Event::SessionCompleted { .. } | Event::PhaseChanged { .. }))
            {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        TimerAction::Watch => {
            let config = Config::load()?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .enable_io()
                .build()?;
            runtime.block_on(watch(&mut engine, Duration::from_millis(config.tick_interval_ms)))?;
        }
    }

    save_context(&engine)?;
    Ok(())
}

/// Foreground ticker: serialized wake-ups (the next tick is not issued
/// before the previous one returns), desktop notifications and
/// screen-wake suppression driven off the engine's events.
async fn watch(
    engine: &mut TimerEngine<Database>,
    tick_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    if engine.is_idle() {
        println!("timer is idle; nothing to watch");
        return Ok(());
    }

    let notifier = DesktopNotifier;
    let mut keep_awake = platform_keep_awake();
    sync_keep_awake(engine, keep_awake.as_mut())?;

    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = engine.tick()?;
                report(engine, &events, &notifier)?;
                sync_keep_awake(engine, keep_awake.as_mut())?;
                if engine.is_idle() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                let events = engine.cleanup()?;
                report(engine, &events, &notifier)?;
                break;
            }
        }
    }

    keep_awake.stop();
    println!();
    Ok(())
}

fn report(
    engine: &TimerEngine<Database>,
    events: &[Event],
    notifier: &DesktopNotifier,
) -> Result<(), Box<dyn std::error::Error>> {
    let notifications_on = engine.store().get_settings()?.notification_enabled;
    for event in events {
        if let Event::PhaseChanged { from, to, .. } = event {
            println!();
            if notifications_on {
                if let Some((summary, body)) = transition_message(*from, *to) {
                    notifier.notify(summary, body);
                }
            }
        }
    }

    let ctx = engine.context();
    print!("\r{:<6} {}  ", phase_label(ctx.phase), ctx.format_remaining());
    std::io::stdout().flush()?;
    Ok(())
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Focus => "focus",
        Phase::Break => "break",
        Phase::Paused => "paused",
    }
}

fn transition_message(from: Phase, to: Phase) -> Option<(&'static str, &'static str)> {
    match (from, to) {
        (Phase::Focus, Phase::Break) => Some(("Focus complete", "Time for a break.")),
        (Phase::Break, Phase::Focus) => Some(("Break over", "Back to focus.")),
        (Phase::Focus | Phase::Break, Phase::Idle) => Some(("Session finished", "Timer is idle.")),
        _ => None,
    }
}

/// Keep the wake lock held exactly while a phase is actively running
/// and the setting allows it.
fn sync_keep_awake(
    engine: &TimerEngine<Database>,
    keep_awake: &mut dyn KeepAwake,
) -> Result<(), Box<dyn std::error::Error>> {
    let wanted = engine.is_running() && engine.store().get_settings()?.keep_screen_awake;
    if wanted && !keep_awake.is_active() {
        keep_awake.start();
    } else if !wanted && keep_awake.is_active() {
        keep_awake.stop();
    }
    Ok(())
}
