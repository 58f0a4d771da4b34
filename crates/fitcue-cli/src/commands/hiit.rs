use clap::{Args, Subcommand};
use serde::Serialize;

use fitcue_core::audio::phrases::format_clock;
use fitcue_core::interval::{estimate_session_kcal, Segment};
use fitcue_core::{spawn_session, Config, Event, IntervalConfig, IntervalEngine, SessionPhase};

use super::terminal;

#[derive(Subcommand)]
pub enum HiitAction {
    /// Run a session in the terminal (stdin: p pause, s start/resume, x reset, q quit)
    Run {
        #[command(flatten)]
        durations: DurationArgs,
        /// Print events as JSON lines instead of a status display
        #[arg(long)]
        json: bool,
        /// No spoken cues or beeps
        #[arg(long)]
        quiet: bool,
    },
    /// Print the session timeline and totals
    Plan {
        #[command(flatten)]
        durations: DurationArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Overrides for the configured interval defaults.
#[derive(Args)]
pub struct DurationArgs {
    /// Warmup seconds
    #[arg(long)]
    warmup: Option<u32>,
    /// Work seconds per cycle
    #[arg(long)]
    work: Option<u32>,
    /// Rest seconds between cycles
    #[arg(long)]
    rest: Option<u32>,
    /// Cooldown seconds
    #[arg(long)]
    cooldown: Option<u32>,
    /// Number of work cycles
    #[arg(long)]
    cycles: Option<u32>,
}

impl DurationArgs {
    fn apply(&self, base: IntervalConfig) -> IntervalConfig {
        IntervalConfig {
            warmup_secs: self.warmup.unwrap_or(base.warmup_secs),
            work_secs: self.work.unwrap_or(base.work_secs),
            rest_secs: self.rest.unwrap_or(base.rest_secs),
            cooldown_secs: self.cooldown.unwrap_or(base.cooldown_secs),
            total_cycles: self.cycles.unwrap_or(base.total_cycles),
        }
    }
}

#[derive(Serialize)]
struct PlanOutput {
    segments: Vec<Segment>,
    total_secs: u64,
    estimated_kcal: f64,
}

pub fn run(action: HiitAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        HiitAction::Plan { durations, json } => {
            let interval = durations.apply(config.interval);
            interval.validate()?;
            let output = PlanOutput {
                segments: interval.timeline(),
                total_secs: interval.total_duration_secs(),
                estimated_kcal: estimate_session_kcal(&interval, config.profile.weight_kg()),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_plan(&output);
            }
        }
        HiitAction::Run {
            durations,
            json,
            quiet,
        } => {
            let interval = durations.apply(config.interval);
            let engine = IntervalEngine::new(interval)?
                .with_catalog(config.variant_catalog())
                .with_script(config.script.cues.clone())
                .with_profile(config.profile);
            terminal::runtime()?.block_on(run_session(engine, &config, json, quiet))?;
        }
    }
    Ok(())
}

fn print_plan(plan: &PlanOutput) {
    for segment in &plan.segments {
        let cycle = match segment.phase {
            SessionPhase::Work | SessionPhase::Rest => format!("#{}", segment.cycle),
            _ => String::new(),
        };
        println!(
            "{:<9}{:>4}  {}",
            segment.phase.as_str(),
            cycle,
            format_clock(segment.duration_secs)
        );
    }
    println!("total    {}", format_clock_u64(plan.total_secs));
    println!("calories ~{:.0} kcal", plan.estimated_kcal);
}

fn format_clock_u64(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

async fn run_session(
    engine: IntervalEngine,
    config: &Config,
    json: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = terminal::build_router(config, quiet)?;
    let handle = spawn_session(engine, router);
    let mut events = handle.subscribe();
    let mut snapshots = handle.snapshots();
    let mut input = terminal::stdin_lines();
    let mut input_open = true;

    handle.send(IntervalEngine::start);

    loop {
        tokio::select! {
            line = input.recv(), if input_open => match line.as_deref() {
                Some("p") => { handle.send(IntervalEngine::pause); }
                Some("s") => { handle.send(IntervalEngine::start); }
                Some("x") => { handle.send(IntervalEngine::reset); }
                Some("q") => break,
                Some(other) => eprintln!("unknown command '{other}' (p, s, x, q)"),
                // Keep running to the end without input.
                None => input_open = false,
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if json {
                        terminal::print_json(&event)?;
                    } else {
                        print_event(&event);
                    }
                    if event.is_terminal() {
                        break;
                    }
                }
                Err(e) => tracing::debug!(error = %e, "event stream lagged"),
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                if !json {
                    let s = snapshots.borrow_and_update().clone();
                    if s.state.is_running {
                        println!(
                            "  {:<18} {}  cycle {}/{}  {:.1} kcal",
                            s.phase_label,
                            format_clock(s.state.time_left_secs),
                            s.state.current_cycle,
                            s.state.total_cycles,
                            s.state.calories,
                        );
                    }
                }
            }
        }
    }

    if let Some(engine) = handle.shutdown().await {
        if json {
            terminal::print_json(&engine.snapshot())?;
        }
    }
    Ok(())
}

fn print_event(event: &Event) {
    match event {
        Event::SessionStarted {
            total_cycles,
            total_secs,
            ..
        } => println!(
            "session started: {total_cycles} cycles, {}",
            format_clock_u64(*total_secs)
        ),
        Event::PhaseChanged { to, cycle, .. } => println!("-> {to} (cycle {cycle})"),
        Event::SessionPaused { .. } => println!("paused (s to resume)"),
        Event::SessionResumed { .. } => println!("resumed"),
        Event::SessionReset { .. } => println!("reset (s to start)"),
        Event::SessionFinished {
            cycles, calories, ..
        } => println!("finished: {cycles} cycles, {calories:.1} kcal"),
        _ => {}
    }
}
