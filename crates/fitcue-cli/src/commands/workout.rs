use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;

use fitcue_core::audio::phrases::format_duration;
use fitcue_core::{spawn_session, Config, Event, PlayerStatus, WorkoutPlan, WorkoutPlayer};

use super::terminal;

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Print a plan's days and exercises
    Show {
        /// Path to the plan JSON
        plan: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play one day of a plan (stdin: n next, r rest, p pause, c continue, e end, q quit)
    Play {
        /// Path to the plan JSON
        plan: PathBuf,
        /// Day number, starting at 1
        #[arg(long, default_value = "1")]
        day: usize,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
        /// No spoken cues
        #[arg(long)]
        quiet: bool,
    },
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WorkoutAction::Show { plan, json } => {
            let plan = WorkoutPlan::from_path(&plan)?;
            if json {
                let days: Vec<_> = plan
                    .days
                    .iter()
                    .map(|d| {
                        serde_json::json!({
                            "day": d.day,
                            "focus": d.focus,
                            "exercises": d.steps(),
                        })
                    })
                    .collect();
                let out = serde_json::json!({ "title": plan.title, "days": days });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_plan(&plan);
            }
        }
        WorkoutAction::Play {
            plan,
            day,
            json,
            quiet,
        } => {
            let plan = WorkoutPlan::from_path(&plan)?;
            let day_index = day.saturating_sub(1);
            let steps = plan.require_day(day_index)?.steps();
            if steps.is_empty() {
                return Err(format!("day {day} has no exercises").into());
            }
            let config = Config::load_or_default();
            let player = WorkoutPlayer::new().with_script(config.script.player.clone());
            terminal::runtime()?.block_on(play(
                player,
                Arc::new(plan),
                day_index,
                &config,
                json,
                quiet,
            ))?;
        }
    }
    Ok(())
}

fn print_plan(plan: &WorkoutPlan) {
    if !plan.title.is_empty() {
        println!("{}", plan.title);
    }
    for (i, day) in plan.days.iter().enumerate() {
        if day.focus.is_empty() {
            println!("{}. {}", i + 1, day.day);
        } else {
            println!("{}. {} ({})", i + 1, day.day, day.focus);
        }
        for step in day.steps() {
            println!(
                "   {:<24} {} x {}  rest {}",
                step.name,
                step.sets,
                step.reps,
                format_duration(step.rest_secs)
            );
            if let Some(notes) = &step.notes {
                println!("   {:<24} {notes}", "");
            }
        }
    }
}

async fn play(
    player: WorkoutPlayer,
    plan: Arc<WorkoutPlan>,
    day_index: usize,
    config: &Config,
    json: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = terminal::build_router(config, quiet)?;
    let handle = spawn_session(player, router);
    let mut events = handle.subscribe();
    let mut snapshots = handle.snapshots();
    let mut input = terminal::stdin_lines();
    let mut input_open = true;

    handle.send(move |p: &mut WorkoutPlayer| p.start_workout(plan, day_index));

    loop {
        tokio::select! {
            line = input.recv(), if input_open => match line.as_deref() {
                Some("n") => { handle.send(WorkoutPlayer::next_exercise); }
                Some("r") => { handle.send(WorkoutPlayer::start_rest); }
                Some("p") => { handle.send(WorkoutPlayer::pause_workout); }
                Some("c") => { handle.send(WorkoutPlayer::resume_workout); }
                Some("e") => { handle.send(WorkoutPlayer::end_workout); }
                Some("q") => break,
                Some(other) => eprintln!("unknown command '{other}' (n, r, p, c, e, q)"),
                // Nobody left to press next.
                None => {
                    input_open = false;
                    handle.send(WorkoutPlayer::end_workout);
                }
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
                let s = snapshots.borrow_and_update().clone();
                if !json && s.state.status == PlayerStatus::Resting {
                    println!("  rest {}s", s.state.rest_time_left_secs);
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn print_event(event: &Event) {
    match event {
        Event::WorkoutStarted {
            exercise,
            exercise_count,
            ..
        } => println!("workout started: {exercise_count} exercises, first up {exercise}"),
        Event::ExerciseAdvanced {
            exercise_index,
            exercise,
            ..
        } => println!("{}. {exercise}", exercise_index + 1),
        Event::RestStarted { rest_secs, .. } => {
            println!("rest {}", format_duration(*rest_secs))
        }
        Event::WorkoutPaused { .. } => println!("paused (c to continue)"),
        Event::WorkoutResumed { .. } => println!("continuing"),
        Event::WorkoutEnded { completed, .. } => {
            if *completed {
                println!("workout complete");
            } else {
                println!("workout ended early");
            }
        }
        _ => {}
    }
}
