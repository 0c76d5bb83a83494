use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use fastroom_core::{Config, Database, Event, FastController, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::render;

#[derive(Subcommand)]
pub enum FastAction {
    /// Start or resume the fast from its current start time
    Start,
    /// Pause the fast, freezing the displayed elapsed time
    Pause,
    /// Pause and restart the clock at the current time
    Reset,
    /// Print the current state
    Status,
    /// Move the start time (epoch ms, RFC 3339, or local "YYYY-MM-DDTHH:MM")
    SetStart {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Change the target length in hours (must be at least 1)
    SetTarget {
        #[arg(allow_hyphen_values = true)]
        hours: String,
    },
    /// Live display, one line per tick. Type s/p/r/q + Enter to control.
    Watch,
}

pub fn run(action: FastAction, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(execute(action, json, config));
    // A pending stdin read from `watch` would otherwise block runtime drop.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn execute(
    action: FastAction,
    json: bool,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut ctl = FastController::load(
        db,
        Arc::new(SystemClock),
        config.phase_table(),
        config.session.default_target_hours,
    )?;

    match action {
        FastAction::Start => {
            ctl.start().await?;
        }
        FastAction::Pause => {
            ctl.pause().await?;
        }
        FastAction::Reset => {
            ctl.reset().await?;
        }
        FastAction::Status => {
            ctl.tick().await;
        }
        FastAction::SetStart { value } => {
            ctl.set_start_input(&value).await?;
        }
        FastAction::SetTarget { hours } => {
            ctl.set_target_input(&hours).await?;
        }
        FastAction::Watch => return watch(ctl, &config).await,
    }

    render::print_snapshot(&ctl.snapshot().await, &config.display, json)
}

async fn watch(
    mut ctl: FastController<Database>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = ctl.subscribe();
    let interval = Duration::from_millis(config.session.tick_interval_ms);
    ctl.attach_timebase(interval).await;

    println!("{}", render::status_block(&ctl.snapshot().await, &config.display));
    println!("\ncommands: s = start, p = pause, r = reset, q = quit");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(Event::StateSnapshot(snap)) => println!("{}", render::status_line(&snap)),
                Ok(Event::PhaseEntered { phase_name, .. }) => println!(">> entered {phase_name}"),
                Ok(Event::FastStarted { .. }) => println!(">> fast started"),
                Ok(Event::FastPaused { .. }) => {
                    println!(">> fast paused");
                    println!("{}", render::status_line(&ctl.snapshot().await));
                }
                Ok(Event::FastReset { .. }) => {
                    println!(">> fast reset");
                    println!("{}", render::status_line(&ctl.snapshot().await));
                }
                Ok(other) => debug!(?other, "event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "display lagged behind ticks"),
                Err(RecvError::Closed) => break,
            },
            line = stdin.next_line(), if stdin_open => match line? {
                Some(input) => match input.trim() {
                    "s" | "start" => {
                        ctl.start().await?;
                    }
                    "p" | "pause" => {
                        ctl.pause().await?;
                    }
                    "r" | "reset" => {
                        ctl.reset().await?;
                    }
                    "q" | "quit" => break,
                    "" => {}
                    other => eprintln!("unknown command '{other}' (s/p/r/q)"),
                },
                None => stdin_open = false,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    ctl.shutdown();
    Ok(())
}
