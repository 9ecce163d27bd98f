use std::io::Write;
use std::time::Duration;

use clap::Args;
use cuetimer_core::{display, Clock, Config, Countdown, Event, SystemClock, TimerState};
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::terminal;

#[derive(Args)]
pub struct RunArgs {
    /// Preset key (see `presets`); defaults to the configured one
    #[arg(long)]
    preset: Option<String>,
    /// Start counting immediately
    #[arg(long)]
    autostart: bool,
    /// Print events as JSON lines instead of the clock face
    #[arg(long)]
    json: bool,
}

enum Key {
    Set(TimerState),
    Quit,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim() {
        "s" | "start" => Some(Key::Set(TimerState::Started)),
        "p" | "pause" => Some(Key::Set(TimerState::Paused)),
        "r" | "reset" => Some(Key::Set(TimerState::Reset)),
        "q" | "quit" => Some(Key::Quit),
        _ => None,
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let preset = super::resolve_preset(args.preset.as_deref(), &config)?;
    let timer = preset
        .timer_config()?
        .with_metronome(config.sound.enabled && config.sound.metronome);
    let mut countdown = Countdown::new(
        timer,
        SystemClock::new(),
        terminal::host(&config.sound, &config.speech),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(
        &mut countdown,
        BufReader::new(tokio::io::stdin()),
        Duration::from_millis(config.display.frame_interval_ms.max(1)),
        args.autostart,
        args.json,
    ))?;

    if args.json {
        println!("{}", summary(&countdown)?);
    } else {
        println!();
    }
    info!(remaining = countdown.remaining(), state = %countdown.state(), "countdown closed");
    Ok(())
}

/// Merge input commands with display frames. Commands win ties, so a pause
/// or reset is applied before any later frame is sampled.
///
/// Returns on `q`, or once input is closed and no sampler is attached.
async fn drive<C, R>(
    countdown: &mut Countdown<C>,
    input: R,
    frame_interval: Duration,
    autostart: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>>
where
    C: Clock,
    R: AsyncBufRead + Unpin,
{
    let mut remaining = countdown.subscribe();
    let mut lines = input.lines();
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut input_open = true;

    if !json {
        eprintln!("keys: s=start p=pause r=reset q=quit (then Enter)");
    }
    render(countdown, json);
    if autostart {
        let events = countdown.set_state(TimerState::Started);
        report(&events, countdown, json)?;
    }

    loop {
        if !input_open && !countdown.wants_frames() {
            break;
        }
        tokio::select! {
            biased;
            line = lines.next_line(), if input_open => {
                match line? {
                    None => input_open = false,
                    Some(line) => match parse_key(&line) {
                        Some(Key::Quit) => break,
                        Some(Key::Set(next)) => {
                            let events = countdown.set_state(next);
                            report(&events, countdown, json)?;
                        }
                        None => eprintln!(
                            "unknown key {:?}: s=start p=pause r=reset q=quit",
                            line.trim()
                        ),
                    },
                }
            }
            changed = remaining.changed() => {
                if changed.is_ok() {
                    render(countdown, json);
                }
            }
            _ = frames.tick(), if countdown.wants_frames() => {
                let events = countdown.on_frame();
                report(&events, countdown, json)?;
            }
        }
    }
    Ok(())
}

/// Closing line for `--json`: the final snapshot, tagged like the events.
fn summary<C: Clock>(countdown: &Countdown<C>) -> serde_json::Result<String> {
    let mut line = serde_json::to_value(countdown.snapshot())?;
    if let Some(fields) = line.as_object_mut() {
        fields.insert("type".to_string(), json!("snapshot"));
    }
    serde_json::to_string(&line)
}

fn report<C: Clock>(
    events: &[Event],
    countdown: &Countdown<C>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        for event in events {
            println!("{}", serde_json::to_string(event)?);
        }
        return Ok(());
    }
    if events
        .iter()
        .any(|e| matches!(e, Event::StateChanged { .. } | Event::Finished))
    {
        render(countdown, json);
    }
    Ok(())
}

fn render<C: Clock>(countdown: &Countdown<C>, json: bool) {
    if json {
        return;
    }
    let total = countdown.config().total_secs();
    let remaining = countdown.remaining();
    let progress = display::progress(remaining, total);
    let mut out = std::io::stdout();
    // A closed stdout only loses the clock face; the countdown carries on.
    let _ = write!(
        out,
        "\r{:<28} {} {} ",
        display::title(countdown.state()),
        display::format_clock(remaining),
        display::progress_bar(progress, 30),
    )
    .and_then(|_| out.flush());
}
