use clap::Args;
use cuetimer_core::{Clock, Config, Countdown, Event, Host, ManualClock, Preset, TimerState};
use tracing::debug;

#[derive(Args)]
pub struct SimulateArgs {
    /// Preset key; ignored when --ticks is given
    #[arg(long)]
    preset: Option<String>,
    /// Custom run: seconds after the lead-in
    #[arg(long)]
    ticks: Option<u64>,
    /// Custom run: lead-in seconds
    #[arg(long, default_value_t = 5)]
    lead_in: u64,
    /// Custom run: ticks per second stretch factor
    #[arg(long, default_value_t = 1)]
    tps: u64,
    /// Commands at virtual times, e.g. "start@0,pause@5000,start@8000"
    #[arg(long, default_value = "start@0")]
    script: String,
    /// Virtual frame interval in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Stop at this virtual time even if the run is still going
    #[arg(long)]
    until_ms: Option<u64>,
    /// Emit a tick on every second without a cue
    #[arg(long)]
    metronome: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    at_ms: u64,
    state: TimerState,
}

fn parse_script(script: &str) -> Result<Vec<Step>, String> {
    let mut steps = script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (command, at) = token
                .split_once('@')
                .ok_or_else(|| format!("expected command@ms, got {token:?}"))?;
            let state = command.parse::<TimerState>().map_err(|e| e.to_string())?;
            let at_ms = at
                .parse::<u64>()
                .map_err(|e| format!("bad time in {token:?}: {e}"))?;
            Ok(Step { at_ms, state })
        })
        .collect::<Result<Vec<_>, String>>()?;
    // Stable, so commands sharing a timestamp keep their written order.
    steps.sort_by_key(|step| step.at_ms);
    Ok(steps)
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let preset = match args.ticks {
        Some(ticks) => Preset::new(ticks, args.lead_in, args.tps),
        None => super::resolve_preset(args.preset.as_deref(), &Config::load_or_default())?,
    };
    let config = preset.timer_config()?.with_metronome(args.metronome);
    let script = parse_script(&args.script)?;
    let frame_ms = args.frame_ms.max(1);

    let clock = ManualClock::new(0);
    let mut countdown = Countdown::new(config, clock.clone(), Host::silent());
    let mut pending = script.into_iter().peekable();

    loop {
        let now = clock.now_ms();
        while let Some(step) = pending.next_if(|step| step.at_ms <= now) {
            debug!(at_ms = now, state = %step.state, "scripted command");
            emit(now, &countdown.set_state(step.state))?;
        }
        if countdown.wants_frames() {
            emit(now, &countdown.on_frame())?;
        }

        let frame = countdown.wants_frames().then_some(now + frame_ms);
        let command = pending.peek().map(|step| step.at_ms);
        let next = match (frame, command) {
            (Some(frame), Some(command)) => frame.min(command),
            (Some(at), None) | (None, Some(at)) => at,
            (None, None) => break,
        };
        if args.until_ms.is_some_and(|until| next > until) {
            break;
        }
        clock.set(next);
    }
    Ok(())
}

fn emit(at_ms: u64, events: &[Event]) -> Result<(), serde_json::Error> {
    for event in events {
        let mut line = serde_json::to_value(event)?;
        if let Some(fields) = line.as_object_mut() {
            fields.insert("at_ms".to_string(), at_ms.into());
        }
        println!("{line}");
    }
    Ok(())
}
