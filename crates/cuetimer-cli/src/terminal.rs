//! Terminal implementations of the host capabilities.
//!
//! Everything goes to stderr so stdout stays clean for `--json` output.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use cuetimer_core::host::Silent;
use cuetimer_core::storage::{SoundConfig, SpeechConfig};
use cuetimer_core::{AlarmPlayer, Host, HostError, Speaker};
use tracing::{debug, warn};

enum Job {
    Say(String),
    #[cfg(test)]
    Flush(Sender<()>),
}

/// Prints phrases and optionally hands them to an external speech program.
///
/// The program runs on a worker thread, one phrase at a time, and each
/// child is waited for before the next phrase starts.
pub struct TerminalSpeaker {
    worker: Option<SpeechWorker>,
}

struct SpeechWorker {
    command: Vec<String>,
    jobs: Sender<Job>,
    handle: JoinHandle<()>,
    spawn_error: Arc<Mutex<Option<String>>>,
}

impl TerminalSpeaker {
    pub fn new(command: Option<&str>) -> Self {
        let worker = command
            .map(|c| c.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|parts| !parts.is_empty())
            .map(SpeechWorker::start);
        Self { worker }
    }

    /// Block until every queued phrase has been spoken.
    #[cfg(test)]
    fn flush(&self) {
        let Some(worker) = &self.worker else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if worker.jobs.send(Job::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }
}

impl SpeechWorker {
    fn start(parts: Vec<String>) -> Self {
        let (jobs, rx) = mpsc::channel();
        let spawn_error = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&spawn_error);
        let command = parts.clone();
        let handle = thread::spawn(move || speak_queued(&parts, &rx, &slot));
        Self {
            command,
            jobs,
            handle,
            spawn_error,
        }
    }

    fn take_spawn_error(&self) -> Option<String> {
        self.spawn_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

fn speak_queued(parts: &[String], jobs: &Receiver<Job>, spawn_error: &Mutex<Option<String>>) {
    for job in jobs {
        let text = match job {
            Job::Say(text) => text,
            #[cfg(test)]
            Job::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };
        let status = Command::new(&parts[0])
            .args(&parts[1..])
            .arg(&text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => debug!(%text, "phrase spoken"),
            Ok(status) => warn!(program = %parts[0], %status, "speech command failed"),
            Err(e) => {
                warn!(program = %parts[0], error = %e, "speech command could not start");
                *spawn_error.lock().unwrap_or_else(|p| p.into_inner()) =
                    Some(format!("{}: {e}", parts[0]));
            }
        }
    }
}

impl Speaker for TerminalSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), HostError> {
        eprintln!("\n  » {text}");
        let Some(worker) = &self.worker else {
            return Ok(());
        };
        if let Some(message) = worker.take_spawn_error() {
            return Err(HostError::Rejected {
                capability: "speech",
                message,
            });
        }
        worker
            .jobs
            .send(Job::Say(text.to_string()))
            .map_err(|_| HostError::Rejected {
                capability: "speech",
                message: format!("{}: speech worker stopped", worker.command[0]),
            })
    }
}

impl Drop for TerminalSpeaker {
    fn drop(&mut self) {
        if let Some(SpeechWorker { jobs, handle, .. }) = self.worker.take() {
            // Closing the queue lets the worker finish what is left and exit.
            drop(jobs);
            if handle.join().is_err() {
                warn!("speech worker panicked");
            }
        }
    }
}

/// Tick marker and terminal bell.
pub struct TerminalPlayer;

impl AlarmPlayer for TerminalPlayer {
    fn play_tick(&mut self) -> Result<(), HostError> {
        let mut err = std::io::stderr();
        write!(err, "·")
            .and_then(|_| err.flush())
            .map_err(|e| rejected("audio", e))
    }

    fn play_alarm(&mut self) -> Result<(), HostError> {
        let mut err = std::io::stderr();
        write!(err, "\x07\n  ** ALARM **\n")
            .and_then(|_| err.flush())
            .map_err(|e| rejected("audio", e))
    }
}

fn rejected(capability: &'static str, e: std::io::Error) -> HostError {
    HostError::Rejected {
        capability,
        message: e.to_string(),
    }
}

/// Host for a terminal session. Terminals have no screen wake lock.
pub fn host(sound: &SoundConfig, speech: &SpeechConfig) -> Host {
    let speaker: Box<dyn Speaker> = if speech.enabled {
        Box::new(TerminalSpeaker::new(speech.command.as_deref()))
    } else {
        Box::new(Silent)
    };
    let player: Box<dyn AlarmPlayer> = if sound.enabled {
        Box::new(TerminalPlayer)
    } else {
        Box::new(Silent)
    };
    Host {
        speaker,
        player,
        wake_lock: Box::new(Silent),
    }
}
