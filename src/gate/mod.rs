pub mod classify;

pub use classify::{classify, DecisionPhrases, PollState};

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::console;
use crate::source::FlagSource;

/// Loop bounds for one polling session.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Delay between consecutive attempts while waiting
    pub interval: Duration,
    /// Optional cap on the number of attempts; unbounded when None
    pub max_attempts: Option<u32>,
    /// Absolute wall-clock ceiling, a safety net against pipeline jobs
    /// that would otherwise run forever
    pub max_duration: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
            max_duration: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Clock and sleep seam for the poll loop, so loop termination logic can be
/// tested without real time passing.
#[async_trait]
pub trait Timer: Send + Sync {
    /// Wall-clock time elapsed since the session started.
    fn elapsed(&self) -> Duration;

    /// Suspend for the given duration. The only blocking operation in the
    /// whole gate; not cancellable mid-sleep.
    async fn pause(&self, duration: Duration);
}

/// Real-time Timer backed by `Instant` and `tokio::time::sleep`.
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

#[async_trait]
impl Timer for WallClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Poll the flag source until a decision is reached or a bound trips.
///
/// Returns true only on an explicit approval. A fetch failure ends the
/// session immediately — fail-closed rather than risking an indefinite
/// hang on a broken remote — while unrecognized text keeps the loop alive
/// until the attempt cap or wall-clock ceiling is hit.
pub async fn poll_for_decision(
    source: &dyn FlagSource,
    phrases: &DecisionPhrases,
    settings: &PollSettings,
    timer: &dyn Timer,
) -> bool {
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let elapsed = timer.elapsed();
        debug!(attempt, elapsed_secs = elapsed.as_secs_f64(), "poll attempt");
        console::attempt(attempt, elapsed);

        let state = match source.fetch().await {
            Ok(text) => {
                console::content(&text);
                classify(&text, phrases)
            }
            Err(err) => {
                warn!(error = %err, attempt, "flag file fetch failed");
                console::fetch_failed(&err);
                PollState::Error
            }
        };
        debug!(attempt, %state, "classified flag file");

        match state {
            PollState::Approved => {
                info!(attempt, "decision received: approved");
                console::approved();
                return true;
            }
            PollState::Declined => {
                info!(attempt, "decision received: declined");
                console::declined();
                return false;
            }
            // Deliberate fail-fast: a fetch error is never retried, unlike
            // waiting, which retries until a bound trips.
            PollState::Error => {
                return false;
            }
            PollState::Waiting => {
                console::waiting(phrases);

                if let Some(max) = settings.max_attempts {
                    if attempt >= max {
                        warn!(max, "maximum attempts reached without a decision");
                        console::attempts_exhausted(max);
                        return false;
                    }
                }

                if timer.elapsed() > settings.max_duration {
                    warn!(
                        limit_secs = settings.max_duration.as_secs(),
                        "maximum polling time reached without a decision"
                    );
                    console::ceiling_reached(settings.max_duration);
                    return false;
                }

                debug!(secs = settings.interval.as_secs_f64(), "sleeping before next attempt");
                timer.pause(settings.interval).await;
            }
        }
    }
}
