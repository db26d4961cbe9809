//! Press-and-hold gesture that arms an SOS alert.
//!
//! A hold runs on its own task. Progress advances linearly on every tick and
//! is published through a watch channel. Releasing before the hold duration
//! elapses aborts; reaching it completes the hold exactly once.
//!
//! A gesture may also carry a keepalive window. The client then has to check
//! in through [`HoldHandle::touch`] at least that often, otherwise the hold is
//! treated as released.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldPhase {
    Holding,
    Aborted,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoldProgress {
    pub phase: HoldPhase,
    pub percent: f64,
    pub seconds_left: u64,
}

impl HoldProgress {
    fn holding(elapsed: Duration, duration: Duration) -> Self {
        Self {
            phase: HoldPhase::Holding,
            percent: progress_percent(elapsed, duration),
            seconds_left: seconds_left(elapsed, duration),
        }
    }

    fn finished(phase: HoldPhase, duration: Duration) -> Self {
        let completed = phase == HoldPhase::Completed;
        Self {
            phase,
            percent: if completed { 100.0 } else { 0.0 },
            seconds_left: if completed { 0 } else { duration.as_secs() },
        }
    }
}

/// Linear progress in `[0, 100]`.
pub fn progress_percent(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64() * 100.0).min(100.0)
}

/// Whole seconds left on the hold, rounded up.
pub fn seconds_left(elapsed: Duration, duration: Duration) -> u64 {
    let remaining = duration.saturating_sub(elapsed);
    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
}

#[derive(Debug, Clone, Copy)]
pub struct HoldGesture {
    duration: Duration,
    tick: Duration,
    keepalive: Option<Duration>,
}

impl HoldGesture {
    pub fn new(duration: Duration, tick: Duration) -> Self {
        Self {
            duration,
            tick: tick.max(Duration::from_millis(1)),
            keepalive: None,
        }
    }

    /// Aborts holds that go longer than `window` without a [`HoldHandle::touch`].
    pub fn with_keepalive(mut self, window: Option<Duration>) -> Self {
        self.keepalive = window.filter(|w| !w.is_zero());
        self
    }

    /// Starts a hold. Dropping the returned handle counts as a release.
    pub fn press(&self) -> HoldHandle {
        let (release_tx, release_rx) = oneshot::channel();
        let (progress_tx, progress_rx) = watch::channel(HoldProgress::holding(
            Duration::ZERO,
            self.duration,
        ));

        let (heartbeat_tx, heartbeat_rx) = watch::channel(Instant::now());

        tokio::spawn(run_hold(*self, release_rx, progress_tx, heartbeat_rx));

        HoldHandle {
            release: Some(release_tx),
            progress: progress_rx,
            heartbeat: heartbeat_tx,
        }
    }
}

pub struct HoldHandle {
    release: Option<oneshot::Sender<()>>,
    progress: watch::Receiver<HoldProgress>,
    heartbeat: watch::Sender<Instant>,
}

impl HoldHandle {
    /// Lets go of the control. Returns false when the hold had already
    /// finished, in which case nothing changes.
    pub fn release(&mut self) -> bool {
        match self.release.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Marks the client as still holding.
    pub fn touch(&self) {
        self.heartbeat.send_replace(Instant::now());
    }

    pub fn progress(&self) -> HoldProgress {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<HoldProgress> {
        self.progress.clone()
    }

    pub async fn outcome(&mut self) -> HoldPhase {
        wait_finished(&mut self.progress).await
    }
}

/// Waits until a hold leaves the `Holding` phase.
pub async fn wait_finished(progress: &mut watch::Receiver<HoldProgress>) -> HoldPhase {
    match progress.wait_for(|p| p.phase != HoldPhase::Holding).await {
        Ok(p) => p.phase,
        // the hold task never exits without publishing a final phase
        Err(_) => HoldPhase::Aborted,
    }
}

async fn run_hold(
    gesture: HoldGesture,
    mut release: oneshot::Receiver<()>,
    progress: watch::Sender<HoldProgress>,
    heartbeat: watch::Receiver<Instant>,
) {
    let duration = gesture.duration;
    let started = Instant::now();
    let deadline = started + duration;
    let mut ticker = time::interval(gesture.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let lapse = gesture.keepalive.map(|window| *heartbeat.borrow() + window);

        tokio::select! {
            biased;
            _ = &mut release => {
                progress.send_replace(HoldProgress::finished(HoldPhase::Aborted, duration));
                info!("SOS hold released after {:?}", started.elapsed());
                return;
            }
            _ = time::sleep_until(lapse.unwrap_or(deadline)), if lapse.is_some() => {
                progress.send_replace(HoldProgress::finished(HoldPhase::Aborted, duration));
                warn!("SOS hold abandoned after {:?}: client stopped checking in", started.elapsed());
                return;
            }
            _ = time::sleep_until(deadline) => {
                progress.send_replace(HoldProgress::finished(HoldPhase::Completed, duration));
                info!("SOS hold completed");
                return;
            }
            _ = ticker.tick() => {
                let current = HoldProgress::holding(started.elapsed(), duration);
                debug!("SOS hold at {:.0}%", current.percent);
                progress.send_replace(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: Duration = Duration::from_secs(3);
    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn progress_is_linear_and_clamped() {
        assert_eq!(progress_percent(Duration::ZERO, HOLD), 0.0);
        assert_eq!(progress_percent(Duration::from_millis(1500), HOLD), 50.0);
        assert_eq!(progress_percent(Duration::from_secs(4), HOLD), 100.0);
    }

    #[test]
    fn countdown_rounds_up() {
        assert_eq!(seconds_left(Duration::ZERO, HOLD), 3);
        assert_eq!(seconds_left(Duration::from_millis(100), HOLD), 3);
        assert_eq!(seconds_left(Duration::from_millis(2001), HOLD), 1);
        assert_eq!(seconds_left(HOLD, HOLD), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn early_release_aborts() {
        let gesture = HoldGesture::new(HOLD, TICK);
        let mut hold = gesture.press();

        time::sleep(Duration::from_millis(1550)).await;
        let midway = hold.progress();
        assert_eq!(midway.phase, HoldPhase::Holding);
        assert!(midway.percent > 40.0 && midway.percent < 60.0);

        assert!(hold.release());
        assert_eq!(hold.outcome().await, HoldPhase::Aborted);
        assert_eq!(hold.progress().percent, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn full_hold_completes_once() {
        let gesture = HoldGesture::new(HOLD, TICK);
        let mut hold = gesture.press();

        assert_eq!(hold.outcome().await, HoldPhase::Completed);
        assert_eq!(hold.progress().percent, 100.0);

        // releasing after completion changes nothing
        assert!(!hold.release());
        assert_eq!(hold.outcome().await, HoldPhase::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_client_lapses() {
        let gesture = HoldGesture::new(HOLD, TICK).with_keepalive(Some(Duration::from_secs(1)));
        let mut hold = gesture.press();

        assert_eq!(hold.outcome().await, HoldPhase::Aborted);
        assert!(!hold.release());
    }

    #[tokio::test(start_paused = true)]
    async fn touching_keeps_the_hold_alive() {
        let gesture = HoldGesture::new(HOLD, TICK).with_keepalive(Some(Duration::from_secs(1)));
        let mut hold = gesture.press();

        for _ in 0..10 {
            time::sleep(Duration::from_millis(400)).await;
            hold.touch();
        }
        assert_eq!(hold.outcome().await, HoldPhase::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_aborts() {
        let gesture = HoldGesture::new(HOLD, TICK);
        let hold = gesture.press();
        let mut watcher = hold.subscribe();
        drop(hold);

        assert_eq!(wait_finished(&mut watcher).await, HoldPhase::Aborted);
    }
}
