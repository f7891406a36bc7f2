//! services/site/src/web/countdown_task.rs
//!
//! The recurring once-per-second countdown tick for one page session.
//! The task is owned by a `CountdownTicker` and cancelled through a `CancellationToken`.

use crate::web::{protocol::ServerMessage, state::{Outbox, SessionState}};
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a running countdown task. Dropping it cancels the task.
pub struct CountdownTicker {
    cancellation_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    /// Spawns the tick loop. The first tick fires immediately.
    pub fn start(session_state_lock: Arc<Mutex<SessionState>>, outbox: Outbox) -> Self {
        let cancellation_token = CancellationToken::new();
        let handle = tokio::spawn(countdown_process(
            session_state_lock,
            outbox,
            cancellation_token.clone(),
        ));
        Self {
            cancellation_token,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels the task and waits for it to exit.
    pub async fn stop(mut self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                debug!("Countdown task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

async fn countdown_process(
    session_state_lock: Arc<Mutex<SessionState>>,
    outbox: Outbox,
    cancellation_token: CancellationToken,
) {
    let mut ticks = interval(TICK_PERIOD);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut event_reached = false;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Countdown task cancelled.");
                return;
            }
            _ = ticks.tick() => {
                let now = Utc::now();
                let remaining = {
                    let mut session = session_state_lock.lock().await;
                    let countdown = &mut session.page.countdown;
                    // Past the target the countdown holds at zero but keeps ticking.
                    if !event_reached && countdown.has_elapsed(now) {
                        event_reached = true;
                        info!("Event date {} reached; countdown holds at zero.", countdown.target());
                    }
                    countdown.tick(now)
                };
                if outbox.send(ServerMessage::Countdown(remaining.into())).is_err() {
                    info!("Page session closed, stopping countdown.");
                    return;
                }
            }
        }
    }
}
