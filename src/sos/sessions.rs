use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use super::dispatch::{dispatch, SosConfirmation, SosRequest};
use super::hold::{wait_finished, HoldGesture, HoldHandle, HoldPhase, HoldProgress};
use super::location::ReportedPosition;
use crate::config::SosSettings;
use crate::db::Store;

/// Finished holds stay visible to pollers for this long.
const FINISHED_RETENTION: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Submission {
    Sent(SosConfirmation),
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct HoldStatus {
    pub id: Uuid,
    #[serde(flatten)]
    pub progress: HoldProgress,
    pub submission: Option<Submission>,
}

struct Session {
    handle: HoldHandle,
    submission: Arc<Mutex<Option<Submission>>>,
    finished_at: Arc<Mutex<Option<Instant>>>,
}

impl Session {
    async fn status(&self, id: Uuid) -> HoldStatus {
        HoldStatus {
            id,
            progress: self.handle.progress(),
            submission: self.submission.lock().await.clone(),
        }
    }
}

/// Holds in flight, keyed by the id handed to the client on press.
pub struct HoldSessions {
    gesture: HoldGesture,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl HoldSessions {
    pub fn new(gesture: HoldGesture) -> Self {
        Self {
            gesture,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a hold; the alert is dispatched only if the hold completes.
    pub async fn press(
        &self,
        store: Arc<dyn Store>,
        settings: SosSettings,
        request: SosRequest,
        locator: ReportedPosition,
    ) -> HoldStatus {
        let id = Uuid::new_v4();
        let handle = self.gesture.press();
        let mut watcher = handle.subscribe();
        let submission = Arc::new(Mutex::new(None));
        let finished_at = Arc::new(Mutex::new(None));

        let slot = submission.clone();
        let finished = finished_at.clone();
        tokio::spawn(async move {
            if wait_finished(&mut watcher).await == HoldPhase::Completed {
                let outcome =
                    dispatch(store.as_ref(), &settings, request, &locator, Utc::now()).await;
                *slot.lock().await = Some(match outcome {
                    Ok(confirmation) => Submission::Sent(confirmation),
                    Err(e) => {
                        error!("Failed to send SOS alert for {}: {}", request.user_id, e);
                        Submission::Failed {
                            message: "Failed to send SOS alert. Please try again or call emergency services directly.".to_string(),
                        }
                    }
                });
            }
            *finished.lock().await = Some(Instant::now());
        });

        info!("SOS hold {} started for user {}", id, request.user_id);

        let mut sessions = self.sessions.lock().await;
        prune(&mut sessions).await;
        let session = Session {
            handle,
            submission,
            finished_at,
        };
        let status = session.status(id).await;
        sessions.insert(id, session);
        status
    }

    /// Polling doubles as the client's keepalive.
    pub async fn status(&self, id: Uuid) -> Option<HoldStatus> {
        let sessions = self.sessions.lock().await;
        match sessions.get(&id) {
            Some(session) => {
                session.handle.touch();
                Some(session.status(id).await)
            }
            None => None,
        }
    }

    /// Releases the control. A release after completion is ignored.
    pub async fn release(&self, id: Uuid) -> Option<HoldStatus> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id)?;
        if session.handle.release() {
            session.handle.outcome().await;
        }
        Some(session.status(id).await)
    }
}

async fn prune(sessions: &mut HashMap<Uuid, Session>) {
    let mut expired = Vec::new();
    for (id, session) in sessions.iter() {
        if let Some(at) = *session.finished_at.lock().await {
            if at.elapsed() > FINISHED_RETENTION {
                expired.push(*id);
            }
        }
    }
    for id in expired {
        sessions.remove(&id);
    }
}
