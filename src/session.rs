use crate::aggregate::aggregate;
use crate::credentials::CredentialStore;
use crate::models::{
    Credentials, Dashboard, PortalData, ProgressStage, SessionPhase, SessionState,
};
use crate::portal::{AttendancePortal, PortalError};
use chrono::Local;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("An attendance request is already in progress")]
    AttemptInProgress,
    #[error("Already signed in; refresh or log out first")]
    AlreadySignedIn,
    #[error("No stored credentials to refresh with")]
    NoStoredCredentials,
    #[error("Username and password are required")]
    MissingCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSchedule {
    pub logging_in: Duration,
    pub analyzing: Duration,
}

impl Default for ProgressSchedule {
    fn default() -> Self {
        Self {
            logging_in: Duration::from_secs(2),
            analyzing: Duration::from_secs(6),
        }
    }
}

impl ProgressSchedule {
    fn steps(&self) -> [(Duration, ProgressStage); 2] {
        [
            (self.logging_in, ProgressStage::LoggingIn),
            (self.analyzing, ProgressStage::Analyzing),
        ]
    }
}

#[derive(Default)]
struct Inflight {
    current: u64,
    request: Option<JoinHandle<()>>,
    progress: Option<JoinHandle<()>>,
}

impl Inflight {
    fn abort_all(&mut self) {
        if let Some(task) = self.request.take() {
            task.abort();
        }
        if let Some(task) = self.progress.take() {
            task.abort();
        }
    }
}

pub struct SessionController<P> {
    portal: P,
    store: CredentialStore,
    schedule: ProgressSchedule,
    state: watch::Sender<SessionState>,
    inflight: Mutex<Inflight>,
}

impl<P: AttendancePortal> SessionController<P> {
    pub fn new(portal: P, store: CredentialStore, schedule: ProgressSchedule) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::logged_out(0, false));
        Arc::new(Self {
            portal,
            store,
            schedule,
            state,
            inflight: Mutex::new(Inflight::default()),
        })
    }

    #[cfg(test)]
    fn portal(&self) -> &P {
        &self.portal
    }

    #[cfg(test)]
    fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub async fn settled(&self) -> SessionState {
        let mut receiver = self.subscribe();
        let settled = receiver
            .wait_for(|state| !state.phase.is_attempting())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.current())
    }

    pub async fn startup(self: &Arc<Self>) -> Option<u64> {
        let attempt = self.begin(None).await.ok()?;
        info!(attempt, "resuming stored session");
        Some(attempt)
    }

    pub async fn submit(self: &Arc<Self>, username: &str, password: &str) -> Result<u64, SessionError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        self.begin(Some(Credentials::new(username, password))).await
    }

    pub async fn refresh(self: &Arc<Self>) -> Result<u64, SessionError> {
        self.begin(None).await
    }

    pub async fn logout(&self) -> SessionState {
        let mut inflight = self.inflight.lock().await;
        inflight.current += 1;
        inflight.abort_all();
        self.store.clear().await;

        let state = SessionState::logged_out(inflight.current, false);
        self.state.send_replace(state.clone());
        info!(attempt = inflight.current, "logged out");
        state
    }

    // `None` means "use the stored pair"; it is read under the same lock as
    // logout so a concurrent logout cannot be undone by a stale read.
    async fn begin(
        self: &Arc<Self>,
        supplied: Option<Credentials>,
    ) -> Result<u64, SessionError> {
        let mut inflight = self.inflight.lock().await;
        let (busy, signed_in) = {
            let state = self.state.borrow();
            (
                state.phase.is_attempting(),
                matches!(state.phase, SessionPhase::Dashboard(_)),
            )
        };
        if busy {
            return Err(SessionError::AttemptInProgress);
        }

        let stored = self.store.load().await;
        let resumable = stored.is_some();
        let credentials = match supplied {
            Some(_) if signed_in => return Err(SessionError::AlreadySignedIn),
            Some(credentials) => credentials,
            None => stored.ok_or(SessionError::NoStoredCredentials)?,
        };

        inflight.current += 1;
        inflight.abort_all();
        let attempt = inflight.current;

        self.state.send_replace(SessionState {
            attempt,
            resumable,
            phase: SessionPhase::Attempting {
                username: credentials.username.clone(),
                progress: ProgressStage::Connecting.into(),
            },
        });
        info!(attempt, username = %credentials.username, "fetching attendance");

        inflight.progress = Some(tokio::spawn(Arc::clone(self).announce_progress(attempt)));
        inflight.request = Some(tokio::spawn(Arc::clone(self).run_attempt(attempt, credentials)));
        Ok(attempt)
    }

    async fn announce_progress(self: Arc<Self>, attempt: u64) {
        let started = Instant::now();
        for (offset, stage) in self.schedule.steps() {
            sleep_until(started + offset).await;
            let advanced = self.state.send_if_modified(|state| {
                if state.attempt != attempt {
                    return false;
                }
                match &mut state.phase {
                    SessionPhase::Attempting { progress, .. } => {
                        *progress = stage.into();
                        true
                    }
                    _ => false,
                }
            });
            if !advanced {
                return;
            }
            debug!(attempt, stage = stage.label(), "progress");
        }
    }

    async fn run_attempt(self: Arc<Self>, attempt: u64, credentials: Credentials) {
        let outcome = self.portal.fetch(&credentials).await;
        self.finish(attempt, credentials, outcome).await;
    }

    async fn finish(
        &self,
        attempt: u64,
        credentials: Credentials,
        outcome: Result<PortalData, PortalError>,
    ) {
        let mut inflight = self.inflight.lock().await;
        if inflight.current != attempt {
            debug!(attempt, current = inflight.current, "dropping superseded attempt");
            return;
        }
        if let Some(task) = inflight.progress.take() {
            task.abort();
        }
        inflight.request = None;

        let state = match outcome {
            Ok(data) => {
                self.store.save(&credentials.username, &credentials.password).await;
                let summary = aggregate(&data.records);
                info!(
                    attempt,
                    username = %credentials.username,
                    courses = summary.per_course.len(),
                    overall = summary.overall_percentage,
                    "attendance loaded"
                );
                SessionState {
                    attempt,
                    resumable: true,
                    phase: SessionPhase::Dashboard(Dashboard {
                        student_name: data.student_name,
                        username: credentials.username,
                        summary,
                        fetched_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                    }),
                }
            }
            Err(err) => {
                warn!(attempt, kind = ?err.kind, "attendance fetch failed: {}", err.message);
                if err.is_auth() {
                    self.store.clear().await;
                }
                SessionState {
                    attempt,
                    resumable: self.store.load().await.is_some(),
                    phase: SessionPhase::LoginError {
                        message: err.message,
                        kind: err.kind,
                    },
                }
            }
        };
        self.state.send_replace(state);
    }
}
