use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::content::ContentService;
use crate::models::{SessionMode, Student};
use crate::{log_debug, log_info, log_warn};

use super::state::{
    AnswerOutcome, SessionOutcome, SessionState, TickOutcome, SESSION_DURATION_SECS,
};

const ENABLE_LOGS: bool = true;
const EVENT_CAPACITY: usize = 2048;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    StateChanged { state: SessionState },
    #[serde(rename_all = "camelCase")]
    Tick {
        session_id: String,
        remaining_secs: u64,
    },
    #[serde(rename_all = "camelCase")]
    ContentReady {
        session_id: String,
        roadmap_fallback: bool,
        resources_fallback: bool,
    },
    #[serde(rename_all = "camelCase")]
    GradingStarted { session_id: String, expired: bool },
    #[serde(rename_all = "camelCase")]
    QuizReady {
        session_id: String,
        questions: usize,
        fallback: bool,
    },
    #[serde(rename_all = "camelCase")]
    Finished { outcome: SessionOutcome },
    #[serde(rename_all = "camelCase")]
    Aborted { session_id: String },
}

/// Drives one teaching session at a time: countdown, content fetches and quiz.
///
/// Cheap to clone; clones share the same session. Persistence is left to the
/// caller, which receives a [`SessionOutcome`] once the quiz is answered.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    content: ContentService,
    events: broadcast::Sender<SessionEvent>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    cancel_token: Arc<Mutex<Option<CancellationToken>>>,
    tick_interval: Duration,
    duration_secs: u64,
}

impl SessionController {
    pub fn new(content: ContentService) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            content,
            events,
            ticker: Arc::new(Mutex::new(None)),
            cancel_token: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            duration_secs: SESSION_DURATION_SECS,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Start mode selection with `partner` on `skill`.
    pub async fn open(&self, partner: Student, skill: &str) -> Result<SessionState> {
        let session_id = Uuid::new_v4().to_string();

        let snapshot = {
            let mut state = self.state.lock().await;
            state.open(
                session_id.clone(),
                partner,
                skill.to_string(),
                self.duration_secs,
            )?;
            state.clone()
        };

        *self.cancel_token.lock().await = Some(CancellationToken::new());
        log_info!("Session {} opened for {}", session_id, skill);
        self.emit(SessionEvent::StateChanged {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Lock in the mode, start the countdown and fetch roadmap and resources.
    pub async fn choose_mode(&self, mode: SessionMode) -> Result<SessionState> {
        let (snapshot, session_id, skill) = {
            let mut state = self.state.lock().await;
            state.choose_mode(mode, Utc::now())?;
            let session_id = state
                .session_id
                .clone()
                .ok_or_else(|| anyhow!("missing session id"))?;
            let skill = state.skill.clone().unwrap_or_default();
            (state.clone(), session_id, skill)
        };

        let token = self.session_token().await;
        self.spawn_ticker(session_id.clone(), token.clone()).await;
        self.spawn_content_fetch(session_id, skill, token);

        self.emit(SessionEvent::StateChanged {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Stop the countdown early and load the quiz. Returns false when the
    /// session had already left the countdown (for example it just expired).
    pub async fn end_early(&self) -> Result<bool> {
        let (entered, session_id) = {
            let mut state = self.state.lock().await;
            (state.begin_grading(), state.session_id.clone())
        };

        let Some(session_id) = session_id.filter(|_| entered) else {
            return Ok(false);
        };

        self.cancel_ticker().await;
        log_info!("Session {} ended early", session_id);
        self.emit(SessionEvent::GradingStarted {
            session_id: session_id.clone(),
            expired: false,
        });
        self.load_quiz(session_id).await;
        Ok(true)
    }

    pub async fn answer(&self, option_index: usize) -> Result<AnswerOutcome> {
        let outcome = self.state.lock().await.answer(option_index)?;

        if let AnswerOutcome::Completed { outcome, .. } = &outcome {
            log_info!(
                "Session {} finished with {}/{}",
                outcome.session_id,
                outcome.score,
                outcome.question_count
            );
            self.cancel_ticker().await;
            self.emit(SessionEvent::Finished {
                outcome: outcome.clone(),
            });
        }

        Ok(outcome)
    }

    /// Discard the session. In-flight fetches are cancelled and any late
    /// response is ignored.
    pub async fn abort(&self) -> Result<()> {
        let session_id = self.state.lock().await.abort()?;

        if let Some(token) = self.cancel_token.lock().await.take() {
            token.cancel();
        }
        self.cancel_ticker().await;

        log_info!("Session {} aborted", session_id);
        self.emit(SessionEvent::Aborted { session_id });
        Ok(())
    }

    /// Drop the loaded session in any phase and go back to idle. Used when the
    /// quiz can no longer be finished.
    pub async fn reset(&self) {
        if let Some(token) = self.cancel_token.lock().await.take() {
            token.cancel();
        }
        self.cancel_ticker().await;

        let snapshot = {
            let mut state = self.state.lock().await;
            if let Some(session_id) = state.session_id.as_deref() {
                log_warn!("Session {} reset before completion", session_id);
            }
            state.reset();
            state.clone()
        };
        self.emit(SessionEvent::StateChanged { state: snapshot });
    }

    async fn session_token(&self) -> CancellationToken {
        self.cancel_token
            .lock()
            .await
            .get_or_insert_with(CancellationToken::new)
            .clone()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn spawn_content_fetch(&self, session_id: String, skill: String, token: CancellationToken) {
        let controller = self.clone();

        tokio::spawn(async move {
            let fetch = async {
                tokio::join!(
                    controller.content.roadmap(&skill),
                    controller.content.resources(&skill)
                )
            };

            let (roadmap, resources) = tokio::select! {
                _ = token.cancelled() => {
                    log_debug!("Content fetch for {} cancelled", session_id);
                    return;
                }
                pair = fetch => pair,
            };

            let roadmap_fallback = roadmap.is_fallback();
            let resources_fallback = resources.is_fallback();
            let applied = controller.state.lock().await.apply_content(
                &session_id,
                roadmap.value,
                resources.value,
            );

            if applied {
                controller.emit(SessionEvent::ContentReady {
                    session_id,
                    roadmap_fallback,
                    resources_fallback,
                });
            } else {
                log_debug!("Discarding stale content for session {}", session_id);
            }
        });
    }

    async fn load_quiz(&self, session_id: String) {
        let token = self.session_token().await;
        let skill = self.state.lock().await.skill.clone().unwrap_or_default();

        let quiz = tokio::select! {
            _ = token.cancelled() => return,
            quiz = self.content.quiz(&skill) => quiz,
        };

        let fallback = quiz.is_fallback();
        let questions = quiz.value.len();
        let applied = self.state.lock().await.load_quiz(&session_id, quiz.value);

        if applied {
            self.emit(SessionEvent::QuizReady {
                session_id,
                questions,
                fallback,
            });
        } else {
            log_warn!("Quiz for session {} arrived after it was superseded", session_id);
        }
    }

    async fn spawn_ticker(&self, session_id: String, token: CancellationToken) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let controller = self.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let outcome = {
                    let mut state = controller.state.lock().await;
                    if state.session_id.as_deref() != Some(session_id.as_str()) {
                        break;
                    }
                    state.tick()
                };

                match outcome {
                    TickOutcome::Running(remaining_secs) => {
                        controller.emit(SessionEvent::Tick {
                            session_id: session_id.clone(),
                            remaining_secs,
                        });
                    }
                    TickOutcome::Expired => {
                        controller.emit(SessionEvent::Tick {
                            session_id: session_id.clone(),
                            remaining_secs: 0,
                        });
                        log_info!("Session {} countdown expired", session_id);
                        controller.emit(SessionEvent::GradingStarted {
                            session_id: session_id.clone(),
                            expired: true,
                        });
                        controller.load_quiz(session_id).await;
                        break;
                    }
                    TickOutcome::Ignored => break,
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}
