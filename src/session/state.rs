use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    LearningResource, QuizQuestion, RoadmapStep, SessionMode, SessionRecord, Student,
};

/// Length of the teaching countdown.
pub const SESSION_DURATION_SECS: u64 = 15 * 60;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    Idle,
    ModeSelection,
    Active,
    Grading,
    Finished,
    Aborted,
}

impl SessionPhase {
    /// A session exists and has not reached a terminal phase.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SessionPhase::ModeSelection | SessionPhase::Active | SessionPhase::Grading
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown still running with this many seconds left.
    Running(u64),
    /// Countdown reached zero and the session moved to grading.
    Expired,
    /// No countdown in progress.
    Ignored,
}

/// Result of a finished quiz, handed to whoever applies rewards.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub session_id: String,
    pub partner_id: String,
    pub skill: String,
    pub mode: SessionMode,
    pub score: u32,
    pub question_count: usize,
    pub finished_at: DateTime<Utc>,
}

impl SessionOutcome {
    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            id: self.session_id.clone(),
            partner_id: self.partner_id.clone(),
            skill: self.skill.clone(),
            timestamp: self.finished_at,
            mode: self.mode,
            score: self.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Next { correct: bool, next_index: usize },
    Completed { correct: bool, outcome: SessionOutcome },
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: SessionPhase,
    pub session_id: Option<String>,
    pub partner: Option<Student>,
    pub skill: Option<String>,
    pub mode: Option<SessionMode>,
    pub started_at: Option<DateTime<Utc>>,
    pub remaining_secs: u64,
    pub roadmap: Vec<RoadmapStep>,
    pub resources: Vec<LearningResource>,
    pub loading_content: bool,
    pub quiz: Vec<QuizQuestion>,
    pub loading_quiz: bool,
    pub question_index: usize,
    pub correct_answers: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_session(&self, session_id: &str) -> bool {
        self.session_id.as_deref() == Some(session_id)
    }

    pub fn open(
        &mut self,
        session_id: String,
        partner: Student,
        skill: String,
        duration_secs: u64,
    ) -> Result<()> {
        if self.phase.is_in_flight() {
            bail!("a session is already in progress");
        }

        *self = Self {
            phase: SessionPhase::ModeSelection,
            session_id: Some(session_id),
            partner: Some(partner),
            skill: Some(skill),
            remaining_secs: duration_secs,
            ..Self::default()
        };
        Ok(())
    }

    /// Pick the mode once and start the countdown.
    pub fn choose_mode(&mut self, mode: SessionMode, now: DateTime<Utc>) -> Result<()> {
        if self.phase != SessionPhase::ModeSelection {
            bail!("mode can only be chosen before the session starts");
        }

        self.mode = Some(mode);
        self.started_at = Some(now);
        self.phase = SessionPhase::Active;
        self.loading_content = true;
        Ok(())
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::Active {
            return TickOutcome::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.begin_grading();
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining_secs)
        }
    }

    /// The single exit from `Active`. Returns false if the session already left
    /// it, so expiry and manual termination can both fire safely.
    pub fn begin_grading(&mut self) -> bool {
        if self.phase != SessionPhase::Active {
            return false;
        }

        self.phase = SessionPhase::Grading;
        self.loading_quiz = true;
        true
    }

    /// Attach roadmap and resources. Ignored for any other session.
    pub fn apply_content(
        &mut self,
        session_id: &str,
        roadmap: Vec<RoadmapStep>,
        resources: Vec<LearningResource>,
    ) -> bool {
        if !self.is_session(session_id) || !self.phase.is_in_flight() {
            return false;
        }

        self.roadmap = roadmap;
        self.resources = resources;
        self.loading_content = false;
        true
    }

    pub fn load_quiz(&mut self, session_id: &str, questions: Vec<QuizQuestion>) -> bool {
        if !self.is_session(session_id)
            || self.phase != SessionPhase::Grading
            || !self.loading_quiz
            || questions.is_empty()
        {
            return false;
        }

        self.quiz = questions;
        self.loading_quiz = false;
        self.question_index = 0;
        self.correct_answers = 0;
        true
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.phase != SessionPhase::Grading || self.loading_quiz {
            return None;
        }
        self.quiz.get(self.question_index)
    }

    pub fn answer(&mut self, option_index: usize) -> Result<AnswerOutcome> {
        let question = self
            .current_question()
            .ok_or_else(|| anyhow!("no quiz question is awaiting an answer"))?;

        let correct = option_index == question.correct_index;
        if correct {
            self.correct_answers += 1;
        }
        self.question_index += 1;

        if self.question_index < self.quiz.len() {
            return Ok(AnswerOutcome::Next {
                correct,
                next_index: self.question_index,
            });
        }

        self.phase = SessionPhase::Finished;
        let outcome = SessionOutcome {
            session_id: self.session_id.clone().unwrap_or_default(),
            partner_id: self
                .partner
                .as_ref()
                .map(|partner| partner.id.clone())
                .unwrap_or_default(),
            skill: self.skill.clone().unwrap_or_default(),
            mode: self
                .mode
                .ok_or_else(|| anyhow!("finished session has no mode"))?,
            score: self.correct_answers,
            question_count: self.quiz.len(),
            finished_at: Utc::now(),
        };

        Ok(AnswerOutcome::Completed { correct, outcome })
    }

    /// Discard the session. Only allowed before grading starts.
    pub fn abort(&mut self) -> Result<String> {
        if !matches!(
            self.phase,
            SessionPhase::ModeSelection | SessionPhase::Active
        ) {
            bail!("only a session that has not reached its quiz can be aborted");
        }

        let session_id = self.session_id.take().unwrap_or_default();
        *self = Self {
            phase: SessionPhase::Aborted,
            ..Self::default()
        };
        Ok(session_id)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback;
    use crate::db::seed;

    fn opened(duration_secs: u64) -> SessionState {
        let mut state = SessionState::new();
        let partner = seed::students()[1].clone();
        state
            .open("sess-1".into(), partner, "C++".into(), duration_secs)
            .unwrap();
        state
    }

    fn active(duration_secs: u64) -> SessionState {
        let mut state = opened(duration_secs);
        state.choose_mode(SessionMode::F2f, Utc::now()).unwrap();
        state
    }

    #[test]
    fn mode_is_chosen_once() {
        let mut state = opened(SESSION_DURATION_SECS);
        assert_eq!(state.phase, SessionPhase::ModeSelection);
        assert_eq!(state.tick(), TickOutcome::Ignored);

        state.choose_mode(SessionMode::Online, Utc::now()).unwrap();
        assert_eq!(state.phase, SessionPhase::Active);
        assert!(state.loading_content);
        assert!(state.choose_mode(SessionMode::F2f, Utc::now()).is_err());
        assert_eq!(state.mode, Some(SessionMode::Online));
    }

    #[test]
    fn countdown_expires_into_grading_once() {
        let mut state = active(SESSION_DURATION_SECS);

        for expected in (1..SESSION_DURATION_SECS).rev() {
            assert_eq!(state.tick(), TickOutcome::Running(expected));
        }
        assert_eq!(state.tick(), TickOutcome::Expired);
        assert_eq!(state.phase, SessionPhase::Grading);

        assert!(!state.begin_grading());
        assert_eq!(state.tick(), TickOutcome::Ignored);
        assert_eq!(state.remaining_secs, 0);
    }

    #[test]
    fn manual_end_stops_the_countdown() {
        let mut state = active(SESSION_DURATION_SECS);
        state.tick();
        assert!(state.begin_grading());
        assert_eq!(state.tick(), TickOutcome::Ignored);
        assert_eq!(state.remaining_secs, SESSION_DURATION_SECS - 1);
    }

    #[test]
    fn content_for_other_sessions_is_ignored() {
        let mut state = active(60);
        assert!(!state.apply_content("stale", fallback::roadmap(), Vec::new()));
        assert!(state.loading_content);

        assert!(state.apply_content("sess-1", fallback::roadmap(), Vec::new()));
        assert!(!state.loading_content);
        assert_eq!(state.roadmap.len(), 4);
    }

    #[test]
    fn quiz_scores_correct_answers() {
        let mut state = active(60);
        assert!(state.answer(0).is_err());
        assert!(!state.load_quiz("sess-1", fallback::quiz("C++")));

        state.begin_grading();
        assert!(state.current_question().is_none());
        assert!(state.load_quiz("sess-1", fallback::quiz("C++")));

        assert_eq!(
            state.answer(3).unwrap(),
            AnswerOutcome::Next {
                correct: true,
                next_index: 1
            }
        );
        assert_eq!(
            state.answer(0).unwrap(),
            AnswerOutcome::Next {
                correct: false,
                next_index: 2
            }
        );

        match state.answer(3).unwrap() {
            AnswerOutcome::Completed { correct, outcome } => {
                assert!(correct);
                assert_eq!(outcome.score, 2);
                assert_eq!(outcome.question_count, 3);
                assert_eq!(outcome.partner_id, "s2");
                assert_eq!(outcome.record().mode, SessionMode::F2f);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(state.phase, SessionPhase::Finished);
        assert!(state.answer(0).is_err());
    }

    #[test]
    fn abort_only_before_grading() {
        let mut selecting = opened(60);
        assert_eq!(selecting.abort().unwrap(), "sess-1");
        assert_eq!(selecting.phase, SessionPhase::Aborted);
        assert!(selecting.session_id.is_none());

        let mut running = active(60);
        running.abort().unwrap();
        assert!(!running.apply_content("sess-1", fallback::roadmap(), Vec::new()));

        let mut grading = active(60);
        grading.begin_grading();
        assert!(grading.abort().is_err());
        assert_eq!(grading.phase, SessionPhase::Grading);
    }

    #[test]
    fn cannot_open_twice() {
        let mut state = opened(60);
        let partner = seed::students()[2].clone();
        assert!(state
            .open("sess-2".into(), partner.clone(), "Python".into(), 60)
            .is_err());

        state.abort().unwrap();
        state.open("sess-2".into(), partner, "Python".into(), 60).unwrap();
        assert_eq!(state.session_id.as_deref(), Some("sess-2"));
    }
}
