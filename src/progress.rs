use anyhow::{Context, Result};
use serde::Serialize;

use crate::db::Database;
use crate::log_info;
use crate::models::Student;
use crate::session::SessionOutcome;

const ENABLE_LOGS: bool = true;

pub const BASE_SESSION_XP: u64 = 150;
pub const XP_PER_CORRECT_ANSWER: u64 = 100;
pub const REPUTATION_STEP: f64 = 0.1;

/// Points earned for a session with `score` correct answers.
pub fn xp_for_score(score: u32) -> u64 {
    BASE_SESSION_XP + u64::from(score) * XP_PER_CORRECT_ANSWER
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionReward {
    pub xp_gained: u64,
    pub points: u64,
    pub streak: u32,
    pub skill_reputation: f64,
}

impl SessionReward {
    pub fn summary(&self) -> String {
        format!("Success! Gained {} XP and +{REPUTATION_STEP} Rep", self.xp_gained)
    }
}

/// Credit `student` for one completed session. Values only ever grow.
pub fn apply_session_reward(student: &mut Student, score: u32) -> SessionReward {
    let xp_gained = xp_for_score(score);
    student.points = student.points.saturating_add(xp_gained);
    student.streak = student.streak.saturating_add(1);
    student.skill_reputation += REPUTATION_STEP;

    SessionReward {
        xp_gained,
        points: student.points,
        streak: student.streak,
        skill_reputation: student.skill_reputation,
    }
}

/// Reward the signed-in student and append the session to the log in one
/// store write.
///
/// Returns `None` without touching the store when nobody is signed in.
pub async fn complete_session(
    db: &Database,
    outcome: &SessionOutcome,
) -> Result<Option<SessionReward>> {
    let score = outcome.score;
    let rewarded = db
        .record_session_for_current_user(outcome.record(), move |student| {
            (student.id.clone(), apply_session_reward(student, score))
        })
        .await
        .context("failed to record completed session")?;

    let Some((student_id, reward)) = rewarded else {
        return Ok(None);
    };

    log_info!(
        "Rewarded {} with {} XP for session {}",
        student_id,
        reward.xp_gained,
        outcome.session_id
    );
    Ok(Some(reward))
}
