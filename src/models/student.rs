//! Student roster models.
//!
//! Field names serialize in camelCase so the persisted roster keeps the v1
//! blob layout (`college`, `branch`, `strongSkills`, `skillReputation`, ...).

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub type Skill = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Institution the student attends.
    pub college: String,
    /// Department / field of study.
    pub branch: String,
    pub year: u32,
    /// Skills the student can teach. Order matters for match fallbacks.
    pub strong_skills: Vec<Skill>,
    /// Skills the student wants to learn.
    pub weak_skills: Vec<Skill>,
    pub teaching_score: f64,
    pub learning_score: f64,
    pub skill_reputation: f64,
    pub points: u64,
    /// Display-only label; never recomputed from points.
    pub rank: String,
    pub avatar: String,
    #[serde(default)]
    pub badges: Vec<Badge>,
    pub streak: u32,
}

impl Student {
    /// Fresh onboarding profile with the defaults every new student starts from.
    pub fn new_profile(
        name: &str,
        college: &str,
        branch: &str,
        strong_skills: Vec<Skill>,
        weak_skills: Vec<Skill>,
    ) -> Self {
        Self {
            id: format!("user-{}", Utc::now().timestamp_millis()),
            name: name.to_string(),
            college: college.to_string(),
            branch: branch.to_string(),
            year: 1,
            strong_skills,
            weak_skills,
            teaching_score: 0.0,
            learning_score: 0.0,
            skill_reputation: 1.0,
            points: 0,
            rank: "Novice".into(),
            avatar: format!("https://api.dicebear.com/7.x/avataaars/svg?seed={name}"),
            badges: Vec::new(),
            streak: 0,
        }
    }

    /// Replace the editable profile fields, keeping stats and identity.
    pub fn update_profile(
        &mut self,
        name: &str,
        college: &str,
        branch: &str,
        strong_skills: Vec<Skill>,
        weak_skills: Vec<Skill>,
    ) {
        self.name = name.to_string();
        self.college = college.to_string();
        self.branch = branch.to_string();
        self.strong_skills = strong_skills;
        self.weak_skills = weak_skills;
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// A non-persisted pairing of the active student with one candidate partner.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub partner: Student,
    pub match_percentage: u8,
    /// What the partner can teach the active student.
    pub mutual_strong_skill: Skill,
    /// What the active student can teach the partner.
    pub mutual_weak_skill: Skill,
}

impl Match {
    pub fn is_reciprocal(&self, full_score: u8) -> bool {
        self.match_percentage >= full_score
    }
}
