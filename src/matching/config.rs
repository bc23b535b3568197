/// Weights for the reciprocal skill-overlap score.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Awarded when the candidate can teach something the active student wants.
    pub teach_weight: u8,

    /// Awarded when the active student can teach something the candidate wants.
    pub learn_weight: u8,

    /// Awarded when both students attend the same college.
    pub same_college_bonus: u8,

    /// Upper clamp for the final score.
    pub max_score: u8,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            teach_weight: 60,
            learn_weight: 40,
            same_college_bonus: 5,
            max_score: 100,
        }
    }
}

impl MatchConfig {
    /// Score of a fully reciprocal swap, before any bonus.
    pub fn reciprocal_score(&self) -> u8 {
        self.teach_weight
            .saturating_add(self.learn_weight)
            .min(self.max_score)
    }
}
