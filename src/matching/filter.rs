use crate::matching::categories::{categorize, SkillCategory};
use crate::models::Match;

/// Search box plus optional category restriction for the match list.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub query: Option<String>,
    pub category: Option<SkillCategory>,
}

impl MatchFilter {
    pub fn new(query: Option<String>, category: Option<SkillCategory>) -> Self {
        Self { query, category }
    }

    /// Case-insensitive substring over partner name, strong skills and college.
    fn matches_query(&self, candidate: &Match) -> bool {
        let Some(query) = self.query.as_deref().map(str::trim) else {
            return true;
        };
        if query.is_empty() {
            return true;
        }

        let needle = query.to_lowercase();
        let partner = &candidate.partner;
        partner.name.to_lowercase().contains(&needle)
            || partner.college.to_lowercase().contains(&needle)
            || partner
                .strong_skills
                .iter()
                .any(|skill| skill.to_lowercase().contains(&needle))
    }

    fn matches_category(&self, candidate: &Match) -> bool {
        match self.category {
            None => true,
            Some(category) => candidate
                .partner
                .strong_skills
                .iter()
                .any(|skill| categorize(skill) == category),
        }
    }

    pub fn accepts(&self, candidate: &Match) -> bool {
        self.matches_query(candidate) && self.matches_category(candidate)
    }

    /// Keep accepted matches, preserving ranking order.
    pub fn apply(&self, matches: Vec<Match>) -> Vec<Match> {
        matches
            .into_iter()
            .filter(|candidate| self.accepts(candidate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;
    use crate::matching::{compute_matches, MatchConfig};

    fn alex_matches() -> Vec<Match> {
        let roster = seed::students();
        compute_matches(&roster[0], &roster, &MatchConfig::default())
    }

    fn ids(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.partner.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let all = alex_matches();
        assert_eq!(MatchFilter::default().apply(all.clone()), all);
        assert_eq!(
            MatchFilter::new(Some("   ".into()), None).apply(all.clone()),
            all
        );
    }

    #[test]
    fn query_hits_name_skill_and_college() {
        let by_name = MatchFilter::new(Some("priya".into()), None).apply(alex_matches());
        assert_eq!(ids(&by_name), vec!["s2"]);

        let by_skill = MatchFilter::new(Some("MACHINE".into()), None).apply(alex_matches());
        assert_eq!(ids(&by_skill), vec!["s3"]);

        let by_college =
            MatchFilter::new(Some("engineering inst".into()), None).apply(alex_matches());
        assert_eq!(ids(&by_college), vec!["s4"]);
    }

    #[test]
    fn category_restricts_results() {
        let design = MatchFilter::new(None, Some(SkillCategory::Design)).apply(alex_matches());
        assert_eq!(ids(&design), vec!["s4"]);

        let languages =
            MatchFilter::new(None, Some(SkillCategory::Languages)).apply(alex_matches());
        assert_eq!(ids(&languages), vec!["s2", "s3"]);

        let combined = MatchFilter::new(Some("chen".into()), Some(SkillCategory::Design))
            .apply(alex_matches());
        assert!(combined.is_empty());
    }
}
