use crate::matching::config::MatchConfig;
use crate::models::{Match, Skill, Student};

/// Shown when neither student lists anything usable.
pub const OPEN_TOPIC: &str = "Open Topic";

/// Score and skill pairing for one candidate against the active student.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    pub score: u8,
    pub teach_skill: Option<Skill>,
    pub learn_skill: Option<Skill>,
}

/// First skill in `offered` (in listed order) that appears in `wanted`.
fn first_overlap(offered: &[Skill], wanted: &[Skill]) -> Option<Skill> {
    offered
        .iter()
        .find(|skill| wanted.contains(skill))
        .cloned()
}

/// Weighted reciprocal overlap between `active` and `candidate`.
pub fn score_pair(active: &Student, candidate: &Student, config: &MatchConfig) -> PairScore {
    let teach_skill = first_overlap(&candidate.strong_skills, &active.weak_skills);
    let learn_skill = first_overlap(&active.strong_skills, &candidate.weak_skills);

    let mut score: u16 = 0;
    if teach_skill.is_some() {
        score += u16::from(config.teach_weight);
    }
    if learn_skill.is_some() {
        score += u16::from(config.learn_weight);
    }
    if !active.college.is_empty() && active.college == candidate.college {
        score += u16::from(config.same_college_bonus);
    }

    PairScore {
        score: score.min(u16::from(config.max_score)) as u8,
        teach_skill,
        learn_skill,
    }
}

fn pick_label(primary: Option<Skill>, fallbacks: [Option<&Skill>; 2]) -> Skill {
    primary
        .or_else(|| fallbacks.into_iter().flatten().next().cloned())
        .unwrap_or_else(|| OPEN_TOPIC.to_string())
}

/// Rank every other student in `roster` for `active`, best first.
///
/// The sort is stable, so equal scores keep roster order and repeated calls on
/// unchanged input return the same sequence. Every match carries displayable
/// skill labels even when there is no genuine overlap.
pub fn compute_matches(active: &Student, roster: &[Student], config: &MatchConfig) -> Vec<Match> {
    let mut matches: Vec<Match> = roster
        .iter()
        .filter(|candidate| candidate.id != active.id)
        .map(|candidate| {
            let pair = score_pair(active, candidate, config);
            Match {
                mutual_strong_skill: pick_label(
                    pair.teach_skill,
                    [candidate.strong_skills.first(), active.weak_skills.first()],
                ),
                mutual_weak_skill: pick_label(
                    pair.learn_skill,
                    [active.strong_skills.first(), candidate.weak_skills.first()],
                ),
                match_percentage: pair.score,
                partner: candidate.clone(),
            }
        })
        .collect();

    matches.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;

    fn student(id: &str, college: &str, strong: &[&str], weak: &[&str]) -> Student {
        let mut s = Student::new_profile(
            id,
            college,
            "CS",
            strong.iter().map(|x| x.to_string()).collect(),
            weak.iter().map(|x| x.to_string()).collect(),
        );
        s.id = id.to_string();
        s
    }

    #[test]
    fn alex_ranks_priya_first() {
        let roster = seed::students();
        let alex = roster[0].clone();

        let matches = compute_matches(&alex, &roster, &MatchConfig::default());

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].partner.id, "s2");
        assert!(matches[0].match_percentage > 0);
        assert!(["Data Structures", "C++"].contains(&matches[0].mutual_strong_skill.as_str()));
        assert_eq!(matches[0].mutual_weak_skill, "React");
        assert!(matches.iter().all(|m| m.partner.id != alex.id));
    }

    #[test]
    fn weights_follow_direction() {
        let config = MatchConfig::default();
        let me = student("me", "A", &["Rust"], &["Go"]);

        let teaches_me = student("t", "B", &["Go"], &[]);
        let learns_from_me = student("l", "B", &[], &["Rust"]);
        let both = student("b", "B", &["Go"], &["Rust"]);
        let both_same_college = student("c", "A", &["Go"], &["Rust"]);

        assert_eq!(score_pair(&me, &teaches_me, &config).score, 60);
        assert_eq!(score_pair(&me, &learns_from_me, &config).score, 40);
        assert_eq!(score_pair(&me, &both, &config).score, 100);
        assert_eq!(score_pair(&me, &both_same_college, &config).score, 100);
    }

    #[test]
    fn college_bonus_applies_without_overlap() {
        let config = MatchConfig::default();
        let me = student("me", "Tech University", &["Rust"], &["Go"]);
        let classmate = student("c", "Tech University", &["Haskell"], &["OCaml"]);
        let stranger = student("s", "Elsewhere", &["Haskell"], &["OCaml"]);

        assert_eq!(score_pair(&me, &classmate, &config).score, 5);
        assert_eq!(score_pair(&me, &stranger, &config).score, 0);
    }

    #[test]
    fn zero_match_still_has_labels() {
        let config = MatchConfig::default();
        let me = student("me", "A", &["Rust"], &["Go"]);
        let other = student("o", "B", &["Haskell"], &["OCaml"]);
        let blank = student("x", "B", &[], &[]);
        let nobody = student("n", "A", &[], &[]);

        let matches = compute_matches(&me, &[other, blank.clone()], &config);
        assert_eq!(matches[0].match_percentage, 0);
        assert_eq!(matches[0].mutual_strong_skill, "Haskell");
        assert_eq!(matches[0].mutual_weak_skill, "Rust");
        assert_eq!(matches[1].mutual_strong_skill, "Go");

        let empty = compute_matches(&nobody, &[blank], &config);
        assert_eq!(empty[0].mutual_strong_skill, OPEN_TOPIC);
        assert_eq!(empty[0].mutual_weak_skill, OPEN_TOPIC);
    }

    #[test]
    fn ties_keep_roster_order_and_are_repeatable() {
        let config = MatchConfig::default();
        let me = student("me", "A", &["Rust"], &["Go"]);
        let roster = vec![
            student("a", "B", &["Java"], &[]),
            student("b", "B", &["Go"], &[]),
            student("c", "B", &["Perl"], &[]),
            student("d", "B", &["Go"], &[]),
        ];

        let first = compute_matches(&me, &roster, &config);
        let order: Vec<&str> = first.iter().map(|m| m.partner.id.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
        assert_eq!(compute_matches(&me, &roster, &config), first);
    }

    #[test]
    fn scores_stay_in_range() {
        let config = MatchConfig {
            teach_weight: 90,
            learn_weight: 90,
            same_college_bonus: 90,
            max_score: 100,
        };
        let roster = seed::students();
        for active in &roster {
            for m in compute_matches(active, &roster, &config) {
                assert!(m.match_percentage <= 100);
            }
        }
    }

    #[test]
    fn empty_roster_yields_no_matches() {
        let me = student("me", "A", &["Rust"], &["Go"]);
        assert!(compute_matches(&me, &[me.clone()], &MatchConfig::default()).is_empty());
    }
}
