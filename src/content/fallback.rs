//! Fixed content used whenever the generator cannot produce something usable.

use crate::models::{LearningResource, QuizQuestion, RoadmapStep};

pub const INSIGHT_ON_ERROR: &str = "Every session brings you closer to mastery. Keep it up!";
pub const INSIGHT_ON_EMPTY: &str = "Your learning momentum is high!";
pub const INSIGHT_ON_QUOTA: &str =
    "Your learning momentum is high! Consider switching to a personal API key for uninterrupted insights.";

const SEARCH_URL: &str = "https://www.google.com/search?q=";

fn question(text: String, options: [&str; 4], correct_index: usize) -> QuizQuestion {
    QuizQuestion {
        question: text,
        options: options.iter().map(|option| option.to_string()).collect(),
        correct_index,
    }
}

pub fn quiz(skill: &str) -> Vec<QuizQuestion> {
    vec![
        question(
            format!("Which of these is a core principle of {skill}?"),
            ["Abstraction", "Persistence", "Efficiency", "Modularity"],
            3,
        ),
        question(
            format!("In the context of {skill}, what does scalability refer to?"),
            [
                "Speed of development",
                "Handling increased load",
                "Code readability",
                "Security protocols",
            ],
            1,
        ),
        question(
            format!("What is the most common pitfall when starting with {skill}?"),
            [
                "Over-engineering",
                "Under-testing",
                "Ignoring documentation",
                "All of the above",
            ],
            3,
        ),
    ]
}

pub fn roadmap() -> Vec<RoadmapStep> {
    [
        ("Foundations", "Master the core syntax and basic architectural principles."),
        ("Implementation", "Build real-world components to test logic and flow."),
        ("Optimization", "Refine performance and apply advanced design patterns."),
        ("Mastery", "Contribute to ecosystem projects and mentor others."),
    ]
    .into_iter()
    .map(|(title, description)| RoadmapStep {
        title: title.into(),
        description: description.into(),
    })
    .collect()
}

fn search_link(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{SEARCH_URL}{encoded}")
}

/// Used when the resource lookup fails outright.
pub fn search_resources(skill: &str) -> Vec<LearningResource> {
    vec![LearningResource {
        title: format!("Search {skill} Resources"),
        uri: search_link(skill),
    }]
}

/// Used when the lookup succeeds but finds no links.
pub fn documentation_resources(skill: &str) -> Vec<LearningResource> {
    vec![LearningResource {
        title: format!("{skill} Documentation"),
        uri: search_link(&format!("{skill} docs")),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_mentions_skill_and_has_valid_answers() {
        let questions = quiz("Rust");
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.question.contains("Rust")));
        assert!(questions.iter().all(QuizQuestion::is_well_formed));
        let answers: Vec<usize> = questions.iter().map(|q| q.correct_index).collect();
        assert_eq!(answers, vec![3, 1, 3]);
    }

    #[test]
    fn roadmap_has_four_steps() {
        let titles: Vec<String> = roadmap().into_iter().map(|step| step.title).collect();
        assert_eq!(
            titles,
            vec!["Foundations", "Implementation", "Optimization", "Mastery"]
        );
    }

    #[test]
    fn resource_links_are_encoded() {
        let search = search_resources("C++");
        assert_eq!(search[0].title, "Search C++ Resources");
        assert_eq!(search[0].uri, "https://www.google.com/search?q=C%2B%2B");

        let docs = documentation_resources("System Design");
        assert_eq!(docs[0].title, "System Design Documentation");
        assert_eq!(
            docs[0].uri,
            "https://www.google.com/search?q=System+Design+docs"
        );
    }
}
