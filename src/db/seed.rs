//! Starter roster written the first time a store is opened.

use crate::models::{Badge, Student};

fn badge(id: &str, name: &str, icon: &str, description: &str) -> Badge {
    Badge {
        id: id.into(),
        name: name.into(),
        icon: icon.into(),
        description: description.into(),
    }
}

pub fn badges() -> Vec<Badge> {
    vec![
        badge("b1", "Eagle Eye", "🦅", "Spotting 10 errors in sessions"),
        badge("b2", "Master Tutor", "🏆", "Taught over 50 hours"),
        badge("b3", "Knowledge Sponge", "🧽", "Learned 5 new skills"),
        badge("b4", "Streak King", "🔥", "7-day learning streak"),
    ]
}

fn skills(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn students() -> Vec<Student> {
    let badges = badges();

    vec![
        Student {
            id: "s1".into(),
            name: "Alex Johnson".into(),
            college: "Engineering Institute".into(),
            branch: "Computer Science".into(),
            year: 3,
            strong_skills: skills(&["React", "Node.js", "Tailwind"]),
            weak_skills: skills(&["Data Structures", "C++", "System Design"]),
            teaching_score: 4.8,
            learning_score: 4.5,
            skill_reputation: 4.0,
            points: 1250,
            rank: "Pro".into(),
            avatar: "https://picsum.photos/200/200?random=1".into(),
            badges: vec![badges[0].clone(), badges[1].clone()],
            streak: 5,
        },
        Student {
            id: "s2".into(),
            name: "Priya Sharma".into(),
            college: "Tech University".into(),
            branch: "Information Technology".into(),
            year: 2,
            strong_skills: skills(&["Data Structures", "C++", "Java"]),
            weak_skills: skills(&["React", "CSS", "Figma"]),
            teaching_score: 4.9,
            learning_score: 4.7,
            skill_reputation: 5.0,
            points: 1400,
            rank: "Expert".into(),
            avatar: "https://picsum.photos/200/200?random=2".into(),
            badges: vec![badges[2].clone(), badges[3].clone()],
            streak: 12,
        },
        Student {
            id: "s3".into(),
            name: "Michael Chen".into(),
            college: "State Tech".into(),
            branch: "Software Engineering".into(),
            year: 4,
            strong_skills: skills(&["System Design", "Python", "Machine Learning"]),
            weak_skills: skills(&["Node.js", "TypeScript"]),
            teaching_score: 4.6,
            learning_score: 4.8,
            skill_reputation: 3.0,
            points: 900,
            rank: "Apprentice".into(),
            avatar: "https://picsum.photos/200/200?random=3".into(),
            badges: vec![badges[1].clone()],
            streak: 3,
        },
        Student {
            id: "s4".into(),
            name: "Sarah Miller".into(),
            college: "Engineering Institute".into(),
            branch: "AI & DS".into(),
            year: 1,
            strong_skills: skills(&["Figma", "UI Design", "HTML"]),
            weak_skills: skills(&["Python", "SQL"]),
            teaching_score: 4.2,
            learning_score: 4.9,
            skill_reputation: 4.0,
            points: 500,
            rank: "Novice".into(),
            avatar: "https://picsum.photos/200/200?random=4".into(),
            badges: Vec::new(),
            streak: 1,
        },
    ]
}
