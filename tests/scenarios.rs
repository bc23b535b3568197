use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use skillswap_lib::content::{
    fallback, ContentError, ContentGenerator, ContentResult, ContentService,
};
use skillswap_lib::db::{seed, Database};
use skillswap_lib::matching::{compute_matches, MatchConfig, MatchFilter, SkillCategory};
use skillswap_lib::models::{
    LearningResource, QuizQuestion, RoadmapStep, SessionMode, Student,
};
use skillswap_lib::progress;
use skillswap_lib::session::{
    AnswerOutcome, SessionController, SessionEvent, SessionPhase, SESSION_DURATION_SECS,
};

/// Every call fails the way an unreachable API would.
struct UnreachableGenerator;

#[async_trait]
impl ContentGenerator for UnreachableGenerator {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn generate_quiz(&self, _skill: &str) -> ContentResult<Vec<QuizQuestion>> {
        Err(ContentError::Http {
            status: 503,
            body: "down".into(),
        })
    }

    async fn learning_roadmap(&self, _skill: &str) -> ContentResult<Vec<RoadmapStep>> {
        Err(ContentError::Empty)
    }

    async fn web_resources(&self, _skill: &str) -> ContentResult<Vec<LearningResource>> {
        Err(ContentError::Malformed("not json".into()))
    }

    async fn growth_insight(&self, _skills: &[String]) -> ContentResult<String> {
        Err(ContentError::MissingApiKey)
    }
}

fn student(id: &str, college: &str, strong: &[&str], weak: &[&str]) -> Student {
    Student {
        id: id.into(),
        college: college.into(),
        strong_skills: strong.iter().map(|s| s.to_string()).collect(),
        weak_skills: weak.iter().map(|s| s.to_string()).collect(),
        ..seed::students()[0].clone()
    }
}

#[test]
fn reciprocal_peers_score_full_marks() {
    let alex = student("a", "NIT", &["React", "Node.js"], &["C++", "Java"]);
    let priya = student("p", "IIT", &["C++", "Java"], &["React", "CSS"]);

    let matches = compute_matches(&alex, &[alex.clone(), priya], &MatchConfig::default());
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].match_percentage, 100);
    assert_eq!(matches[0].mutual_strong_skill, "C++");
    assert_eq!(matches[0].mutual_weak_skill, "React");
}

#[test]
fn one_sided_and_disjoint_peers() {
    let config = MatchConfig::default();
    let me = student("me", "NIT", &["Python"], &["Go"]);

    let tutor = student("t", "IIT", &["Go"], &["Rust"]);
    let stranger = student("x", "IIT", &["Figma"], &["SQL"]);
    let classmate = student("c", "NIT", &["Figma"], &["SQL"]);

    let ranked = compute_matches(&me, &[stranger, classmate, tutor], &config);
    let scores: Vec<(String, u8)> = ranked
        .iter()
        .map(|entry| (entry.partner.id.clone(), entry.match_percentage))
        .collect();
    assert_eq!(
        scores,
        vec![("t".into(), 60), ("c".into(), 5), ("x".into(), 0)]
    );
}

#[test]
fn seed_roster_filters_by_category() {
    let roster = seed::students();
    let alex = &roster[0];
    let ranked = compute_matches(alex, &roster, &MatchConfig::default());

    let design = MatchFilter::new(None, Some(SkillCategory::Design)).apply(ranked.clone());
    assert_eq!(design.len(), 1);
    assert_eq!(design[0].partner.id, "s4");

    let by_college = MatchFilter::new(Some("TECH".into()), None).apply(ranked);
    let ids: Vec<&str> = by_college.iter().map(|entry| entry.partner.id.as_str()).collect();
    assert_eq!(ids, vec!["s2", "s3"]);
}

#[tokio::test(start_paused = true)]
async fn unreachable_generator_still_completes_a_session() {
    let db = Database::open_in_memory().unwrap();
    db.init_defaults().await.unwrap();
    let alex = db.set_current_user("s1").await.unwrap().unwrap();

    let controller = SessionController::new(ContentService::new(Arc::new(UnreachableGenerator)));
    let mut events = controller.subscribe();

    let priya = seed::students()[1].clone();
    controller.open(priya, "C++").await.unwrap();
    controller.choose_mode(SessionMode::F2f).await.unwrap();

    // Let the countdown run out untouched.
    let mut expired = false;
    while !expired {
        if let SessionEvent::GradingStarted { expired: true, .. } = events.recv().await.unwrap() {
            expired = true;
        }
    }
    loop {
        if let SessionEvent::QuizReady { fallback, .. } = events.recv().await.unwrap() {
            assert!(fallback);
            break;
        }
    }

    let grading = controller.snapshot().await;
    assert_eq!(grading.phase, SessionPhase::Grading);
    assert_eq!(grading.roadmap, fallback::roadmap());
    assert_eq!(grading.resources, fallback::search_resources("C++"));

    let mut finished = None;
    for choice in [3, 1, 3] {
        let answered = controller.answer(choice).await.unwrap();
        if let AnswerOutcome::Completed { outcome, .. } = answered {
            finished = Some(outcome);
        }
    }
    let outcome = finished.expect("quiz should complete");
    assert_eq!(outcome.score, 3);

    let reward = progress::complete_session(&db, &outcome).await.unwrap().unwrap();
    assert_eq!(reward.xp_gained, 450);

    let updated = db.get_current_user().await.unwrap().unwrap();
    assert_eq!(updated.points, alex.points + 450);
    assert_eq!(updated.streak, alex.streak + 1);
    assert!((updated.skill_reputation - (alex.skill_reputation + 0.1)).abs() < 1e-9);
    assert_eq!(db.get_sessions().await.unwrap().len(), 1);

    // Nothing fires after the session is over.
    tokio::time::sleep(Duration::from_secs(SESSION_DURATION_SECS)).await;
    while let Ok(event) = events.try_recv() {
        assert!(!matches!(event, SessionEvent::Tick { .. }));
    }
}

#[tokio::test]
async fn store_survives_reopen_and_repeated_seeding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");

    {
        let db = Database::new(path.clone()).unwrap();
        db.init_defaults().await.unwrap();
        db.set_current_user("s3").await.unwrap();
        let mut michael = db.get_current_user().await.unwrap().unwrap();
        progress::apply_session_reward(&mut michael, 1);
        db.update_user(michael).await.unwrap();
    }

    let db = Database::new(path).unwrap();
    db.init_defaults().await.unwrap();
    db.init_defaults().await.unwrap();

    let students = db.get_students().await.unwrap();
    assert_eq!(students.len(), 4);
    let michael = db.get_current_user().await.unwrap().unwrap();
    assert_eq!(michael.id, "s3");
    assert_eq!(michael.points, seed::students()[2].points + 250);
}
