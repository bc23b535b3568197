//! Command-line front end. Each subcommand loads what it needs from
//! [`AppState`] and prints a plain-text view to stdout; diagnostics go
//! through the logger on stderr.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::broadcast::error::RecvError;

use crate::db::Theme;
use crate::matching::{compute_matches, MatchFilter, SkillCategory};
use crate::models::{LearningResource, Match, RoadmapStep, SessionMode, Student};
use crate::progress::{self, SessionReward};
use crate::session::{AnswerOutcome, SessionEvent, SessionPhase};
use crate::settings::ContentSettings;
use crate::{log_debug, log_warn, AppState};

const ENABLE_LOGS: bool = true;

const ONBOARDING_HINT: &str =
    "No student is signed in. Run `skillswap register` or `skillswap login <id>` first.";

#[derive(Debug, Parser)]
#[command(name = "skillswap", version, about = "Find peers to swap skills with")]
pub struct Cli {
    /// Directory holding the store and settings.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the signed-in student.
    Profile,
    /// Create a profile, or edit the signed-in one.
    Register(RegisterArgs),
    /// Sign in as an existing student.
    Login { id: String },
    Logout,
    /// Ranked peers for the signed-in student.
    Matches {
        #[arg(short, long)]
        query: Option<String>,
        /// languages, web, fundamentals, data-ai, design or other.
        #[arg(short, long)]
        category: Option<String>,
    },
    Leaderboard,
    /// A short motivational note based on what you are learning.
    Insight,
    /// Show or set the colour theme.
    Theme { theme: Option<String> },
    /// Completed sessions, oldest first.
    History {
        /// Only sessions with this partner id.
        #[arg(long)]
        partner: Option<String>,
    },
    /// Run a timed teaching session with a partner.
    Session(SessionArgs),
    /// Show or change content generator settings.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub college: String,
    #[arg(long, default_value = "")]
    pub branch: String,
    /// Comma-separated skills you can teach.
    #[arg(long, value_delimiter = ',')]
    pub strong: Vec<String>,
    /// Comma-separated skills you want to learn.
    #[arg(long, value_delimiter = ',')]
    pub weak: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Partner student id.
    #[arg(long)]
    pub partner: String,
    /// Skill to cover; defaults to what the partner can teach you.
    #[arg(long)]
    pub skill: Option<String>,
    /// f2f or online.
    #[arg(long)]
    pub mode: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

pub async fn dispatch(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Profile => show_profile(state).await,
        Command::Register(args) => register(state, args).await,
        Command::Login { id } => login(state, &id).await,
        Command::Logout => {
            state.db.logout().await?;
            println!("Signed out.");
            Ok(())
        }
        Command::Matches { query, category } => show_matches(state, query, category).await,
        Command::Leaderboard => show_leaderboard(state).await,
        Command::Insight => show_insight(state).await,
        Command::Theme { theme } => theme_command(state, theme).await,
        Command::History { partner } => show_history(state, partner.as_deref()).await,
        Command::Session(args) => {
            let stdin = BufReader::new(tokio::io::stdin());
            run_session(state, args, stdin).await.map(|_| ())
        }
        Command::Config(args) => config_command(state, args),
    }
}

fn clean_skills(skills: Vec<String>) -> Vec<String> {
    skills
        .into_iter()
        .map(|skill| skill.trim().to_string())
        .filter(|skill| !skill.is_empty())
        .collect()
}

async fn show_profile(state: &AppState) -> Result<()> {
    let Some(student) = state.db.get_current_user().await? else {
        println!("{ONBOARDING_HINT}");
        return Ok(());
    };

    println!("{} ({})", student.name, student.id);
    println!("  {} / {} / year {}", student.college, student.branch, student.year);
    println!("  Teaches: {}", student.strong_skills.join(", "));
    println!("  Learning: {}", student.weak_skills.join(", "));
    println!(
        "  {} XP | rank {} | reputation {:.1} | streak {}",
        student.points, student.rank, student.skill_reputation, student.streak
    );
    if !student.badges.is_empty() {
        let badges: Vec<String> = student
            .badges
            .iter()
            .map(|badge| format!("{} {}", badge.icon, badge.name))
            .collect();
        println!("  Badges: {}", badges.join(", "));
    }
    Ok(())
}

/// Create a new profile or edit the signed-in one; the result becomes current.
pub async fn register_profile(state: &AppState, args: RegisterArgs) -> Result<Student> {
    let name = args.name.trim();
    let college = args.college.trim();
    if name.is_empty() || college.is_empty() {
        bail!("name and college are required");
    }

    let strong = clean_skills(args.strong);
    let weak = clean_skills(args.weak);

    let student = match state.db.get_current_user().await? {
        Some(mut existing) => {
            existing.update_profile(name, college, args.branch.trim(), strong, weak);
            existing
        }
        None => Student::new_profile(name, college, args.branch.trim(), strong, weak),
    };

    state
        .db
        .update_user(student.clone())
        .await
        .context("failed to save profile")?;
    Ok(student)
}

async fn register(state: &AppState, args: RegisterArgs) -> Result<()> {
    let student = register_profile(state, args).await?;
    println!("Welcome, {}! Your id is {}.", student.first_name(), student.id);
    Ok(())
}

async fn login(state: &AppState, id: &str) -> Result<()> {
    match state.db.set_current_user(id).await? {
        Some(student) => {
            println!("Signed in as {}.", student.name);
            Ok(())
        }
        None => bail!("no student with id '{id}'"),
    }
}

/// Ranked, filtered matches for the signed-in student; `None` when nobody is.
pub async fn matches_for_current_user(
    state: &AppState,
    filter: &MatchFilter,
) -> Result<Option<Vec<Match>>> {
    let Some(active) = state.db.get_current_user().await? else {
        return Ok(None);
    };

    let roster = state.db.get_students().await?;
    let ranked = compute_matches(&active, &roster, &state.match_config);
    Ok(Some(filter.apply(ranked)))
}

async fn show_matches(
    state: &AppState,
    query: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let category = category
        .as_deref()
        .map(str::parse::<SkillCategory>)
        .transpose()?;
    let filter = MatchFilter::new(query, category);

    let Some(matches) = matches_for_current_user(state, &filter).await? else {
        println!("{ONBOARDING_HINT}");
        return Ok(());
    };

    if matches.is_empty() {
        println!("No matches found.");
        return Ok(());
    }

    let full = state.match_config.reciprocal_score();
    for entry in &matches {
        let marker = if entry.is_reciprocal(full) { "*" } else { " " };
        println!(
            "{marker}{:>3}%  {:<16} {:<5} {}",
            entry.match_percentage, entry.partner.name, entry.partner.id, entry.partner.college
        );
        println!(
            "       teaches you {} | learns {}",
            entry.mutual_strong_skill, entry.mutual_weak_skill
        );
    }
    Ok(())
}

async fn show_leaderboard(state: &AppState) -> Result<()> {
    let current_id = state.db.get_current_user().await?.map(|student| student.id);

    for (position, student) in state.db.leaderboard().await?.iter().enumerate() {
        let you = if current_id.as_deref() == Some(student.id.as_str()) {
            " (you)"
        } else {
            ""
        };
        println!(
            "{:>2}. {:<16} {:>6} XP  {}{you}",
            position + 1,
            student.name,
            student.points,
            student.rank
        );
    }
    Ok(())
}

/// Dashboard insight over everything the signed-in student teaches and learns.
pub async fn insight_for_current_user(state: &AppState) -> Result<Option<String>> {
    let Some(student) = state.db.get_current_user().await? else {
        return Ok(None);
    };

    let skills: Vec<String> = student
        .strong_skills
        .iter()
        .chain(&student.weak_skills)
        .cloned()
        .collect();
    Ok(Some(state.content.insight(&skills).await.value))
}

async fn show_insight(state: &AppState) -> Result<()> {
    match insight_for_current_user(state).await? {
        Some(insight) => println!("{insight}"),
        None => println!("{ONBOARDING_HINT}"),
    }
    Ok(())
}

async fn theme_command(state: &AppState, theme: Option<String>) -> Result<()> {
    match theme {
        Some(value) => {
            let theme: Theme = value.parse()?;
            state.db.set_theme(theme).await?;
            println!("Theme set to {}.", theme.as_str());
        }
        None => println!("{}", state.db.get_theme().await?.as_str()),
    }
    Ok(())
}

async fn show_history(state: &AppState, partner: Option<&str>) -> Result<()> {
    let sessions = match partner {
        Some(partner_id) => state.db.sessions_for_partner(partner_id).await?,
        None => state.db.get_sessions().await?,
    };
    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    let roster = state.db.get_students().await?;
    for record in &sessions {
        let partner = roster
            .iter()
            .find(|student| student.id == record.partner_id)
            .map(|student| student.name.as_str())
            .unwrap_or(record.partner_id.as_str());
        println!(
            "{}  {:<6} {:<12} with {:<16} score {}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.mode,
            record.skill,
            partner,
            record.score
        );
    }
    Ok(())
}

fn config_command(state: &AppState, args: ConfigArgs) -> Result<()> {
    let current = state.settings.content();

    if args.model.is_none() && args.base_url.is_none() && args.timeout_secs.is_none() {
        print_content_settings(&current);
        return Ok(());
    }

    let updated = ContentSettings {
        model: args.model.unwrap_or(current.model),
        base_url: args.base_url.unwrap_or(current.base_url),
        request_timeout_secs: args.timeout_secs.unwrap_or(current.request_timeout_secs),
    };
    state.settings.update_content(updated.clone())?;
    println!("Saved to {}.", state.settings.path().display());
    print_content_settings(&updated);
    Ok(())
}

fn print_content_settings(settings: &ContentSettings) {
    println!("model:   {}", settings.model);
    println!("baseUrl: {}", settings.base_url);
    println!("timeout: {}s", settings.request_timeout_secs);
}

enum ActivePhaseExit {
    Grading,
    Aborted,
}

async fn next_line<R: AsyncBufRead + Unpin>(input: &mut Lines<R>) -> Result<Option<String>> {
    let line = input.next_line().await.context("failed to read input")?;
    Ok(line.map(|line| line.trim().to_string()))
}

/// Run one session end to end, reading commands and quiz answers from `input`.
///
/// Returns the reward, or `None` when the session was aborted or nobody is
/// signed in.
pub async fn run_session<R>(
    state: &AppState,
    args: SessionArgs,
    input: R,
) -> Result<Option<SessionReward>>
where
    R: AsyncBufRead + Unpin,
{
    let Some(active) = state.db.get_current_user().await? else {
        println!("{ONBOARDING_HINT}");
        return Ok(None);
    };

    let mode: SessionMode = args.mode.parse()?;
    if args.partner == active.id {
        bail!("you cannot run a session with yourself");
    }
    let partner = state
        .db
        .get_students()
        .await?
        .into_iter()
        .find(|student| student.id == args.partner)
        .ok_or_else(|| anyhow!("no student with id '{}'", args.partner))?;

    let skill = match args.skill.map(|skill| skill.trim().to_string()) {
        Some(skill) if !skill.is_empty() => skill,
        _ => compute_matches(&active, std::slice::from_ref(&partner), &state.match_config)
            .into_iter()
            .next()
            .map(|entry| entry.mutual_strong_skill)
            .ok_or_else(|| anyhow!("could not pick a skill for this session"))?,
    };

    let controller = &state.sessions;
    let mut events = controller.subscribe();
    let mut input = input.lines();

    controller.open(partner.clone(), &skill).await?;
    let started = controller.choose_mode(mode).await?;
    println!(
        "{} session with {} on {} started: {} minutes on the clock.",
        mode,
        partner.first_name(),
        skill,
        started.remaining_secs / 60
    );
    println!("Type `end` to finish early or `abort` to cancel.");

    let mut stdin_open = true;
    let exit = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SessionEvent::Tick { remaining_secs, .. }) => {
                    if remaining_secs > 0 && remaining_secs % 60 == 0 {
                        println!("{} minutes left.", remaining_secs / 60);
                    }
                }
                Ok(SessionEvent::ContentReady { .. }) => {
                    let snapshot = controller.snapshot().await;
                    print_content(&snapshot.roadmap, &snapshot.resources);
                }
                Ok(SessionEvent::GradingStarted { expired: true, .. }) => {
                    println!("Time's up!");
                    break ActivePhaseExit::Grading;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => log_debug!("Skipped {} session events", skipped),
                Err(RecvError::Closed) => bail!("session event channel closed"),
            },
            line = next_line(&mut input), if stdin_open => match line?.as_deref() {
                Some("end") => {
                    if controller.end_early().await? {
                        break ActivePhaseExit::Grading;
                    }
                }
                Some("abort") => {
                    controller.abort().await?;
                    break ActivePhaseExit::Aborted;
                }
                Some(_) => println!("Type `end` or `abort`."),
                None => {
                    // Nobody left to type `end`; let the countdown run out.
                    stdin_open = false;
                }
            },
        }
    };

    if let ActivePhaseExit::Aborted = exit {
        println!("Session aborted. Nothing was recorded.");
        return Ok(None);
    }

    let graded = match wait_for_quiz(state, &mut events).await {
        Ok(()) => run_quiz(state, &mut input).await,
        Err(err) => Err(err),
    };
    if graded.is_err() {
        // An unfinished quiz cannot be aborted; clear it so a new session can open.
        controller.reset().await;
    }
    graded
}

fn print_content(roadmap: &[RoadmapStep], resources: &[LearningResource]) {
    println!("\nRoadmap:");
    for (index, step) in roadmap.iter().enumerate() {
        println!("  {}. {}: {}", index + 1, step.title, step.description);
    }
    println!("Resources:");
    for resource in resources {
        println!("  - {} <{}>", resource.title, resource.uri);
    }
    println!();
}

async fn wait_for_quiz(
    state: &AppState,
    events: &mut tokio::sync::broadcast::Receiver<SessionEvent>,
) -> Result<()> {
    loop {
        let snapshot = state.sessions.snapshot().await;
        if snapshot.phase == SessionPhase::Grading && !snapshot.loading_quiz {
            return Ok(());
        }
        if snapshot.phase != SessionPhase::Grading {
            bail!("session left grading before the quiz loaded");
        }

        match events.recv().await {
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => bail!("session event channel closed"),
        }
    }
}

async fn run_quiz<R: AsyncBufRead + Unpin>(
    state: &AppState,
    input: &mut Lines<R>,
) -> Result<Option<SessionReward>> {
    let controller = &state.sessions;

    loop {
        let snapshot = controller.snapshot().await;
        let Some(question) = snapshot.current_question() else {
            bail!("no quiz question available");
        };

        println!(
            "\nQ{}. {}",
            snapshot.question_index + 1,
            question.question
        );
        for (index, option) in question.options.iter().enumerate() {
            println!("  {}) {}", index + 1, option);
        }

        let choice = loop {
            let Some(line) = next_line(input).await? else {
                bail!("input closed before the quiz was finished");
            };
            match line.parse::<usize>() {
                Ok(number) if (1..=question.options.len()).contains(&number) => break number - 1,
                _ => println!("Answer with a number from 1 to {}.", question.options.len()),
            }
        };

        match controller.answer(choice).await? {
            AnswerOutcome::Next { correct, .. } => {
                println!("{}", if correct { "Correct!" } else { "Not quite." });
            }
            AnswerOutcome::Completed { correct, outcome } => {
                println!("{}", if correct { "Correct!" } else { "Not quite." });
                println!("Score: {}/{}", outcome.score, outcome.question_count);

                let reward = progress::complete_session(&state.db, &outcome).await?;
                match &reward {
                    Some(reward) => println!("{}", reward.summary()),
                    None => log_warn!("Session finished with nobody signed in; not recorded"),
                }
                return Ok(reward);
            }
        }
    }
}
