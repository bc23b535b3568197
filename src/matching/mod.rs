//! Peer match ranking: reciprocal skill overlap scoring plus search and
//! category filtering over the ranked list.

pub mod categories;
pub mod config;
pub mod filter;
pub mod scoring;

pub use categories::{categorize, SkillCategory};
pub use config::MatchConfig;
pub use filter::MatchFilter;
pub use scoring::{compute_matches, score_pair, PairScore, OPEN_TOPIC};
