pub mod content;
pub mod session;
pub mod student;

pub use content::{LearningResource, QuizQuestion, RoadmapStep};
pub use session::{SessionMode, SessionRecord};
pub use student::{Badge, Match, Skill, Student};
