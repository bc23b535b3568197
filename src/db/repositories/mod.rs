pub mod preferences;
pub mod roster;
pub mod sessions;
