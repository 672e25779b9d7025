pub mod job;
pub mod language;
pub mod resume;
