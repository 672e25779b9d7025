pub mod coordinator;
pub mod handlers;
pub mod keywords;
pub mod language;
pub mod orchestrator;
pub mod prompts;
pub mod response_parser;
pub mod scorer;
pub mod session;
