mod health;
mod languages;
mod transcribe;

pub use health::{health_handler, HealthResponse};
pub use languages::{languages_handler, LanguagesResponse};
pub use transcribe::transcribe_handler;
