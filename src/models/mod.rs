//! Data models for FlowHivee.
//!
//! Field names serialize in camelCase so records stay readable by the browser front-end
//! that shares the same storage.

mod analytics;
mod community;
mod progress;
mod settings;
mod training;
mod user;

pub use analytics::*;
pub use community::*;
pub use progress::*;
pub use settings::*;
pub use training::*;
pub use user::*;
