#[cfg(feature = "cli")]
pub mod config;
mod engine;
mod pattern;
mod phrase;
mod pitch;
mod random;
mod scale;

pub use engine::*;
pub use pattern::*;
pub use phrase::*;
pub use pitch::*;
pub use random::*;
pub use scale::*;
