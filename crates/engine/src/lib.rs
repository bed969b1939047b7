//! Xiuxian Engine library.
//!
//! Generates adventure content for a cultivation game from a chat completion
//! service, with offline fallbacks for every entry point.
//!
//! ## Structure
//!
//! - `use_cases/` - Adventure generation: prompts, scaling, cleanup, validation
//! - `infrastructure/` - External dependency implementations (ports + adapters)

pub mod infrastructure;
pub mod use_cases;

pub use use_cases::{AdventureError, AdventureGenerator};
