//! Use cases - User story orchestration.
//!
//! Each module drives one area of the game through the infrastructure ports.

pub mod adventure;

pub use adventure::{AdventureError, AdventureGenerator};
