//! Records produced by the generation pipeline.

mod outcome;

pub use outcome::{AdventureOutcome, AdversaryName, EventColor, ReputationChoice, ReputationEvent};
