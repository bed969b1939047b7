//! Xiuxian domain types.
//!
//! Pure data: realms, generation contexts, static realm tables and the
//! adventure outcome contract. No I/O lives here.

pub mod entities;
pub mod error;
pub mod value_objects;

pub use entities::{AdventureOutcome, AdversaryName, EventColor, ReputationChoice, ReputationEvent};
pub use error::DomainError;
pub use value_objects::{
    AdventureType, GenerationContext, PlayerSnapshot, Realm, RealmBaseline, RealmLevel,
    RealmTable, RiskLevel, SecretRealmSite,
};
