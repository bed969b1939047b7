//! Value objects for the progression model.

mod adventure;
mod realm;
mod realm_data;

pub use adventure::{
    AdventureType, GenerationContext, PlayerSnapshot, RiskLevel, SecretRealmSite,
};
pub use realm::{Realm, RealmLevel};
pub use realm_data::{RealmBaseline, RealmTable};
