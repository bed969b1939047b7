//! Static baseline statistics per realm.
//!
//! Equipment value ranges handed to the generator are percentages of these
//! baselines, so they are the single source of balance for item numbers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::realm::Realm;

/// Baseline combat statistics of a cultivator entering a realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmBaseline {
    pub attack: u64,
    pub defense: u64,
    pub max_hp: u64,
    pub spirit: u64,
    pub physique: u64,
    pub speed: u64,
}

impl RealmBaseline {
    pub const fn new(
        attack: u64,
        defense: u64,
        max_hp: u64,
        spirit: u64,
        physique: u64,
        speed: u64,
    ) -> Self {
        Self {
            attack,
            defense,
            max_hp,
            spirit,
            physique,
            speed,
        }
    }

    /// Every statistic multiplied by `factor` and floored.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |value: u64| (value as f64 * factor).floor() as u64;
        Self {
            attack: scale(self.attack),
            defense: scale(self.defense),
            max_hp: scale(self.max_hp),
            spirit: scale(self.spirit),
            physique: scale(self.physique),
            speed: scale(self.speed),
        }
    }
}

const STANDARD_BASELINES: [(Realm, RealmBaseline); 7] = [
    (Realm::QiRefining, RealmBaseline::new(10, 5, 100, 10, 10, 10)),
    (Realm::FoundationEstablishment, RealmBaseline::new(30, 15, 300, 30, 30, 20)),
    (Realm::GoldenCore, RealmBaseline::new(90, 45, 900, 80, 80, 40)),
    (Realm::NascentSoul, RealmBaseline::new(250, 120, 2500, 200, 200, 80)),
    (Realm::SpiritSevering, RealmBaseline::new(700, 350, 7000, 500, 500, 160)),
    (Realm::VoidRefinement, RealmBaseline::new(2000, 1000, 20000, 1200, 1200, 320)),
    (Realm::TribulationAscension, RealmBaseline::new(6000, 3000, 60000, 3000, 3000, 640)),
];

/// Lookup table from realm to its baseline.
///
/// The standard table covers every realm. Partial tables can be built for
/// modded content; lookups on them may miss.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RealmTable {
    baselines: HashMap<Realm, RealmBaseline>,
}

impl RealmTable {
    pub fn standard() -> Self {
        Self {
            baselines: STANDARD_BASELINES.into_iter().collect(),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Realm, RealmBaseline)>) -> Self {
        Self {
            baselines: entries.into_iter().collect(),
        }
    }

    pub fn baseline(&self, realm: Realm) -> Option<&RealmBaseline> {
        self.baselines.get(&realm)
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}
