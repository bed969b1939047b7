//! Realm-relative reward and equipment ranges.
//!
//! A pure function of the generation context and the static realm table. The
//! ranges are handed to the model as instructions; nothing here touches the
//! network.

use std::fmt::Write as _;

use thiserror::Error;
use xiuxian_domain::{
    AdventureType, GenerationContext, Realm, RealmBaseline, RealmLevel, RealmTable, RiskLevel,
    SecretRealmSite,
};

/// Extra multiplier per realm level above the first.
const LEVEL_STEP: f64 = 0.3;

/// Baseline stat growth per realm level above the first.
const BASELINE_LEVEL_STEP: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalingError {
    #[error("no baseline stats configured for realm {0}")]
    MissingBaseline(Realm),
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardRange {
    pub min: u64,
    pub max: u64,
}

impl RewardRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    fn scaled(&self, multiplier: f64) -> Self {
        Self {
            min: (self.min as f64 * multiplier).floor() as u64,
            max: (self.max as f64 * multiplier).floor() as u64,
        }
    }
}

/// Unscaled cultivation experience and spirit stone ranges for one kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardTable {
    pub exp: RewardRange,
    pub spirit_stones: RewardRange,
    /// Relative item rarity the model is asked for.
    pub item_rarity: &'static str,
}

const NORMAL_REWARDS: RewardTable = RewardTable {
    exp: RewardRange::new(10, 100),
    spirit_stones: RewardRange::new(5, 50),
    item_rarity: "mixed",
};

const LUCKY_REWARDS: RewardTable = RewardTable {
    exp: RewardRange::new(100, 1000),
    spirit_stones: RewardRange::new(50, 500),
    item_rarity: "rare to legendary, mythic at high realms",
};

/// Unscaled inheritance levels granted by a normal event.
pub const INHERITANCE_RANGE: RewardRange = RewardRange::new(1, 4);

impl RewardTable {
    /// Table for an adventure type and, for secret realms, its danger rating.
    pub fn for_adventure(adventure: AdventureType, risk: Option<RiskLevel>) -> Self {
        match adventure {
            AdventureType::Normal => NORMAL_REWARDS,
            AdventureType::Lucky => LUCKY_REWARDS,
            AdventureType::SecretRealm => Self::secret_realm(risk),
        }
    }

    fn secret_realm(risk: Option<RiskLevel>) -> Self {
        let (exp, spirit_stones, item_rarity) = match risk {
            None => ((50, 500), (100, 1000), "moderate"),
            Some(RiskLevel::Low) => ((50, 300), (100, 600), "lower"),
            Some(RiskLevel::Medium) => ((100, 500), (200, 1000), "moderate"),
            Some(RiskLevel::High) => ((200, 800), (400, 1500), "higher"),
            Some(RiskLevel::Extreme) => ((400, 1200), (800, 2500), "very high"),
        };
        Self {
            exp: RewardRange::new(exp.0, exp.1),
            spirit_stones: RewardRange::new(spirit_stones.0, spirit_stones.1),
            item_rarity,
        }
    }
}

/// Percent chances of each rarity for items found on normal events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RarityDistribution {
    pub common: u32,
    pub rare: u32,
    pub legendary: u32,
}

impl RarityDistribution {
    pub fn for_realm(realm: Realm) -> Self {
        let i = realm.index() as u32;
        Self {
            common: 60u32.saturating_sub(10 * i),
            rare: (30 + 5 * i).min(50),
            legendary: (3 * i).min(20),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentRarity {
    Common,
    Rare,
    Legendary,
    Mythic,
}

impl EquipmentRarity {
    pub fn all() -> &'static [EquipmentRarity] {
        &[
            EquipmentRarity::Common,
            EquipmentRarity::Rare,
            EquipmentRarity::Legendary,
            EquipmentRarity::Mythic,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EquipmentRarity::Common => "common",
            EquipmentRarity::Rare => "rare",
            EquipmentRarity::Legendary => "legendary",
            EquipmentRarity::Mythic => "mythic",
        }
    }

    /// Fraction of the level baseline an item's stat bonus may span.
    pub fn band(&self) -> (f64, f64) {
        match self {
            EquipmentRarity::Common => (0.05, 0.08),
            EquipmentRarity::Rare => (0.08, 0.12),
            EquipmentRarity::Legendary => (0.12, 0.18),
            EquipmentRarity::Mythic => (0.35, 0.50),
        }
    }
}

/// Stat bonus bounds for one equipment rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentBand {
    pub rarity: EquipmentRarity,
    pub min: RealmBaseline,
    pub max: RealmBaseline,
}

/// Everything the prompt needs to keep rewards proportional to progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledRewards {
    pub realm_multiplier: f64,
    pub exp: RewardRange,
    pub spirit_stones: RewardRange,
    /// Only offered on normal events.
    pub inheritance: Option<RewardRange>,
    /// Only stated for normal events.
    pub rarity: Option<RarityDistribution>,
    pub item_rarity: &'static str,
    pub baseline: RealmBaseline,
    pub equipment: Vec<EquipmentBand>,
    pub instructions: String,
}

#[derive(Debug, Clone)]
pub struct ProgressionScaler {
    table: RealmTable,
}

impl Default for ProgressionScaler {
    fn default() -> Self {
        Self::new(RealmTable::standard())
    }
}

impl ProgressionScaler {
    pub fn new(table: RealmTable) -> Self {
        Self { table }
    }

    /// `2^index × (1 + 0.3 × (level − 1))`.
    pub fn realm_multiplier(realm: Realm, level: RealmLevel) -> f64 {
        let base = f64::from(1u32 << realm.index());
        let level_multiplier = 1.0 + f64::from(level.steps_above_first()) * LEVEL_STEP;
        base * level_multiplier
    }

    /// Realm baseline grown by 5% per level above the first.
    pub fn level_baseline(
        &self,
        realm: Realm,
        level: RealmLevel,
    ) -> Result<RealmBaseline, ScalingError> {
        let baseline = self
            .table
            .baseline(realm)
            .ok_or(ScalingError::MissingBaseline(realm))?;
        let growth = 1.0 + f64::from(level.steps_above_first()) * BASELINE_LEVEL_STEP;
        Ok(baseline.scaled(growth))
    }

    pub fn scale(&self, ctx: &GenerationContext) -> Result<ScaledRewards, ScalingError> {
        let baseline = self.level_baseline(ctx.realm, ctx.level)?;
        let multiplier = Self::realm_multiplier(ctx.realm, ctx.level);
        let table = RewardTable::for_adventure(ctx.adventure, ctx.risk);
        let is_normal = ctx.adventure == AdventureType::Normal;

        let equipment = EquipmentRarity::all()
            .iter()
            .map(|&rarity| {
                let (low, high) = rarity.band();
                EquipmentBand {
                    rarity,
                    min: baseline.scaled(low),
                    max: baseline.scaled(high),
                }
            })
            .collect();

        let mut rewards = ScaledRewards {
            realm_multiplier: multiplier,
            exp: table.exp.scaled(multiplier),
            spirit_stones: table.spirit_stones.scaled(multiplier),
            inheritance: is_normal.then(|| INHERITANCE_RANGE.scaled(multiplier)),
            rarity: is_normal.then(|| RarityDistribution::for_realm(ctx.realm)),
            item_rarity: table.item_rarity,
            baseline,
            equipment,
            instructions: String::new(),
        };
        rewards.instructions = render_instructions(ctx, &rewards);
        Ok(rewards)
    }
}

fn render_instructions(ctx: &GenerationContext, rewards: &ScaledRewards) -> String {
    let mut out = String::new();

    match ctx.adventure {
        AdventureType::Normal => {
            out.push_str(
                "[Ordinary journey] An everyday cultivation event. Pick one of: beast fight, \
                 spirit herb, fellow cultivator, small cave abode, epiphany, danger, spirit \
                 stone vein, rescue, spirit spring, spirit pet (10-20%), demonic cultivator \
                 or trap (15-20% each, dangerous), inheritance (very rare), random secret \
                 realm (5%), reputation event (20-30%).\n",
            );
            out.push_str(
                "Vary the item types: herbs, pills, materials, weapons, armour for every slot, \
                 jewellery, rings, artifacts. Invent a fresh item name every time.\n",
            );
            if let Some(rarity) = rewards.rarity {
                let _ = writeln!(
                    out,
                    "Item rarity: {}% common, {}% rare, {}% legendary.",
                    rarity.common, rarity.rare, rarity.legendary
                );
            }
            let _ = write!(
                out,
                "Rewards: cultivation {}-{}, spirit stones {}-{}",
                rewards.exp.min,
                rewards.exp.max,
                rewards.spirit_stones.min,
                rewards.spirit_stones.max
            );
            if let Some(inheritance) = rewards.inheritance {
                let _ = write!(
                    out,
                    ", inheritance levels {}-{} (very rare)",
                    inheritance.min, inheritance.max
                );
            }
            out.push_str(".\n");
            out.push_str(
                "Reputation event: offer 2-3 distinct choices, each with a reputation change \
                 between -30 and +50 and optional other rewards or penalties.\n",
            );
        }
        AdventureType::Lucky => {
            out.push_str(
                "[Great fortune] An extremely rare positive event; eventColor must be \
                 \"special\". Match the scale of the find to the realm: ancient abodes and \
                 lost techniques at low realms, relic ruins and legendary treasures in the \
                 middle realms, immortal estates and supreme Dao at the top.\n",
            );
            let _ = writeln!(
                out,
                "Give items unique, elegant names. Item rarity: {}.",
                rewards.item_rarity
            );
            let _ = writeln!(
                out,
                "Rewards: cultivation {}-{}, spirit stones {}-{}.",
                rewards.exp.min,
                rewards.exp.max,
                rewards.spirit_stones.min,
                rewards.spirit_stones.max
            );
        }
        AdventureType::SecretRealm => {
            out.push_str("[Secret realm exploration]");
            if let Some(risk) = ctx.risk {
                let _ = write!(out, " ({} risk)", risk.display_name());
            }
            out.push('\n');
            if let Some(site) = &ctx.site {
                render_site(&mut out, site);
            }
            out.push_str(
                "Pick one of: guardian beast, vanished treasure, mechanism trap, treasury \
                 inheritance, rival cultivators, hidden secret, spatial rift. Higher risk \
                 means a more dangerous scene. Damage is mostly to health; never lower \
                 permanent attributes.\n",
            );
            out.push_str(
                "Every item in itemsObtained must have a different name, especially equipment.\n",
            );
            let _ = writeln!(
                out,
                "Item rarity: {} (at least rare).",
                rewards.item_rarity
            );
            let _ = writeln!(
                out,
                "Rewards: cultivation {}-{}, spirit stones {}-{}.",
                rewards.exp.min,
                rewards.exp.max,
                rewards.spirit_stones.min,
                rewards.spirit_stones.max
            );
        }
    }

    out.push_str(
        "Equipment stat bonuses by rarity \
         (attack / defense / health / spirit / physique / speed):\n",
    );
    for band in &rewards.equipment {
        let _ = writeln!(
            out,
            "- {}: {}",
            band.rarity.display_name(),
            format_band(band)
        );
    }

    out
}

/// Scene cues keyed by words that may appear in a site name. First match wins.
const SITE_SCENES: &[(&[&str], &str)] = &[
    (&["sword"], "ruins of sword cultivators, sword intent and sword formations"),
    (&["mountain", "beast"], "mountain forests roamed by demon beasts"),
    (&["thunder", "lightning"], "lightning strikes, thunder beasts and thunder spirit treasures"),
    (&["nether"], "yin qi, ghosts and the spirits of the dead"),
    (&["fire", "lava"], "flames, lava and fire beasts"),
    (&["ice", "snow", "frost"], "ice and snow, frozen beasts and cold spirit treasures"),
    (&["poison", "miasma"], "poison fog, venomous creatures and toxic herbs"),
    (&["illusion", "maze"], "illusions, mazes and tests of the mind"),
    (&["blood", "abyss"], "demonic qi, blood pools and demonic cultivators"),
    (&["star", "ruin"], "ancient ruins, lost techniques and old formations"),
    (&["dragon"], "a dragon clan burial ground with dragon bones and dragon might"),
    (&["immortal"], "immortal qi and the remains of immortal cultivators"),
    (&["tribulation"], "heavenly tribulation and lightning trials"),
    (&["chaos", "void"], "spatial forces, spatial rifts and chaotic qi"),
    (&["time", "rift"], "time rifts, slowed moments and warped ages"),
    (&["death", "canyon"], "death qi, bones and life-or-death trials"),
    (&["battlefield"], "the remains of a war between gods and demons"),
];

fn site_scene(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    SITE_SCENES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(_, scene)| *scene)
}

fn render_site(out: &mut String, site: &SecretRealmSite) {
    let _ = write!(out, "The player is exploring the secret realm \"{}\"", site.name);
    match &site.description {
        Some(description) => {
            let _ = writeln!(out, ", known for: {description}.");
        }
        None => {
            out.push_str(". Infer its environment from the name.\n");
        }
    }
    if let Some(scene) = site_scene(&site.name) {
        let _ = writeln!(out, "Set the scene around {scene}.");
    }
    let _ = writeln!(
        out,
        "Every scene and item must tie closely to \"{}\".",
        site.name
    );
}

fn format_band(band: &EquipmentBand) -> String {
    let (min, max) = (&band.min, &band.max);
    format!(
        "{}-{} / {}-{} / {}-{} / {}-{} / {}-{} / {}-{}",
        min.attack,
        max.attack,
        min.defense,
        max.defense,
        min.max_hp,
        max.max_hp,
        min.spirit,
        max.spirit,
        min.physique,
        max.physique,
        min.speed,
        max.speed
    )
}
