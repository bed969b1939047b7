//! Offline content used whenever the generative service cannot help.

use std::sync::Arc;

use xiuxian_domain::{AdventureOutcome, AdventureType, AdversaryName, EventColor, Realm, RealmLevel};

use crate::infrastructure::ports::RandomPort;

/// Why a fallback outcome is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The service was called and failed, or answered with garbage.
    ServiceFailure,
    /// No credentials are configured, so the service was never called.
    Disabled,
}

pub const FAILURE_STORY: &str =
    "The spiritual qi around you churns wildly and clouds your senses. You find nothing this time.";

pub const DISABLED_STORY: &str =
    "You sit in quiet meditation while the world around you stays still. (The oracle is silent: no API key is configured.)";

/// Source of offline replacements for generated content.
pub trait FallbackProvider: Send + Sync {
    fn adventure_outcome(&self, reason: FallbackReason) -> AdventureOutcome;

    /// `realm`/`level` is the realm reached (or attempted); `current` is the
    /// realm held before the attempt.
    fn breakthrough_narration(
        &self,
        realm: Realm,
        level: Option<RealmLevel>,
        success: bool,
        name: Option<&str>,
        current: Option<Realm>,
    ) -> String;

    fn adversary_name(&self, realm: Realm, adventure: AdventureType) -> AdversaryName;
}

/// Template pools indexed by realm, sampled through a [`RandomPort`].
pub struct TemplateFallback {
    random: Arc<dyn RandomPort>,
}

impl TemplateFallback {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }

    fn choose<'a>(&self, pool: &[&'a str]) -> &'a str {
        pool.get(self.random.pick(pool.len()))
            .or_else(|| pool.first())
            .copied()
            .unwrap_or_default()
    }
}

impl FallbackProvider for TemplateFallback {
    fn adventure_outcome(&self, reason: FallbackReason) -> AdventureOutcome {
        match reason {
            FallbackReason::ServiceFailure => {
                AdventureOutcome::basic(FAILURE_STORY, 0, 5, 0, EventColor::Normal)
            }
            FallbackReason::Disabled => {
                AdventureOutcome::basic(DISABLED_STORY, 5, 10, 0, EventColor::Normal)
            }
        }
    }

    fn breakthrough_narration(
        &self,
        realm: Realm,
        level: Option<RealmLevel>,
        success: bool,
        name: Option<&str>,
        current: Option<Realm>,
    ) -> String {
        let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("You");

        if !success {
            return failure_narration(current).replace("{name}", name);
        }

        let target = match level {
            Some(level) => format!("{} level {}", realm, level.get()),
            None => realm.to_string(),
        };
        self.choose(breakthrough_templates(realm))
            .replace("{name}", name)
            .replace("{realm}", &target)
    }

    fn adversary_name(&self, realm: Realm, adventure: AdventureType) -> AdversaryName {
        let name = format!(
            "{} {}",
            self.choose(NAME_PREFIXES),
            self.choose(name_suffixes(realm))
        );
        let title = format!(
            "{} {}",
            self.choose(title_prefixes(adventure)),
            self.choose(TITLE_SUFFIXES)
        );
        AdversaryName::new(name, title)
    }
}

fn failure_narration(current: Option<Realm>) -> &'static str {
    match current {
        Some(Realm::TribulationAscension | Realm::VoidRefinement) => {
            "{name} pressed against the bottleneck, but the heavenly tribulation was overwhelming and struck back. Much cultivation was lost and must be rebuilt."
        }
        Some(Realm::SpiritSevering | Realm::NascentSoul) => {
            "{name} pressed against the bottleneck, but the foundation was unsteady. The divine sense was wounded by the backlash."
        }
        _ => {
            "{name} pressed against the bottleneck, but the foundation was unsteady and the qi turned back in a painful backlash."
        }
    }
}

fn breakthrough_templates(realm: Realm) -> &'static [&'static str] {
    match realm {
        Realm::QiRefining => &[
            "{name} sat cross-legged and ran the basic method; faint qi began to flow. As it gathered, the bottleneck loosened and {name} reached {realm}!",
            "{name} stilled the mind and guided thin threads of qi against the meridians until they broke through. {name} stepped into {realm}!",
            "Day after day {name} cultivated until the body brimmed with qi. In one quiet moment the barrier gave way: {realm}!",
        ],
        Realm::FoundationEstablishment => &[
            "Qi gathered like streams into a river as {name} meditated. The foundation settled firmly and {name} broke through to {realm}!",
            "{name} emerged from secluded cultivation one dawn, the bottleneck shattered. The world looked different from {realm}.",
            "A faint glow surrounded {name} as the qi core condensed. With a soft shout {name} reached {realm}!",
        ],
        Realm::GoldenCore => &[
            "Qi surged through {name} like a rushing river. With a sharp cry the bottleneck broke and {name} reached {realm}!",
            "{name} swallowed a spirit pill and drove its power against the barrier. Carried by the medicine, {name} reached {realm}.",
            "Rosy light filled the cave abode as the core within {name} trembled, then settled. {name} stood at {realm}!",
        ],
        Realm::NascentSoul => &[
            "Five-coloured clouds wrapped around {name} as qi coiled like dragons against the realm wall. The wall cracked: {realm}!",
            "Beneath the moon {name} drew down starlight until a pillar of light pierced the clouds. {name} rose to {realm}!",
            "Insight won in a life-and-death battle flooded {name} at once. {name} broke through mid-fight into {realm}!",
        ],
        Realm::SpiritSevering => &[
            "Thunder roared as {name} tempered body and soul in the tribulation. Reborn from the lightning, {name} reached {realm}!",
            "{name} claimed an ancient inheritance in forgotten ruins. Its power broke the barrier and {name} entered {realm}!",
            "The sky changed colour as the divine sense of {name} took form and burst its shackles. {name} reached {realm}!",
        ],
        Realm::VoidRefinement => &[
            "The void trembled as spatial forces tore at {name}, yet the will held. Reborn in the void, {name} reached {realm}!",
            "The laws of heaven and earth revealed themselves and wove into the qi of {name}. {name} reached {realm}, close to immortality!",
            "Immortal light circled {name} as the realm wall shattered. {name} stood at {realm}!",
        ],
        Realm::TribulationAscension => &[
            "Nine layers of heavenly lightning fell upon {name} and could not break that will. Reborn from the storm, {name} reached {realm}!",
            "The void shook as {name} grasped the great Dao. {name} entered {realm}; the road to immortality lies open!",
            "Immortal light circled {name} as the final barrier broke. {name} reached {realm}!",
        ],
    }
}

const NAME_PREFIXES: &[&str] = &[
    "Blood", "Shadow", "Frost", "Flame", "Thunder", "Venom", "Iron", "Ghost", "Crimson",
    "Azure", "Howling", "Savage",
];

fn name_suffixes(realm: Realm) -> &'static [&'static str] {
    match realm {
        Realm::QiRefining | Realm::FoundationEstablishment => {
            &["Wolf", "Spider", "Serpent", "Boar", "Swordsman", "Rogue Cultivator"]
        }
        Realm::GoldenCore | Realm::NascentSoul => {
            &["Tiger", "Hawk", "Demon Cultivator", "Old Fiend", "Blade Master", "Wraith"]
        }
        Realm::SpiritSevering | Realm::VoidRefinement | Realm::TribulationAscension => {
            &["Dragon", "Qilin", "Taotie", "Devil Lord", "Fallen Immortal", "Calamity Beast"]
        }
    }
}

fn title_prefixes(adventure: AdventureType) -> &'static [&'static str] {
    match adventure {
        AdventureType::Normal => &["Wasteland", "Wild", "Roadside", "Mountain"],
        AdventureType::Lucky => &["Treasure-Guarding", "Ancient", "Hidden"],
        AdventureType::SecretRealm => &["Realm", "Abyssal", "Tomb", "Netherworld"],
    }
}

const TITLE_SUFFIXES: &[&str] = &["Beast", "Cultivator", "Guardian", "Fiend", "Warden", "Demon"];
