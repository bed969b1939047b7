//! Message lists sent to the chat completion service.
//!
//! Message text is deterministic for a given context so that identical
//! requests fingerprint identically and coalesce.

use std::fmt::Write as _;

use xiuxian_domain::{AdventureType, GenerationContext, Realm};

use crate::infrastructure::ports::ChatMessage;
use crate::use_cases::adventure::scaler::ScaledRewards;

pub const ADVENTURE_TEMPERATURE: f32 = 0.8;
pub const ADVENTURE_MAX_TOKENS: u32 = 4000;

pub const ADVERSARY_TEMPERATURE: f32 = 0.7;
pub const ADVERSARY_MAX_TOKENS: u32 = 200;

const ADVENTURE_SYSTEM_PROMPT: &str = r#"You are the game master of a cultivation (xianxia) game. You turn the player's state and an event type into one event, returned as JSON.

## Output format (highest priority)
- Return only a JSON object: no preamble, no code fences, no comments.
- Never use null or empty strings; omit a field instead.
- Numbers are plain numbers ("spirit": 8), never "+8" or "8".

Required fields:
{
  "story": "event narration, 50-200 words",
  "hpChange": integer,
  "expChange": integer,
  "spiritStonesChange": integer,
  "eventColor": "normal" | "gain" | "danger" | "special"
}

Optional fields:
- itemObtained: one item object
- itemsObtained: array of item objects, every name different
- inheritanceLevelChange: integer 1-4 (very rare)
- lotteryTicketsChange: integer
- triggerSecretRealm: boolean (very rare)
- petObtained: "pet-spirit-fox" | "pet-thunder-tiger" | "pet-phoenix"
- petOpportunity: spirit pet opportunity object
- attributeReduction: attribute loss object (extreme danger only)
- reputationChange: integer -50 to 50
- reputationEvent: {"title", "description", "choices": [{"text", "reputationChange", "description"?, "hpChange"?, "expChange"?, "spiritStonesChange"?}]}

## Event colors
- normal: nothing notable gained or lost
- gain: items, cultivation or spirit stones gained
- danger: health lost or other harm
- special: great fortune, extremely rare, high value

## Narration
Cover the environment, the action, sensory detail and optionally the player's feelings. Never start two events the same way. Never mention learning techniques; technique unlocks are handled by the game.

## Balance
- |hpChange| must not exceed half of the player's max health (rounded down), and must match the story.
- attributeReduction only on extremely dangerous events, always with a rare reward in compensation.
- Equipment slots must not conflict.
- Pills and herbs carry both "effect" (hp, exp, lifespan) and "permanentEffect" (attack, defense, spirit, physique, speed, maxHp, maxLifespan), each with at least one non-zero value.
- Equipment bonuses stay inside the band given for their rarity. Artifacts never grant exp.
- Item names must fit the story and never repeat."#;

const ADVERSARY_SYSTEM_PROMPT: &str =
    "You are a designer for a cultivation (xianxia) game who invents evocative enemy names. Reply with strict JSON.";

/// Messages for one adventure event.
pub fn adventure_messages(ctx: &GenerationContext, rewards: &ScaledRewards) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ADVENTURE_SYSTEM_PROMPT),
        ChatMessage::user(adventure_user_prompt(ctx, rewards)),
    ]
}

fn adventure_user_prompt(ctx: &GenerationContext, rewards: &ScaledRewards) -> String {
    let mut out = String::new();

    match &ctx.player {
        Some(player) => {
            let _ = writeln!(
                out,
                "Player: {}, {} level {}, health {}/{}, attack {}, defense {}, spirit {}, physique {}, speed {}.",
                player.name,
                ctx.realm,
                ctx.level.get(),
                player.hp,
                player.max_hp,
                player.attack,
                player.defense,
                player.spirit,
                player.physique,
                player.speed
            );
        }
        None => {
            let _ = writeln!(out, "Player: {} level {}.", ctx.realm, ctx.level.get());
        }
    }

    let base = &rewards.baseline;
    let _ = writeln!(
        out,
        "Realm baseline stats (for equipment balance): attack {}, defense {}, health {}, spirit {}, physique {}, speed {}.",
        base.attack, base.defense, base.max_hp, base.spirit, base.physique, base.speed
    );
    out.push('\n');
    out.push_str(&rewards.instructions);
    out.push_str(
        "\nThe story must be 50-200 words covering place, action, sensory detail and feeling, with an opening unlike previous events.",
    );
    out
}

/// Messages asking for an enemy's name and title.
pub fn adversary_messages(realm: Realm, adventure: AdventureType) -> Vec<ChatMessage> {
    let location = match adventure {
        AdventureType::SecretRealm => "inside a secret realm",
        AdventureType::Lucky => "at a place of great fortune",
        AdventureType::Normal => "in the wilds",
    };

    let prompt = format!(
        "In a cultivation game the player meets an enemy {location}.\n\
         Enemy realm: {realm}\n\n\
         Invent a fitting name and title. The name may be a beast (e.g. Bloodfang Wolf) or a \
         cultivator (e.g. Soulsever Swordsman). The title describes who the enemy is (e.g. \
         Wasteland Beast, Rogue Cultivator, Realm Guardian).\n\n\
         Return JSON only:\n\
         {{\"name\": \"two to four words\", \"title\": \"two to five words\"}}"
    );

    vec![
        ChatMessage::system(ADVERSARY_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ]
}
