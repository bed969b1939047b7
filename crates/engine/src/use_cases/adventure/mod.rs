//! Adventure content generation.
//!
//! The entry points on [`AdventureGenerator`] never fail. Internal errors are
//! logged and replaced by offline fallback content, so the game loop can
//! always continue.

pub mod fallback;
pub mod prompts;
pub mod sanitizer;
pub mod scaler;
pub mod validator;

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use xiuxian_domain::{
    AdventureOutcome, AdventureType, AdversaryName, GenerationContext, Realm, RealmLevel,
};

use crate::infrastructure::clock::{SystemClock, SystemRandom};
use crate::infrastructure::config::LlmSettings;
use crate::infrastructure::coordinator::{CoordinatorConfig, RequestCoordinator};
use crate::infrastructure::openai::OpenAiClient;
use crate::infrastructure::ports::LlmError;

pub use fallback::{FallbackProvider, FallbackReason, TemplateFallback};
pub use scaler::{ProgressionScaler, ScaledRewards, ScalingError};

use prompts::{
    ADVENTURE_MAX_TOKENS, ADVENTURE_TEMPERATURE, ADVERSARY_MAX_TOKENS, ADVERSARY_TEMPERATURE,
};
use sanitizer::sanitize;
use validator::{enforce_health_bound, validate_outcome};

#[derive(Debug, Error)]
pub enum AdventureError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("unparseable LLM payload: {source}")]
    Content {
        #[source]
        source: serde_json::Error,
        raw: String,
        sanitized: String,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Generates adventure events, breakthrough narrations and enemy names.
pub struct AdventureGenerator {
    coordinator: RequestCoordinator,
    scaler: ProgressionScaler,
    fallback: Arc<dyn FallbackProvider>,
}

impl AdventureGenerator {
    pub fn new(
        coordinator: RequestCoordinator,
        scaler: ProgressionScaler,
        fallback: Arc<dyn FallbackProvider>,
    ) -> Self {
        Self {
            coordinator,
            scaler,
            fallback,
        }
    }

    /// Wire the HTTP transport, system clock and template fallback.
    pub fn from_settings(settings: &LlmSettings) -> Self {
        let coordinator = RequestCoordinator::new(
            Arc::new(OpenAiClient::new(settings)),
            Arc::new(SystemClock::new()),
            CoordinatorConfig {
                coalesce_window: settings.coalesce_window,
            },
        );
        Self::new(
            coordinator,
            ProgressionScaler::default(),
            Arc::new(TemplateFallback::new(Arc::new(SystemRandom::new()))),
        )
    }

    /// Generate one adventure event for `ctx`.
    pub async fn generate_adventure_event(&self, ctx: &GenerationContext) -> AdventureOutcome {
        if let Err(e) = self.coordinator.check_configured() {
            tracing::debug!(error = %e, "LLM disabled, serving offline outcome");
            return self.fallback.adventure_outcome(FallbackReason::Disabled);
        }

        match self.try_generate_adventure_event(ctx).await {
            Ok(outcome) => outcome,
            Err(AdventureError::Content {
                source,
                raw,
                sanitized,
            }) => {
                tracing::error!(
                    error = %source,
                    raw = %raw,
                    sanitized = %sanitized,
                    "Failed to parse adventure event, using fallback"
                );
                self.fallback.adventure_outcome(FallbackReason::ServiceFailure)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    realm = %ctx.realm,
                    adventure = ctx.adventure.as_str(),
                    "Adventure generation failed, using fallback"
                );
                self.fallback.adventure_outcome(FallbackReason::ServiceFailure)
            }
        }
    }

    /// Fallible core of [`Self::generate_adventure_event`].
    pub async fn try_generate_adventure_event(
        &self,
        ctx: &GenerationContext,
    ) -> Result<AdventureOutcome, AdventureError> {
        let (effective, rewards) = self.scale(ctx)?;
        let messages = prompts::adventure_messages(&effective, &rewards);

        let raw = self
            .coordinator
            .submit(messages, ADVENTURE_TEMPERATURE, Some(ADVENTURE_MAX_TOKENS))
            .await?;

        let sanitized = sanitize(&raw);
        let mut outcome = match validate_outcome(&sanitized) {
            Ok(outcome) => outcome,
            Err(source) => {
                return Err(AdventureError::Content {
                    source,
                    raw,
                    sanitized,
                })
            }
        };

        if let Some(player) = &ctx.player {
            enforce_health_bound(&mut outcome, player.max_hp);
        }

        Ok(outcome)
    }

    /// Scale rewards, substituting the lowest realm once if `ctx.realm` has
    /// no baseline.
    fn scale(
        &self,
        ctx: &GenerationContext,
    ) -> Result<(GenerationContext, ScaledRewards), AdventureError> {
        match self.scaler.scale(ctx) {
            Ok(rewards) => Ok((ctx.clone(), rewards)),
            Err(ScalingError::MissingBaseline(realm)) => {
                tracing::warn!(
                    realm = %realm,
                    substitute = %Realm::lowest(),
                    "Realm missing from baseline table, retrying with lowest realm"
                );
                let retry = ctx.with_realm(Realm::lowest());
                let rewards = self
                    .scaler
                    .scale(&retry)
                    .map_err(|e| AdventureError::Configuration(e.to_string()))?;
                Ok((retry, rewards))
            }
        }
    }

    /// Narration for a breakthrough attempt. Template-driven.
    pub fn generate_breakthrough_narration(
        &self,
        realm: Realm,
        level: Option<RealmLevel>,
        success: bool,
        name: Option<&str>,
        current: Option<Realm>,
    ) -> String {
        self.fallback
            .breakthrough_narration(realm, level, success, name, current)
    }

    /// Name and title for an enemy met on an adventure.
    pub async fn generate_adversary_name(
        &self,
        realm: Realm,
        adventure: AdventureType,
    ) -> AdversaryName {
        if self.coordinator.check_configured().is_err() {
            return self.fallback.adversary_name(realm, adventure);
        }

        match self.try_generate_adversary_name(realm, adventure).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                tracing::warn!(
                    realm = %realm,
                    "Enemy name reply was incomplete, using fallback"
                );
                self.fallback.adversary_name(realm, adventure)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    realm = %realm,
                    "Enemy name generation failed, using fallback"
                );
                self.fallback.adversary_name(realm, adventure)
            }
        }
    }

    async fn try_generate_adversary_name(
        &self,
        realm: Realm,
        adventure: AdventureType,
    ) -> Result<Option<AdversaryName>, AdventureError> {
        let raw = self
            .coordinator
            .submit(
                prompts::adversary_messages(realm, adventure),
                ADVERSARY_TEMPERATURE,
                Some(ADVERSARY_MAX_TOKENS),
            )
            .await?;

        let sanitized = sanitize(&raw);
        let reply: AdversaryReply = match serde_json::from_str(&sanitized) {
            Ok(reply) => reply,
            Err(source) => {
                return Err(AdventureError::Content {
                    source,
                    raw,
                    sanitized,
                })
            }
        };

        let name = reply.name.as_deref().map(str::trim).unwrap_or_default();
        let title = reply.title.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || title.is_empty() {
            return Ok(None);
        }
        Ok(Some(AdversaryName::new(name, title)))
    }
}

#[derive(Debug, Deserialize)]
struct AdversaryReply {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedRandom, SystemClock};
    use crate::infrastructure::ports::{LlmPort, LlmResponse, MockLlmPort};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use xiuxian_domain::{EventColor, PlayerSnapshot, RealmBaseline, RealmTable};

    fn template_fallback() -> Arc<dyn FallbackProvider> {
        Arc::new(TemplateFallback::new(Arc::new(FixedRandom(0))))
    }

    fn generator_with(llm: Arc<dyn LlmPort>, scaler: ProgressionScaler) -> AdventureGenerator {
        let coordinator = RequestCoordinator::new(
            llm,
            Arc::new(SystemClock::new()),
            CoordinatorConfig::default(),
        );
        AdventureGenerator::new(coordinator, scaler, template_fallback())
    }

    fn generator(llm: MockLlmPort) -> AdventureGenerator {
        generator_with(Arc::new(llm), ProgressionScaler::default())
    }

    fn replying(content: &'static str) -> MockLlmPort {
        let mut mock = MockLlmPort::new();
        mock.expect_check_configured().returning(|| Ok(()));
        mock.expect_generate().returning(move |_| {
            Ok(LlmResponse {
                content: content.to_string(),
            })
        });
        mock
    }

    fn context(realm: Realm, adventure: AdventureType) -> GenerationContext {
        GenerationContext::new(realm, RealmLevel::first(), adventure)
    }

    #[tokio::test]
    async fn unconfigured_transport_serves_disabled_outcome_without_calling() {
        let mut mock = MockLlmPort::new();
        mock.expect_check_configured()
            .returning(|| Err(LlmError::configuration("API key is missing")));
        mock.expect_generate().never();

        let outcome = generator(mock)
            .generate_adventure_event(&context(Realm::QiRefining, AdventureType::Normal))
            .await;

        assert_eq!(outcome.hp_change, 5);
        assert_eq!(outcome.exp_change, 10);
        assert_eq!(outcome.spirit_stones_change, 0);
        assert_eq!(outcome.event_color, EventColor::Normal);
    }

    #[tokio::test]
    async fn wrapped_reply_is_cleaned_and_validated() {
        let mock = replying(
            "```json\nHere you go:\n{\"story\": \"A spirit spring bubbles.\", \"hpChange\": +8, \"expChange\": \"30\", \"eventColor\": \"gain\"}\n```",
        );

        let outcome = generator(mock)
            .generate_adventure_event(&context(Realm::QiRefining, AdventureType::Normal))
            .await;

        assert_eq!(outcome.story, "A spirit spring bubbles.");
        assert_eq!(outcome.hp_change, 8);
        assert_eq!(outcome.exp_change, 30);
        assert_eq!(outcome.event_color, EventColor::Gain);
    }

    #[tokio::test]
    async fn unparseable_reply_yields_failure_fallback() {
        let generator = generator(replying("The heavens refuse to answer."));
        let ctx = context(Realm::GoldenCore, AdventureType::Lucky);

        let err = generator
            .try_generate_adventure_event(&ctx)
            .await
            .expect_err("not json");
        assert!(matches!(err, AdventureError::Content { .. }));

        let outcome = generator.generate_adventure_event(&ctx).await;
        assert_eq!(outcome.story, fallback::FAILURE_STORY);
        assert_eq!((outcome.hp_change, outcome.exp_change), (0, 5));
    }

    #[tokio::test]
    async fn transport_error_yields_failure_fallback() {
        let mut mock = MockLlmPort::new();
        mock.expect_check_configured().returning(|| Ok(()));
        mock.expect_generate()
            .returning(|_| Err(LlmError::status(500, "boom")));

        let outcome = generator(mock)
            .generate_adventure_event(&context(Realm::QiRefining, AdventureType::SecretRealm))
            .await;

        assert_eq!(outcome.story, fallback::FAILURE_STORY);
    }

    #[tokio::test]
    async fn health_change_is_bounded_by_player_max_health() {
        let mock = replying(
            r#"{"story": "A thunder hawk dives.", "hpChange": -400, "eventColor": "danger"}"#,
        );
        let ctx = context(Realm::QiRefining, AdventureType::Normal).with_player(PlayerSnapshot {
            name: "Lin Feng".to_string(),
            hp: 90,
            max_hp: 100,
            attack: 10,
            defense: 5,
            spirit: 10,
            physique: 10,
            speed: 10,
        });

        let outcome = generator(mock).generate_adventure_event(&ctx).await;

        assert_eq!(outcome.hp_change, -50);
    }

    #[tokio::test]
    async fn missing_baseline_retries_with_lowest_realm() {
        let mut mock = MockLlmPort::new();
        mock.expect_check_configured().returning(|| Ok(()));
        mock.expect_generate()
            .withf(|request| request.messages[1].content.contains("Qi Refining level 1"))
            .times(1)
            .returning(|_| {
                Ok(LlmResponse {
                    content: r#"{"story": "Mist.", "expChange": 12}"#.to_string(),
                })
            });
        let scaler = ProgressionScaler::new(RealmTable::from_entries([(
            Realm::QiRefining,
            RealmBaseline::new(10, 5, 100, 10, 10, 10),
        )]));
        let generator = generator_with(Arc::new(mock), scaler);

        let outcome = generator
            .try_generate_adventure_event(&context(Realm::VoidRefinement, AdventureType::Normal))
            .await
            .expect("retried with lowest realm");

        assert_eq!(outcome.exp_change, 12);
    }

    #[tokio::test]
    async fn missing_lowest_baseline_is_a_configuration_error() {
        let mut mock = MockLlmPort::new();
        mock.expect_check_configured().returning(|| Ok(()));
        mock.expect_generate().never();
        let generator =
            generator_with(Arc::new(mock), ProgressionScaler::new(RealmTable::default()));
        let ctx = context(Realm::GoldenCore, AdventureType::Normal);

        let err = generator
            .try_generate_adventure_event(&ctx)
            .await
            .expect_err("empty table");
        assert!(matches!(err, AdventureError::Configuration(_)));

        let outcome = generator.generate_adventure_event(&ctx).await;
        assert_eq!(outcome.story, fallback::FAILURE_STORY);
    }

    #[tokio::test]
    async fn adversary_name_is_trimmed() {
        let mut mock = MockLlmPort::new();
        mock.expect_check_configured().returning(|| Ok(()));
        mock.expect_generate()
            .withf(|request| request.temperature == Some(0.7) && request.max_tokens == Some(200))
            .returning(|_| {
                Ok(LlmResponse {
                    content: "```json\n{\"name\": \"  Bloodfang Wolf \", \"title\": \"Wasteland Beast\"}\n```"
                        .to_string(),
                })
            });

        let adversary = generator(mock)
            .generate_adversary_name(Realm::QiRefining, AdventureType::Normal)
            .await;

        assert_eq!(adversary, AdversaryName::new("Bloodfang Wolf", "Wasteland Beast"));
    }

    #[tokio::test]
    async fn blank_adversary_fields_fall_back_to_templates() {
        let generator = generator(replying(r#"{"name": "   ", "title": "Guardian"}"#));

        let adversary = generator
            .generate_adversary_name(Realm::NascentSoul, AdventureType::SecretRealm)
            .await;

        assert!(!adversary.name.trim().is_empty());
        assert_ne!(adversary.title, "Guardian");
    }

    #[tokio::test]
    async fn unconfigured_adversary_uses_templates() {
        let mut mock = MockLlmPort::new();
        mock.expect_check_configured()
            .returning(|| Err(LlmError::configuration("API key is missing")));
        mock.expect_generate().never();

        let adversary = generator(mock)
            .generate_adversary_name(Realm::GoldenCore, AdventureType::Lucky)
            .await;

        assert!(!adversary.name.is_empty());
        assert!(!adversary.title.is_empty());
    }

    #[test]
    fn breakthrough_narration_delegates_to_templates() {
        let generator = generator(MockLlmPort::new());
        let text = generator.generate_breakthrough_narration(
            Realm::GoldenCore,
            RealmLevel::new(1).ok(),
            true,
            Some("Lin Feng"),
            None,
        );
        assert!(text.contains("Lin Feng"));
        assert!(text.contains("Golden Core level 1"));
    }

    #[tokio::test]
    async fn http_failure_status_yields_failure_fallback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_handler = Arc::clone(&hits);
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let hits = Arc::clone(&hits_in_handler);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let generator = AdventureGenerator::new(
            RequestCoordinator::new(
                Arc::new(OpenAiClient::new(&LlmSettings {
                    api_url: format!("http://{}/v1/chat/completions", addr),
                    api_key: Some("sk-test".to_string()),
                    ..LlmSettings::default()
                })),
                Arc::new(SystemClock::new()),
                CoordinatorConfig::default(),
            ),
            ProgressionScaler::default(),
            template_fallback(),
        );

        let outcome = generator
            .generate_adventure_event(&context(Realm::QiRefining, AdventureType::Normal))
            .await;

        assert_eq!(
            outcome,
            AdventureOutcome::basic(fallback::FAILURE_STORY, 0, 5, 0, EventColor::Normal)
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
