//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - LLM calls (any OpenAI-compatible endpoint, or a test double)
//! - Clock/Random (for testing)

mod error;
mod external;
mod testing;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{ChatMessage, LlmPort, LlmRequest, LlmResponse, MessageRole};

#[cfg(test)]
pub use external::MockLlmPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::LlmError;
