//! The conversational-responder seam.

mod groq;

pub use groq::GroqResponder;

use async_trait::async_trait;

use crate::error::Result;

/// Abstract text-completion collaborator, consulted for chat and
/// unclassified messages. No state is carried across calls.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce a reply for the raw user message.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
