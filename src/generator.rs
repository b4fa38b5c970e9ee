//! Generator Module
//!
//! The content-generation collaborator the gateway calls on a cache miss.
//! Its wire protocol is opaque here: it only has to hand back a response
//! and the number of tokens the call consumed.

use async_trait::async_trait;

use crate::cache::CachedResponse;
use crate::error::Result;

// == Generation ==
/// Result of one successful generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Response to serve and cache
    pub response: CachedResponse,
    /// Tokens billed by the provider for this call
    pub tokens_used: u64,
}

// == Generator ==
/// Produces a response for a request key.
///
/// Implementations report failures as `DreamError::Generation`; retries and
/// backoff belong inside the implementation.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, key: &str) -> Result<Generation>;
}

// == Placeholder Generator ==
/// Deterministic stand-in for the remote generation service.
///
/// Renders a minimal HTML page naming the requested path and bills roughly
/// one token per four bytes of output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderGenerator;

#[async_trait]
impl Generator for PlaceholderGenerator {
    async fn generate(&self, key: &str) -> Result<Generation> {
        let title = escape_html(key);
        let body = format!(
            "<!DOCTYPE html><html><head><title>{title}</title></head>\
             <body><h1>{title}</h1><p>This page has not been dreamed up yet.</p></body></html>"
        );
        let tokens_used = (body.len() as u64).div_ceil(4);

        Ok(Generation {
            response: CachedResponse::new(200, body),
            tokens_used,
        })
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_renders_path() {
        let generation = PlaceholderGenerator.generate("/cats/and/dogs").await.unwrap();

        assert_eq!(generation.response.status, 200);
        assert!(generation.response.body.contains("<h1>/cats/and/dogs</h1>"));
        assert!(generation.tokens_used > 0);
    }

    #[tokio::test]
    async fn test_placeholder_escapes_markup() {
        let generation = PlaceholderGenerator.generate("/<script>").await.unwrap();
        assert!(!generation.response.body.contains("<script>"));
        assert!(generation.response.body.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_placeholder_is_deterministic() {
        let first = PlaceholderGenerator.generate("/same").await.unwrap();
        let second = PlaceholderGenerator.generate("/same").await.unwrap();
        assert_eq!(first, second);
    }
}
