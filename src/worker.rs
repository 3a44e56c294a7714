// Copyright (c) 2026, The Amqp-Worker Authors
// MIT License
// All rights reserved.

//! # Application Callback Contract
//!
//! Application code plugs into the consume loop by implementing [`Worker`]:
//! one async function that transforms a decoded message into zero-or-one
//! replies plus an error flag. The worker is expected to catch its own
//! internal failures; this crate only interprets the returned [`Outcome`]
//! to decide acknowledgment and reply publishing, and never retries on the
//! application's behalf.

use async_trait::async_trait;
use serde_json::Value;

/// Result of processing one message.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// Reply to publish to the reply exchange, if any
    pub reply: Option<Value>,
    /// Whether the worker considers the processing failed
    pub error: bool,
}

impl Outcome {
    /// Successful processing with nothing to reply.
    pub fn done() -> Self {
        Outcome::default()
    }

    /// Successful processing with a reply to publish.
    pub fn reply(value: Value) -> Self {
        Outcome {
            reply: Some(value),
            error: false,
        }
    }

    /// Failed processing, already reported by the worker itself.
    pub fn failed() -> Self {
        Outcome {
            reply: None,
            error: true,
        }
    }
}

/// Processes one decoded message.
///
/// Implementations run inside the correlation scope of the message, so any
/// call to [`publish`](crate::publisher::publish) made here is tagged with
/// the incoming correlation id automatically.
#[async_trait]
pub trait Worker: Send + Sync {
    async fn work(&self, content: Value) -> Outcome;
}
