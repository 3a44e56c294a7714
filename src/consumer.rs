// Copyright (c) 2026, The Amqp-Worker Authors
// MIT License
// All rights reserved.

//! # Per-Message Processing
//!
//! One delivered frame goes through here: the correlation scope is entered,
//! the body is decoded as JSON, the application worker runs, a reply is
//! published if one was produced, and the frame is acknowledged according
//! to policy.
//!
//! A malformed body never reaches the worker: it is reported to the error
//! exchange and the frame is acknowledged unconditionally, since
//! redelivering an undecodable payload can only loop forever.

use crate::{
    correlation,
    dispatcher::{ERROR_EXCHANGE, ERROR_ROUTING_KEY, REPLY_EXCHANGE},
    errors::AmqpError,
    publisher,
    worker::Worker,
};
use async_trait::async_trait;
use lapin::{message::Delivery, options::BasicAckOptions, Channel};
use serde_json::{json, Value};
use tracing::{debug, error};

/// The channel operations per-message processing needs. A seam so the
/// processing logic is testable without a broker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait DeliveryChannel: Send + Sync {
    async fn send(
        &self,
        exchange: &str,
        routing_key: &str,
        body: Vec<u8>,
        correlation_id: &str,
    ) -> Result<(), AmqpError>;

    async fn ack(&self, delivery_tag: u64) -> Result<(), AmqpError>;
}

/// Real implementation backed by a lapin channel.
pub(crate) struct AmqpDeliveryChannel {
    channel: Channel,
}

impl AmqpDeliveryChannel {
    pub(crate) fn new(channel: Channel) -> Self {
        AmqpDeliveryChannel { channel }
    }
}

#[async_trait]
impl DeliveryChannel for AmqpDeliveryChannel {
    async fn send(
        &self,
        exchange: &str,
        routing_key: &str,
        body: Vec<u8>,
        correlation_id: &str,
    ) -> Result<(), AmqpError> {
        publisher::publish_raw(&self.channel, exchange, routing_key, &body, correlation_id).await
    }

    async fn ack(&self, delivery_tag: u64) -> Result<(), AmqpError> {
        match self
            .channel
            .basic_ack(delivery_tag, BasicAckOptions { multiple: false })
            .await
        {
            Err(err) => {
                error!(error = err.to_string(), "error whiling ack msg");
                Err(AmqpError::AckMessageError)
            }
            _ => Ok(()),
        }
    }
}

/// One delivered frame awaiting processing.
pub(crate) struct InboundMessage {
    pub(crate) delivery_tag: u64,
    pub(crate) correlation_id: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) body: Vec<u8>,
}

impl InboundMessage {
    pub(crate) fn from_delivery(delivery: &Delivery) -> Self {
        InboundMessage {
            delivery_tag: delivery.delivery_tag,
            correlation_id: delivery
                .properties
                .correlation_id()
                .as_ref()
                .map(|id| id.as_str().to_owned()),
            content_type: delivery
                .properties
                .content_type()
                .as_ref()
                .map(|ct| ct.as_str().to_owned()),
            body: delivery.data.clone(),
        }
    }
}

/// Processes one frame: decode, work, reply, acknowledge.
///
/// The correlation scope is entered for the whole processing and restored
/// on every exit path. With `ack_on_error` (the default policy) the frame
/// is acknowledged even when the worker reports an error, trading
/// redelivery for duplicate-free progress.
pub(crate) async fn process_delivery(
    io: &dyn DeliveryChannel,
    worker: &dyn Worker,
    msg: InboundMessage,
    to_routing: Option<&str>,
    ack_on_error: bool,
) -> Result<(), AmqpError> {
    let correlation_id = msg.correlation_id.clone();
    correlation::scope(correlation_id.clone(), async move {
        debug!(
            delivery_tag = msg.delivery_tag,
            content_type = msg.content_type.as_deref().unwrap_or("-"),
            "consuming message"
        );

        let content: Value = match serde_json::from_slice(&msg.body) {
            Ok(content) => content,
            Err(err) => {
                error!(error = err.to_string(), "malformed JSON-message");
                error!(original = %String::from_utf8_lossy(&msg.body), "original message");

                let correlation_id = correlation_id
                    .as_deref()
                    .ok_or(AmqpError::MissingCorrelationId)?;
                let report = json!({
                    "reason": "Malformed JSON-message",
                    "original_message": String::from_utf8_lossy(&msg.body),
                });
                let body =
                    serde_json::to_vec(&report).map_err(|_| AmqpError::ParsePayloadError)?;

                io.send(ERROR_EXCHANGE, ERROR_ROUTING_KEY, body, correlation_id)
                    .await?;
                // an undecodable payload can never succeed on redelivery
                io.ack(msg.delivery_tag).await?;
                return Ok(());
            }
        };

        let outcome = worker.work(content).await;

        if let Some(reply) = outcome.reply {
            let routing_key = to_routing.ok_or(AmqpError::MissingRoutingKey)?;
            let correlation_id = correlation_id
                .as_deref()
                .ok_or(AmqpError::MissingCorrelationId)?;
            let body = serde_json::to_vec(&reply).map_err(|_| AmqpError::ParsePayloadError)?;
            io.send(REPLY_EXCHANGE, routing_key, body, correlation_id)
                .await?;
        }

        if !outcome.error || ack_on_error {
            debug!(delivery_tag = msg.delivery_tag, "sending ack for message");
            io.ack(msg.delivery_tag).await?;
        }

        Ok(())
    })
    .await
}
