// Copyright (c) 2026, The Amqp-Worker Authors
// MIT License
// All rights reserved.

//! # Error Types for the AMQP Worker
//!
//! This module provides the error type shared by all broker operations.
//! The `AmqpError` enum covers connection and channel failures, publishing
//! and acknowledgment failures, and the precondition violations the worker
//! treats as fatal. Every error carries an [`ErrorKind`] classification that
//! the supervision loop dispatches on: `Transient` errors reset the
//! connection and are retried, `Fatal` errors terminate the loop.

use thiserror::Error;

/// Represents errors that can occur during AMQP/RabbitMQ operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmqpError {
    /// Error establishing a connection to the broker
    #[error("failure to connect")]
    ConnectionError,

    /// Error creating a channel from an established connection
    #[error("failure to create a channel")]
    ChannelError,

    /// Broker-level failure reported by the transport while consuming
    #[error("broker failure: {0}")]
    BrokerError(String),

    /// Error publishing a message
    #[error("failure to publish")]
    PublishingError,

    /// Error serializing a message payload
    #[error("failure to serialize payload")]
    ParsePayloadError,

    /// Error acknowledging a message
    #[error("failure to ack message")]
    AckMessageError,

    /// A publish was attempted without a correlation id, neither explicit
    /// nor available in the active correlation scope
    #[error("no correlation id available for publishing")]
    MissingCorrelationId,

    /// The worker produced a reply but no reply routing key was configured
    #[error("no reply routing key configured")]
    MissingRoutingKey,

    /// Invalid broker configuration, detected before any connection attempt
    #[error("invalid broker configuration: {0}")]
    ConfigurationError(String),

    /// Anything the supervision loop does not recognize as a broker failure
    #[error("unexpected failure: {0}")]
    UnexpectedError(String),
}

/// How the supervision loop should react to an [`AmqpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reset the connection and retry
    Transient,
    /// Terminate the operation that triggered it
    Fatal,
}

impl AmqpError {
    /// Classifies this error for the supervision loop.
    ///
    /// Connection, channel and publishing failures are broker-side and
    /// transient; precondition violations and unknown failures are fatal.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AmqpError::ConnectionError
            | AmqpError::ChannelError
            | AmqpError::BrokerError(_)
            | AmqpError::PublishingError
            | AmqpError::AckMessageError => ErrorKind::Transient,

            AmqpError::ParsePayloadError
            | AmqpError::MissingCorrelationId
            | AmqpError::MissingRoutingKey
            | AmqpError::ConfigurationError(_)
            | AmqpError::UnexpectedError(_) => ErrorKind::Fatal,
        }
    }
}

/// Maps a transport-level error onto the worker's taxonomy.
///
/// IO, protocol and connection/channel state errors are what the broker
/// raises when a connection drops or a channel is closed from the other
/// side; those are transient. Everything else is unexpected and fatal.
pub(crate) fn classify(err: lapin::Error) -> AmqpError {
    match &err {
        lapin::Error::IOError(_)
        | lapin::Error::ProtocolError(_)
        | lapin::Error::InvalidConnectionState(_)
        | lapin::Error::InvalidChannelState(_) => AmqpError::BrokerError(err.to_string()),
        _ => AmqpError::UnexpectedError(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_failures_are_transient() {
        assert_eq!(AmqpError::ConnectionError.kind(), ErrorKind::Transient);
        assert_eq!(AmqpError::ChannelError.kind(), ErrorKind::Transient);
        assert_eq!(
            AmqpError::BrokerError("connection refused".to_owned()).kind(),
            ErrorKind::Transient
        );
        assert_eq!(AmqpError::PublishingError.kind(), ErrorKind::Transient);
        assert_eq!(AmqpError::AckMessageError.kind(), ErrorKind::Transient);
    }

    #[test]
    fn precondition_violations_are_fatal() {
        assert_eq!(AmqpError::MissingCorrelationId.kind(), ErrorKind::Fatal);
        assert_eq!(AmqpError::MissingRoutingKey.kind(), ErrorKind::Fatal);
        assert_eq!(
            AmqpError::ConfigurationError("bad".to_owned()).kind(),
            ErrorKind::Fatal
        );
        assert_eq!(
            AmqpError::UnexpectedError("boom".to_owned()).kind(),
            ErrorKind::Fatal
        );
    }
}
