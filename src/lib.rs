// Copyright (c) 2026, The Amqp-Worker Authors
// MIT License
// All rights reserved.

mod consumer;

pub mod channel;
pub mod config;
pub mod correlation;
pub mod dispatcher;
pub mod errors;
pub mod publisher;
pub mod worker;
