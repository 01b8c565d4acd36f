#![allow(clippy::unwrap_used)] // Supporting infrastructure - unwrap() acceptable for now
//! `tracing` spans around model construction and stepping.
//!
//! This module never installs a global subscriber — that would fight
//! whatever subscriber the embedding application has already set up.
//! Binaries linking this crate are expected to call
//! `tracing_subscriber::fmt()::init()` (or equivalent) themselves.

use tracing::{instrument, span, Level, Span};

use crate::id::NodeId;

/// Tracer configuration.
#[derive(Debug, Clone)]
pub struct TracerConfig {
    /// Service name attached to every span.
    pub service_name: String,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            service_name: "process-engine".to_string(),
        }
    }
}

/// Spans around process model construction and instance stepping.
pub struct EngineTracer {
    config: TracerConfig,
}

impl EngineTracer {
    /// Create a tracer with the given configuration.
    pub fn new(config: TracerConfig) -> Self {
        Self { config }
    }

    /// Span around a single combinator call (e.g. `append`, `one_of`).
    #[instrument(skip(self))]
    pub fn start_model_construction_span(&self, op: &str) -> Span {
        span!(
            Level::INFO,
            "model.construct",
            model.op = op,
            engine.service = %self.config.service_name
        )
    }

    /// Span around a `ProcessInstance`'s lifetime.
    #[instrument(skip(self))]
    pub fn start_instance_span(&self, instance_id: &NodeId) -> Span {
        span!(
            Level::INFO,
            "instance",
            instance.id = %instance_id,
            engine.service = %self.config.service_name
        )
    }

    /// Span around a single fixed-point iteration of `advance_once`.
    #[instrument(skip(self))]
    pub fn start_stepping_span(&self, instance_id: &NodeId, iteration: usize) -> Span {
        span!(
            Level::DEBUG,
            "instance.step",
            instance.id = %instance_id,
            step.iteration = iteration,
            engine.service = %self.config.service_name
        )
    }
}

impl Default for EngineTracer {
    fn default() -> Self {
        Self::new(TracerConfig::default())
    }
}
