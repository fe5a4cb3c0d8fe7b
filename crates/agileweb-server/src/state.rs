//! Shared application state

use agileweb_core::InputLimits;
use agileweb_policy::DecisionEngine;
use agileweb_telemetry::DecisionRecorder;
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::ServerConfig;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
    pub recorder: Arc<Mutex<DecisionRecorder>>,
    pub limits: Arc<InputLimits>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Build the engine and the audit store from configuration
    pub fn new(config: &ServerConfig, metrics: PrometheusHandle) -> agileweb_core::Result<Self> {
        let engine = DecisionEngine::with_config(config.engine.clone())?;

        Ok(Self {
            engine: Arc::new(engine),
            recorder: Arc::new(Mutex::new(DecisionRecorder::new(config.audit_capacity))),
            limits: Arc::new(config.limits.clone()),
            metrics,
        })
    }
}
