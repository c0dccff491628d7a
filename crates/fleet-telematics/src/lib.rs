//! Fleet telematics toolkit: vehicle health scoring, KPI aggregation, explorer queries,
//! CSV exports, alerting rules and the rule-based fleet assistant.

pub mod assistant;
pub mod chat;
pub mod config;
pub mod error;
pub mod fleet;
pub mod telemetry;
