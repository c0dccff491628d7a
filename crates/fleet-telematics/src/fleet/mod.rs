//! Fleet domain: vehicle records, health scoring, KPIs and chart series, the vehicle explorer,
//! alerting rules and CSV exports.

pub mod alerts;
pub mod domain;
pub mod export;
pub mod health;
pub mod metrics;
pub mod query;
pub mod rules;
pub mod sample;
pub mod trends;
pub mod triggers;

pub use alerts::{
    AlertFeedEntry, AlertFilter, DtcDetail, MaintenanceItem, MaintenanceSchedule,
    VehicleAlertSummary,
};
pub use domain::{
    FuelType, Severity, VehicleAlert, VehicleRecord, VehicleStatus, VehicleType, VehicleView,
};
pub use health::{HealthBand, HealthScorer};
pub use metrics::{FleetBaselines, FleetMetrics, FleetSnapshot};
pub use query::{paginate, Page, SortColumn, SortDirection, VehicleFilter, VehicleQuery};
pub use rules::{MonitoringRule, RuleBook, RuleEditor};
pub use trends::{FleetTrends, HistoryRange, TelemetrySample};
pub use triggers::{ThresholdRule, TriggeredAlert};
