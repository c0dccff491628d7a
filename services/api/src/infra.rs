use chrono::NaiveDate;
use fleet_telematics::chat::{ChatHistory, ChatSession, FileStore, InMemoryStore, KeyValueStore};
use fleet_telematics::config::ChatConfig;
use fleet_telematics::error::AppError;
use fleet_telematics::fleet::export::{self, ExportKind};
use fleet_telematics::fleet::{
    sample, AlertFeedEntry, AlertFilter, FleetSnapshot, FleetTrends, FuelType, MaintenanceItem,
    MaintenanceSchedule, RuleBook, Severity, SortColumn, SortDirection, ThresholdRule,
    VehicleAlertSummary, VehicleFilter, VehicleQuery, VehicleStatus, VehicleType,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read-only fleet data served by the API and the CLI.
#[derive(Debug, Clone)]
pub(crate) struct FleetData {
    pub(crate) snapshot: Arc<FleetSnapshot>,
    pub(crate) alert_feed: Arc<Vec<AlertFeedEntry>>,
    pub(crate) maintenance: Arc<MaintenanceSchedule>,
    pub(crate) trends: Arc<FleetTrends>,
    pub(crate) threshold_rules: Arc<Vec<ThresholdRule>>,
}

/// Narrows an export to one vehicle and/or an alert filter.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExportScope {
    pub(crate) vehicle: Option<String>,
    pub(crate) alerts: AlertFilter,
}

impl FleetData {
    pub(crate) fn sample() -> Self {
        Self {
            snapshot: Arc::new(sample::snapshot()),
            alert_feed: Arc::new(sample::alert_feed()),
            maintenance: Arc::new(sample::maintenance_schedule()),
            trends: Arc::new(sample::fleet_trends()),
            threshold_rules: Arc::new(sample::threshold_rules()),
        }
    }

    pub(crate) fn maintenance_items(&self, vehicle: Option<&str>) -> Vec<&MaintenanceItem> {
        match vehicle {
            Some(id) => self.maintenance.for_vehicle(id.trim()),
            None => self.maintenance.items().iter().collect(),
        }
    }

    pub(crate) fn export(&self, kind: ExportKind, scope: &ExportScope) -> Result<String, AppError> {
        let csv = match kind {
            ExportKind::AlertFeed => {
                export::alert_feed_csv(scope.alerts.apply_to_feed(&self.alert_feed))?
            }
            ExportKind::VehiclesByAlerts => {
                let ranked = VehicleAlertSummary::rank(&self.snapshot.vehicles);
                export::vehicles_by_alerts_csv(scope.alerts.apply_to_summaries(&ranked))?
            }
            ExportKind::MaintenanceDue => {
                export::maintenance_csv(self.maintenance_items(scope.vehicle.as_deref()))?
            }
            ExportKind::FaultHistory => {
                let id = scope.vehicle.as_deref().ok_or_else(|| {
                    AppError::BadRequest("fault history export needs a vehicle id".to_string())
                })?;
                let vehicle = self
                    .snapshot
                    .vehicle(id)
                    .ok_or_else(|| AppError::NotFound(format!("vehicle {id}")))?;
                export::fault_history_csv(&sample::dtc_details(&vehicle.id))?
            }
            ExportKind::FleetVehicles => match scope.vehicle.as_deref() {
                Some(id) => export::vehicles_csv(self.snapshot.vehicle(id))?,
                None => export::vehicles_csv(&self.snapshot.vehicles)?,
            },
        };
        tracing::info!(export = kind.stem(), "export rendered");
        Ok(csv)
    }
}

/// Fleet data plus the mutable rule book and chat session behind the `/api/v1` routes.
#[derive(Clone)]
pub(crate) struct FleetState {
    pub(crate) data: FleetData,
    pub(crate) rules: Arc<Mutex<RuleBook>>,
    pub(crate) chat: ChatSession,
}

impl FleetState {
    /// Sample fleet wired to the given chat store. Spawns the chat reply worker.
    pub(crate) fn sample(
        store: Box<dyn KeyValueStore>,
        reply_delay: Duration,
    ) -> Result<Self, AppError> {
        let data = FleetData::sample();
        let history = ChatHistory::load(store)?;
        let chat = ChatSession::new(history, Arc::clone(&data.snapshot), reply_delay);

        Ok(Self {
            data,
            rules: Arc::new(Mutex::new(RuleBook::defaults())),
            chat,
        })
    }
}

/// Raw explorer parameters as they arrive from a query string or the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VehicleListParams {
    pub(crate) search: Option<String>,
    #[serde(rename = "type")]
    pub(crate) vehicle_type: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) fuel: Option<String>,
    pub(crate) severity: Option<String>,
    pub(crate) sort: Option<String>,
    pub(crate) direction: Option<String>,
    pub(crate) page: Option<usize>,
}

impl VehicleListParams {
    pub(crate) fn into_query(self) -> Result<VehicleQuery, AppError> {
        let filter = VehicleFilter {
            search: self.search.filter(|term| !term.trim().is_empty()),
            vehicle_type: parse_choice(
                "vehicle type",
                self.vehicle_type.as_deref(),
                VehicleType::parse,
            )?,
            status: parse_choice("status", self.status.as_deref(), VehicleStatus::parse)?,
            fuel_type: parse_choice("fuel type", self.fuel.as_deref(), FuelType::parse)?,
            alert_severity: parse_choice("severity", self.severity.as_deref(), Severity::parse)?,
        };

        let mut query = VehicleQuery::new(filter);
        let sort = parse_choice("sort column", self.sort.as_deref(), SortColumn::parse)?;
        if let Some(column) = sort {
            let direction = parse_choice(
                "sort direction",
                self.direction.as_deref(),
                SortDirection::parse,
            )?
            .unwrap_or_default();
            query.set_sort(column, direction);
        }
        query.set_page(self.page.unwrap_or(1));
        Ok(query)
    }
}

pub(crate) fn file_chat_store(config: &ChatConfig) -> Box<dyn KeyValueStore> {
    let store = FileStore::new(config.storage_dir.clone());
    tracing::debug!(dir = %store.root().display(), "using file chat store");
    Box::new(store)
}

pub(crate) fn memory_chat_store() -> Box<dyn KeyValueStore> {
    Box::new(InMemoryStore::new())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Treats empty values (`?type=`) as absent and rejects anything `parse` refuses.
pub(crate) fn parse_choice<T>(
    name: &str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("unsupported {name} '{value}'"))),
    }
}
