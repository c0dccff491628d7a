use serde::{Deserialize, Serialize};

use super::health::{HealthBreakdown, HealthScorer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Van,
    Truck,
    Car,
}

impl VehicleType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Van, Self::Truck, Self::Car]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Van => "Van",
            Self::Truck => "Truck",
            Self::Car => "Car",
        }
    }

    /// Prefix used in fleet identifiers, e.g. `TRK-142`.
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Van => "VAN",
            Self::Truck => "TRK",
            Self::Car => "CAR",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Diesel,
    Gas,
    Hybrid,
    Electric,
}

impl FuelType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Diesel, Self::Gas, Self::Hybrid, Self::Electric]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Diesel => "Diesel",
            Self::Gas => "Gas",
            Self::Hybrid => "Hybrid",
            Self::Electric => "Electric",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|fuel| fuel.label().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleStatus {
    Active,
    Idle,
    #[serde(rename = "In Service")]
    InService,
}

impl VehicleStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Active, Self::Idle, Self::InService]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Idle => "Idle",
            Self::InService => "In Service",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != '_' && *ch != '-')
            .collect();
        Self::ordered().into_iter().find(|status| {
            status
                .label()
                .replace(' ', "")
                .eq_ignore_ascii_case(&normalized)
        })
    }
}

/// Alert severity, declared from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const fn ordered() -> [Self; 4] {
        [Self::Critical, Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Critical => "🔴",
            Self::High => "🟠",
            Self::Medium => "🟡",
            Self::Low => "⚪",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|severity| severity.label().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
}

impl VehicleAlert {
    pub fn new(kind: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind: kind.into(),
            severity,
        }
    }

    /// Alerts the assistant treats as scheduled service work.
    pub fn is_service_reminder(&self) -> bool {
        self.kind.contains("Due") || self.kind.contains("Change")
    }
}

/// OBD-II readings captured with each vehicle snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineTelemetry {
    pub engine_rpm: u32,
    pub engine_load: u8,
    pub engine_torque: u32,
    pub battery_voltage: f64,
    pub coolant_temp: i32,
    pub oil_pressure: u32,
    pub fuel_level: u8,
    #[serde(default)]
    pub def_level: Option<u8>,
    pub speed_mph: u32,
    pub odometer_miles: u32,
    pub engine_oil_life: u8,
    pub tire_pressures_psi: [f64; 4],
}

/// Transient vehicle snapshot. The health index is derived on read and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub id: String,
    pub vin: String,
    #[serde(rename = "cameraSN")]
    pub camera_serial: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub fuel_type: FuelType,
    pub status: VehicleStatus,
    pub fuel_cost_per_mile: f64,
    pub avg_fuel_efficiency: f64,
    pub fuel_consumption_daily: f64,
    pub fuel_moving: f64,
    pub fuel_idle: f64,
    pub total_fuel_cost_daily: f64,
    #[serde(default)]
    pub alerts: Vec<VehicleAlert>,
    #[serde(rename = "activeDTCs")]
    pub active_dtcs: u32,
    #[serde(default)]
    pub telemetry: EngineTelemetry,
}

impl VehicleRecord {
    pub fn health_index(&self) -> u8 {
        HealthScorer::score(self)
    }

    pub fn health_breakdown(&self) -> HealthBreakdown {
        HealthScorer::breakdown(self)
    }

    /// Share of daily fuel burned while idling, as a percentage.
    pub fn idle_fuel_pct(&self) -> f64 {
        idle_ratio_pct(self.fuel_idle, self.fuel_consumption_daily)
    }

    pub fn has_severity(&self, severity: Severity) -> bool {
        self.alerts.iter().any(|alert| alert.severity == severity)
    }

    pub fn top_severity(&self) -> Option<Severity> {
        self.alerts.iter().map(|alert| alert.severity).min()
    }

    pub fn alert_names(&self) -> Vec<&str> {
        self.alerts.iter().map(|alert| alert.kind.as_str()).collect()
    }

    pub fn to_view(&self) -> VehicleView {
        VehicleView {
            id: self.id.clone(),
            vin: self.vin.clone(),
            camera_serial: self.camera_serial.clone(),
            vehicle_type: self.vehicle_type,
            type_label: self.vehicle_type.label(),
            fuel_type: self.fuel_type,
            fuel_label: self.fuel_type.label(),
            status: self.status,
            status_label: self.status.label(),
            health_index: self.health_index(),
            fuel_cost_per_mile: self.fuel_cost_per_mile,
            avg_fuel_efficiency: self.avg_fuel_efficiency,
            fuel_consumption_daily: self.fuel_consumption_daily,
            fuel_moving: self.fuel_moving,
            fuel_idle: self.fuel_idle,
            total_fuel_cost_daily: self.total_fuel_cost_daily,
            alerts: self.alerts.clone(),
            active_dtcs: self.active_dtcs,
        }
    }
}

/// Ratio of idle to total consumption in percent; zero when nothing was consumed.
pub(crate) fn idle_ratio_pct(idle: f64, daily: f64) -> f64 {
    if daily > 0.0 && idle.is_finite() {
        (idle / daily) * 100.0
    } else {
        0.0
    }
}

/// Serializable projection of a vehicle with its derived health index filled in.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleView {
    pub id: String,
    pub vin: String,
    pub camera_serial: String,
    pub vehicle_type: VehicleType,
    pub type_label: &'static str,
    pub fuel_type: FuelType,
    pub fuel_label: &'static str,
    pub status: VehicleStatus,
    pub status_label: &'static str,
    pub health_index: u8,
    pub fuel_cost_per_mile: f64,
    pub avg_fuel_efficiency: f64,
    pub fuel_consumption_daily: f64,
    pub fuel_moving: f64,
    pub fuel_idle: f64,
    pub total_fuel_cost_daily: f64,
    pub alerts: Vec<VehicleAlert>,
    pub active_dtcs: u32,
}
