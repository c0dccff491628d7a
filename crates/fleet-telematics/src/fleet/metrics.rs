use serde::{Deserialize, Serialize};

use super::domain::{VehicleRecord, VehicleStatus};
use super::health::HealthScorer;

/// Fault counts for the current and previous reporting windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultTrend {
    pub current: u32,
    pub previous: u32,
}

impl FaultTrend {
    pub fn percent_change(&self) -> Option<f64> {
        if self.previous == 0 {
            None
        } else {
            let delta = f64::from(self.current) - f64::from(self.previous);
            Some(delta / f64::from(self.previous) * 100.0)
        }
    }
}

/// Targets the KPI cards compare against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetBaselines {
    pub fuel_efficiency_mpg: f64,
    pub cost_per_mile: f64,
    pub idle_pct: f64,
}

impl Default for FleetBaselines {
    fn default() -> Self {
        Self {
            fuel_efficiency_mpg: 21.2,
            cost_per_mile: 0.32,
            idle_pct: 15.0,
        }
    }
}

/// Fleet-level KPI snapshot consumed by the dashboard cards and the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetMetrics {
    pub total_vehicles: usize,
    pub vehicles_active: usize,
    pub vehicles_idle: usize,
    pub idle_percentage: f64,
    pub faults_over_time: FaultTrend,
    pub maintenance_due: usize,
    pub maintenance_overdue: usize,
    pub fleet_health_index: u8,
    pub fuel_cost_per_mile: f64,
    pub avg_fuel_efficiency: f64,
    pub total_fuel_consumption_daily: f64,
    pub fuel_consumption_moving: f64,
    pub fuel_consumption_idle: f64,
    pub idle_fuel_percentage: f64,
    pub total_fuel_cost_daily: f64,
    pub baselines: FleetBaselines,
}

impl FleetMetrics {
    /// Derives the KPI snapshot from a vehicle list.
    ///
    /// Averages are taken over vehicles that reported any consumption so that vehicles parked
    /// in the shop do not drag the fleet efficiency toward zero.
    pub fn from_vehicles(
        vehicles: &[VehicleRecord],
        baselines: FleetBaselines,
        maintenance_overdue: usize,
    ) -> Self {
        let total_vehicles = vehicles.len();
        let vehicles_active = count_status(vehicles, VehicleStatus::Active);
        let vehicles_idle = count_status(vehicles, VehicleStatus::Idle);

        let reporting: Vec<&VehicleRecord> = vehicles
            .iter()
            .filter(|vehicle| vehicle.fuel_consumption_daily > 0.0)
            .collect();

        let total_fuel_consumption_daily = sum(vehicles, |v| v.fuel_consumption_daily);
        let fuel_consumption_moving = sum(vehicles, |v| v.fuel_moving);
        let fuel_consumption_idle = sum(vehicles, |v| v.fuel_idle);
        let total_fuel_cost_daily = sum(vehicles, |v| v.total_fuel_cost_daily);

        let active_faults: u32 = vehicles.iter().map(|vehicle| vehicle.active_dtcs).sum();
        let maintenance_due = vehicles
            .iter()
            .filter(|vehicle| vehicle.alerts.iter().any(|alert| alert.is_service_reminder()))
            .count();

        Self {
            total_vehicles,
            vehicles_active,
            vehicles_idle,
            idle_percentage: percentage(vehicles_idle as f64, total_vehicles as f64),
            faults_over_time: FaultTrend {
                current: active_faults,
                previous: 0,
            },
            maintenance_due,
            maintenance_overdue,
            fleet_health_index: HealthScorer::fleet_index(vehicles),
            fuel_cost_per_mile: round_to(mean(&reporting, |v| v.fuel_cost_per_mile), 2),
            avg_fuel_efficiency: round_to(mean(&reporting, |v| v.avg_fuel_efficiency), 1),
            total_fuel_consumption_daily,
            fuel_consumption_moving,
            fuel_consumption_idle,
            idle_fuel_percentage: percentage(fuel_consumption_idle, total_fuel_consumption_daily),
            total_fuel_cost_daily,
            baselines,
        }
    }

    pub fn maintenance_percentage(&self) -> f64 {
        percentage(self.maintenance_due as f64, self.total_vehicles as f64)
    }

    /// True when efficiency has fallen more than 15% under the baseline.
    pub fn efficiency_below_baseline(&self) -> bool {
        self.avg_fuel_efficiency < self.baselines.fuel_efficiency_mpg * 0.85
    }

    pub fn idle_fuel_above_threshold(&self) -> bool {
        self.idle_fuel_percentage > 25.0
    }
}

/// Fleet KPIs paired with the vehicle list they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub metrics: FleetMetrics,
    pub vehicles: Vec<VehicleRecord>,
}

impl FleetSnapshot {
    pub fn new(metrics: FleetMetrics, vehicles: Vec<VehicleRecord>) -> Self {
        Self { metrics, vehicles }
    }

    pub fn vehicle(&self, id: &str) -> Option<&VehicleRecord> {
        self.vehicles
            .iter()
            .find(|vehicle| vehicle.id.eq_ignore_ascii_case(id.trim()))
    }
}

fn count_status(vehicles: &[VehicleRecord], status: VehicleStatus) -> usize {
    vehicles
        .iter()
        .filter(|vehicle| vehicle.status == status)
        .count()
}

fn sum(vehicles: &[VehicleRecord], field: impl Fn(&VehicleRecord) -> f64) -> f64 {
    vehicles.iter().map(field).sum()
}

fn mean(vehicles: &[&VehicleRecord], field: impl Fn(&VehicleRecord) -> f64) -> f64 {
    if vehicles.is_empty() {
        return 0.0;
    }
    vehicles.iter().map(|vehicle| field(*vehicle)).sum::<f64>() / vehicles.len() as f64
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round_to(part / whole * 100.0, 1)
    } else {
        0.0
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::sample;

    #[test]
    fn derives_counts_from_sample_fleet() {
        let vehicles = sample::vehicles();
        let metrics = FleetMetrics::from_vehicles(&vehicles, FleetBaselines::default(), 1);

        assert_eq!(metrics.total_vehicles, vehicles.len());
        assert_eq!(
            metrics.vehicles_active + metrics.vehicles_idle,
            vehicles
                .iter()
                .filter(|v| v.status != VehicleStatus::InService)
                .count()
        );
        assert_eq!(metrics.fleet_health_index, HealthScorer::fleet_index(&vehicles));
        assert!(metrics.total_fuel_cost_daily > 0.0);
        assert!(metrics.idle_fuel_percentage > 0.0 && metrics.idle_fuel_percentage < 100.0);
    }

    #[test]
    fn empty_fleet_yields_zeroed_metrics() {
        let metrics = FleetMetrics::from_vehicles(&[], FleetBaselines::default(), 0);
        assert_eq!(metrics.total_vehicles, 0);
        assert_eq!(metrics.idle_percentage, 0.0);
        assert_eq!(metrics.avg_fuel_efficiency, 0.0);
        assert_eq!(metrics.fleet_health_index, 0);
    }

    #[test]
    fn fault_trend_reports_percent_change() {
        let trend = FaultTrend {
            current: 3,
            previous: 2,
        };
        assert_eq!(trend.percent_change(), Some(50.0));
        assert_eq!(FaultTrend::default().percent_change(), None);
    }
}
