//! Fleet Health Index: a weighted blend of four 0-100 sub-scores.
//!
//! | component   | weight | saturates at                          |
//! |-------------|--------|---------------------------------------|
//! | DTC         | 0.30   | 0 active codes (each code costs 33)   |
//! | maintenance | 0.20   | no due/overdue/inspection alerts      |
//! | efficiency  | 0.30   | 35 mpg (10 mpg scores zero)           |
//! | idle        | 0.20   | 0% idle fuel (50% idle scores zero)   |

use serde::Serialize;

use super::domain::{idle_ratio_pct, VehicleRecord};

const W_DTC: f64 = 0.30;
const W_MAINTENANCE: f64 = 0.20;
const W_EFFICIENCY: f64 = 0.30;
const W_IDLE: f64 = 0.20;

const DTC_PENALTY: i64 = 33;
const EFFICIENCY_FLOOR_MPG: f64 = 10.0;
const EFFICIENCY_SPAN_MPG: f64 = 25.0;
const IDLE_PENALTY_PER_PCT: f64 = 2.0;

const MAINTENANCE_MARKERS: [&str; 4] = ["Due", "Overdue", "Maintenance", "Inspection"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthFactor {
    DiagnosticCodes,
    Maintenance,
    FuelEfficiency,
    IdleTime,
}

impl HealthFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DiagnosticCodes => "Active DTCs",
            Self::Maintenance => "Maintenance",
            Self::FuelEfficiency => "Fuel Efficiency",
            Self::IdleTime => "Idle Time",
        }
    }

    pub const fn weight(self) -> f64 {
        match self {
            Self::DiagnosticCodes => W_DTC,
            Self::Maintenance => W_MAINTENANCE,
            Self::FuelEfficiency => W_EFFICIENCY,
            Self::IdleTime => W_IDLE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthComponent {
    pub factor: HealthFactor,
    pub label: &'static str,
    pub score: f64,
    pub weight: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthBreakdown {
    pub components: Vec<HealthComponent>,
    pub health_index: u8,
}

/// Health bucket used by the histogram on the summary card and in assistant replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthBand {
    pub const fn ordered() -> [Self; 4] {
        [Self::Excellent, Self::Good, Self::Fair, Self::Poor]
    }

    pub const fn of(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Excellent,
            70..=79 => Self::Good,
            60..=69 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent (80+)",
            Self::Good => "Good (70-79)",
            Self::Fair => "Fair (60-69)",
            Self::Poor => "Poor (<60)",
        }
    }
}

pub struct HealthScorer;

impl HealthScorer {
    pub fn score(vehicle: &VehicleRecord) -> u8 {
        Self::breakdown(vehicle).health_index
    }

    pub fn breakdown(vehicle: &VehicleRecord) -> HealthBreakdown {
        let dtc_score = dtc_score(vehicle.active_dtcs);
        let maintenance_flag = vehicle
            .alerts
            .iter()
            .find(|alert| MAINTENANCE_MARKERS.iter().any(|m| alert.kind.contains(m)));
        let maintenance_score = if maintenance_flag.is_some() { 0.0 } else { 100.0 };
        let efficiency_score = efficiency_score(vehicle.avg_fuel_efficiency);
        let idle_pct = idle_ratio_pct(vehicle.fuel_idle, vehicle.fuel_consumption_daily).max(0.0);
        let idle_score = clamp_score(100.0 - idle_pct * IDLE_PENALTY_PER_PCT);

        let components = vec![
            HealthComponent {
                factor: HealthFactor::DiagnosticCodes,
                label: HealthFactor::DiagnosticCodes.label(),
                score: dtc_score,
                weight: W_DTC,
                notes: format!("{} active diagnostic code(s)", vehicle.active_dtcs),
            },
            HealthComponent {
                factor: HealthFactor::Maintenance,
                label: HealthFactor::Maintenance.label(),
                score: maintenance_score,
                weight: W_MAINTENANCE,
                notes: match maintenance_flag {
                    Some(alert) => format!("maintenance alert open: {}", alert.kind),
                    None => "no maintenance alerts".to_string(),
                },
            },
            HealthComponent {
                factor: HealthFactor::FuelEfficiency,
                label: HealthFactor::FuelEfficiency.label(),
                score: efficiency_score,
                weight: W_EFFICIENCY,
                notes: format!("{:.1} mpg average", vehicle.avg_fuel_efficiency),
            },
            HealthComponent {
                factor: HealthFactor::IdleTime,
                label: HealthFactor::IdleTime.label(),
                score: idle_score,
                weight: W_IDLE,
                notes: format!("{idle_pct:.1}% of daily fuel burned idling"),
            },
        ];

        let weighted: f64 = components
            .iter()
            .map(|component| component.score * component.weight)
            .sum();
        let health_index = clamp_score(weighted.round()) as u8;

        HealthBreakdown {
            components,
            health_index,
        }
    }

    /// Rounded mean of every vehicle's health index; zero for an empty fleet.
    pub fn fleet_index(vehicles: &[VehicleRecord]) -> u8 {
        if vehicles.is_empty() {
            return 0;
        }

        let total: u64 = vehicles
            .iter()
            .map(|vehicle| u64::from(vehicle.health_index()))
            .sum();
        let mean = total as f64 / vehicles.len() as f64;
        clamp_score(mean.round()) as u8
    }

    /// Vehicle counts per [`HealthBand`], in band order.
    pub fn distribution(vehicles: &[VehicleRecord]) -> [(HealthBand, usize); 4] {
        HealthBand::ordered().map(|band| {
            let count = vehicles
                .iter()
                .filter(|vehicle| HealthBand::of(vehicle.health_index()) == band)
                .count();
            (band, count)
        })
    }
}

fn dtc_score(active_dtcs: u32) -> f64 {
    let penalty = i64::from(active_dtcs).saturating_mul(DTC_PENALTY);
    (100 - penalty).max(0) as f64
}

fn efficiency_score(avg_mpg: f64) -> f64 {
    clamp_score(((avg_mpg - EFFICIENCY_FLOOR_MPG) / EFFICIENCY_SPAN_MPG) * 100.0)
}

/// Clamps to [0, 100]; NaN scores as zero.
fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::domain::{
        EngineTelemetry, FuelType, Severity, VehicleAlert, VehicleStatus, VehicleType,
    };

    fn vehicle(dtcs: u32, alerts: Vec<VehicleAlert>, mpg: f64, daily: f64, idle: f64) -> VehicleRecord {
        VehicleRecord {
            id: "VAN-900".to_string(),
            vin: "1TESTVIN0000000001".to_string(),
            camera_serial: "CAM-VN-2023-900".to_string(),
            vehicle_type: VehicleType::Van,
            fuel_type: FuelType::Diesel,
            status: VehicleStatus::Active,
            fuel_cost_per_mile: 0.3,
            avg_fuel_efficiency: mpg,
            fuel_consumption_daily: daily,
            fuel_moving: (daily - idle).max(0.0),
            fuel_idle: idle,
            total_fuel_cost_daily: 20.0,
            alerts,
            active_dtcs: dtcs,
            telemetry: EngineTelemetry::default(),
        }
    }

    #[test]
    fn saturated_inputs_score_one_hundred() {
        assert_eq!(HealthScorer::score(&vehicle(0, vec![], 35.0, 10.0, 0.0)), 100);
    }

    #[test]
    fn floored_inputs_score_zero() {
        let alerts = vec![VehicleAlert::new("Oil Change Due", Severity::Medium)];
        assert_eq!(HealthScorer::score(&vehicle(3, alerts, 10.0, 10.0, 5.0)), 0);
    }

    #[test]
    fn dtc_penalty_floors_without_going_negative() {
        assert_eq!(dtc_score(0), 100.0);
        assert_eq!(dtc_score(1), 67.0);
        assert_eq!(dtc_score(2), 34.0);
        assert_eq!(dtc_score(4), 0.0);
        assert_eq!(dtc_score(u32::MAX), 0.0);
    }

    #[test]
    fn efficiency_sub_score_is_clamped() {
        assert_eq!(efficiency_score(-5.0), 0.0);
        assert_eq!(efficiency_score(22.5), 50.0);
        assert_eq!(efficiency_score(80.0), 100.0);
        assert_eq!(efficiency_score(f64::NAN), 0.0);
    }

    #[test]
    fn maintenance_markers_are_case_sensitive() {
        let flagged = vehicle(
            0,
            vec![VehicleAlert::new("Brake Inspection Due", Severity::High)],
            35.0,
            10.0,
            0.0,
        );
        let ignored = vehicle(
            0,
            vec![VehicleAlert::new("overdue lowercase", Severity::High)],
            35.0,
            10.0,
            0.0,
        );
        assert_eq!(HealthScorer::score(&flagged), 80);
        assert_eq!(HealthScorer::score(&ignored), 100);
    }

    #[test]
    fn idle_above_half_floors_the_idle_component() {
        let breakdown = HealthScorer::breakdown(&vehicle(0, vec![], 35.0, 10.0, 8.0));
        let idle = breakdown
            .components
            .iter()
            .find(|component| component.factor == HealthFactor::IdleTime)
            .expect("idle component present");
        assert_eq!(idle.score, 0.0);
        assert_eq!(breakdown.health_index, 80);
    }

    #[test]
    fn zero_consumption_does_not_divide_by_zero() {
        assert_eq!(HealthScorer::score(&vehicle(0, vec![], 35.0, 0.0, 3.0)), 100);
    }

    #[test]
    fn monotonic_in_efficiency_and_dtcs() {
        let mut previous = 0;
        for tenth in 0..=450 {
            let mpg = f64::from(tenth) / 10.0;
            let score = HealthScorer::score(&vehicle(1, vec![], mpg, 10.0, 1.0));
            assert!(score >= previous, "score dropped at {mpg} mpg");
            previous = score;
        }

        let mut previous = u8::MAX;
        for dtcs in 0..6 {
            let score = HealthScorer::score(&vehicle(dtcs, vec![], 20.0, 10.0, 1.0));
            assert!(score <= previous, "score rose at {dtcs} DTCs");
            previous = score;
        }
    }

    #[test]
    fn fleet_index_is_rounded_mean() {
        let fleet = vec![
            vehicle(0, vec![], 35.0, 10.0, 0.0),
            vehicle(3, vec![VehicleAlert::new("Oil Change Due", Severity::Low)], 10.0, 10.0, 5.0),
        ];
        assert_eq!(HealthScorer::fleet_index(&fleet), 50);
        assert_eq!(HealthScorer::fleet_index(&[]), 0);
    }

    #[test]
    fn bands_cover_histogram_edges() {
        assert_eq!(HealthBand::of(100), HealthBand::Excellent);
        assert_eq!(HealthBand::of(80), HealthBand::Excellent);
        assert_eq!(HealthBand::of(79), HealthBand::Good);
        assert_eq!(HealthBand::of(60), HealthBand::Fair);
        assert_eq!(HealthBand::of(59), HealthBand::Poor);
    }
}
