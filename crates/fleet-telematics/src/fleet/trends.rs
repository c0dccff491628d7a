//! Series behind the dashboard charts and the per-vehicle telemetry history.
//!
//! Cost per mile by type and the moving/idle split are derived from the snapshot; the dated
//! series come from the reporting backend (see [`crate::fleet::sample::fleet_trends`]).

use serde::{Deserialize, Serialize};

use super::domain::{VehicleRecord, VehicleStatus, VehicleType};
use super::metrics::FleetMetrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    pub value: f64,
}

impl TrendPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyPoint {
    pub label: String,
    pub efficiency: f64,
    pub baseline: f64,
}

/// Alerts raised per severity in one reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub label: String,
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCounts {
    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCost {
    pub vehicle_type: VehicleType,
    pub cost_per_mile: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelUse {
    Moving,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelShare {
    pub category: FuelUse,
    pub fuel: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetTrends {
    pub fuel_consumption: Vec<TrendPoint>,
    pub cost_per_mile_by_type: Vec<TypeCost>,
    pub fuel_idle_vs_moving: Vec<FuelShare>,
    pub efficiency_trend: Vec<EfficiencyPoint>,
    pub daily_fuel_cost: Vec<TrendPoint>,
    pub alerts_over_time: Vec<SeverityCounts>,
}

/// Mean cost per mile for each vehicle type present in `vehicles`, in type order.
pub fn cost_per_mile_by_type(vehicles: &[VehicleRecord]) -> Vec<TypeCost> {
    VehicleType::ordered()
        .into_iter()
        .filter_map(|vehicle_type| {
            let costs: Vec<f64> = vehicles
                .iter()
                .filter(|vehicle| vehicle.vehicle_type == vehicle_type)
                .map(|vehicle| vehicle.fuel_cost_per_mile)
                .collect();
            if costs.is_empty() {
                return None;
            }
            Some(TypeCost {
                vehicle_type,
                cost_per_mile: round_to(costs.iter().sum::<f64>() / costs.len() as f64, 2),
            })
        })
        .collect()
}

pub fn fuel_idle_vs_moving(metrics: &FleetMetrics) -> Vec<FuelShare> {
    let moving = metrics.fuel_consumption_moving;
    let idle = metrics.fuel_consumption_idle;
    let total = moving + idle;
    let share = |fuel: f64| {
        if total > 0.0 {
            round_to(fuel / total * 100.0, 1)
        } else {
            0.0
        }
    };

    vec![
        FuelShare {
            category: FuelUse::Moving,
            fuel: moving,
            percentage: share(moving),
        },
        FuelShare {
            category: FuelUse::Idle,
            fuel: idle,
            percentage: share(idle),
        },
    ]
}

/// Window of the vehicle detail charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryRange {
    Last24Hours,
    #[default]
    Last7Days,
    Last30Days,
}

impl HistoryRange {
    pub const fn ordered() -> [Self; 3] {
        [Self::Last24Hours, Self::Last7Days, Self::Last30Days]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Last24Hours => "Last 24 hours",
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Last24Hours => "24h",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
        }
    }

    pub const fn points(self) -> usize {
        match self {
            Self::Last24Hours => 24,
            Self::Last7Days => 7,
            Self::Last30Days => 30,
        }
    }

    /// Accepts the short key (`24h`) or the label, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ordered().into_iter().find(|range| {
            range.key().eq_ignore_ascii_case(raw) || range.label().eq_ignore_ascii_case(raw)
        })
    }

    fn time_label(self, index: usize) -> String {
        match self {
            Self::Last24Hours => format!("{index}:00"),
            Self::Last7Days | Self::Last30Days => format!("Day {}", index + 1),
        }
    }
}

/// One point of a vehicle's telemetry history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    pub time: String,
    pub rpm: f64,
    pub load: f64,
    pub torque: f64,
    pub coolant: f64,
    pub battery: f64,
    pub oil_pressure: f64,
    pub fuel_level: f64,
    pub def_level: Option<f64>,
    pub speed: f64,
    pub odometer: f64,
    pub dtc_count: u32,
}

/// Telemetry history around the vehicle's current readings.
///
/// Engine and speed series are flat zero unless the vehicle is active. Fuel and DEF drain
/// steadily, the odometer climbs 2.5 miles per point, and the DTC count occasionally shows
/// one extra code. Variation is seeded by the vehicle id, so repeated calls agree.
pub fn telemetry_history(vehicle: &VehicleRecord, range: HistoryRange) -> Vec<TelemetrySample> {
    let gauges = &vehicle.telemetry;
    let running = vehicle.status == VehicleStatus::Active;
    let mut jitter = Jitter::seeded(&vehicle.id);

    (0..range.points())
        .map(|index| {
            let step = index as f64;
            let mut moving = |base: f64, spread: f64| {
                let value = base + jitter.next_centered() * spread;
                if running {
                    round_to(value, 1)
                } else {
                    0.0
                }
            };
            let rpm = moving(f64::from(gauges.engine_rpm), 200.0);
            let load = moving(f64::from(gauges.engine_load), 10.0);
            let torque = moving(f64::from(gauges.engine_torque), 20.0);
            let speed = moving(f64::from(gauges.speed_mph), 10.0);

            TelemetrySample {
                time: range.time_label(index),
                rpm,
                load,
                torque,
                coolant: round_to(
                    f64::from(gauges.coolant_temp) + jitter.next_centered() * 5.0,
                    1,
                ),
                battery: round_to(gauges.battery_voltage + jitter.next_centered() * 0.3, 2),
                oil_pressure: round_to(
                    f64::from(gauges.oil_pressure) + jitter.next_centered() * 5.0,
                    1,
                ),
                fuel_level: (f64::from(gauges.fuel_level) - step * 0.5).max(0.0),
                def_level: gauges
                    .def_level
                    .map(|level| round_to((f64::from(level) - step * 0.1).max(0.0), 1)),
                speed,
                odometer: f64::from(gauges.odometer_miles) + step * 2.5,
                dtc_count: vehicle.active_dtcs + u32::from(jitter.next_u64() % 2 == 1),
            }
        })
        .collect()
}

/// xorshift64 seeded from an FNV-1a hash of the vehicle id.
struct Jitter(u64);

impl Jitter {
    fn seeded(key: &str) -> Self {
        let hash = key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        });
        Self(hash.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[-0.5, 0.5)`.
    fn next_centered(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64 - 0.5
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::sample;

    fn sample_vehicle(id: &str) -> VehicleRecord {
        sample::vehicles()
            .into_iter()
            .find(|vehicle| vehicle.id == id)
            .expect("vehicle in sample fleet")
    }

    #[test]
    fn cost_per_mile_averages_each_type() {
        let costs = cost_per_mile_by_type(&sample::vehicles());
        let types: Vec<VehicleType> = costs.iter().map(|cost| cost.vehicle_type).collect();
        assert_eq!(types, VehicleType::ordered().to_vec());

        let trucks = costs
            .iter()
            .find(|cost| cost.vehicle_type == VehicleType::Truck)
            .expect("trucks present");
        // TRK-142 0.29, TRK-089 0.31, TRK-201 0.27
        assert_eq!(trucks.cost_per_mile, 0.29);

        assert!(cost_per_mile_by_type(&[]).is_empty());
    }

    #[test]
    fn idle_and_moving_shares_cover_the_whole() {
        let split = fuel_idle_vs_moving(&sample::fleet_metrics());
        assert_eq!(split[0].category, FuelUse::Moving);
        assert_eq!(split[1].category, FuelUse::Idle);
        let total: f64 = split.iter().map(|share| share.percentage).sum();
        assert!((total - 100.0).abs() < 0.11);
        assert!(split[0].fuel > split[1].fuel);
    }

    #[test]
    fn ranges_parse_from_key_or_label() {
        assert_eq!(HistoryRange::parse("24H"), Some(HistoryRange::Last24Hours));
        assert_eq!(
            HistoryRange::parse("last 30 days"),
            Some(HistoryRange::Last30Days)
        );
        assert_eq!(HistoryRange::parse("fortnight"), None);
        assert_eq!(HistoryRange::default(), HistoryRange::Last7Days);
    }

    #[test]
    fn history_is_repeatable_and_sized_to_the_range() {
        let van = sample_vehicle("VAN-001");
        for range in HistoryRange::ordered() {
            let history = telemetry_history(&van, range);
            assert_eq!(history.len(), range.points());
            assert_eq!(history, telemetry_history(&van, range));
        }

        let hourly = telemetry_history(&van, HistoryRange::Last24Hours);
        assert_eq!(hourly[0].time, "0:00");
        assert_eq!(hourly[23].time, "23:00");
        let daily = telemetry_history(&van, HistoryRange::Last7Days);
        assert_eq!(daily[6].time, "Day 7");
    }

    #[test]
    fn history_follows_current_readings() {
        let van = sample_vehicle("VAN-001");
        let history = telemetry_history(&van, HistoryRange::Last30Days);

        for sample in &history {
            assert!((sample.rpm - 920.0).abs() <= 100.0);
            assert!((sample.battery - 12.2).abs() <= 0.16);
            assert!(sample.dtc_count == 2 || sample.dtc_count == 3);
            assert!(sample.def_level.is_some());
        }
        assert!(history
            .windows(2)
            .all(|pair| pair[1].fuel_level <= pair[0].fuel_level
                && pair[1].odometer > pair[0].odometer));
        assert_eq!(history[29].odometer, 28_100.0 + 29.0 * 2.5);
    }

    #[test]
    fn parked_vehicles_report_no_engine_activity() {
        let truck = sample_vehicle("TRK-142");
        let history = telemetry_history(&truck, HistoryRange::Last24Hours);
        assert!(history
            .iter()
            .all(|sample| sample.rpm == 0.0 && sample.load == 0.0 && sample.speed == 0.0));

        let car = sample_vehicle("CAR-156");
        assert!(telemetry_history(&car, HistoryRange::Last7Days)
            .iter()
            .all(|sample| sample.def_level.is_none()));
    }
}
