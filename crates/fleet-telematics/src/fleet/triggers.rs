//! Quick threshold alerts checked against each vehicle's latest telemetry.

use serde::{Deserialize, Serialize};

use super::domain::{EngineTelemetry, Severity, VehicleRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryParam {
    CoolantTemp,
    BatteryVoltage,
    OilPressure,
    FuelLevel,
    DefLevel,
    EngineLoad,
    EngineRpm,
}

impl TelemetryParam {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CoolantTemp => "Coolant (°C)",
            Self::BatteryVoltage => "Battery (V)",
            Self::OilPressure => "Oil Pressure (psi)",
            Self::FuelLevel => "Fuel Level (%)",
            Self::DefLevel => "DEF Level (%)",
            Self::EngineLoad => "Engine Load (%)",
            Self::EngineRpm => "Engine RPM",
        }
    }

    /// `None` when the vehicle has no such sensor (DEF on petrol cars).
    pub fn read(self, telemetry: &EngineTelemetry) -> Option<f64> {
        match self {
            Self::CoolantTemp => Some(f64::from(telemetry.coolant_temp)),
            Self::BatteryVoltage => Some(telemetry.battery_voltage),
            Self::OilPressure => Some(f64::from(telemetry.oil_pressure)),
            Self::FuelLevel => Some(f64::from(telemetry.fuel_level)),
            Self::DefLevel => telemetry.def_level.map(f64::from),
            Self::EngineLoad => Some(f64::from(telemetry.engine_load)),
            Self::EngineRpm => Some(f64::from(telemetry.engine_rpm)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">")]
    Above,
    #[serde(rename = "<")]
    Below,
}

impl Comparator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Above => ">",
            Self::Below => "<",
        }
    }

    fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Above => value > threshold,
            Self::Below => value < threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRule {
    pub id: u32,
    pub enabled: bool,
    pub name: String,
    pub param: TelemetryParam,
    pub comparator: Comparator,
    pub threshold: f64,
    pub severity: Severity,
    pub dwell_secs: u32,
}

impl ThresholdRule {
    /// Disabled rules never fire. Dwell is not modelled for a single snapshot reading.
    pub fn is_triggered_by(&self, vehicle: &VehicleRecord) -> bool {
        self.enabled
            && self
                .param
                .read(&vehicle.telemetry)
                .is_some_and(|value| self.comparator.holds(value, self.threshold))
    }

    pub fn describe(&self) -> String {
        format!(
            "{} {} {}",
            self.param.label(),
            self.comparator.symbol(),
            self.threshold
        )
    }
}

/// A rule currently firing for a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    pub vehicle: String,
    pub rule: String,
    pub severity: Severity,
}

/// Every (vehicle, rule) pair that fires, in fleet order then rule order.
pub fn currently_triggering(
    rules: &[ThresholdRule],
    vehicles: &[VehicleRecord],
) -> Vec<TriggeredAlert> {
    vehicles
        .iter()
        .flat_map(|vehicle| {
            rules
                .iter()
                .filter(|rule| rule.is_triggered_by(vehicle))
                .map(|rule| TriggeredAlert {
                    vehicle: vehicle.id.clone(),
                    rule: rule.name.clone(),
                    severity: rule.severity,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::sample;

    #[test]
    fn sample_rules_flag_the_flat_battery() {
        let triggering = currently_triggering(&sample::threshold_rules(), &sample::vehicles());
        assert_eq!(
            triggering,
            vec![TriggeredAlert {
                vehicle: "TRK-142".to_string(),
                rule: "Low Battery".to_string(),
                severity: Severity::High,
            }]
        );
    }

    #[test]
    fn disabled_rules_and_missing_sensors_never_fire() {
        let vehicles = sample::vehicles();
        let mut rules = sample::threshold_rules();
        for rule in &mut rules {
            rule.enabled = false;
        }
        assert!(currently_triggering(&rules, &vehicles).is_empty());

        let def_rule = ThresholdRule {
            id: 9,
            enabled: true,
            name: "DEF Low".to_string(),
            param: TelemetryParam::DefLevel,
            comparator: Comparator::Below,
            threshold: 10.0,
            severity: Severity::High,
            dwell_secs: 0,
        };
        let fired: Vec<String> = currently_triggering(std::slice::from_ref(&def_rule), &vehicles)
            .into_iter()
            .map(|alert| alert.vehicle)
            .collect();
        // Petrol cars carry no DEF reading.
        assert_eq!(fired, vec!["TRK-142".to_string(), "TRK-089".to_string()]);
        assert_eq!(def_rule.describe(), "DEF Level (%) < 10");
    }

    #[test]
    fn comparators_are_strict() {
        assert!(!Comparator::Below.holds(12.0, 12.0));
        assert!(Comparator::Below.holds(11.8, 12.0));
        assert!(Comparator::Above.holds(110.5, 110.0));
    }
}
