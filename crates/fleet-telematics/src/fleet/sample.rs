//! Deterministic demo fleet used by the CLI, the HTTP service and the tests.

use chrono::NaiveDate;

use super::alerts::{
    AlertFeedEntry, DtcDetail, DtcStatus, MaintenanceItem, MaintenanceSchedule, MaintenanceStatus,
};
use super::domain::{
    EngineTelemetry, FuelType, Severity, VehicleAlert, VehicleRecord, VehicleStatus, VehicleType,
};
use super::metrics::{FleetBaselines, FleetMetrics, FleetSnapshot};
use super::trends::{self, EfficiencyPoint, FleetTrends, SeverityCounts, TrendPoint};
use super::triggers::{Comparator, TelemetryParam, ThresholdRule};

/// Daily fuel figures: cost/mile, mpg, daily, moving, idle, daily cost.
type FuelFigures = [f64; 6];

struct Identity {
    id: &'static str,
    vin: &'static str,
    camera: &'static str,
    kind: VehicleType,
    fuel: FuelType,
    status: VehicleStatus,
}

fn record(
    identity: Identity,
    figures: FuelFigures,
    alerts: &[(&str, Severity)],
    active_dtcs: u32,
    telemetry: EngineTelemetry,
) -> VehicleRecord {
    let [cost_per_mile, mpg, daily, moving, idle, cost_daily] = figures;
    VehicleRecord {
        id: identity.id.to_string(),
        vin: identity.vin.to_string(),
        camera_serial: identity.camera.to_string(),
        vehicle_type: identity.kind,
        fuel_type: identity.fuel,
        status: identity.status,
        fuel_cost_per_mile: cost_per_mile,
        avg_fuel_efficiency: mpg,
        fuel_consumption_daily: daily,
        fuel_moving: moving,
        fuel_idle: idle,
        total_fuel_cost_daily: cost_daily,
        alerts: alerts
            .iter()
            .map(|(kind, severity)| VehicleAlert::new(*kind, *severity))
            .collect(),
        active_dtcs,
        telemetry,
    }
}

/// rpm, load, torque, oil pressure, fuel level, speed, odometer, oil life.
type Gauges = (u32, u8, u32, u32, u8, u32, u32, u8);

fn engine(
    gauges: Gauges,
    battery_voltage: f64,
    coolant_temp: i32,
    def_level: Option<u8>,
    tire_pressures_psi: [f64; 4],
) -> EngineTelemetry {
    let (
        engine_rpm,
        engine_load,
        engine_torque,
        oil_pressure,
        fuel_level,
        speed_mph,
        odometer_miles,
        engine_oil_life,
    ) = gauges;
    EngineTelemetry {
        engine_rpm,
        engine_load,
        engine_torque,
        battery_voltage,
        coolant_temp,
        oil_pressure,
        fuel_level,
        def_level,
        speed_mph,
        odometer_miles,
        engine_oil_life,
        tire_pressures_psi,
    }
}

#[rustfmt::skip]
pub fn vehicles() -> Vec<VehicleRecord> {
    use FuelType::{Diesel, Gas, Hybrid};
    use Severity::{Critical, High, Low, Medium};
    use VehicleStatus::{Active, Idle, InService};
    use VehicleType::{Car, Truck, Van};

    vec![
        record(
            Identity { id: "VAN-001", vin: "1GCHK23D7PF123456", camera: "CAM-VN-2023-001", kind: Van, fuel: Diesel, status: Active },
            [0.39, 20.0, 15.2, 11.8, 3.4, 22.80],
            &[("Engine Fault (P0300)", Critical), ("Oil Change Due", Medium)],
            2,
            engine((920, 32, 145, 45, 58, 24, 28_100, 65), 12.2, 93, Some(35), [32.5, 32.8, 31.9, 32.2]),
        ),
        record(
            Identity { id: "TRK-142", vin: "IFTSW21R08E899001", camera: "CAM-TK-2023-142", kind: Truck, fuel: Diesel, status: Idle },
            [0.29, 14.6, 8.3, 5.1, 3.2, 12.45],
            &[("Low Tire Pressure", High), ("DEF Low", High)],
            2,
            engine((0, 0, 0, 0, 46, 0, 48_750, 45), 11.8, 40, Some(8), [28.5, 29.0, 28.2, 28.8]),
        ),
        record(
            Identity { id: "CAR-227", vin: "WVWZZZ1JZW000001", camera: "CAM-CR-2023-227", kind: Car, fuel: Gas, status: Active },
            [0.42, 23.1, 12.5, 10.2, 2.3, 18.75],
            &[("Battery Low", Medium)],
            1,
            engine((650, 8, 65, 38, 53, 0, 20_000, 78), 12.1, 88, None, [33.2, 33.5, 32.8, 33.0]),
        ),
        record(
            Identity { id: "VAN-003", vin: "1FTFW1ET5DFC10312", camera: "CAM-VN-2023-003", kind: Van, fuel: Gas, status: InService },
            [0.35, 18.6, 0.0, 0.0, 0.0, 0.0],
            &[("Scheduled Maintenance", Low)],
            1,
            engine((0, 0, 0, 0, 72, 0, 35_350, 35), 12.4, 25, None, [32.0, 32.3, 31.7, 32.1]),
        ),
        record(
            Identity { id: "CAR-156", vin: "5YJSA1E14HF123789", camera: "CAM-CR-2023-156", kind: Car, fuel: Hybrid, status: Active },
            [0.24, 33.4, 8.7, 7.8, 0.9, 13.05],
            &[],
            0,
            engine((1200, 25, 95, 42, 68, 28, 7_675, 92), 13.2, 82, None, [34.1, 34.2, 33.8, 34.0]),
        ),
        record(
            Identity { id: "TRK-089", vin: "1HGBH41JXMN109186", camera: "CAM-TK-2023-089", kind: Truck, fuel: Diesel, status: Active },
            [0.31, 16.7, 18.5, 14.2, 4.3, 27.75],
            &[("P0191 - Fuel Pressure", Critical), ("DEF Low", High)],
            2,
            engine((1100, 45, 280, 48, 42, 40, 55_450, 52), 12.8, 96, Some(8), [31.8, 32.1, 31.5, 31.9]),
        ),
        record(
            Identity { id: "VAN-045", vin: "2HKRL18H8XH123456", camera: "CAM-VN-2023-045", kind: Van, fuel: Gas, status: Active },
            [0.37, 20.7, 14.1, 11.5, 2.6, 21.15],
            &[("P0101 - MAF Circuit", High)],
            1,
            engine((850, 28, 125, 44, 61, 52, 54_780, 68), 12.3, 91, None, [32.7, 32.9, 32.4, 32.6]),
        ),
        record(
            Identity { id: "CAR-334", vin: "JH4KA7650NC123456", camera: "CAM-CR-2023-334", kind: Car, fuel: Gas, status: Active },
            [0.34, 24.0, 11.3, 9.8, 1.5, 16.95],
            &[("P0340 - Camshaft Pos", Medium)],
            1,
            engine((720, 18, 78, 40, 58, 48, 28_900, 81), 12.5, 86, None, [33.5, 33.7, 33.2, 33.4]),
        ),
        record(
            Identity { id: "VAN-078", vin: "1FTFW1EV9DFC10312", camera: "CAM-VN-2023-078", kind: Van, fuel: Diesel, status: Idle },
            [0.35, 19.3, 2.1, 0.0, 2.1, 3.15],
            &[("Extended Idle", Medium)],
            1,
            engine((750, 5, 15, 35, 45, 0, 67_340, 42), 12.0, 78, Some(42), [31.2, 31.5, 30.9, 31.3]),
        ),
        record(
            Identity { id: "TRK-201", vin: "1HGCM82633A004352", camera: "CAM-TK-2023-201", kind: Truck, fuel: Diesel, status: Active },
            [0.27, 17.6, 16.8, 13.9, 2.9, 25.20],
            &[("Tire Rotation Due", Medium)],
            1,
            engine((980, 38, 245, 46, 55, 58, 92_180, 58), 12.6, 94, Some(28), [32.3, 32.6, 32.0, 32.4]),
        ),
        record(
            Identity { id: "CAR-445", vin: "WBADT43452G123456", camera: "CAM-CR-2023-445", kind: Car, fuel: Gas, status: Active },
            [0.32, 27.0, 9.8, 8.9, 0.9, 14.70],
            &[],
            0,
            engine((680, 15, 68, 41, 72, 42, 18_650, 88), 12.7, 84, None, [33.8, 34.0, 33.5, 33.7]),
        ),
    ]
}

/// KPI snapshot derived from [`vehicles`] and [`maintenance_schedule`].
pub fn fleet_metrics() -> FleetMetrics {
    FleetMetrics::from_vehicles(
        &vehicles(),
        FleetBaselines::default(),
        maintenance_schedule().overdue_count(),
    )
}

pub fn snapshot() -> FleetSnapshot {
    FleetSnapshot::new(fleet_metrics(), vehicles())
}

/// Seven-day DTC alert feed, newest first.
pub fn alert_feed() -> Vec<AlertFeedEntry> {
    const FEED: [(&str, &str, Severity, &str); 71] = [
        ("VAN-001", "P0300 - Random Misfire", Severity::Critical, "2h ago"),
        ("TRK-142", "P0401 - DEF Low Flow", Severity::High, "3h ago"),
        ("CAR-227", "P0562 - Low Voltage", Severity::Medium, "5h ago"),
        ("VAN-001", "P0171 - System Lean", Severity::Medium, "8h ago"),
        ("TRK-142", "C2120 - TPMS Warning", Severity::High, "10h ago"),
        ("CAR-227", "Extended Idle", Severity::Low, "12h ago"),
        ("VAN-001", "P0128 - Thermostat", Severity::Low, "14h ago"),
        ("TRK-142", "High Engine Load", Severity::High, "16h ago"),
        ("VAN-003", "P0420 - Catalyst", Severity::Medium, "18h ago"),
        ("CAR-156", "Battery Charging", Severity::Medium, "20h ago"),
        ("VAN-045", "P0101 - MAF Circuit", Severity::High, "22h ago"),
        ("TRK-089", "P0191 - Fuel Pressure", Severity::Critical, "1d ago"),
        ("CAR-334", "P0340 - Camshaft", Severity::Medium, "1d ago"),
        ("VAN-001", "Oil Overheat", Severity::High, "1d ago"),
        ("TRK-142", "Brake Wear", Severity::Medium, "1d ago"),
        ("VAN-078", "Extended Idle", Severity::Medium, "1d ago"),
        ("TRK-201", "Tire Pressure", Severity::High, "1d ago"),
        ("CAR-445", "P0506 - Idle Low", Severity::Low, "1d ago"),
        ("VAN-001", "Coolant High", Severity::High, "2d ago"),
        ("TRK-142", "DEF Quality", Severity::Medium, "2d ago"),
        ("CAR-227", "P0455 - EVAP Leak", Severity::Medium, "2d ago"),
        ("VAN-003", "P0133 - O2 Sensor", Severity::Low, "2d ago"),
        ("CAR-156", "Charging System", Severity::Medium, "2d ago"),
        ("TRK-089", "Turbo Boost", Severity::High, "2d ago"),
        ("VAN-045", "P0171 - System Lean", Severity::Medium, "2d ago"),
        ("CAR-334", "ABS Warning", Severity::High, "2d ago"),
        ("VAN-078", "Fuel Level Low", Severity::Low, "3d ago"),
        ("TRK-201", "P0299 - Turbo Underboost", Severity::Medium, "3d ago"),
        ("CAR-445", "P0442 - EVAP Small Leak", Severity::Low, "3d ago"),
        ("VAN-001", "P0507 - Idle High", Severity::Low, "3d ago"),
        ("TRK-142", "Regeneration Needed", Severity::Medium, "3d ago"),
        ("CAR-227", "P0171 - Lean Condition", Severity::Medium, "3d ago"),
        ("VAN-003", "IAT High", Severity::Low, "3d ago"),
        ("CAR-156", "P0135 - O2 Heater", Severity::Low, "3d ago"),
        ("TRK-089", "EGR Flow", Severity::Medium, "3d ago"),
        ("VAN-045", "P0174 - System Lean B2", Severity::Medium, "4d ago"),
        ("CAR-334", "Knock Sensor", Severity::Low, "4d ago"),
        ("VAN-078", "P0711 - Trans Temp", Severity::High, "4d ago"),
        ("TRK-201", "Coolant Level", Severity::Medium, "4d ago"),
        ("CAR-445", "MAP Sensor", Severity::Medium, "4d ago"),
        ("VAN-001", "P0301 - Cyl 1 Misfire", Severity::Critical, "4d ago"),
        ("TRK-142", "Air Filter Clogged", Severity::Low, "4d ago"),
        ("CAR-227", "P0443 - EVAP Purge", Severity::Low, "4d ago"),
        ("VAN-003", "Fuel Trim", Severity::Low, "5d ago"),
        ("CAR-156", "P0172 - Rich Condition", Severity::Medium, "5d ago"),
        ("TRK-089", "Boost Pressure", Severity::High, "5d ago"),
        ("VAN-045", "P0134 - O2 Circuit", Severity::Low, "5d ago"),
        ("CAR-334", "Throttle Position", Severity::Medium, "5d ago"),
        ("VAN-078", "P0725 - Speed Sensor", Severity::Low, "5d ago"),
        ("TRK-201", "Injector Circuit", Severity::High, "5d ago"),
        ("CAR-445", "P0500 - VSS Malfunction", Severity::Medium, "5d ago"),
        ("VAN-001", "Fuel Pressure", Severity::High, "6d ago"),
        ("TRK-142", "P0405 - EGR Sensor", Severity::Low, "6d ago"),
        ("CAR-227", "P0113 - IAT High", Severity::Low, "6d ago"),
        ("VAN-003", "Accelerator Pedal", Severity::Low, "6d ago"),
        ("CAR-156", "P0325 - Knock Sensor", Severity::Medium, "6d ago"),
        ("TRK-089", "Exhaust Temp High", Severity::High, "6d ago"),
        ("VAN-045", "P0335 - Crankshaft", Severity::Critical, "6d ago"),
        ("CAR-334", "Cooling Fan", Severity::Low, "6d ago"),
        ("VAN-078", "P0711 - Trans Temp", Severity::Medium, "6d ago"),
        ("TRK-201", "Glow Plug", Severity::Low, "6d ago"),
        ("CAR-445", "P0141 - O2 Heater B1S2", Severity::Low, "6d ago"),
        ("VAN-001", "Idle Control", Severity::Low, "7d ago"),
        ("TRK-142", "P0403 - EGR Control", Severity::Medium, "7d ago"),
        ("CAR-227", "P0420 - Catalyst B1", Severity::Medium, "7d ago"),
        ("VAN-003", "Vacuum Leak", Severity::Low, "7d ago"),
        ("CAR-156", "Hybrid Battery", Severity::High, "7d ago"),
        ("TRK-089", "Aftertreatment", Severity::Medium, "7d ago"),
        ("VAN-045", "P0505 - Idle Control", Severity::Low, "7d ago"),
        ("CAR-334", "P0700 - Trans Control", Severity::Medium, "7d ago"),
        ("VAN-078", "P0750 - Shift Solenoid", Severity::High, "7d ago"),
    ];

    FEED.iter()
        .zip(1u32..)
        .map(|((vehicle, kind, severity, timestamp), id)| AlertFeedEntry {
            id,
            vehicle: vehicle.to_string(),
            kind: kind.to_string(),
            severity: *severity,
            timestamp: timestamp.to_string(),
        })
        .collect()
}

#[rustfmt::skip]
pub fn maintenance_schedule() -> MaintenanceSchedule {
    const ITEMS: [(&str, &str, &str, Severity, MaintenanceStatus); 33] = [
        ("Oil Change", "VAN-001", "15/03/2024", Severity::High, MaintenanceStatus::Overdue),
        ("Tire Rotation", "CAR-227", "20/04/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Brake Inspection", "TRK-142", "25/04/2024", Severity::High, MaintenanceStatus::Upcoming),
        ("Air Filter Change", "VAN-003", "28/04/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("DEF System Service", "TRK-142", "05/05/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Coolant Flush", "CAR-156", "10/05/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Transmission Service", "VAN-001", "15/05/2024", Severity::High, MaintenanceStatus::Upcoming),
        ("Battery Check", "CAR-227", "18/05/2024", Severity::Low, MaintenanceStatus::Upcoming),
        ("Wheel Alignment", "TRK-089", "22/05/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Fuel Filter Change", "VAN-045", "25/05/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Spark Plug Replacement", "CAR-227", "30/05/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Serpentine Belt", "VAN-001", "02/06/2024", Severity::High, MaintenanceStatus::Upcoming),
        ("Cabin Air Filter", "CAR-156", "05/06/2024", Severity::Low, MaintenanceStatus::Upcoming),
        ("Differential Service", "TRK-142", "08/06/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Power Steering Fluid", "VAN-003", "12/06/2024", Severity::Low, MaintenanceStatus::Upcoming),
        ("Wiper Blade Replacement", "CAR-334", "15/06/2024", Severity::Low, MaintenanceStatus::Upcoming),
        ("Timing Belt", "VAN-045", "18/06/2024", Severity::Critical, MaintenanceStatus::Upcoming),
        ("Shock Absorbers", "TRK-089", "22/06/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Ball Joints Inspection", "CAR-445", "25/06/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Exhaust System Check", "VAN-078", "28/06/2024", Severity::Low, MaintenanceStatus::Upcoming),
        ("Engine Air Filter", "TRK-201", "01/07/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("PCV Valve", "CAR-227", "05/07/2024", Severity::Low, MaintenanceStatus::Upcoming),
        ("Drive Belt Tensioner", "VAN-001", "08/07/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Radiator Hoses", "TRK-142", "12/07/2024", Severity::High, MaintenanceStatus::Upcoming),
        ("Thermostat Check", "CAR-156", "15/07/2024", Severity::Low, MaintenanceStatus::Upcoming),
        ("Fuel Injector Cleaning", "VAN-003", "18/07/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Steering Linkage", "TRK-089", "22/07/2024", Severity::High, MaintenanceStatus::Upcoming),
        ("U-Joints Inspection", "CAR-334", "25/07/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Catalytic Converter", "VAN-078", "28/07/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Oxygen Sensors", "TRK-201", "01/08/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("Turbo Inspection", "TRK-089", "05/08/2024", Severity::High, MaintenanceStatus::Upcoming),
        ("EGR Valve Cleaning", "VAN-001", "08/08/2024", Severity::Medium, MaintenanceStatus::Upcoming),
        ("DPF Regeneration", "TRK-142", "12/08/2024", Severity::High, MaintenanceStatus::Upcoming),
    ];

    let items = ITEMS
        .iter()
        .filter_map(|(task, vehicle, due, priority, status)| {
            let due_date = NaiveDate::parse_from_str(due, "%d/%m/%Y").ok()?;
            Some(MaintenanceItem {
                task: task.to_string(),
                vehicle: vehicle.to_string(),
                due_date,
                priority: *priority,
                status: *status,
            })
        })
        .collect();
    MaintenanceSchedule::new(items)
}

/// Fault history for a vehicle; unknown ids have none.
#[rustfmt::skip]
pub fn dtc_details(vehicle_id: &str) -> Vec<DtcDetail> {
    use DtcStatus::{Active, Pending};
    use Severity::{Critical, High, Low, Medium};

    let codes: &[(&str, &str, Severity, DtcStatus, &str)] = match vehicle_id.to_ascii_uppercase().as_str() {
        "VAN-001" => &[
            ("P0300", "Random/Multiple Cylinder Misfire Detected", Critical, Active, "2 hours ago"),
            ("P0171", "System Too Lean (Bank 1)", Medium, Active, "5 hours ago"),
        ],
        "TRK-142" => &[
            ("C2120", "Low Tire Pressure Warning", High, Active, "1 hour ago"),
            ("P0401", "DEF System Low Flow", High, Active, "3 hours ago"),
        ],
        "CAR-227" => &[("P0562", "System Voltage Low", Medium, Active, "30 min ago")],
        "VAN-003" => &[("B1234", "Service Reminder", Low, Pending, "1 day ago")],
        _ => &[],
    };

    codes
        .iter()
        .map(|(code, description, severity, status, timestamp)| DtcDetail {
            code: code.to_string(),
            description: description.to_string(),
            severity: *severity,
            status: *status,
            timestamp: timestamp.to_string(),
        })
        .collect()
}

/// Dashboard chart series for the sample fleet.
pub fn fleet_trends() -> FleetTrends {
    let vehicles = vehicles();
    let metrics = fleet_metrics();
    let baseline = metrics.baselines.fuel_efficiency_mpg;

    let fuel_consumption = [
        ("Apr 1", 1.6),
        ("Apr 4", 2.8),
        ("Apr 7", 3.1),
        ("Apr 10", 2.4),
        ("Apr 13", 2.6),
    ];
    let efficiency = [
        ("Apr 1", 19.3),
        ("Apr 4", 20.5),
        ("Apr 7", 20.0),
        ("Apr 10", 19.5),
        ("Apr 13", 20.2),
    ];
    let daily_cost = [
        ("Mon", 62.5),
        ("Tue", 71.2),
        ("Wed", 68.9),
        ("Thu", 65.3),
        ("Fri", 73.4),
        ("Sat", 55.8),
        ("Sun", 41.7),
    ];
    // label, critical, high, medium, low
    let alerts = [
        ("Sep 21", 0, 1, 1, 0),
        ("Sep 28", 1, 0, 2, 1),
        ("Oct 5", 0, 2, 1, 0),
        ("Oct 12", 1, 1, 0, 2),
        ("Oct 19", 2, 2, 1, 1),
    ];

    FleetTrends {
        fuel_consumption: fuel_consumption
            .iter()
            .map(|(label, value)| TrendPoint::new(*label, *value))
            .collect(),
        cost_per_mile_by_type: trends::cost_per_mile_by_type(&vehicles),
        fuel_idle_vs_moving: trends::fuel_idle_vs_moving(&metrics),
        efficiency_trend: efficiency
            .iter()
            .map(|(label, efficiency)| EfficiencyPoint {
                label: label.to_string(),
                efficiency: *efficiency,
                baseline,
            })
            .collect(),
        daily_fuel_cost: daily_cost
            .iter()
            .map(|(label, value)| TrendPoint::new(*label, *value))
            .collect(),
        alerts_over_time: alerts
            .iter()
            .map(|(label, critical, high, medium, low)| SeverityCounts {
                label: label.to_string(),
                critical: *critical,
                high: *high,
                medium: *medium,
                low: *low,
            })
            .collect(),
    }
}

/// Quick threshold alerts configured on the alerts page.
pub fn threshold_rules() -> Vec<ThresholdRule> {
    vec![
        ThresholdRule {
            id: 1,
            enabled: true,
            name: "Overheat".to_string(),
            param: TelemetryParam::CoolantTemp,
            comparator: Comparator::Above,
            threshold: 110.0,
            severity: Severity::Critical,
            dwell_secs: 5,
        },
        ThresholdRule {
            id: 2,
            enabled: true,
            name: "Low Battery".to_string(),
            param: TelemetryParam::BatteryVoltage,
            comparator: Comparator::Below,
            threshold: 12.0,
            severity: Severity::High,
            dwell_secs: 300,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_fleet_is_complete_and_unique() {
        let fleet = vehicles();
        assert_eq!(fleet.len(), 11);
        let mut ids: Vec<&str> = fleet.iter().map(|v| v.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 11);
        assert!(fleet
            .iter()
            .all(|v| v.id.starts_with(v.vehicle_type.id_prefix())));
    }

    #[test]
    fn sample_health_matches_formula() {
        let fleet = vehicles();
        let van = fleet.iter().find(|v| v.id == "VAN-001").expect("VAN-001");
        // dtc 34 * .3 + maintenance 0 + mpg 40 * .3 + idle (100 - 44.7) * .2
        assert_eq!(van.health_index(), 33);
        let hybrid = fleet.iter().find(|v| v.id == "CAR-156").expect("CAR-156");
        assert_eq!(hybrid.health_index(), 94);
    }

    #[test]
    fn schedule_and_feed_parse_completely() {
        let schedule = maintenance_schedule();
        assert_eq!(schedule.items().len(), 33);
        assert_eq!(schedule.overdue_count(), 1);
        assert_eq!(
            schedule.items()[0].due_date,
            NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date")
        );

        let feed = alert_feed();
        assert_eq!(feed.len(), 71);
        assert_eq!(feed[0].id, 1);
        assert_eq!(feed[70].id, 71);
    }

    #[test]
    fn trend_series_line_up_with_the_snapshot() {
        let trends = fleet_trends();
        assert_eq!(trends.daily_fuel_cost.len(), 7);
        assert_eq!(trends.fuel_consumption.len(), 5);
        assert_eq!(trends.alerts_over_time.last().map(SeverityCounts::total), Some(6));
        assert!(trends
            .efficiency_trend
            .iter()
            .all(|point| point.baseline == FleetBaselines::default().fuel_efficiency_mpg
                && point.efficiency < point.baseline));
        assert_eq!(trends.cost_per_mile_by_type.len(), 3);
    }

    #[test]
    fn dtc_lookup_is_case_insensitive() {
        assert_eq!(dtc_details("van-001").len(), 2);
        assert!(dtc_details("CAR-156").is_empty());
        assert!(dtc_details("NOPE-000").is_empty());
    }
}
