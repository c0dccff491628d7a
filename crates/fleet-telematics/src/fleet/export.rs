//! CSV exports. Every export writes its header row first, even when there are no rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::alerts::{AlertFeedEntry, DtcDetail, MaintenanceItem, VehicleAlertSummary};
use super::domain::VehicleRecord;

const ALERT_FEED_HEADERS: [&str; 4] = ["Vehicle", "Alert Type", "Severity", "Timestamp"];
const VEHICLES_BY_ALERTS_HEADERS: [&str; 4] = ["Vehicle", "Alert Count", "Top Severity", "Alerts"];
const MAINTENANCE_HEADERS: [&str; 4] = ["Vehicle", "Task", "Due Date", "Status"];
const FAULT_HISTORY_HEADERS: [&str; 5] = ["Code", "Description", "Severity", "Status", "Timestamp"];
const VEHICLE_HEADERS: [&str; 13] = [
    "Vehicle ID",
    "VIN",
    "Type",
    "Fuel Type",
    "Camera SN",
    "Status",
    "Health",
    "Cost/mile",
    "Efficiency",
    "Fuel Daily",
    "Moving/Idle",
    "Cost Daily",
    "Alerts",
];

const LIST_SEPARATOR: &str = "; ";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    AlertFeed,
    VehiclesByAlerts,
    MaintenanceDue,
    FaultHistory,
    FleetVehicles,
}

impl ExportKind {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::AlertFeed,
            Self::VehiclesByAlerts,
            Self::MaintenanceDue,
            Self::FaultHistory,
            Self::FleetVehicles,
        ]
    }

    /// Stem used for download file names and CLI/HTTP selectors.
    pub const fn stem(self) -> &'static str {
        match self {
            Self::AlertFeed => "alert_feed",
            Self::VehiclesByAlerts => "vehicles_by_alerts",
            Self::MaintenanceDue => "maintenance_due",
            Self::FaultHistory => "fault_history",
            Self::FleetVehicles => "fleet_vehicles",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ordered()
            .into_iter()
            .find(|kind| kind.stem() == normalized)
    }

    /// `{stem}_{YYYY-MM-DD}.csv`
    pub fn file_name(self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.stem(), date.format("%Y-%m-%d"))
    }
}

pub fn alert_feed_csv<'a>(
    entries: impl IntoIterator<Item = &'a AlertFeedEntry>,
) -> Result<String, ExportError> {
    render(
        &ALERT_FEED_HEADERS,
        entries.into_iter().map(|entry| {
            vec![
                entry.vehicle.clone(),
                entry.kind.clone(),
                entry.severity.label().to_string(),
                entry.timestamp.clone(),
            ]
        }),
    )
}

pub fn vehicles_by_alerts_csv<'a>(
    summaries: impl IntoIterator<Item = &'a VehicleAlertSummary>,
) -> Result<String, ExportError> {
    render(
        &VEHICLES_BY_ALERTS_HEADERS,
        summaries.into_iter().map(|summary| {
            let names: Vec<&str> = summary
                .alerts
                .iter()
                .map(|alert| alert.name.as_str())
                .collect();
            vec![
                summary.vehicle.clone(),
                summary.alert_count.to_string(),
                summary.top_severity.label().to_string(),
                names.join(LIST_SEPARATOR),
            ]
        }),
    )
}

/// Due dates keep the dashboard's `dd/mm/yyyy` rendering.
pub fn maintenance_csv<'a>(
    items: impl IntoIterator<Item = &'a MaintenanceItem>,
) -> Result<String, ExportError> {
    render(
        &MAINTENANCE_HEADERS,
        items.into_iter().map(|item| {
            vec![
                item.vehicle.clone(),
                item.task.clone(),
                item.due_date.format("%d/%m/%Y").to_string(),
                item.status.label().to_string(),
            ]
        }),
    )
}

pub fn fault_history_csv<'a>(
    details: impl IntoIterator<Item = &'a DtcDetail>,
) -> Result<String, ExportError> {
    render(
        &FAULT_HISTORY_HEADERS,
        details.into_iter().map(|detail| {
            vec![
                detail.code.clone(),
                detail.description.clone(),
                detail.severity.label().to_string(),
                detail.status.label().to_string(),
                detail.timestamp.clone(),
            ]
        }),
    )
}

pub fn vehicles_csv<'a>(
    vehicles: impl IntoIterator<Item = &'a VehicleRecord>,
) -> Result<String, ExportError> {
    render(
        &VEHICLE_HEADERS,
        vehicles.into_iter().map(|vehicle| {
            vec![
                vehicle.id.clone(),
                vehicle.vin.clone(),
                vehicle.vehicle_type.label().to_string(),
                vehicle.fuel_type.label().to_string(),
                vehicle.camera_serial.clone(),
                vehicle.status.label().to_string(),
                vehicle.health_index().to_string(),
                vehicle.fuel_cost_per_mile.to_string(),
                vehicle.avg_fuel_efficiency.to_string(),
                vehicle.fuel_consumption_daily.to_string(),
                format!("{}/{}", vehicle.fuel_moving, vehicle.fuel_idle),
                vehicle.total_fuel_cost_daily.to_string(),
                vehicle.alert_names().join(LIST_SEPARATOR),
            ]
        }),
    )
}

fn render(
    headers: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    let mut written = 0usize;
    for row in rows {
        writer.write_record(&row)?;
        written += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    tracing::debug!(rows = written, "rendered CSV export");
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::sample;

    #[test]
    fn empty_exports_are_header_only() {
        assert_eq!(
            alert_feed_csv(&Vec::<AlertFeedEntry>::new()).expect("render"),
            "Vehicle,Alert Type,Severity,Timestamp\n"
        );
        assert_eq!(
            fault_history_csv(&Vec::<DtcDetail>::new()).expect("render"),
            "Code,Description,Severity,Status,Timestamp\n"
        );
    }

    #[test]
    fn vehicle_rows_join_alerts_and_split_fuel() {
        let fleet = sample::vehicles();
        let csv = vehicles_csv(fleet.iter().take(1)).expect("render");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Vehicle ID,VIN,Type,Fuel Type,Camera SN,Status,Health,Cost/mile,Efficiency,Fuel Daily,Moving/Idle,Cost Daily,Alerts")
        );
        assert_eq!(
            lines.next(),
            Some("VAN-001,1GCHK23D7PF123456,Van,Diesel,CAM-VN-2023-001,Active,33,0.39,20,15.2,11.8/3.4,22.8,Engine Fault (P0300); Oil Change Due")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn commas_inside_fields_are_quoted() {
        let ranked = VehicleAlertSummary::rank(&sample::vehicles());
        let csv = vehicles_by_alerts_csv(&ranked).expect("render");
        assert_eq!(csv.lines().count(), ranked.len() + 1);

        let schedule = sample::maintenance_schedule();
        let csv = maintenance_csv(schedule.items()).expect("render");
        assert!(csv.contains("VAN-001,Oil Change,15/03/2024,Overdue"));

        let feed = vec![AlertFeedEntry {
            id: 1,
            vehicle: "VAN-001".to_string(),
            kind: "Misfire, cylinder 3".to_string(),
            severity: crate::fleet::Severity::High,
            timestamp: "2h ago".to_string(),
        }];
        let csv = alert_feed_csv(&feed).expect("render");
        assert!(csv.contains("VAN-001,\"Misfire, cylinder 3\",High,2h ago"));
    }

    #[test]
    fn file_names_carry_the_export_date() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 13).expect("valid date");
        assert_eq!(ExportKind::AlertFeed.file_name(date), "alert_feed_2024-04-13.csv");
        assert_eq!(ExportKind::parse("fleet-vehicles"), Some(ExportKind::FleetVehicles));
        assert_eq!(ExportKind::parse("unknown"), None);
    }
}
