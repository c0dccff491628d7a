use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Severity, VehicleRecord};

/// Entry in the rolling seven-day DTC alert feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertFeedEntry {
    pub id: u32,
    pub vehicle: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub timestamp: String,
}

/// Severity plus free-text search, shared by the alert feed and the vehicles-by-alerts column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub search: Option<String>,
}

impl AlertFilter {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches_feed_entry(&self, entry: &AlertFeedEntry) -> bool {
        let severity_ok = self.severity.map_or(true, |s| entry.severity == s);
        let search_ok = self.needle().map_or(true, |needle| {
            entry.vehicle.to_lowercase().contains(&needle)
                || entry.kind.to_lowercase().contains(&needle)
        });
        severity_ok && search_ok
    }

    pub fn matches_summary(&self, summary: &VehicleAlertSummary) -> bool {
        let severity_ok = self
            .severity
            .map_or(true, |s| summary.alerts.iter().any(|alert| alert.severity == s));
        let search_ok = self
            .needle()
            .map_or(true, |needle| summary.vehicle.to_lowercase().contains(&needle));
        severity_ok && search_ok
    }

    pub fn apply_to_feed<'a>(&self, feed: &'a [AlertFeedEntry]) -> Vec<&'a AlertFeedEntry> {
        feed.iter()
            .filter(|entry| self.matches_feed_entry(entry))
            .collect()
    }

    pub fn apply_to_summaries<'a>(
        &self,
        summaries: &'a [VehicleAlertSummary],
    ) -> Vec<&'a VehicleAlertSummary> {
        summaries
            .iter()
            .filter(|summary| self.matches_summary(summary))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertBadge {
    pub name: String,
    pub severity: Severity,
}

/// A vehicle ranked by how many alerts it currently carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleAlertSummary {
    pub vehicle: String,
    pub alert_count: usize,
    pub top_severity: Severity,
    pub alerts: Vec<AlertBadge>,
}

impl VehicleAlertSummary {
    /// Ranks vehicles with at least one alert by alert count, most first. Ties keep fleet order.
    pub fn rank(vehicles: &[VehicleRecord]) -> Vec<Self> {
        let mut summaries: Vec<Self> = vehicles
            .iter()
            .filter_map(|vehicle| {
                let top_severity = vehicle.top_severity()?;
                Some(Self {
                    vehicle: vehicle.id.clone(),
                    alert_count: vehicle.alerts.len(),
                    top_severity,
                    alerts: vehicle
                        .alerts
                        .iter()
                        .map(|alert| AlertBadge {
                            name: alert.kind.clone(),
                            severity: alert.severity,
                        })
                        .collect(),
                })
            })
            .collect();

        summaries.sort_by(|a, b| b.alert_count.cmp(&a.alert_count));
        summaries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaintenanceStatus {
    Overdue,
    Upcoming,
}

impl MaintenanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Upcoming => "Upcoming",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceItem {
    pub task: String,
    pub vehicle: String,
    pub due_date: NaiveDate,
    pub priority: Severity,
    pub status: MaintenanceStatus,
}

/// Open maintenance work; completing an item removes it from the schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    items: Vec<MaintenanceItem>,
}

impl MaintenanceSchedule {
    pub fn new(items: Vec<MaintenanceItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[MaintenanceItem] {
        &self.items
    }

    pub fn overdue_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == MaintenanceStatus::Overdue)
            .count()
    }

    pub fn for_vehicle(&self, vehicle_id: &str) -> Vec<&MaintenanceItem> {
        self.items
            .iter()
            .filter(|item| item.vehicle.eq_ignore_ascii_case(vehicle_id))
            .collect()
    }

    /// Removes the item at `index` and returns it, or `None` when out of range.
    pub fn complete(&mut self, index: usize) -> Option<MaintenanceItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtcStatus {
    Active,
    Pending,
}

impl DtcStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pending => "Pending",
        }
    }
}

/// Historical diagnostic trouble code reported by a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtcDetail {
    pub code: String,
    pub description: String,
    pub severity: Severity,
    pub status: DtcStatus,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::sample;

    #[test]
    fn ranks_vehicles_by_alert_count() {
        let ranked = VehicleAlertSummary::rank(&sample::vehicles());
        assert!(!ranked.is_empty());
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].alert_count >= pair[1].alert_count));
        assert!(ranked.iter().all(|summary| summary.alert_count > 0));
        let van = ranked
            .iter()
            .find(|summary| summary.vehicle == "VAN-001")
            .expect("VAN-001 carries alerts");
        assert_eq!(van.top_severity, Severity::Critical);
    }

    #[test]
    fn rank_ignores_severity_and_keeps_fleet_order_on_ties() {
        use crate::fleet::domain::VehicleAlert;

        let mut vehicles = sample::vehicles();
        vehicles.truncate(3);
        vehicles[0].alerts = vec![VehicleAlert::new("Tire Wear", Severity::Low)];
        vehicles[1].alerts = vec![
            VehicleAlert::new("Check Engine", Severity::Medium),
            VehicleAlert::new("Oil Change Due", Severity::Low),
        ];
        vehicles[2].alerts = vec![VehicleAlert::new("Engine Overheat", Severity::Critical)];

        let order: Vec<String> = VehicleAlertSummary::rank(&vehicles)
            .into_iter()
            .map(|summary| summary.vehicle)
            .collect();
        let ids: Vec<String> = vehicles.iter().map(|vehicle| vehicle.id.clone()).collect();
        assert_eq!(order, vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);
    }

    #[test]
    fn feed_filter_combines_severity_and_search() {
        let feed = sample::alert_feed();
        let filter = AlertFilter {
            severity: Some(Severity::Critical),
            search: Some("van-001".to_string()),
        };
        let hits = filter.apply_to_feed(&feed);
        assert!(!hits.is_empty());
        assert!(hits
            .iter()
            .all(|entry| entry.vehicle == "VAN-001" && entry.severity == Severity::Critical));

        let by_type = AlertFilter {
            severity: None,
            search: Some("misfire".to_string()),
        };
        assert!(by_type
            .apply_to_feed(&feed)
            .iter()
            .all(|entry| entry.kind.to_lowercase().contains("misfire")));
    }

    #[test]
    fn completing_schedule_items_removes_them() {
        let mut schedule = sample::maintenance_schedule();
        let before = schedule.items().len();
        let first = schedule.complete(0).expect("schedule has items");
        assert_eq!(schedule.items().len(), before - 1);
        assert_ne!(schedule.items().first(), Some(&first));
        assert!(schedule.complete(usize::MAX).is_none());
    }
}
