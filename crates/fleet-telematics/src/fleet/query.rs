use serde::{Deserialize, Serialize};

use super::domain::{FuelType, Severity, VehicleRecord, VehicleStatus, VehicleType};

pub const PAGE_SIZE: usize = 20;

/// Explorer filters. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleFilter {
    pub search: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub status: Option<VehicleStatus>,
    pub fuel_type: Option<FuelType>,
    pub alert_severity: Option<Severity>,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &VehicleRecord) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                [&vehicle.vin, &vehicle.camera_serial, &vehicle.id]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        };

        search_ok
            && self.vehicle_type.map_or(true, |kind| vehicle.vehicle_type == kind)
            && self.status.map_or(true, |status| vehicle.status == status)
            && self.fuel_type.map_or(true, |fuel| vehicle.fuel_type == fuel)
            && self
                .alert_severity
                .map_or(true, |severity| vehicle.has_severity(severity))
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Health,
    CostPerMile,
    Efficiency,
    FuelDaily,
    MovingIdle,
    CostDaily,
    Alerts,
}

impl SortColumn {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Health,
            Self::CostPerMile,
            Self::Efficiency,
            Self::FuelDaily,
            Self::MovingIdle,
            Self::CostDaily,
            Self::Alerts,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::CostPerMile => "cost_per_mile",
            Self::Efficiency => "efficiency",
            Self::FuelDaily => "fuel_daily",
            Self::MovingIdle => "moving_idle",
            Self::CostDaily => "cost_daily",
            Self::Alerts => "alerts",
        }
    }

    /// Accepts snake_case, camelCase or kebab-case keys; `costKm` is kept as an alias.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-')
            .flat_map(char::to_lowercase)
            .collect();
        if normalized == "costkm" {
            return Some(Self::CostPerMile);
        }
        Self::ordered()
            .into_iter()
            .find(|column| column.key().replace('_', "") == normalized)
    }

    fn value(self, vehicle: &VehicleRecord) -> f64 {
        match self {
            Self::Health => f64::from(vehicle.health_index()),
            Self::CostPerMile => vehicle.fuel_cost_per_mile,
            Self::Efficiency => vehicle.avg_fuel_efficiency,
            Self::FuelDaily => vehicle.fuel_consumption_daily,
            Self::MovingIdle => vehicle.fuel_moving + vehicle.fuel_idle,
            Self::CostDaily => vehicle.total_fuel_cost_daily,
            Self::Alerts => vehicle.alerts.len() as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Stable sort over the column value; ties keep their incoming order.
pub fn sort_vehicles(
    vehicles: &mut [&VehicleRecord],
    column: SortColumn,
    direction: SortDirection,
) {
    vehicles.sort_by(|a, b| {
        let ordering = column.value(a).total_cmp(&column.value(b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slices `items` into the requested 1-based page, clamped to `[1, total_pages]`.
///
/// An empty list still has one (empty) page.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// Explorer state: filters, the active sort and the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleQuery {
    filter: VehicleFilter,
    sort: Option<(SortColumn, SortDirection)>,
    page: usize,
}

impl Default for VehicleQuery {
    fn default() -> Self {
        Self {
            filter: VehicleFilter::default(),
            sort: None,
            page: 1,
        }
    }
}

impl VehicleQuery {
    pub fn new(filter: VehicleFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn filter(&self) -> &VehicleFilter {
        &self.filter
    }

    pub fn sort(&self) -> Option<(SortColumn, SortDirection)> {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        self.update_filter(|filter| {
            filter.search = if search.trim().is_empty() {
                None
            } else {
                Some(search)
            }
        });
    }

    pub fn set_vehicle_type(&mut self, vehicle_type: Option<VehicleType>) {
        self.update_filter(|filter| filter.vehicle_type = vehicle_type);
    }

    pub fn set_status(&mut self, status: Option<VehicleStatus>) {
        self.update_filter(|filter| filter.status = status);
    }

    pub fn set_fuel_type(&mut self, fuel_type: Option<FuelType>) {
        self.update_filter(|filter| filter.fuel_type = fuel_type);
    }

    pub fn set_alert_severity(&mut self, severity: Option<Severity>) {
        self.update_filter(|filter| filter.alert_severity = severity);
    }

    pub fn clear_filters(&mut self) {
        self.update_filter(|filter| *filter = VehicleFilter::default());
    }

    /// Same column flips the direction; a new column starts ascending.
    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort = match self.sort {
            Some((active, direction)) if active == column => Some((column, direction.toggled())),
            _ => Some((column, SortDirection::Asc)),
        };
    }

    pub fn set_sort(&mut self, column: SortColumn, direction: SortDirection) {
        self.sort = Some((column, direction));
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Filter, then sort, then paginate.
    pub fn run<'a>(&self, vehicles: &'a [VehicleRecord]) -> Page<&'a VehicleRecord> {
        let mut matching: Vec<&VehicleRecord> = vehicles
            .iter()
            .filter(|vehicle| self.filter.matches(vehicle))
            .collect();
        if let Some((column, direction)) = self.sort {
            sort_vehicles(&mut matching, column, direction);
        }
        paginate(matching, self.page, PAGE_SIZE)
    }

    fn update_filter(&mut self, edit: impl FnOnce(&mut VehicleFilter)) {
        edit(&mut self.filter);
        self.page = 1;
    }
}
