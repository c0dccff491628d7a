use serde::{Deserialize, Serialize};

use super::domain::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Alert,
    Maintenance,
}

impl RuleKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Alert, Self::Maintenance]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Alert => "Alert",
            Self::Maintenance => "Maintenance",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Alert or maintenance trigger evaluated against OBD-II parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringRule {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub enabled: bool,
    pub category: String,
    pub name: String,
    pub condition: String,
    pub threshold1: f64,
    pub unit1: String,
    pub threshold2: Option<f64>,
    pub unit2: String,
    pub severity: Severity,
    pub pid: String,
    pub use_case: String,
}

/// Single field edit made from the customize panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum RuleEdit {
    Enabled(bool),
    Threshold1(f64),
    Threshold2(Option<f64>),
    Severity(Severity),
}

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("unknown rule id {0}")]
    UnknownRule(u32),
    #[error("threshold for rule {0} must be a finite number")]
    InvalidThreshold(u32),
}

/// Rules of one category, in book order.
#[derive(Debug, Clone, Serialize)]
pub struct RuleCategory<'a> {
    pub category: &'a str,
    pub rules: Vec<&'a MonitoringRule>,
}

impl RuleCategory<'_> {
    pub fn enabled_count(&self) -> usize {
        self.rules.iter().filter(|rule| rule.enabled).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    rules: Vec<MonitoringRule>,
}

impl RuleBook {
    pub fn new(rules: Vec<MonitoringRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[MonitoringRule] {
        &self.rules
    }

    pub fn get(&self, id: u32) -> Option<&MonitoringRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Categories in first-seen order.
    pub fn grouped(&self) -> Vec<RuleCategory<'_>> {
        let mut groups: Vec<RuleCategory<'_>> = Vec::new();
        for rule in &self.rules {
            match groups
                .iter_mut()
                .find(|group| group.category == rule.category)
            {
                Some(group) => group.rules.push(rule),
                None => groups.push(RuleCategory {
                    category: &rule.category,
                    rules: vec![rule],
                }),
            }
        }
        groups
    }

    pub fn enabled_count(&self, category: &str) -> usize {
        self.rules
            .iter()
            .filter(|rule| rule.enabled && rule.category == category)
            .count()
    }

    pub fn apply(&mut self, id: u32, edit: RuleEdit) -> Result<(), RuleError> {
        let rule = self
            .rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or(RuleError::UnknownRule(id))?;

        match edit {
            RuleEdit::Enabled(enabled) => rule.enabled = enabled,
            RuleEdit::Threshold1(value) if value.is_finite() => rule.threshold1 = value,
            RuleEdit::Threshold2(value) if value.map_or(true, f64::is_finite) => {
                rule.threshold2 = value
            }
            RuleEdit::Severity(severity) => rule.severity = severity,
            RuleEdit::Threshold1(_) | RuleEdit::Threshold2(_) => {
                return Err(RuleError::InvalidThreshold(id))
            }
        }
        Ok(())
    }

    /// Alert and maintenance rules shipped with the dashboard.
    #[rustfmt::skip]
    pub fn defaults() -> Self {
        use RuleKind::{Alert, Maintenance};
        use Severity::{Critical, High, Low, Medium};

        Self::new(vec![
            rule(
                (1, Alert, true, Critical),
                ["Engine RPM", "High RPM (Over-rev)", "> 4000 RPM for > 5s"],
                (4000.0, "RPM"),
                (Some(5.0), "s"),
                ["01-0C", "Detect over-rev state"],
            ),
            rule(
                (2, Alert, true, Medium),
                ["Engine RPM", "Extended Idle", "< 1000 RPM for > 600s & Speed = 0"],
                (1000.0, "RPM"),
                (Some(600.0), "s"),
                ["01-0C, 01-0D", "Detect idle/run state"],
            ),
            rule(
                (4, Alert, true, High),
                ["Engine Load", "High Engine Load (30s)", "> 90% for > 30s"],
                (90.0, "%"),
                (Some(30.0), "s"),
                ["01-04", "Performance and overuse"],
            ),
            rule(
                (5, Alert, false, Medium),
                ["Engine Load", "PTO Misuse", "Speed = 0 and Load > 30%"],
                (30.0, "%"),
                (Some(60.0), "s"),
                ["01-04, 01-0D", "PTO detection"],
            ),
            rule(
                (6, Alert, false, Critical),
                ["Engine Torque", "Over-Torque Event", "Torque > OEM limit for > 5s"],
                (500.0, "Nm"),
                (Some(5.0), "s"),
                ["0x61-0x64", "Mechanical stress"],
            ),
            rule(
                (7, Alert, false, Medium),
                ["Engine Torque", "PTO Load Check", "Speed = 0 and Torque > 30%"],
                (30.0, "%"),
                (Some(60.0), "s"),
                ["0x61-0x64, 01-0D", "Power analytics"],
            ),
            rule(
                (8, Alert, true, High),
                ["Battery Voltage", "Charging Fault", "< 13.0V (Running)"],
                (13.0, "V"),
                (Some(10.0), "s"),
                ["01-42", "Alternator issue"],
            ),
            rule(
                (9, Alert, true, Critical),
                ["Battery Voltage", "Overvoltage", "> 15.5V"],
                (15.5, "V"),
                (Some(5.0), "s"),
                ["01-42", "Charging fault"],
            ),
            rule(
                (10, Alert, true, High),
                ["Battery Voltage", "Low Voltage (Discharge)", "< 11.8V (OFF)"],
                (11.8, "V"),
                (Some(0.0), "s"),
                ["01-42", "Battery failure"],
            ),
            rule(
                (12, Alert, true, Critical),
                ["Temperature", "Overheat Critical", "> 110°C"],
                (110.0, "°C"),
                (Some(5.0), "s"),
                ["01-05", "Detect overheating"],
            ),
            rule(
                (14, Alert, false, Low),
                ["Temperature", "Cold Start Warm-Up", "< 40°C for > 5 min after start"],
                (40.0, "°C"),
                (Some(300.0), "s"),
                ["01-05", "Thermostat issue"],
            ),
            rule(
                (29, Alert, true, Medium),
                ["Temperature", "Coolant Sensor Drift", "Stable reading > 30 min = sensor stuck"],
                (30.0, "min"),
                (None, ""),
                ["01-05", "Sensor stuck detection"],
            ),
            rule(
                (27, Alert, true, Critical),
                ["Temperature", "IAT Overheat Under Load", "> 70°C + Load > 80%"],
                (70.0, "°C"),
                (Some(60.0), "s"),
                ["01-0F, 01-04", "Turbo/engine analytics"],
            ),
            rule(
                (28, Alert, false, High),
                ["Temperature", "High IAT", "IAT - Ambient > 40°C"],
                (40.0, "°C"),
                (Some(120.0), "s"),
                ["01-0F, 01-46", "Intercooler inefficiency"],
            ),
            rule(
                (15, Alert, true, Critical),
                ["Oil Pressure", "Low Oil Pressure", "< 20 psi for > 5s"],
                (20.0, "psi"),
                (Some(5.0), "s"),
                ["SPN 100", "Predictive maintenance"],
            ),
            rule(
                (16, Alert, true, Critical),
                ["Oil Pressure", "Low Pressure at Idle", "< 15 psi for > 10s while RPM < 900"],
                (15.0, "psi"),
                (Some(10.0), "s"),
                ["SPN 100", "Oil pump health"],
            ),
            rule(
                (17, Alert, false, High),
                ["Oil Pressure", "Pressure Spike", "> 90 psi"],
                (90.0, "psi"),
                (Some(5.0), "s"),
                ["SPN 100", "Blockage detection"],
            ),
            rule(
                (30, Alert, true, High),
                ["Oil Pressure", "Oil Sensor Fault", "Constant 0 reading > 60 s"],
                (60.0, "s"),
                (None, ""),
                ["SPN 100", "Sensor fault detection"],
            ),
            rule(
                (18, Alert, false, High),
                ["Fuel Level", "Fuel Theft", "Drop > 10% in < 2 min & Speed = 0"],
                (10.0, "%"),
                (Some(120.0), "s"),
                ["01-2F, 01-0D", "Theft detection"],
            ),
            rule(
                (20, Alert, true, Critical),
                ["Fuel Level", "DEF Empty", "< 5%"],
                (5.0, "%"),
                (Some(0.0), "s"),
                ["01-52", "Compliance / derate imminent"],
            ),
            rule(
                (21, Alert, true, High),
                ["Fuel Level", "DEF Low", "< 10%"],
                (10.0, "%"),
                (Some(0.0), "s"),
                ["01-52", "Low DEF warning"],
            ),
            rule(
                (22, Alert, false, Medium),
                ["Fuel Level", "DEF Consumption Irregularity", "No DEF drop over > 10h engine run"],
                (0.0, "%"),
                (Some(36000.0), "s"),
                ["01-52, 01-1F", "Dosing system fault"],
            ),
            rule(
                (25, Alert, false, Medium),
                ["Barometric Pressure", "High-Altitude Operation", "< 80 kPa"],
                (80.0, "kPa"),
                (Some(60.0), "s"),
                ["01-33", "Altitude compensation"],
            ),
            rule(
                (26, Alert, false, Low),
                ["Barometric Pressure", "Sensor Mismatch", "Baro vs MAP deviation > 15 kPa"],
                (15.0, "kPa"),
                (Some(30.0), "s"),
                ["01-33, 01-0B", "Sensor fault detection"],
            ),
            rule(
                (31, Alert, true, Critical),
                ["Engine Oil Life", "Oil Change Critical", "< 15% remaining"],
                (15.0, "%"),
                (Some(0.0), "s"),
                ["0xFEEE", "Preventative maintenance"],
            ),
            rule(
                (32, Alert, true, High),
                ["Engine Oil Life", "Oil Change Due Soon", "< 30% remaining"],
                (30.0, "%"),
                (Some(0.0), "s"),
                ["0xFEEE", "Preventative maintenance"],
            ),
            rule(
                (33, Alert, true, Medium),
                ["Engine Oil Life", "Oil Change Reminder", "< 50% remaining"],
                (50.0, "%"),
                (Some(0.0), "s"),
                ["0xFEEE", "Service planning"],
            ),
            rule(
                (34, Alert, true, Critical),
                ["Tire Pressure", "Critical Low Pressure - Front Left", "< 28 PSI"],
                (28.0, "PSI"),
                (Some(5.0), "s"),
                ["0xFEEC-582", "Safety - blowout risk"],
            ),
            rule(
                (35, Alert, true, Critical),
                ["Tire Pressure", "Critical Low Pressure - Front Right", "< 28 PSI"],
                (28.0, "PSI"),
                (Some(5.0), "s"),
                ["0xFEEC-583", "Safety - blowout risk"],
            ),
            rule(
                (36, Alert, true, Critical),
                ["Tire Pressure", "Critical Low Pressure - Rear Left", "< 28 PSI"],
                (28.0, "PSI"),
                (Some(5.0), "s"),
                ["0xFEEC-584", "Safety - blowout risk"],
            ),
            rule(
                (37, Alert, true, Critical),
                ["Tire Pressure", "Critical Low Pressure - Rear Right", "< 28 PSI"],
                (28.0, "PSI"),
                (Some(5.0), "s"),
                ["0xFEEC-585", "Safety - blowout risk"],
            ),
            rule(
                (38, Alert, true, High),
                ["Tire Pressure", "Low Pressure Warning - Front Left", "< 30 PSI"],
                (30.0, "PSI"),
                (Some(10.0), "s"),
                ["0xFEEC-582", "TPMS warning"],
            ),
            rule(
                (39, Alert, true, High),
                ["Tire Pressure", "Low Pressure Warning - Front Right", "< 30 PSI"],
                (30.0, "PSI"),
                (Some(10.0), "s"),
                ["0xFEEC-583", "TPMS warning"],
            ),
            rule(
                (40, Alert, true, High),
                ["Tire Pressure", "Low Pressure Warning - Rear Left", "< 30 PSI"],
                (30.0, "PSI"),
                (Some(10.0), "s"),
                ["0xFEEC-584", "TPMS warning"],
            ),
            rule(
                (41, Alert, true, High),
                ["Tire Pressure", "Low Pressure Warning - Rear Right", "< 30 PSI"],
                (30.0, "PSI"),
                (Some(10.0), "s"),
                ["0xFEEC-585", "TPMS warning"],
            ),
            rule(
                (42, Alert, true, Medium),
                ["Tire Pressure", "High Pressure - Front Left", "> 40 PSI"],
                (40.0, "PSI"),
                (Some(10.0), "s"),
                ["0xFEEC-582", "Over-inflation warning"],
            ),
            rule(
                (43, Alert, true, Medium),
                ["Tire Pressure", "High Pressure - Front Right", "> 40 PSI"],
                (40.0, "PSI"),
                (Some(10.0), "s"),
                ["0xFEEC-583", "Over-inflation warning"],
            ),
            rule(
                (44, Alert, true, Medium),
                ["Tire Pressure", "High Pressure - Rear Left", "> 40 PSI"],
                (40.0, "PSI"),
                (Some(10.0), "s"),
                ["0xFEEC-584", "Over-inflation warning"],
            ),
            rule(
                (45, Alert, true, Medium),
                ["Tire Pressure", "High Pressure - Rear Right", "> 40 PSI"],
                (40.0, "PSI"),
                (Some(10.0), "s"),
                ["0xFEEC-585", "Over-inflation warning"],
            ),
            rule(
                (46, Alert, false, Medium),
                ["Tire Pressure", "Pressure Imbalance (L/R)", "Left vs Right difference > 3 PSI"],
                (3.0, "PSI"),
                (Some(30.0), "s"),
                ["0xFEEC", "Alignment / uneven wear"],
            ),
            rule(
                (47, Alert, false, Critical),
                ["Tire Pressure", "Rapid Pressure Drop", "Drop > 5 PSI in < 5 min"],
                (5.0, "PSI"),
                (Some(300.0), "s"),
                ["0xFEEC", "Puncture detection"],
            ),
            rule(
                (101, Maintenance, true, Medium),
                ["Maintenance", "Oil Change", "Every 10,000 km or 250 engine hours"],
                (10000.0, "km"),
                (None, ""),
                ["01-31", "Lubrication maintenance"],
            ),
            rule(
                (102, Maintenance, true, High),
                ["Maintenance", "Brake Inspection", "> 15,000 km since last inspection"],
                (15000.0, "km"),
                (None, ""),
                ["Odometer", "Brake system wear"],
            ),
            rule(
                (103, Maintenance, true, Medium),
                ["Maintenance", "Tire Rotation/Pressure", "Every 8,000-10,000 km or TPMS fault"],
                (9000.0, "km"),
                (None, ""),
                ["Odometer", "Tire wear and inflation"],
            ),
            rule(
                (104, Maintenance, true, Medium),
                ["Maintenance", "Air Filter Change", "MAF drop > 15% from baseline"],
                (15.0, "%"),
                (None, ""),
                ["01-10", "Airflow restriction"],
            ),
            rule(
                (105, Maintenance, true, Medium),
                ["Maintenance", "Fuel Filter Change", "Long-term fuel trim > ±10% for > 1,000s"],
                (10.0, "%"),
                (Some(1000.0), "s"),
                ["01-07, 01-08", "Fuel delivery efficiency"],
            ),
        ])
    }
}

type RuleFlags = (u32, RuleKind, bool, Severity);

fn rule(
    (id, kind, enabled, severity): RuleFlags,
    [category, name, condition]: [&str; 3],
    (threshold1, unit1): (f64, &str),
    (threshold2, unit2): (Option<f64>, &str),
    [pid, use_case]: [&str; 2],
) -> MonitoringRule {
    MonitoringRule {
        id,
        kind,
        enabled,
        category: category.to_string(),
        name: name.to_string(),
        condition: condition.to_string(),
        threshold1,
        unit1: unit1.to_string(),
        threshold2,
        unit2: unit2.to_string(),
        severity,
        pid: pid.to_string(),
        use_case: use_case.to_string(),
    }
}

/// Customize session over a [`RuleBook`]: edits stay pending until saved or discarded.
#[derive(Debug, Clone)]
pub struct RuleEditor {
    book: RuleBook,
    snapshot: Option<RuleBook>,
    dirty: bool,
}

impl RuleEditor {
    pub fn new(book: RuleBook) -> Self {
        Self {
            book,
            snapshot: None,
            dirty: false,
        }
    }

    pub fn book(&self) -> &RuleBook {
        &self.book
    }

    pub fn is_open(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn begin(&mut self) {
        self.snapshot = Some(self.book.clone());
        self.dirty = false;
    }

    pub fn edit(&mut self, id: u32, edit: RuleEdit) -> Result<(), RuleError> {
        if self.snapshot.is_none() {
            self.begin();
        }
        self.book.apply(id, edit)?;
        self.dirty = true;
        Ok(())
    }

    pub fn save(&mut self) {
        self.snapshot = Some(self.book.clone());
        self.dirty = false;
        tracing::debug!(rules = self.book.rules.len(), "rule book saved");
    }

    /// Restores the book to the last snapshot.
    pub fn discard(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            self.book = snapshot.clone();
        }
        self.dirty = false;
    }

    /// Ends the session, keeping or dropping pending edits.
    pub fn close(&mut self, keep_changes: bool) {
        if self.dirty {
            if keep_changes {
                self.save();
            } else {
                self.discard();
            }
        }
        self.snapshot = None;
    }
}
