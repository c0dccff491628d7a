use serde::Serialize;

/// Question category selected by keyword rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Attention,
    HealthSummary,
    HighestCost,
    FuelCost,
    Efficiency,
    Faults,
    Idle,
    Maintenance,
    Compare,
    Help,
}

type Predicate = fn(&str) -> bool;

/// Evaluated top to bottom; the first predicate that holds wins.
const RULES: [(Intent, Predicate); 9] = [
    (Intent::Attention, |q| {
        any_of(q, &["attention", "immediate", "urgent", "critical"])
    }),
    (Intent::HealthSummary, |q| {
        any_of(q, &["health", "summary", "overview"])
    }),
    (Intent::HighestCost, |q| {
        q.contains("cost") && any_of(q, &["most", "expensive", "highest"])
    }),
    (Intent::FuelCost, |q| {
        q.contains("fuel") && any_of(q, &["cost", "daily", "total"])
    }),
    (Intent::Efficiency, |q| any_of(q, &["efficiency", "efficient"])),
    (Intent::Faults, |q| any_of(q, &["fault", "alert", "dtc", "problem"])),
    (Intent::Idle, |q| any_of(q, &["idle", "idling"])),
    (Intent::Maintenance, |q| any_of(q, &["maintenance", "service", "due"])),
    (Intent::Compare, |q| any_of(q, &["compare", "vs", "versus"])),
];

fn any_of(query: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| query.contains(keyword))
}

impl Intent {
    /// Classifies a raw question; matching is case-insensitive substring search.
    pub fn classify(query: &str) -> Self {
        let lowered = query.to_lowercase();
        RULES
            .iter()
            .find(|(_, matches)| matches(&lowered))
            .map_or(Self::Help, |(intent, _)| *intent)
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Attention => "attention",
            Self::HealthSummary => "health_summary",
            Self::HighestCost => "highest_cost",
            Self::FuelCost => "fuel_cost",
            Self::Efficiency => "efficiency",
            Self::Faults => "faults",
            Self::Idle => "idle",
            Self::Maintenance => "maintenance",
            Self::Compare => "compare",
            Self::Help => "help",
        }
    }
}
