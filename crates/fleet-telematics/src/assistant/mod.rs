//! Keyword-driven fleet assistant. Answers are rendered from the fleet snapshot handed in by the
//! caller; nothing here mutates or retains that snapshot.

mod intent;
mod responses;

pub use intent::Intent;

use crate::fleet::domain::VehicleRecord;
use crate::fleet::metrics::FleetMetrics;

/// Prompts offered when a conversation is empty.
pub const SUGGESTED_QUESTIONS: [&str; 6] = [
    "Which vehicles need immediate attention?",
    "What's my total daily fuel cost?",
    "Show me vehicles with active faults",
    "Which vehicles have poor fuel efficiency?",
    "Show me idle vehicles",
    "Give me a fleet health summary",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FleetAssistant;

impl FleetAssistant {
    /// Answers `query`. Never fails: unmatched questions get the help text.
    pub fn respond(&self, query: &str, fleet: &FleetMetrics, vehicles: &[VehicleRecord]) -> String {
        let intent = Intent::classify(query);
        tracing::debug!(intent = intent.key(), vehicles = vehicles.len(), "assistant intent matched");

        match intent {
            Intent::Attention => responses::attention(vehicles),
            Intent::HealthSummary => responses::health_summary(fleet, vehicles),
            Intent::HighestCost => responses::highest_cost(vehicles),
            Intent::FuelCost => responses::fuel_cost(fleet, vehicles),
            Intent::Efficiency => responses::efficiency(fleet, vehicles),
            Intent::Faults => responses::faults(vehicles),
            Intent::Idle => responses::idle(fleet, vehicles),
            Intent::Maintenance => responses::maintenance(fleet, vehicles),
            Intent::Compare => responses::compare(&query.to_lowercase(), vehicles),
            Intent::Help => responses::HELP_TEXT.to_string(),
        }
    }

    pub fn help_text(&self) -> &'static str {
        responses::HELP_TEXT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::metrics::FleetBaselines;
    use crate::fleet::sample;

    fn empty_fleet() -> FleetMetrics {
        FleetMetrics::from_vehicles(&[], FleetBaselines::default(), 0)
    }

    #[test]
    fn empty_snapshot_degrades_per_branch() {
        let assistant = FleetAssistant;
        let fleet = empty_fleet();

        assert!(assistant
            .respond("urgent?", &fleet, &[])
            .starts_with("✅ **Good News!**"));
        assert!(assistant
            .respond("any faults", &fleet, &[])
            .starts_with("✅ **Excellent!**"));
        assert!(assistant
            .respond("show idle", &fleet, &[])
            .contains("within acceptable range"));
        assert!(assistant
            .respond("maintenance", &fleet, &[])
            .contains("up to date"));
        assert_eq!(
            assistant.respond("compare VAN-001 and TRK-142", &fleet, &[]),
            responses::COMPARE_USAGE
        );
    }

    #[test]
    fn highest_cost_lists_top_five_descending() {
        let vehicles = sample::vehicles();
        let reply = FleetAssistant.respond("which costs the most", &sample::fleet_metrics(), &vehicles);
        assert!(reply.starts_with("💰 **Highest Operating Cost Vehicles:**"));
        assert!(reply.contains("1. **CAR-227** - $0.42/mile"));
        assert!(reply.contains("2. **VAN-001** - $0.39/mile"));
        assert!(reply.contains("4. **VAN-003** - $0.35/mile"));
        assert!(reply.contains("5. **VAN-078** - $0.35/mile"));
        assert!(!reply.contains("6. "));
    }
}
