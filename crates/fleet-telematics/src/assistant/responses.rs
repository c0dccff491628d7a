use std::fmt::Write;

use crate::fleet::domain::{Severity, VehicleRecord, VehicleStatus, VehicleType};
use crate::fleet::health::HealthBand;
use crate::fleet::metrics::FleetMetrics;

const ATTENTION_HEALTH_CUTOFF: u8 = 70;
const PRIORITY_HEALTH_CUTOFF: u8 = 60;
const LOW_EFFICIENCY_MPG: f64 = 19.0;
const EXCESSIVE_IDLE_PCT: f64 = 25.0;

pub(crate) const HELP_TEXT: &str = "🤖 **I can help you with:**

• Fleet health overview and summaries
• Identify vehicles needing immediate attention
• Cost analysis and fuel expenses
• Fuel efficiency comparisons
• Active faults and alerts
• Idle time monitoring
• Maintenance scheduling
• Vehicle-to-vehicle comparisons

**Try asking:**
- \"Which vehicles need immediate attention?\"
- \"What's my total fuel cost?\"
- \"Show me vehicles with active faults\"
- \"Which vehicles have poor efficiency?\"
- \"Compare VAN-001 and TRK-142\"
- \"Show me idle vehicles\"

What would you like to know about your fleet?";

pub(crate) const COMPARE_USAGE: &str = "To compare vehicles, mention both vehicle IDs in your question.\nExample: \"Compare VAN-001 and TRK-142\"";

// `fmt::Write` for `String` never fails, so the results of `writeln!` below are discarded.

pub(crate) fn attention(vehicles: &[VehicleRecord]) -> String {
    let critical: Vec<&VehicleRecord> = vehicles
        .iter()
        .filter(|vehicle| vehicle.has_severity(Severity::Critical))
        .collect();
    let urgent = if critical.is_empty() {
        lowest_health(vehicles, ATTENTION_HEALTH_CUTOFF, 3)
    } else {
        critical
    };

    if urgent.is_empty() {
        return "✅ **Good News!**\n\nNo vehicles require immediate attention. Your fleet is operating within normal parameters.".to_string();
    }

    let mut out = String::from("🚨 **Vehicles Requiring Immediate Attention:**\n\n");
    for (position, vehicle) in urgent.iter().enumerate() {
        let health = vehicle.health_index();
        let _ = writeln!(out, "{}. **{}** (Health: {health}/100)", position + 1, vehicle.id);
        let _ = writeln!(
            out,
            "   - Type: {} | Status: {}",
            vehicle.vehicle_type.label(),
            vehicle.status.label()
        );
        out.push_str("   - Critical Issues:\n");
        for alert in &vehicle.alerts {
            let _ = writeln!(out, "     • {} ({})", alert.kind, alert.severity.label());
        }
        if health < PRIORITY_HEALTH_CUTOFF {
            out.push_str("   ⚠️ PRIORITY: Very low health score\n");
        }
        out.push('\n');
    }
    out
}

fn lowest_health(vehicles: &[VehicleRecord], below: u8, limit: usize) -> Vec<&VehicleRecord> {
    let mut scored: Vec<(u8, &VehicleRecord)> = vehicles
        .iter()
        .map(|vehicle| (vehicle.health_index(), vehicle))
        .filter(|(health, _)| *health < below)
        .collect();
    scored.sort_by_key(|(health, _)| *health);
    scored
        .into_iter()
        .take(limit)
        .map(|(_, vehicle)| vehicle)
        .collect()
}

pub(crate) fn health_summary(fleet: &FleetMetrics, vehicles: &[VehicleRecord]) -> String {
    let mut out = String::from("📊 **Fleet Health Summary**\n\n**Overall Metrics:**\n");
    let _ = writeln!(out, "• Total Vehicles: {}", fleet.total_vehicles);
    let _ = writeln!(out, "• Fleet Health Index: {}/100", fleet.fleet_health_index);
    let _ = writeln!(
        out,
        "• Active: {} | Idle: {}",
        fleet.vehicles_active, fleet.vehicles_idle
    );
    let _ = writeln!(out, "• Active Faults: {}", fleet.faults_over_time.current);
    let _ = writeln!(
        out,
        "• Maintenance Due: {} ({} overdue)\n",
        fleet.maintenance_due, fleet.maintenance_overdue
    );

    out.push_str("**Health Distribution:**\n");
    let bands = HealthBand::ordered();
    for band in bands {
        let count = vehicles
            .iter()
            .filter(|vehicle| HealthBand::of(vehicle.health_index()) == band)
            .count();
        let flag = if band == HealthBand::Poor { " ⚠️" } else { "" };
        let _ = writeln!(out, "• {}: {count} vehicles{flag}", band.label());
    }
    out
}

pub(crate) fn highest_cost(vehicles: &[VehicleRecord]) -> String {
    let mut by_cost: Vec<&VehicleRecord> = vehicles.iter().collect();
    by_cost.sort_by(|a, b| b.fuel_cost_per_mile.total_cmp(&a.fuel_cost_per_mile));

    let mut out = String::from("💰 **Highest Operating Cost Vehicles:**\n\n");
    for (position, vehicle) in by_cost.iter().take(5).enumerate() {
        let _ = writeln!(
            out,
            "{}. **{}** - ${:.2}/mile",
            position + 1,
            vehicle.id,
            vehicle.fuel_cost_per_mile
        );
        let _ = writeln!(
            out,
            "   - Type: {} ({})",
            vehicle.vehicle_type.label(),
            vehicle.fuel_type.label()
        );
        let _ = writeln!(out, "   - Daily Cost: ${:.2}", vehicle.total_fuel_cost_daily);
        let _ = writeln!(out, "   - Efficiency: {} mpg", vehicle.avg_fuel_efficiency);
        let health = vehicle.health_index();
        if health < ATTENTION_HEALTH_CUTOFF {
            let _ = writeln!(out, "   ⚠️ Low health ({health}/100) may be affecting costs");
        }
        out.push('\n');
    }
    out
}

pub(crate) fn fuel_cost(fleet: &FleetMetrics, vehicles: &[VehicleRecord]) -> String {
    let mut out = String::from("⛽ **Fuel Cost Analysis:**\n\n**Fleet Totals:**\n");
    let _ = writeln!(out, "• Daily Fuel Cost: ${:.2}", fleet.total_fuel_cost_daily);
    let _ = writeln!(out, "• Average Cost/mile: ${:.2}", fleet.fuel_cost_per_mile);
    let _ = writeln!(
        out,
        "• Daily Consumption: {:.1}L\n",
        fleet.total_fuel_consumption_daily
    );

    out.push_str("**Cost Breakdown by Type:**\n");
    for (vehicle_type, cost, count) in daily_cost_by_type(vehicles) {
        let _ = writeln!(
            out,
            "• {}: ${cost:.2}/day ({count} vehicles)",
            vehicle_type.label()
        );
    }

    let _ = writeln!(out, "\n**Projections:**");
    let _ = writeln!(out, "• Weekly: ~${:.2}", fleet.total_fuel_cost_daily * 7.0);
    let _ = writeln!(out, "• Monthly: ~${:.2}", fleet.total_fuel_cost_daily * 30.0);
    out
}

/// Daily fuel cost and vehicle count per type, types in first-seen order.
fn daily_cost_by_type(vehicles: &[VehicleRecord]) -> Vec<(VehicleType, f64, usize)> {
    let mut totals: Vec<(VehicleType, f64, usize)> = Vec::new();
    for vehicle in vehicles {
        match totals
            .iter_mut()
            .find(|(vehicle_type, _, _)| *vehicle_type == vehicle.vehicle_type)
        {
            Some((_, cost, count)) => {
                *cost += vehicle.total_fuel_cost_daily;
                *count += 1;
            }
            None => totals.push((vehicle.vehicle_type, vehicle.total_fuel_cost_daily, 1)),
        }
    }
    totals
}

pub(crate) fn efficiency(fleet: &FleetMetrics, vehicles: &[VehicleRecord]) -> String {
    let baseline = fleet.baselines.fuel_efficiency_mpg;
    let mut out = String::from("📈 **Fuel Efficiency Analysis:**\n\n");
    let _ = writeln!(out, "**Fleet Average:** {} mpg", fleet.avg_fuel_efficiency);
    let _ = writeln!(out, "**Baseline Target:** {baseline} mpg\n");

    let (above, below): (Vec<&VehicleRecord>, Vec<&VehicleRecord>) = vehicles
        .iter()
        .partition(|vehicle| vehicle.avg_fuel_efficiency >= baseline);

    let _ = writeln!(out, "**Above Target ({} vehicles):**", above.len());
    for vehicle in above.iter().take(3) {
        let _ = writeln!(out, "• {}: {} mpg ✅", vehicle.id, vehicle.avg_fuel_efficiency);
    }

    let _ = writeln!(out, "\n**Below Target ({} vehicles):**", below.len());
    for vehicle in below.iter().take(3) {
        let _ = writeln!(out, "• {}: {} mpg ⚠️", vehicle.id, vehicle.avg_fuel_efficiency);
    }

    let mut laggards: Vec<&VehicleRecord> = vehicles
        .iter()
        .filter(|vehicle| vehicle.avg_fuel_efficiency < LOW_EFFICIENCY_MPG)
        .collect();
    laggards.sort_by(|a, b| a.avg_fuel_efficiency.total_cmp(&b.avg_fuel_efficiency));
    if !laggards.is_empty() {
        out.push_str("\n**Action Needed:**\n");
        for vehicle in laggards.iter().take(2) {
            let _ = writeln!(
                out,
                "• {} ({} mpg) - Check for maintenance issues",
                vehicle.id, vehicle.avg_fuel_efficiency
            );
        }
    }
    out
}

pub(crate) fn faults(vehicles: &[VehicleRecord]) -> String {
    let with_alerts: Vec<&VehicleRecord> = vehicles
        .iter()
        .filter(|vehicle| !vehicle.alerts.is_empty())
        .collect();

    if with_alerts.is_empty() {
        return "✅ **Excellent!**\n\nNo active faults detected. All vehicles operating normally."
            .to_string();
    }

    let mut out = String::from("🔧 **Active Faults & Alerts:**\n\n");
    let _ = writeln!(out, "**{} vehicles with active alerts:**\n", with_alerts.len());
    for vehicle in with_alerts {
        let _ = writeln!(out, "**{}** ({}):", vehicle.id, vehicle.vehicle_type.label());
        for alert in &vehicle.alerts {
            let _ = writeln!(
                out,
                "  {} {} ({})",
                alert.severity.icon(),
                alert.kind,
                alert.severity.label()
            );
        }
        out.push('\n');
    }
    out
}

pub(crate) fn idle(fleet: &FleetMetrics, vehicles: &[VehicleRecord]) -> String {
    let count = |status: VehicleStatus| vehicles.iter().filter(|v| v.status == status).count();

    let mut out = String::from("⏸️ **Idle Time Analysis:**\n\n**Current Status:**\n");
    let _ = writeln!(out, "• Idle Vehicles: {}", count(VehicleStatus::Idle));
    let _ = writeln!(out, "• Active Vehicles: {}", count(VehicleStatus::Active));
    let _ = writeln!(out, "• Idle Percentage: {:.1}%\n", fleet.idle_percentage);

    let excessive: Vec<(&VehicleRecord, f64)> = vehicles
        .iter()
        .map(|vehicle| (vehicle, vehicle.idle_fuel_pct()))
        .filter(|(_, pct)| *pct > EXCESSIVE_IDLE_PCT)
        .collect();

    if excessive.is_empty() {
        out.push_str("✅ Idle fuel consumption is within acceptable range (<25%)\n");
        return out;
    }

    out.push_str("**⚠️ Excessive Idle Fuel Waste:**\n");
    for (vehicle, pct) in excessive {
        let _ = writeln!(
            out,
            "• {}: {pct:.1}% idle fuel ({:.1}L/day)",
            vehicle.id, vehicle.fuel_idle
        );
    }
    out.push_str("\n💡 Recommendation: Target <20% idle fuel for optimal efficiency\n");
    out
}

pub(crate) fn maintenance(fleet: &FleetMetrics, vehicles: &[VehicleRecord]) -> String {
    let mut out = String::from("🔧 **Maintenance Status:**\n\n**Overview:**\n");
    let _ = writeln!(out, "• Vehicles Due: {}", fleet.maintenance_due);
    let _ = writeln!(out, "• Overdue: {} ⚠️\n", fleet.maintenance_overdue);

    let due: Vec<&VehicleRecord> = vehicles
        .iter()
        .filter(|vehicle| vehicle.alerts.iter().any(|alert| alert.is_service_reminder()))
        .collect();

    if due.is_empty() {
        out.push_str("✅ All maintenance schedules are up to date!\n");
        return out;
    }

    out.push_str("**Vehicles Requiring Service:**\n\n");
    for vehicle in due {
        let _ = writeln!(out, "**{}:**", vehicle.id);
        for alert in vehicle.alerts.iter().filter(|alert| alert.is_service_reminder()) {
            let _ = writeln!(out, "  • {} ({})", alert.kind, alert.severity.label());
        }
        out.push('\n');
    }
    out
}

/// Compares the first two fleet ids mentioned in `lowered`, in snapshot order.
pub(crate) fn compare(lowered: &str, vehicles: &[VehicleRecord]) -> String {
    let mut mentioned = vehicles
        .iter()
        .filter(|vehicle| lowered.contains(&vehicle.id.to_lowercase()));
    let (Some(first), Some(second)) = (mentioned.next(), mentioned.next()) else {
        return COMPARE_USAGE.to_string();
    };

    let (first_health, second_health) = (first.health_index(), second.health_index());
    let mut out = format!(
        "📊 **Vehicle Comparison: {} vs {}**\n\n",
        first.id, second.id
    );
    let _ = writeln!(out, "| Metric | {} | {} |", first.id, second.id);
    out.push_str("|--------|---------|----------|\n");
    let _ = writeln!(
        out,
        "| Type | {} | {} |",
        first.vehicle_type.label(),
        second.vehicle_type.label()
    );
    let _ = writeln!(out, "| Health | {first_health}/100 | {second_health}/100 |");
    let _ = writeln!(
        out,
        "| Status | {} | {} |",
        first.status.label(),
        second.status.label()
    );
    let _ = writeln!(
        out,
        "| Efficiency | {} mpg | {} mpg |",
        first.avg_fuel_efficiency, second.avg_fuel_efficiency
    );
    let _ = writeln!(
        out,
        "| Cost/mile | ${} | ${} |",
        first.fuel_cost_per_mile, second.fuel_cost_per_mile
    );
    let _ = writeln!(
        out,
        "| Daily Cost | ${:.2} | ${:.2} |",
        first.total_fuel_cost_daily, second.total_fuel_cost_daily
    );
    let _ = writeln!(
        out,
        "| Alerts | {} | {} |",
        first.alerts.len(),
        second.alerts.len()
    );

    // Ties go to the vehicle listed first in the snapshot.
    let winner = if first_health >= second_health {
        first
    } else {
        second
    };
    let _ = writeln!(out, "\n**Winner:** {} (better overall health)", winner.id);
    out
}
