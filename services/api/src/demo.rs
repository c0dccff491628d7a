use crate::infra::{parse_date, ExportScope, FleetData};
use chrono::{Local, NaiveDate};
use clap::Args;
use fleet_telematics::assistant::{FleetAssistant, SUGGESTED_QUESTIONS};
use fleet_telematics::error::AppError;
use fleet_telematics::fleet::alerts::MaintenanceStatus;
use fleet_telematics::fleet::export::ExportKind;
use fleet_telematics::fleet::rules::RuleEdit;
use fleet_telematics::fleet::{
    HealthScorer, RuleBook, RuleEditor, SortColumn, SortDirection, VehicleAlertSummary,
    VehicleFilter, VehicleQuery, VehicleType,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date stamped into export file names (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Extra questions for the assistant portion of the demo
    #[arg(long = "question")]
    pub(crate) questions: Vec<String>,
    /// Skip the assistant portion of the demo
    #[arg(long)]
    pub(crate) skip_assistant: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        date,
        questions,
        skip_assistant,
    } = args;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let data = FleetData::sample();

    println!("Fleet telematics demo");
    for line in overview_lines(&data) {
        println!("{line}");
    }

    render_alerts(&data);
    render_explorer(&data);
    render_rules();
    render_exports(&data, date)?;

    if skip_assistant {
        return Ok(());
    }

    println!("\nFleet assistant");
    let snapshot = &data.snapshot;
    let prompts = SUGGESTED_QUESTIONS
        .iter()
        .map(|question| question.to_string())
        .chain(std::iter::once("Compare VAN-001 and TRK-142".to_string()))
        .chain(questions);
    for question in prompts {
        println!("\nQ: {question}");
        println!(
            "{}",
            FleetAssistant.respond(&question, &snapshot.metrics, &snapshot.vehicles)
        );
    }
    Ok(())
}

fn overview_lines(data: &FleetData) -> Vec<String> {
    let metrics = &data.snapshot.metrics;
    let trend = match metrics.faults_over_time.percent_change() {
        Some(change) => format!("{change:+.0}% vs previous period"),
        None => "no previous period".to_string(),
    };

    let mut lines = vec![
        format!(
            "Vehicles: {} total | {} active | {} idle ({:.1}% idle)",
            metrics.total_vehicles,
            metrics.vehicles_active,
            metrics.vehicles_idle,
            metrics.idle_percentage
        ),
        format!("Fleet health index: {}", metrics.fleet_health_index),
        format!(
            "Fuel cost/mile: ${:.2} (baseline ${:.2}) | Efficiency {:.1} mpg (baseline {:.1}{})",
            metrics.fuel_cost_per_mile,
            metrics.baselines.cost_per_mile,
            metrics.avg_fuel_efficiency,
            metrics.baselines.fuel_efficiency_mpg,
            if metrics.efficiency_below_baseline() {
                ", below"
            } else {
                ""
            }
        ),
        format!(
            "Daily fuel: {:.1}L ({:.1}L moving / {:.1}L idle, {:.1}% idle{}) | Daily cost ${:.2}",
            metrics.total_fuel_consumption_daily,
            metrics.fuel_consumption_moving,
            metrics.fuel_consumption_idle,
            metrics.idle_fuel_percentage,
            if metrics.idle_fuel_above_threshold() {
                ", above target"
            } else {
                ""
            },
            metrics.total_fuel_cost_daily
        ),
        format!(
            "Maintenance: {} due ({:.0}% of fleet), {} overdue",
            metrics.maintenance_due,
            metrics.maintenance_percentage(),
            metrics.maintenance_overdue
        ),
        format!(
            "Active faults: {} ({trend})",
            metrics.faults_over_time.current
        ),
        "Health distribution:".to_string(),
    ];

    for (band, count) in HealthScorer::distribution(&data.snapshot.vehicles) {
        lines.push(format!("- {}: {count}", band.label()));
    }
    lines
}

fn render_alerts(data: &FleetData) {
    println!("\nVehicles by alerts");
    for summary in VehicleAlertSummary::rank(&data.snapshot.vehicles).iter().take(5) {
        println!(
            "- {} {}: {} alert(s), top {}",
            summary.top_severity.icon(),
            summary.vehicle,
            summary.alert_count,
            summary.top_severity.label()
        );
    }

    let overdue: Vec<_> = data
        .maintenance
        .items()
        .iter()
        .filter(|item| item.status == MaintenanceStatus::Overdue)
        .collect();
    if overdue.is_empty() {
        println!("\nOverdue maintenance: none");
    } else {
        println!("\nOverdue maintenance");
        for item in overdue {
            println!(
                "- {} {} (due {})",
                item.vehicle,
                item.task,
                item.due_date.format("%d/%m/%Y")
            );
        }
    }
}

fn render_explorer(data: &FleetData) {
    let mut query = VehicleQuery::new(VehicleFilter {
        vehicle_type: Some(VehicleType::Truck),
        ..VehicleFilter::default()
    });
    query.set_sort(SortColumn::Health, SortDirection::Asc);
    let page = query.run(&data.snapshot.vehicles);

    println!(
        "\nExplorer: trucks by health ({} of {})",
        page.items.len(),
        page.total_items
    );
    for vehicle in page.items {
        println!(
            "- {} health {} | {} | {:.1} mpg",
            vehicle.id,
            vehicle.health_index(),
            vehicle.status.label(),
            vehicle.avg_fuel_efficiency
        );
    }
}

fn render_rules() {
    let mut editor = RuleEditor::new(RuleBook::defaults());
    println!("\nMonitoring rules");
    for category in editor.book().grouped() {
        println!(
            "- {}: {}/{} enabled",
            category.category,
            category.enabled_count(),
            category.rules.len()
        );
    }

    // Show an edit being staged and then discarded.
    if let Some(rule) = editor.book().rules().first().cloned() {
        match editor.edit(rule.id, RuleEdit::Threshold1(rule.threshold1 + 500.0)) {
            Ok(()) => {
                let staged = editor
                    .book()
                    .get(rule.id)
                    .map_or(rule.threshold1, |edited| edited.threshold1);
                println!(
                    "Staged '{}' threshold {} -> {} {}",
                    rule.name, rule.threshold1, staged, rule.unit1
                );
                editor.discard();
            }
            Err(err) => println!("Rule edit rejected: {err}"),
        }
    }
}

fn render_exports(data: &FleetData, date: NaiveDate) -> Result<(), AppError> {
    println!("\nExports");
    let scope = ExportScope {
        vehicle: Some("VAN-001".to_string()),
        ..ExportScope::default()
    };
    for kind in ExportKind::ordered() {
        let csv = data.export(kind, &scope_for(kind, &scope))?;
        println!(
            "- {} ({} rows)",
            kind.file_name(date),
            csv.lines().count().saturating_sub(1)
        );
    }
    Ok(())
}

// Only the fault history export is scoped to a single vehicle in the demo.
fn scope_for(kind: ExportKind, vehicle_scope: &ExportScope) -> ExportScope {
    match kind {
        ExportKind::FaultHistory => vehicle_scope.clone(),
        _ => ExportScope::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_counts_every_vehicle_once() {
        let data = FleetData::sample();
        let lines = overview_lines(&data);
        assert!(lines[0].starts_with("Vehicles: 11 total"));

        let banded: usize = lines
            .iter()
            .skip_while(|line| *line != "Health distribution:")
            .skip(1)
            .filter_map(|line| line.rsplit(": ").next())
            .filter_map(|count| count.parse::<usize>().ok())
            .sum();
        assert_eq!(banded, 11);
    }

    #[test]
    fn only_fault_history_is_vehicle_scoped() {
        let scope = ExportScope {
            vehicle: Some("VAN-001".to_string()),
            ..ExportScope::default()
        };
        assert_eq!(
            scope_for(ExportKind::FaultHistory, &scope).vehicle.as_deref(),
            Some("VAN-001")
        );
        assert!(scope_for(ExportKind::FleetVehicles, &scope).vehicle.is_none());
    }
}
