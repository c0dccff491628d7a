use crate::infra::{parse_choice, parse_date, ExportScope, FleetData, VehicleListParams};
use chrono::{Local, NaiveDate};
use clap::Args;
use fleet_telematics::assistant::FleetAssistant;
use fleet_telematics::error::AppError;
use fleet_telematics::fleet::export::ExportKind;
use fleet_telematics::fleet::{AlertFilter, Page, Severity, VehicleRecord, VehicleView};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AskArgs {
    /// Question text; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub(crate) words: Vec<String>,
}

impl AskArgs {
    pub(crate) fn question(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct VehiclesArgs {
    /// Match against vehicle id, VIN or camera serial
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Van, Truck or Car
    #[arg(long = "type")]
    pub(crate) vehicle_type: Option<String>,
    /// Active, Idle or "In Service"
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Diesel, Gasoline, Electric or Hybrid
    #[arg(long)]
    pub(crate) fuel: Option<String>,
    /// Only vehicles carrying an alert of this severity
    #[arg(long)]
    pub(crate) severity: Option<String>,
    /// Sort column (health, cost_per_mile, efficiency, fuel_daily, moving_idle, cost_daily, alerts)
    #[arg(long)]
    pub(crate) sort: Option<String>,
    /// Sort descending instead of ascending
    #[arg(long)]
    pub(crate) desc: bool,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    /// Print the page as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// alert_feed, vehicles_by_alerts, maintenance_due, fault_history or fleet_vehicles
    pub(crate) kind: String,
    /// Output path; defaults to `{export}_{YYYY-MM-DD}.csv`, `-` writes to stdout
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Vehicle id (required for fault_history)
    #[arg(long)]
    pub(crate) vehicle: Option<String>,
    /// Alert severity filter for alert exports
    #[arg(long)]
    pub(crate) severity: Option<String>,
    /// Alert search text for alert exports
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Date stamped into the file name (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

pub(crate) fn run_ask(args: AskArgs) -> Result<(), AppError> {
    let question = args.question();
    if question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".to_string()));
    }

    let data = FleetData::sample();
    let answer = FleetAssistant.respond(&question, &data.snapshot.metrics, &data.snapshot.vehicles);
    println!("{answer}");
    Ok(())
}

pub(crate) fn run_vehicles(args: VehiclesArgs) -> Result<(), AppError> {
    let direction = args.desc.then(|| "desc".to_string());
    let params = VehicleListParams {
        search: args.search,
        vehicle_type: args.vehicle_type,
        status: args.status,
        fuel: args.fuel,
        severity: args.severity,
        sort: args.sort,
        direction,
        page: Some(args.page),
    };
    let query = params.into_query()?;
    let data = FleetData::sample();
    let page = query.run(&data.snapshot.vehicles);

    if args.json {
        let views = Page {
            items: page.items.iter().map(|vehicle| vehicle.to_view()).collect::<Vec<VehicleView>>(),
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        };
        let rendered = serde_json::to_string_pretty(&views).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "{:<8} {:<6} {:<10} {:<11} {:>6} {:>9} {:>6} {:>10}  Alerts",
        "Vehicle", "Type", "Fuel", "Status", "Health", "Cost/mi", "MPG", "Cost/day"
    );
    for vehicle in &page.items {
        println!("{}", vehicle_row(vehicle));
    }
    println!(
        "Page {} of {} ({} vehicles)",
        page.page, page.total_pages, page.total_items
    );
    Ok(())
}

fn vehicle_row(vehicle: &VehicleRecord) -> String {
    format!(
        "{:<8} {:<6} {:<10} {:<11} {:>6} {:>9.2} {:>6.1} {:>10.2}  {}",
        vehicle.id,
        vehicle.vehicle_type.label(),
        vehicle.fuel_type.label(),
        vehicle.status.label(),
        vehicle.health_index(),
        vehicle.fuel_cost_per_mile,
        vehicle.avg_fuel_efficiency,
        vehicle.total_fuel_cost_daily,
        vehicle.alert_names().join(", ")
    )
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let kind = ExportKind::parse(&args.kind)
        .ok_or_else(|| AppError::NotFound(format!("export '{}'", args.kind)))?;
    let scope = ExportScope {
        vehicle: args.vehicle,
        alerts: AlertFilter {
            severity: parse_choice("severity", args.severity.as_deref(), Severity::parse)?,
            search: args.search,
        },
    };

    let csv = FleetData::sample().export(kind, &scope)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let path = args
        .out
        .unwrap_or_else(|| PathBuf::from(kind.file_name(date)));

    if path.as_os_str() == "-" {
        print!("{csv}");
        return Ok(());
    }

    std::fs::write(&path, csv)?;
    println!("Wrote {} to {}", kind.stem(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_telematics::fleet::sample;

    #[test]
    fn vehicle_rows_show_health_and_alerts() {
        let vehicles = sample::vehicles();
        let row = vehicle_row(&vehicles[0]);
        assert!(row.starts_with("VAN-001"));
        assert!(row.contains(" 33 "));
        assert!(row.ends_with("Engine Fault (P0300), Oil Change Due"));
    }

    #[test]
    fn export_writes_to_requested_path() {
        let path = std::env::temp_dir().join(format!(
            "fleet-export-{}-maintenance.csv",
            std::process::id()
        ));
        run_export(ExportArgs {
            kind: "maintenance-due".to_string(),
            out: Some(path.clone()),
            vehicle: Some("VAN-001".to_string()),
            severity: None,
            search: None,
            date: None,
        })
        .expect("export succeeds");

        let written = std::fs::read_to_string(&path).expect("file written");
        assert!(written.starts_with("Vehicle,Task,Due Date,Status\n"));
        assert!(written.lines().skip(1).all(|line| line.starts_with("VAN-001,")));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unknown_exports_are_rejected() {
        let err = run_export(ExportArgs {
            kind: "payroll".to_string(),
            out: None,
            vehicle: None,
            severity: None,
            search: None,
            date: None,
        })
        .expect_err("unknown export");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
