use crate::commands::{run_ask, run_export, run_vehicles, AskArgs, ExportArgs, VehiclesArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::repl::{run_chat, ChatArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_telematics::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Telematics",
    about = "Serve and explore fleet health, alerts, exports and the fleet assistant",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Ask the fleet assistant a single question
    Ask(AskArgs),
    /// List vehicles with explorer filters, sorting and paging
    Vehicles(VehiclesArgs),
    /// Write one of the CSV exports
    Export(ExportArgs),
    /// Interactive assistant chat persisted to the chat store
    Chat(ChatArgs),
    /// Walk through the sample fleet: KPIs, alerts, rules and assistant answers
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ask(args) => run_ask(args),
        Command::Vehicles(args) => run_vehicles(args),
        Command::Export(args) => run_export(args),
        Command::Chat(args) => run_chat(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["fleet-telematics-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_explorer_flags() {
        let cli = Cli::try_parse_from([
            "fleet-telematics-api",
            "vehicles",
            "--type",
            "truck",
            "--sort",
            "health",
            "--desc",
            "--page",
            "2",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Vehicles(args)) => {
                assert_eq!(args.vehicle_type.as_deref(), Some("truck"));
                assert_eq!(args.sort.as_deref(), Some("health"));
                assert!(args.desc);
                assert_eq!(args.page, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ask_joins_words_into_one_question() {
        let cli = Cli::try_parse_from(["fleet-telematics-api", "ask", "show", "idle", "vehicles"])
            .expect("parses");
        match cli.command {
            Some(Command::Ask(args)) => assert_eq!(args.question(), "show idle vehicles"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
