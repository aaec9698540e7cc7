use crate::server;
use crate::summary::{run_summary, SummaryArgs};
use clap::{Args, Parser, Subcommand};
use incident_analytics::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Incident Analytics",
    about = "Serve and inspect hospital incident reporting analytics",
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
    /// Print the analytics dashboard for a CSV report export
    Summary(SummaryArgs),
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
        Command::Summary(args) => run_summary(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["incident-analytics"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn summary_accepts_explicit_bounds() {
        let cli = Cli::try_parse_from([
            "incident-analytics",
            "summary",
            "--csv",
            "reports.csv",
            "--start-date",
            "2025-09-01",
            "--end-date",
            "2025-09-30",
            "--department",
            "ICU",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Summary(args)) => {
                assert_eq!(args.department.as_deref(), Some("ICU"));
                assert!(args.start_date.is_some());
                assert!(!args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn summary_rejects_malformed_dates() {
        let result = Cli::try_parse_from([
            "incident-analytics",
            "summary",
            "--csv",
            "reports.csv",
            "--start-date",
            "September",
            "--end-date",
            "2025-09-30",
        ]);
        assert!(result.is_err());
    }
}
