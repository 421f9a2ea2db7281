pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::cli::utils::run_script;

#[derive(Parser)]
#[command(name = "quickstart")]
#[command(about = "Database quickstart programs built on a pooled data source")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output rows in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create a database on the configured server")]
    CreateDatabase(commands::create_database::CreateDatabaseArgs),

    #[command(about = "Fetch student records sorted by first name and by id")]
    SelectSorted,

    #[command(about = "Update student ages, then list every student")]
    UpdateRecords(commands::update_records::UpdateRecordsArgs),

    #[command(about = "Run a query through two execution hooks and check their order")]
    StatementHook(commands::statement_hook::StatementHookArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Run the selected program. Database failures are logged and swallowed by
/// the script runner; every program ends with "Goodbye!".
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();
    tracing::debug!("Running in {:?} mode", config.environment);

    match cli.command {
        Commands::CreateDatabase(args) => {
            run_script(
                "create-database",
                &output_format,
                commands::create_database::handle(args, &config.datasource, &output_format),
            )
            .await
        }
        Commands::SelectSorted => {
            run_script(
                "select-sorted",
                &output_format,
                commands::select_sorted::handle(&config.datasource, &output_format),
            )
            .await
        }
        Commands::UpdateRecords(args) => {
            run_script(
                "update-records",
                &output_format,
                commands::update_records::handle(args, &config.datasource, &output_format),
            )
            .await
        }
        Commands::StatementHook(args) => {
            run_script(
                "statement-hook",
                &output_format,
                commands::statement_hook::handle(args, &config.datasource, &output_format),
            )
            .await
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("quickstart").chain(args.iter().copied()))
    }

    #[test]
    fn text_is_the_default_format() {
        let cli = parse(&["select-sorted"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }

    #[test]
    fn json_flag_is_global() {
        let before = parse(&["--json", "select-sorted"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&before), OutputFormat::Json);

        let after = parse(&["update-records", "--json", "--age", "30"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&after), OutputFormat::Json);
    }

    #[test]
    fn rejects_unknown_format_flags() {
        assert!(parse(&["--text", "select-sorted"]).is_err());
    }
}
