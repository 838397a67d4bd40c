//! Minuta CLI: the main entry point.
//!
//! Commands:
//! - `movements`: list the movements and pieces of a process
//! - `preview`: show the text extracted from one piece
//! - `draft`: import pieces, add notes and generate a draft
//! - `models`: list the models and prompts the backend offers
//! - `config`: show, validate or locate the configuration

use clap::{Parser, Subcommand};
use minuta_core::{Objective, ProcessNumber};

mod commands;

#[derive(Parser)]
#[command(
    name = "minuta",
    about = "Minuta: assemble case pieces and notes into generated legal drafts",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the movements and pieces of a process
    Movements {
        /// Process number, with or without punctuation
        process: ProcessNumber,

        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Show the oldest movements first
        #[arg(long)]
        oldest_first: bool,
    },

    /// Show the text extracted from one piece
    Preview {
        process: ProcessNumber,

        /// Piece id as listed by `movements`
        piece: String,
    },

    /// Import pieces, add notes and generate a draft
    Draft(commands::draft::DraftArgs),

    /// List the models and prompts offered by the backend
    Models {
        /// Objective whose prompts to list
        #[arg(short, long, default_value = "minuta")]
        objective: Objective,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Load and check the configuration
    Validate,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Movements {
            process,
            page,
            oldest_first,
        } => commands::movements::run(process, page, oldest_first).await?,
        Commands::Preview { process, piece } => commands::preview::run(process, piece).await?,
        Commands::Draft(args) => commands::draft::run(args).await?,
        Commands::Models { objective } => commands::models::run(objective).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn process_argument_accepts_masked_numbers() {
        let cli = Cli::try_parse_from(["minuta", "movements", "0000001-00.2024.0.00.0000"]).unwrap();
        match cli.command {
            Commands::Movements { process, page, .. } => {
                assert_eq!(process.digits(), "00000010020240000000");
                assert_eq!(page, 1);
            }
            _ => panic!("expected movements"),
        }
    }

    #[test]
    fn short_process_number_is_rejected() {
        assert!(Cli::try_parse_from(["minuta", "preview", "123", "p1"]).is_err());
    }

    #[test]
    fn draft_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "minuta",
            "draft",
            "0000001-00.2024.0.00.0000",
            "--piece",
            "p1",
            "--piece",
            "p2",
            "--note",
            "Notas=Julgar procedente",
            "--how",
            "Procedente",
            "--adjust",
            "Mais curto",
        ])
        .unwrap();
        match cli.command {
            Commands::Draft(args) => {
                assert_eq!(args.pieces, vec!["p1", "p2"]);
                assert_eq!(args.notes.len(), 1);
                assert_eq!(args.objective, Objective::Minuta);
                assert_eq!(args.adjustments, vec!["Mais curto"]);
            }
            _ => panic!("expected draft"),
        }
    }
}
