use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod render;

#[derive(Parser)]
#[command(name = "fastroom", version, about = "Intermittent fasting tracker")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fasting session control
    Fast {
        /// Print the resulting state as JSON
        #[arg(long, global = true)]
        json: bool,
        #[command(subcommand)]
        action: commands::fast::FastAction,
    },
    /// Fasting phase reference
    Phases {
        #[command(subcommand)]
        action: commands::phases::PhasesAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    logging::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Fast { json, action } => commands::fast::run(action, json),
        Commands::Phases { action } => commands::phases::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
