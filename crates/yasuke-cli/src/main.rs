use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "yasuke", version, about = "Path of Yasuke CLI")]
struct Cli {
    /// Act as this user instead of the active one
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profiles and the active user
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// XP, levels and the XP ledger
    Xp {
        #[command(subcommand)]
        action: commands::xp::XpAction,
    },
    /// Growth paths
    Path {
        #[command(subcommand)]
        action: commands::path::PathAction,
    },
    /// Goals on a path
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Activities under a goal
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Honor journal
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Daily quests
    Quest {
        #[command(subcommand)]
        action: commands::quest::QuestAction,
    },
    /// Notifications
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Profile statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("YASUKE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.user);
    let result = match cli.command {
        Commands::Profile { action } => commands::profile::run(action, &ctx),
        Commands::Xp { action } => commands::xp::run(action, &ctx),
        Commands::Path { action } => commands::path::run(action, &ctx),
        Commands::Goal { action } => commands::goal::run(action, &ctx),
        Commands::Activity { action } => commands::activity::run(action, &ctx),
        Commands::Journal { action } => commands::journal::run(action, &ctx),
        Commands::Quest { action } => commands::quest::run(action, &ctx),
        Commands::Notify { action } => commands::notify::run(action, &ctx),
        Commands::Stats { action } => commands::stats::run(action, &ctx),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "yasuke", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
