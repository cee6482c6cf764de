use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "moodelix-cli", version, about = "Moodelix focus dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus timer with scheduled breaks
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Todo list
    Todo {
        #[command(subcommand)]
        action: commands::todo::TodoAction,
    },
    /// Focus streak and daily goal
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Wallpaper catalog and URL resolution
    Wallpaper {
        #[command(subcommand)]
        action: commands::wallpaper::WallpaperAction,
    },
    /// YouTube / Spotify links
    Media {
        #[command(subcommand)]
        action: commands::media::MediaAction,
    },
    /// Sound effect discovery
    Sounds {
        #[command(subcommand)]
        action: commands::sounds::SoundsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Focus { action } => commands::focus::run(action),
        Commands::Todo { action } => commands::todo::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Wallpaper { action } => commands::wallpaper::run(action),
        Commands::Media { action } => commands::media::run(action),
        Commands::Sounds { action } => commands::sounds::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
