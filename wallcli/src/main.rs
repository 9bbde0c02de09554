use anyhow::Result;
use clap::{Parser, Subcommand};
use wallcli::WallCliApp;

#[derive(Parser)]
#[command(name = "wallcli")]
#[command(about = "WallStudio - browse, generate and save wallpapers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Browse portrait wallpapers from Pexels
    Gallery {
        /// Search query, defaults to the one in settings.json
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Generate a wallpaper from a text prompt
    Generate {
        /// Prompt to generate right away
        prompt: Option<String>,
    },
    /// Print resolved directories and settings
    Config,
}

fn main() -> Result<()> {
    {
        let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "debug".to_owned()
            } else {
                "info".to_owned()
            }
        });

        // SAFETY: we call this from the main thread without any other threads running.
        unsafe {
            std::env::set_var("RUST_LOG", rust_log);
        }
    }

    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let cli = Cli::parse();
    let mut app = WallCliApp::new()?;

    match cli.command {
        Command::Gallery { query } => app.run_gallery(query),
        Command::Generate { prompt } => app.run_generator(prompt.filter(|p| !p.trim().is_empty())),
        Command::Config => {
            app.print_config();
            Ok(())
        }
    }
}
