use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};

use tutorials_hub::config::ServeConfig;
use tutorials_hub::{serve, slug};

/// Explicit subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Serve a tutorials site directory for local preview
    Serve {
        /// Site directory (index.html, README.md, tutorials/, icons/, pkg/)
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Interface address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Starting port number for the HTTP server
        #[arg(long, default_value = "3333")]
        port: u16,
    },
    /// Print the anchor slug for each heading text
    Slug {
        /// Heading texts, one slug is printed per argument
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[derive(Parser)]
#[command(
    name = "tutorials-hub",
    version,
    about = "Preview and authoring tools for a markdown tutorials page"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Serve { root, bind, port } => {
            let config = ServeConfig { root, bind, port };
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(serve::ServeError::from)
                .and_then(|rt| rt.block_on(serve::run_serve(config)))
        }
        Commands::Slug { text } => {
            for heading in &text {
                println!("{}", slug::to_anchor(heading));
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
