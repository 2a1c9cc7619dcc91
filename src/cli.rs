use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "portfolio-api")]
#[command(about = "Portfolio API server - contacts, projects, services and users")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Bind address, overrides HOST")]
        host: Option<String>,

        #[arg(long, short, help = "Listen port, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create the collection tables in DATABASE_URL and exit")]
    Migrate,
}

impl Cli {
    /// Subcommand to run, defaulting to `serve` with no overrides
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve { host: None, port: None })
    }
}
