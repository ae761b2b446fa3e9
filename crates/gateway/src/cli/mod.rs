use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "voicegate", version, about = "Real-time voice-assistant gateway")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
pub enum Command {
    /// Run the gateway (default when no subcommand is given).
    Serve,
    /// Print the gateway's version and exit.
    Version,
}
