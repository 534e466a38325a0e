use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "memochat")]
#[command(author, version, about = "Terminal chat with conversation memory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a single chat message (no memory carried over)
    Chat {
        prompt: String,

        /// System prompt override
        #[arg(short = 's', long)]
        system: Option<String>,
    },

    /// Start an interactive chat session with memory
    Interactive {
        /// System prompt override
        #[arg(short = 's', long)]
        system: Option<String>,
    },
}
