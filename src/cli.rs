use std::io::Write as _;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use rand::Rng;

use crate::client;
use crate::host::{self, HostConfig};

#[derive(Parser)]
#[command(name = "numduel")]
#[command(about = "A two-player number-guessing duel over TCP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Host a game
    Host {
        /// Address to bind the server to
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        addr: String,

        /// Secret number (prompted for interactively when omitted)
        #[arg(short, long)]
        secret: Option<i32>,

        /// Rounds per player
        #[arg(short, long, default_value_t = 3)]
        rounds: u32,
    },
    /// Join a game
    Join {
        /// Host address to connect to (e.g., "127.0.0.1:8080")
        addr: String,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Host { addr, secret, rounds } => {
            let secret = match secret {
                Some(secret) => secret,
                None => prompt_secret()?,
            };
            let outcome = host::run(&addr, HostConfig { secret, rounds }).await?;
            println!("Game Over. {outcome}");
        }
        Commands::Join { addr } => {
            client::run(&addr).await?;
        }
    }

    Ok(())
}

/// Ask the operator for the secret. Blank input draws one at random.
fn prompt_secret() -> Result<i32> {
    let stdin = std::io::stdin();
    loop {
        print!("Enter number to guess (blank for random): ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        let read = stdin.read_line(&mut line).context("reading the secret")?;
        if read == 0 {
            bail!("stdin closed before a secret was entered");
        }
        let line = line.trim();
        if line.is_empty() {
            return Ok(rand::rng().random_range(1..=100));
        }
        match line.parse::<i32>() {
            Ok(secret) => return Ok(secret),
            Err(_) => println!("Please enter a whole number."),
        }
    }
}
