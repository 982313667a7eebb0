use std::io::Write as _;

use anyhow::{Context as _, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::net::TcpStream;
use tracing::warn;

use crate::core::protocol::{ClientMsg, ServerMsg, Wire};

/// What the client is waiting on. The host sends nothing while a guess is
/// pending, so each state has exactly one event source.
enum Phase {
    AwaitingServer,
    AwaitingLocalInput,
}

/// Connect to a host and play one game from the local terminal.
pub async fn run(addr: &str) -> Result<()> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("connecting to {addr}"))?;
    println!("Connected to host at {addr}.");

    let mut wire = Wire::new(stream);
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut phase = Phase::AwaitingServer;

    loop {
        match phase {
            Phase::AwaitingServer => {
                let msg: ServerMsg = match wire.next().await {
                    Ok(msg) => msg,
                    Err(error) => {
                        warn!(%error, "connection to host lost");
                        println!("Connection to host lost.");
                        break;
                    }
                };
                println!("{}", render(&msg));
                phase = match msg {
                    ServerMsg::Prompt { .. } => Phase::AwaitingLocalInput,
                    ServerMsg::GameOver { .. } => break,
                    _ => Phase::AwaitingServer,
                };
            }
            Phase::AwaitingLocalInput => {
                let guess = read_guess(&mut input).await?;
                wire.send(&ClientMsg::Guess(guess)).await?;
                phase = Phase::AwaitingServer;
            }
        }
    }

    Ok(())
}

/// One integer from the operator, re-prompting until a line parses.
async fn read_guess(input: &mut Lines<BufReader<Stdin>>) -> Result<i32> {
    loop {
        print!("Enter your guess: ");
        std::io::stdout().flush()?;
        let line = input
            .next_line()
            .await?
            .context("stdin closed while a guess was pending")?;
        match line.trim().parse::<i32>() {
            Ok(guess) => return Ok(guess),
            Err(_) => println!("Please enter a whole number."),
        }
    }
}

fn render(msg: &ServerMsg) -> String {
    match msg {
        ServerMsg::Welcome { seat } => format!("Welcome! You are {seat}."),
        ServerMsg::Prompt { round } => format!("Round {}. Your turn to guess.", round + 1),
        ServerMsg::Feedback { guess, score, total } => {
            format!("You guessed {guess}. Score this turn: {score}. Total: {total}")
        }
        ServerMsg::Scorecard { totals } => format!(
            "========= SCORECARD =========\n\
             Player 1: {}\n\
             Player 2: {}\n\
             =============================",
            totals[0], totals[1]
        ),
        ServerMsg::Error(reason) => format!("Host: {reason}"),
        ServerMsg::GameOver { outcome } => format!("Game Over. {outcome}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game::{Outcome, Seat};

    #[test]
    fn scorecard_shows_both_totals() {
        let text = render(&ServerMsg::Scorecard { totals: [150, 120] });
        assert!(text.contains("Player 1: 150"));
        assert!(text.contains("Player 2: 120"));
    }

    #[test]
    fn renderings_keep_the_operator_facing_markers() {
        assert!(render(&ServerMsg::Prompt { round: 0 }).contains("Your turn to guess"));
        let over = render(&ServerMsg::GameOver {
            outcome: Outcome::Exact { winner: Seat::P0 },
        });
        assert!(over.contains("Game Over"));
        assert!(over.contains("Player 1"));
    }
}
