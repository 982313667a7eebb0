use anyhow::{Context as _, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::game::{GameState, Outcome, Seat};
use crate::core::protocol::{self, ClientMsg, ServerMsg, Wire};

/// Attempts a seat gets at producing a decodable guess before its turn is
/// forfeited.
const GUESS_ATTEMPTS: u32 = 3;

pub struct HostConfig {
    pub secret: i32,
    pub rounds: u32,
}

struct Player {
    seat: Seat,
    wire: Wire,
}

/// Bind `addr` and run one full game.
pub async fn run(addr: &str, config: HostConfig) -> Result<Outcome> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    serve(listener, config).await
}

/// Accept both seats in order, then hand the whole game to a dedicated
/// worker and wait for it to finish.
pub async fn serve(listener: TcpListener, config: HostConfig) -> Result<Outcome> {
    info!(addr = %listener.local_addr()?, rounds = config.rounds, "waiting for two players");

    let first = accept_player(&listener, Seat::P0).await?;
    let second = accept_player(&listener, Seat::P1).await?;
    let state = GameState::new(config.secret, config.rounds);

    let worker = tokio::spawn(run_game(state, [first, second]));
    let outcome = worker.await.context("game worker panicked")??;
    info!(%outcome, "game over");
    Ok(outcome)
}

async fn accept_player(listener: &TcpListener, seat: Seat) -> Result<Player> {
    let (stream, peer) = listener.accept().await.context("accepting a player")?;
    info!(%peer, %seat, "player connected");
    let mut wire = Wire::new(stream);
    wire.send(&ServerMsg::Welcome { seat })
        .await
        .with_context(|| format!("welcoming {seat}"))?;
    Ok(Player { seat, wire })
}

/// The serial turn loop. Runs to completion for every game: early exits
/// (exact match, forfeit) still flow through outcome resolution and the
/// final notifications.
async fn run_game(mut state: GameState, mut players: [Player; 2]) -> Result<Outcome> {
    'rounds: for round in 0..state.max_rounds() {
        for seat in Seat::ALL {
            take_turn(&mut state, &mut players, round, seat).await;
            if state.is_over() {
                break 'rounds;
            }
        }
    }

    let outcome = state.outcome();
    for player in players.iter_mut() {
        // a seat that dropped mid-game fails this write; nothing left to do for it
        if let Err(error) = player.wire.send(&ServerMsg::GameOver { outcome }).await {
            warn!(seat = %player.seat, %error, "could not deliver game over");
        }
    }
    Ok(outcome)
}

async fn take_turn(state: &mut GameState, players: &mut [Player; 2], round: u32, seat: Seat) {
    let player = &mut players[seat.index()];
    match read_guess(&mut player.wire, round).await {
        Ok(Some(guess)) => {
            let turn = state.apply_guess(seat, guess);
            info!(%seat, round, guess, score = turn.score, total = turn.total, "turn scored");
            let feedback = ServerMsg::Feedback {
                guess,
                score: turn.score,
                total: turn.total,
            };
            if let Err(error) = player.wire.send(&feedback).await {
                warn!(%seat, %error, "connection lost delivering feedback");
                state.forfeit_game(seat);
                return;
            }
        }
        Ok(None) => {
            let turn = state.forfeit_turn(seat);
            warn!(%seat, round, total = turn.total, "no usable guess; turn forfeited");
        }
        Err(error) => {
            warn!(%seat, round, %error, "connection lost mid-turn");
            state.forfeit_game(seat);
            return;
        }
    }
    broadcast_scorecard(state, players).await;
}

/// Prompt the seat and read one guess. `Ok(None)` means the seat kept
/// sending undecodable frames and forfeits the turn; `Err` means its
/// connection is gone.
async fn read_guess(wire: &mut Wire, round: u32) -> Result<Option<i32>> {
    wire.send(&ServerMsg::Prompt { round }).await?;
    for attempt in 1..=GUESS_ATTEMPTS {
        let frame = wire.next_frame().await?;
        match protocol::decode::<ClientMsg>(&frame) {
            Ok(ClientMsg::Guess(guess)) => return Ok(Some(guess)),
            Err(error) => {
                warn!(attempt, %error, "undecodable guess frame");
                if attempt < GUESS_ATTEMPTS {
                    wire.send(&ServerMsg::Error("that was not a guess; try again".into()))
                        .await?;
                    wire.send(&ServerMsg::Prompt { round }).await?;
                } else {
                    wire.send(&ServerMsg::Error(
                        "no usable guess received; turn forfeited".into(),
                    ))
                    .await?;
                }
            }
        }
    }
    Ok(None)
}

/// Both seats see the full scorecard after every single turn, whoever
/// just guessed.
async fn broadcast_scorecard(state: &mut GameState, players: &mut [Player; 2]) {
    let scorecard = ServerMsg::Scorecard { totals: state.totals() };
    for player in players.iter_mut() {
        if let Err(error) = player.wire.send(&scorecard).await {
            warn!(seat = %player.seat, %error, "connection lost delivering scorecard");
            state.forfeit_game(player.seat);
        }
    }
}
