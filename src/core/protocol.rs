use anyhow::{bail, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::core::game::{Outcome, Seat};

/// Frames are a u32 length prefix followed by a postcard-encoded message.
/// Nothing in this protocol comes close to the cap; a prefix beyond it means
/// the stream is desynced and the connection is unusable.
const MAX_FRAME_LEN: u32 = 1024;

/// Everything the host pushes to a player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ServerMsg {
    /// Sent once, right after the connection is accepted.
    Welcome { seat: Seat },
    /// Sent to exactly one seat: it is that seat's turn to guess.
    Prompt { round: u32 },
    /// Sent to the seat that just guessed.
    Feedback { guess: i32, score: u32, total: u32 },
    /// Sent to both seats after every single turn.
    Scorecard { totals: [u32; 2] },
    /// The last frame of a rejected guess attempt; a fresh Prompt follows.
    Error(String),
    /// Sent to both seats once, right before the host closes the connection.
    GameOver { outcome: Outcome },
}

/// Everything a player sends to the host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ClientMsg {
    Guess(i32),
}

/// Decode one frame body. Kept separate from the read path so callers can
/// tell a garbled payload (retryable) from a dead connection (not).
pub fn decode<M: DeserializeOwned>(frame: &[u8]) -> Result<M> {
    Ok(postcard::from_bytes(frame)?)
}

/// One end of a game connection.
pub struct Wire {
    stream: TcpStream,
}

impl Wire {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub async fn send<M: Serialize>(&mut self, msg: &M) -> Result<()> {
        let bytes = postcard::to_stdvec(msg)?;
        self.stream.write_u32(bytes.len() as u32).await?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read one raw frame. An error here means the connection is gone or the
    /// stream is desynced.
    pub async fn next_frame(&mut self) -> Result<Vec<u8>> {
        let len = self.stream.read_u32().await?;
        if len > MAX_FRAME_LEN {
            bail!("frame length {len} exceeds the {MAX_FRAME_LEN}-byte cap");
        }
        let mut buf = vec![0u8; len as usize];
        self.stream.read_exact(&mut buf).await?;
        Ok(buf)
    }

    pub async fn next<M: DeserializeOwned>(&mut self) -> Result<M> {
        let frame = self.next_frame().await?;
        decode(&frame)
    }
}
