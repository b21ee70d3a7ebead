//! services/cli/src/app/console.rs
//!
//! Line-oriented terminal input for the interactive commands.

use futures::StreamExt;
use std::io::Write;
use tokio::io::{AsyncRead, Stdin};
use tokio_util::codec::{FramedRead, LinesCodec};

use crate::error::ClientError;

pub struct Console<R> {
    lines: FramedRead<R, LinesCodec>,
}

impl Console<Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin> Console<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: FramedRead::new(reader, LinesCodec::new()),
        }
    }

    /// Next line without its terminator; `None` once input is closed.
    pub async fn next_line(&mut self) -> Result<Option<String>, ClientError> {
        match self.lines.next().await {
            Some(Ok(line)) => Ok(Some(line.trim_end_matches('\r').to_string())),
            Some(Err(e)) => Err(ClientError::Internal(format!("Failed to read input: {e}"))),
            None => Ok(None),
        }
    }

    pub async fn prompt(&mut self, label: &str) -> Result<Option<String>, ClientError> {
        print!("{label}");
        std::io::stdout().flush()?;
        self.next_line().await
    }

    /// Like `prompt`, but a closed input is an error.
    pub async fn ask(&mut self, label: &str) -> Result<String, ClientError> {
        self.prompt(label)
            .await?
            .ok_or_else(|| ClientError::Internal("Input closed".to_string()))
    }
}
