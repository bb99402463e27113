//! Output backends for emitting batches.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use printwatch_types::Batch;

use crate::line_protocol;

/// Output destination for batches.
///
/// Configure where the poller should emit each cycle's records.
#[derive(Debug)]
pub enum Output {
    /// Write line protocol to standard output.
    Stdout,

    /// Write batches to a JSON file.
    ///
    /// The file is overwritten with each batch.
    File(PathBuf),

    /// Send line protocol to a TCP server.
    ///
    /// A fresh connection is opened per batch.
    Tcp(String),

    /// Send batches through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(tokio::sync::mpsc::Sender<Batch>),
}

impl Output {
    /// Create a stdout output.
    pub fn stdout() -> Self {
        Output::Stdout
    }

    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use printwatch_sdk::Output;
    ///
    /// let output = Output::file("printer.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a TCP output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use printwatch_sdk::Output;
    ///
    /// let output = Output::tcp("localhost:8094");
    /// ```
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(addr.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use printwatch_sdk::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive batches
    /// // while let Some(batch) = rx.recv().await {
    /// //     println!("Got {} records", batch.len());
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<Batch>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Short description used in log messages.
    pub fn describe(&self) -> String {
        match self {
            Output::Stdout => "stdout".to_string(),
            Output::File(path) => format!("file:{}", path.display()),
            Output::Tcp(addr) => format!("tcp:{}", addr),
            Output::Channel(_) => "channel".to_string(),
        }
    }

    /// Emit a batch to this output.
    ///
    /// Network writes give up after `timeout`.
    pub(crate) async fn emit(&self, batch: &Batch, timeout: Duration) -> io::Result<()> {
        match self {
            Output::Stdout => {
                let text = line_protocol::render(batch);
                let mut stdout = tokio::io::stdout();
                stdout.write_all(text.as_bytes()).await?;
                stdout.flush().await?;
            }
            Output::File(path) => {
                let json = serde_json::to_string_pretty(batch)?;
                tokio::fs::write(path, json).await?;
            }
            Output::Tcp(addr) => {
                let text = line_protocol::render(batch);
                with_deadline(timeout, async {
                    let mut stream = tokio::net::TcpStream::connect(addr.as_str()).await?;
                    stream.write_all(text.as_bytes()).await?;
                    stream.shutdown().await
                })
                .await?;
            }
            Output::Channel(tx) => {
                // Best effort send (don't block if channel is full)
                let _ = tx.try_send(batch.clone());
            }
        }
        Ok(())
    }
}

/// Run `fut`, failing with `TimedOut` once `timeout` elapses.
async fn with_deadline<F>(timeout: Duration, fut: F) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    tokio::time::timeout(timeout, fut).await.map_err(|_| {
        io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no progress within {:?}", timeout),
        )
    })?
}
