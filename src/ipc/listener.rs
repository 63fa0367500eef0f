//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket (owner-only) and accepts one connection at a
//! time.  Each line received is parsed as a JSON-encoded [`Command`].
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! "NextPage"
//! {"GoToPage":2}
//! {"Search":"mail"}
//! {"DragBegin":{"id":"5f0c…"}}
//! {"DragHover":{"cell":6,"edge":"Trailing"}}
//! {"Drop":{"item":{"id":"5f0c…"},"cell":3,"offset_x":12.0,"cell_width":96.0}}
//! "DragEnd"
//! ```
//!
//! Lines longer than [`MAX_LINE_BYTES`] are discarded.  A renderer reports
//! hover at pointer rate, so a `DragHover` identical to the previous one on
//! the same connection is not forwarded.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Longest accepted command line, newline excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// Each accepted connection can send multiple newline-delimited JSON
/// commands.  When the connection closes, the listener waits for the
/// next one.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called
    /// and removed when it returns.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Removes the socket file when dropped.
struct SocketFile<'a>(&'a Path);

impl Drop for SocketFile<'_> {
    fn drop(&mut self) {
        let _ = fs::remove_file(self.0);
    }
}

/// Whether the listener keeps going after a connection ends.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    SinkClosed,
}

enum Line {
    Text,
    TooLong,
    Eof,
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** indefinitely.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let _ = fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        let _guard = SocketFile(&self.path);
        fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    let flow = forward_commands(BufReader::new(stream), &sink);
                    debug!("client disconnected");
                    if flow == Flow::SinkClosed {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

/// Parse every line of one connection and forward the commands.
fn forward_commands<R: BufRead>(mut reader: R, sink: &mpsc::Sender<Command>) -> Flow {
    let mut buf = Vec::new();
    let mut last_hover: Option<Command> = None;
    loop {
        match next_line(&mut reader, &mut buf) {
            Ok(Line::Eof) => return Flow::Continue,
            Ok(Line::TooLong) => {
                warn!("discarding command line over {} bytes", MAX_LINE_BYTES);
                continue;
            }
            Ok(Line::Text) => {}
            Err(e) => {
                error!("read error: {}", e);
                return Flow::Continue;
            }
        }
        let Ok(text) = std::str::from_utf8(&buf) else {
            warn!("ignoring command line that is not UTF-8");
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let cmd = match serde_json::from_str::<Command>(text) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("ignoring malformed command {:?}: {}", text, e);
                continue;
            }
        };
        if matches!(cmd, Command::DragHover { .. }) {
            if last_hover.as_ref() == Some(&cmd) {
                continue;
            }
            last_hover = Some(cmd.clone());
        } else {
            last_hover = None;
        }
        debug!("received {:?}", cmd);
        if sink.send(cmd).is_err() {
            return Flow::SinkClosed;
        }
    }
}

/// Read one `\n`-terminated line into `buf` without the terminator,
/// buffering at most [`MAX_LINE_BYTES`] of it.
fn next_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Line> {
    buf.clear();
    let read = reader
        .by_ref()
        .take(MAX_LINE_BYTES as u64 + 1)
        .read_until(b'\n', buf)?;
    if read == 0 {
        return Ok(Line::Eof);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        return Ok(Line::Text);
    }
    if buf.len() <= MAX_LINE_BYTES {
        return Ok(Line::Text);
    }
    // Skip the rest of the oversized line.
    loop {
        let (found, used) = {
            let available = reader.fill_buf()?;
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (true, pos + 1),
                None => (available.is_empty(), available.len()),
            }
        };
        reader.consume(used);
        if found {
            return Ok(Line::TooLong);
        }
    }
}

//  Tests
