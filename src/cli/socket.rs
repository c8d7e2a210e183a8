//! Control socket for daemon mode
//!
//! Line protocol: the client writes one request, the daemon answers one
//! line. Commands answer `ok`, `status` answers the current report as JSON,
//! anything else answers `error: ...`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::application::ControlCommand;
use crate::domain::recording::StatusReport;

use super::runtime_dir::runtime_file;

const SOCKET_FILE_NAME: &str = "rollcap.sock";

/// Where the daemon listens unless told otherwise
pub fn default_socket_path() -> PathBuf {
    runtime_file(SOCKET_FILE_NAME)
}

/// One request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketRequest {
    Command(ControlCommand),
    Status,
}

impl SocketRequest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command(command) => command.as_str(),
            Self::Status => "status",
        }
    }
}

impl fmt::Display for SocketRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocketRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim() {
            "status" => return Ok(Self::Status),
            "start" => ControlCommand::Start,
            "pause" => ControlCommand::Pause,
            "resume" => ControlCommand::Resume,
            "toggle" => ControlCommand::Toggle,
            "stop" => ControlCommand::Stop,
            other => return Err(format!("unknown command '{}'", other)),
        };
        Ok(Self::Command(command))
    }
}

/// Listening side, owned by the daemon. The socket file is removed on drop.
pub struct ControlSocket {
    path: PathBuf,
    listener: UnixListener,
}

impl ControlSocket {
    /// Bind `path`, replacing a stale socket file left by a dead daemon
    pub fn bind(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale socket"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let listener = UnixListener::bind(&path)?;
        Ok(Self { path, listener })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Answer clients until the task is aborted.
    ///
    /// Commands are forwarded to `commands`; status requests read the latest
    /// report from `status`.
    pub async fn serve(
        &self,
        commands: mpsc::Sender<ControlCommand>,
        status: watch::Receiver<StatusReport>,
    ) {
        loop {
            let stream = match self.listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = %e, "socket accept failed");
                    continue;
                }
            };

            let commands = commands.clone();
            let status = status.clone();
            tokio::spawn(async move {
                if let Err(e) = answer(stream, &commands, &status).await {
                    warn!(error = %e, "socket client failed");
                }
            });
        }
    }
}

impl Drop for ControlSocket {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn answer(
    stream: UnixStream,
    commands: &mpsc::Sender<ControlCommand>,
    status: &watch::Receiver<StatusReport>,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut line = String::new();
    BufReader::new(reader).read_line(&mut line).await?;

    let reply = reply_to(&line, commands, status).await;
    writer.write_all(reply.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

async fn reply_to(
    line: &str,
    commands: &mpsc::Sender<ControlCommand>,
    status: &watch::Receiver<StatusReport>,
) -> String {
    let request = match line.parse::<SocketRequest>() {
        Ok(request) => request,
        Err(e) => return format!("error: {}", e),
    };
    debug!(%request, "socket request");

    match request {
        SocketRequest::Command(command) => match commands.send(command).await {
            Ok(()) => "ok".to_string(),
            Err(_) => "error: daemon is shutting down".to_string(),
        },
        SocketRequest::Status => {
            let report = status.borrow().clone();
            serde_json::to_string(&report)
                .unwrap_or_else(|e| format!("error: cannot encode status: {}", e))
        }
    }
}

/// Connecting side, used by `rollcap daemon <action>`
pub struct ControlClient {
    path: PathBuf,
}

impl ControlClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Whether a daemon socket is present
    pub fn daemon_present(&self) -> bool {
        self.path.exists()
    }

    /// Send one request and return the reply line without its newline
    pub async fn request(&self, request: SocketRequest) -> io::Result<String> {
        let stream = UnixStream::connect(&self.path).await?;
        let (reader, mut writer) = stream.into_split();

        writer.write_all(request.as_str().as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut reply = String::new();
        BufReader::new(reader).read_line(&mut reply).await?;
        Ok(reply.trim_end().to_string())
    }
}
