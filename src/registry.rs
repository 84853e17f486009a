use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use log::{error, info, warn};

use crate::cli::Config;
use crate::session::{CaptureSession, Finalized, SessionError, SessionStatus};

// Token -> in flight session. The map lock is only held for lookups, each
// session has its own lock so sessions never wait on each other.
type Sessions = HashMap<String, Arc<Mutex<CaptureSession>>>;

#[derive(Debug, PartialEq)]
pub enum IngestOutcome {
    Accepted { total_payload_bytes: u64 },
    NotFound,
}

#[derive(Debug, PartialEq)]
pub enum StopOutcome {
    Stopped { id: String, artifact: Option<PathBuf> },
    NotFound { id: String },
    Failed { id: String, reason: String },
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopOutcome::Stopped { id, artifact: Some(path) } => {
                write!(f, "stopped {}: {}", id, path.display())
            }
            StopOutcome::Stopped { id, artifact: None } => write!(f, "stopped {}: no audio", id),
            StopOutcome::NotFound { id } => write!(f, "not found {}", id),
            StopOutcome::Failed { id, reason } => write!(f, "failed {}: {}", id, reason),
        }
    }
}

pub struct SessionRegistry {
    config: Config,
    sessions: Mutex<Sessions>,
}

impl SessionRegistry {
    pub fn new(config: Config) -> Self {
        SessionRegistry {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn artifact_path(&self, id: &str) -> PathBuf {
        self.config.save_dir.join(format!("{}-fixed.wav", id))
    }

    fn get(&self, id: &str) -> Option<Arc<Mutex<CaptureSession>>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Start a session, the token is handed back before any audio is needed.
    pub fn open(&self) -> String {
        let session = CaptureSession::open(&self.config.spool_dir);
        let id = session.id().to_string();

        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::new(Mutex::new(session)));

        info!("{}: session started", id);
        id
    }

    pub fn ingest(&self, id: &str, chunk: &[u8]) -> Result<IngestOutcome, SessionError> {
        let session = match self.get(id) {
            None => return Ok(IngestOutcome::NotFound),
            Some(s) => s,
        };

        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        match session.ingest(chunk) {
            Ok(total_payload_bytes) => Ok(IngestOutcome::Accepted {
                total_payload_bytes,
            }),
            Err(e) => {
                error!("{}: chunk rejected: {}", id, e);
                Err(e)
            }
        }
    }

    /// Finalize a session by token into the save dir.
    ///
    /// Whatever was durably written gets framed, so a transport that died
    /// mid capture still produces a truncated but valid file. An I/O failure
    /// keeps the session registered so stop can be asked for again, a header
    /// or length failure never goes away on retry so the session is dropped.
    pub fn stop(&self, id: &str) -> StopOutcome {
        let session = match self.get(id) {
            None => {
                warn!("{}: stop for unknown session", id);
                return StopOutcome::NotFound { id: id.to_string() };
            }
            Some(s) => s,
        };

        let result = session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finalize(&self.artifact_path(id));

        match result {
            Ok(done) => {
                self.remove(id);

                let artifact = match done {
                    Finalized::Artifact { path, .. } => Some(path),
                    Finalized::Empty => None,
                };
                StopOutcome::Stopped {
                    id: id.to_string(),
                    artifact,
                }
            }
            Err(e) => {
                if let SessionError::Riff(_) = e {
                    error!("{}: cannot be framed, dropping session: {}", id, e);
                    self.remove(id);
                }
                StopOutcome::Failed {
                    id: id.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn remove(&self, id: &str) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    pub fn status(&self, id: &str) -> Option<SessionStatus> {
        self.get(id)
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).status())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
