use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::artifact::write_artifact;
use crate::riff::header::{check_framed_length, parse};
use crate::riff::RiffError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Riff(#[from] RiffError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("session is closed")]
    Closed,
    #[error("session stopped accepting chunks after an earlier failure")]
    Halted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Finalized {
    Artifact { path: PathBuf, payload_length: u64 },
    // Nothing was received so nothing was written
    Empty,
}

// State machine enum, nothing leaves Closed. Halted is Receiving after a
// failed chunk: the spool is framed as is but nothing more is appended.
#[derive(Debug, Clone, PartialEq)]
enum Spo {
    Open,
    Receiving { payload_offset: usize },
    Halted { payload_offset: usize },
    Closed(Finalized),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    Open,
    Receiving,
    Halted,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub id: String,
    pub state: State,
    pub spool_path: PathBuf,
    pub total_payload_bytes: u64,
    pub opened_at: String,
}

/// One capture, fed chunks in arrival order by a single writer.
///
/// The first chunk must start with a complete header. It is parsed once, the
/// payload offset is fixed from it, and every chunk after that is treated as
/// raw payload. Nothing is ever reparsed.
pub struct CaptureSession {
    id: String,
    spool_path: PathBuf,
    opened_at: OffsetDateTime,

    // Payload bytes written so far, header excluded. Running total only,
    // finalize recomputes from the spool size.
    total_payload_bytes: u64,
    state: Spo,
}

impl CaptureSession {
    /// Allocate a token and a private spool path in `spool_dir`, storage is
    /// not touched until the first chunk.
    pub fn open(spool_dir: &Path) -> Self {
        let id = Uuid::new_v4().to_string();
        let spool_path = spool_dir.join(&id);
        debug!("{}: opened, spool at {}", id, spool_path.display());

        CaptureSession {
            id,
            spool_path,
            opened_at: OffsetDateTime::now_utc(),
            total_payload_bytes: 0,
            state: Spo::Open,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn spool_path(&self) -> &Path {
        &self.spool_path
    }

    pub fn state(&self) -> State {
        match self.state {
            Spo::Open => State::Open,
            Spo::Receiving { .. } => State::Receiving,
            Spo::Halted { .. } => State::Halted,
            Spo::Closed(_) => State::Closed,
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            id: self.id.clone(),
            state: self.state(),
            spool_path: self.spool_path().to_path_buf(),
            total_payload_bytes: self.total_payload_bytes,
            opened_at: self
                .opened_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| self.opened_at.unix_timestamp().to_string()),
        }
    }

    /// Store one chunk, returns the payload bytes stored so far.
    ///
    /// A header that fails to parse leaves the session open with nothing
    /// written. Any failure once receiving halts the session, a later chunk
    /// would no longer line up with what the spool holds.
    pub fn ingest(&mut self, chunk: &[u8]) -> Result<u64, SessionError> {
        match self.state {
            Spo::Open => {
                let hdr = parse(chunk)?;
                check_framed_length(hdr.payload_offset, hdr.payload_length)?;

                // Whole chunk, header + whatever payload rides along
                {
                    let mut file = File::create(&self.spool_path)?;
                    file.write_all(chunk)?;
                }

                info!(
                    "{}: {} channel(s), {} Hz, {} bit, payload at {}",
                    self.id,
                    hdr.num_channels,
                    hdr.sampling_rate,
                    hdr.bits_per_sample,
                    hdr.payload_offset
                );

                self.total_payload_bytes = hdr.payload_length;
                self.state = Spo::Receiving {
                    payload_offset: hdr.payload_offset,
                };
            }
            Spo::Receiving { payload_offset } => {
                if let Err(e) = self.append(payload_offset, chunk) {
                    error!(
                        "{}: halted after {} payload bytes: {}",
                        self.id, self.total_payload_bytes, e
                    );
                    self.state = Spo::Halted { payload_offset };
                    return Err(e);
                }
            }
            Spo::Halted { .. } => return Err(SessionError::Halted),
            Spo::Closed(_) => return Err(SessionError::Closed),
        }

        Ok(self.total_payload_bytes)
    }

    // Nothing is written unless the new total still fits both length fields
    fn append(&mut self, payload_offset: usize, chunk: &[u8]) -> Result<(), SessionError> {
        let total = check_framed_length(payload_offset, self.total_payload_bytes + chunk.len() as u64)?;

        let mut file = OpenOptions::new().append(true).open(&self.spool_path)?;
        file.write_all(chunk)?;

        self.total_payload_bytes = total;
        Ok(())
    }

    /// Emit the framed artifact to `dest` and close the session.
    ///
    /// Safe to call again, once closed it answers with the first result and
    /// writes nothing. A failure leaves the state as it was so the caller
    /// may try again.
    pub fn finalize(&mut self, dest: &Path) -> Result<Finalized, SessionError> {
        let result = match &self.state {
            Spo::Closed(done) => return Ok(done.clone()),
            Spo::Open => {
                debug!("{}: closed without receiving anything", self.id);
                Finalized::Empty
            }
            Spo::Receiving { payload_offset } | Spo::Halted { payload_offset } => {
                match write_artifact(&self.spool_path, *payload_offset, dest) {
                    Ok(Some(payload_length)) => Finalized::Artifact {
                        path: dest.to_path_buf(),
                        payload_length,
                    },
                    Ok(None) => Finalized::Empty,
                    Err(e) => {
                        warn!("{}: finalize failed: {}", self.id, e);
                        return Err(e);
                    }
                }
            }
        };

        self.state = Spo::Closed(result.clone());
        Ok(result)
    }
}
