use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::buf::{copy_frames, fill_buf};
use crate::riff::header::{check_payload_length, parse, RiffHeader};
use crate::riff::rewrite::rewrite;
use crate::riff::{RiffError, TRUNCATED_HEADER};
use crate::session::SessionError;

// First read when hunting for a raw file's header, doubled while the header
// runs past it
const HEADER_READ: usize = 64 * 1024;

/// Write a correctly framed copy of the spool file at `spool` to `dest`.
///
/// `payload_offset` must come from parsing the same bytes the spool starts
/// with. The final payload length is taken from the spool size right now, not
/// from anything counted while the stream was live. The spool is only read.
///
/// Returns the payload length written, `None` if there was no payload and so
/// no artifact.
pub fn write_artifact(
    spool: &Path,
    payload_offset: usize,
    dest: &Path,
) -> Result<Option<u64>, SessionError> {
    let mut src = File::open(spool)?;
    let spool_len = src.metadata()?.len();

    let mut original = vec![0u8; payload_offset];
    src.read_exact(&mut original)?;

    let final_payload_length = spool_len - payload_offset as u64;
    let corrected = match rewrite(&original, final_payload_length)? {
        None => {
            debug!("{}: no payload, artifact skipped", spool.display());
            return Ok(None);
        }
        Some(hdr) => hdr,
    };

    // Stage next to the destination then rename over it, a reader never
    // sees a half written artifact
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;

    staged.write_all(&corrected)?;
    src.seek(SeekFrom::Start(payload_offset as u64))?;
    let copied = copy_frames(&mut src, &mut staged, final_payload_length)?;
    if copied != final_payload_length {
        return Err(SessionError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "spool shrank while writing artifact",
        )));
    }

    staged.flush()?;
    staged.persist(dest).map_err(|e| e.error)?;

    info!("{}: wrote {} payload bytes", dest.display(), final_payload_length);
    Ok(Some(final_payload_length))
}

/// Parse the header at the start of the file at `src`.
///
/// Large LIST blocks are read through, only a header that runs past the end
/// of the file is truncated. The live payload length is taken from the file
/// size, not from what was read.
pub fn read_header(src: &Path) -> Result<RiffHeader, SessionError> {
    let mut file = File::open(src)?;
    let file_len = file.metadata()?.len();

    let mut head = Vec::new();
    let mut want = HEADER_READ;

    loop {
        let start = head.len();
        head.resize(want, 0);
        let (eof, len) = fill_buf(&mut file, &mut head[start..])?;
        head.truncate(start + len);

        match parse(&head) {
            Err(RiffError::Format(msg)) if msg == TRUNCATED_HEADER && !eof => {
                debug!("{}: header past {} bytes, reading more", src.display(), want);
                want *= 2;
            }
            res => {
                let mut hdr = res?;
                hdr.payload_length = check_payload_length(file_len - hdr.payload_offset as u64)?;
                return Ok(hdr);
            }
        }
    }
}

/// Repair an already accumulated raw file, header with placeholder lengths
/// followed by the payload, into a correctly framed copy at `dst`.
pub fn fix_wav_length(src: &Path, dst: &Path) -> Result<Option<u64>, SessionError> {
    let hdr = read_header(src)?;
    debug!(
        "{}: {} channel(s), {} Hz, {} bit, payload at {}",
        src.display(),
        hdr.num_channels,
        hdr.sampling_rate,
        hdr.bits_per_sample,
        hdr.payload_offset
    );

    write_artifact(src, hdr.payload_offset, dst)
}
