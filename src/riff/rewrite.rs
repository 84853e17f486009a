use crate::riff::header::{check_framed_length, check_payload_length, parse};
use crate::riff::RiffError;

/// Produce a corrected copy of `original` with both length fields set from
/// `final_payload_length`.
///
/// Only the outer chunk size and the `data` declared size change, every other
/// byte up to the payload offset (fmt extension, LIST blocks, the `data` id) is
/// copied as is. Returns `None` when there is no payload, nothing is written
/// for an empty capture.
pub fn rewrite(original: &[u8], final_payload_length: u64) -> Result<Option<Vec<u8>>, RiffError> {
    if final_payload_length == 0 {
        return Ok(None);
    }
    check_payload_length(final_payload_length)?;

    // Same parser as ingest so the offset can't drift from what was stored
    let offset = parse(original)?.payload_offset;

    check_framed_length(offset, final_payload_length)?;
    let data_size = final_payload_length as u32;
    let chunk_size = (final_payload_length + offset as u64 - 8) as u32;

    let mut out = Vec::with_capacity(offset);
    out.extend_from_slice(&original[..4]);
    out.extend_from_slice(&chunk_size.to_le_bytes());
    out.extend_from_slice(&original[8..offset - 4]);
    out.extend_from_slice(&data_size.to_le_bytes());

    Ok(Some(out))
}
