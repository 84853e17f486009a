use std::io::{Read, Write};

// 8Kb copy frame, payload is streamed through this, never held whole
const FRAME_SIZE: usize = 8 * 1024;

// Fill the buffer as far as the reader allows, returns (eof, bytes read)
pub fn fill_buf<R: Read>(data: &mut R, buf: &mut [u8]) -> std::io::Result<(bool, usize)> {
    let mut buf_read = 0;

    while buf_read < buf.len() {
        match data.read(&mut buf[buf_read..]) {
            Ok(0) => return Ok((true, buf_read)),
            Ok(x) => buf_read += x,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
    }
    Ok((false, buf_read))
}

// Copy at most `limit` bytes from reader to writer one frame at a time
pub fn copy_frames<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    limit: u64,
) -> std::io::Result<u64> {
    let mut in_buf = vec![0u8; FRAME_SIZE];
    let mut copied: u64 = 0;

    while copied < limit {
        let want = std::cmp::min(FRAME_SIZE as u64, limit - copied) as usize;

        match fill_buf(reader, &mut in_buf[..want])? {
            (true, 0) => break,
            (eof, len) => {
                writer.write_all(&in_buf[..len])?;
                copied += len as u64;

                if eof {
                    break;
                }
            }
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod test_fill_buf {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn big_buf_small_vec() {
        let mut in_buf: Cursor<Vec<u8>> = Cursor::new(vec![1, 2]);
        let mut buf: [u8; 4] = [0; 4];

        assert_eq!(fill_buf(&mut in_buf, &mut buf).unwrap(), (true, 2));
        assert_eq!(&buf, &[1, 2, 0, 0]);
    }

    #[test]
    fn small_buf_big_vec() {
        let mut in_buf: Cursor<Vec<u8>> = Cursor::new(vec![1, 2, 3, 4]);
        let mut buf: [u8; 2] = [0; 2];

        assert_eq!(fill_buf(&mut in_buf, &mut buf).unwrap(), (false, 2));
        assert_eq!(&buf, &[1, 2]);
    }

    #[test]
    fn same_buf_same_vec() {
        let mut in_buf: Cursor<Vec<u8>> = Cursor::new(vec![1, 2, 3, 4]);
        let mut buf: [u8; 4] = [0; 4];

        assert_eq!(fill_buf(&mut in_buf, &mut buf).unwrap(), (false, 4));
        assert_eq!(&buf, &[1, 2, 3, 4]);
    }
}
