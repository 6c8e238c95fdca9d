use std::io::{Cursor, Read};

use flate2::read::GzDecoder;

use crate::error::UpdateError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Issue a GET and hand back the response body as a blocking byte stream.
///
/// Any non-success status is an error carrying the URL and status; redirects
/// and connection handling stay with the client. The response is dropped
/// (and its connection released) whenever the caller's read stops, including
/// on error paths downstream.
pub(crate) fn fetch(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<reqwest::blocking::Response, UpdateError> {
    let response = client
        .get(url)
        .send()
        .map_err(|error| UpdateError::request(url, error))?;

    if !response.status().is_success() {
        return Err(UpdateError::transport(url, response.status()));
    }

    Ok(response)
}

/// Wrap a payload stream in incremental gzip decompression.
///
/// The two magic bytes are checked up front, so a misconfigured endpoint
/// serving raw bytes fails cleanly instead of being staged. Decompression
/// itself happens as the returned reader is drained; the payload is never
/// buffered whole.
pub(crate) fn gzip_reader<R: Read>(mut stream: R) -> Result<impl Read, UpdateError> {
    let mut magic = [0_u8; 2];
    stream
        .read_exact(&mut magic)
        .map_err(|error| UpdateError::decompression(format!("failed to read header: {error}")))?;

    if magic != GZIP_MAGIC {
        return Err(UpdateError::decompression("missing gzip magic header"));
    }

    Ok(GzDecoder::new(Cursor::new(magic).chain(stream)))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::gzip_reader;
    use crate::error::UpdateError;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).expect("gzip write should succeed");
        encoder.finish().expect("gzip finish should succeed")
    }

    #[test]
    fn gzip_payload_round_trips() {
        let compressed = gzip(b"executable bytes");

        let mut reader =
            gzip_reader(compressed.as_slice()).expect("gzip stream should be accepted");
        let mut decompressed = Vec::new();
        reader
            .read_to_end(&mut decompressed)
            .expect("decompression should succeed");

        assert_eq!(decompressed, b"executable bytes");
    }

    #[test]
    fn raw_payload_is_rejected_before_decompression() {
        let result = gzip_reader(&b"ELF or PE bytes, not gzip"[..]);
        assert!(matches!(result, Err(UpdateError::Decompression { .. })));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let result = gzip_reader(&b""[..]);
        assert!(matches!(result, Err(UpdateError::Decompression { .. })));
    }
}
