use anyhow::{anyhow, Result};
use bytes::Bytes;
use flate2::read::{DeflateDecoder, GzDecoder};
use std::io::Read;
use std::str::FromStr;

/// Value sent in `Accept-Encoding` so the server may compress ticket pages.
pub const ACCEPT_ENCODINGS: &str = "gzip, deflate, zstd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
    Zstd,
}

impl FromStr for ContentEncoding {
    type Err = std::convert::Infallible;

    // Only the first coding of a list is honoured. Unknown codings fall back to
    // identity and the UTF-8 check catches anything that was really compressed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let first = s.split(',').next().unwrap_or_default().trim();
        let encoding = match first.to_ascii_lowercase().as_str() {
            "gzip" | "x-gzip" => ContentEncoding::Gzip,
            "deflate" => ContentEncoding::Deflate,
            "zstd" => ContentEncoding::Zstd,
            _ => ContentEncoding::Identity,
        };
        Ok(encoding)
    }
}

impl ContentEncoding {
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(ContentEncoding::Identity)
    }

    pub fn decompress(self, data: &[u8]) -> Result<Bytes> {
        let decoded = match self {
            ContentEncoding::Identity => return Ok(Bytes::copy_from_slice(data)),
            ContentEncoding::Gzip => read_all(GzDecoder::new(data))?,
            ContentEncoding::Deflate => read_all(DeflateDecoder::new(data))?,
            ContentEncoding::Zstd => zstd::decode_all(data)?,
        };
        Ok(Bytes::from(decoded))
    }
}

fn read_all(mut reader: impl Read) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Decompresses a response body and returns it as text.
pub fn decode_body(data: &[u8], content_encoding: Option<&str>) -> Result<String> {
    let encoding = ContentEncoding::from_header(content_encoding);
    let bytes = encoding.decompress(data)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| anyhow!("response body is not valid UTF-8 ({encoding:?}): {e}"))
}
