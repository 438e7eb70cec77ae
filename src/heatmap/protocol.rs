//! Fixed-size header and status codec
//!
//! Wire layout:
//! - header: `<name><SEPARATOR><value>` UTF-8, right-padded with spaces to [`HEADER_SIZE`] bytes
//! - status reply: two-digit code, one separator character, message; padded the same way
//! - payloads: raw bytes, length announced by a preceding header

use crate::error::RankingError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of every header and status block
pub const HEADER_SIZE: usize = 1024;

/// Token between the two header fields (spelled as the servers expect it)
pub const SEPARATOR: &str = "<SEPERATOR>";

/// Read/write granularity for payload streaming
pub const CHUNK_SIZE: usize = 4096;

/// Status code signalling success
pub const STATUS_OK: &str = "00";

fn protocol_error(message: impl Into<String>) -> anyhow::Error {
    RankingError::Protocol {
        message: message.into(),
    }
    .into()
}

/// Pad `text` with spaces to a full block
fn pad_block(text: &str) -> crate::error::Result<Vec<u8>> {
    let bytes = text.as_bytes();
    if bytes.len() > HEADER_SIZE {
        return Err(protocol_error(format!(
            "block of {} bytes exceeds {} byte limit",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let mut block = vec![b' '; HEADER_SIZE];
    block[..bytes.len()].copy_from_slice(bytes);
    Ok(block)
}

fn unpad_block(block: &[u8]) -> crate::error::Result<&str> {
    std::str::from_utf8(block)
        .map(|text| text.trim_matches(|c: char| c.is_whitespace() || c == '\0'))
        .map_err(|e| protocol_error(format!("block is not valid UTF-8: {}", e)))
}

/// Two-field header preceding a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub name: String,
    pub value: String,
}

impl FrameHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Header announcing a payload of `size` bytes
    pub fn for_file(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, size.to_string())
    }

    /// Encode into a padded block
    pub fn encode(&self) -> crate::error::Result<Vec<u8>> {
        if self.name.contains(SEPARATOR) || self.value.contains(SEPARATOR) {
            return Err(protocol_error("header fields must not contain the separator"));
        }
        pad_block(&format!("{}{}{}", self.name, SEPARATOR, self.value))
    }

    /// Decode a padded block
    pub fn decode(block: &[u8]) -> crate::error::Result<Self> {
        let text = unpad_block(block)?;
        let mut fields = text.split(SEPARATOR);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(name), Some(value), None) => Ok(Self::new(name, value)),
            _ => Err(protocol_error(format!("malformed header '{}'", text))),
        }
    }

    /// Interpret the value field as a payload size
    pub fn size(&self) -> crate::error::Result<u64> {
        self.value
            .trim()
            .parse()
            .map_err(|_| protocol_error(format!("invalid payload size '{}'", self.value)))
    }
}

/// Status reply sent by the generator before any payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    pub code: String,
    pub message: String,
}

impl StatusReply {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: STATUS_OK.to_string(),
            message: message.into(),
        }
    }

    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == STATUS_OK
    }

    pub fn encode(&self) -> crate::error::Result<Vec<u8>> {
        if self.code.len() != 2 || !self.code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(protocol_error(format!("invalid status code '{}'", self.code)));
        }
        pad_block(&format!("{} {}", self.code, self.message))
    }

    pub fn decode(block: &[u8]) -> crate::error::Result<Self> {
        let text = unpad_block(block)?;
        let code = text
            .get(..2)
            .filter(|code| code.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| protocol_error(format!("malformed status reply '{}'", text)))?;
        let message = text.get(3..).unwrap_or("").trim();

        Ok(Self {
            code: code.to_string(),
            message: message.to_string(),
        })
    }
}

/// Read exactly one block
pub async fn read_block<R>(reader: &mut R) -> crate::error::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut block = vec![0u8; HEADER_SIZE];
    reader
        .read_exact(&mut block)
        .await
        .map_err(|e| protocol_error(format!("failed to read {} byte block: {}", HEADER_SIZE, e)))?;
    Ok(block)
}

/// Write a header block
pub async fn write_header<W>(writer: &mut W, header: &FrameHeader) -> crate::error::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&header.encode()?).await?;
    Ok(())
}

/// Stream `payload` in [`CHUNK_SIZE`] pieces
pub async fn write_payload<W>(writer: &mut W, payload: &[u8]) -> crate::error::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for chunk in payload.chunks(CHUNK_SIZE) {
        writer.write_all(chunk).await?;
    }
    writer.flush().await?;
    Ok(())
}

/// Read exactly `size` payload bytes
pub async fn read_payload<R>(reader: &mut R, size: u64) -> crate::error::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut payload = Vec::new();
    reader.take(size).read_to_end(&mut payload).await?;

    if payload.len() as u64 != size {
        return Err(protocol_error(format!(
            "connection closed after {} of {} payload bytes",
            payload.len(),
            size
        )));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encoding() {
        let block = FrameHeader::for_file("league.csv", 42).encode().unwrap();
        assert_eq!(block.len(), HEADER_SIZE);
        assert!(block.starts_with(b"league.csv<SEPERATOR>42 "));
        assert!(block[30..].iter().all(|&b| b == b' '));

        let decoded = FrameHeader::decode(&block).unwrap();
        assert_eq!(decoded.name, "league.csv");
        assert_eq!(decoded.size().unwrap(), 42);
    }

    #[test]
    fn test_header_rejections() {
        let long_name = "x".repeat(HEADER_SIZE);
        assert!(FrameHeader::for_file(long_name, 1).encode().is_err());
        assert!(FrameHeader::new("a<SEPERATOR>b", "1").encode().is_err());
        assert!(FrameHeader::decode(&pad_block("no separator").unwrap()).is_err());
        assert!(FrameHeader::new("a", "ten").size().is_err());
    }

    #[test]
    fn test_header_with_empty_value() {
        let header = FrameHeader::decode(&pad_block("data.csv<SEPERATOR>").unwrap()).unwrap();
        assert_eq!(header, FrameHeader::new("data.csv", ""));
    }

    #[test]
    fn test_status_reply() {
        let ok = StatusReply::decode(&StatusReply::success("ready").encode().unwrap()).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.message, "ready");

        let failed =
            StatusReply::decode(&pad_block("01 File not found").unwrap()).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.code, "01");
        assert_eq!(failed.message, "File not found");

        assert!(StatusReply::decode(&pad_block("ok").unwrap()).is_err());
        assert!(StatusReply::failure("1", "bad").encode().is_err());
    }

    #[tokio::test]
    async fn test_read_payload_exact() {
        let data = vec![7u8; CHUNK_SIZE + 10];
        let mut reader = &data[..];
        let payload = read_payload(&mut reader, data.len() as u64).await.unwrap();
        assert_eq!(payload, data);
    }

    #[tokio::test]
    async fn test_read_payload_short() {
        let data = vec![1u8; 5];
        let mut reader = &data[..];
        let err = read_payload(&mut reader, 8).await.unwrap_err();
        assert!(err.to_string().contains("5 of 8"));
    }

    #[tokio::test]
    async fn test_write_payload_and_header() {
        let mut out: Vec<u8> = Vec::new();
        write_header(&mut out, &FrameHeader::for_file("f.csv", 3))
            .await
            .unwrap();
        write_payload(&mut out, b"a,b").await.unwrap();

        assert_eq!(out.len(), HEADER_SIZE + 3);
        assert_eq!(&out[HEADER_SIZE..], b"a,b");
    }
}
