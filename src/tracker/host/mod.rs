//! Native messaging framing. The browser talks to the host over stdin/stdout, every message is
//! a 32-bit length in native byte order followed by that many bytes of UTF-8 JSON.

pub mod messages;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest message accepted from the browser. Events are tiny, anything bigger means the stream
/// is out of sync.
pub const MAX_MESSAGE_BYTES: u32 = 1024 * 1024;

/// Reads the next message body. Returns [None] once the browser closed the stream.
pub async fn read_frame(reader: &mut (impl AsyncRead + Unpin)) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let read = reader
            .read(&mut header[filled..])
            .await
            .context("Failed to read message header")?;
        match (read, filled) {
            (0, 0) => return Ok(None),
            (0, _) => bail!("Stream ended after {filled} bytes of a message header"),
            _ => filled += read,
        }
    }

    let length = u32::from_ne_bytes(header);
    if length > MAX_MESSAGE_BYTES {
        bail!("Message of {length} bytes exceeds the {MAX_MESSAGE_BYTES} bytes limit");
    }

    let mut body = vec![0; length as usize];
    reader
        .read_exact(&mut body)
        .await
        .with_context(|| format!("Message of {length} bytes was cut short"))?;
    Ok(Some(body))
}

pub async fn write_frame(
    writer: &mut (impl AsyncWrite + Unpin),
    message: &impl Serialize,
) -> Result<()> {
    let body = serde_json::to_vec(message)?;
    let length = u32::try_from(body.len()).context("Message is too large to frame")?;
    writer.write_all(&length.to_ne_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
pub fn encode_frame(message: &serde_json::Value) -> Vec<u8> {
    let body = serde_json::to_vec(message).unwrap();
    let mut frame = (body.len() as u32).to_ne_bytes().to_vec();
    frame.extend(body);
    frame
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use super::{encode_frame, read_frame, write_frame, MAX_MESSAGE_BYTES};

    #[tokio::test]
    async fn test_frames_in_sequence() -> Result<()> {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &json!({ "type": "togglePause" })).await?;
        write_frame(&mut buffer, &json!({ "isPaused": true })).await?;

        let mut reader = buffer.as_slice();
        let first = read_frame(&mut reader).await?.unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&first)?,
            json!({ "type": "togglePause" })
        );
        let second = read_frame(&mut reader).await?.unwrap();
        assert_eq!(&second[..], br#"{"isPaused":true}"#);
        assert_eq!(read_frame(&mut reader).await?, None);
        Ok(())
    }

    #[test]
    fn test_header_layout() {
        let frame = encode_frame(&json!({}));
        assert_eq!(frame.len(), 6);
        assert_eq!(&frame[..4], &2u32.to_ne_bytes());
    }

    #[tokio::test]
    async fn test_oversized_frame() {
        let header = (MAX_MESSAGE_BYTES + 1).to_ne_bytes();
        let mut reader = &header[..];
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn test_truncated_header() {
        let header = 2u32.to_ne_bytes();
        let mut reader = &header[..3];
        assert!(read_frame(&mut reader).await.is_err());

        let mut empty: &[u8] = &[];
        assert!(read_frame(&mut empty).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_truncated_frame() {
        let mut frame = encode_frame(&json!({ "type": "getPopupData" }));
        frame.truncate(frame.len() - 3);
        let mut reader = frame.as_slice();
        assert!(read_frame(&mut reader).await.is_err());
    }
}
