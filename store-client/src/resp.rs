//! RESP2 wire frames.
//!
//! The store speaks a line-oriented protocol: every frame starts with a
//! one-byte type marker and ends with CRLF, with bulk payloads carrying an
//! explicit byte length. Reads return `Ok(None)` on a clean end-of-stream so
//! callers can tell an orderly disconnect from a truncated frame.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, StoreError};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// A single protocol frame, client-to-store or store-to-client.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `+OK\r\n`
    Simple(String),
    /// `-ERR ...\r\n`
    Error(String),
    /// `:42\r\n`
    Integer(i64),
    /// `$5\r\nhello\r\n`, with `$-1\r\n` as the null bulk (missing key).
    Bulk(Option<String>),
    /// `*2\r\n...`, with `*-1\r\n` as the null array.
    Array(Option<Vec<Frame>>),
}

/// Read one frame, or `None` if the stream ended before a new frame started.
///
/// End-of-stream in the middle of a frame is a [`StoreError::Protocol`]
/// error: the peer went away owing us bytes.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let line = line.trim_end_matches(LINE_ENDINGS);
    let Some(marker) = line.as_bytes().first().copied() else {
        return Err(StoreError::Protocol("empty frame line".to_string()));
    };
    let rest = &line[1..];

    match marker {
        b'+' => Ok(Some(Frame::Simple(rest.to_string()))),
        b'-' => Ok(Some(Frame::Error(rest.to_string()))),
        b':' => Ok(Some(Frame::Integer(parse_length(rest)?))),
        b'$' => {
            let len = parse_length(rest)?;
            if len < 0 {
                return Ok(Some(Frame::Bulk(None)));
            }
            // Payload plus the trailing CRLF.
            let mut payload = vec![0u8; len as usize + 2];
            reader.read_exact(&mut payload).await?;
            payload.truncate(len as usize);
            let text = String::from_utf8(payload)
                .map_err(|_| StoreError::Protocol("bulk payload is not UTF-8".to_string()))?;
            Ok(Some(Frame::Bulk(Some(text))))
        }
        b'*' => {
            let len = parse_length(rest)?;
            if len < 0 {
                return Ok(Some(Frame::Array(None)));
            }
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                match Box::pin(read_frame(reader)).await? {
                    Some(item) => items.push(item),
                    None => {
                        return Err(StoreError::Protocol(
                            "stream ended inside an array frame".to_string(),
                        ))
                    }
                }
            }
            Ok(Some(Frame::Array(Some(items))))
        }
        other => Err(StoreError::Protocol(format!(
            "unknown frame marker: 0x{other:02x}"
        ))),
    }
}

/// Append the wire encoding of `frame` to `buf`.
///
/// Encoding is separate from writing so a pipeline can pack many frames into
/// one buffer and pay for a single flush.
pub fn encode_frame(frame: &Frame, buf: &mut Vec<u8>) {
    match frame {
        Frame::Simple(text) => {
            buf.push(b'+');
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        Frame::Error(text) => {
            buf.push(b'-');
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        Frame::Integer(value) => {
            buf.extend_from_slice(format!(":{value}\r\n").as_bytes());
        }
        Frame::Bulk(None) => buf.extend_from_slice(b"$-1\r\n"),
        Frame::Bulk(Some(text)) => {
            buf.extend_from_slice(format!("${}\r\n", text.len()).as_bytes());
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        Frame::Array(None) => buf.extend_from_slice(b"*-1\r\n"),
        Frame::Array(Some(items)) => {
            buf.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
            for item in items {
                encode_frame(item, buf);
            }
        }
    }
}

/// Encode and write one frame, flushing so the peer sees it promptly.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut buf = Vec::new();
    encode_frame(frame, &mut buf);
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

fn parse_length(text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| StoreError::Protocol(format!("invalid length field: {text:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn roundtrip(frame: Frame) -> Frame {
        let (mut writer, reader) = tokio::io::duplex(1024);
        let mut reader = BufReader::new(reader);
        write_frame(&mut writer, &frame).await.expect("write frame");
        read_frame(&mut reader)
            .await
            .expect("read frame")
            .expect("expected a frame")
    }

    #[tokio::test]
    async fn roundtrips_scalar_frames() {
        for frame in [
            Frame::Simple("OK".into()),
            Frame::Error("ERR boom".into()),
            Frame::Integer(-7),
            Frame::Bulk(Some("hello world".into())),
            Frame::Bulk(None),
        ] {
            assert_eq!(roundtrip(frame.clone()).await, frame);
        }
    }

    #[tokio::test]
    async fn roundtrips_nested_array() {
        let frame = Frame::Array(Some(vec![
            Frame::Bulk(Some("message".into())),
            Frame::Bulk(Some("channel-1".into())),
            Frame::Array(Some(vec![Frame::Integer(1)])),
        ]));
        assert_eq!(roundtrip(frame.clone()).await, frame);
    }

    #[tokio::test]
    async fn bulk_payload_may_contain_crlf() {
        let frame = Frame::Bulk(Some("line one\r\nline two".into()));
        assert_eq!(roundtrip(frame.clone()).await, frame);
    }

    #[tokio::test]
    async fn clean_eof_reads_as_none() {
        let (writer, reader) = tokio::io::duplex(64);
        drop(writer);
        let mut reader = BufReader::new(reader);
        assert_eq!(read_frame(&mut reader).await.expect("clean eof"), None);
    }

    #[tokio::test]
    async fn truncated_array_is_a_protocol_error() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let mut reader = BufReader::new(reader);
        writer.write_all(b"*2\r\n:1\r\n").await.expect("write");
        drop(writer);
        let err = read_frame(&mut reader).await.expect_err("truncated frame");
        assert!(matches!(err, StoreError::Protocol(_)));
    }
}
