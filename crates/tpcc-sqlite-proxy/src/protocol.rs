//! Wire messages and length-prefixed framing.

use crate::error::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};
use tpcc_types::{Row, SqlValue};

/// Largest accepted frame body.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// A client request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "lowercase")]
pub enum Request {
    Execute {
        statement: String,
        #[serde(default)]
        statement_args: Vec<SqlValue>,
    },
    Commit {},
    Rollback {},
}

/// The server's answer to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            rows: None,
            error: None,
        }
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            success: true,
            rows: Some(rows),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rows: None,
            error: Some(error.into()),
        }
    }
}

/// Serialize `message` and write it as one frame.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), ProtocolError> {
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge(body.len()));
    }
    let len = u32::try_from(body.len()).map_err(|_| ProtocolError::FrameTooLarge(body.len()))?;

    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&body);
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame body. Returns `None` on a clean end of stream.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(ProtocolError::UnexpectedEof),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge(len));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => ProtocolError::UnexpectedEof,
        _ => ProtocolError::Io(e),
    })?;
    Ok(Some(body))
}

/// Decode a frame body.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_request_json_shape() {
        let execute = Request::Execute {
            statement: "SELECT ?1".to_string(),
            statement_args: vec![SqlValue::Integer(1), SqlValue::Text("a".into())],
        };
        assert_eq!(
            serde_json::to_string(&execute).unwrap(),
            r#"{"command":"execute","args":{"statement":"SELECT ?1","statement_args":[1,"a"]}}"#
        );
        assert_eq!(
            serde_json::to_string(&Request::Commit {}).unwrap(),
            r#"{"command":"commit","args":{}}"#
        );
        assert_eq!(
            serde_json::to_string(&Request::Rollback {}).unwrap(),
            r#"{"command":"rollback","args":{}}"#
        );
    }

    #[test]
    fn test_response_json_shape() {
        assert_eq!(
            serde_json::to_string(&Response::ok()).unwrap(),
            r#"{"success":true}"#
        );
        assert_eq!(
            serde_json::to_string(&Response::with_rows(vec![vec![SqlValue::Null]])).unwrap(),
            r#"{"success":true,"rows":[[null]]}"#
        );
        assert_eq!(
            serde_json::to_string(&Response::failure("no such table: X")).unwrap(),
            r#"{"success":false,"error":"no such table: X"}"#
        );
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let result: Result<Request, _> = decode(br#"{"command":"vacuum","args":{}}"#);
        assert!(matches!(result, Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_frame_layout() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Response::ok()).unwrap();
        let body = br#"{"success":true}"#;
        assert_eq!(&buf[..4], &(body.len() as u32).to_be_bytes());
        assert_eq!(&buf[4..], body);
    }

    #[test]
    fn test_read_frames_until_eof() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Request::Commit {}).unwrap();
        write_frame(&mut buf, &Request::Rollback {}).unwrap();

        let mut cursor = Cursor::new(buf);
        let first: Request = decode(&read_frame(&mut cursor).unwrap().unwrap()).unwrap();
        let second: Request = decode(&read_frame(&mut cursor).unwrap().unwrap()).unwrap();
        assert_eq!(first, Request::Commit {});
        assert_eq!(second, Request::Rollback {});
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_truncated_frames() {
        let mut cursor = Cursor::new(vec![0u8, 0]);
        assert!(matches!(
            read_frame(&mut cursor),
            Err(ProtocolError::UnexpectedEof)
        ));

        let mut cursor = Cursor::new(vec![0u8, 0, 0, 10, b'{']);
        assert!(matches!(
            read_frame(&mut cursor),
            Err(ProtocolError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let len = (MAX_FRAME_LEN as u32 + 1).to_be_bytes();
        let mut cursor = Cursor::new(len.to_vec());
        assert!(matches!(
            read_frame(&mut cursor),
            Err(ProtocolError::FrameTooLarge(_))
        ));
    }
}
