//! Response decoding
//!
//! Splits a raw response with the framer, then reads the response code and
//! text at the fixed offsets of the given [`ResponseKind`] and resolves the
//! code through the status registry.

use std::fmt;

use bytes::Bytes;
use tracing::debug;

use crate::{
    checksum,
    error::FrameError,
    framer::{self, Frame},
    registry::{self, Status},
    schema::ResponseKind,
};

/// Decoded response
#[derive(Clone, PartialEq, Eq)]
pub struct ResponseMessage {
    pub kind: ResponseKind,

    /// Buffer exactly as received, trailer included
    pub raw: Bytes,

    pub frame: Frame,

    /// Code at the kind's code position; empty if the sub-field is absent
    pub response_code: String,

    pub status: Status,

    /// Diagnostic text, filled whether or not the code was recognized
    pub response_text: String,
}

impl ResponseMessage {
    /// All decoded field-groups
    pub fn fields(&self) -> &[Vec<String>] {
        self.frame.groups()
    }

    pub fn field(&self, group: usize, sub: usize) -> Option<&str> {
        self.frame.field(crate::schema::FieldPos::new(group, sub))
    }

    /// Command code of the response (first field-group)
    pub fn command(&self) -> Option<&str> {
        self.field(0, 0)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check the LRC trailer, if the terminal sent one
    pub fn lrc_valid(&self) -> Option<bool> {
        let end = framer::frame_end(&self.raw)?;
        let received = *self.raw.get(end)?;
        Some(checksum::verify(&self.raw[..end], received))
    }
}

impl fmt::Debug for ResponseMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseMessage")
            .field("kind", &self.kind)
            .field("command", &self.command())
            .field("response_code", &self.response_code)
            .field("status", &self.status)
            .field("response_text", &self.response_text)
            .field("raw_len", &self.raw.len())
            .finish()
    }
}

impl fmt::Display for ResponseMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response[{}](code={:?}, status={}, text={:?})",
            self.kind, self.response_code, self.status, self.response_text
        )
    }
}

/// Decode a raw response buffer
///
/// # Errors
///
/// Returns a [`FrameError`] if the buffer is not a frame or has fewer
/// field-groups than `kind` requires. Unrecognized codes are not errors; they
/// resolve to [`Status::Unknown`].
///
/// # Examples
///
/// ```
/// use termwire_core::{decoder, framer, ResponseKind, Status};
///
/// let raw = framer::encode(&[vec!["A01"], vec!["1.35"], vec!["000000"], vec!["OK"]]);
/// let response = decoder::decode(&raw, ResponseKind::Admin).unwrap();
///
/// assert_eq!(response.response_code, "000000");
/// assert_eq!(response.status, Status::Success);
/// assert_eq!(response.response_text, "OK");
/// ```
pub fn decode(raw: &[u8], kind: ResponseKind) -> Result<ResponseMessage, FrameError> {
    let frame = framer::decode(raw)?;
    let schema = kind.schema();

    if frame.len() < schema.min_groups {
        return Err(FrameError::TooFewGroups {
            kind,
            expected: schema.min_groups,
            actual: frame.len(),
            raw: Bytes::copy_from_slice(raw),
        });
    }

    let response_code = frame.field(schema.code_at).unwrap_or_default().to_string();
    let status = registry::lookup(kind, &response_code);

    let response_text = schema
        .text_at
        .and_then(|pos| frame.field(pos))
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| payload_text(raw));

    debug!(
        kind = %kind,
        code = %response_code,
        status = %status,
        "Decoded response"
    );

    Ok(ResponseMessage {
        kind,
        raw: Bytes::copy_from_slice(raw),
        frame,
        response_code,
        status,
        response_text,
    })
}

/// Readable text between STX and ETX
fn payload_text(raw: &[u8]) -> String {
    match framer::frame_end(raw) {
        Some(end) => framer::render(&raw[1..end - 1]),
        None => framer::render(raw),
    }
}
