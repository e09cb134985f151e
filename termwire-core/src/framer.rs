//! Frame encoding and decoding
//!
//! # Frame Structure
//!
//! ```text
//! ┌─────┬─────────────────────────────────────────────────────────┬─────┬───────────┐
//! │ STX │ group [FS] group [FS] ...   (group = sub [US] sub ...)  │ ETX │ trailer?  │
//! │ 0x02│                     text                                │ 0x03│ (ignored) │
//! └─────┴─────────────────────────────────────────────────────────┴─────┴───────────┘
//! ```
//!
//! This is the only module that splits or joins on delimiter bytes. Encoding is
//! purely structural; sub-fields are not checked for embedded delimiters.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{trace, warn};

use crate::{
    constants::{control_name, ETX, FS, STX, US},
    error::FrameError,
    schema::FieldPos,
};

/// Decoded frame: ordered field-groups, each an ordered list of sub-fields
///
/// # Examples
///
/// ```
/// use termwire_core::Frame;
///
/// let frame = Frame::new(vec![
///     vec!["A00".to_string()],
///     vec!["1.35".to_string()],
/// ]);
/// let encoded = frame.encode();
///
/// let decoded = Frame::decode(&encoded).unwrap();
/// assert_eq!(frame, decoded);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Frame {
    groups: Vec<Vec<String>>,
}

impl Frame {
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        Self { groups }
    }

    /// Decode a raw buffer; see [`decode`]
    pub fn decode(raw: &[u8]) -> Result<Self, FrameError> {
        decode(raw)
    }

    /// Encode to wire bytes; see [`encode`]
    pub fn encode(&self) -> Bytes {
        encode(&self.groups)
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Vec<String>> {
        self.groups
    }

    pub fn group(&self, index: usize) -> Option<&[String]> {
        self.groups.get(index).map(Vec::as_slice)
    }

    /// Sub-field at `pos`, if the frame is long enough to carry it
    pub fn field(&self, pos: FieldPos) -> Option<&str> {
        self.groups
            .get(pos.group)
            .and_then(|group| group.get(pos.sub))
            .map(String::as_str)
    }

    /// Number of field-groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("groups", &self.groups.len())
            .field("text", &self.to_string())
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.encode()))
    }
}

/// Encode ordered field-groups into a frame
///
/// Sub-fields are joined with US, groups with FS, and the result is wrapped in
/// STX ... ETX. No trailer is appended.
///
/// # Examples
///
/// ```
/// use termwire_core::framer;
///
/// let bytes = framer::encode(&[vec!["T04"], vec!["1000", "", "500"]]);
/// assert_eq!(&bytes[..], b"\x02T04\x1c1000\x1f\x1f500\x03");
/// ```
pub fn encode<G, S>(groups: &[G]) -> Bytes
where
    G: AsRef<[S]>,
    S: AsRef<str>,
{
    let text_len: usize = groups
        .iter()
        .map(|group| group.as_ref().iter().map(|s| s.as_ref().len() + 1).sum::<usize>())
        .sum();
    let mut buf = BytesMut::with_capacity(text_len + 2);

    buf.put_u8(STX);
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            buf.put_u8(FS);
        }
        for (j, sub) in group.as_ref().iter().enumerate() {
            if j > 0 {
                buf.put_u8(US);
            }
            buf.put_slice(sub.as_ref().as_bytes());
        }
    }
    buf.put_u8(ETX);

    trace!(groups = groups.len(), len = buf.len(), "Encoded frame");

    buf.freeze()
}

/// Decode a raw buffer into field-groups
///
/// # Errors
///
/// Returns an error if:
/// - Buffer is empty
/// - First byte is not STX
/// - No ETX follows
///
/// Bytes after the first ETX (LRC trailer, padding) are ignored. Sub-fields
/// that are not valid UTF-8 are decoded lossily (U+FFFD) and logged; the
/// exact bytes are still available to callers that kept the raw buffer.
pub fn decode(raw: &[u8]) -> Result<Frame, FrameError> {
    let Some(&first) = raw.first() else {
        return Err(FrameError::Empty);
    };

    if first != STX {
        return Err(FrameError::MissingStartMarker {
            raw: Bytes::copy_from_slice(raw),
        });
    }

    let end = frame_end(raw).ok_or_else(|| FrameError::MissingEndMarker {
        raw: Bytes::copy_from_slice(raw),
    })?;

    let text = &raw[1..end - 1];
    let groups: Vec<Vec<String>> = text
        .split(|&b| b == FS)
        .enumerate()
        .map(|(group, subs)| {
            subs.split(|&b| b == US)
                .enumerate()
                .map(|(index, sub)| decode_sub_field(sub, group, index))
                .collect()
        })
        .collect();

    trace!(
        groups = groups.len(),
        trailing = raw.len() - end,
        "Decoded frame"
    );

    Ok(Frame::new(groups))
}

fn decode_sub_field(bytes: &[u8], group: usize, index: usize) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!(group, index, bytes = %hex::encode(bytes), "Sub-field is not valid UTF-8");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Length of the frame at the start of `buf` (STX through ETX inclusive)
///
/// Returns `None` while the buffer does not yet hold a complete frame.
pub fn frame_end(buf: &[u8]) -> Option<usize> {
    if buf.first() != Some(&STX) {
        return None;
    }
    buf[1..].iter().position(|&b| b == ETX).map(|i| i + 2)
}

/// Render raw bytes with delimiters spelled out, e.g. `[STX]A00[FS]1.35[ETX]`
pub fn render(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    let mut start = 0;

    for (i, &b) in raw.iter().enumerate() {
        if let Some(name) = control_name(b) {
            out.push_str(&String::from_utf8_lossy(&raw[start..i]));
            out.push_str(name);
            start = i + 1;
        }
    }
    out.push_str(&String::from_utf8_lossy(&raw[start..]));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn groups(layout: &[&[&str]]) -> Vec<Vec<String>> {
        layout.iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_encode_structure() {
        let bytes = encode(&[vec!["T04"], vec!["1.35"], vec!["", "", "", "F"]]);

        assert_eq!(bytes[0], STX);
        assert_eq!(*bytes.last().unwrap(), ETX);
        assert_eq!(render(&bytes), "[STX]T04[FS]1.35[FS][US][US][US]F[ETX]");
    }

    #[test]
    fn test_encode_empty_groups_keep_position() {
        let bytes = encode(&[vec!["1"], vec![""], vec![""]]);
        assert_eq!(render(&bytes), "[STX]1[FS][FS][ETX]");
    }

    #[test]
    fn test_decode_fields() {
        let raw = b"\x02T05\x1c1.35\x1c000000\x1cOK\x1c00\x1fAPPROVAL\x03";
        let frame = decode(raw).unwrap();

        assert_eq!(
            frame.groups(),
            groups(&[&["T05"], &["1.35"], &["000000"], &["OK"], &["00", "APPROVAL"]]).as_slice()
        );
        assert_eq!(frame.field(FieldPos::new(4, 1)), Some("APPROVAL"));
        assert_eq!(frame.field(FieldPos::new(4, 2)), None);
        assert_eq!(frame.field(FieldPos::new(9, 0)), None);
    }

    #[test]
    fn test_decode_ignores_trailer() {
        let mut raw = encode(&[vec!["A01"], vec!["1.35"], vec!["000000"]]).to_vec();
        let clean = decode(&raw).unwrap();

        raw.push(0x5A); // LRC
        raw.extend_from_slice(&[0x00, 0x00]); // padding
        assert_eq!(decode(&raw).unwrap(), clean);
    }

    #[test]
    fn test_decode_missing_start() {
        let result = decode(b"T05\x1c1.35\x03");
        assert!(matches!(result, Err(FrameError::MissingStartMarker { .. })));
    }

    #[test]
    fn test_decode_missing_end() {
        let result = decode(b"\x02T05\x1c1.35\x1c0000");
        match result {
            Err(FrameError::MissingEndMarker { raw }) => assert_eq!(raw.len(), 14),
            other => panic!("Expected MissingEndMarker, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(&[]), Err(FrameError::Empty));
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let raw = b"\x02T05\x1c\xff0\x1fOK\x03";
        let frame = decode(raw).unwrap();

        assert_eq!(frame.field(FieldPos::new(0, 0)), Some("T05"));
        assert_eq!(frame.field(FieldPos::new(1, 0)), Some("\u{FFFD}0"));
        assert_eq!(frame.field(FieldPos::new(1, 1)), Some("OK"));
    }

    #[test]
    fn test_frame_end() {
        assert_eq!(frame_end(b"\x02AB\x03\x41"), Some(4));
        assert_eq!(frame_end(b"\x02AB"), None);
        assert_eq!(frame_end(b"AB\x03"), None);
        assert_eq!(frame_end(b"\x02\x03"), Some(2));
    }

    #[test]
    fn test_frame_display() {
        let frame = Frame::new(groups(&[&["A14"], &["1.35"]]));
        assert_eq!(frame.to_string(), "[STX]A14[FS]1.35[ETX]");
        assert_eq!(frame.len(), 2);
    }

    fn sub_field() -> impl Strategy<Value = String> {
        "[ -~]{0,12}"
    }

    fn field_groups() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(prop::collection::vec(sub_field(), 1..7), 1..10)
    }

    proptest! {
        #[test]
        fn prop_round_trip(groups in field_groups()) {
            let encoded = encode(&groups);
            prop_assert_eq!(encoded[0], STX);
            prop_assert_eq!(encoded[encoded.len() - 1], ETX);

            let decoded = decode(&encoded).unwrap();
            prop_assert_eq!(decoded.into_groups(), groups);
        }

        #[test]
        fn prop_decode_idempotent(groups in field_groups(), trailer in prop::collection::vec(any::<u8>(), 0..4)) {
            let mut raw = encode(&groups).to_vec();
            raw.extend_from_slice(&trailer);

            prop_assert_eq!(decode(&raw).unwrap(), decode(&raw).unwrap());
        }

        #[test]
        fn prop_decode_never_panics(raw in prop::collection::vec(any::<u8>(), 0..64)) {
            let _ = decode(&raw);
        }
    }
}
