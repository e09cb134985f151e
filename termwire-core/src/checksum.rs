//! Longitudinal redundancy check
//!
//! Terminals append one LRC byte after ETX:
//! 1. Take every byte after STX, up to and including ETX
//! 2. XOR them together
//! 3. Send the result as the trailing byte

use tracing::trace;

use crate::constants::STX;

/// Calculate the LRC for an encoded frame
///
/// A leading STX is skipped; everything else, including ETX, is folded in.
///
/// # Examples
///
/// ```
/// use termwire_core::checksum;
///
/// let lrc = checksum::calculate(&[0x02, b'A', 0x03]);
/// assert_eq!(lrc, b'A' ^ 0x03);
/// ```
pub fn calculate(frame: &[u8]) -> u8 {
    let body = match frame.first() {
        Some(&STX) => &frame[1..],
        _ => frame,
    };

    let lrc = body.iter().fold(0u8, |acc, &b| acc ^ b);

    trace!(
        frame_len = frame.len(),
        lrc = format!("0x{:02X}", lrc),
        "Calculated LRC"
    );

    lrc
}

/// Verify a received LRC against the frame it trails
pub fn verify(frame: &[u8], received: u8) -> bool {
    calculate(frame) == received
}

/// Copy of `frame` with its LRC appended
pub fn seal(frame: &[u8]) -> Vec<u8> {
    let mut sealed = Vec::with_capacity(frame.len() + 1);
    sealed.extend_from_slice(frame);
    sealed.push(calculate(frame));
    sealed
}
