//! Expression packets from the face tracker
//!
//! Packet format:
//! - GUARD (1 byte): must be 0x00
//! - MOUTH WIDTH (1 byte): width / max width × 128
//! - MOUTH HEIGHT (1 byte): height / max height × 128
//! - LEFT EYE (1 byte): eye aspect ratio × 128
//! - RIGHT EYE (1 byte): eye aspect ratio × 128
//! - NOSE (1 byte): offset-encoded, `raw - 64` gives the signed offset
//! - GUARD (1 byte): must be 0x00
//!
//! The tracker never emits zero inside the payload, so a zero at both ends
//! is the only integrity check the link has.

/// Packet length in bytes
pub const PACKET_LEN: usize = 7;

/// Bias added to the nose offset on the wire
pub const NOSE_OFFSET_BIAS: i16 = 64;

const HEAD_GUARD_INDEX: usize = 0;
const MOUTH_WIDTH_INDEX: usize = 1;
const MOUTH_HEIGHT_INDEX: usize = 2;
const LEFT_EYE_INDEX: usize = 3;
const RIGHT_EYE_INDEX: usize = 4;
const NOSE_INDEX: usize = 5;
const TAIL_GUARD_INDEX: usize = PACKET_LEN - 1;

/// Errors that can occur while decoding a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// A guard byte was not zero (bytes shifted or corrupted)
    BadGuard { head: u8, tail: u8 },
}

/// What the sensor link's buffered byte count says about the next packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkFill {
    /// Fewer than [`PACKET_LEN`] bytes; the rest is still in flight
    Partial,
    /// Exactly one packet is buffered
    Ready,
    /// More than one packet's worth; framing is lost
    Overrun,
}

impl LinkFill {
    /// Classify a buffered byte count
    pub fn from_available(available: usize) -> Self {
        match available {
            n if n < PACKET_LEN => LinkFill::Partial,
            PACKET_LEN => LinkFill::Ready,
            _ => LinkFill::Overrun,
        }
    }
}

/// Decode a wire nose byte into a signed offset
///
/// This is a bias encoding, not two's complement: `0x01` is −63, `0x40` is
/// 0 and `0x7F` is 63.
pub fn decode_nose_offset(raw: u8) -> i16 {
    raw as i16 - NOSE_OFFSET_BIAS
}

/// Encode a signed nose offset for the wire
///
/// Offsets outside −63..=63 are clamped.
pub fn encode_nose_offset(offset: i16) -> u8 {
    (offset.clamp(-63, 63) + NOSE_OFFSET_BIAS) as u8
}

/// A validated face-tracking sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExpressionPacket {
    /// Mouth width relative to its maximum, ×128
    pub mouth_width: u8,
    /// Mouth height relative to its maximum, ×128
    pub mouth_height: u8,
    /// Left eye aspect ratio ×128
    pub left_eye: u8,
    /// Right eye aspect ratio ×128
    pub right_eye: u8,
    /// Signed nose offset in −63..=63
    pub nose_offset: i16,
}

impl ExpressionPacket {
    /// Decode a packet, checking both guard bytes
    pub fn from_bytes(bytes: &[u8; PACKET_LEN]) -> Result<Self, PacketError> {
        let head = bytes[HEAD_GUARD_INDEX];
        let tail = bytes[TAIL_GUARD_INDEX];
        if head != 0 || tail != 0 {
            return Err(PacketError::BadGuard { head, tail });
        }

        Ok(Self {
            mouth_width: bytes[MOUTH_WIDTH_INDEX],
            mouth_height: bytes[MOUTH_HEIGHT_INDEX],
            left_eye: bytes[LEFT_EYE_INDEX],
            right_eye: bytes[RIGHT_EYE_INDEX],
            nose_offset: decode_nose_offset(bytes[NOSE_INDEX]),
        })
    }

    /// Encode this packet for the wire (for testing or simulation)
    pub fn to_bytes(&self) -> [u8; PACKET_LEN] {
        let mut bytes = [0u8; PACKET_LEN];
        bytes[MOUTH_WIDTH_INDEX] = self.mouth_width;
        bytes[MOUTH_HEIGHT_INDEX] = self.mouth_height;
        bytes[LEFT_EYE_INDEX] = self.left_eye;
        bytes[RIGHT_EYE_INDEX] = self.right_eye;
        bytes[NOSE_INDEX] = encode_nose_offset(self.nose_offset);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_fields() {
        let packet = ExpressionPacket::from_bytes(&[0, 90, 12, 40, 41, 70, 0]).unwrap();
        assert_eq!(packet.mouth_width, 90);
        assert_eq!(packet.mouth_height, 12);
        assert_eq!(packet.left_eye, 40);
        assert_eq!(packet.right_eye, 41);
        assert_eq!(packet.nose_offset, 6);
    }

    #[test]
    fn test_nose_offset_is_bias_encoded() {
        assert_eq!(decode_nose_offset(1), -63);
        assert_eq!(decode_nose_offset(64), 0);
        assert_eq!(decode_nose_offset(127), 63);
        // Not two's complement: 0x7F is +63, not -1
        assert_ne!(decode_nose_offset(0x7F), -1);
    }

    #[test]
    fn test_bad_head_guard() {
        let result = ExpressionPacket::from_bytes(&[5, 1, 1, 1, 1, 64, 0]);
        assert_eq!(result, Err(PacketError::BadGuard { head: 5, tail: 0 }));
    }

    #[test]
    fn test_bad_tail_guard() {
        let result = ExpressionPacket::from_bytes(&[0, 1, 1, 1, 1, 64, 9]);
        assert_eq!(result, Err(PacketError::BadGuard { head: 0, tail: 9 }));
    }

    #[test]
    fn test_link_fill() {
        assert_eq!(LinkFill::from_available(0), LinkFill::Partial);
        assert_eq!(LinkFill::from_available(6), LinkFill::Partial);
        assert_eq!(LinkFill::from_available(7), LinkFill::Ready);
        assert_eq!(LinkFill::from_available(8), LinkFill::Overrun);
        assert_eq!(LinkFill::from_available(14), LinkFill::Overrun);
    }

    proptest! {
        #[test]
        fn prop_zero_guards_always_accepted(payload in any::<[u8; 5]>()) {
            let mut bytes = [0u8; PACKET_LEN];
            bytes[1..6].copy_from_slice(&payload);
            prop_assert!(ExpressionPacket::from_bytes(&bytes).is_ok());
        }

        #[test]
        fn prop_nonzero_guard_always_rejected(
            head in any::<u8>(),
            tail in any::<u8>(),
            payload in any::<[u8; 5]>(),
        ) {
            prop_assume!(head != 0 || tail != 0);
            let mut bytes = [head, 0, 0, 0, 0, 0, tail];
            bytes[1..6].copy_from_slice(&payload);
            prop_assert_eq!(
                ExpressionPacket::from_bytes(&bytes),
                Err(PacketError::BadGuard { head, tail })
            );
        }

        #[test]
        fn prop_nose_offset_roundtrip(offset in -63i16..=63) {
            let raw = encode_nose_offset(offset);
            prop_assert!((1..=127).contains(&raw));
            prop_assert_eq!(decode_nose_offset(raw), offset);
        }

        #[test]
        fn prop_only_exact_length_is_ready(available in 0usize..64) {
            let fill = LinkFill::from_available(available);
            prop_assert_eq!(fill == LinkFill::Ready, available == PACKET_LEN);
        }
    }
}
