//! Sensor link packet validator
//!
//! The tracker sends bare 7-byte packets with no framing, so the buffered
//! byte count decides what happens:
//!
//! - fewer than 7: the packet is still arriving, leave it
//! - exactly 7: read and check the guard bytes
//! - more than 7: framing is lost, drop everything and resynchronize on the
//!   next packet

use protodisplay_hal::SerialRx;
use protodisplay_protocol::{ExpressionPacket, LinkFill, PacketError, PACKET_LEN};

/// Result of polling the sensor link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketOutcome {
    /// Not enough bytes buffered yet
    Pending { buffered: usize },
    /// A valid packet
    Accepted(ExpressionPacket),
    /// Seven bytes read but the guards were wrong
    Dropped(PacketError),
    /// Link had more than one packet buffered and was emptied
    Flushed { discarded: usize },
}

impl PacketOutcome {
    pub fn packet(&self) -> Option<&ExpressionPacket> {
        match self {
            PacketOutcome::Accepted(packet) => Some(packet),
            _ => None,
        }
    }
}

/// Poll the sensor link for one packet
pub fn poll_packet<R: SerialRx>(link: &mut R) -> PacketOutcome {
    let buffered = link.available();
    match LinkFill::from_available(buffered) {
        LinkFill::Partial => PacketOutcome::Pending { buffered },
        LinkFill::Overrun => PacketOutcome::Flushed {
            discarded: link.discard_all(),
        },
        LinkFill::Ready => {
            let mut bytes = [0u8; PACKET_LEN];
            let read = link.read_into(&mut bytes);
            if read != PACKET_LEN {
                return PacketOutcome::Flushed { discarded: read };
            }
            match ExpressionPacket::from_bytes(&bytes) {
                Ok(packet) => PacketOutcome::Accepted(packet),
                Err(e) => PacketOutcome::Dropped(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemLink;
    use proptest::prelude::*;

    #[test]
    fn test_exact_packet_accepted() {
        let mut link = MemLink::new();
        link.push(&[0, 90, 12, 40, 41, 61, 0]);

        let outcome = poll_packet(&mut link);
        let packet = outcome.packet().unwrap();
        assert_eq!(packet.mouth_width, 90);
        assert_eq!(packet.nose_offset, -3);
        assert_eq!(link.available(), 0);
    }

    #[test]
    fn test_partial_packet_left_buffered() {
        let mut link = MemLink::new();
        link.push(&[0, 90, 12]);
        assert_eq!(poll_packet(&mut link), PacketOutcome::Pending { buffered: 3 });
        assert_eq!(link.available(), 3);

        link.push(&[40, 41, 61, 0]);
        assert!(poll_packet(&mut link).packet().is_some());
    }

    #[test]
    fn test_bad_guard_dropped() {
        let mut link = MemLink::new();
        link.push(&[1, 90, 12, 40, 41, 61, 0]);
        assert_eq!(
            poll_packet(&mut link),
            PacketOutcome::Dropped(PacketError::BadGuard { head: 1, tail: 0 })
        );
        assert_eq!(link.available(), 0);
    }

    #[test]
    fn test_overrun_flushes_link() {
        let mut link = MemLink::new();
        link.push(&[0, 90, 12, 40, 41, 61, 0, 0]);
        assert_eq!(poll_packet(&mut link), PacketOutcome::Flushed { discarded: 8 });
        assert_eq!(link.available(), 0);
    }

    proptest! {
        #[test]
        fn prop_wrong_length_never_yields_packet(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            prop_assume!(bytes.len() != PACKET_LEN);
            let mut link = MemLink::new();
            link.push(&bytes);
            let outcome = poll_packet(&mut link);
            prop_assert!(outcome.packet().is_none());
            if bytes.len() > PACKET_LEN {
                prop_assert_eq!(link.available(), 0);
            } else {
                prop_assert_eq!(link.available(), bytes.len());
            }
        }

        #[test]
        fn prop_guards_decide_acceptance(bytes in any::<[u8; PACKET_LEN]>()) {
            let mut link = MemLink::new();
            link.push(&bytes);
            let accepted = poll_packet(&mut link).packet().is_some();
            prop_assert_eq!(accepted, bytes[0] == 0 && bytes[PACKET_LEN - 1] == 0);
        }
    }
}
