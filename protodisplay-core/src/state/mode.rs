//! Render mode

/// What the controller draws each cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderMode {
    /// Face-tracking readout
    Expression,
    /// Frame sequence from the SD card
    #[default]
    Video,
    /// Mode value with no renderer; stored as received
    Unsupported(u8),
}

impl RenderMode {
    /// Map a mode-switch value (0 = expression, 1 = video)
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => RenderMode::Expression,
            1 => RenderMode::Video,
            other => RenderMode::Unsupported(other),
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            RenderMode::Expression => 0,
            RenderMode::Video => 1,
            RenderMode::Unsupported(raw) => raw,
        }
    }

    /// Whether this mode has a render step
    pub fn is_active(self) -> bool {
        !matches!(self, RenderMode::Unsupported(_))
    }

    /// Whether sensor packets are shown in this mode
    pub fn shows_packets(self) -> bool {
        matches!(self, RenderMode::Expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_video() {
        assert_eq!(RenderMode::default(), RenderMode::Video);
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(RenderMode::from_raw(0), RenderMode::Expression);
        assert_eq!(RenderMode::from_raw(1), RenderMode::Video);
        assert_eq!(RenderMode::from_raw(7), RenderMode::Unsupported(7));
        assert!(!RenderMode::from_raw(7).is_active());
        assert!(RenderMode::Expression.shows_packets());
        assert!(!RenderMode::Video.shows_packets());
    }

    proptest! {
        #[test]
        fn prop_raw_value_preserved(raw in any::<u8>()) {
            prop_assert_eq!(RenderMode::from_raw(raw).as_raw(), raw);
        }
    }
}
