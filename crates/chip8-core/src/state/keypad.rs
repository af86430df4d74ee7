/// Number of virtual keys.
pub const KEY_COUNT: u8 = 16;

/// Virtual key code in `0x0..=0xF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Key(u8);

impl Key {
    /// Validates a key code.
    #[must_use]
    pub const fn new(code: u8) -> Option<Self> {
        if code < KEY_COUNT {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Key code in `0x0..=0xF`.
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }
}

/// Single most-recently-pressed key latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct KeyLatch {
    latched: Option<Key>,
}

impl KeyLatch {
    /// Overwrites the latch with `key`.
    pub const fn set(&mut self, key: Key) {
        self.latched = Some(key);
    }

    /// Empties the latch.
    pub const fn clear(&mut self) {
        self.latched = None;
    }

    /// Reads the latch without consuming it.
    #[must_use]
    pub const fn peek(self) -> Option<Key> {
        self.latched
    }

    /// Reads and clears the latch.
    pub fn take(&mut self) -> Option<Key> {
        self.latched.take()
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, KeyLatch};

    #[test]
    fn key_codes_are_limited_to_sixteen() {
        assert_eq!(Key::new(0xF).map(Key::code), Some(0xF));
        assert!(Key::new(0x10).is_none());
    }

    #[test]
    fn latch_keeps_most_recent_key() {
        let mut latch = KeyLatch::default();
        latch.set(Key::new(1).expect("valid key"));
        latch.set(Key::new(9).expect("valid key"));
        assert_eq!(latch.peek(), Key::new(9));
    }

    #[test]
    fn take_consumes_and_peek_does_not() {
        let mut latch = KeyLatch::default();
        latch.set(Key::new(4).expect("valid key"));
        assert_eq!(latch.peek(), Key::new(4));
        assert_eq!(latch.take(), Key::new(4));
        assert_eq!(latch.take(), None);
    }
}
