/// Rate at which the external driver is expected to call [`Timers::tick`].
pub const TIMER_FREQUENCY_HZ: u32 = 60;

/// Delay and sound countdown timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Timers {
    /// Delay timer, readable by programs.
    pub delay: u8,
    /// Sound timer; a tone plays while non-zero.
    pub sound: u8,
}

impl Timers {
    /// Decrements both timers by one, stopping at zero.
    pub const fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Returns `true` while the sound timer is running.
    #[must_use]
    pub const fn sound_active(self) -> bool {
        self.sound > 0
    }
}
