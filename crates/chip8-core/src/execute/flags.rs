//! `VF` update behaviors for different instruction classes.

/// Describes how `VF` should be updated after an instruction executes.
///
/// The flag is committed after the destination register, so when the
/// destination is `VF` itself the flag value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagUpdate {
    /// No change to `VF`.
    #[default]
    None,
    /// Write `1` when set, `0` otherwise.
    Set(bool),
}

impl FlagUpdate {
    /// Flag value to commit, if any.
    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::None => None,
            Self::Set(flag) => Some(flag),
        }
    }
}
