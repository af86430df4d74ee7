//! Public host-facing API contracts for embedding the execution core.
//!
//! The core owns no thread, clock, window or input device. Drivers hold a
//! [`CoreState`] exclusively and call the step entry point once per cycle;
//! collaborators read the framebuffer or a [`CoreSnapshot`] between steps.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::{
    install_font, new_address_space, ArchitecturalState, CallStack, Fault, Framebuffer, Key,
    KeyLatch, LoadError, Timers, MEMORY_BYTES, PROGRAM_CAPACITY_BYTES, PROGRAM_START,
    STACK_DEPTH,
};

/// Default seed for the deterministic random source.
pub const DEFAULT_RNG_SEED: u64 = 0x5EED;

/// How sprite pixels past the display edge are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SpriteWrap {
    /// Pixels past the right or bottom edge are dropped.
    #[default]
    Clip,
    /// Pixels past an edge reappear on the opposite side.
    Wrap,
}

/// Compatibility switches for behaviors that differ between interpreters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct Quirks {
    /// Edge handling for `DXYN`.
    pub sprite_wrap: SpriteWrap,
    /// `8XY1`/`8XY2`/`8XY3` clear `VF` after the operation.
    pub logic_resets_vf: bool,
    /// `8XY6`/`8XYE` shift `VY` into `VX` instead of shifting `VX` in place.
    pub shift_uses_vy: bool,
    /// `FX55`/`FX65` leave `I` pointing past the last transferred byte.
    pub load_store_advances_i: bool,
    /// `BNNN` adds `VX` (X from the top nibble of `NNN`) instead of `V0`.
    pub jump_uses_vx: bool,
}

/// Top-level immutable configuration for a core instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Compatibility switches.
    pub quirks: Quirks,
    /// Seed for the random source used by `CXNN`.
    pub rng_seed: u64,
    /// Enables trace callback dispatch.
    pub tracing_enabled: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            quirks: Quirks::default(),
            rng_seed: DEFAULT_RNG_SEED,
            tracing_enabled: false,
        }
    }
}

/// Source of random bytes consumed by `CXNN`.
pub trait RandomSource {
    /// Returns the next random byte.
    fn next_byte(&mut self) -> u8;
}

/// Deterministic seeded random source.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Creates a random source from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_byte(&mut self) -> u8 {
        self.rng.gen()
    }
}

/// Complete machine state mutated by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Register file, `I` and `PC`.
    pub arch: ArchitecturalState,
    /// Flat 4 KiB memory image.
    pub memory: Box<[u8]>,
    /// Return-address stack.
    pub stack: CallStack,
    /// Display pixels.
    pub framebuffer: Framebuffer,
    /// Delay and sound timers.
    pub timers: Timers,
    /// Most-recently-pressed key.
    pub keys: KeyLatch,
    /// Instructions retired since the last reset.
    pub retired: u64,
}

impl Default for CoreState {
    fn default() -> Self {
        let mut memory = new_address_space();
        install_font(&mut memory);
        Self {
            arch: ArchitecturalState::default(),
            memory,
            stack: CallStack::default(),
            framebuffer: Framebuffer::default(),
            timers: Timers::default(),
            keys: KeyLatch::default(),
            retired: 0,
        }
    }
}

impl CoreState {
    /// Restores power-on state: memory cleared with the font installed,
    /// `PC = 0x200`, registers, stack, timers, framebuffer and key latch zeroed.
    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::info!("machine reset");
    }

    /// Installs a program image at `0x200` after a full reset.
    ///
    /// Loading always starts from power-on state, so loading while a program
    /// is running discards it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ProgramTooLarge`] when `program` does not fit in
    /// the program region; state is left unchanged.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > PROGRAM_CAPACITY_BYTES {
            return Err(LoadError::ProgramTooLarge {
                len: program.len(),
                capacity: PROGRAM_CAPACITY_BYTES,
            });
        }

        self.reset();
        let start = usize::from(PROGRAM_START);
        self.memory[start..start + program.len()].copy_from_slice(program);
        tracing::info!(bytes = program.len(), "program loaded");
        Ok(())
    }

    /// Latches `key` as the most recently pressed key.
    pub const fn set_key(&mut self, key: Key) {
        self.keys.set(key);
    }

    /// Empties the key latch.
    pub const fn clear_key(&mut self) {
        self.keys.clear();
    }

    /// Advances the delay and sound timers by one tick.
    pub const fn tick_timers(&mut self) {
        self.timers.tick();
    }
}

/// Output status from one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired.
    Retired {
        /// Framebuffer changed and should be presented.
        redraw: bool,
    },
    /// `FX0A` found no latched key; `PC` is held on the instruction.
    AwaitingKey,
}

impl StepOutcome {
    /// Returns `true` when the framebuffer changed during this step.
    #[must_use]
    pub const fn redraw(self) -> bool {
        matches!(self, Self::Retired { redraw: true })
    }
}

/// Aggregated outcome from running a bounded batch of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of instructions retired during this batch.
    pub steps: u32,
    /// Whether any step in the batch changed the framebuffer.
    pub redraw: bool,
    /// Last step-level status observed before returning.
    pub final_step: StepOutcome,
    /// Fault that ended the batch early, if any.
    pub fault: Option<Fault>,
}

impl RunOutcome {
    /// Returns the batch outcome, or the fault that ended it.
    ///
    /// # Errors
    ///
    /// Returns the terminating [`Fault`]; `steps` and `redraw` are dropped,
    /// so drivers that repaint should inspect the fields directly.
    pub const fn into_result(self) -> Result<Self, Fault> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(self),
        }
    }
}

/// Trace events emitted at step boundaries when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Instruction fetched and about to execute.
    InstructionStart {
        /// Program counter used for this fetch.
        pc: u16,
        /// Raw instruction word.
        raw_word: u16,
    },
    /// Instruction completed.
    InstructionRetired {
        /// Program counter of the completed instruction.
        pc: u16,
        /// Step status.
        outcome: StepOutcome,
    },
    /// Step ended with a fault.
    FaultRaised {
        /// Raised fault.
        fault: Fault,
        /// Program counter active when the fault was observed.
        pc: u16,
    },
}

/// Sink trait for step-boundary trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts wire value to known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// Reasons an imported snapshot is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SnapshotError {
    /// Memory image is not exactly 4 KiB.
    #[error("memory image has {0} bytes")]
    MemoryLength(usize),
    /// Framebuffer is not display sized.
    #[error("framebuffer has {0} pixels")]
    FramebufferLength(usize),
    /// Stack pointer is past the stack depth.
    #[error("stack depth {0} exceeds capacity")]
    StackDepth(usize),
}

/// Serializable full-state snapshot used for import/export and hand-off to
/// collaborators that must not share the live state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Full machine state.
    pub state: CoreState,
}

impl CoreSnapshot {
    /// Captures a copy of `state`.
    #[must_use]
    pub fn from_core_state(version: SnapshotVersion, state: &CoreState) -> Self {
        Self {
            version,
            state: state.clone(),
        }
    }

    /// Validates the layout and returns the captured state.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] when memory, framebuffer or stack do not
    /// match the architecture.
    pub fn try_into_core_state(self) -> Result<CoreState, SnapshotError> {
        let state = self.state;
        if state.memory.len() != MEMORY_BYTES {
            return Err(SnapshotError::MemoryLength(state.memory.len()));
        }
        let pixels = state.framebuffer.as_slice().len();
        if Framebuffer::from_pixels(state.framebuffer.as_slice()).is_none() {
            return Err(SnapshotError::FramebufferLength(pixels));
        }
        if state.stack.depth() > STACK_DEPTH {
            return Err(SnapshotError::StackDepth(state.stack.depth()));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CoreConfig, CoreSnapshot, CoreState, RandomSource, RunOutcome, SeededRandom,
        SnapshotError, SnapshotVersion, SpriteWrap, StepOutcome, DEFAULT_RNG_SEED,
    };
    use crate::{Fault, Key, LoadError, Register, FONT_SET, PROGRAM_CAPACITY_BYTES, PROGRAM_START};

    #[test]
    fn default_core_config_is_conservative() {
        let config = CoreConfig::default();

        assert_eq!(config.quirks.sprite_wrap, SpriteWrap::Clip);
        assert!(!config.quirks.logic_resets_vf);
        assert!(!config.quirks.shift_uses_vy);
        assert!(!config.quirks.load_store_advances_i);
        assert!(!config.quirks.jump_uses_vx);
        assert_eq!(config.rng_seed, DEFAULT_RNG_SEED);
        assert!(!config.tracing_enabled);
    }

    #[test]
    fn power_on_state_matches_boot_layout() {
        let state = CoreState::default();
        assert_eq!(state.arch.pc(), PROGRAM_START);
        assert_eq!(&state.memory[..FONT_SET.len()], &FONT_SET);
        assert!(state.stack.is_empty());
        assert_eq!(state.framebuffer.lit_count(), 0);
        assert_eq!(state.retired, 0);
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut state = CoreState::default();
        state.arch.set_v(Register::V3, 0xCA);
        state.arch.set_pc(0x0345);
        state.stack.push(0x0204).expect("push");
        state.framebuffer.toggle(1, 1);
        state.timers.delay = 9;
        state.memory[0x300] = 0xAB;
        state.set_key(Key::new(3).expect("valid key"));
        state.retired = 12;

        state.reset();

        assert_eq!(state, CoreState::default());
    }

    #[test]
    fn load_program_copies_image_at_program_start() {
        let mut state = CoreState::default();
        state
            .load_program(&[0x60, 0x05, 0x61, 0x03])
            .expect("program fits");
        assert_eq!(&state.memory[0x200..0x204], &[0x60, 0x05, 0x61, 0x03]);
        assert_eq!(state.memory[0x204], 0);
    }

    #[test]
    fn load_program_accepts_exact_capacity_and_rejects_more() {
        let mut state = CoreState::default();
        assert!(state
            .load_program(&vec![0xAA; PROGRAM_CAPACITY_BYTES])
            .is_ok());
        assert_eq!(state.memory[0xFFF], 0xAA);

        let before = state.clone();
        assert_eq!(
            state.load_program(&vec![0; PROGRAM_CAPACITY_BYTES + 1]),
            Err(LoadError::ProgramTooLarge {
                len: PROGRAM_CAPACITY_BYTES + 1,
                capacity: PROGRAM_CAPACITY_BYTES,
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn load_program_after_execution_is_a_full_reset() {
        let mut state = CoreState::default();
        state.load_program(&[0x12, 0x00, 0xFF]).expect("fits");
        state.arch.set_pc(0x0300);
        state.retired = 40;

        state.load_program(&[0x00, 0xE0]).expect("fits");

        assert_eq!(state.arch.pc(), PROGRAM_START);
        assert_eq!(state.retired, 0);
        assert_eq!(&state.memory[0x200..0x203], &[0x00, 0xE0, 0x00]);
    }

    #[test]
    fn seeded_random_is_deterministic_per_seed() {
        let mut first = SeededRandom::new(7);
        let mut second = SeededRandom::new(7);
        let a: Vec<u8> = (0..16).map(|_| first.next_byte()).collect();
        let b: Vec<u8> = (0..16).map(|_| second.next_byte()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn step_outcome_reports_redraw() {
        assert!(StepOutcome::Retired { redraw: true }.redraw());
        assert!(!StepOutcome::Retired { redraw: false }.redraw());
        assert!(!StepOutcome::AwaitingKey.redraw());
    }

    #[test]
    fn run_outcome_surfaces_terminating_fault() {
        let faulted = RunOutcome {
            steps: 2,
            redraw: true,
            final_step: StepOutcome::Retired { redraw: true },
            fault: Some(Fault::StackUnderflow),
        };
        assert_eq!(faulted.into_result(), Err(Fault::StackUnderflow));

        let clean = RunOutcome { fault: None, ..faulted };
        assert_eq!(clean.into_result(), Ok(clean));
    }

    #[test]
    fn snapshot_version_roundtrip_is_stable() {
        assert_eq!(SnapshotVersion::from_u16(1), Some(SnapshotVersion::V1));
        assert_eq!(SnapshotVersion::from_u16(2), None);
    }

    #[test]
    fn snapshot_rejects_truncated_memory() {
        let mut state = CoreState::default();
        state.memory = vec![0; 16].into_boxed_slice();
        let snapshot = CoreSnapshot::from_core_state(SnapshotVersion::V1, &state);
        assert_eq!(
            snapshot.try_into_core_state(),
            Err(SnapshotError::MemoryLength(16))
        );
    }

    #[test]
    fn snapshot_round_trips_valid_state() {
        let mut state = CoreState::default();
        state.arch.set_v(Register::V0, 9);
        let snapshot = CoreSnapshot::from_core_state(SnapshotVersion::V1, &state);
        assert_eq!(snapshot.try_into_core_state(), Ok(state));
    }
}
