//! Owning facade over the execution engine.

use std::fmt;

use crate::{
    step_one, CoreConfig, CoreSnapshot, CoreState, Fault, Framebuffer, Key, LoadError,
    RunOutcome, SeededRandom, SnapshotError, SnapshotVersion, StepOutcome, TraceSink,
    INSTRUCTION_BYTES,
};

/// A single CHIP-8 machine: state, configuration, random source and an
/// optional trace sink.
///
/// The driver owns the machine exclusively and calls [`Machine::step`] or
/// [`Machine::run_steps`] at its chosen instruction rate, and
/// [`Machine::tick_timers`] at 60 Hz.
pub struct Machine {
    state: CoreState,
    config: CoreConfig,
    rng: SeededRandom,
    trace: Option<Box<dyn TraceSink>>,
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("trace", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Creates a machine in power-on state with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    /// Creates a machine in power-on state with `config`.
    #[must_use]
    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            state: CoreState::default(),
            rng: SeededRandom::new(config.rng_seed),
            config,
            trace: None,
        }
    }

    /// Installs a trace sink; events are only dispatched when
    /// [`CoreConfig::tracing_enabled`] is set.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Removes and returns the installed trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace.take()
    }

    /// Restores power-on state and reseeds the random source.
    pub fn reset(&mut self) {
        self.state.reset();
        self.rng = SeededRandom::new(self.config.rng_seed);
    }

    /// Resets, then installs `program` at `0x200`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ProgramTooLarge`] when the image exceeds the
    /// program region; the machine is left unchanged.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.state.load_program(program)?;
        self.rng = SeededRandom::new(self.config.rng_seed);
        Ok(())
    }

    /// Executes exactly one instruction.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] raised by the instruction; state is unchanged.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        let trace = self
            .trace
            .as_deref_mut()
            .map(|sink| sink as &mut dyn TraceSink);
        step_one(&mut self.state, &mut self.rng, &self.config, trace)
    }

    /// Executes up to `max_steps` instructions.
    ///
    /// Stops early when `FX0A` is waiting for a key or when a step faults.
    /// A fault is reported in [`RunOutcome::fault`] alongside the steps
    /// retired and any redraw before it; the faulting instruction is not
    /// counted. With `max_steps == 0` nothing runs and `final_step` reports
    /// a retired step without redraw.
    #[must_use]
    pub fn run_steps(&mut self, max_steps: u32) -> RunOutcome {
        let mut outcome = RunOutcome {
            steps: 0,
            redraw: false,
            final_step: StepOutcome::Retired { redraw: false },
            fault: None,
        };

        while outcome.steps < max_steps {
            let step = match self.step() {
                Ok(step) => step,
                Err(fault) => {
                    outcome.fault = Some(fault);
                    break;
                }
            };
            outcome.steps += 1;
            outcome.redraw |= step.redraw();
            outcome.final_step = step;

            if step == StepOutcome::AwaitingKey {
                break;
            }
        }

        outcome
    }

    /// Moves `PC` past the current instruction without executing it.
    ///
    /// Drivers use this to continue past an unimplemented opcode.
    pub fn skip_instruction(&mut self) {
        let pc = self.state.arch.pc();
        self.state.arch.set_pc(pc.wrapping_add(INSTRUCTION_BYTES));
        tracing::debug!(pc, "instruction skipped");
    }

    /// Current display contents.
    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer {
        &self.state.framebuffer
    }

    /// Latches `key` as pressed.
    pub const fn set_key(&mut self, key: Key) {
        self.state.set_key(key);
    }

    /// Releases the latched key.
    pub const fn clear_key(&mut self) {
        self.state.clear_key();
    }

    /// Decrements both timers by one tick.
    pub const fn tick_timers(&mut self) {
        self.state.tick_timers();
    }

    /// Whether the sound timer is running.
    #[must_use]
    pub const fn sound_active(&self) -> bool {
        self.state.timers.sound_active()
    }

    /// Read-only view of the machine state.
    #[must_use]
    pub const fn state(&self) -> &CoreState {
        &self.state
    }

    /// Mutable view of the machine state for debuggers and tests.
    pub const fn state_mut(&mut self) -> &mut CoreState {
        &mut self.state
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Copies the full state into a versioned snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot::from_core_state(SnapshotVersion::V1, &self.state)
    }

    /// Replaces the live state with a validated snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] when the snapshot layout is invalid; the
    /// live state is left unchanged.
    pub fn restore(&mut self, snapshot: CoreSnapshot) -> Result<(), SnapshotError> {
        self.state = snapshot.try_into_core_state()?;
        tracing::info!(pc = self.state.arch.pc(), "snapshot restored");
        Ok(())
    }
}
