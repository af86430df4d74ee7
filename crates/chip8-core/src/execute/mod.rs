//! Instruction execution pipeline.
//!
//! One step runs the following sequence:
//! 1. Fetch the big-endian word at `PC`
//! 2. Decode it into a form and operand fields
//! 3. Validate every precondition of the form (stack depth, memory ranges)
//! 4. Apply memory, framebuffer, stack, timer and key-latch side effects
//! 5. Commit the destination register, then `VF`, then `I`
//! 6. Commit the `PC` update chosen by the executor
//!
//! A step that faults returns before step 4, so faults leave no partial side
//! effects.

mod alu;
mod flags;
mod sprite;

pub use alu::{add_with_carry, bcd_digits, shift_left, shift_right, sub_with_borrow};
pub use flags::FlagUpdate;
pub use sprite::{draw_sprite, SPRITE_WIDTH};

use crate::decoder::DecodedInstruction;
use crate::encoding::OpcodeEncoding;
use crate::{
    disasm::disassemble_word, glyph_address, read_bytes, read_u16_be, validate_fetch_access,
    write_bytes, CoreConfig, CoreState, Decoder, Fault, Key, RandomSource, Register,
    StepOutcome, TraceEvent, TraceSink, INSTRUCTION_BYTES,
};

/// How `PC` moves once an instruction completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PcUpdate {
    /// Advance to the next instruction.
    #[default]
    Advance,
    /// Skip the next instruction.
    Skip,
    /// Set `PC` explicitly; no auto-advance.
    Jump(u16),
    /// Keep `PC` on the current instruction so it runs again.
    Hold,
}

/// Register-level side effects accumulated by an executor and applied by
/// [`commit_execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Destination register and value.
    pub dest: Option<(Register, u8)>,
    /// `VF` update, committed after `dest`.
    pub flag: FlagUpdate,
    /// New `I` value.
    pub next_i: Option<u16>,
    /// `PC` movement.
    pub pc_update: PcUpdate,
    /// Framebuffer changed.
    pub redraw: bool,
    /// `FX0A` found no key.
    pub awaiting_key: bool,
}

impl ExecuteState {
    const fn write(&mut self, reg: Register, value: u8) {
        self.dest = Some((reg, value));
    }

    const fn write_with_flag(&mut self, reg: Register, (value, flag): (u8, bool)) {
        self.dest = Some((reg, value));
        self.flag = FlagUpdate::Set(flag);
    }

    const fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc_update = PcUpdate::Skip;
        }
    }
}

/// Executes one decoded instruction against `state`.
///
/// Memory, framebuffer, stack, timer and key-latch effects (and the bulk
/// register load of `FX65`) are applied directly once validated; the single
/// destination register, `VF`, `I` and `PC` are returned for
/// [`commit_execution`].
///
/// # Errors
///
/// Returns the [`Fault`] raised by a failed precondition; `state` is
/// unchanged in that case.
pub fn execute_instruction(
    instr: &DecodedInstruction,
    state: &mut CoreState,
    rng: &mut dyn RandomSource,
    config: &CoreConfig,
) -> Result<ExecuteState, Fault> {
    let mut exec = ExecuteState::default();

    match instr.encoding {
        OpcodeEncoding::Cls => execute_cls(state, &mut exec),
        OpcodeEncoding::Ret => execute_ret(state, &mut exec)?,
        OpcodeEncoding::Jp => exec.pc_update = PcUpdate::Jump(instr.nnn),
        OpcodeEncoding::Call => execute_call(instr, state, &mut exec)?,
        OpcodeEncoding::SeImm => exec.skip_if(state.arch.v(instr.x) == instr.nn),
        OpcodeEncoding::SneImm => exec.skip_if(state.arch.v(instr.x) != instr.nn),
        OpcodeEncoding::SeReg => exec.skip_if(state.arch.v(instr.x) == state.arch.v(instr.y)),
        OpcodeEncoding::SneReg => exec.skip_if(state.arch.v(instr.x) != state.arch.v(instr.y)),
        OpcodeEncoding::LdImm => exec.write(instr.x, instr.nn),
        OpcodeEncoding::AddImm => exec.write(instr.x, state.arch.v(instr.x).wrapping_add(instr.nn)),
        OpcodeEncoding::LdReg => exec.write(instr.x, state.arch.v(instr.y)),
        OpcodeEncoding::Or | OpcodeEncoding::And | OpcodeEncoding::Xor => {
            execute_logic(instr, state, &mut exec, config);
        }
        OpcodeEncoding::AddReg => exec.write_with_flag(
            instr.x,
            add_with_carry(state.arch.v(instr.x), state.arch.v(instr.y)),
        ),
        OpcodeEncoding::Sub => exec.write_with_flag(
            instr.x,
            sub_with_borrow(state.arch.v(instr.x), state.arch.v(instr.y)),
        ),
        OpcodeEncoding::Subn => exec.write_with_flag(
            instr.x,
            sub_with_borrow(state.arch.v(instr.y), state.arch.v(instr.x)),
        ),
        OpcodeEncoding::Shr => {
            exec.write_with_flag(instr.x, shift_right(shift_source(instr, state, config)));
        }
        OpcodeEncoding::Shl => {
            exec.write_with_flag(instr.x, shift_left(shift_source(instr, state, config)));
        }
        OpcodeEncoding::LdI => exec.next_i = Some(instr.nnn),
        OpcodeEncoding::JpOffset => execute_jump_offset(instr, state, &mut exec, config),
        OpcodeEncoding::Rnd => exec.write(instr.x, rng.next_byte() & instr.nn),
        OpcodeEncoding::Drw => execute_draw(instr, state, &mut exec, config)?,
        OpcodeEncoding::Skp => exec.skip_if(key_matches(state, instr.x)),
        OpcodeEncoding::Sknp => exec.skip_if(!key_matches(state, instr.x)),
        OpcodeEncoding::LdFromDelay => exec.write(instr.x, state.timers.delay),
        OpcodeEncoding::LdKey => execute_wait_key(instr, state, &mut exec),
        OpcodeEncoding::LdDelay => state.timers.delay = state.arch.v(instr.x),
        OpcodeEncoding::LdSound => state.timers.sound = state.arch.v(instr.x),
        OpcodeEncoding::AddI => {
            exec.next_i = Some(state.arch.i().wrapping_add(u16::from(state.arch.v(instr.x))));
        }
        OpcodeEncoding::LdGlyph => exec.next_i = Some(glyph_address(state.arch.v(instr.x))),
        OpcodeEncoding::Bcd => execute_bcd(instr, state)?,
        OpcodeEncoding::Store => execute_store(instr, state, &mut exec, config)?,
        OpcodeEncoding::Load => execute_load(instr, state, &mut exec, config)?,
    }

    Ok(exec)
}

/// Applies register-level side effects and moves `PC`.
///
/// The destination register is written before `VF`, and `PC` moves relative
/// to `pc`, the address of the executed instruction.
pub const fn commit_execution(state: &mut CoreState, exec: &ExecuteState, pc: u16) {
    if let Some((reg, value)) = exec.dest {
        state.arch.set_v(reg, value);
    }

    if let Some(flag) = exec.flag.value() {
        state.arch.set_flag(flag);
    }

    if let Some(i) = exec.next_i {
        state.arch.set_i(i);
    }

    let next_pc = match exec.pc_update {
        PcUpdate::Advance => pc.wrapping_add(INSTRUCTION_BYTES),
        PcUpdate::Skip => pc.wrapping_add(2 * INSTRUCTION_BYTES),
        PcUpdate::Jump(target) => target,
        PcUpdate::Hold => pc,
    };
    state.arch.set_pc(next_pc);
}

/// Fetches, decodes and executes exactly one instruction.
///
/// # Errors
///
/// Returns the [`Fault`] raised during fetch, decode or execution. The
/// state is not mutated when a fault is returned; the driver decides whether
/// to halt, skip or reset.
pub fn step_one(
    state: &mut CoreState,
    rng: &mut dyn RandomSource,
    config: &CoreConfig,
    mut trace: Option<&mut dyn TraceSink>,
) -> Result<StepOutcome, Fault> {
    let pc = state.arch.pc();
    let result = fetch_and_decode(pc, &state.memory).and_then(|instr| {
        if config.tracing_enabled {
            if let Some(sink) = trace.as_deref_mut() {
                sink.on_event(TraceEvent::InstructionStart {
                    pc,
                    raw_word: instr.raw,
                });
            }
        }
        tracing::trace!(pc, word = instr.raw, "{}", disassemble_word(instr.raw));
        execute_instruction(&instr, state, rng, config)
    });

    let exec = match result {
        Ok(exec) => exec,
        Err(fault) => {
            tracing::debug!(pc, %fault, "step faulted");
            if config.tracing_enabled {
                if let Some(sink) = trace.as_deref_mut() {
                    sink.on_event(TraceEvent::FaultRaised { fault, pc });
                }
            }
            return Err(fault);
        }
    };

    commit_execution(state, &exec, pc);
    state.retired = state.retired.wrapping_add(1);

    let outcome = if exec.awaiting_key {
        StepOutcome::AwaitingKey
    } else {
        StepOutcome::Retired {
            redraw: exec.redraw,
        }
    };

    if config.tracing_enabled {
        if let Some(sink) = trace {
            sink.on_event(TraceEvent::InstructionRetired { pc, outcome });
        }
    }

    Ok(outcome)
}

fn fetch_and_decode(pc: u16, memory: &[u8]) -> Result<DecodedInstruction, Fault> {
    validate_fetch_access(pc)?;
    let raw_word = read_u16_be(memory, pc)?;
    Decoder::decode(raw_word)
}

fn execute_cls(state: &mut CoreState, exec: &mut ExecuteState) {
    state.framebuffer.clear();
    exec.redraw = true;
}

fn execute_ret(state: &mut CoreState, exec: &mut ExecuteState) -> Result<(), Fault> {
    let return_addr = state.stack.pop()?;
    exec.pc_update = PcUpdate::Jump(return_addr);
    Ok(())
}

fn execute_call(
    instr: &DecodedInstruction,
    state: &mut CoreState,
    exec: &mut ExecuteState,
) -> Result<(), Fault> {
    let return_addr = state.arch.pc().wrapping_add(INSTRUCTION_BYTES);
    state.stack.push(return_addr)?;
    exec.pc_update = PcUpdate::Jump(instr.nnn);
    Ok(())
}

const fn execute_logic(
    instr: &DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) {
    let vx = state.arch.v(instr.x);
    let vy = state.arch.v(instr.y);
    let value = match instr.encoding {
        OpcodeEncoding::Or => vx | vy,
        OpcodeEncoding::And => vx & vy,
        _ => vx ^ vy,
    };

    exec.write(instr.x, value);
    if config.quirks.logic_resets_vf {
        exec.flag = FlagUpdate::Set(false);
    }
}

const fn shift_source(instr: &DecodedInstruction, state: &CoreState, config: &CoreConfig) -> u8 {
    if config.quirks.shift_uses_vy {
        state.arch.v(instr.y)
    } else {
        state.arch.v(instr.x)
    }
}

fn execute_jump_offset(
    instr: &DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) {
    let base = if config.quirks.jump_uses_vx {
        instr.x
    } else {
        Register::V0
    };
    exec.pc_update = PcUpdate::Jump(instr.nnn.wrapping_add(u16::from(state.arch.v(base))));
}

fn execute_draw(
    instr: &DecodedInstruction,
    state: &mut CoreState,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) -> Result<(), Fault> {
    let rows = read_bytes(&state.memory, state.arch.i(), usize::from(instr.n))?;
    let x = state.arch.v(instr.x);
    let y = state.arch.v(instr.y);

    let collision = draw_sprite(&mut state.framebuffer, x, y, rows, config.quirks.sprite_wrap);

    exec.flag = FlagUpdate::Set(collision);
    exec.redraw = true;
    Ok(())
}

fn key_matches(state: &CoreState, reg: Register) -> bool {
    let wanted = state.arch.v(reg) & 0x0F;
    state.keys.peek().map(Key::code) == Some(wanted)
}

fn execute_wait_key(instr: &DecodedInstruction, state: &mut CoreState, exec: &mut ExecuteState) {
    match state.keys.take() {
        Some(key) => exec.write(instr.x, key.code()),
        None => {
            exec.pc_update = PcUpdate::Hold;
            exec.awaiting_key = true;
        }
    }
}

fn execute_bcd(instr: &DecodedInstruction, state: &mut CoreState) -> Result<(), Fault> {
    let digits = bcd_digits(state.arch.v(instr.x));
    write_bytes(&mut state.memory, state.arch.i(), digits.len())?.copy_from_slice(&digits);
    Ok(())
}

fn execute_store(
    instr: &DecodedInstruction,
    state: &mut CoreState,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) -> Result<(), Fault> {
    let count = instr.x.index() + 1;
    write_bytes(&mut state.memory, state.arch.i(), count)?
        .copy_from_slice(&state.arch.registers()[..count]);
    advance_i_after_transfer(state, exec, config, count);
    Ok(())
}

fn execute_load(
    instr: &DecodedInstruction,
    state: &mut CoreState,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) -> Result<(), Fault> {
    let count = instr.x.index() + 1;
    let bytes = read_bytes(&state.memory, state.arch.i(), count)?;
    for (reg, &value) in Register::ALL.into_iter().zip(bytes) {
        state.arch.set_v(reg, value);
    }
    advance_i_after_transfer(state, exec, config, count);
    Ok(())
}

fn advance_i_after_transfer(
    state: &CoreState,
    exec: &mut ExecuteState,
    config: &CoreConfig,
    count: usize,
) {
    if config.quirks.load_store_advances_i {
        let count = u16::try_from(count).unwrap_or(u16::MAX);
        exec.next_i = Some(state.arch.i().wrapping_add(count));
    }
}
