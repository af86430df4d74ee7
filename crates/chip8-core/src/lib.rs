//! Execution core for the CHIP-8 virtual machine.
//!
//! The crate owns machine state and the fetch/decode/execute step. Windowing,
//! audio, input devices and pacing belong to the driver embedding it.

/// Memory model primitives, font and fixed region map.
pub mod memory;
pub use memory::{
    decode_memory_region, glyph_address, install_font, new_address_space,
    new_address_space_with_font, read_bytes, read_u16_be, validate_fetch_access,
    validate_read_range, validate_write_range, write_bytes, MemoryRegion, RegionDescriptor,
    FIXED_MEMORY_REGIONS, FONT_GLYPH_BYTES, FONT_GLYPH_COUNT, FONT_SET, FONT_START,
    INSTRUCTION_BYTES, INTERPRETER_END, INTERPRETER_START, MEMORY_BYTES, PROGRAM_CAPACITY_BYTES,
    PROGRAM_END, PROGRAM_START,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    CoreConfig, CoreSnapshot, CoreState, Quirks, RandomSource, RunOutcome, SeededRandom,
    SnapshotError, SnapshotVersion, SpriteWrap, StepOutcome, TraceEvent, TraceSink,
    DEFAULT_RNG_SEED,
};

/// Machine state model primitives.
pub mod state;
pub use state::{
    ArchitecturalState, CallStack, Framebuffer, Key, KeyLatch, Register, Timers, DISPLAY_HEIGHT,
    DISPLAY_PIXELS, DISPLAY_WIDTH, GENERAL_REGISTER_COUNT, KEY_COUNT, STACK_DEPTH,
    TIMER_FREQUENCY_HZ,
};

/// Deterministic opcode classification tables.
pub mod encoding;
pub use encoding::{classify_opcode, opcode_family, OpcodeEncoding, OPCODE_ENCODING_TABLE};

/// Instruction decode with operand field extraction.
pub mod decoder;
pub use decoder::{DecodedInstruction, Decoder};

/// Fault taxonomy for execution and loading.
pub mod fault;
pub use fault::{Fault, FaultClass, LoadError};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{commit_execution, execute_instruction, step_one, ExecuteState, FlagUpdate, PcUpdate};

/// Owning machine facade for drivers.
pub mod machine;
pub use machine::Machine;

/// Instruction disassembly for traces and debuggers.
pub mod disasm;
pub use disasm::{disassemble_window, disassemble_word, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tracing_subscriber as _;
