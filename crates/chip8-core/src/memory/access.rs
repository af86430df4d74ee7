//! Deterministic memory access policy helpers.
//!
//! Every data access the engine performs is validated here before any state
//! is mutated, so a faulting instruction leaves memory untouched.

use std::ops::Range;

use crate::{decode_memory_region, Fault, MemoryRegion, MEMORY_BYTES};

/// Byte width of an instruction word.
pub const INSTRUCTION_BYTES: u16 = 2;

/// Validates that the instruction word at `pc` lies inside memory.
///
/// # Errors
///
/// Returns [`Fault::MemoryOutOfBounds`] when either byte of the word is past
/// the end of memory.
pub fn validate_fetch_access(pc: u16) -> Result<(), Fault> {
    validate_read_range(pc, usize::from(INSTRUCTION_BYTES)).map(|_| ())
}

/// Validates a `len`-byte read starting at `addr` and returns the index range.
///
/// # Errors
///
/// Returns [`Fault::MemoryOutOfBounds`] carrying the first address past the
/// end of memory.
pub fn validate_read_range(addr: u16, len: usize) -> Result<Range<usize>, Fault> {
    let start = usize::from(addr);
    let end = start + len;
    if end > MEMORY_BYTES {
        return Err(Fault::MemoryOutOfBounds {
            addr: first_out_of_bounds(addr),
        });
    }
    Ok(start..end)
}

/// Validates a `len`-byte write starting at `addr` and returns the index range.
///
/// Writes must stay inside the program region; the interpreter area holding
/// the font set is never writable by instructions.
///
/// # Errors
///
/// Returns [`Fault::ReservedMemoryWrite`] when the range starts below the
/// program region, or [`Fault::MemoryOutOfBounds`] when it runs past the end
/// of memory.
pub fn validate_write_range(addr: u16, len: usize) -> Result<Range<usize>, Fault> {
    if len > 0 && decode_memory_region(addr) == Some(MemoryRegion::Interpreter) {
        return Err(Fault::ReservedMemoryWrite { addr });
    }
    validate_read_range(addr, len)
}

/// Reads the big-endian instruction word at `pc`.
///
/// # Errors
///
/// Returns [`Fault::MemoryOutOfBounds`] when the word is not fully inside
/// `memory`.
pub fn read_u16_be(memory: &[u8], pc: u16) -> Result<u16, Fault> {
    let addr = usize::from(pc);
    match (memory.get(addr), memory.get(addr + 1)) {
        (Some(&hi), Some(&lo)) => Ok(u16::from_be_bytes([hi, lo])),
        _ => Err(Fault::MemoryOutOfBounds {
            addr: first_out_of_bounds(pc),
        }),
    }
}

/// Borrows `len` bytes of `memory` starting at `addr` for reading.
///
/// # Errors
///
/// Returns [`Fault::MemoryOutOfBounds`] when the span leaves the address
/// space or the backing slice is shorter than it.
pub fn read_bytes(memory: &[u8], addr: u16, len: usize) -> Result<&[u8], Fault> {
    let range = validate_read_range(addr, len)?;
    let available = memory.len();
    memory
        .get(range)
        .ok_or_else(|| past_backing_end(available, addr))
}

/// Borrows `len` bytes of `memory` starting at `addr` for writing.
///
/// # Errors
///
/// Same as [`validate_write_range`], plus [`Fault::MemoryOutOfBounds`] when
/// the backing slice is shorter than the span.
pub fn write_bytes(memory: &mut [u8], addr: u16, len: usize) -> Result<&mut [u8], Fault> {
    let range = validate_write_range(addr, len)?;
    let available = memory.len();
    memory
        .get_mut(range)
        .ok_or_else(|| past_backing_end(available, addr))
}

fn past_backing_end(available: usize, addr: u16) -> Fault {
    Fault::MemoryOutOfBounds {
        addr: u16::try_from(available).map_or(addr, |end| end.max(addr)),
    }
}

fn first_out_of_bounds(addr: u16) -> u16 {
    if usize::from(addr) >= MEMORY_BYTES {
        addr
    } else {
        crate::PROGRAM_END + 1
    }
}
