//! Machine state model: registers, stack, framebuffer, timers and input.

/// Framebuffer storage and pixel operations.
pub mod framebuffer;
/// Virtual key codes and the input latch.
pub mod keypad;
/// Register file types and storage model.
pub mod registers;
/// Bounded call stack.
pub mod stack;
/// Delay and sound timers.
pub mod timers;

pub use framebuffer::{Framebuffer, DISPLAY_HEIGHT, DISPLAY_PIXELS, DISPLAY_WIDTH};
pub use keypad::{Key, KeyLatch, KEY_COUNT};
pub use registers::{ArchitecturalState, Register, GENERAL_REGISTER_COUNT};
pub use stack::{CallStack, STACK_DEPTH};
pub use timers::{Timers, TIMER_FREQUENCY_HZ};
