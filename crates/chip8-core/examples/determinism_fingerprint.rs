//! Deterministic run fingerprint used to compare hosts and seeds.

use chip8_core::{CoreConfig, Machine, StepOutcome};
use proptest as _;
use rand as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

/// Draws random glyphs at random positions forever.
const PROGRAM: [u16; 7] = [
    0xC00F, // RND V0, 0x0F
    0xF029, // LD F, V0
    0xC13F, // RND V1, 0x3F
    0xC21F, // RND V2, 0x1F
    0xD125, // DRW V1, V2, 5
    0x7301, // ADD V3, 0x01
    0x1200, // JP 0x200
];

const FRAMES: u32 = 120;
const STEPS_PER_FRAME: u32 = 10;

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint(seed: u64) -> String {
    let image: Vec<u8> = PROGRAM.iter().flat_map(|word| word.to_be_bytes()).collect();
    let mut machine = Machine::with_config(CoreConfig {
        rng_seed: seed,
        ..CoreConfig::default()
    });
    machine.load_program(&image).expect("program fits");

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for _ in 0..FRAMES {
        let outcome = machine
            .run_steps(STEPS_PER_FRAME)
            .into_result()
            .expect("program does not fault");
        machine.tick_timers();
        match outcome.final_step {
            StepOutcome::Retired { redraw } => hash_bytes(&mut hash, &[0x10, u8::from(redraw)]),
            StepOutcome::AwaitingKey => hash_bytes(&mut hash, &[0x11]),
        }
    }

    let state = machine.state();
    hash_bytes(&mut hash, &state.arch.pc().to_le_bytes());
    hash_bytes(&mut hash, &state.arch.i().to_le_bytes());
    hash_bytes(&mut hash, state.arch.registers());
    hash_bytes(&mut hash, &state.retired.to_le_bytes());
    hash_bytes(&mut hash, state.framebuffer.as_slice());

    format!("{hash:016x}")
}

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(chip8_core::DEFAULT_RNG_SEED);
    println!("{}", fingerprint(seed));
}
