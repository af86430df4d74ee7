//! Property coverage for arithmetic, drawing, memory transfer and decode.

#![allow(clippy::pedantic, clippy::nursery)]

use chip8_core::{
    disassemble_word, step_one, CoreConfig, CoreSnapshot, CoreState, Decoder, Fault, Framebuffer,
    Machine, Register, SeededRandom, SnapshotVersion, DISPLAY_HEIGHT, DISPLAY_PIXELS,
    DISPLAY_WIDTH, PROGRAM_START, STACK_DEPTH,
};
use proptest::prelude::*;
use rand as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

fn program(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

/// Display coordinates a clipped sprite touches, one per set bit.
fn sprite_pixels(x: u8, y: u8, rows: &[u8]) -> Vec<(usize, usize)> {
    let x0 = usize::from(x) % DISPLAY_WIDTH;
    let y0 = usize::from(y) % DISPLAY_HEIGHT;
    let mut covered = Vec::new();
    for (dy, &row) in rows.iter().enumerate() {
        for dx in 0..8 {
            let (px, py) = (x0 + dx, y0 + dy);
            if (row & (0x80_u8 >> dx)) != 0 && px < DISPLAY_WIDTH && py < DISPLAY_HEIGHT {
                covered.push((px, py));
            }
        }
    }
    covered
}

fn run_words(words: &[u16], steps: u32) -> Machine {
    let mut machine = Machine::new();
    machine.load_program(&program(words)).expect("fits");
    machine.run_steps(steps).into_result().expect("runs");
    machine
}

proptest! {
    #[test]
    fn add_with_carry_over_all_byte_pairs(a in any::<u8>(), b in any::<u8>()) {
        let machine = run_words(&[0x6000 | u16::from(a), 0x6100 | u16::from(b), 0x8014], 3);
        let sum = u16::from(a) + u16::from(b);

        prop_assert_eq!(machine.state().arch.v(Register::V0), (sum & 0xFF) as u8);
        prop_assert_eq!(machine.state().arch.flag(), u8::from(sum > 0xFF));
    }

    #[test]
    fn subtract_flag_is_no_borrow(a in any::<u8>(), b in any::<u8>()) {
        let machine = run_words(&[0x6000 | u16::from(a), 0x6100 | u16::from(b), 0x8015], 3);

        prop_assert_eq!(machine.state().arch.v(Register::V0), a.wrapping_sub(b));
        prop_assert_eq!(machine.state().arch.flag(), u8::from(a >= b));
    }

    #[test]
    fn drawing_twice_restores_framebuffer(
        x in 0_u8..=255,
        y in 0_u8..=255,
        rows in prop::collection::vec(any::<u8>(), 1..=15),
        background in prop::collection::vec(any::<bool>(), DISPLAY_PIXELS),
    ) {
        let n = rows.len() as u16;
        let pixels: Vec<u8> = background.iter().map(|&lit| u8::from(lit)).collect();
        let seeded = Framebuffer::from_pixels(&pixels).expect("display sized");
        let mut machine = Machine::new();
        machine.load_program(&program(&[0xA300, 0xD010 | n, 0xD010 | n])).expect("fits");
        {
            let state = machine.state_mut();
            state.arch.set_v(Register::V0, x);
            state.arch.set_v(Register::V1, y);
            state.memory[0x300..0x300 + rows.len()].copy_from_slice(&rows);
            state.framebuffer = seeded.clone();
        }
        let covered = sprite_pixels(x, y, &rows);

        machine.run_steps(2).into_result().expect("runs");
        let after_first = machine.framebuffer().clone();
        prop_assert_eq!(
            machine.state().arch.flag(),
            u8::from(covered.iter().any(|&(px, py)| seeded.pixel(px, py)))
        );

        machine.step().expect("steps");

        prop_assert_eq!(machine.framebuffer().as_slice(), seeded.as_slice());
        prop_assert_eq!(
            machine.state().arch.flag(),
            u8::from(covered.iter().any(|&(px, py)| after_first.pixel(px, py)))
        );
    }

    #[test]
    fn draw_origin_is_taken_modulo_display(x in any::<u8>(), y in any::<u8>()) {
        let mut machine = Machine::new();
        machine.load_program(&program(&[0xA300, 0xD011])).expect("fits");
        {
            let state = machine.state_mut();
            state.arch.set_v(Register::V0, x);
            state.arch.set_v(Register::V1, y);
            state.memory[0x300] = 0x80;
        }

        machine.run_steps(2).into_result().expect("runs");

        let px = usize::from(x) % DISPLAY_WIDTH;
        let py = usize::from(y) % DISPLAY_HEIGHT;
        prop_assert!(machine.framebuffer().pixel(px, py));
        prop_assert_eq!(machine.framebuffer().lit_count(), 1);
    }

    #[test]
    fn store_then_load_round_trips_registers(
        values in prop::array::uniform16(any::<u8>()),
        last in 0_u8..16,
        addr in 0x300_u16..0xF00,
    ) {
        let x = u16::from(last);
        let mut machine = Machine::new();
        machine
            .load_program(&program(&[0xA000 | addr, 0xF055 | (x << 8), 0x00E0, 0xF065 | (x << 8)]))
            .expect("fits");
        for (reg, value) in Register::ALL.into_iter().zip(values) {
            machine.state_mut().arch.set_v(reg, value);
        }

        machine.run_steps(2).into_result().expect("runs");
        for reg in Register::ALL {
            machine.state_mut().arch.set_v(reg, 0);
        }
        machine.run_steps(2).into_result().expect("runs");

        for reg in Register::ALL {
            let expected = if reg.index() <= usize::from(last) { values[reg.index()] } else { 0 };
            prop_assert_eq!(machine.state().arch.v(reg), expected);
        }
        prop_assert_eq!(machine.state().arch.i(), addr);
    }

    #[test]
    fn stack_never_exceeds_depth(calls in 0_usize..=STACK_DEPTH + 4) {
        let mut machine = Machine::new();
        machine.load_program(&program(&[0x2200])).expect("fits");

        for step in 0..calls {
            let result = machine.step();
            if step < STACK_DEPTH {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(Fault::StackOverflow));
            }
            prop_assert!(machine.state().stack.depth() <= STACK_DEPTH);
        }
    }

    #[test]
    fn faults_never_mutate_state(word in any::<u16>(), i in any::<u16>(), sp_fill in 0_usize..=STACK_DEPTH) {
        let mut state = CoreState::default();
        state.load_program(&word.to_be_bytes()).expect("fits");
        state.arch.set_i(i);
        for _ in 0..sp_fill {
            state.stack.push(PROGRAM_START).expect("room on stack");
        }
        let before = state.clone();
        let config = CoreConfig::default();
        let mut rng = SeededRandom::new(config.rng_seed);

        if step_one(&mut state, &mut rng, &config, None).is_err() {
            prop_assert_eq!(state, before);
        }
    }

    #[test]
    fn decode_and_disassembly_agree(word in any::<u16>()) {
        let text = disassemble_word(word);
        match Decoder::decode(word) {
            Ok(_) => prop_assert!(!text.starts_with(".word")),
            Err(fault) => {
                prop_assert_eq!(fault, Fault::UnimplementedOpcode(word));
                prop_assert_eq!(text, format!(".word 0x{word:04X}"));
            }
        }
    }

    #[test]
    fn snapshot_preserves_registers(values in prop::array::uniform16(any::<u8>()), i in any::<u16>()) {
        let mut state = CoreState::default();
        for (reg, value) in Register::ALL.into_iter().zip(values) {
            state.arch.set_v(reg, value);
        }
        state.arch.set_i(i);

        let snapshot = CoreSnapshot::from_core_state(SnapshotVersion::V1, &state);
        let restored = snapshot.try_into_core_state().expect("valid snapshot");

        prop_assert_eq!(restored, state);
    }
}
