#![no_main]

use chip8_core::{
    disassemble_word, validate_fetch_access, validate_read_range, validate_write_range, Decoder,
    Key, Machine, PROGRAM_CAPACITY_BYTES,
};
use libfuzzer_sys::fuzz_target;

const MAX_STEPS: u32 = 256;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let word = u16::from_be_bytes([data[0], data[1]]);
    let addr = u16::from_be_bytes([data[2], data[3]]);

    let _ = Decoder::decode(word);
    let _ = disassemble_word(word);
    let _ = validate_fetch_access(addr);
    let _ = validate_read_range(addr, usize::from(data[0] & 0x0F));
    let _ = validate_write_range(addr, usize::from(data[1] & 0x0F));

    let image = &data[4..data.len().min(4 + PROGRAM_CAPACITY_BYTES)];
    let mut machine = Machine::new();
    if machine.load_program(image).is_err() {
        return;
    }
    if let Some(key) = Key::new(data[3] & 0x0F) {
        machine.set_key(key);
    }

    for _ in 0..MAX_STEPS {
        let pc = machine.state().arch.pc();
        match machine.step() {
            Ok(_) => {}
            Err(_) => {
                assert_eq!(machine.state().arch.pc(), pc);
                machine.skip_instruction();
            }
        }
        machine.tick_timers();
    }
});
