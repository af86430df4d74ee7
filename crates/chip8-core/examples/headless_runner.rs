//! Runs a ROM without a window, printing the display as text on exit.
//!
//! Usage: `headless_runner <rom> [frames]`. Set `RUST_LOG=chip8_core=trace`
//! to see every executed instruction.

use std::process::ExitCode;

use chip8_core::{Fault, FaultClass, Machine, DISPLAY_HEIGHT, DISPLAY_WIDTH, TIMER_FREQUENCY_HZ};
use proptest as _;
use rand as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing_subscriber::EnvFilter;

const INSTRUCTIONS_PER_SECOND: u32 = 700;
const STEPS_PER_FRAME: u32 = INSTRUCTIONS_PER_SECOND / TIMER_FREQUENCY_HZ;
const DEFAULT_FRAMES: u32 = 600;

fn render(machine: &Machine) -> String {
    let fb = machine.framebuffer();
    let mut out = String::with_capacity((DISPLAY_WIDTH + 1) * DISPLAY_HEIGHT);
    for y in 0..DISPLAY_HEIGHT {
        for x in 0..DISPLAY_WIDTH {
            out.push(if fb.pixel(x, y) { '#' } else { ' ' });
        }
        out.push('\n');
    }
    out
}

fn run(machine: &mut Machine, frames: u32) -> Result<(), Fault> {
    for frame in 0..frames {
        let outcome = machine.run_steps(STEPS_PER_FRAME);
        match outcome.fault {
            None => {}
            Some(fault) if fault.class() == FaultClass::Decode => {
                tracing::warn!(
                    frame,
                    steps = outcome.steps,
                    %fault,
                    "skipping unimplemented instruction"
                );
                machine.skip_instruction();
            }
            Some(fault) => return Err(fault),
        }
        machine.tick_timers();
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: headless_runner <rom> [frames]");
        return ExitCode::FAILURE;
    };
    let frames = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let rom = match std::fs::read(&path) {
        Ok(rom) => rom,
        Err(err) => {
            tracing::error!(%path, %err, "failed to read rom");
            return ExitCode::FAILURE;
        }
    };

    let mut machine = Machine::new();
    if let Err(err) = machine.load_program(&rom) {
        tracing::error!(%path, %err, "failed to load rom");
        return ExitCode::FAILURE;
    }

    let result = run(&mut machine, frames);
    print!("{}", render(&machine));

    match result {
        Ok(()) => {
            tracing::info!(retired = machine.state().retired, "run finished");
            ExitCode::SUCCESS
        }
        Err(fault) => {
            tracing::error!(pc = machine.state().arch.pc(), %fault, "machine halted");
            ExitCode::FAILURE
        }
    }
}
