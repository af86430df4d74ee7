use chip8_core::{CoreConfig, Fault, Key, Machine, RunOutcome, StepOutcome};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

macro_rules! console_log {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}

/// JS-compatible version of StepOutcome
#[derive(Serialize, Deserialize)]
pub enum WasmStepOutcome {
    Retired { redraw: bool },
    AwaitingKey,
    Fault { cause: String, pc: u16 },
}

impl WasmStepOutcome {
    fn from_step(result: Result<StepOutcome, Fault>, pc: u16) -> Self {
        match result {
            Ok(StepOutcome::Retired { redraw }) => Self::Retired { redraw },
            Ok(StepOutcome::AwaitingKey) => Self::AwaitingKey,
            Err(fault) => Self::Fault {
                cause: fault.to_string(),
                pc,
            },
        }
    }
}

/// JS-compatible version of RunOutcome
#[derive(Serialize, Deserialize)]
pub struct WasmRunOutcome {
    pub steps: u32,
    pub redraw: bool,
    pub final_step: WasmStepOutcome,
}

impl WasmRunOutcome {
    fn from_run(outcome: RunOutcome, pc: u16) -> Self {
        let final_step = match outcome.fault {
            Some(fault) => WasmStepOutcome::from_step(Err(fault), pc),
            None => WasmStepOutcome::from_step(Ok(outcome.final_step), pc),
        };
        Self {
            steps: outcome.steps,
            redraw: outcome.redraw,
            final_step,
        }
    }
}

#[wasm_bindgen]
pub struct WasmCore {
    machine: Machine,
}

impl Default for WasmCore {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmCore {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();
        Self {
            machine: Machine::with_config(CoreConfig::default()),
        }
    }

    /// Resets the machine and loads a program at 0x200.
    ///
    /// # Errors
    ///
    /// Rejects images larger than the program region.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), JsValue> {
        self.machine
            .load_program(program)
            .map_err(|err| JsError::new(&err.to_string()))?;
        console_log!("Loaded {} bytes at 0x200", program.len());
        Ok(())
    }

    /// Resets the machine to power-on state.
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    /// Executes a single instruction and returns the outcome as a JS object.
    ///
    /// # Errors
    ///
    /// Fails only if the outcome cannot be serialized.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        let pc = self.machine.state().arch.pc();
        let result = self.machine.step();
        if let Err(fault) = result {
            console_log!("Fault at {:#06X}: {}", pc, fault);
        }
        let outcome = WasmStepOutcome::from_step(result, pc);
        Ok(serde_wasm_bindgen::to_value(&outcome)?)
    }

    /// Runs one display frame worth of instructions and ticks the timers.
    ///
    /// # Errors
    ///
    /// Fails only if the outcome cannot be serialized.
    pub fn run_frame(&mut self, steps: u32) -> Result<JsValue, JsValue> {
        let outcome = self.machine.run_steps(steps);
        let pc = self.machine.state().arch.pc();
        if let Some(fault) = outcome.fault {
            console_log!("Fault at {:#06X} after {} steps: {}", pc, outcome.steps, fault);
        }
        let outcome = WasmRunOutcome::from_run(outcome, pc);
        self.machine.tick_timers();
        Ok(serde_wasm_bindgen::to_value(&outcome)?)
    }

    /// Latches a key code (0-15); other codes are ignored.
    pub fn set_key(&mut self, code: u8) {
        if let Some(key) = Key::new(code) {
            self.machine.set_key(key);
        }
    }

    /// Releases the latched key.
    pub fn clear_key(&mut self) {
        self.machine.clear_key();
    }

    /// Decrements the delay and sound timers.
    pub fn tick_timers(&mut self) {
        self.machine.tick_timers();
    }

    /// Whether the sound timer is running.
    #[must_use]
    pub fn sound_active(&self) -> bool {
        self.machine.sound_active()
    }

    /// Skips the instruction at PC, e.g. after an unimplemented opcode.
    pub fn skip_instruction(&mut self) {
        self.machine.skip_instruction();
    }

    /// Returns the full machine state as a JS object.
    ///
    /// # Errors
    ///
    /// Fails only if the state cannot be serialized.
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.machine.state())?)
    }

    /// Returns a copy of the 64x32 framebuffer, one byte per pixel.
    #[must_use]
    pub fn get_framebuffer(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.machine.framebuffer().as_slice())
    }

    /// Returns a copy of the 4 KiB memory image.
    #[must_use]
    pub fn get_memory(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.machine.state().memory[..])
    }
}

#[cfg(test)]
mod tests {
    use super::{WasmRunOutcome, WasmStepOutcome};
    use chip8_core::{Fault, Machine, StepOutcome};

    #[test]
    fn step_outcome_serializes_fault_cause() {
        let outcome = WasmStepOutcome::from_step(Err(Fault::StackUnderflow), 0x200);
        let json = serde_json::to_value(&outcome).expect("serializes");
        assert_eq!(json["Fault"]["cause"], "return with empty call stack");
        assert_eq!(json["Fault"]["pc"], 0x200);
    }

    #[test]
    fn retired_outcome_keeps_redraw() {
        let outcome = WasmStepOutcome::from_step(Ok(StepOutcome::Retired { redraw: true }), 0);
        let json = serde_json::to_value(&outcome).expect("serializes");
        assert_eq!(json["Retired"]["redraw"], true);
    }

    #[test]
    fn faulted_frame_keeps_steps_and_redraw() {
        let mut machine = Machine::new();
        machine
            .load_program(&[0xA0, 0x00, 0xD0, 0x15, 0xFF, 0xFF])
            .expect("fits");

        let run = machine.run_steps(10);
        let outcome = WasmRunOutcome::from_run(run, machine.state().arch.pc());
        let json = serde_json::to_value(&outcome).expect("serializes");

        assert_eq!(json["steps"], 2);
        assert_eq!(json["redraw"], true);
        assert_eq!(json["final_step"]["Fault"]["pc"], 0x204);
        assert_eq!(json["final_step"]["Fault"]["cause"], "unimplemented opcode 0xFFFF");
    }
}
