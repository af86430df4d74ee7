//! Browser-side checks for the bindings; run with `wasm-pack test --headless`.

#![cfg(target_arch = "wasm32")]

use chip8_wasm::WasmCore;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

fn field(object: &JsValue, name: &str) -> JsValue {
    js_sys::Reflect::get(object, &JsValue::from_str(name)).expect("field present")
}

#[wasm_bindgen_test]
fn run_frame_reports_progress_before_fault() {
    let mut core = WasmCore::new();
    core.load_program(&[0xA0, 0x00, 0xD0, 0x15, 0xFF, 0xFF])
        .expect("fits");

    let outcome = core.run_frame(10).expect("serializes");

    assert_eq!(field(&outcome, "steps").as_f64(), Some(2.0));
    assert_eq!(field(&outcome, "redraw").as_bool(), Some(true));
    let fault = field(&field(&outcome, "final_step"), "Fault");
    assert_eq!(field(&fault, "pc").as_f64(), Some(f64::from(0x204_u16)));
}

#[wasm_bindgen_test]
fn framebuffer_copy_has_one_byte_per_pixel() {
    let mut core = WasmCore::new();
    core.load_program(&[0xA0, 0x00, 0xD0, 0x15]).expect("fits");
    core.run_frame(2).expect("serializes");

    let pixels = core.get_framebuffer().to_vec();

    assert_eq!(pixels.len(), 64 * 32);
    assert_eq!(pixels.iter().filter(|&&pixel| pixel != 0).count(), 14);
}
