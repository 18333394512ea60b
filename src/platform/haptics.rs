//! Vibration feedback

/// Device vibration; silently ignored where unsupported
pub trait Haptics {
    /// Alternating on/off durations in milliseconds
    fn vibrate(&mut self, pattern: &[u32]);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _pattern: &[u32]) {}
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigatorHaptics;

#[cfg(target_arch = "wasm32")]
impl Haptics for NavigatorHaptics {
    fn vibrate(&mut self, pattern: &[u32]) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let steps = js_sys::Array::new();
        for ms in pattern {
            steps.push(&wasm_bindgen::JsValue::from(*ms));
        }
        if !window.navigator().vibrate_with_pattern(&steps) {
            log::debug!("Vibration not supported");
        }
    }
}
