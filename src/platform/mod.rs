//! Platform abstraction layer
//!
//! Browser/native differences for:
//! - Storage (LocalStorage on web, in-memory elsewhere)
//! - Haptics (navigator.vibrate on web, no-op elsewhere)

pub mod haptics;
pub mod storage;

pub use haptics::{Haptics, NoHaptics};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use haptics::NavigatorHaptics;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
