//! Player: live queue, current block and renderer dispatch
//!
//! **Responsibilities:**
//! - Own the play queue and the block currently on air
//! - Run the block-duration timer and auto-advance when it expires
//! - Route load/play/unload/restart to the renderer for each media type
//! - Emit `QueueChanged` / `CurrentBlockChanged` on the player's own EventBus
//!
//! Split across submodules the same way the engine is split by concern:
//! `core` (construction, state, events), `queue` (mutations and queries),
//! `playback` (transitions, focus, preload), `timer` and `unload`.

mod core;
mod playback;
mod queue;
mod timer;
mod unload;

pub use self::core::{Player, PlayerSettings};
