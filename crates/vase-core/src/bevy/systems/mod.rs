//! Systems for the vase scene.
//!
//! Organized by functionality:
//! - command: Command queue processing
//! - scene: Vase spawning, scene ticking and event publishing
//! - fragments: Rest pose capture, transform bridge, mesh swaps
//! - camera: Main camera spawn and pose sync
//! - coins: Coin entity mirroring
//! - rendering: Meshes, materials and lights

pub mod camera;
pub mod coins;
pub mod command;
pub mod fragments;
pub mod rendering;
pub mod scene;

pub use camera::*;
pub use coins::*;
pub use command::*;
pub use fragments::*;
pub use rendering::*;
pub use scene::*;
