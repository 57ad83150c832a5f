//! Area Desktop
//!
//! Window-entity core of the Area compositor: the per-window state machine
//! (mapping, fading, resize negotiation, fullscreen), the layered property
//! cascade, tabbed groups, workspaces and focus.

pub mod config;
pub mod desktop;
pub mod ipc;
pub mod protocols;
pub mod shared;

pub use config::Config;
pub use desktop::{Desktop, DesktopError, WindowHandle};
