//! Area Desktop IPC Protocol
//!
//! Messages exchanged between the window core and its collaborators (the
//! surface/protocol layer, the layout and the shell). Clients name their
//! surfaces with their own `u64` ids; the core answers with
//! [`WindowHandle`]s and announces the binding with
//! [`CoreEvent::SurfaceBound`].

use serde::{Deserialize, Serialize};

use crate::desktop::workspace::{MonitorId, WorkspaceId, WorkspaceRule};
use crate::desktop::{FullscreenMode, SurfaceKind, WindowHandle, WindowRule};
use crate::shared::{Rect, Vec2};

// ============================================================================
// Collaborator → Core
// ============================================================================

/// Events and commands sent to the window core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Output layout
    AddMonitor { id: MonitorId, name: String, area: Rect },

    AddWorkspace { id: WorkspaceId, name: String, monitor: MonitorId },

    /// Replace (or with `None`, drop) a workspace's rule
    SetWorkspaceRule {
        workspace: WorkspaceId,
        #[serde(default)]
        rule: Option<WorkspaceRule>,
    },

    /// A client created a toplevel surface
    NewSurface {
        surface: u64,
        #[serde(default = "default_kind")]
        kind: SurfaceKind,
        #[serde(default)]
        title: String,
        #[serde(default)]
        class: String,
        #[serde(default)]
        workspace_token: Option<String>,
        #[serde(default)]
        requests_float: bool,
        #[serde(default)]
        override_redirect: bool,
    },

    /// The surface became visible, with the rules matching it
    Map {
        surface: u64,
        #[serde(default)]
        rules: Vec<WindowRule>,
    },

    Unmap { surface: u64 },

    Destroy { surface: u64 },

    /// The client acknowledged a configure
    AckConfigure { surface: u64, serial: u32 },

    /// A legacy client asked for a new box
    X11ConfigureRequest { surface: u64, rect: Rect },

    TitleChanged { surface: u64, title: String },

    SizeHints {
        surface: u64,
        min: Vec2,
        #[serde(default)]
        max: Option<Vec2>,
    },

    /// The client asked to change its fullscreen state
    FullscreenRequest {
        surface: u64,
        mode: FullscreenMode,
        #[serde(default)]
        output: Option<MonitorId>,
    },

    /// The client reports the fullscreen state it now believes it has
    FullscreenReport { surface: u64, mode: FullscreenMode },

    /// The client asked to be activated
    Activate {
        surface: u64,
        #[serde(default)]
        force: bool,
    },

    /// The rule engine re-matched the window
    UpdateRules { surface: u64, rules: Vec<WindowRule> },

    /// Runtime `setprop name value`
    SetProp { surface: u64, property: String, value: String },

    Swallow { swallower: u64, swallowed: u64 },

    RegisterWorkspaceToken { owner: u64, workspace: WorkspaceId },

    // ------------------------------------------------------------------------
    // User commands
    // ------------------------------------------------------------------------
    Focus { surface: Option<u64> },

    CycleFocus { forward: bool },

    SwitchWorkspace { workspace: WorkspaceId },

    MoveToWorkspace { surface: u64, workspace: WorkspaceId },

    SetWindowBox { surface: u64, rect: Rect },

    Pin { surface: u64, pinned: bool },

    SetFullscreen { surface: u64, mode: FullscreenMode },

    ToggleGroup { surface: u64 },

    LockGroup { surface: u64, locked: bool },

    ChangeGroupActive { surface: u64, forward: bool },

    MoveOutOfGroup { surface: u64 },

    MoveIntoGroup { surface: u64, target: u64 },

    ReloadConfig,
}

fn default_kind() -> SurfaceKind {
    SurfaceKind::Xdg
}

// ============================================================================
// Core → Collaborators
// ============================================================================

/// Notifications emitted by the window core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoreEvent {
    /// A client surface id now refers to `window`
    SurfaceBound { surface: u64, window: WindowHandle },

    WindowOpened { window: WindowHandle, workspace: WorkspaceId },

    /// Unmapped; the window may still fade out
    WindowClosed { window: WindowHandle },

    /// Gone for good, its handle is stale from now on
    WindowReleased { window: WindowHandle },

    /// Ask the client to resize; it answers with the serial
    ConfigureRequest { window: WindowHandle, serial: u32, size: Vec2 },

    /// Legacy configure, no serial
    X11Configure { window: WindowHandle, rect: Rect },

    FocusChanged { window: Option<WindowHandle> },

    Urgent { window: WindowHandle },

    TitleChanged { window: WindowHandle, title: String },

    WorkspaceActivated { monitor: MonitorId, workspace: WorkspaceId },

    WorkspaceTransition {
        window: WindowHandle,
        from: Option<WorkspaceId>,
        to: WorkspaceId,
        floating_offset: Vec2,
    },

    MonitorChanged { window: WindowHandle, monitor: MonitorId },

    Pinned { window: WindowHandle, pinned: bool },

    GroupChanged { head: WindowHandle, current: WindowHandle },

    GroupDissolved { members: Vec<WindowHandle> },

    /// The compositor's own fullscreen state changed
    FullscreenChanged { window: WindowHandle, mode: FullscreenMode },

    /// Tell the client which fullscreen state to assume
    FullscreenState { window: WindowHandle, mode: FullscreenMode },

    Suspended { window: WindowHandle, suspended: bool },

    Swallowed { swallower: WindowHandle, swallowed: WindowHandle },

    /// The core could not act on a client event
    Error { message: String },
}
