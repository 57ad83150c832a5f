//! Fullscreen state
//!
//! A window carries two fullscreen modes. `internal` decides placement and
//! is owned by the compositor; `client` is what the client believes, and
//! only changes when the client reports a mode or is told one. Either can
//! move without the other.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::desktop::error::DesktopError;
use crate::desktop::flags::SuppressEvents;
use crate::desktop::window::WindowHandle;
use crate::desktop::workspace::MonitorId;
use crate::desktop::Desktop;
use crate::ipc::CoreEvent;
use crate::shared::Rect;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FullscreenMode {
    #[default]
    None,
    /// Covers the monitor's work area
    Maximized,
    /// Covers the whole monitor
    Fullscreen,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullscreenState {
    pub internal: FullscreenMode,
    pub client: FullscreenMode,
}

impl Desktop {
    /// Change where the compositor places the window. The client-visible
    /// mode is left alone.
    pub fn set_fullscreen_internal(&mut self, handle: WindowHandle, mode: FullscreenMode) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        let old = window.fullscreen.internal;
        if old == mode {
            return Ok(());
        }

        if !window.flags.mapped {
            debug!("Window {:?} not mapped, recording fullscreen {:?} for map", handle, mode);
            window.fullscreen.internal = mode;
            return Ok(());
        }

        let workspace_id = window.workspace();
        let monitor = window
            .monitor()
            .and_then(|id| self.monitors.get(&id))
            .map(|m| (m.area(), m.work_area()));

        // one fullscreen window per workspace
        if mode != FullscreenMode::None {
            let other = workspace_id
                .and_then(|id| self.workspaces.get(&id))
                .and_then(|ws| ws.fullscreen())
                .map(|(h, _)| h)
                .filter(|&h| h != handle);
            if let Some(other) = other {
                debug!("Dropping fullscreen of {:?} for {:?}", other, handle);
                self.set_fullscreen_internal(other, FullscreenMode::None)?;
            }
        }

        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        let current = window.box_goal();
        if old == FullscreenMode::None {
            window.geometry.pre_fullscreen = Some(current);
        }
        window.fullscreen.internal = mode;

        let target: Rect = match (mode, monitor) {
            (FullscreenMode::Fullscreen, Some((area, _))) => area,
            (FullscreenMode::Maximized, Some((_, work_area))) => work_area,
            (FullscreenMode::None, _) => window.geometry.pre_fullscreen.take().unwrap_or(current),
            (_, None) => current,
        };

        if let Some(workspace) = workspace_id.and_then(|id| self.workspaces.get_mut(&id)) {
            if mode == FullscreenMode::None {
                if workspace.fullscreen().is_some_and(|(h, _)| h == handle) {
                    workspace.set_fullscreen(None);
                }
            } else {
                workspace.set_fullscreen(Some((handle, mode)));
                workspace.raise(handle);
            }
        }

        debug!("Window {:?} internal fullscreen {:?} -> {:?}", handle, old, mode);
        self.set_window_box(handle, target, true)?;
        self.refresh_decorations(handle);
        self.push_event(CoreEvent::FullscreenChanged { window: handle, mode });
        Ok(())
    }

    /// Tell the client which mode it is in. Returns false when the client
    /// already holds that mode and nothing was sent.
    pub fn set_fullscreen_client(&mut self, handle: WindowHandle, mode: FullscreenMode) -> Result<bool, DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        if window.fullscreen.client == mode {
            debug!("Client of {:?} already in {:?}, not notifying", handle, mode);
            return Ok(false);
        }
        window.fullscreen.client = mode;
        self.push_event(CoreEvent::FullscreenState { window: handle, mode });
        Ok(true)
    }

    /// Set both modes explicitly
    pub fn set_window_fullscreen_state(&mut self, handle: WindowHandle, state: FullscreenState) -> Result<(), DesktopError> {
        self.set_fullscreen_internal(handle, state.internal)?;
        self.set_fullscreen_client(handle, state.client)?;
        Ok(())
    }

    /// The client reported the mode it is in
    pub fn on_client_fullscreen_report(&mut self, handle: WindowHandle, mode: FullscreenMode) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        debug!("Client of {:?} reports fullscreen {:?}", handle, mode);
        window.fullscreen.client = mode;
        Ok(())
    }

    /// The client asked to enter or leave a mode, optionally on a specific
    /// monitor. Returns false when the request was suppressed.
    pub fn on_client_fullscreen_request(
        &mut self,
        handle: WindowHandle,
        requested: FullscreenMode,
        output: Option<MonitorId>,
    ) -> Result<bool, DesktopError> {
        let window = self.windows.get(handle).ok_or(DesktopError::InvalidWindow)?;
        let suppressed = window.suppressed_events;

        let gate = match (requested, window.fullscreen.internal) {
            (FullscreenMode::Fullscreen, _) | (FullscreenMode::None, FullscreenMode::Fullscreen) => SuppressEvents::FULLSCREEN,
            (FullscreenMode::Maximized, _) | (FullscreenMode::None, FullscreenMode::Maximized) => SuppressEvents::MAXIMIZE,
            (FullscreenMode::None, FullscreenMode::None) => SuppressEvents::empty(),
        };
        if !gate.is_empty() && suppressed.intersects(gate) {
            debug!("Suppressed {:?} request from {:?}", requested, handle);
            // the client still expects an answer
            let client = window.fullscreen.client;
            self.push_event(CoreEvent::FullscreenState { window: handle, mode: client });
            return Ok(false);
        }

        let sync = window.data.sync_fullscreen.value();
        let client = if sync { requested } else { window.fullscreen.client };

        if requested == FullscreenMode::Fullscreen && !suppressed.contains(SuppressEvents::FULLSCREEN_OUTPUT) {
            let target = output
                .filter(|&id| Some(id) != window.monitor())
                .and_then(|id| self.monitors.get(&id))
                .and_then(|m| m.active_workspace);
            if let Some(workspace) = target {
                self.move_to_workspace(handle, workspace)?;
            }
        }

        self.set_window_fullscreen_state(handle, FullscreenState { internal: requested, client })?;
        Ok(true)
    }
}
