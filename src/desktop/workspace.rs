//! Workspace Module
//!
//! Workspaces, monitors, and how windows move between them. Pinned windows
//! are kept out of every member list: they belong to whichever workspace is
//! visible on their monitor.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::desktop::error::DesktopError;
use crate::desktop::fullscreen::FullscreenMode;
use crate::desktop::overridable::OverridePriority;
use crate::desktop::window::WindowHandle;
use crate::desktop::Desktop;
use crate::ipc::CoreEvent;
use crate::shared::{Extents, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(pub u32);

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MonitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Properties forced on every window of a workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceRule {
    pub border_size: Option<i64>,
    pub no_border: Option<bool>,
    pub rounding: Option<i64>,
    pub no_rounding: Option<bool>,
    pub decorate: Option<bool>,
    pub no_shadow: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub monitor: MonitorId,

    /// Member windows, bottom to top
    members: Vec<WindowHandle>,

    /// Window currently covering the workspace, with its mode
    fullscreen: Option<(WindowHandle, FullscreenMode)>,

    pub rule: Option<WorkspaceRule>,
}

impl Workspace {
    pub fn new(id: WorkspaceId, name: impl Into<String>, monitor: MonitorId) -> Self {
        Self {
            id,
            name: name.into(),
            monitor,
            members: Vec::new(),
            fullscreen: None,
            rule: None,
        }
    }

    /// Members in stacking order, bottom first
    pub fn members(&self) -> &[WindowHandle] {
        &self.members
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.members.contains(&handle)
    }

    pub fn fullscreen(&self) -> Option<(WindowHandle, FullscreenMode)> {
        self.fullscreen
    }

    pub fn has_fullscreen(&self) -> bool {
        self.fullscreen.is_some()
    }

    pub(crate) fn set_fullscreen(&mut self, fullscreen: Option<(WindowHandle, FullscreenMode)>) {
        self.fullscreen = fullscreen;
    }

    pub(crate) fn attach(&mut self, handle: WindowHandle) {
        if !self.members.contains(&handle) {
            self.members.push(handle);
        }
    }

    pub(crate) fn detach(&mut self, handle: WindowHandle) {
        self.members.retain(|&h| h != handle);
        if matches!(self.fullscreen, Some((h, _)) if h == handle) {
            self.fullscreen = None;
        }
    }

    /// Move a member to the top of the stack
    pub(crate) fn raise(&mut self, handle: WindowHandle) {
        if let Some(index) = self.members.iter().position(|&h| h == handle) {
            let handle = self.members.remove(index);
            self.members.push(handle);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,
    pub position: Vec2,
    pub size: Vec2,
    /// Space taken by panels and bars
    pub reserved: Extents,
    pub active_workspace: Option<WorkspaceId>,
}

impl Monitor {
    pub fn new(id: MonitorId, name: impl Into<String>, area: Rect) -> Self {
        Self {
            id,
            name: name.into(),
            position: area.pos(),
            size: area.size(),
            reserved: Extents::default(),
            active_workspace: None,
        }
    }

    pub fn area(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Area left for windows once reserved space is taken out
    pub fn work_area(&self) -> Rect {
        self.area().shrink_by(self.reserved)
    }
}

impl Desktop {
    /// Register a monitor
    pub fn add_monitor(&mut self, monitor: Monitor) -> Result<(), DesktopError> {
        if self.monitors.contains_key(&monitor.id) {
            return Err(DesktopError::DuplicateMonitor(monitor.id));
        }
        info!("Monitor {} ({}) added at {:?}", monitor.id, monitor.name, monitor.area());
        if self.focused_monitor.is_none() {
            self.focused_monitor = Some(monitor.id);
        }
        self.monitors.insert(monitor.id, monitor);
        Ok(())
    }

    /// Create a workspace on `monitor`. The first workspace of a monitor
    /// becomes its active one.
    pub fn add_workspace(
        &mut self,
        id: WorkspaceId,
        name: impl Into<String>,
        monitor: MonitorId,
    ) -> Result<(), DesktopError> {
        if self.workspaces.contains_key(&id) {
            return Err(DesktopError::DuplicateWorkspace(id));
        }
        let owner = self.monitors.get_mut(&monitor).ok_or(DesktopError::UnknownMonitor(monitor))?;
        if owner.active_workspace.is_none() {
            owner.active_workspace = Some(id);
        }

        let workspace = Workspace::new(id, name, monitor);
        debug!("Workspace {} ({}) created on monitor {}", id, workspace.name, monitor);
        self.workspaces.insert(id, workspace);
        Ok(())
    }

    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(&id)
    }

    pub fn monitor(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.get(&id)
    }

    pub fn focused_monitor(&self) -> Option<MonitorId> {
        self.focused_monitor
    }

    /// Active workspace of the focused monitor
    pub fn active_workspace(&self) -> Option<WorkspaceId> {
        self.focused_monitor
            .and_then(|id| self.monitors.get(&id))
            .and_then(|monitor| monitor.active_workspace)
    }

    pub fn is_workspace_visible(&self, id: WorkspaceId) -> bool {
        self.workspaces
            .get(&id)
            .and_then(|ws| self.monitors.get(&ws.monitor))
            .is_some_and(|monitor| monitor.active_workspace == Some(id))
    }

    /// Show `id` on its monitor and focus its topmost window
    pub fn switch_workspace(&mut self, id: WorkspaceId) -> Result<(), DesktopError> {
        let monitor = self.workspaces.get(&id).ok_or(DesktopError::UnknownWorkspace(id))?.monitor;
        if !self.monitors.contains_key(&monitor) {
            return Err(DesktopError::UnknownMonitor(monitor));
        }
        if !self.show_workspace(id) {
            debug!("Already on workspace {}", id);
            return Ok(());
        }

        let top = self
            .visible_windows(id)
            .into_iter()
            .rev()
            .find(|&h| self.window(h).is_some_and(|w| !w.data.no_focus.value()));
        self.focus_window(top);
        Ok(())
    }

    /// Make `id` the active workspace of its monitor and focus that
    /// monitor. Returns false if it already was active.
    pub(crate) fn show_workspace(&mut self, id: WorkspaceId) -> bool {
        let Some(monitor_id) = self.workspaces.get(&id).map(|ws| ws.monitor) else {
            return false;
        };
        let Some(monitor) = self.monitors.get_mut(&monitor_id) else {
            return false;
        };
        self.focused_monitor = Some(monitor_id);
        if monitor.active_workspace == Some(id) {
            return false;
        }

        info!("Switching monitor {} from workspace {:?} to {}", monitor_id, monitor.active_workspace, id);
        monitor.active_workspace = Some(id);
        self.push_event(CoreEvent::WorkspaceActivated { monitor: monitor_id, workspace: id });
        true
    }

    /// Windows rendered for workspace `id`, bottom to top: its members,
    /// then the pinned windows of its monitor.
    pub fn visible_windows(&self, id: WorkspaceId) -> Vec<WindowHandle> {
        let Some(workspace) = self.workspaces.get(&id) else {
            return Vec::new();
        };

        let shown = |h: &WindowHandle| self.window(*h).is_some_and(|w| w.flags.mapped && !w.is_hidden());

        let mut visible: Vec<WindowHandle> = workspace.members.iter().copied().filter(shown).collect();
        visible.extend(
            self.windows
                .iter()
                .filter(|(_, w)| w.flags.pinned && w.monitor() == Some(workspace.monitor))
                .map(|(h, _)| h)
                .filter(shown),
        );
        visible
    }

    /// Move a window (and everything travelling with it) to workspace `id`
    pub fn move_to_workspace(&mut self, handle: WindowHandle, id: WorkspaceId) -> Result<(), DesktopError> {
        let window = self.window(handle).ok_or(DesktopError::InvalidWindow)?;
        if !self.workspaces.contains_key(&id) {
            return Err(DesktopError::UnknownWorkspace(id));
        }
        if window.workspace() == Some(id) {
            return Ok(());
        }

        let mut travellers = self.group_members(handle);
        if travellers.is_empty() {
            travellers.push(handle);
        }
        // a swallowed window follows its swallower
        let swallowed: Vec<WindowHandle> = travellers
            .iter()
            .filter_map(|&h| self.window(h).and_then(|w| w.swallowed))
            .filter(|&h| self.window(h).is_some_and(|w| w.flags.currently_swallowed))
            .collect();
        travellers.extend(swallowed);

        for traveller in travellers {
            self.relocate(traveller, id)?;
        }
        Ok(())
    }

    /// Detach `handle` from its workspace and attach it to `target`
    pub(crate) fn relocate(&mut self, handle: WindowHandle, target: WorkspaceId) -> Result<(), DesktopError> {
        let target_monitor = self
            .workspaces
            .get(&target)
            .ok_or(DesktopError::UnknownWorkspace(target))?
            .monitor;
        let window = self.windows.get(handle).ok_or(DesktopError::InvalidWindow)?;
        let from = window.workspace();
        if from == Some(target) {
            return Ok(());
        }
        let old_monitor = window.monitor();
        let fullscreen_mode = window.fullscreen.internal;

        if window.flags.pinned {
            debug!("Pinned window {:?} now bookkept on workspace {}", handle, target);
            if let Some(window) = self.windows.get_mut(handle) {
                window.set_workspace(Some(target), window.monitor());
            }
            return Ok(());
        }

        if let Some(workspace) = from.and_then(|id| self.workspaces.get_mut(&id)) {
            workspace.detach(handle);
        }

        let old_origin = old_monitor.and_then(|id| self.monitors.get(&id)).map(|m| m.position);
        let new_origin = self.monitors.get(&target_monitor).map(|m| m.position);

        let Some(window) = self.windows.get_mut(handle) else {
            return Err(DesktopError::InvalidWindow);
        };
        if window.flags.floating {
            if let (Some(old_origin), Some(new_origin)) = (old_origin, new_origin) {
                let offset = window.geometry.real_position.goal() - old_origin;
                window.geometry.floating_offset = offset;
                if old_monitor != Some(target_monitor) {
                    let position = new_origin + offset;
                    window.geometry.position = position;
                    window.geometry.real_position.set_goal(position);
                }
            }
        }
        window.last_workspace = from;
        window.set_workspace(Some(target), Some(target_monitor));
        // the launch token no longer describes where this window lives
        window.initial_workspace_token = None;
        let floating_offset = window.geometry.floating_offset;

        let target_ws = self
            .workspaces
            .get_mut(&target)
            .ok_or(DesktopError::UnknownWorkspace(target))?;
        target_ws.attach(handle);

        if fullscreen_mode != FullscreenMode::None {
            if target_ws.has_fullscreen() {
                debug!("Workspace {} already has a fullscreen window, dropping fullscreen of {:?}", target, handle);
                self.set_fullscreen_internal(handle, FullscreenMode::None)?;
            } else {
                target_ws.set_fullscreen(Some((handle, fullscreen_mode)));
            }
        }

        debug!("Window {:?} moved from workspace {:?} to {}", handle, from, target);
        self.push_event(CoreEvent::WorkspaceTransition {
            window: handle,
            from,
            to: target,
            floating_offset,
        });
        if old_monitor != Some(target_monitor) {
            self.push_event(CoreEvent::MonitorChanged { window: handle, monitor: target_monitor });
        }
        self.update_window_data(handle)?;
        Ok(())
    }

    /// Pin or unpin a floating window. Pinned windows show on every
    /// workspace of their monitor; unpinning lands the window on the
    /// workspace it is bookkept on.
    pub fn set_pinned(&mut self, handle: WindowHandle, pinned: bool) -> Result<bool, DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        if window.flags.pinned == pinned {
            return Ok(false);
        }
        if pinned && !window.flags.floating {
            debug!("Refusing to pin tiled window {:?}", handle);
            return Ok(false);
        }

        window.flags.pinned = pinned;
        let workspace = window.workspace();

        if let Some(ws) = workspace.and_then(|id| self.workspaces.get_mut(&id)) {
            let monitor = ws.monitor;
            if pinned {
                ws.detach(handle);
            } else {
                ws.attach(handle);
                if let Some(window) = self.windows.get_mut(handle) {
                    window.set_workspace(workspace, Some(monitor));
                }
            }
        }

        debug!("Window {:?} pinned: {}", handle, pinned);
        self.push_event(CoreEvent::Pinned { window: handle, pinned });
        Ok(true)
    }

    /// Install (or clear) the rule of workspace `id` and refresh its windows
    pub fn set_workspace_rule(&mut self, id: WorkspaceId, rule: Option<WorkspaceRule>) -> Result<(), DesktopError> {
        let workspace = self.workspaces.get_mut(&id).ok_or(DesktopError::UnknownWorkspace(id))?;
        workspace.rule = rule;

        let affected: Vec<WindowHandle> = self
            .windows
            .iter()
            .filter(|(_, w)| w.workspace() == Some(id))
            .map(|(h, _)| h)
            .collect();
        for handle in affected {
            self.update_window_data(handle)?;
        }
        Ok(())
    }

    /// Re-resolve workspace rule overrides, then window rules on top of them
    pub fn update_window_data(&mut self, handle: WindowHandle) -> Result<(), DesktopError> {
        let rule = self
            .window(handle)
            .ok_or(DesktopError::InvalidWindow)?
            .workspace()
            .and_then(|id| self.workspaces.get(&id))
            .and_then(|ws| ws.rule.clone());

        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.data.unset(OverridePriority::WorkspaceRule);
        if let Some(rule) = rule {
            let data = &mut window.data;
            let priority = OverridePriority::WorkspaceRule;
            if let Some(size) = rule.border_size {
                data.border_size.set(size, priority);
            }
            if let Some(no_border) = rule.no_border {
                data.no_border.set(no_border, priority);
            }
            if let Some(rounding) = rule.rounding {
                data.rounding.set(rounding, priority);
            }
            if let Some(no_rounding) = rule.no_rounding {
                data.no_rounding.set(no_rounding, priority);
            }
            if let Some(decorate) = rule.decorate {
                data.decorate.set(decorate, priority);
            }
            if let Some(no_shadow) = rule.no_shadow {
                data.no_shadow.set(no_shadow, priority);
            }
        }
        window.update_dynamic_rules();
        self.refresh_decorations(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::desktop::rules::WindowRule;
    use crate::desktop::testing::{desktop_with_two_workspaces, map_new};

    #[test]
    fn test_move_detaches_and_attaches() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let window = map_new(&mut desktop, vec![]);
        assert!(desktop.workspace(WorkspaceId(1)).unwrap().contains(window));

        desktop.take_events();
        desktop.move_to_workspace(window, WorkspaceId(2)).unwrap();

        assert!(!desktop.workspace(WorkspaceId(1)).unwrap().contains(window));
        assert!(desktop.workspace(WorkspaceId(2)).unwrap().contains(window));
        assert_eq!(desktop.window(window).unwrap().workspace(), Some(WorkspaceId(2)));
        assert!(desktop.take_events().iter().any(|e| matches!(
            e,
            CoreEvent::WorkspaceTransition { to: WorkspaceId(2), from: Some(WorkspaceId(1)), .. }
        )));
    }

    #[test]
    fn test_pinned_window_visible_on_every_workspace_of_its_monitor() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let window = map_new(&mut desktop, vec![WindowRule::Float, WindowRule::Pin]);
        assert!(desktop.window(window).unwrap().flags.pinned);

        desktop.move_to_workspace(window, WorkspaceId(2)).unwrap();

        // bookkeeping moved, membership did not
        assert_eq!(desktop.window(window).unwrap().workspace(), Some(WorkspaceId(2)));
        assert!(!desktop.workspace(WorkspaceId(2)).unwrap().contains(window));
        assert!(desktop.visible_windows(WorkspaceId(1)).contains(&window));
        assert!(desktop.visible_windows(WorkspaceId(2)).contains(&window));

        desktop.set_pinned(window, false).unwrap();
        assert!(!desktop.visible_windows(WorkspaceId(1)).contains(&window));
        assert!(desktop.visible_windows(WorkspaceId(2)).contains(&window));
    }

    #[test]
    fn test_tiled_windows_cannot_be_pinned() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let window = map_new(&mut desktop, vec![WindowRule::Tile]);
        assert_eq!(desktop.set_pinned(window, true), Ok(false));
    }

    #[test]
    fn test_workspace_rule_sits_below_window_rules() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let window = map_new(&mut desktop, vec![WindowRule::Property {
            assignment: crate::desktop::window_data::PropertyAssignment::parse("rounding", "3").unwrap(),
        }]);

        desktop
            .set_workspace_rule(WorkspaceId(1), Some(WorkspaceRule {
                rounding: Some(10),
                border_size: Some(7),
                ..Default::default()
            }))
            .unwrap();

        let data = &desktop.window(window).unwrap().data;
        assert_eq!(data.rounding.value(), 3);
        assert_eq!(data.border_size.value(), 7);

        desktop.move_to_workspace(window, WorkspaceId(2)).unwrap();
        assert_eq!(desktop.window(window).unwrap().data.border_size.value(), Config::default().general.border_size);
    }

    #[test]
    fn test_unknown_targets() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let window = map_new(&mut desktop, vec![]);
        assert_eq!(
            desktop.move_to_workspace(window, WorkspaceId(99)),
            Err(DesktopError::UnknownWorkspace(WorkspaceId(99)))
        );
        assert_eq!(
            desktop.add_workspace(WorkspaceId(3), "3", MonitorId(9)),
            Err(DesktopError::UnknownMonitor(MonitorId(9)))
        );
    }

    #[test]
    fn test_floating_offset_survives_monitor_change() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        desktop
            .add_monitor(Monitor::new(MonitorId(1), "DP-2", Rect::new(1920.0, 0.0, 1920.0, 1080.0)))
            .unwrap();
        desktop.add_workspace(WorkspaceId(3), "3", MonitorId(1)).unwrap();

        let window = map_new(&mut desktop, vec![WindowRule::Float]);
        desktop.set_window_box(window, Rect::new(100.0, 50.0, 400.0, 300.0), false).unwrap();

        desktop.move_to_workspace(window, WorkspaceId(3)).unwrap();
        let w = desktop.window(window).unwrap();
        assert_eq!(w.monitor(), Some(MonitorId(1)));
        assert_eq!(w.geometry.floating_offset, Vec2::new(100.0, 50.0));
        assert_eq!(w.geometry.real_position.goal(), Vec2::new(2020.0, 50.0));
    }
}
