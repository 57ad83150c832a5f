//! Focus Module
//!
//! Keyboard focus, focus history and activation requests.

use std::collections::VecDeque;

use tracing::debug;

use crate::desktop::error::DesktopError;
use crate::desktop::flags::SuppressEvents;
use crate::desktop::window::WindowHandle;
use crate::desktop::Desktop;
use crate::ipc::CoreEvent;

/// Focus manager
#[derive(Debug, Clone)]
pub struct FocusManager {
    /// Currently focused window
    focused: Option<WindowHandle>,

    /// Most recently focused first. Entries may be stale.
    history: VecDeque<WindowHandle>,

    /// Maximum history size
    pub max_history_size: usize,
}

impl FocusManager {
    pub fn new() -> Self {
        Self {
            focused: None,
            history: VecDeque::new(),
            max_history_size: 20,
        }
    }

    pub fn focused(&self) -> Option<WindowHandle> {
        self.focused
    }

    pub fn history(&self) -> impl Iterator<Item = WindowHandle> + '_ {
        self.history.iter().copied()
    }

    fn set_focused(&mut self, handle: WindowHandle) {
        self.history.retain(|&h| h != handle);
        self.history.push_front(handle);
        while self.history.len() > self.max_history_size {
            self.history.pop_back();
        }
        self.focused = Some(handle);
    }

    fn clear(&mut self) {
        self.focused = None;
    }

    pub(crate) fn forget(&mut self, handle: WindowHandle) {
        self.history.retain(|&h| h != handle);
        if self.focused == Some(handle) {
            self.focused = None;
        }
    }
}

impl Default for FocusManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Desktop {
    /// Focused window, if it is still alive
    pub fn focused_window(&self) -> Option<WindowHandle> {
        self.focus.focused().filter(|&h| self.valid(h))
    }

    pub fn focus_history(&self) -> Vec<WindowHandle> {
        self.focus.history().filter(|&h| self.valid(h)).collect()
    }

    /// Give keyboard focus to `handle`, or to nothing
    pub fn focus_window(&mut self, handle: Option<WindowHandle>) {
        let old = self.focused_window();

        let Some(handle) = handle else {
            if let Some(old) = old {
                self.focus.clear();
                self.update_focus_visuals(old, false);
                debug!("Cleared focus from {:?}", old);
                self.push_event(CoreEvent::FocusChanged { window: None });
            }
            return;
        };

        let Some(window) = self.window(handle) else {
            debug!("Not focusing stale window {:?}", handle);
            return;
        };
        if !window.flags.mapped || window.data.no_focus.value() {
            debug!("Window {:?} does not take focus", handle);
            return;
        }
        let hidden_member = window.is_hidden() && window.group.is_grouped();
        let workspace = window.workspace().filter(|_| !window.flags.pinned);

        if hidden_member {
            self.set_group_current(handle);
        }
        if let Some(workspace) = workspace {
            self.show_workspace(workspace);
        }

        if old == Some(handle) {
            return;
        }

        self.focus.set_focused(handle);
        if let Some(window) = self.windows.get_mut(handle) {
            window.flags.urgent = false;
            self.focused_monitor = window.monitor().or(self.focused_monitor);
        }
        if let Some(old) = old {
            self.update_focus_visuals(old, false);
        }
        self.update_focus_visuals(handle, true);

        debug!("Focus moved from {:?} to {:?}", old, handle);
        self.push_event(CoreEvent::FocusChanged { window: Some(handle) });
    }

    /// Hand focus to the most recent other window that can take it
    pub(crate) fn focus_next_candidate(&mut self, leaving: WindowHandle) {
        let takes_focus = |desktop: &Desktop, h: WindowHandle| {
            h != leaving
                && desktop.window(h).is_some_and(|w| {
                    w.flags.mapped
                        && !w.is_hidden()
                        && !w.data.no_focus.value()
                        && (w.flags.pinned || w.workspace().is_some_and(|ws| desktop.is_workspace_visible(ws)))
                })
        };

        let from_history = self.focus.history().find(|&h| takes_focus(self, h));
        let candidate = from_history.or_else(|| {
            self.active_workspace()
                .map(|ws| self.visible_windows(ws))
                .and_then(|visible| visible.into_iter().rev().find(|&h| takes_focus(self, h)))
        });
        self.focus_window(candidate);
    }

    /// A client asked to be activated. Marks it urgent; moves focus only
    /// when forced or when the window's policy allows it.
    pub fn activate(&mut self, handle: WindowHandle, force: bool) -> Result<(), DesktopError> {
        if self.focused_window() == Some(handle) {
            return Ok(());
        }
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.flags.urgent = true;

        let focus_on_activate = window.data.focus_on_activate.value();
        let suppressed = window
            .suppressed_events
            .intersects(SuppressEvents::ACTIVATE | SuppressEvents::ACTIVATE_FOCUSONLY);
        let mapped = window.flags.mapped;
        let floating = window.flags.floating;
        let workspace = window.workspace();

        self.push_event(CoreEvent::Urgent { window: handle });

        if !force && (!focus_on_activate || suppressed) {
            debug!("Activation of {:?} only marks it urgent", handle);
            return Ok(());
        }
        if !mapped {
            debug!("Ignoring activation focus for unmapped window {:?}", handle);
            return Ok(());
        }

        if floating {
            if let Some(ws) = workspace.and_then(|id| self.workspaces.get_mut(&id)) {
                ws.raise(handle);
            }
        }
        self.focus_window(Some(handle));
        Ok(())
    }

    fn update_focus_visuals(&mut self, handle: WindowHandle, focused: bool) {
        let animate = self.config.animations.enabled;
        if let Some(window) = self.windows.get_mut(handle) {
            let alpha = if focused {
                window.data.alpha.value().alpha
            } else {
                window.data.alpha_inactive.value().alpha
            };
            window.active_inactive_alpha.set_goal(alpha);
            window.border_fade.set_goal(if focused { 1.0 } else { 0.0 });
            if !animate || window.data.no_anim.value() {
                window.active_inactive_alpha.warp();
                window.border_fade.warp();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::desktop::rules::WindowRule;
    use crate::desktop::testing::{desktop_with_two_workspaces, map_new};
    use crate::desktop::window_data::{BoolProperty, PropertyAssignment};
    use crate::desktop::workspace::WorkspaceId;

    #[test]
    fn test_activation_marks_urgent_without_focus_by_default() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![]);
        let b = map_new(&mut desktop, vec![]);
        assert_eq!(desktop.focused_window(), Some(b));

        desktop.activate(a, false).unwrap();
        assert_eq!(desktop.focused_window(), Some(b));
        assert!(desktop.window(a).unwrap().flags.urgent);

        desktop.activate(a, true).unwrap();
        assert_eq!(desktop.focused_window(), Some(a));
        assert!(!desktop.window(a).unwrap().flags.urgent);
    }

    #[test]
    fn test_focus_on_activate_respects_suppression() {
        let mut config = Config::default();
        config.misc.focus_on_activate = true;
        let mut desktop = desktop_with_two_workspaces(config);
        let a = map_new(&mut desktop, vec![WindowRule::SuppressEvent {
            events: SuppressEvents::ACTIVATE_FOCUSONLY,
        }]);
        let b = map_new(&mut desktop, vec![]);

        desktop.activate(a, false).unwrap();
        assert_eq!(desktop.focused_window(), Some(b));

        desktop.activate(b, false).unwrap();
        desktop.focus_window(Some(a));
        desktop.activate(b, false).unwrap();
        assert_eq!(desktop.focused_window(), Some(b));
    }

    #[test]
    fn test_focusing_window_on_hidden_workspace_shows_it() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![]);
        desktop.move_to_workspace(a, WorkspaceId(2)).unwrap();
        assert!(!desktop.is_workspace_visible(WorkspaceId(2)));

        desktop.focus_window(Some(a));
        assert!(desktop.is_workspace_visible(WorkspaceId(2)));
        assert_eq!(desktop.active_workspace(), Some(WorkspaceId(2)));
    }

    #[test]
    fn test_no_focus_windows_are_skipped() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![]);
        let b = map_new(&mut desktop, vec![WindowRule::Property {
            assignment: PropertyAssignment::Bool { property: BoolProperty::NoFocus, value: true },
        }]);

        assert_eq!(desktop.focused_window(), Some(a));
        desktop.focus_window(Some(b));
        assert_eq!(desktop.focused_window(), Some(a));
    }

    #[test]
    fn test_history_skips_stale_handles() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![]);
        let b = map_new(&mut desktop, vec![]);
        desktop.focus_window(Some(a));
        assert_eq!(desktop.focus_history(), vec![a, b]);

        desktop.on_unmap(a).unwrap();
        assert_eq!(desktop.focused_window(), Some(b));

        desktop.destroy_window(a).unwrap();
        desktop.tick_animations(std::time::Duration::from_secs(5));
        assert!(!desktop.valid(a));
        assert_eq!(desktop.focus_history(), vec![b]);
    }
}
