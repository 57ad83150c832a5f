//! Cycle Module
//!
//! Window cycling (Alt+Tab) through the active workspace.

use tracing::debug;

use crate::desktop::window::WindowHandle;
use crate::desktop::Desktop;

#[derive(Debug, Clone, Default)]
pub struct CycleState {
    /// Window the last cycle step landed on. May be stale.
    pub last_cycled: Option<WindowHandle>,
}

impl Desktop {
    /// Windows a cycle can land on, in stacking order
    fn cycle_candidates(&self) -> Vec<WindowHandle> {
        let Some(workspace) = self.active_workspace() else {
            return Vec::new();
        };
        self.visible_windows(workspace)
            .into_iter()
            .filter(|&h| self.window(h).is_some_and(|w| !w.data.no_focus.value()))
            .collect()
    }

    /// Focus the next (or previous) window of the active workspace.
    /// Starts from the focused window, or the last cycled one when focus
    /// is elsewhere.
    pub fn cycle_focus(&mut self, forward: bool) -> Option<WindowHandle> {
        let candidates = self.cycle_candidates();
        if candidates.is_empty() {
            debug!("Nothing to cycle through");
            return None;
        }

        let anchor = self
            .focused_window()
            .filter(|h| candidates.contains(h))
            .or_else(|| self.cycle.last_cycled.filter(|h| candidates.contains(h)));

        let len = candidates.len();
        let index = match anchor.and_then(|a| candidates.iter().position(|&h| h == a)) {
            Some(position) if forward => (position + 1) % len,
            Some(position) => (position + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        let target = candidates[index];

        self.cycle.last_cycled = Some(target);
        debug!("Cycling focus to {:?}", target);
        self.focus_window(Some(target));
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::desktop::testing::{desktop_with_two_workspaces, map_new};

    #[test]
    fn test_cycle_wraps_both_ways() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![]);
        let b = map_new(&mut desktop, vec![]);
        let c = map_new(&mut desktop, vec![]);
        assert_eq!(desktop.focused_window(), Some(c));

        assert_eq!(desktop.cycle_focus(true), Some(a));
        assert_eq!(desktop.cycle_focus(true), Some(b));
        assert_eq!(desktop.cycle_focus(false), Some(a));
        assert_eq!(desktop.cycle_focus(false), Some(c));
        assert_eq!(desktop.focused_window(), Some(c));
    }

    #[test]
    fn test_cycle_resumes_from_last_cycled() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![]);
        let b = map_new(&mut desktop, vec![]);

        assert_eq!(desktop.cycle_focus(true), Some(a));
        desktop.focus_window(None);
        assert_eq!(desktop.cycle_focus(true), Some(b));
    }

    #[test]
    fn test_cycle_on_empty_workspace() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        assert_eq!(desktop.cycle_focus(true), None);
    }
}
