//! Fixtures shared by the desktop tests

use crate::config::Config;
use crate::desktop::rules::WindowRule;
use crate::desktop::window::WindowHandle;
use crate::desktop::workspace::{Monitor, MonitorId, WorkspaceId};
use crate::desktop::{Desktop, NewWindow};
use crate::shared::Rect;

/// One 1920x1080 monitor with workspaces 1 (active) and 2
pub(crate) fn desktop_with_two_workspaces(config: Config) -> Desktop {
    let mut desktop = Desktop::new(config);
    desktop
        .add_monitor(Monitor::new(MonitorId(0), "DP-1", Rect::new(0.0, 0.0, 1920.0, 1080.0)))
        .unwrap();
    desktop.add_workspace(WorkspaceId(1), "1", MonitorId(0)).unwrap();
    desktop.add_workspace(WorkspaceId(2), "2", MonitorId(0)).unwrap();
    desktop
}

pub(crate) fn map_new(desktop: &mut Desktop, rules: Vec<WindowRule>) -> WindowHandle {
    let window = desktop.create_window(NewWindow::default());
    desktop.on_map(window, rules).unwrap();
    window
}
