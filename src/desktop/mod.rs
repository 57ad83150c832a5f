//! Desktop Module
//!
//! The window registry. Every window lives in one generation-checked map
//! and everything else (workspaces, groups, focus history, swallow links)
//! refers to windows by [`WindowHandle`], re-validating on each use.
//!
//! Outbound notifications are queued as [`CoreEvent`]s and drained by the
//! embedding loop with [`Desktop::take_events`].

pub mod animation;
pub mod cycle;
pub mod decorations;
pub mod error;
pub mod flags;
pub mod focus;
pub mod fullscreen;
pub mod group;
pub mod overridable;
pub mod resize;
pub mod rules;
pub mod tokens;
pub mod window;
pub mod window_data;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use slotmap::SlotMap;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::ipc::CoreEvent;
use crate::shared::{Rect, Vec2};

pub use error::DesktopError;
pub use flags::{BoxProps, GroupRules, SuppressEvents};
pub use fullscreen::{FullscreenMode, FullscreenState};
pub use overridable::{OverridableVar, OverridePriority};
pub use rules::WindowRule;
pub use window::{SizeRequest, SurfaceKind, Window, WindowHandle};
pub use window_data::PropertyAssignment;
pub use workspace::{Monitor, MonitorId, Workspace, WorkspaceId, WorkspaceRule};

use cycle::CycleState;
use decorations::{BorderDecoration, DecorationType};
use focus::FocusManager;
use tokens::WorkspaceTokens;

/// Description of a freshly created client surface
#[derive(Debug, Clone)]
pub struct NewWindow {
    pub kind: SurfaceKind,
    pub title: String,
    pub class: String,
    /// Launch token naming the workspace to open on
    pub workspace_token: Option<String>,
    /// The client asked to float (dialogs, fixed size)
    pub requests_float: bool,
    /// Legacy surface placing itself
    pub override_redirect: bool,
}

impl Default for NewWindow {
    fn default() -> Self {
        Self {
            kind: SurfaceKind::Xdg,
            title: String::new(),
            class: String::new(),
            workspace_token: None,
            requests_float: false,
            override_redirect: false,
        }
    }
}

/// What static rules decided for a first map
#[derive(Debug, Default)]
struct InitialPlacement {
    floating: Option<bool>,
    pseudo: bool,
    pin: bool,
    no_initial_focus: bool,
    fullscreen: FullscreenMode,
    workspace: Option<WorkspaceId>,
    monitor: Option<MonitorId>,
    suppress: SuppressEvents,
}

impl InitialPlacement {
    fn from_rules(rules: &[WindowRule]) -> Self {
        let mut placement = Self::default();
        for rule in rules {
            match rule {
                WindowRule::Float => placement.floating = Some(true),
                WindowRule::Tile => placement.floating = Some(false),
                WindowRule::Fullscreen => placement.fullscreen = FullscreenMode::Fullscreen,
                WindowRule::Maximize => placement.fullscreen = FullscreenMode::Maximized,
                WindowRule::Pin => placement.pin = true,
                WindowRule::Pseudo => placement.pseudo = true,
                WindowRule::NoInitialFocus => placement.no_initial_focus = true,
                WindowRule::Workspace { id } => placement.workspace = Some(*id),
                WindowRule::Monitor { id } => placement.monitor = Some(*id),
                WindowRule::SuppressEvent { events } => placement.suppress |= *events,
                _ => {}
            }
        }
        placement
    }
}

pub struct Desktop {
    config: Config,
    windows: SlotMap<WindowHandle, Window>,
    workspaces: BTreeMap<WorkspaceId, Workspace>,
    monitors: BTreeMap<MonitorId, Monitor>,
    focused_monitor: Option<MonitorId>,
    focus: FocusManager,
    cycle: CycleState,
    tokens: WorkspaceTokens,
    events: Vec<CoreEvent>,
}

impl Desktop {
    pub fn new(config: Config) -> Self {
        let token_timeout = Duration::from_secs(config.misc.workspace_token_timeout_secs);
        Self {
            config,
            windows: SlotMap::with_key(),
            workspaces: BTreeMap::new(),
            monitors: BTreeMap::new(),
            focused_monitor: None,
            focus: FocusManager::new(),
            cycle: CycleState::default(),
            tokens: WorkspaceTokens::new(token_timeout),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Swap in a reloaded config and refresh every window's defaults
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.tokens
            .set_timeout(Duration::from_secs(self.config.misc.workspace_token_timeout_secs));
        let handles: Vec<WindowHandle> = self.windows.keys().collect();
        for handle in handles {
            if let Some(window) = self.windows.get_mut(handle) {
                window.data.load_config_defaults(&self.config);
                window.resize.set_max_pending(self.config.resize.max_pending_acks);
            }
            self.refresh_decorations(handle);
        }
        info!("Configuration applied to {} windows", self.windows.len());
    }

    pub fn valid(&self, handle: WindowHandle) -> bool {
        self.windows.contains_key(handle)
    }

    pub fn valid_mapped(&self, handle: WindowHandle) -> bool {
        self.windows.get(handle).is_some_and(|w| w.flags.mapped)
    }

    pub fn window(&self, handle: WindowHandle) -> Option<&Window> {
        self.windows.get(handle)
    }

    pub fn window_mut(&mut self, handle: WindowHandle) -> Option<&mut Window> {
        self.windows.get_mut(handle)
    }

    pub fn windows(&self) -> impl Iterator<Item = (WindowHandle, &Window)> {
        self.windows.iter()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub(crate) fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    /// Drain queued notifications
    pub fn take_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    fn animates(&self, handle: WindowHandle) -> bool {
        self.config.animations.enabled && self.window(handle).is_some_and(|w| !w.data.no_anim.value())
    }

    /// Token a launcher hands to the program it starts
    pub fn register_workspace_token(&mut self, owner: WindowHandle, workspace: WorkspaceId) -> Result<String, DesktopError> {
        if !self.valid(owner) {
            return Err(DesktopError::InvalidWindow);
        }
        if !self.workspaces.contains_key(&workspace) {
            return Err(DesktopError::UnknownWorkspace(workspace));
        }
        Ok(self.tokens.register(owner, workspace, Instant::now()))
    }

    /// Register a new client surface. It stays invisible until mapped.
    pub fn create_window(&mut self, new: NewWindow) -> WindowHandle {
        let config = &self.config;
        let handle = self.windows.insert_with_key(|key| {
            let mut window = Window::new(key, new.kind, config);
            window.title = new.title.clone();
            window.class = new.class.clone();
            window.initial_workspace_token = new.workspace_token.clone();
            window.flags.requests_float = new.requests_float;
            window.flags.override_redirect = new.override_redirect;
            window
        });
        debug!("Created window {:?} ({:?}, class {:?})", handle, new.kind, new.class);
        handle
    }

    /// The client's own size limits
    pub fn set_size_hints(&mut self, handle: WindowHandle, min: Vec2, max: Option<Vec2>) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.requested_min_size = min;
        window.requested_max_size = max;
        Ok(())
    }

    /// The client surface became visible. `rules` are the rules matching
    /// the window right now, in match order.
    pub fn on_map(&mut self, handle: WindowHandle, rules: Vec<WindowRule>) -> Result<(), DesktopError> {
        let window = self.windows.get(handle).ok_or(DesktopError::InvalidWindow)?;
        if window.flags.mapped {
            debug!("Window {:?} is already mapped", handle);
            return Ok(());
        }
        let first_map = !window.flags.ever_mapped;
        let token = window.initial_workspace_token.clone();
        let previous_workspace = window.workspace().or(window.last_workspace);

        let placement = if first_map {
            InitialPlacement::from_rules(&rules)
        } else {
            InitialPlacement::default()
        };

        let token_workspace = match token.as_deref() {
            Some(token) if first_map && self.config.misc.initial_workspace_tracking => {
                let windows = &self.windows;
                let resolved = self.tokens.resolve(token, Instant::now(), |owner| windows.contains_key(owner));
                if resolved.is_some() {
                    // a launch token places one window
                    self.tokens.remove(token);
                }
                resolved
            }
            _ => None,
        };

        let exists = |id: &WorkspaceId| self.workspaces.contains_key(id);
        let monitor_workspace = placement
            .monitor
            .filter(|id| self.monitors.contains_key(id))
            .or(self.focused_monitor)
            .and_then(|id| self.monitors.get(&id))
            .and_then(|m| m.active_workspace);
        let workspace = if first_map {
            placement.workspace.filter(exists).or(token_workspace.filter(exists)).or(monitor_workspace)
        } else {
            previous_workspace.filter(exists).or(monitor_workspace)
        }
        .ok_or(DesktopError::NoWorkspace)?;

        let monitor_id = self
            .workspaces
            .get(&workspace)
            .ok_or(DesktopError::UnknownWorkspace(workspace))?
            .monitor;
        let work_area = self
            .monitors
            .get(&monitor_id)
            .ok_or(DesktopError::UnknownMonitor(monitor_id))?
            .work_area();

        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.set_matched_rules(rules);
        window.group_rules = rules::group_rules_of(window.matched_rules());
        window.flags.mapped = true;
        window.flags.first_map = first_map;
        window.flags.fading_out = false;
        window.geometry.closed_box = None;
        if first_map {
            window.flags.floating = placement.floating.unwrap_or(window.flags.requests_float);
            window.flags.pseudotiled = placement.pseudo;
            window.flags.no_initial_focus = placement.no_initial_focus;
            window.suppressed_events |= placement.suppress;
            window.initial_title = window.title.clone();
            window.initial_class = window.class.clone();
        }
        window.set_workspace(Some(workspace), Some(monitor_id));
        let floating = window.flags.floating;
        let pinned = window.flags.pinned;
        let recorded_fullscreen = window.fullscreen.internal;
        window.fullscreen.internal = FullscreenMode::None;

        let initial_box = if floating {
            let wanted = if window.geometry.last_floating_size == Vec2::ZERO {
                window.geometry.pseudo_size
            } else {
                window.geometry.last_floating_size
            };
            let size = wanted.clamp(
                Vec2::new(window::MIN_WINDOW_SIZE, window::MIN_WINDOW_SIZE),
                work_area.size(),
            );
            let middle = work_area.middle();
            Rect::from_parts(Vec2::new(middle.x - size.x / 2.0, middle.y - size.y / 2.0), size)
        } else {
            work_area
        };

        // a member hidden by its group may come back on its own
        self.apply_hidden(handle, false);

        if !pinned {
            if let Some(ws) = self.workspaces.get_mut(&workspace) {
                ws.attach(handle);
            }
        }

        info!("Mapped window {:?} on workspace {} (first map: {})", handle, workspace, first_map);
        self.push_event(CoreEvent::WindowOpened { window: handle, workspace });

        self.update_window_data(handle)?;
        self.place(handle, initial_box, false)?;
        if floating {
            if let Some(window) = self.windows.get_mut(handle) {
                window.clamp_window_size(None, None);
                window.geometry.real_position.warp();
                window.geometry.real_size.warp();
            }
        }
        self.send_window_size(handle, false)?;

        let animate = self.animates(handle);
        if let Some(window) = self.windows.get_mut(handle) {
            window.alpha.set_value_and_warp(0.0);
            window.alpha.set_goal(1.0);
            if !animate {
                window.alpha.warp();
            }
        }

        self.auto_group(handle);
        self.apply_group_rules(handle);

        let fullscreen = if placement.fullscreen != FullscreenMode::None {
            placement.fullscreen
        } else {
            recorded_fullscreen
        };
        if fullscreen != FullscreenMode::None {
            self.set_fullscreen_internal(handle, fullscreen)?;
            if self.window(handle).is_some_and(|w| w.data.sync_fullscreen.value()) {
                self.set_fullscreen_client(handle, fullscreen)?;
            }
        }

        if placement.pin {
            self.set_pinned(handle, true)?;
        }

        let takes_focus = self
            .window(handle)
            .is_some_and(|w| !w.flags.no_initial_focus && !w.data.no_focus.value());
        if takes_focus {
            self.focus_window(Some(handle));
        }

        if let Some(window) = self.windows.get_mut(handle) {
            window.flags.first_map = false;
            window.flags.ever_mapped = true;
        }
        Ok(())
    }

    /// The client surface went away. The window fades out and stays
    /// around until [`Desktop::destroy_window`] and the fade both finish.
    pub fn on_unmap(&mut self, handle: WindowHandle) -> Result<(), DesktopError> {
        let animate = self.animates(handle);
        let was_focused = self.focused_window() == Some(handle);
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        if !window.flags.mapped {
            debug!("Window {:?} is not mapped", handle);
            return Ok(());
        }

        let closed_box = window.main_surface_box();
        window.geometry.closed_box = Some(closed_box);
        window.flags.mapped = false;
        window.flags.fading_out = true;
        window.alpha.set_goal(0.0);
        if !animate {
            window.alpha.warp();
        }
        let workspace = window.workspace();
        let swallowed = window.swallowed.take();

        info!("Unmapped window {:?}", handle);

        self.remove_from_group(handle);
        if let Some(ws) = workspace.and_then(|id| self.workspaces.get_mut(&id)) {
            ws.detach(handle);
        }

        // hand the place back to the window we were hiding
        let restored = swallowed.filter(|&s| self.valid_mapped(s));
        if let Some(restored) = restored {
            if let Some(window) = self.windows.get_mut(restored) {
                window.flags.currently_swallowed = false;
            }
            self.apply_hidden(restored, false);
            if let Some(workspace) = workspace {
                self.relocate(restored, workspace)?;
            }
            self.set_window_box(restored, closed_box, false)?;
            debug!("Restored swallowed window {:?}", restored);
        }

        if let Some(owner) = self.swallower_of(handle) {
            if let Some(window) = self.windows.get_mut(owner) {
                window.swallowed = None;
            }
        }

        if self.focused_window() == Some(handle) || (was_focused && self.focused_window().is_none()) {
            match restored {
                Some(restored) => self.focus_window(Some(restored)),
                None => self.focus_next_candidate(handle),
            }
        }

        self.push_event(CoreEvent::WindowClosed { window: handle });

        if !animate {
            self.finish_fade(handle);
        }
        Ok(())
    }

    /// The client surface was destroyed
    pub fn destroy_window(&mut self, handle: WindowHandle) -> Result<(), DesktopError> {
        if self.valid_mapped(handle) {
            self.on_unmap(handle)?;
        }
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.flags.ready_to_delete = true;
        if !window.flags.fading_out {
            self.release_window(handle)?;
        }
        Ok(())
    }

    fn finish_fade(&mut self, handle: WindowHandle) {
        let Some(window) = self.windows.get_mut(handle) else {
            return;
        };
        window.flags.fading_out = false;
        if window.flags.ready_to_delete {
            if let Err(err) = self.release_window(handle) {
                warn!("Failed to release window {:?}: {}", handle, err);
            }
        }
    }

    /// Drop a window for good. Every handle to it goes stale.
    pub fn release_window(&mut self, handle: WindowHandle) -> Result<(), DesktopError> {
        let window = self.windows.get(handle).ok_or(DesktopError::InvalidWindow)?;
        let workspace = window.workspace();

        self.remove_from_group(handle);
        if let Some(ws) = workspace.and_then(|id| self.workspaces.get_mut(&id)) {
            ws.detach(handle);
        }
        self.focus.forget(handle);
        if self.cycle.last_cycled == Some(handle) {
            self.cycle.last_cycled = None;
        }
        for (_, other) in self.windows.iter_mut() {
            if other.swallowed == Some(handle) {
                other.swallowed = None;
            }
        }

        self.windows.remove(handle);
        info!("Released window {:?}", handle);
        self.push_event(CoreEvent::WindowReleased { window: handle });
        Ok(())
    }

    /// Replace the matched rule set after the rule engine re-matched
    pub fn update_rules(&mut self, handle: WindowHandle, rules: Vec<WindowRule>) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.group_rules = rules::group_rules_of(&rules);
        window.set_matched_rules(rules);
        self.update_dynamic_rules(handle)
    }

    pub fn update_dynamic_rules(&mut self, handle: WindowHandle) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.update_dynamic_rules();
        self.refresh_decorations(handle);
        Ok(())
    }

    pub fn set_prop(&mut self, handle: WindowHandle, assignment: PropertyAssignment) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        debug!("set_prop on {:?}: {:?}", handle, assignment);
        window.set_prop(assignment);
        self.refresh_decorations(handle);
        Ok(())
    }

    pub fn unset_window_data(&mut self, handle: WindowHandle, priority: OverridePriority) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.unset_window_data(priority);
        self.refresh_decorations(handle);
        Ok(())
    }

    pub fn set_title(&mut self, handle: WindowHandle, title: impl Into<String>) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.title = title.into();
        let title = window.title.clone();
        self.push_event(CoreEvent::TitleChanged { window: handle, title });
        Ok(())
    }

    /// Hide or show a window. Hiding the focused window moves focus on.
    ///
    /// Grouped windows go through their group: showing a member makes it
    /// current, hiding the current member shows the next one, and the
    /// only member of a group stays shown.
    pub fn set_hidden(&mut self, handle: WindowHandle, hidden: bool) -> Result<(), DesktopError> {
        if !self.valid(handle) {
            return Err(DesktopError::InvalidWindow);
        }
        if self.is_grouped(handle) {
            let current = self.group_current(handle) == Some(handle);
            match (hidden, current) {
                (false, false) => {
                    self.set_group_current(handle);
                }
                (true, true) if self.group_size(handle) > 1 => {
                    self.change_group_active(handle, true);
                }
                (true, true) => debug!("Not hiding {:?}, the only member of its group", handle),
                _ => {}
            }
            return Ok(());
        }
        self.apply_hidden(handle, hidden);
        if hidden && self.focused_window() == Some(handle) {
            self.focus_next_candidate(handle);
        }
        Ok(())
    }

    /// Flip the hidden flag and suspend accordingly, leaving focus alone
    pub(crate) fn apply_hidden(&mut self, handle: WindowHandle, hidden: bool) {
        let Some(window) = self.windows.get_mut(handle) else {
            return;
        };
        if window.set_hidden(hidden) && window.set_suspended(hidden) {
            self.push_event(CoreEvent::Suspended { window: handle, suspended: hidden });
        }
    }

    pub fn set_suspended(&mut self, handle: WindowHandle, suspended: bool) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        if window.set_suspended(suspended) {
            self.push_event(CoreEvent::Suspended { window: handle, suspended });
        }
        Ok(())
    }

    /// Set both the layout box and the animated box without telling the
    /// client
    fn place(&mut self, handle: WindowHandle, rect: Rect, animate: bool) -> Result<(), DesktopError> {
        let animate = animate && self.animates(handle);
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.geometry.position = rect.pos();
        window.geometry.size = rect.size();
        window.geometry.real_position.set_goal(rect.pos());
        window.geometry.real_size.set_goal(rect.size());
        if !animate {
            window.geometry.real_position.warp();
            window.geometry.real_size.warp();
        }
        if window.flags.floating && !window.is_fullscreen() {
            window.geometry.last_floating_position = rect.pos();
            window.geometry.last_floating_size = rect.size();
        }
        Ok(())
    }

    /// Move and resize a window, as the layout decided
    pub fn set_window_box(&mut self, handle: WindowHandle, rect: Rect, animate: bool) -> Result<(), DesktopError> {
        self.place(handle, rect, animate)?;
        self.send_window_size(handle, false)
    }

    pub fn clamp_window_size(
        &mut self,
        handle: WindowHandle,
        min: Option<Vec2>,
        max: Option<Vec2>,
    ) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        window.clamp_window_size(min, max);
        self.send_window_size(handle, false)
    }

    pub fn window_box_unified(&self, handle: WindowHandle, props: BoxProps) -> Option<Rect> {
        let window = self.window(handle)?;
        let monitor = window.monitor().and_then(|id| self.monitors.get(&id)).map(|m| m.area());
        Some(window.window_box_unified(props, monitor))
    }

    /// Tell the client about its size if it changed (or always, with `force`)
    pub fn send_window_size(&mut self, handle: WindowHandle, force: bool) -> Result<(), DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        match window.send_window_size(force) {
            Some(SizeRequest::Configure(ack)) => self.push_event(CoreEvent::ConfigureRequest {
                window: handle,
                serial: ack.serial,
                size: ack.size,
            }),
            Some(SizeRequest::X11(rect)) => self.push_event(CoreEvent::X11Configure { window: handle, rect }),
            None => {}
        }
        Ok(())
    }

    /// The client acknowledged a size request
    pub fn on_ack(&mut self, handle: WindowHandle, serial: u32) -> Result<Option<Vec2>, DesktopError> {
        let window = self.windows.get_mut(handle).ok_or(DesktopError::InvalidWindow)?;
        let committed = window.on_ack(serial);
        match committed {
            Some(size) => debug!("Window {:?} committed size {:?} (serial {})", handle, size, serial),
            None => debug!("Window {:?} ack {} settled nothing", handle, serial),
        }
        Ok(committed)
    }

    /// A legacy client asked for a new box. Honoured for unmapped and
    /// floating windows; tiled and fullscreen windows get their current
    /// box re-sent.
    pub fn on_x11_configure_request(&mut self, handle: WindowHandle, rect: Rect) -> Result<(), DesktopError> {
        let window = self.windows.get(handle).ok_or(DesktopError::InvalidWindow)?;
        if !window.is_x11() {
            warn!("Configure request for non-X11 window {:?}", handle);
            return Ok(());
        }

        let managed = window.flags.mapped && !window.flags.override_redirect;
        if managed && (!window.flags.floating || window.is_fullscreen()) {
            debug!("Refusing configure request of managed window {:?}", handle);
            return self.send_window_size(handle, true);
        }

        self.place(handle, rect, false)?;
        self.send_window_size(handle, true)
    }

    /// `swallower` takes the place of `swallowed`, which is hidden until
    /// the swallower unmaps
    pub fn swallow(&mut self, swallower: WindowHandle, swallowed: WindowHandle) -> Result<bool, DesktopError> {
        if swallower == swallowed {
            return Ok(false);
        }
        let owner = self.window(swallower).ok_or(DesktopError::InvalidWindow)?;
        let victim = self.window(swallowed).ok_or(DesktopError::InvalidWindow)?;
        if owner.swallowed.is_some() || victim.flags.currently_swallowed || !victim.flags.mapped {
            return Ok(false);
        }
        if victim.group.is_grouped() || owner.group.is_grouped() {
            debug!("Not swallowing across groups ({:?} <- {:?})", swallower, swallowed);
            return Ok(false);
        }
        let rect = victim.box_goal();
        let floating = victim.flags.floating;
        let workspace = victim.workspace();

        if let Some(window) = self.windows.get_mut(swallower) {
            window.swallowed = Some(swallowed);
            window.flags.floating = floating;
        }
        if let Some(window) = self.windows.get_mut(swallowed) {
            window.flags.currently_swallowed = true;
        }
        self.apply_hidden(swallowed, true);
        if let Some(workspace) = workspace {
            self.relocate(swallower, workspace)?;
        }
        self.set_window_box(swallower, rect, false)?;

        if self.focused_window() == Some(swallowed) {
            self.focus_window(Some(swallower));
        }

        debug!("Window {:?} swallowed {:?}", swallower, swallowed);
        self.push_event(CoreEvent::Swallowed { swallower, swallowed });
        Ok(true)
    }

    /// The window that swallowed `handle`
    pub fn swallower_of(&self, handle: WindowHandle) -> Option<WindowHandle> {
        self.windows
            .iter()
            .find(|(_, w)| w.swallowed == Some(handle))
            .map(|(h, _)| h)
    }

    /// Advance every animated value by `dt`. Returns the windows released
    /// because their close animation finished.
    pub fn tick_animations(&mut self, dt: Duration) -> Vec<WindowHandle> {
        let mut faded = Vec::new();
        for (handle, window) in self.windows.iter_mut() {
            window.geometry.real_position.tick(dt);
            window.geometry.real_size.tick(dt);
            window.alpha.tick(dt);
            window.active_inactive_alpha.tick(dt);
            window.border_fade.tick(dt);
            if window.flags.fading_out && !window.alpha.is_being_animated() {
                faded.push(handle);
            }
        }

        let mut released = Vec::new();
        for handle in faded {
            let ready = self.window(handle).is_some_and(|w| w.flags.ready_to_delete);
            self.finish_fade(handle);
            if ready {
                released.push(handle);
            }
        }
        self.tokens.prune(Instant::now());
        released
    }

    /// Keep the border decoration in line with the window's properties
    pub(crate) fn refresh_decorations(&mut self, handle: WindowHandle) {
        let Some(window) = self.windows.get_mut(handle) else {
            return;
        };
        let border = window.real_border_size();
        if !window.data.decorate.value() {
            window.decorations.remove_kind(DecorationType::Border);
            return;
        }
        if window.decorations.has_kind(DecorationType::Border) {
            window.decorations.update_border_size(border);
        } else {
            window.decorations.add(Box::new(BorderDecoration::new(border)));
        }
    }
}
