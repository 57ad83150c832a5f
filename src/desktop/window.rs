//! The window entity
//!
//! A [`Window`] is owned by the [`Desktop`](crate::desktop::Desktop)
//! registry and referred to everywhere else by its [`WindowHandle`]. State
//! is split into small value types so collaborators can borrow the part
//! they need.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tracing::debug;

use crate::config::Config;
use crate::desktop::animation::AnimatedVar;
use crate::desktop::decorations::DecorationSet;
use crate::desktop::flags::{BoxProps, GroupRules, SuppressEvents};
use crate::desktop::fullscreen::{FullscreenMode, FullscreenState};
use crate::desktop::group::GroupData;
use crate::desktop::overridable::OverridePriority;
use crate::desktop::resize::{PendingSizeAck, ResizeNegotiator};
use crate::desktop::rules::WindowRule;
use crate::desktop::window_data::{Gradient, IdleInhibitMode, PropertyAssignment, WindowData};
use crate::desktop::workspace::{MonitorId, WorkspaceId};
use crate::shared::{Extents, Rect, Vec2};

new_key_type! {
    /// Generation-checked reference to a window. Goes stale once the
    /// window is released.
    pub struct WindowHandle;
}

/// Smallest size a window is ever clamped to
pub const MIN_WINDOW_SIZE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Native toplevel, sizes negotiated with serials
    Xdg,
    /// Legacy X11 surface, sizes applied through configure
    X11,
}

/// Boxes of a window
#[derive(Debug, Clone)]
pub struct WindowGeometry {
    /// Box assigned by the layout
    pub position: Vec2,
    pub size: Vec2,

    /// Animated box actually rendered
    pub real_position: AnimatedVar<Vec2>,
    pub real_size: AnimatedVar<Vec2>,

    /// Position last sent to a legacy client
    pub reported_position: Vec2,

    pub last_floating_position: Vec2,
    pub last_floating_size: Vec2,
    /// Floating position relative to the monitor origin
    pub floating_offset: Vec2,
    /// Size the client wants while pseudotiled
    pub pseudo_size: Vec2,

    /// Box to return to when leaving fullscreen
    pub pre_fullscreen: Option<Rect>,

    /// Box at unmap time, kept for the close animation
    pub closed_box: Option<Rect>,
}

impl WindowGeometry {
    fn new(move_duration: Duration) -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            real_position: AnimatedVar::new(Vec2::ZERO, move_duration),
            real_size: AnimatedVar::new(Vec2::ZERO, move_duration),
            reported_position: Vec2::ZERO,
            last_floating_position: Vec2::ZERO,
            last_floating_size: Vec2::ZERO,
            floating_offset: Vec2::ZERO,
            pseudo_size: Vec2::new(1280.0, 720.0),
            pre_fullscreen: None,
            closed_box: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowFlags {
    pub floating: bool,
    pub pseudotiled: bool,
    pub mapped: bool,
    pub hidden: bool,
    pub suspended: bool,
    pub urgent: bool,
    pub pinned: bool,
    pub fading_out: bool,
    /// The client surface is gone; release once the fade finishes
    pub ready_to_delete: bool,
    /// Set while the first map is being processed
    pub first_map: bool,
    pub ever_mapped: bool,
    /// The client asked to float (dialogs, fixed-size windows)
    pub requests_float: bool,
    pub no_initial_focus: bool,
    pub currently_swallowed: bool,
    pub override_redirect: bool,
}

/// What to send the client after a size change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeRequest {
    Configure(PendingSizeAck),
    X11(Rect),
}

#[derive(Debug)]
pub struct Window {
    handle: WindowHandle,
    kind: SurfaceKind,

    pub title: String,
    pub class: String,
    pub initial_title: String,
    pub initial_class: String,

    pub geometry: WindowGeometry,
    pub flags: WindowFlags,
    pub fullscreen: FullscreenState,
    pub suppressed_events: SuppressEvents,

    pub group: GroupData,
    /// Group rules of the current map
    pub group_rules: GroupRules,

    workspace: Option<WorkspaceId>,
    monitor: Option<MonitorId>,
    pub last_workspace: Option<WorkspaceId>,

    matched_rules: Vec<WindowRule>,
    manual_props: Vec<PropertyAssignment>,

    pub decorations: DecorationSet,
    pub data: WindowData,
    pub resize: ResizeNegotiator,

    pub alpha: AnimatedVar<f32>,
    /// Focus-dependent opacity
    pub active_inactive_alpha: AnimatedVar<f32>,
    /// 0 inactive border colour, 1 active
    pub border_fade: AnimatedVar<f32>,

    /// Window hidden behind this one
    pub swallowed: Option<WindowHandle>,

    pub idle_inhibit: IdleInhibitMode,
    pub initial_workspace_token: Option<String>,

    /// Minimum/maximum size hints sent by the client
    pub requested_min_size: Vec2,
    pub requested_max_size: Option<Vec2>,
}

impl Window {
    pub fn new(handle: WindowHandle, kind: SurfaceKind, config: &Config) -> Self {
        let moves = Duration::from_millis(config.animations.move_duration_ms);
        let fades = Duration::from_millis(config.animations.fade_duration_ms);
        Self {
            handle,
            kind,
            title: String::new(),
            class: String::new(),
            initial_title: String::new(),
            initial_class: String::new(),
            geometry: WindowGeometry::new(moves),
            flags: WindowFlags::default(),
            fullscreen: FullscreenState::default(),
            suppressed_events: SuppressEvents::empty(),
            group: GroupData::default(),
            group_rules: GroupRules::empty(),
            workspace: None,
            monitor: None,
            last_workspace: None,
            matched_rules: Vec::new(),
            manual_props: Vec::new(),
            decorations: DecorationSet::default(),
            data: WindowData::from_config(config),
            resize: ResizeNegotiator::new(config.resize.max_pending_acks),
            alpha: AnimatedVar::new(0.0, fades),
            active_inactive_alpha: AnimatedVar::new(1.0, fades),
            border_fade: AnimatedVar::new(0.0, fades),
            swallowed: None,
            idle_inhibit: IdleInhibitMode::None,
            initial_workspace_token: None,
            requested_min_size: Vec2::ZERO,
            requested_max_size: None,
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn is_x11(&self) -> bool {
        self.kind == SurfaceKind::X11
    }

    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.workspace
    }

    pub fn monitor(&self) -> Option<MonitorId> {
        self.monitor
    }

    pub(crate) fn set_workspace(&mut self, workspace: Option<WorkspaceId>, monitor: Option<MonitorId>) {
        self.workspace = workspace;
        self.monitor = monitor;
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.hidden
    }

    /// Returns true if the flag changed
    pub fn set_hidden(&mut self, hidden: bool) -> bool {
        if self.flags.hidden == hidden {
            return false;
        }
        self.flags.hidden = hidden;
        true
    }

    /// Returns true if the client has to be told. Legacy surfaces have no
    /// notion of suspension.
    pub fn set_suspended(&mut self, suspended: bool) -> bool {
        if self.flags.suspended == suspended || self.is_x11() {
            return false;
        }
        self.flags.suspended = suspended;
        true
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.internal != FullscreenMode::None
    }

    pub fn matched_rules(&self) -> &[WindowRule] {
        &self.matched_rules
    }

    pub(crate) fn set_matched_rules(&mut self, rules: Vec<WindowRule>) {
        self.matched_rules = rules;
    }

    pub fn manual_props(&self) -> &[PropertyAssignment] {
        &self.manual_props
    }

    /// Box the window is animating towards
    pub fn box_goal(&self) -> Rect {
        Rect::from_parts(self.geometry.real_position.goal(), self.geometry.real_size.goal())
    }

    /// Box currently rendered
    pub fn main_surface_box(&self) -> Rect {
        Rect::from_parts(self.geometry.real_position.value(), self.geometry.real_size.value())
    }

    pub fn layout_box(&self) -> Rect {
        Rect::from_parts(self.geometry.position, self.geometry.size)
    }

    pub fn real_border_size(&self) -> f64 {
        if self.data.no_border.value() || self.fullscreen.internal == FullscreenMode::Fullscreen {
            return 0.0;
        }
        self.data.border_size.value().max(0) as f64
    }

    pub fn rounding(&self) -> f64 {
        if self.data.no_rounding.value() || self.is_fullscreen() {
            return 0.0;
        }
        self.data.rounding.value().max(0) as f64
    }

    /// Opacity to render with. `active_inactive_alpha` carries the
    /// animated focus-dependent rule value.
    pub fn opacity(&self, focused: bool) -> f32 {
        let rule = if self.fullscreen.internal == FullscreenMode::Fullscreen {
            self.data.alpha_fullscreen.value()
        } else if focused {
            self.data.alpha.value()
        } else {
            self.data.alpha_inactive.value()
        };
        if rule.full_override {
            return self.active_inactive_alpha.value();
        }
        self.alpha.value() * self.active_inactive_alpha.value()
    }

    pub fn border_color(&self, focused: bool) -> Option<Gradient> {
        if focused {
            self.data.active_border_color.value()
        } else {
            self.data.inactive_border_color.value()
        }
    }

    /// Size to report to the client
    pub fn real_to_report_size(&self) -> Vec2 {
        self.geometry
            .real_size
            .goal()
            .clamp(Vec2::new(1.0, 1.0), Vec2::new(f64::INFINITY, f64::INFINITY))
            .round()
    }

    /// Clamp the animated size to the resolved limits, keeping the box
    /// centred. Explicit limits win over the window's properties.
    pub fn clamp_window_size(&mut self, min: Option<Vec2>, max: Option<Vec2>) {
        let min = min
            .or(self.data.min_size.value())
            .unwrap_or(self.requested_min_size)
            .max_components(Vec2::new(MIN_WINDOW_SIZE, MIN_WINDOW_SIZE));
        let max = if self.data.no_max_size.value() {
            Vec2::new(f64::INFINITY, f64::INFINITY)
        } else {
            max.or(self.data.max_size.value())
                .or(self.requested_max_size)
                .unwrap_or(Vec2::new(f64::INFINITY, f64::INFINITY))
        };

        let current = self.geometry.real_size.goal();
        let mut size = current.clamp(min, max);

        if self.data.keep_aspect_ratio.value() && size != current {
            if let Some(aspect) = current.aspect() {
                size = fit_aspect(size, aspect, min, max).unwrap_or(size);
            }
        }

        if size == current {
            return;
        }

        let delta = current - size;
        let position = self.geometry.real_position.goal() + delta / 2.0;
        debug!("Clamping {:?} from {:?} to {:?}", self.handle, current, size);
        self.geometry.real_position.set_goal(position);
        self.geometry.real_size.set_goal(size);
    }

    /// The window's box under the interpretation `props` asks for.
    /// `monitor` is the area of the window's monitor, if it has one.
    pub fn window_box_unified(&self, props: BoxProps, monitor: Option<Rect>) -> Rect {
        if let Some(monitor) = monitor {
            if self.data.dim_around.value() {
                return monitor;
            }
            if self.fullscreen.internal == FullscreenMode::Fullscreen
                && !props.contains(BoxProps::SKIP_FULLSCREEN_PRIORITY)
            {
                return monitor;
            }
        }

        let use_layout = props.contains(BoxProps::USE_PROP_TILED)
            && (!self.flags.floating || props.contains(BoxProps::ALLOW_FLOATING));
        let base = if use_layout { self.layout_box() } else { self.main_surface_box() };

        let floating_only = props.contains(BoxProps::FLOATING_ONLY);
        let mut extents = Extents::default();
        if props.contains(BoxProps::RESERVED_EXTENTS) && !floating_only {
            extents.add_extents(self.decorations.reserved());
        }
        if props.contains(BoxProps::FULL_EXTENTS) {
            extents.add_extents(self.decorations.extents(false, floating_only));
        } else if props.contains(BoxProps::INPUT_EXTENTS) {
            extents.add_extents(self.decorations.extents(true, floating_only));
        }

        base.add_extents(extents)
    }

    /// Apply one matched rule. Static rules are handled at map time and
    /// ignored here.
    pub fn apply_dynamic_rule(&mut self, rule: &WindowRule) {
        let priority = OverridePriority::WindowRule;
        match rule {
            WindowRule::Opacity { active, inactive, fullscreen } => {
                self.data.alpha.set(*active, priority);
                self.data.alpha_inactive.set(inactive.unwrap_or(*active), priority);
                self.data.alpha_fullscreen.set(fullscreen.unwrap_or(*active), priority);
            }
            WindowRule::Property { assignment } => self.data.assign(assignment, priority),
            WindowRule::MinSize { size } => {
                self.data.min_size.set(Some(*size), priority);
                if self.flags.mapped {
                    self.clamp_window_size(Some(*size), None);
                }
            }
            WindowRule::MaxSize { size } => {
                self.data.max_size.set(Some(*size), priority);
                if self.flags.mapped {
                    self.clamp_window_size(None, Some(*size));
                }
            }
            WindowRule::BorderColor { active, inactive } => {
                self.data.active_border_color.set(Some(active.clone()), priority);
                if let Some(inactive) = inactive {
                    self.data.inactive_border_color.set(Some(inactive.clone()), priority);
                }
            }
            WindowRule::Animation { style } => self.data.animation_style.set(Some(style.clone()), priority),
            WindowRule::IdleInhibit { mode } => self.idle_inhibit = *mode,
            _ => {}
        }
    }

    /// Re-resolve every rule-sourced override from the matched rules, then
    /// put runtime assignments back on top. Running it twice changes
    /// nothing.
    pub fn update_dynamic_rules(&mut self) {
        self.data.unset(OverridePriority::WindowRule);
        self.idle_inhibit = IdleInhibitMode::None;

        let rules = std::mem::take(&mut self.matched_rules);
        for rule in &rules {
            self.apply_dynamic_rule(rule);
        }
        self.matched_rules = rules;

        for assignment in &self.manual_props {
            self.data.assign(assignment, OverridePriority::SetProp);
        }
    }

    /// Runtime property assignment, kept across rule refreshes
    pub fn set_prop(&mut self, assignment: PropertyAssignment) {
        self.manual_props.retain(|existing| !same_property(existing, &assignment));
        self.manual_props.push(assignment);
        self.data.assign(&assignment, OverridePriority::SetProp);
    }

    /// Drop every override at or above `priority`
    pub fn unset_window_data(&mut self, priority: OverridePriority) {
        self.data.unset(priority);
        // runtime assignments are the top layer, any unset removes them
        self.manual_props.clear();
    }

    /// Work out what the client must be told about its current size
    pub fn send_window_size(&mut self, force: bool) -> Option<SizeRequest> {
        let size = self.real_to_report_size();
        match self.kind {
            SurfaceKind::X11 => {
                let position = self.geometry.real_position.goal();
                if !force
                    && self.resize.pending_reported_size() == Some(size)
                    && self.geometry.reported_position == position
                {
                    return None;
                }
                self.resize.commit_unserialized(size);
                self.geometry.reported_position = position;
                Some(SizeRequest::X11(Rect::from_parts(position, size)))
            }
            SurfaceKind::Xdg => self.resize.request(size, force).map(SizeRequest::Configure),
        }
    }

    pub fn on_ack(&mut self, serial: u32) -> Option<Vec2> {
        self.resize.on_ack(serial)
    }
}

fn same_property(a: &PropertyAssignment, b: &PropertyAssignment) -> bool {
    match (a, b) {
        (PropertyAssignment::Bool { property: x, .. }, PropertyAssignment::Bool { property: y, .. }) => x == y,
        (PropertyAssignment::Int { property: x, .. }, PropertyAssignment::Int { property: y, .. }) => x == y,
        (PropertyAssignment::Float { property: x, .. }, PropertyAssignment::Float { property: y, .. }) => x == y,
        _ => false,
    }
}

/// Size with the given aspect inside [min, max], driven by the width or
/// the height of `clamped`
fn fit_aspect(clamped: Vec2, aspect: f64, min: Vec2, max: Vec2) -> Option<Vec2> {
    const EPSILON: f64 = 1e-6;
    let within = |size: &Vec2| {
        size.x >= min.x - EPSILON
            && size.y >= min.y - EPSILON
            && size.x <= max.x + EPSILON
            && size.y <= max.y + EPSILON
    };
    [
        Vec2::new(clamped.x, clamped.x / aspect),
        Vec2::new(clamped.y * aspect, clamped.y),
    ]
    .into_iter()
    .find(within)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::decorations::{BorderDecoration, GroupBarDecoration};
    use crate::desktop::window_data::{AlphaValue, BoolProperty};

    fn window_at(rect: Rect) -> Window {
        let mut window = Window::new(WindowHandle::default(), SurfaceKind::Xdg, &Config::default());
        window.geometry.position = rect.pos();
        window.geometry.size = rect.size();
        window.geometry.real_position.set_value_and_warp(rect.pos());
        window.geometry.real_size.set_value_and_warp(rect.size());
        window
    }

    #[test]
    fn test_clamp_recenters() {
        let mut window = window_at(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        window.clamp_window_size(None, Some(Vec2::new(800.0, 800.0)));
        assert_eq!(window.box_goal(), Rect::new(100.0, 100.0, 800.0, 800.0));
    }

    #[test]
    fn test_clamp_min_wins_over_max() {
        let mut window = window_at(Rect::new(0.0, 0.0, 250.0, 250.0));
        window.data.min_size.set(Some(Vec2::new(300.0, 300.0)), OverridePriority::WindowRule);
        window.data.max_size.set(Some(Vec2::new(200.0, 200.0)), OverridePriority::WindowRule);
        window.clamp_window_size(None, None);
        assert_eq!(window.box_goal().size(), Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_clamp_explicit_limits_win() {
        let mut window = window_at(Rect::new(0.0, 0.0, 500.0, 500.0));
        window.data.max_size.set(Some(Vec2::new(200.0, 200.0)), OverridePriority::WindowRule);
        window.clamp_window_size(None, Some(Vec2::new(400.0, 400.0)));
        assert_eq!(window.box_goal().size(), Vec2::new(400.0, 400.0));

        window.data.no_max_size.set(true, OverridePriority::SetProp);
        window.clamp_window_size(None, Some(Vec2::new(100.0, 100.0)));
        assert_eq!(window.box_goal().size(), Vec2::new(400.0, 400.0));
    }

    #[test]
    fn test_clamp_keeps_aspect_ratio() {
        let mut window = window_at(Rect::new(0.0, 0.0, 1000.0, 500.0));
        window.data.keep_aspect_ratio.set(true, OverridePriority::WindowRule);
        window.clamp_window_size(None, Some(Vec2::new(800.0, 800.0)));
        assert_eq!(window.box_goal().size(), Vec2::new(800.0, 400.0));

        let mut small = window_at(Rect::new(0.0, 0.0, 100.0, 50.0));
        small.data.keep_aspect_ratio.set(true, OverridePriority::WindowRule);
        small.clamp_window_size(Some(Vec2::new(300.0, 300.0)), None);
        assert_eq!(small.box_goal().size(), Vec2::new(600.0, 300.0));
    }

    #[test]
    fn test_box_fullscreen_priority() {
        let mut window = window_at(Rect::new(10.0, 10.0, 100.0, 100.0));
        let monitor = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        window.fullscreen.internal = FullscreenMode::Fullscreen;

        assert_eq!(window.window_box_unified(BoxProps::WINDOW_ONLY, Some(monitor)), monitor);
        assert_eq!(
            window.window_box_unified(BoxProps::SKIP_FULLSCREEN_PRIORITY, Some(monitor)),
            Rect::new(10.0, 10.0, 100.0, 100.0)
        );
    }

    #[test]
    fn test_box_extents() {
        let mut window = window_at(Rect::new(100.0, 100.0, 200.0, 100.0));
        window.decorations.add(Box::new(BorderDecoration::new(2.0)));
        window.decorations.add(Box::new(GroupBarDecoration::new(20.0)));

        assert_eq!(
            window.window_box_unified(BoxProps::RESERVED_EXTENTS, None),
            Rect::new(100.0, 80.0, 200.0, 120.0)
        );
        assert_eq!(
            window.window_box_unified(BoxProps::FULL_EXTENTS, None),
            Rect::new(98.0, 78.0, 204.0, 124.0)
        );
        assert_eq!(
            window.window_box_unified(BoxProps::FULL_EXTENTS | BoxProps::FLOATING_ONLY, None),
            Rect::new(98.0, 98.0, 204.0, 104.0)
        );
    }

    #[test]
    fn test_box_layout_interpretation() {
        let mut window = window_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        window.geometry.real_position.set_goal(Vec2::new(50.0, 50.0));
        window.geometry.position = Vec2::new(50.0, 50.0);

        // animation has not started moving yet
        assert_eq!(window.window_box_unified(BoxProps::WINDOW_ONLY, None).pos(), Vec2::ZERO);
        assert_eq!(window.window_box_unified(BoxProps::USE_PROP_TILED, None).pos(), Vec2::new(50.0, 50.0));

        window.flags.floating = true;
        assert_eq!(window.window_box_unified(BoxProps::USE_PROP_TILED, None).pos(), Vec2::ZERO);
        assert_eq!(
            window
                .window_box_unified(BoxProps::USE_PROP_TILED | BoxProps::ALLOW_FLOATING, None)
                .pos(),
            Vec2::new(50.0, 50.0)
        );
    }

    #[test]
    fn test_dynamic_rules_are_idempotent_and_keep_set_prop() {
        let mut window = window_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        window.set_matched_rules(vec![
            WindowRule::Opacity {
                active: AlphaValue { alpha: 0.8, full_override: false },
                inactive: None,
                fullscreen: None,
            },
            WindowRule::Property {
                assignment: PropertyAssignment::Int { property: crate::desktop::window_data::IntProperty::Rounding, value: 4 },
            },
        ]);
        window.set_prop(PropertyAssignment::Bool { property: BoolProperty::NoBorder, value: true });
        window.set_prop(PropertyAssignment::Bool { property: BoolProperty::NoBorder, value: false });
        assert_eq!(window.manual_props().len(), 1);

        window.update_dynamic_rules();
        let once = (window.data.alpha.value(), window.data.alpha_inactive.value(), window.data.rounding.value());
        window.update_dynamic_rules();
        let twice = (window.data.alpha.value(), window.data.alpha_inactive.value(), window.data.rounding.value());

        assert_eq!(once, twice);
        assert_eq!(once.2, 4);
        assert_eq!(once.1.alpha, 0.8);
        assert!(!window.data.no_border.value());
        assert_eq!(window.data.no_border.highest_priority(), Some(OverridePriority::SetProp));
    }

    #[test]
    fn test_unset_keeps_lower_layers() {
        let mut window = window_at(Rect::new(0.0, 0.0, 100.0, 100.0));
        window.data.rounding.set(1, OverridePriority::Layout);
        window.data.rounding.set(2, OverridePriority::WorkspaceRule);
        window.data.rounding.set(3, OverridePriority::WindowRule);
        window.set_prop(PropertyAssignment::Int { property: crate::desktop::window_data::IntProperty::Rounding, value: 4 });

        window.unset_window_data(OverridePriority::WindowRule);
        assert_eq!(window.data.rounding.value(), 2);
        assert!(window.manual_props().is_empty());

        window.unset_window_data(OverridePriority::WorkspaceRule);
        assert_eq!(window.data.rounding.value(), 1);
    }

    #[test]
    fn test_legacy_surfaces_never_suspend() {
        let mut native = window_at(Rect::default());
        assert!(native.set_suspended(true));
        assert!(!native.set_suspended(true));

        let mut legacy = Window::new(WindowHandle::default(), SurfaceKind::X11, &Config::default());
        assert!(!legacy.set_suspended(true));
        assert!(!legacy.flags.suspended);
    }

    #[test]
    fn test_send_window_size_dedups() {
        let mut window = window_at(Rect::new(0.0, 0.0, 800.0, 600.0));
        let first = window.send_window_size(false);
        assert!(matches!(first, Some(SizeRequest::Configure(PendingSizeAck { serial: 1, .. }))));
        assert_eq!(window.send_window_size(false), None);

        window.geometry.real_size.set_goal(Vec2::new(820.0, 600.0));
        assert!(matches!(
            window.send_window_size(false),
            Some(SizeRequest::Configure(PendingSizeAck { serial: 2, size })) if size == Vec2::new(820.0, 600.0)
        ));

        let mut legacy = Window::new(WindowHandle::default(), SurfaceKind::X11, &Config::default());
        legacy.geometry.real_size.set_value_and_warp(Vec2::new(300.0, 200.0));
        assert_eq!(legacy.send_window_size(false), Some(SizeRequest::X11(Rect::new(0.0, 0.0, 300.0, 200.0))));
        assert_eq!(legacy.send_window_size(false), None);
        assert_eq!(legacy.resize.reported_size(), Vec2::new(300.0, 200.0));
    }
}
