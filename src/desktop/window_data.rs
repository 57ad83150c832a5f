//! Per-window render and behaviour properties
//!
//! Every property is an [`OverridableVar`]. Rules, workspace rules, the
//! layout and runtime `set_prop` requests write overrides; renderers and
//! layouts read the resolved value.
//!
//! The scalar properties are also addressable by name through
//! [`BoolProperty`], [`IntProperty`] and [`FloatProperty`], which is how
//! rules and IPC requests refer to them.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::desktop::overridable::{OverridableVar, OverridePriority};
use crate::shared::Vec2;

/// Opacity multiplier. With `full_override` the value replaces the
/// computed opacity instead of scaling it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaValue {
    pub alpha: f32,
    #[serde(default)]
    pub full_override: bool,
}

impl AlphaValue {
    pub const OPAQUE: AlphaValue = AlphaValue { alpha: 1.0, full_override: false };

    pub fn apply(&self, alpha: f32) -> f32 {
        if self.full_override {
            self.alpha
        } else {
            self.alpha * alpha
        }
    }
}

/// Border colour, one or more stops rotated by `angle` degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub colors: Vec<u32>,
    #[serde(default)]
    pub angle: f64,
}

impl Gradient {
    pub fn solid(color: u32) -> Self {
        Self { colors: vec![color], angle: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleInhibitMode {
    #[default]
    None,
    Always,
    Fullscreen,
    Focus,
}

#[derive(Debug, Clone)]
pub struct WindowData {
    pub alpha: OverridableVar<AlphaValue>,
    pub alpha_inactive: OverridableVar<AlphaValue>,
    pub alpha_fullscreen: OverridableVar<AlphaValue>,

    pub allows_input: OverridableVar<bool>,
    pub dim_around: OverridableVar<bool>,
    pub decorate: OverridableVar<bool>,
    pub focus_on_activate: OverridableVar<bool>,
    pub keep_aspect_ratio: OverridableVar<bool>,
    pub nearest_neighbor: OverridableVar<bool>,
    pub no_anim: OverridableVar<bool>,
    pub no_border: OverridableVar<bool>,
    pub no_blur: OverridableVar<bool>,
    pub no_dim: OverridableVar<bool>,
    pub no_focus: OverridableVar<bool>,
    pub no_max_size: OverridableVar<bool>,
    pub no_rounding: OverridableVar<bool>,
    pub no_shadow: OverridableVar<bool>,
    pub no_shortcuts_inhibit: OverridableVar<bool>,
    pub opaque: OverridableVar<bool>,
    pub rgbx: OverridableVar<bool>,
    pub sync_fullscreen: OverridableVar<bool>,
    pub tearing: OverridableVar<bool>,
    pub xray: OverridableVar<bool>,
    pub render_unfocused: OverridableVar<bool>,
    pub no_follow_mouse: OverridableVar<bool>,
    pub persistent_size: OverridableVar<bool>,

    pub border_size: OverridableVar<i64>,
    pub rounding: OverridableVar<i64>,

    pub rounding_power: OverridableVar<f64>,
    pub scroll_mouse: OverridableVar<f64>,
    pub scroll_touchpad: OverridableVar<f64>,

    pub animation_style: OverridableVar<Option<String>>,
    pub max_size: OverridableVar<Option<Vec2>>,
    pub min_size: OverridableVar<Option<Vec2>>,

    pub active_border_color: OverridableVar<Option<Gradient>>,
    pub inactive_border_color: OverridableVar<Option<Gradient>>,
}

impl Default for WindowData {
    fn default() -> Self {
        Self {
            alpha: OverridableVar::new(AlphaValue::OPAQUE),
            alpha_inactive: OverridableVar::new(AlphaValue::OPAQUE),
            alpha_fullscreen: OverridableVar::new(AlphaValue::OPAQUE),

            allows_input: OverridableVar::new(false),
            dim_around: OverridableVar::new(false),
            decorate: OverridableVar::new(true),
            focus_on_activate: OverridableVar::with_config_key(false, "misc:focus_on_activate"),
            keep_aspect_ratio: OverridableVar::new(false),
            nearest_neighbor: OverridableVar::new(false),
            no_anim: OverridableVar::new(false),
            no_border: OverridableVar::new(false),
            no_blur: OverridableVar::new(false),
            no_dim: OverridableVar::new(false),
            no_focus: OverridableVar::new(false),
            no_max_size: OverridableVar::new(false),
            no_rounding: OverridableVar::new(false),
            no_shadow: OverridableVar::new(false),
            no_shortcuts_inhibit: OverridableVar::new(false),
            opaque: OverridableVar::new(false),
            rgbx: OverridableVar::new(false),
            sync_fullscreen: OverridableVar::new(true),
            tearing: OverridableVar::new(false),
            xray: OverridableVar::new(false),
            render_unfocused: OverridableVar::new(false),
            no_follow_mouse: OverridableVar::new(false),
            persistent_size: OverridableVar::new(false),

            border_size: OverridableVar::with_config_key(0, "general:border_size"),
            rounding: OverridableVar::with_config_key(0, "decoration:rounding"),

            rounding_power: OverridableVar::with_config_key(2.0, "decoration:rounding_power"),
            scroll_mouse: OverridableVar::with_config_key(1.0, "input:scroll_factor"),
            scroll_touchpad: OverridableVar::with_config_key(1.0, "input:touchpad:scroll_factor"),

            animation_style: OverridableVar::new(None),
            max_size: OverridableVar::new(None),
            min_size: OverridableVar::new(None),

            active_border_color: OverridableVar::new(None),
            inactive_border_color: OverridableVar::new(None),
        }
    }
}

impl WindowData {
    pub fn from_config(config: &Config) -> Self {
        let mut data = Self::default();
        data.load_config_defaults(config);
        data
    }

    /// Refresh the config-sourced defaults of every keyed property
    pub fn load_config_defaults(&mut self, config: &Config) {
        for prop in BoolProperty::ALL {
            let var = prop.var_mut(self);
            let value = var.config_key().and_then(|key| config.value(key)).and_then(|v| v.as_bool());
            var.set_config_default(value);
        }
        for prop in IntProperty::ALL {
            let var = prop.var_mut(self);
            let value = var.config_key().and_then(|key| config.value(key)).and_then(|v| v.as_int());
            var.set_config_default(value);
        }
        for prop in FloatProperty::ALL {
            let var = prop.var_mut(self);
            let value = var.config_key().and_then(|key| config.value(key)).and_then(|v| v.as_float());
            var.set_config_default(value);
        }
    }

    pub fn assign(&mut self, assignment: &PropertyAssignment, priority: OverridePriority) {
        match *assignment {
            PropertyAssignment::Bool { property, value } => property.var_mut(self).set(value, priority),
            PropertyAssignment::Int { property, value } => property.var_mut(self).set(value, priority),
            PropertyAssignment::Float { property, value } => property.var_mut(self).set(value, priority),
        }
    }

    /// Drop every override at or above `priority` on every property
    pub fn unset(&mut self, priority: OverridePriority) {
        self.alpha.unset(priority);
        self.alpha_inactive.unset(priority);
        self.alpha_fullscreen.unset(priority);

        for prop in BoolProperty::ALL {
            prop.var_mut(self).unset(priority);
        }
        for prop in IntProperty::ALL {
            prop.var_mut(self).unset(priority);
        }
        for prop in FloatProperty::ALL {
            prop.var_mut(self).unset(priority);
        }

        self.animation_style.unset(priority);
        self.max_size.unset(priority);
        self.min_size.unset(priority);
        self.active_border_color.unset(priority);
        self.inactive_border_color.unset(priority);
    }
}

macro_rules! property_table {
    ($(#[$meta:meta])* $name:ident: $ty:ty { $($variant:ident => $key:literal, $field:ident;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $key)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            /// Case-insensitive lookup by configuration name
            pub fn from_name(name: &str) -> Option<Self> {
                match name.to_ascii_lowercase().as_str() {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn var(self, data: &WindowData) -> &OverridableVar<$ty> {
                match self {
                    $($name::$variant => &data.$field,)+
                }
            }

            pub fn var_mut(self, data: &mut WindowData) -> &mut OverridableVar<$ty> {
                match self {
                    $($name::$variant => &mut data.$field,)+
                }
            }
        }
    };
}

property_table! {
    /// Boolean window properties addressable by name
    BoolProperty: bool {
        AllowsInput => "allowsinput", allows_input;
        DimAround => "dimaround", dim_around;
        Decorate => "decorate", decorate;
        FocusOnActivate => "focusonactivate", focus_on_activate;
        KeepAspectRatio => "keepaspectratio", keep_aspect_ratio;
        NearestNeighbor => "nearestneighbor", nearest_neighbor;
        NoAnim => "noanim", no_anim;
        NoBlur => "noblur", no_blur;
        NoBorder => "noborder", no_border;
        NoDim => "nodim", no_dim;
        NoFocus => "nofocus", no_focus;
        NoMaxSize => "nomaxsize", no_max_size;
        NoRounding => "norounding", no_rounding;
        NoShadow => "noshadow", no_shadow;
        NoShortcutsInhibit => "noshortcutsinhibit", no_shortcuts_inhibit;
        Opaque => "opaque", opaque;
        ForceRgbx => "forcergbx", rgbx;
        SyncFullscreen => "syncfullscreen", sync_fullscreen;
        Immediate => "immediate", tearing;
        Xray => "xray", xray;
        RenderUnfocused => "renderunfocused", render_unfocused;
        NoFollowMouse => "nofollowmouse", no_follow_mouse;
        PersistentSize => "persistentsize", persistent_size;
    }
}

property_table! {
    /// Integer window properties addressable by name
    IntProperty: i64 {
        Rounding => "rounding", rounding;
        BorderSize => "bordersize", border_size;
    }
}

property_table! {
    /// Float window properties addressable by name
    FloatProperty: f64 {
        RoundingPower => "roundingpower", rounding_power;
        ScrollMouse => "scrollmouse", scroll_mouse;
        ScrollTouchpad => "scrolltouchpad", scroll_touchpad;
    }
}

/// A typed `name = value` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PropertyAssignment {
    Bool { property: BoolProperty, value: bool },
    Int { property: IntProperty, value: i64 },
    Float { property: FloatProperty, value: f64 },
}

impl PropertyAssignment {
    /// Parse `name` + textual value into a typed assignment
    pub fn parse(name: &str, value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(property) = BoolProperty::from_name(name) {
            let value = match value {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                _ => return None,
            };
            return Some(PropertyAssignment::Bool { property, value });
        }
        if let Some(property) = IntProperty::from_name(name) {
            return value.parse().ok().map(|value| PropertyAssignment::Int { property, value });
        }
        if let Some(property) = FloatProperty::from_name(name) {
            return value.parse().ok().map(|value| PropertyAssignment::Float { property, value });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_roundtrip() {
        for prop in BoolProperty::ALL {
            assert_eq!(BoolProperty::from_name(prop.name()), Some(*prop));
        }
        assert_eq!(IntProperty::from_name("BorderSize"), Some(IntProperty::BorderSize));
        assert_eq!(FloatProperty::from_name("scrolltouchpad"), Some(FloatProperty::ScrollTouchpad));
        assert_eq!(BoolProperty::from_name("bordersize"), None);
    }

    #[test]
    fn test_config_defaults_feed_cascade() {
        let mut config = Config::default();
        config.general.border_size = 5;
        config.input.scroll_factor = 0.25;

        let data = WindowData::from_config(&config);
        assert_eq!(data.border_size.value(), 5);
        assert_eq!(data.scroll_mouse.value(), 0.25);
        assert_eq!(data.rounding.value(), config.decoration.rounding);
        // unkeyed properties keep their hard default
        assert!(data.decorate.value());
    }

    #[test]
    fn test_assign_through_registry() {
        let mut data = WindowData::default();
        let assignment = PropertyAssignment::parse("noborder", "1").unwrap();
        data.assign(&assignment, OverridePriority::SetProp);
        assert!(data.no_border.value());
        assert!(BoolProperty::NoBorder.var(&data).value());

        assert_eq!(PropertyAssignment::parse("rounding", "abc"), None);
        assert_eq!(
            PropertyAssignment::parse("roundingpower", "3.5"),
            Some(PropertyAssignment::Float { property: FloatProperty::RoundingPower, value: 3.5 })
        );
    }

    #[test]
    fn test_unset_covers_every_layer() {
        let mut data = WindowData::default();
        data.min_size.set(Some(Vec2::new(100.0, 100.0)), OverridePriority::WindowRule);
        data.alpha.set(AlphaValue { alpha: 0.5, full_override: true }, OverridePriority::WindowRule);
        data.rounding.set(3, OverridePriority::Layout);

        data.unset(OverridePriority::WorkspaceRule);

        assert_eq!(data.min_size.value(), None);
        assert_eq!(data.alpha.value(), AlphaValue::OPAQUE);
        assert_eq!(data.rounding.value(), 3);
    }

    #[test]
    fn test_alpha_apply() {
        let scaled = AlphaValue { alpha: 0.5, full_override: false };
        let forced = AlphaValue { alpha: 0.5, full_override: true };
        assert_eq!(scaled.apply(0.5), 0.25);
        assert_eq!(forced.apply(0.1), 0.5);
    }
}
