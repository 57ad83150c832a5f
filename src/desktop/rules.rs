//! Matched window rules
//!
//! The rule engine matches rules against a window (by class, title, ...)
//! and hands over the ordered list of effects that matched. Static effects
//! shape the window once, on its first map. Dynamic effects write
//! [`OverridePriority::WindowRule`] overrides and are re-applied whenever
//! the matched set changes.
//!
//! [`OverridePriority::WindowRule`]: crate::desktop::overridable::OverridePriority::WindowRule

use serde::{Deserialize, Serialize};

use crate::desktop::flags::{GroupRules, SuppressEvents};
use crate::desktop::window_data::{AlphaValue, Gradient, IdleInhibitMode, PropertyAssignment};
use crate::desktop::workspace::{MonitorId, WorkspaceId};
use crate::shared::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum WindowRule {
    Float,
    Tile,
    Fullscreen,
    Maximize,
    Pin,
    Pseudo,
    NoInitialFocus,
    Workspace { id: WorkspaceId },
    Monitor { id: MonitorId },
    Group { rules: GroupRules },
    SuppressEvent { events: SuppressEvents },

    Opacity {
        active: AlphaValue,
        #[serde(default)]
        inactive: Option<AlphaValue>,
        #[serde(default)]
        fullscreen: Option<AlphaValue>,
    },
    Property { assignment: PropertyAssignment },
    MinSize { size: Vec2 },
    MaxSize { size: Vec2 },
    BorderColor {
        active: Gradient,
        #[serde(default)]
        inactive: Option<Gradient>,
    },
    Animation { style: String },
    IdleInhibit { mode: IdleInhibitMode },
}

impl WindowRule {
    /// Static rules only take effect while a window is first mapped
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            WindowRule::Float
                | WindowRule::Tile
                | WindowRule::Fullscreen
                | WindowRule::Maximize
                | WindowRule::Pin
                | WindowRule::Pseudo
                | WindowRule::NoInitialFocus
                | WindowRule::Workspace { .. }
                | WindowRule::Monitor { .. }
                | WindowRule::Group { .. }
                | WindowRule::SuppressEvent { .. }
        )
    }
}

/// Combined group rules of a matched rule list
pub fn group_rules_of(rules: &[WindowRule]) -> GroupRules {
    rules.iter().fold(GroupRules::empty(), |acc, rule| match rule {
        WindowRule::Group { rules } => acc.merged_with(*rules),
        _ => acc,
    })
}
