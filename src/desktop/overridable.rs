//! Layered window properties
//!
//! A property resolves from (lowest to highest): a hard default, an optional
//! default taken from the global config, and any number of overrides, one
//! per [`OverridePriority`] class.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Who set an override. Later variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OverridePriority {
    /// Forced by the layout (e.g. no border on a lone tiled window)
    Layout,
    /// From the rule of the workspace the window sits on
    WorkspaceRule,
    /// From a matched window rule
    WindowRule,
    /// Set explicitly on this window at runtime
    SetProp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverridableVar<T> {
    default: T,
    config_key: Option<&'static str>,
    config_default: Option<T>,
    overrides: BTreeMap<OverridePriority, T>,
}

impl<T: Clone> OverridableVar<T> {
    pub fn new(default: T) -> Self {
        Self {
            default,
            config_key: None,
            config_default: None,
            overrides: BTreeMap::new(),
        }
    }

    /// A property whose default comes from the named config value when one
    /// has been loaded
    pub fn with_config_key(default: T, key: &'static str) -> Self {
        Self {
            config_key: Some(key),
            ..Self::new(default)
        }
    }

    pub fn config_key(&self) -> Option<&'static str> {
        self.config_key
    }

    pub fn set_config_default(&mut self, value: Option<T>) {
        self.config_default = value;
    }

    /// Replace the override held by `priority`
    pub fn set(&mut self, value: T, priority: OverridePriority) {
        self.overrides.insert(priority, value);
    }

    /// Remove every override at or above `priority`
    pub fn unset(&mut self, priority: OverridePriority) {
        self.overrides.retain(|p, _| *p < priority);
    }

    /// Whether any override is present
    pub fn has_override(&self) -> bool {
        !self.overrides.is_empty()
    }

    pub fn override_at(&self, priority: OverridePriority) -> Option<&T> {
        self.overrides.get(&priority)
    }

    /// Highest priority override currently in effect
    pub fn highest_priority(&self) -> Option<OverridePriority> {
        self.overrides.keys().next_back().copied()
    }

    /// The overridden value, ignoring defaults
    pub fn override_value(&self) -> Option<&T> {
        self.overrides.values().next_back()
    }

    pub fn value(&self) -> T {
        self.override_value()
            .or(self.config_default.as_ref())
            .unwrap_or(&self.default)
            .clone()
    }

    /// The resolved value, with `fallback` replacing only the hard default
    pub fn value_or(&self, fallback: T) -> T {
        self.override_value()
            .or(self.config_default.as_ref())
            .cloned()
            .unwrap_or(fallback)
    }
}

impl<T: Clone + Default> Default for OverridableVar<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        let mut var = OverridableVar::with_config_key(1i64, "general:border_size");
        assert_eq!(var.value(), 1);

        var.set_config_default(Some(3));
        assert_eq!(var.value(), 3);

        var.set(5, OverridePriority::WorkspaceRule);
        assert_eq!(var.value(), 5);

        var.set(7, OverridePriority::Layout);
        assert_eq!(var.value(), 5, "lower priority must not shadow a higher one");

        var.set(9, OverridePriority::SetProp);
        assert_eq!(var.value(), 9);
        assert_eq!(var.highest_priority(), Some(OverridePriority::SetProp));
    }

    #[test]
    fn test_unset_removes_priority_and_above() {
        let mut var = OverridableVar::new(false);
        var.set(true, OverridePriority::Layout);
        var.set(false, OverridePriority::WindowRule);
        var.set(false, OverridePriority::SetProp);

        var.unset(OverridePriority::WindowRule);

        assert_eq!(var.override_at(OverridePriority::Layout), Some(&true));
        assert_eq!(var.override_at(OverridePriority::WindowRule), None);
        assert_eq!(var.override_at(OverridePriority::SetProp), None);
        assert!(var.value());
    }

    #[test]
    fn test_setting_same_class_replaces() {
        let mut var = OverridableVar::new(0.0f64);
        var.set(0.5, OverridePriority::WindowRule);
        var.set(0.5, OverridePriority::WindowRule);
        var.set(0.75, OverridePriority::WindowRule);

        assert_eq!(var.value(), 0.75);
        var.unset(OverridePriority::WindowRule);
        assert!(!var.has_override());
        assert_eq!(var.value(), 0.0);
    }

    #[test]
    fn test_value_or_replaces_only_hard_default() {
        let mut var: OverridableVar<f64> = OverridableVar::default();
        assert_eq!(var.value_or(2.0), 2.0);
        var.set_config_default(Some(1.5));
        assert_eq!(var.value_or(2.0), 1.5);
    }
}
