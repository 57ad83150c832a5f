//! Window Flags
//!
//! Bitfield flags for rules and queries. Per-window boolean state lives in
//! [`crate::desktop::window::WindowFlags`] as named fields instead.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Group rules. Evaluated only on the first map, except the `_ALWAYS`
    /// variants which apply on every map.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GroupRules: u16 {
        /// Open as a new group, or join the focused group
        const SET         = 1 << 0;
        const SET_ALWAYS  = 1 << 1;
        /// Never auto-join the focused group
        const BARRED      = 1 << 2;
        /// Lock the group the window ends up in
        const LOCK        = 1 << 3;
        const LOCK_ALWAYS = 1 << 4;
        /// Enter a group even when it is locked
        const INVADE      = 1 << 5;
        /// Replace previously matched group rules instead of merging with them
        const OVERRIDE    = 1 << 6;
    }
}

bitflags! {
    /// Client requests the compositor ignores for a window
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SuppressEvents: u8 {
        const FULLSCREEN         = 1 << 0;
        const MAXIMIZE           = 1 << 1;
        const ACTIVATE           = 1 << 2;
        /// Honour activation only as an urgency hint, never move focus
        const ACTIVATE_FOCUSONLY = 1 << 3;
        const FULLSCREEN_OUTPUT  = 1 << 4;
    }
}

bitflags! {
    /// Which interpretation of a window's box a query wants
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct BoxProps: u8 {
        /// Include space reserved by decorations (titlebars, group bars)
        const RESERVED_EXTENTS         = 1 << 0;
        /// Include decorations that accept pointer input
        const INPUT_EXTENTS            = 1 << 1;
        /// Include every decoration
        const FULL_EXTENTS             = 1 << 2;
        /// Only count decorations that float around the window (borders, shadows)
        const FLOATING_ONLY            = 1 << 3;
        /// With `USE_PROP_TILED`, floating windows use their layout box too
        const ALLOW_FLOATING           = 1 << 4;
        /// Use the layout-assigned box instead of the animated one for tiled windows
        const USE_PROP_TILED           = 1 << 5;
        /// Ignore the "fullscreen covers the monitor" shortcut
        const SKIP_FULLSCREEN_PRIORITY = 1 << 6;
    }
}

impl BoxProps {
    /// Plain surface box, no decorations
    pub const WINDOW_ONLY: BoxProps = BoxProps::empty();
}

impl GroupRules {
    /// Merge rules from a newly matched rule. `OVERRIDE` replaces instead.
    pub fn merged_with(self, incoming: GroupRules) -> GroupRules {
        if incoming.contains(GroupRules::OVERRIDE) {
            incoming
        } else {
            self | incoming
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_rules_merge_and_override() {
        let rules = GroupRules::SET.merged_with(GroupRules::LOCK);
        assert_eq!(rules, GroupRules::SET | GroupRules::LOCK);

        let replaced = rules.merged_with(GroupRules::OVERRIDE | GroupRules::BARRED);
        assert!(!replaced.contains(GroupRules::SET));
        assert!(replaced.contains(GroupRules::BARRED));
    }
}
