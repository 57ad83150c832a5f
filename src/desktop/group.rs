//! Tabbed window groups
//!
//! A group is a ring of windows linked through `next`. Exactly one member
//! (the head) carries `head`, and the group lock lives on it. Exactly one
//! member carries `current`; it is the only one shown.

use tracing::{debug, warn};

use crate::desktop::decorations::{DecorationType, GroupBarDecoration};
use crate::desktop::flags::GroupRules;
use crate::desktop::fullscreen::FullscreenMode;
use crate::desktop::window::WindowHandle;
use crate::desktop::Desktop;
use crate::ipc::CoreEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupData {
    /// Next member of the ring, `None` when not grouped
    pub next: Option<WindowHandle>,
    pub head: bool,
    /// The member shown for the whole group
    pub current: bool,
    /// Only meaningful on the head
    pub locked: bool,
    /// Never join or form a group
    pub deny: bool,
}

impl GroupData {
    pub fn is_grouped(&self) -> bool {
        self.next.is_some()
    }
}

impl Desktop {
    /// Members of the ring containing `handle`, starting at `handle`.
    /// Empty when the window is not grouped.
    fn ring_from(&self, handle: WindowHandle) -> Vec<WindowHandle> {
        let mut members = Vec::new();
        let mut current = handle;
        // a ring can never be longer than the registry
        for _ in 0..self.windows.len() {
            let Some(next) = self.windows.get(current).and_then(|w| w.group.next) else {
                if !members.is_empty() {
                    warn!("Group ring through {:?} is broken at {:?}", handle, current);
                }
                return members;
            };
            members.push(current);
            if next == handle {
                return members;
            }
            current = next;
        }
        warn!("Group ring through {:?} does not close", handle);
        members
    }

    /// Members of the group of `handle`, head first
    pub fn group_members(&self, handle: WindowHandle) -> Vec<WindowHandle> {
        match self.group_head(handle) {
            Some(head) => self.ring_from(head),
            None => Vec::new(),
        }
    }

    pub fn is_grouped(&self, handle: WindowHandle) -> bool {
        self.window(handle).is_some_and(|w| w.group.is_grouped())
    }

    pub fn group_head(&self, handle: WindowHandle) -> Option<WindowHandle> {
        self.ring_from(handle)
            .into_iter()
            .find(|&h| self.windows.get(h).is_some_and(|w| w.group.head))
    }

    /// The member linking back to the head
    pub fn group_tail(&self, handle: WindowHandle) -> Option<WindowHandle> {
        self.group_members(handle).last().copied()
    }

    /// The member shown for the group
    pub fn group_current(&self, handle: WindowHandle) -> Option<WindowHandle> {
        let members = self.ring_from(handle);
        members
            .iter()
            .copied()
            .find(|&h| self.windows.get(h).is_some_and(|w| w.group.current))
            .or_else(|| members.first().copied())
    }

    /// The member whose `next` is `handle`
    pub fn group_previous(&self, handle: WindowHandle) -> Option<WindowHandle> {
        self.ring_from(handle).last().copied()
    }

    /// Ring length, 0 when not grouped
    pub fn group_size(&self, handle: WindowHandle) -> usize {
        self.ring_from(handle).len()
    }

    /// Member `index` steps from the head. Negative and out-of-range
    /// indices wrap around the ring.
    pub fn group_window_by_index(&self, handle: WindowHandle, index: i64) -> Option<WindowHandle> {
        let members = self.group_members(handle);
        if members.is_empty() {
            return None;
        }
        let len = members.len() as i64;
        members.get(index.rem_euclid(len) as usize).copied()
    }

    pub fn is_group_locked(&self, handle: WindowHandle) -> bool {
        self.group_head(handle)
            .and_then(|head| self.window(head))
            .is_some_and(|w| w.group.locked)
    }

    pub fn set_group_locked(&mut self, handle: WindowHandle, locked: bool) -> bool {
        let Some(head) = self.group_head(handle) else {
            return false;
        };
        if let Some(window) = self.windows.get_mut(head) {
            window.group.locked = locked;
        }
        true
    }

    pub fn set_group_deny(&mut self, handle: WindowHandle, deny: bool) -> bool {
        match self.windows.get_mut(handle) {
            Some(window) => {
                window.group.deny = deny;
                true
            }
            None => false,
        }
    }

    /// Turn a standalone window into a singleton group
    pub fn create_group(&mut self, handle: WindowHandle) -> bool {
        let Some(window) = self.windows.get_mut(handle) else {
            return false;
        };
        if window.group.deny {
            debug!("Window {:?} denies grouping", handle);
            return false;
        }
        if window.group.is_grouped() {
            return false;
        }

        window.group = GroupData {
            next: Some(handle),
            head: true,
            current: true,
            locked: false,
            deny: false,
        };
        self.add_group_bar(handle);
        self.apply_hidden(handle, false);

        debug!("Created group with {:?}", handle);
        self.push_event(CoreEvent::GroupChanged { head: handle, current: handle });
        true
    }

    /// Whether `handle` may be put into the group of `target`
    fn group_admits(&self, handle: WindowHandle, target: WindowHandle) -> bool {
        let (Some(window), Some(_)) = (self.window(handle), self.window(target)) else {
            return false;
        };
        let Some(head) = self.group_head(target) else {
            return false;
        };
        if window.group.deny || self.window(head).is_some_and(|w| w.group.deny) {
            return false;
        }
        let invades = window.flags.first_map && window.group_rules.contains(GroupRules::INVADE);
        if self.is_group_locked(target) && !invades {
            return false;
        }
        // a whole group can only be moved while it is unlocked
        !(window.group.is_grouped() && self.is_group_locked(handle))
    }

    /// Whether a standalone `handle` may join `target`'s group on its own
    pub fn can_be_grouped_into(&self, handle: WindowHandle, target: WindowHandle) -> bool {
        let Some(window) = self.window(handle) else {
            return false;
        };
        if handle == target || window.group.is_grouped() {
            return false;
        }
        if window.flags.first_map && window.group_rules.contains(GroupRules::BARRED) {
            return false;
        }
        self.group_admits(handle, target)
    }

    /// Splice `new` (or its whole group) in right after `target` and make
    /// it current. Refused silently when the target group is locked or
    /// either side denies grouping.
    pub fn insert_window_to_group(&mut self, new: WindowHandle, target: WindowHandle) -> bool {
        if new == target || !self.is_grouped(target) {
            return false;
        }
        if self.group_members(target).contains(&new) {
            return false;
        }
        if !self.group_admits(new, target) {
            debug!("Group of {:?} refuses {:?}", target, new);
            return false;
        }

        let Some(end) = self.window(target).and_then(|w| w.group.next) else {
            return false;
        };

        // the incoming chain runs from `first` to `last`
        let (first, last, incoming) = match self.group_head(new) {
            Some(head) => {
                let members = self.group_members(new);
                let tail = members.last().copied().unwrap_or(head);
                (head, tail, members)
            }
            None => (new, new, vec![new]),
        };

        // members share the region of the group
        let region = self
            .group_current(target)
            .and_then(|h| self.window(h))
            .map(|w| (w.box_goal(), w.flags.floating, w.workspace()));

        if let Some(window) = self.windows.get_mut(target) {
            window.group.next = Some(first);
        }
        if let Some(window) = self.windows.get_mut(last) {
            window.group.next = Some(end);
        }
        for &member in &incoming {
            if let Some(window) = self.windows.get_mut(member) {
                window.group.head = false;
                window.group.current = false;
                window.group.locked = false;
            }
            self.add_group_bar(member);
        }

        if let Some((rect, floating, workspace)) = region {
            for &member in &incoming {
                if let Some(workspace) = workspace {
                    if let Err(err) = self.relocate(member, workspace) {
                        warn!("Failed to move {:?} into its group's workspace: {}", member, err);
                    }
                }
                if let Some(window) = self.windows.get_mut(member) {
                    window.flags.floating = floating;
                }
                if let Err(err) = self.set_window_box(member, rect, false) {
                    warn!("Failed to place grouped window {:?}: {}", member, err);
                }
            }
        }

        debug!("Inserted {:?} into group after {:?}", new, target);
        self.set_group_current(new);
        true
    }

    /// Take `handle` out of its ring. The next member takes over as head
    /// and, if `handle` was shown, as current.
    pub(crate) fn remove_from_group(&mut self, handle: WindowHandle) {
        let members = self.ring_from(handle);
        if members.is_empty() {
            return;
        }
        self.remove_group_bar(handle);

        let Some(window) = self.windows.get_mut(handle) else {
            return;
        };
        let data = window.group;
        let was_current = data.current;
        window.group = GroupData {
            deny: data.deny,
            ..GroupData::default()
        };

        if members.len() == 1 {
            debug!("Dissolved singleton group of {:?}", handle);
            return;
        }

        let previous = members[members.len() - 1];
        let next = members[1];
        if let Some(window) = self.windows.get_mut(previous) {
            window.group.next = Some(next);
        }
        if data.head {
            if let Some(window) = self.windows.get_mut(next) {
                window.group.head = true;
                window.group.locked = data.locked;
            }
        }

        if was_current {
            if let Some(window) = self.windows.get_mut(next) {
                window.group.current = true;
            }
            if let Some(rect) = self.window(handle).map(|w| w.box_goal()) {
                if let Err(err) = self.set_window_box(next, rect, false) {
                    warn!("Failed to place {:?} after group removal: {}", next, err);
                }
            }
            self.apply_hidden(next, false);
            if self.focused_window() == Some(handle) && self.config.group.focus_removed_window {
                self.focus_window(Some(next));
            }
        }

        let head = self.group_head(next).unwrap_or(next);
        let current = self.group_current(next).unwrap_or(next);
        self.push_event(CoreEvent::GroupChanged { head, current });
    }

    /// Move a window out of its group and show it standalone
    pub fn move_out_of_group(&mut self, handle: WindowHandle) -> bool {
        if !self.is_grouped(handle) {
            return false;
        }
        self.remove_from_group(handle);
        self.apply_hidden(handle, false);
        true
    }

    /// Unlink every member back to a standalone, visible window. A
    /// singleton whose rules demand a group refuses.
    pub fn destroy_group(&mut self, handle: WindowHandle) -> bool {
        let members = self.group_members(handle);
        if members.is_empty() {
            return false;
        }
        if members.len() == 1
            && self
                .window(handle)
                .is_some_and(|w| w.group_rules.contains(GroupRules::SET_ALWAYS))
        {
            debug!("Group of {:?} must stay a group", handle);
            return false;
        }

        for &member in &members {
            if let Some(window) = self.windows.get_mut(member) {
                let deny = window.group.deny;
                window.group = GroupData { deny, ..GroupData::default() };
            }
            self.remove_group_bar(member);
            self.apply_hidden(member, false);
        }

        debug!("Dissolved group of {} windows", members.len());
        self.push_event(CoreEvent::GroupDissolved { members });
        true
    }

    /// Show `handle` and hide every other member. Placement, focus and
    /// fullscreen move over from the previous current member.
    pub fn set_group_current(&mut self, handle: WindowHandle) -> bool {
        let members = self.ring_from(handle);
        if members.is_empty() {
            return false;
        }
        let previous = members
            .iter()
            .copied()
            .filter(|&h| h != handle)
            .find(|&h| self.window(h).is_some_and(|w| w.flags.mapped && w.group.current));

        let mut mode = FullscreenMode::None;
        if let Some(previous) = previous {
            mode = self.window(previous).map_or(FullscreenMode::None, |w| w.fullscreen.internal);
            if mode != FullscreenMode::None {
                if let Err(err) = self.set_fullscreen_internal(previous, FullscreenMode::None) {
                    warn!("Failed to drop fullscreen of {:?}: {}", previous, err);
                }
            }
            let placement = self.window(previous).map(|w| (w.box_goal(), w.flags.floating));
            if let Some((rect, floating)) = placement {
                if let Some(window) = self.windows.get_mut(handle) {
                    window.flags.floating = floating;
                }
                if let Err(err) = self.set_window_box(handle, rect, false) {
                    warn!("Failed to place {:?}: {}", handle, err);
                }
            }
        }

        for &member in &members {
            if let Some(window) = self.windows.get_mut(member) {
                window.group.current = member == handle;
            }
            self.apply_hidden(member, member != handle);
        }

        if previous.is_some_and(|p| self.focused_window() == Some(p)) {
            self.focus_window(Some(handle));
        }
        if mode != FullscreenMode::None {
            if let Err(err) = self.set_fullscreen_internal(handle, mode) {
                warn!("Failed to carry fullscreen over to {:?}: {}", handle, err);
            }
        }

        let head = self.group_head(handle).unwrap_or(handle);
        self.push_event(CoreEvent::GroupChanged { head, current: handle });
        true
    }

    /// Show the next (or previous) member. Returns the new current member.
    pub fn change_group_active(&mut self, handle: WindowHandle, forward: bool) -> Option<WindowHandle> {
        let current = self.group_current(handle)?;
        let target = if forward {
            self.window(current).and_then(|w| w.group.next)?
        } else {
            self.group_previous(current)?
        };
        if target != current {
            self.set_group_current(target);
        }
        Some(target)
    }

    /// Swap the ring positions of two members of the same group
    pub fn switch_with_window_in_group(&mut self, a: WindowHandle, b: WindowHandle) -> bool {
        if a == b {
            return false;
        }
        let mut members = self.group_members(a);
        let (Some(ia), Some(ib)) = (
            members.iter().position(|&h| h == a),
            members.iter().position(|&h| h == b),
        ) else {
            return false;
        };
        let locked = self.is_group_locked(a);
        members.swap(ia, ib);
        self.relink(&members, locked);

        let current = self.group_current(a).unwrap_or(a);
        self.push_event(CoreEvent::GroupChanged { head: members[0], current });
        true
    }

    fn relink(&mut self, members: &[WindowHandle], locked: bool) {
        for (index, &member) in members.iter().enumerate() {
            let next = members[(index + 1) % members.len()];
            if let Some(window) = self.windows.get_mut(member) {
                window.group.next = Some(next);
                window.group.head = index == 0;
                window.group.locked = index == 0 && locked;
            }
        }
    }

    /// Group rules of the current map: form a group and lock it
    pub fn apply_group_rules(&mut self, handle: WindowHandle) {
        let Some(window) = self.window(handle) else {
            return;
        };
        let rules = window.group_rules;
        let first_map = window.flags.first_map;

        if ((rules.contains(GroupRules::SET) && first_map) || rules.contains(GroupRules::SET_ALWAYS))
            && !window.group.is_grouped()
        {
            self.create_group(handle);
        }

        if self.is_grouped(handle)
            && ((rules.contains(GroupRules::LOCK) && first_map) || rules.contains(GroupRules::LOCK_ALWAYS))
        {
            self.set_group_locked(handle, true);
        }
    }

    /// Join the focused window's group if it will have us
    pub(crate) fn auto_group(&mut self, handle: WindowHandle) -> bool {
        if !self.config.group.auto_group {
            return false;
        }
        let Some(focused) = self.focused_window().filter(|&f| f != handle) else {
            return false;
        };
        let same_workspace = self.window(focused).map(|w| w.workspace()) == self.window(handle).map(|w| w.workspace());
        if !same_workspace || !self.is_grouped(focused) || !self.can_be_grouped_into(handle, focused) {
            return false;
        }
        let target = if self.config.group.insert_after_current {
            self.group_current(focused)
        } else {
            self.group_tail(focused)
        };
        target.is_some_and(|target| self.insert_window_to_group(handle, target))
    }

    fn add_group_bar(&mut self, handle: WindowHandle) {
        let height = self.config.group.bar_height as f64;
        if let Some(window) = self.windows.get_mut(handle) {
            if !window.decorations.has_kind(DecorationType::GroupBar) {
                window.decorations.add(Box::new(GroupBarDecoration::new(height)));
            }
        }
    }

    fn remove_group_bar(&mut self, handle: WindowHandle) {
        if let Some(window) = self.windows.get_mut(handle) {
            window.decorations.remove_kind(DecorationType::GroupBar);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::desktop::rules::WindowRule;
    use crate::desktop::testing::{desktop_with_two_workspaces, map_new};

    fn assert_simple_ring(desktop: &Desktop, handle: WindowHandle, expected_len: usize) {
        let members = desktop.group_members(handle);
        assert_eq!(members.len(), expected_len);
        let heads = members.iter().filter(|&&h| desktop.window(h).unwrap().group.head).count();
        assert_eq!(heads, 1);
        let visible: Vec<WindowHandle> = members
            .iter()
            .copied()
            .filter(|&h| !desktop.window(h).unwrap().is_hidden())
            .collect();
        let current: Vec<WindowHandle> = members
            .iter()
            .copied()
            .filter(|&h| desktop.window(h).unwrap().group.current)
            .collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible, current);
        for (i, &member) in members.iter().enumerate() {
            let next = desktop.window(member).unwrap().group.next.unwrap();
            assert_eq!(next, members[(i + 1) % members.len()]);
        }
    }

    fn group_of_three(desktop: &mut Desktop) -> (WindowHandle, WindowHandle, WindowHandle) {
        let a = map_new(desktop, vec![WindowRule::Group { rules: GroupRules::SET }]);
        let b = map_new(desktop, vec![]);
        let c = map_new(desktop, vec![]);
        (a, b, c)
    }

    #[test]
    fn test_new_windows_join_focused_group() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let (a, b, c) = group_of_three(&mut desktop);

        assert_simple_ring(&desktop, a, 3);
        assert_eq!(desktop.group_head(c), Some(a));
        assert_eq!(desktop.group_current(a), Some(c));
        // inserted after the current member each time
        assert_eq!(desktop.group_members(a), vec![a, b, c]);
        assert_eq!(desktop.group_tail(a), Some(c));
        assert_eq!(desktop.group_previous(a), Some(c));
    }

    #[test]
    fn test_singleton_index_lookup() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![WindowRule::Group { rules: GroupRules::SET }]);

        assert_eq!(desktop.group_size(a), 1);
        for index in [0, 1, -1, 7, -13] {
            assert_eq!(desktop.group_window_by_index(a, index), Some(a));
        }
    }

    #[test]
    fn test_index_lookup_wraps() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let (a, b, c) = group_of_three(&mut desktop);

        assert_eq!(desktop.group_window_by_index(b, 0), Some(a));
        assert_eq!(desktop.group_window_by_index(b, -1), Some(c));
        assert_eq!(desktop.group_window_by_index(b, 4), Some(b));
    }

    #[test]
    fn test_locked_group_rejects_without_invade() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![WindowRule::Group { rules: GroupRules::SET | GroupRules::LOCK }]);
        assert!(desktop.is_group_locked(a));

        let outsider = map_new(&mut desktop, vec![]);
        assert!(!desktop.is_grouped(outsider));
        assert!(!desktop.insert_window_to_group(outsider, a));

        // invaders only get in while first mapping
        desktop.focus_window(Some(a));
        let invader = map_new(&mut desktop, vec![WindowRule::Group { rules: GroupRules::INVADE }]);
        assert_eq!(desktop.group_head(invader), Some(a));
        assert_simple_ring(&desktop, a, 2);
    }

    #[test]
    fn test_barred_and_denied_windows_stay_out() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![WindowRule::Group { rules: GroupRules::SET }]);
        let barred = map_new(&mut desktop, vec![WindowRule::Group { rules: GroupRules::BARRED }]);
        assert!(!desktop.is_grouped(barred));

        // barring only covers automatic insertion
        assert!(desktop.insert_window_to_group(barred, a));

        let loner = map_new(&mut desktop, vec![]);
        desktop.move_out_of_group(loner);
        desktop.set_group_deny(loner, true);
        assert!(!desktop.insert_window_to_group(loner, a));
        assert!(!desktop.create_group(loner));
    }

    #[test]
    fn test_set_current_hides_others() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let (a, b, _c) = group_of_three(&mut desktop);

        assert!(desktop.set_group_current(b));
        assert_simple_ring(&desktop, a, 3);
        assert_eq!(desktop.group_current(a), Some(b));
        assert_eq!(desktop.focused_window(), Some(b));

        assert_eq!(desktop.change_group_active(a, true), Some(desktop.group_window_by_index(a, 2).unwrap()));
        assert_eq!(desktop.change_group_active(a, false), Some(b));
        assert_simple_ring(&desktop, a, 3);
    }

    #[test]
    fn test_switch_positions() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let (a, b, c) = group_of_three(&mut desktop);
        desktop.set_group_locked(a, true);

        assert!(desktop.switch_with_window_in_group(a, c));
        assert_eq!(desktop.group_members(b), vec![c, b, a]);
        assert!(desktop.is_group_locked(b));
        assert_simple_ring(&desktop, a, 3);
    }

    #[test]
    fn test_removing_members_keeps_ring() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let (a, b, c) = group_of_three(&mut desktop);

        // removing the head hands the role on
        desktop.move_out_of_group(a);
        assert!(!desktop.is_grouped(a));
        assert!(!desktop.window(a).unwrap().is_hidden());
        assert_eq!(desktop.group_head(c), Some(b));
        assert_simple_ring(&desktop, b, 2);

        // removing the current member shows another one
        desktop.move_out_of_group(c);
        assert_simple_ring(&desktop, b, 1);
        assert!(!desktop.window(b).unwrap().is_hidden());
    }

    #[test]
    fn test_destroy_group() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let (a, b, c) = group_of_three(&mut desktop);
        desktop.take_events();

        assert!(desktop.destroy_group(b));
        for w in [a, b, c] {
            let window = desktop.window(w).unwrap();
            assert!(!window.group.is_grouped());
            assert!(!window.is_hidden());
            assert!(!window.decorations.has_kind(DecorationType::GroupBar));
        }
        assert!(desktop
            .take_events()
            .iter()
            .any(|e| matches!(e, CoreEvent::GroupDissolved { members } if members.len() == 3)));
    }

    #[test]
    fn test_set_always_singleton_refuses_to_dissolve() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![WindowRule::Group { rules: GroupRules::SET_ALWAYS }]);
        assert!(desktop.is_grouped(a));
        assert!(!desktop.destroy_group(a));
        assert!(desktop.is_grouped(a));
    }

    #[test]
    fn test_merging_whole_groups() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let a = map_new(&mut desktop, vec![WindowRule::Group { rules: GroupRules::SET }]);
        let b = map_new(&mut desktop, vec![]);

        let mut config_free = Config::default();
        config_free.group.auto_group = false;
        desktop.set_config(config_free);
        let x = map_new(&mut desktop, vec![]);
        assert!(desktop.create_group(x));
        let y = map_new(&mut desktop, vec![]);
        assert!(!desktop.is_grouped(y));
        assert!(desktop.insert_window_to_group(y, x));

        assert!(desktop.insert_window_to_group(x, b));
        assert_simple_ring(&desktop, a, 4);
        assert_eq!(desktop.group_members(y), vec![a, b, x, y]);
    }

    #[test]
    fn test_ring_stays_simple_under_mixed_operations() {
        let mut desktop = desktop_with_two_workspaces(Config::default());
        let mut windows = vec![map_new(&mut desktop, vec![WindowRule::Group { rules: GroupRules::SET }])];
        let mut seed: u32 = 7;
        let mut next = || {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (seed >> 16) as usize
        };

        for _ in 0..200 {
            let op = next() % 5;
            let window = windows[next() % windows.len()];
            let other = windows[next() % windows.len()];
            match op {
                0 => windows.push(map_new(&mut desktop, vec![])),
                1 => {
                    if !desktop.is_grouped(other) {
                        desktop.create_group(other);
                    }
                    desktop.insert_window_to_group(window, other);
                }
                2 => {
                    desktop.move_out_of_group(window);
                }
                3 => {
                    desktop.destroy_group(window);
                }
                _ => {
                    desktop.on_unmap(window).unwrap();
                    windows.retain(|&h| h != window);
                    if windows.is_empty() {
                        windows.push(map_new(&mut desktop, vec![]));
                    }
                }
            }

            for &handle in &windows {
                let w = desktop.window(handle).unwrap();
                if w.group.is_grouped() {
                    let size = desktop.group_size(handle);
                    assert_eq!(desktop.group_members(handle).len(), size);
                    assert_simple_ring(&desktop, handle, size);
                } else {
                    assert!(!w.group.head && !w.group.current);
                }
            }
        }
    }
}
