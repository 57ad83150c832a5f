//! Initial workspace tokens
//!
//! A launcher registers a token naming the workspace it was on; the
//! window started with that token maps there instead of wherever focus
//! happens to be by then.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::desktop::window::WindowHandle;
use crate::desktop::workspace::WorkspaceId;

#[derive(Debug, Clone)]
pub struct InitialWorkspaceToken {
    /// Window that requested the launch
    pub owner: WindowHandle,
    pub workspace: WorkspaceId,
    created: Instant,
}

#[derive(Debug, Clone)]
pub struct WorkspaceTokens {
    tokens: HashMap<String, InitialWorkspaceToken>,
    next_id: u64,
    timeout: Duration,
}

impl WorkspaceTokens {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tokens: HashMap::new(),
            next_id: 1,
            timeout,
        }
    }

    pub fn register(&mut self, owner: WindowHandle, workspace: WorkspaceId, now: Instant) -> String {
        let token = format!("area-ws-{}", self.next_id);
        self.next_id += 1;
        self.tokens.insert(token.clone(), InitialWorkspaceToken { owner, workspace, created: now });
        debug!("Registered workspace token {} for workspace {}", token, workspace);
        token
    }

    /// Workspace a token points at. Expired tokens and tokens whose owner
    /// is gone resolve to nothing and are dropped.
    pub fn resolve(
        &mut self,
        token: &str,
        now: Instant,
        owner_valid: impl Fn(WindowHandle) -> bool,
    ) -> Option<WorkspaceId> {
        let entry = self.tokens.get(token)?;
        if now.saturating_duration_since(entry.created) > self.timeout {
            debug!("Workspace token {} expired", token);
            self.tokens.remove(token);
            return None;
        }
        if !owner_valid(entry.owner) {
            debug!("Owner of workspace token {} is gone", token);
            self.tokens.remove(token);
            return None;
        }
        Some(entry.workspace)
    }

    pub fn remove(&mut self, token: &str) {
        self.tokens.remove(token);
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Applies to tokens already registered as well
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Drop every expired token
    pub fn prune(&mut self, now: Instant) {
        let timeout = self.timeout;
        self.tokens
            .retain(|_, entry| now.saturating_duration_since(entry.created) <= timeout);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_tokens_expire() {
        let mut handles: SlotMap<WindowHandle, ()> = SlotMap::with_key();
        let owner = handles.insert(());
        let start = Instant::now();
        let mut tokens = WorkspaceTokens::new(Duration::from_secs(10));

        let token = tokens.register(owner, WorkspaceId(4), start);
        assert_eq!(tokens.resolve(&token, start + Duration::from_secs(5), |_| true), Some(WorkspaceId(4)));
        assert_eq!(tokens.resolve(&token, start + Duration::from_secs(11), |_| true), None);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokens_need_live_owner() {
        let mut handles: SlotMap<WindowHandle, ()> = SlotMap::with_key();
        let owner = handles.insert(());
        let now = Instant::now();
        let mut tokens = WorkspaceTokens::new(Duration::from_secs(10));
        let token = tokens.register(owner, WorkspaceId(2), now);

        handles.remove(owner);
        assert_eq!(tokens.resolve(&token, now, |h| handles.contains_key(h)), None);
        assert_eq!(tokens.resolve("unknown", now, |_| true), None);
    }

    #[test]
    fn test_prune() {
        let mut handles: SlotMap<WindowHandle, ()> = SlotMap::with_key();
        let owner = handles.insert(());
        let start = Instant::now();
        let mut tokens = WorkspaceTokens::new(Duration::from_secs(1));
        tokens.register(owner, WorkspaceId(1), start);
        tokens.register(owner, WorkspaceId(2), start + Duration::from_secs(2));

        tokens.prune(start + Duration::from_millis(2500));
        assert_eq!(tokens.len(), 1);
    }
}
