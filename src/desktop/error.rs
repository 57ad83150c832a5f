use thiserror::Error;

use crate::desktop::workspace::{MonitorId, WorkspaceId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesktopError {
    #[error("window handle is stale or was never valid")]
    InvalidWindow,

    #[error("unknown workspace {0}")]
    UnknownWorkspace(WorkspaceId),

    #[error("unknown monitor {0}")]
    UnknownMonitor(MonitorId),

    #[error("workspace {0} already exists")]
    DuplicateWorkspace(WorkspaceId),

    #[error("monitor {0} already exists")]
    DuplicateMonitor(MonitorId),

    #[error("no workspace to place the window on")]
    NoWorkspace,
}
