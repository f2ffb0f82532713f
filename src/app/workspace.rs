// Session workspace - State one interaction round works on

use crate::domain::session::SessionContext;
use crate::engine::lifecycle::LifecycleManager;

/// A loaded session together with the lifecycle manager owning its files
pub struct SessionWorkspace {
    pub context: SessionContext,
    pub lifecycle: LifecycleManager,
}

impl SessionWorkspace {
    pub fn new(context: SessionContext, lifecycle: LifecycleManager) -> Self {
        Self { context, lifecycle }
    }
}
