//! Online/offline signal consulted when deciding whether to bypass the cache

use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether the device currently has network access
pub trait Connectivity: Send + Sync + std::fmt::Debug {
    fn is_online(&self) -> bool;
}

/// Always reports online
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// A connectivity flag that can be flipped at runtime
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
