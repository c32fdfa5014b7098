use std::collections::HashSet;
use std::sync::Mutex;

/// Session-scoped view markers. A "session" is bounded by the process
/// lifetime here, the headless analogue of a browser tab session; markers
/// intentionally do not survive restarts.
pub trait SessionStore: Send + Sync {
    /// Marks `slug` as viewed. Returns true when this is the first view of
    /// the session. Marking twice has no additional effect.
    fn mark_viewed(&self, slug: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    viewed: Mutex<HashSet<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn mark_viewed(&self, slug: &str) -> bool {
        let mut viewed = self.viewed.lock().expect("session markers");
        viewed.insert(slug.to_string())
    }
}
