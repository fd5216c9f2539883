// In-memory session table
// Decision: One table object per process, shared through Arc, never a static
// Decision: parking_lot::Mutex; no lock is held across an await point

use std::collections::HashMap;

use parking_lot::Mutex;

use super::SessionRecord;

#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: SessionRecord) {
        self.sessions
            .lock()
            .insert(record.session_id.clone(), record);
    }

    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.lock().get(session_id).cloned()
    }

    pub fn remove(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.lock().remove(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
