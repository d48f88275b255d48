//! Notification sink boundary.
//!
//! The host platform (chat service, terminal, test harness) implements
//! [`NotificationSink`]. The engine never renders or delivers messages
//! itself -- it hands content to the sink and remembers the returned
//! handle when it needs to edit a live display later.

use uuid::Uuid;

/// Opaque handle to a message the sink has delivered.
///
/// The sink mints it on `send`; the engine passes it back on `edit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(Uuid);

impl DisplayHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DisplayHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// External message delivery. Implementations may block internally
/// (the engine calls this from its scheduler tasks, never under a lock).
pub trait NotificationSink: Send + Sync {
    /// Deliver a new message, returning a handle for later edits.
    fn send(&self, content: &str) -> Result<DisplayHandle, Box<dyn std::error::Error>>;

    /// Replace the content of a previously sent message.
    /// Returns false if the message is gone or the edit was refused.
    fn edit(&self, handle: DisplayHandle, content: &str) -> bool;
}

/// In-memory sink that records everything, for tests.
#[cfg(test)]
pub struct RecordingSink {
    pub sent: std::sync::Mutex<Vec<(DisplayHandle, String)>>,
    pub edits: std::sync::Mutex<Vec<(DisplayHandle, String)>>,
    pub fail_edits: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            edits: std::sync::Mutex::new(Vec::new()),
            fail_edits: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn sent_contents(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }
}

#[cfg(test)]
impl NotificationSink for RecordingSink {
    fn send(&self, content: &str) -> Result<DisplayHandle, Box<dyn std::error::Error>> {
        let handle = DisplayHandle::new();
        self.sent.lock().unwrap().push((handle, content.to_string()));
        Ok(handle)
    }

    fn edit(&self, handle: DisplayHandle, content: &str) -> bool {
        if self.fail_edits.load(std::sync::atomic::Ordering::SeqCst) {
            return false;
        }
        self.edits.lock().unwrap().push((handle, content.to_string()));
        true
    }
}
