//! Per-session state for user-facing notices.
//!
//! Failed pastes tend to come in bursts (a multi-file drop of unsupported
//! files). The session shows the first notice and swallows repeats until the
//! cooldown has passed. The state lives here, owned by whoever drives the
//! session, and never in the document core.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

/// Default quiet period between two notices.
pub const NOTICE_COOLDOWN_MS: i64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeSession {
    /// When the last notice was shown.
    pub last_notice_ms: Option<i64>,
    pub cooldown_ms: i64,
}

impl Default for NoticeSession {
    fn default() -> Self {
        Self::new(NOTICE_COOLDOWN_MS)
    }
}

impl NoticeSession {
    #[must_use]
    pub fn new(cooldown_ms: i64) -> Self {
        Self { last_notice_ms: None, cooldown_ms }
    }

    /// Whether a notice at `now_ms` should be shown. Records it if so.
    pub fn should_notify(&mut self, now_ms: i64) -> bool {
        let quiet = self.last_notice_ms.is_none_or(|last| now_ms - last >= self.cooldown_ms);
        if quiet {
            self.last_notice_ms = Some(now_ms);
        }
        quiet
    }
}
