use std::time::{Duration, Instant};

const DISPLAY_DURATION: Duration = Duration::from_secs(3);

#[derive(Clone, Debug)]
pub(crate) struct Notice {
    message: String,
    posted_at: Instant,
}

impl Notice {
    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

/// Holds at most one transient notice. A new notice replaces the current one
/// and every notice disappears on its own after [`DISPLAY_DURATION`].
#[derive(Default)]
pub(crate) struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn post(&mut self, message: impl Into<String>) {
        self.post_at(message, Instant::now());
    }

    pub(crate) fn current(&mut self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    fn post_at(&mut self, message: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            message: message.into(),
            posted_at: now,
        });
    }

    fn current_at(&mut self, now: Instant) -> Option<&Notice> {
        if self
            .current
            .as_ref()
            .is_some_and(|notice| now.duration_since(notice.posted_at) >= DISPLAY_DURATION)
        {
            self.current = None;
        }
        self.current.as_ref()
    }
}
