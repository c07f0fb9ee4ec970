/// Transient, auto-dismissing user notices (upload errors)
use std::time::Duration;

/// Default on-screen lifetime of a notice
pub const NOTICE_DURATION: Duration = Duration::from_millis(3_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

/// Holds at most one notice; posting replaces the previous one
#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    /// Show `message`, returning the id to dismiss it with later
    pub fn post(&mut self, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        self.current = Some(Notice {
            id: self.next_id,
            message: message.into(),
        });
        self.next_id
    }

    /// Dismiss the notice with `id`. A newer notice is left alone.
    pub fn dismiss(&mut self, id: u64) {
        if self.current.as_ref().is_some_and(|notice| notice.id == id) {
            self.current = None;
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_dismiss() {
        let mut board = NoticeBoard::default();
        let id = board.post("Image size must be less than 10MB");

        assert_eq!(board.current().unwrap().message, "Image size must be less than 10MB");
        board.dismiss(id);
        assert!(board.current().is_none());
    }

    #[test]
    fn test_stale_dismiss_keeps_newer_notice() {
        let mut board = NoticeBoard::default();
        let first = board.post("first");
        let second = board.post("second");

        board.dismiss(first);
        assert_eq!(board.current().unwrap().id, second);
    }
}
