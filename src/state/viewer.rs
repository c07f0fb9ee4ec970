/// Viewer controller: playback state machine for the full-screen viewer.
///
/// Sits on top of the store's cursor. Every move into `Open` marks the
/// story as viewed; running out of stories closes the viewer.
use super::data::{Story, StoryId};
use super::store::StoryStore;

/// Default time each story stays on screen
pub const STORY_DURATION_MS: u32 = 5_000;
/// Default progress step per playback tick
pub const TICK_MS: u32 = 100;

/// Navigation intents delivered by keyboard, gesture or buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Next,
    Previous,
    Close,
    Delete,
}

/// Playback state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    Closed,
    Open {
        story_id: StoryId,
        index: usize,
        /// Milliseconds of the current story already played
        elapsed_ms: u32,
        paused: bool,
    },
}

#[derive(Debug, Clone)]
pub struct ViewerController {
    playback: Playback,
    duration_ms: u32,
    tick_ms: u32,
}

impl Default for ViewerController {
    fn default() -> Self {
        Self::new(STORY_DURATION_MS, TICK_MS)
    }
}

impl ViewerController {
    pub fn new(duration_ms: u32, tick_ms: u32) -> Self {
        Self {
            playback: Playback::Closed,
            duration_ms: duration_ms.max(1),
            tick_ms: tick_ms.max(1),
        }
    }

    #[cfg(test)]
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn is_open(&self) -> bool {
        matches!(self.playback, Playback::Open { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.playback, Playback::Open { paused: true, .. })
    }

    /// True while the tick timer should be running
    pub fn is_playing(&self) -> bool {
        matches!(self.playback, Playback::Open { paused: false, .. })
    }

    pub fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    /// Position within the active sequence, 0 while closed
    pub fn index(&self) -> usize {
        match self.playback {
            Playback::Open { index, .. } => index,
            Playback::Closed => 0,
        }
    }

    /// Playback progress of the current story in percent (0..=100)
    pub fn progress_percent(&self) -> f32 {
        match self.playback {
            Playback::Open { elapsed_ms, .. } => {
                (elapsed_ms as f32 * 100.0 / self.duration_ms as f32).min(100.0)
            }
            Playback::Closed => 0.0,
        }
    }

    /// Fill level of each progress segment for `count` active stories
    pub fn segments(&self, count: usize) -> Vec<f32> {
        let current = self.index();
        let progress = self.progress_percent();
        (0..count)
            .map(|i| {
                if !self.is_open() {
                    0.0
                } else if i < current {
                    100.0
                } else if i == current {
                    progress
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Open the viewer on `story` at `index` of the active sequence.
    pub fn open(&mut self, store: &mut StoryStore, story: &Story, index: usize) {
        store.set_cursor(story, index);
        self.enter(store, false);
    }

    /// Open on the `index`-th active story; ignored when out of range.
    pub fn open_at(&mut self, store: &mut StoryStore, index: usize) {
        let active = store.active_stories();
        if let Some(story) = active.get(index) {
            self.open(store, story, index);
        }
    }

    /// One playback step. Suppressed while paused or closed.
    pub fn tick(&mut self, store: &mut StoryStore) {
        let Playback::Open { elapsed_ms, paused: false, .. } = &mut self.playback else {
            return;
        };
        *elapsed_ms = elapsed_ms.saturating_add(self.tick_ms);
        let finished = *elapsed_ms >= self.duration_ms;

        if finished {
            self.advance(store);
        } else {
            self.reconcile(store);
        }
    }

    /// Re-align playback with the active sequence after it changed.
    ///
    /// A story that expired or was removed mid-session is treated as gone:
    /// move on to whatever follows it, or close. Otherwise the index follows
    /// the story to its new position.
    pub fn reconcile(&mut self, store: &mut StoryStore) {
        if !self.is_open() {
            return;
        }
        match store.resync_cursor() {
            Some(position) => {
                if let Playback::Open { index, .. } = &mut self.playback {
                    *index = position;
                }
            }
            None => self.advance(store),
        }
    }

    /// Move to the next story, closing when the sequence is exhausted.
    pub fn advance(&mut self, store: &mut StoryStore) {
        let Playback::Open { paused, .. } = self.playback else {
            return;
        };

        if store.next_cursor() {
            self.enter(store, paused);
        } else {
            self.close(store);
        }
    }

    /// Move to the previous story. Stays put on the first story.
    pub fn retreat(&mut self, store: &mut StoryStore) {
        let Playback::Open { paused, .. } = self.playback else {
            return;
        };

        if store.previous_cursor() {
            self.enter(store, paused);
        } else if let Playback::Open { elapsed_ms, .. } = &mut self.playback {
            *elapsed_ms = 0;
        }
    }

    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.set_paused(false);
    }

    pub fn toggle_pause(&mut self) {
        let paused = self.is_paused();
        self.set_paused(!paused);
    }

    /// Remove the current story, then continue as `advance` would.
    pub fn delete_current(&mut self, store: &mut StoryStore) {
        let Playback::Open { story_id, .. } = &self.playback else {
            return;
        };
        let story_id = story_id.clone();

        store.remove_story(&story_id);
        self.advance(store);
    }

    pub fn close(&mut self, store: &mut StoryStore) {
        store.clear_cursor();
        self.playback = Playback::Closed;
    }

    pub fn handle(&mut self, store: &mut StoryStore, intent: Intent) {
        if !self.is_open() {
            return;
        }
        match intent {
            Intent::Next => self.advance(store),
            Intent::Previous => self.retreat(store),
            Intent::Close => self.close(store),
            Intent::Delete => self.delete_current(store),
        }
    }

    /// Sync playback with the store cursor and mark the story viewed.
    fn enter(&mut self, store: &mut StoryStore, paused: bool) {
        let Some(cursor) = store.cursor().cloned() else {
            self.playback = Playback::Closed;
            return;
        };

        let unviewed = store
            .current_story()
            .is_some_and(|story| !story.viewed);
        if unviewed {
            store.mark_viewed(&cursor.story_id);
        }

        self.playback = Playback::Open {
            story_id: cursor.story_id,
            index: cursor.index,
            elapsed_ms: 0,
            paused,
        };
    }

    fn set_paused(&mut self, value: bool) {
        if let Playback::Open { paused, .. } = &mut self.playback {
            *paused = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::STORY_TTL_MS;
    use crate::state::store::tests::{image, store_at};

    /// Two stories: B (newest, index 0) and A (index 1)
    fn two_stories() -> (StoryStore, std::sync::Arc<crate::state::clock::ManualClock>, Story, Story) {
        let (mut store, clock) = store_at(0);
        let a = store.add_story(image(1));
        clock.set(1_000);
        let b = store.add_story(image(2));
        (store, clock, a, b)
    }

    fn current_id(viewer: &ViewerController) -> Option<StoryId> {
        match viewer.playback() {
            Playback::Open { story_id, .. } => Some(story_id.clone()),
            Playback::Closed => None,
        }
    }

    #[test]
    fn test_open_marks_viewed() {
        let (mut store, _clock, _a, b) = two_stories();
        let mut viewer = ViewerController::default();

        viewer.open(&mut store, &b, 0);

        assert!(viewer.is_playing());
        assert_eq!(viewer.progress_percent(), 0.0);
        assert!(store.active_stories()[0].viewed);
        assert!(!store.active_stories()[1].viewed);
    }

    #[test]
    fn test_fifty_ticks_advance_exactly_once() {
        let (mut store, _clock, a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &b, 0);

        for _ in 0..49 {
            viewer.tick(&mut store);
        }
        assert_eq!(current_id(&viewer), Some(b.id.clone()));
        assert_eq!(viewer.progress_percent(), 98.0);

        viewer.tick(&mut store);
        assert_eq!(current_id(&viewer), Some(a.id.clone()));
        assert_eq!(viewer.index(), 1);
        assert_eq!(viewer.progress_percent(), 0.0);
        assert!(store.active_stories()[1].viewed);
    }

    #[test]
    fn test_autoplay_closes_after_last_story() {
        let (mut store, _clock, _a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &b, 0);

        for _ in 0..100 {
            viewer.tick(&mut store);
        }

        assert_eq!(viewer.playback(), &Playback::Closed);
        assert!(store.cursor().is_none());
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn test_pause_suppresses_ticks() {
        let (mut store, _clock, _a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &b, 0);

        viewer.tick(&mut store);
        viewer.pause();
        assert!(!viewer.is_playing());
        for _ in 0..100 {
            viewer.tick(&mut store);
        }
        assert_eq!(current_id(&viewer), Some(b.id.clone()));
        assert_eq!(viewer.progress_percent(), 2.0);

        viewer.resume();
        viewer.tick(&mut store);
        assert_eq!(viewer.progress_percent(), 4.0);
    }

    #[test]
    fn test_advance_keeps_pause_state() {
        let (mut store, _clock, a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &b, 0);
        viewer.toggle_pause();

        viewer.handle(&mut store, Intent::Next);

        assert_eq!(current_id(&viewer), Some(a.id));
        assert!(viewer.is_paused());
    }

    #[test]
    fn test_retreat_on_first_story_stays_open() {
        let (mut store, _clock, a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &a, 1);
        viewer.tick(&mut store);

        viewer.handle(&mut store, Intent::Previous);
        assert_eq!(current_id(&viewer), Some(b.id.clone()));
        assert_eq!(viewer.index(), 0);
        assert_eq!(viewer.progress_percent(), 0.0);

        viewer.handle(&mut store, Intent::Previous);
        assert_eq!(current_id(&viewer), Some(b.id));
        assert!(viewer.is_open());
    }

    #[test]
    fn test_delete_moves_to_next_story() {
        let (mut store, clock, a, b) = two_stories();
        clock.set(2_000);
        let c = store.add_story(image(3));
        let mut viewer = ViewerController::default();
        // Sequence is [C, B, A]
        viewer.open(&mut store, &b, 1);

        viewer.handle(&mut store, Intent::Delete);

        assert_eq!(current_id(&viewer), Some(a.id.clone()));
        assert_eq!(viewer.index(), 1);
        let ids: Vec<_> = store.active_stories().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![c.id, a.id]);
    }

    #[test]
    fn test_delete_last_story_closes() {
        let (mut store, _clock, a, _b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &a, 1);

        viewer.delete_current(&mut store);

        assert!(!viewer.is_open());
        assert_eq!(store.active_stories().len(), 1);
        assert!(store.current_story().is_none());
    }

    #[test]
    fn test_close_resets_progress() {
        let (mut store, _clock, _a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &b, 0);
        viewer.tick(&mut store);

        viewer.handle(&mut store, Intent::Close);

        assert_eq!(viewer.progress_percent(), 0.0);
        assert_eq!(viewer.index(), 0);
        assert!(store.cursor().is_none());
    }

    #[test]
    fn test_expired_current_story_is_skipped() {
        let (mut store, clock, _a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &b, 0);

        // Both stories age out while the viewer is open
        clock.set(1_000 + STORY_TTL_MS);
        viewer.tick(&mut store);

        assert!(!viewer.is_open());
    }

    #[test]
    fn test_reconcile_while_paused() {
        let (mut store, clock, a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &a, 1);
        viewer.pause();

        // Only A (the older story) has expired
        clock.set(STORY_TTL_MS + 500);
        viewer.reconcile(&mut store);
        assert!(!viewer.is_open());

        viewer.open(&mut store, &b, 0);
        viewer.reconcile(&mut store);
        assert_eq!(current_id(&viewer), Some(b.id));
    }

    #[test]
    fn test_intents_ignored_while_closed() {
        let (mut store, _clock, _a, _b) = two_stories();
        let mut viewer = ViewerController::default();

        viewer.handle(&mut store, Intent::Delete);
        viewer.tick(&mut store);
        viewer.pause();

        assert!(!viewer.is_open());
        assert!(!viewer.is_paused());
        assert_eq!(store.active_stories().len(), 2);
    }

    #[test]
    fn test_open_at_out_of_range_is_ignored() {
        let (mut store, _clock, _a, _b) = two_stories();
        let mut viewer = ViewerController::default();

        viewer.open_at(&mut store, 5);
        assert!(!viewer.is_open());

        viewer.open_at(&mut store, 1);
        assert_eq!(viewer.index(), 1);
    }

    #[test]
    fn test_segments_fill_before_current() {
        let (mut store, clock, _a, _b) = two_stories();
        clock.set(2_000);
        store.add_story(image(3));
        let mut viewer = ViewerController::default();
        viewer.open_at(&mut store, 1);
        for _ in 0..25 {
            viewer.tick(&mut store);
        }

        assert_eq!(viewer.segments(3), vec![100.0, 50.0, 0.0]);
    }

    #[test]
    fn test_upload_while_open_shifts_index() {
        let (mut store, clock, a, b) = two_stories();
        let mut viewer = ViewerController::default();
        viewer.open(&mut store, &b, 0);
        for _ in 0..25 {
            viewer.tick(&mut store);
        }

        clock.set(2_000);
        store.add_story(image(3));
        viewer.reconcile(&mut store);

        // Sequence is now [C, B, A]
        assert_eq!(viewer.index(), 1);
        assert_eq!(store.current_index(), 1);
        assert_eq!(current_id(&viewer), Some(b.id));
        assert_eq!(viewer.segments(3), vec![100.0, 50.0, 0.0]);

        viewer.advance(&mut store);
        assert_eq!(current_id(&viewer), Some(a.id));
        assert_eq!(viewer.index(), 2);
    }
}
