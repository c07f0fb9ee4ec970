/// Story store: the single source of truth for the story collection
/// and the transient viewing cursor.
///
/// Expiration is never stored; it is computed from `now - created_at`
/// against the shared clock every time the active sequence is needed.
/// Sweeps only reclaim storage.
use std::collections::HashSet;
use std::sync::Arc;

use super::clock::Clock;
use super::data::{EncodedImage, Story, StoryId};
use super::library::StoryPersistence;

/// Position of the story currently shown full-screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub story_id: StoryId,
    pub index: usize,
}

pub struct StoryStore {
    /// Newest first
    stories: Vec<Story>,
    /// `None` while the viewer is closed
    cursor: Option<Cursor>,
    clock: Arc<dyn Clock + Send + Sync>,
    persistence: Box<dyn StoryPersistence>,
    /// Cleared when the stored record could not be read, so this session
    /// never overwrites it
    writable: bool,
}

impl StoryStore {
    /// Restore the collection from `persistence`, dropping expired
    /// stories and duplicate ids.
    pub fn load(
        clock: Arc<dyn Clock + Send + Sync>,
        persistence: Box<dyn StoryPersistence>,
    ) -> Self {
        let (loaded, writable) = match persistence.load() {
            Ok(stories) => (stories, true),
            Err(e) => {
                tracing::warn!(error = %e, "could not load stories, this session will not save");
                (Vec::new(), false)
            }
        };

        let now = clock.now_ms();
        let loaded_count = loaded.len();
        let mut seen = HashSet::new();
        let stories: Vec<Story> = loaded
            .into_iter()
            .filter(|story| story.is_active(now))
            .filter(|story| seen.insert(story.id.clone()))
            .collect();

        let mut store = Self {
            stories,
            cursor: None,
            clock,
            persistence,
            writable,
        };

        if store.stories.len() != loaded_count {
            tracing::info!(
                dropped = loaded_count - store.stories.len(),
                "dropped expired stories on load"
            );
            store.persist();
        }
        tracing::info!(count = store.stories.len(), "stories loaded");

        store
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Append a new story at the front, purging expired ones first.
    pub fn add_story(&mut self, image: EncodedImage) -> Story {
        let now = self.now_ms();
        self.stories.retain(|story| story.is_active(now));

        let story = Story::new(image, now);
        self.stories.insert(0, story.clone());
        tracing::info!(id = %story.id, bytes = story.image.len(), "story added");

        self.persist();
        story
    }

    /// Delete a story by id; unknown ids are ignored.
    pub fn remove_story(&mut self, id: &StoryId) {
        let before = self.stories.len();
        self.stories.retain(|story| &story.id != id);

        if self.stories.len() != before {
            tracing::info!(%id, "story removed");
            self.persist();
        }
    }

    /// Flag a story as viewed. Idempotent.
    pub fn mark_viewed(&mut self, id: &StoryId) {
        let Some(story) = self.stories.iter_mut().find(|story| &story.id == id) else {
            return;
        };
        if story.viewed {
            return;
        }

        story.viewed = true;
        self.persist();
    }

    /// Point the cursor at `story`. Callers pass an index valid for the
    /// current active sequence.
    pub fn set_cursor(&mut self, story: &Story, index: usize) {
        self.cursor = Some(Cursor {
            story_id: story.id.clone(),
            index,
        });
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Index of the cursor, 0 while closed
    #[cfg(test)]
    pub fn current_index(&self) -> usize {
        self.cursor.as_ref().map_or(0, |cursor| cursor.index)
    }

    /// Re-derive the cursor index from the story's current position in the
    /// active sequence. Returns the index, or `None` when there is no cursor
    /// or its story is gone.
    pub fn resync_cursor(&mut self) -> Option<usize> {
        let now = self.now_ms();
        let cursor = self.cursor.as_mut()?;
        let position = self
            .stories
            .iter()
            .filter(|story| story.is_active(now))
            .position(|story| story.id == cursor.story_id)?;

        cursor.index = position;
        Some(position)
    }

    /// The story under the cursor, if it still exists and is active
    pub fn current_story(&self) -> Option<&Story> {
        let cursor = self.cursor.as_ref()?;
        let now = self.now_ms();
        self.stories
            .iter()
            .find(|story| story.id == cursor.story_id && story.is_active(now))
    }

    /// Advance to the next active story. Returns false, leaving the cursor
    /// untouched, when the sequence is exhausted.
    pub fn next_cursor(&mut self) -> bool {
        let Some(cursor) = self.cursor.clone() else {
            return false;
        };
        let active = self.active_stories();

        // If the current story vanished, whatever slid into its slot is next
        let target = match active.iter().position(|story| story.id == cursor.story_id) {
            Some(position) => position + 1,
            None => cursor.index,
        };

        match active.get(target) {
            Some(story) => {
                tracing::debug!(index = target, id = %story.id, "cursor advanced");
                self.set_cursor(story, target);
                true
            }
            None => false,
        }
    }

    /// Step back to the previous active story. Returns false at index 0.
    pub fn previous_cursor(&mut self) -> bool {
        let Some(cursor) = self.cursor.clone() else {
            return false;
        };
        let active = self.active_stories();

        let target = match active.iter().position(|story| story.id == cursor.story_id) {
            Some(0) => return false,
            Some(position) => position - 1,
            None if cursor.index == 0 || active.is_empty() => return false,
            None => (cursor.index - 1).min(active.len() - 1),
        };

        let story = &active[target];
        tracing::debug!(index = target, id = %story.id, "cursor retreated");
        self.set_cursor(story, target);
        true
    }

    /// Stories younger than 24 hours, in collection order.
    /// This is the only view of stories the UI renders.
    pub fn active_stories(&self) -> Vec<Story> {
        let now = self.now_ms();
        self.stories
            .iter()
            .filter(|story| story.is_active(now))
            .cloned()
            .collect()
    }

    /// Purge expired stories from the stored collection. Returns how many
    /// were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.now_ms();
        let before = self.stories.len();
        self.stories.retain(|story| story.is_active(now));

        let purged = before - self.stories.len();
        if purged > 0 {
            tracing::info!(purged, "expired stories swept");
            self.persist();
        }
        purged
    }

    /// Total stored stories, expired ones included until the next sweep
    #[cfg(test)]
    pub fn stored_len(&self) -> usize {
        self.stories.len()
    }

    fn persist(&self) {
        if !self.writable {
            return;
        }
        if let Err(e) = self.persistence.save(&self.stories) {
            tracing::warn!(error = %e, "failed to persist stories");
        }
    }
}

impl std::fmt::Debug for StoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryStore")
            .field("stories", &self.stories.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
