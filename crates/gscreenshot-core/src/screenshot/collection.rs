use super::Screenshot;

/// Ordered screenshots with a gallery cursor
///
/// Whenever the collection is non-empty the cursor points at a valid entry.
/// Navigation never moves the cursor out of bounds; it returns `None` at
/// either end instead.
#[derive(Debug, Clone, Default)]
pub struct ScreenshotCollection {
    screenshots: Vec<Screenshot>,
    cursor:      usize,
}

impl ScreenshotCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.screenshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screenshots.is_empty()
    }

    /// Index of the current entry (0 when empty)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Adds a screenshot at the end and makes it current
    pub fn append(&mut self, screenshot: Screenshot) {
        self.screenshots.push(screenshot);
        self.cursor = self.screenshots.len() - 1;
    }

    /// Adds a screenshot right after the current one and makes it current
    pub fn insert(&mut self, screenshot: Screenshot) {
        if self.screenshots.is_empty() {
            self.append(screenshot);
            return;
        }
        self.cursor += 1;
        self.screenshots.insert(self.cursor, screenshot);
    }

    /// Removes the current entry
    ///
    /// The cursor stays at the same index, or moves to the new last entry
    /// when the removed one was last.
    pub fn remove_current(&mut self) -> Option<Screenshot> {
        if self.screenshots.is_empty() {
            return None;
        }
        let removed = self.screenshots.remove(self.cursor);
        if self.cursor >= self.screenshots.len() {
            self.cursor = self.screenshots.len().saturating_sub(1);
        }
        Some(removed)
    }

    /// Swaps the current entry for `screenshot`, returning the old one
    ///
    /// On an empty collection this appends instead.
    pub fn replace_current(&mut self, screenshot: Screenshot) -> Option<Screenshot> {
        match self.screenshots.get_mut(self.cursor) {
            Some(slot) => Some(std::mem::replace(slot, screenshot)),
            None => {
                self.append(screenshot);
                None
            }
        }
    }

    pub fn current(&self) -> Option<&Screenshot> {
        self.screenshots.get(self.cursor)
    }

    pub fn current_mut(&mut self) -> Option<&mut Screenshot> {
        self.screenshots.get_mut(self.cursor)
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.screenshots.len()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0 && !self.screenshots.is_empty()
    }

    /// Moves to the next entry, or returns `None` at the end
    pub fn cursor_next(&mut self) -> Option<&Screenshot> {
        if !self.has_next() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    /// Moves to the previous entry, or returns `None` at the start
    pub fn cursor_prev(&mut self) -> Option<&Screenshot> {
        if !self.has_previous() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    pub fn cursor_to_start(&mut self) -> Option<&Screenshot> {
        self.cursor = 0;
        self.current()
    }

    pub fn cursor_to_end(&mut self) -> Option<&Screenshot> {
        self.cursor = self.screenshots.len().saturating_sub(1);
        self.current()
    }

    /// Whether any entry has never been saved
    pub fn has_unsaved(&self) -> bool {
        self.screenshots.iter().any(|s| !s.is_saved())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Screenshot> {
        self.screenshots.iter()
    }
}

impl<'a> IntoIterator for &'a ScreenshotCollection {
    type Item = &'a Screenshot;
    type IntoIter = std::slice::Iter<'a, Screenshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.screenshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::capture::ImageBuffer;

    /// Screenshot whose width identifies it
    fn shot(id: u32) -> Screenshot {
        Screenshot::new(ImageBuffer::from_test_pattern(id, 1))
    }

    fn ids(collection: &ScreenshotCollection) -> Vec<u32> {
        collection.iter().map(|s| s.raw_image().width()).collect()
    }

    fn current_id(collection: &ScreenshotCollection) -> Option<u32> {
        collection.current().map(|s| s.raw_image().width())
    }

    #[test]
    fn test_empty_collection() {
        let mut collection = ScreenshotCollection::new();
        assert!(collection.is_empty());
        assert!(collection.current().is_none());
        assert!(collection.cursor_next().is_none());
        assert!(collection.cursor_prev().is_none());
        assert!(collection.remove_current().is_none());
        assert!(!collection.has_unsaved());
        assert!(!collection.has_next());
        assert!(!collection.has_previous());
    }

    #[test]
    fn test_append_moves_cursor_to_new_entry() {
        let mut collection = ScreenshotCollection::new();
        collection.append(shot(1));
        collection.append(shot(2));

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.cursor(), 1);
        assert_eq!(current_id(&collection), Some(2));
    }

    #[test]
    fn test_insert_after_cursor() {
        let mut collection = ScreenshotCollection::new();
        collection.insert(shot(1));
        collection.append(shot(2));
        collection.append(shot(3));
        collection.cursor_to_start();

        collection.insert(shot(9));

        assert_eq!(ids(&collection), vec![1, 9, 2, 3]);
        assert_eq!(collection.cursor(), 1);
        assert_eq!(current_id(&collection), Some(9));
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        let mut collection = ScreenshotCollection::new();
        collection.append(shot(1));
        collection.append(shot(2));

        assert!(collection.cursor_next().is_none());
        assert_eq!(collection.cursor(), 1);

        assert_eq!(collection.cursor_prev().map(|s| s.raw_image().width()), Some(1));
        assert!(collection.cursor_prev().is_none());
        assert_eq!(collection.cursor(), 0);

        assert_eq!(collection.cursor_to_end().map(|s| s.raw_image().width()), Some(2));
    }

    #[test]
    fn test_remove_last_reclamps_cursor() {
        let mut collection = ScreenshotCollection::new();
        collection.append(shot(1));
        collection.append(shot(2));
        collection.append(shot(3));

        let removed = collection.remove_current().unwrap();
        assert_eq!(removed.raw_image().width(), 3);
        assert_eq!(collection.cursor(), 1);
        assert_eq!(current_id(&collection), Some(2));
    }

    #[test]
    fn test_remove_middle_keeps_index() {
        let mut collection = ScreenshotCollection::new();
        collection.append(shot(1));
        collection.append(shot(2));
        collection.append(shot(3));
        collection.cursor_prev();

        collection.remove_current();
        assert_eq!(collection.cursor(), 1);
        assert_eq!(current_id(&collection), Some(3));
    }

    #[test]
    fn test_remove_only_entry() {
        let mut collection = ScreenshotCollection::new();
        collection.append(shot(1));
        collection.remove_current();

        assert!(collection.is_empty());
        assert_eq!(collection.cursor(), 0);
        assert!(collection.current().is_none());
    }

    #[test]
    fn test_replace_current() {
        let mut collection = ScreenshotCollection::new();
        assert!(collection.replace_current(shot(1)).is_none());
        assert_eq!(collection.len(), 1);

        let old = collection.replace_current(shot(5)).unwrap();
        assert_eq!(old.raw_image().width(), 1);
        assert_eq!(ids(&collection), vec![5]);
    }

    #[test]
    fn test_has_unsaved() {
        let mut collection = ScreenshotCollection::new();
        collection.append(shot(1));
        assert!(collection.has_unsaved());

        collection
            .current_mut()
            .unwrap()
            .set_saved_path(Some(PathBuf::from("/tmp/a.png")));
        assert!(!collection.has_unsaved());

        collection.append(shot(2));
        assert!(collection.has_unsaved());
    }

    #[test]
    fn test_cursor_invariant_under_mixed_operations() {
        let mut collection = ScreenshotCollection::new();

        // Deterministic pseudo-random walk over every mutating operation
        let mut state: u32 = 0x2545_f491;
        for step in 0..500u32 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;

            match state % 5 {
                0 => collection.append(shot(step + 1)),
                1 => collection.insert(shot(step + 1)),
                2 => {
                    collection.remove_current();
                }
                3 => {
                    collection.cursor_next();
                }
                _ => {
                    collection.cursor_prev();
                }
            }

            if !collection.is_empty() {
                assert!(collection.cursor() < collection.len());
                assert!(collection.current().is_some());
            }
        }
    }
}
