//! # List Store
//!
//! The current filtered item collection plus selection and viewport state.
//! Owned exclusively by the render-loop thread: background fetches never
//! touch it directly, they publish whole replacement snapshots through the
//! worker's result slot and the render loop applies them via [`ListStore::refresh`].

use crate::source::Item;

#[derive(Debug, Default)]
pub struct ListStore {
    items: Vec<Item>,
    selected: usize,
    viewport_first: usize,
    viewport_count: usize,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.items.get(self.selected)
    }

    pub fn viewport_first(&self) -> usize {
        self.viewport_first
    }

    /// Rows currently visible: `[viewport_first, viewport_first + count)`.
    pub fn visible(&self) -> &[Item] {
        let end = (self.viewport_first + self.viewport_count).min(self.items.len());
        let start = self.viewport_first.min(end);
        &self.items[start..end]
    }

    /// Called by the renderer once the list area height is known.
    pub fn set_viewport_count(&mut self, count: usize) {
        self.viewport_count = count;
        self.scroll_to_selected();
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.viewport_first > self.selected {
                self.viewport_first = self.selected;
            }
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
            if self.viewport_count > 0 && self.viewport_first + self.viewport_count <= self.selected
            {
                self.viewport_first = self.selected + 1 - self.viewport_count;
            }
        }
    }

    /// Select an explicit row (pointer click). Out-of-range indices are
    /// ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = index;
            self.scroll_to_selected();
        }
    }

    /// Replace the whole item sequence with a fresh snapshot.
    ///
    /// The selection survives a refresh when it still points at a valid row;
    /// when the new list is shorter than the old selection it resets to the
    /// top.
    pub fn refresh(&mut self, items: Vec<Item>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = 0;
            self.viewport_first = 0;
        }
    }

    /// Scroll by the minimal amount that keeps the selection visible.
    fn scroll_to_selected(&mut self) {
        if self.viewport_first > self.selected {
            self.viewport_first = self.selected;
        }
        if self.viewport_count > 0 && self.viewport_first + self.viewport_count <= self.selected {
            self.viewport_first = self.selected + 1 - self.viewport_count;
        }
    }
}
