//! Generic scrollable list with an optional text filter.

pub struct ScrollableList<T> {
    items: Vec<T>,
    filtered: Vec<usize>,
    /// Position within `filtered`.
    pub selected: usize,
    pub scroll_offset: usize,
    filter: String,
    matches: Box<dyn Fn(&T, &str) -> bool + Send + Sync>,
}

impl<T> ScrollableList<T> {
    pub fn new(matches: impl Fn(&T, &str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            filter: String::new(),
            matches: Box::new(matches),
        }
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.rebuild();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Re-filter, keeping the selected item selected when it still matches.
    pub fn set_filter(&mut self, query: &str) {
        let previous = self.selected_index();
        self.filter = query.to_string();
        self.rebuild();
        self.selected = previous
            .and_then(|prev| self.filtered.iter().position(|&i| i == prev))
            .unwrap_or(0);
        self.scroll_offset = 0;
    }

    fn rebuild(&mut self) {
        let query = self.filter.as_str();
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| query.is_empty() || (self.matches)(item, query))
            .map(|(i, _)| i)
            .collect();
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        self.selected = (self.selected + n).min(self.filtered.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }

    /// Select the first visible item matching `pred`.  Returns false if none does.
    pub fn select_where(&mut self, pred: impl Fn(&T) -> bool) -> bool {
        match self.filtered.iter().position(|&i| pred(&self.items[i])) {
            Some(pos) => {
                self.selected = pos;
                true
            }
            None => false,
        }
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected_index()?)
    }

    fn selected_index(&self) -> Option<usize> {
        self.filtered.get(self.selected).copied()
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// Items visible in `height` rows.  Call `ensure_visible` first.
    pub fn visible_items(&self, height: usize) -> impl Iterator<Item = &T> {
        self.filtered
            .iter()
            .skip(self.scroll_offset)
            .take(height)
            .map(|&i| &self.items[i])
    }

    /// Row of the selection relative to the top of the view.
    pub fn selected_in_view(&self) -> usize {
        self.selected.saturating_sub(self.scroll_offset)
    }

    /// Select the item at `row` of the rendered view.  Returns true on a hit.
    pub fn handle_click(&mut self, row: usize) -> bool {
        let target = self.scroll_offset + row;
        if target < self.filtered.len() {
            self.selected = target;
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> ScrollableList<String> {
        let mut list = ScrollableList::new(|s: &String, q: &str| s.contains(q));
        list.set_items(
            ["cyberia", "jazz", "jazz2", "swing"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        list
    }

    #[test]
    fn test_filter_keeps_selection() {
        let mut l = list();
        l.select_down(2);
        assert_eq!(l.selected_item().map(String::as_str), Some("jazz2"));
        l.set_filter("jazz");
        assert_eq!(l.len(), 2);
        assert_eq!(l.selected_item().map(String::as_str), Some("jazz2"));
        l.set_filter("sw");
        assert_eq!(l.selected_item().map(String::as_str), Some("swing"));
        l.set_filter("nothing");
        assert!(l.is_empty());
        assert_eq!(l.selected_item(), None);
        assert_eq!(l.total_len(), 4);
    }

    #[test]
    fn test_scrolling_follows_selection() {
        let mut l = list();
        l.select_last();
        l.ensure_visible(2);
        assert_eq!(l.scroll_offset, 2);
        assert_eq!(l.selected_in_view(), 1);
        let visible: Vec<_> = l.visible_items(2).cloned().collect();
        assert_eq!(visible, ["jazz2", "swing"]);
        l.select_up(10);
        l.ensure_visible(2);
        assert_eq!(l.scroll_offset, 0);
    }

    #[test]
    fn test_click_and_select_where() {
        let mut l = list();
        assert!(l.handle_click(1));
        assert_eq!(l.selected_item().map(String::as_str), Some("jazz"));
        assert!(!l.handle_click(9));
        assert!(l.select_where(|s| s == "swing"));
        assert_eq!(l.selected, 3);
        assert!(!l.select_where(|s| s == "absent"));
    }
}
