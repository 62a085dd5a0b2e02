//! FocusRing — Tab/Shift-Tab cycling between panes.

use crate::action::ComponentId;

pub struct FocusRing {
    items: Vec<ComponentId>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<ComponentId>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.items.get(self.current).copied()
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.current = (self.current + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.items.is_empty() {
            self.current = (self.current + self.items.len() - 1) % self.items.len();
        }
    }

    pub fn set(&mut self, id: ComponentId) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.current() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_both_ways() {
        let mut ring = FocusRing::new(vec![
            ComponentId::ChannelList,
            ComponentId::Playlist,
            ComponentId::Schedule,
        ]);
        assert!(ring.is_focused(ComponentId::ChannelList));
        ring.prev();
        assert_eq!(ring.current(), Some(ComponentId::Schedule));
        ring.next();
        ring.next();
        assert_eq!(ring.current(), Some(ComponentId::Playlist));
        ring.set(ComponentId::Schedule);
        assert!(ring.is_focused(ComponentId::Schedule));
    }

    #[test]
    fn test_empty_ring_has_no_focus() {
        let mut ring = FocusRing::new(Vec::new());
        ring.next();
        assert_eq!(ring.current(), None);
    }
}
