//! Fullscreen layer navigation.
//!
//! Opening fullscreen snapshots the inline selection; cycling while
//! fullscreen only moves the snapshot, and closing discards it.

use crate::model::LayerKind;

/// Cursor over the layers shown in the fullscreen viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerNavigator {
    is_open: bool,
    layer: LayerKind,
}

impl LayerNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter fullscreen on the given layer.
    pub fn open(&mut self, selected: LayerKind) {
        self.is_open = true;
        self.layer = selected;
    }

    /// Leave fullscreen, dropping the snapshot.
    pub fn close(&mut self) {
        self.is_open = false;
        self.layer = LayerKind::default();
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Layer on screen, or None when fullscreen is closed.
    pub fn layer(&self) -> Option<LayerKind> {
        self.is_open.then_some(self.layer)
    }

    /// Advance to the next layer. Ignored while closed.
    pub fn next_layer(&mut self) -> Option<LayerKind> {
        if self.is_open {
            self.layer = self.layer.next();
        }
        self.layer()
    }

    /// Step back to the previous layer. Ignored while closed.
    pub fn previous_layer(&mut self) -> Option<LayerKind> {
        if self.is_open {
            self.layer = self.layer.previous();
        }
        self.layer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_by_default() {
        let nav = LayerNavigator::new();
        assert!(!nav.is_open());
        assert_eq!(nav.layer(), None);
    }

    #[test]
    fn test_open_snapshots_selection() {
        let mut nav = LayerNavigator::new();
        nav.open(LayerKind::Ndvi);
        assert_eq!(nav.layer(), Some(LayerKind::Ndvi));
    }

    #[test]
    fn test_cycle_forward_and_back() {
        let mut nav = LayerNavigator::new();
        nav.open(LayerKind::Ndbi);
        assert_eq!(nav.next_layer(), Some(LayerKind::Rgb));
        assert_eq!(nav.next_layer(), Some(LayerKind::Ndvi));
        assert_eq!(nav.next_layer(), Some(LayerKind::Ndbi));
        assert_eq!(nav.previous_layer(), Some(LayerKind::Ndvi));
        assert_eq!(nav.previous_layer(), Some(LayerKind::Rgb));
        assert_eq!(nav.previous_layer(), Some(LayerKind::Ndbi));
    }

    #[test]
    fn test_navigation_ignored_when_closed() {
        let mut nav = LayerNavigator::new();
        assert_eq!(nav.next_layer(), None);
        assert_eq!(nav.previous_layer(), None);
        assert!(!nav.is_open());
    }

    #[test]
    fn test_close_discards_snapshot() {
        let mut nav = LayerNavigator::new();
        nav.open(LayerKind::Ndvi);
        nav.next_layer();
        nav.close();
        assert_eq!(nav.layer(), None);

        nav.open(LayerKind::Rgb);
        assert_eq!(nav.layer(), Some(LayerKind::Rgb));
    }
}
