//! Selection and popup anchor state

/// Pixel position on the map surface (container coordinates, not geographic).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which catalog point is selected, and where its detail popup anchors.
///
/// The anchor is only ever set together with an id; the owning session clears
/// the whole selection when the id drops out of the filtered result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected_id: Option<String>,
    anchor: Option<PixelPoint>,
}

impl SelectionState {
    /// Select a point, replacing any previous selection.
    pub fn select(&mut self, id: impl Into<String>, anchor: PixelPoint) {
        self.selected_id = Some(id.into());
        self.anchor = Some(anchor);
    }

    /// Reset both fields.
    pub fn clear(&mut self) {
        self.selected_id = None;
        self.anchor = None;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn anchor(&self) -> Option<PixelPoint> {
        self.anchor
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id.as_deref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_then_clear() {
        let mut sel = SelectionState::default();
        assert!(sel.selected_id().is_none());

        sel.select("r1", PixelPoint::new(120.0, 80.0));
        assert!(sel.is_selected("r1"));
        assert_eq!(sel.anchor(), Some(PixelPoint::new(120.0, 80.0)));

        sel.clear();
        assert!(sel.selected_id().is_none());
        assert!(sel.anchor().is_none());
    }

    #[test]
    fn reselect_replaces_anchor() {
        let mut sel = SelectionState::default();
        sel.select("r1", PixelPoint::new(1.0, 2.0));
        sel.select("r2", PixelPoint::new(3.0, 4.0));
        assert!(sel.is_selected("r2"));
        assert_eq!(sel.anchor(), Some(PixelPoint::new(3.0, 4.0)));
    }
}
