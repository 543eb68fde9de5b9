use serde::{Deserialize, Serialize};

/// Row metrics for drawing a collection.
///
/// The display height is `header + rows * row_height + padding`, where
/// `rows` is the member count when expanded and zero when collapsed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub header: f32,
    pub row_height: f32,
    pub padding: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            header: 20.0,
            row_height: 20.0,
            padding: 6.0,
        }
    }
}

impl Layout {
    /// Height needed to show `count` rows.
    pub fn height(&self, count: usize, expanded: bool) -> f32 {
        let rows = if expanded { count } else { 0 };
        self.header + rows as f32 * self.row_height + self.padding
    }
}
