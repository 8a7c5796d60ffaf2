pub use kurbo::{Circle, Point, Rect, Size, Vec2};

/// Per-side spacing reserved around a stage child.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub const ZERO: Margins = Margins {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn uniform(v: f64) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Dimensions of the stage plus the band at the top of the display that
/// layout must keep clear (status bar, menu bar, action bar).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageMetrics {
    pub size: Size,
    pub top_inset: f64,
}

impl StageMetrics {
    pub fn new(size: Size, top_inset: f64) -> Self {
        Self { size, top_inset }
    }
}

/// Bounding box of a spotlight circle expanded by its border width and the
/// spotlight slot's margins. This is the box the label placer routes around.
pub fn spotlight_outer_box(center: Point, radius: f64, border: f64, margins: Margins) -> Rect {
    let outer = (radius + border).ceil();
    Rect::new(
        center.x - outer - margins.left,
        center.y - outer - margins.top,
        center.x + outer + margins.right,
        center.y + outer + margins.bottom,
    )
}
