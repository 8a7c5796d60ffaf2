use crate::geom::{Margins, Rect, Size, StageMetrics};

/// Which candidate the placement search settled on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Placement {
    AboveSpotlight,
    BelowSpotlight,
    LeftOfSpotlight,
    RightOfSpotlight,
    LeftOfDismiss,
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
    pub placement: Placement,
    pub frame: Rect,
}

/// Geometry the label must route around.
///
/// `spotlight` and `dismiss` are layout boxes already expanded by their own
/// slot margins; `spotlight` is `None` when the scene has no visible target.
#[derive(Clone, Copy, Debug)]
pub struct PlacerInput {
    pub metrics: StageMetrics,
    pub spotlight: Option<Rect>,
    pub dismiss: Rect,
    pub label_margins: Margins,
}

/// Find a non-overlapping frame for the label.
///
/// Candidates are tried in a fixed priority order — above the spotlight,
/// below it, left of it, right of it, left of the dismiss control — each
/// computed against the unconstrained stage, and the first whose re-measured
/// height fits wins. The final candidate clips the label to the full stage
/// below the top inset and always succeeds, so the search is total.
///
/// `measure` re-flows the label's text at a candidate width and reports the
/// resulting size; a non-positive width measures as infinitely tall.
pub fn place_label(input: &PlacerInput, mut measure: impl FnMut(f64) -> Size) -> LabelPlacement {
    let Size { width, height } = input.metrics.size;
    let top_inset = input.metrics.top_inset;
    let margins = input.label_margins;
    let mh = margins.horizontal();
    let mv = margins.vertical();

    // A missing spotlight collapses to a zero-size point at the stage's
    // bottom-right corner, leaving the early candidates the whole stage.
    let spot = input
        .spotlight
        .unwrap_or_else(|| Rect::new(width, height, width, height));
    let dismiss = input.dismiss;

    let mut measure_at = |max_width: f64| -> Size {
        if max_width < 1.0 {
            return Size::new(0.0, f64::INFINITY);
        }
        measure(max_width)
    };

    let placed = |placement: Placement, origin_x: f64, origin_y: f64, size: Size| {
        tracing::debug!(target: "limelight::placer", ?placement, "label placed");
        LabelPlacement {
            placement,
            frame: Rect::new(origin_x, origin_y, origin_x + size.width, origin_y + size.height),
        }
    };

    // Above the spotlight, full stage width.
    let size = measure_at(width - mh);
    let limit = spot.y0.min(dismiss.y0);
    if size.height <= limit - top_inset - mv {
        return placed(
            Placement::AboveSpotlight,
            margins.left,
            top_inset + margins.top,
            size,
        );
    }

    // Below the spotlight, full stage width; the dismiss control only caps
    // the space when it sits below the spotlight.
    let limit = (if dismiss.y0 > spot.y1 { dismiss.y0 } else { height }) - spot.y1;
    if size.height <= limit - mv {
        return placed(
            Placement::BelowSpotlight,
            margins.left,
            spot.y1 + margins.top,
            size,
        );
    }

    // Left of the spotlight, width capped at its left edge.
    let size = measure_at(spot.x0 - mh);
    let limit = if dismiss.x0 < spot.x0 { dismiss.y0 } else { height };
    if size.height <= limit - top_inset - mv {
        return placed(
            Placement::LeftOfSpotlight,
            margins.left,
            top_inset + margins.top,
            size,
        );
    }

    // Right of the spotlight.
    let size = measure_at(width - spot.x1 - mh);
    let limit = if dismiss.x1 > spot.x1 { dismiss.y0 } else { height };
    if size.height <= limit - top_inset - mv {
        return placed(
            Placement::RightOfSpotlight,
            spot.x1 + margins.left,
            top_inset + margins.top,
            size,
        );
    }

    // Left of the dismiss control, starting below the spotlight when the
    // spotlight clears the dismiss row.
    let size = measure_at(dismiss.x0 - mh);
    let start = if spot.y1 < dismiss.y0 { spot.y1 } else { top_inset };
    if size.height <= height - start - mv {
        return placed(
            Placement::LeftOfDismiss,
            margins.left,
            start + margins.top,
            size,
        );
    }

    // Fallback: full stage below the inset, clipped. The label's own
    // renderer truncates or scrolls whatever does not fit.
    tracing::debug!(target: "limelight::placer", "no candidate fits, using fallback placement");
    LabelPlacement {
        placement: Placement::Fallback,
        frame: Rect::new(
            margins.left,
            top_inset + margins.top,
            width - margins.right,
            height - margins.bottom,
        ),
    }
}
