use std::time::Duration;

use crate::geom::{Circle, Margins, Rect, Size, StageMetrics};
use crate::scene::TemplateId;

/// Child slots of a stage surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SlotKind {
    Spotlight,
    Label,
    Dismiss,
}

/// Templates a stage falls back to when a scene does not override a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageTemplates {
    pub spotlight: TemplateId,
    pub label: TemplateId,
    pub dismiss: TemplateId,
}

/// One full-display overlay surface, as a cheap cloneable handle into the
/// host toolkit's retained tree.
///
/// The sequencer only ever places children by explicit pixel rectangle and
/// animates the surface's opacity; everything visual (circle drawing, text
/// rendering, template inflation) is the host's concern. A surface with
/// input blocked swallows pointer events so the UI underneath stays inert;
/// when the dismiss control is armed, its activation must be delivered to
/// [`SceneSequencer::dismiss`](crate::SceneSequencer::dismiss).
pub trait HostSurface: Clone {
    fn set_visible(&self, visible: bool);
    fn set_opacity(&self, opacity: f64);
    fn set_blocks_input(&self, blocks: bool);

    /// Rebuild one child slot from a layout template. Only called when the
    /// slot's template actually changes.
    fn inflate(&self, slot: SlotKind, template: &TemplateId);
    fn slot_margins(&self, slot: SlotKind) -> Margins;

    /// `None` for both hides the label entirely.
    fn set_label_text(&self, title: Option<&str>, detail: Option<&str>);
    /// `None` keeps the template's own text.
    fn set_dismiss_text(&self, text: Option<&str>);

    /// Re-flow the label's text at a candidate width and report its size.
    fn measure_label(&self, max_width: f64) -> Size;
    fn measure_dismiss(&self) -> Size;

    fn place(&self, slot: SlotKind, frame: Rect);
    /// `None` hides the spotlight cut-out.
    fn set_spotlight(&self, circle: Option<Circle>);
    fn spotlight_border(&self) -> f64;

    /// Whether dismiss activations are delivered. Disarmed surfaces still
    /// block input; they just stop forwarding the dismiss action.
    fn arm_dismiss(&self, armed: bool);
}

#[derive(Clone, Debug)]
pub struct FadeTrack<S> {
    pub surface: S,
    pub from: f64,
    pub to: f64,
}

/// A parallel opacity animation over one or two surfaces, started with zero
/// delay.
#[derive(Clone, Debug)]
pub struct FadeSpec<S> {
    pub duration: Duration,
    pub tracks: Vec<FadeTrack<S>>,
}

/// The platform seam: surface lifecycle, display metrics, and the fade
/// animation driver.
///
/// Animation contract: `begin_fade` returns immediately. When the fade
/// completes or is cancelled, the host must invoke
/// [`SceneSequencer::on_transition_settled`](crate::SceneSequencer::on_transition_settled)
/// exactly once, later, on the same thread. `cancel_fade` with nothing in
/// flight is a no-op and must not produce a settlement of its own.
pub trait Host {
    type Surface: HostSurface;

    /// Stage dimensions plus the reserved top band (status/menu bar).
    fn stage_metrics(&self) -> StageMetrics;
    fn default_templates(&self) -> StageTemplates;

    /// Create a new overlay surface above the existing UI. Surfaces stack in
    /// insertion order.
    fn insert_surface(&mut self) -> Self::Surface;
    /// Tear down every surface previously inserted.
    fn remove_surfaces(&mut self);

    fn begin_fade(&mut self, fade: FadeSpec<Self::Surface>);
    fn cancel_fade(&mut self);
}
