use std::cell::Cell;
use std::rc::Rc;

use crate::actor::StageHandle;
use crate::geom::{Circle, Rect, StageMetrics, spotlight_outer_box};
use crate::host::{HostSurface, SlotKind, StageTemplates};
use crate::placer::{PlacerInput, place_label};
use crate::scene::{Scene, TemplateId};

#[derive(Clone, Debug, Default)]
struct MountedSlots {
    spotlight: Option<TemplateId>,
    label: Option<TemplateId>,
    dismiss: Option<TemplateId>,
}

/// One on-screen overlay: spotlight cut-out, label, and dismiss control for
/// the currently bound scene.
///
/// The stage owns no transition logic; the sequencer decides when it shows,
/// hides, or fades. Layout is lazy: binding, showing, and actor
/// invalidations set a dirty flag, and [`StageLayout::layout_if_needed`]
/// runs at most one pass per request.
pub struct StageLayout<S: HostSurface> {
    surface: S,
    defaults: StageTemplates,
    scene: Option<Rc<Scene>>,
    mounted: MountedSlots,
    visible: bool,
    relayout: Rc<Cell<bool>>,
}

impl<S: HostSurface> StageLayout<S> {
    pub fn new(surface: S, defaults: StageTemplates) -> Self {
        surface.set_visible(false);
        Self {
            surface,
            defaults,
            scene: None,
            mounted: MountedSlots::default(),
            visible: false,
            relayout: Rc::new(Cell::new(false)),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scene(&self) -> Option<&Rc<Scene>> {
        self.scene.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Handle an actor keeps while bound, to flag stale geometry.
    pub fn handle(&self) -> StageHandle {
        StageHandle::new(Rc::downgrade(&self.relayout), self.surface.spotlight_border())
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.surface.set_visible(true);
        self.mount();
        if let Some(actor) = self.scene.as_ref().and_then(|s| s.actor.clone()) {
            actor.borrow_mut().show(self.handle());
        }
        self.surface.set_blocks_input(true);
        self.relayout.set(true);
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.surface.set_visible(false);
        if let Some(actor) = self.scene.as_ref().and_then(|s| s.actor.clone()) {
            actor.borrow_mut().hide();
        }
        self.surface.set_blocks_input(false);
    }

    /// Rebind to a scene (or unbind with `None`). While visible this swaps
    /// actors, remounts any changed templates, and requests a layout pass.
    pub fn set_scene(&mut self, scene: Option<Rc<Scene>>) {
        let prev = std::mem::replace(&mut self.scene, scene);
        if !self.visible {
            return;
        }
        if let Some(actor) = prev.as_ref().and_then(|s| s.actor.clone()) {
            actor.borrow_mut().hide();
        }
        self.mount();
        if let Some(actor) = self.scene.as_ref().and_then(|s| s.actor.clone()) {
            actor.borrow_mut().show(self.handle());
        }
        self.relayout.set(true);
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.surface.set_opacity(opacity);
    }

    pub fn arm(&mut self, armed: bool) {
        self.surface.arm_dismiss(armed);
    }

    /// Run the pending layout pass, if one was requested since the last.
    pub fn layout_if_needed(&mut self, metrics: &StageMetrics) {
        if self.relayout.replace(false) && self.visible {
            self.layout(metrics);
        }
    }

    /// Full placement pass: dismiss bottom-right, spotlight over the actor's
    /// target, label wherever the placement search puts it.
    #[tracing::instrument(level = "debug", skip(self, metrics))]
    pub fn layout(&mut self, metrics: &StageMetrics) {
        let StageMetrics { size, .. } = *metrics;

        let dismiss_margins = self.surface.slot_margins(SlotKind::Dismiss);
        let dismiss_size = self.surface.measure_dismiss();
        let dismiss_box = Rect::new(
            size.width - dismiss_size.width - dismiss_margins.horizontal(),
            size.height - dismiss_size.height - dismiss_margins.vertical(),
            size.width,
            size.height,
        );

        let spotlight_margins = self.surface.slot_margins(SlotKind::Spotlight);
        let mut spotlight_box = None;
        let mut circle = None;
        if let Some(actor) = self.scene.as_ref().and_then(|s| s.actor.clone()) {
            let mut actor = actor.borrow_mut();
            if let Some(center) = actor.position() {
                let radius = actor.radius();
                circle = Some(Circle::new(center, radius));
                spotlight_box = Some(spotlight_outer_box(
                    center,
                    radius,
                    self.surface.spotlight_border(),
                    spotlight_margins,
                ));
            }
        }
        self.surface.set_spotlight(circle);

        let label_placement = place_label(
            &PlacerInput {
                metrics: *metrics,
                spotlight: spotlight_box,
                dismiss: dismiss_box,
                label_margins: self.surface.slot_margins(SlotKind::Label),
            },
            |max_width| self.surface.measure_label(max_width),
        );
        self.surface.place(SlotKind::Label, label_placement.frame);

        if let Some(outer) = spotlight_box {
            self.surface.place(
                SlotKind::Spotlight,
                Rect::new(
                    outer.x0 + spotlight_margins.left,
                    outer.y0 + spotlight_margins.top,
                    outer.x1 - spotlight_margins.right,
                    outer.y1 - spotlight_margins.bottom,
                ),
            );
        }

        self.surface.place(
            SlotKind::Dismiss,
            Rect::new(
                dismiss_box.x0 + dismiss_margins.left,
                dismiss_box.y0 + dismiss_margins.top,
                dismiss_box.x1 - dismiss_margins.right,
                dismiss_box.y1 - dismiss_margins.bottom,
            ),
        );
    }

    /// Re-inflate any slot whose template changed, then re-apply the bound
    /// scene's texts.
    fn mount(&mut self) {
        let scene = self.scene.clone();

        let want = scene
            .as_ref()
            .and_then(|s| s.spotlight_template.clone())
            .unwrap_or_else(|| self.defaults.spotlight.clone());
        if self.mounted.spotlight.as_ref() != Some(&want) {
            self.surface.inflate(SlotKind::Spotlight, &want);
            self.mounted.spotlight = Some(want);
        }

        let want = scene
            .as_ref()
            .and_then(|s| s.label_template.clone())
            .unwrap_or_else(|| self.defaults.label.clone());
        if self.mounted.label.as_ref() != Some(&want) {
            self.surface.inflate(SlotKind::Label, &want);
            self.mounted.label = Some(want);
        }

        let want = scene
            .as_ref()
            .and_then(|s| s.dismiss_template.clone())
            .unwrap_or_else(|| self.defaults.dismiss.clone());
        if self.mounted.dismiss.as_ref() != Some(&want) {
            self.surface.inflate(SlotKind::Dismiss, &want);
            self.mounted.dismiss = Some(want);
        }

        if let Some(scene) = &scene {
            self.surface
                .set_label_text(scene.title.as_deref(), scene.detail.as_deref());
            self.surface.set_dismiss_text(scene.dismiss_text.as_deref());
        }
    }
}
