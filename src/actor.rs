use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::geom::{Point, Rect};

/// Locates a highlighted UI target and reports its spotlight geometry.
///
/// `position` returns `None` when the underlying target is not currently
/// visible; the stage then renders label-only with no spotlight.
pub trait Actor {
    fn position(&mut self) -> Option<Point>;
    fn radius(&self) -> f64;
    fn show(&mut self, stage: StageHandle);
    fn hide(&mut self);
}

/// Non-owning handle an actor holds into its bound stage while shown.
///
/// The stage stays the owner of its own state; an actor can only flag it
/// stale. Each `request_layout` call marks one lazy re-layout pass, so a
/// storm of layout-change notifications still collapses into a single pass.
#[derive(Clone, Debug)]
pub struct StageHandle {
    relayout: Weak<Cell<bool>>,
    spotlight_border: f64,
}

impl StageHandle {
    pub(crate) fn new(relayout: Weak<Cell<bool>>, spotlight_border: f64) -> Self {
        Self {
            relayout,
            spotlight_border,
        }
    }

    pub fn request_layout(&self) {
        if let Some(flag) = self.relayout.upgrade() {
            flag.set(true);
        }
    }

    /// Border width of the stage's spotlight ring, for actors that size the
    /// cut-out to fit inside their target.
    pub fn spotlight_border(&self) -> f64 {
        self.spotlight_border
    }
}

/// The UI element an [`AnchoredActor`] tracks.
///
/// `frame` is the element's bounding box in stage coordinates, or `None`
/// while the element is hidden. Adapters should call
/// [`AnchoredActor::invalidate`] from their toolkit's layout-change
/// notification.
pub trait HostElement {
    fn frame(&self) -> Option<Rect>;
}

/// How the spotlight circle is sized relative to the tracked element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SpotlightFit {
    /// Circumscribe the element: half its diagonal, scaled, plus padding.
    Around,
    /// Inscribe within the element: half its shorter extent minus the
    /// spotlight border, scaled, minus padding.
    Inside,
    /// Fixed radius; `scale` is the radius in pixels.
    Fixed,
}

/// Actor anchored to an existing UI element. Geometry is recomputed lazily:
/// reads are served from a cache until `invalidate` marks it stale.
pub struct AnchoredActor<E: HostElement> {
    element: E,
    fit: SpotlightFit,
    scale: f64,
    inner_padding: f64,
    center: Point,
    radius: f64,
    dirty: bool,
    stage: Option<StageHandle>,
}

impl<E: HostElement> AnchoredActor<E> {
    pub fn builder(element: E) -> AnchoredActorBuilder<E> {
        AnchoredActorBuilder {
            element,
            fit: SpotlightFit::Around,
            scale: 1.0,
            inner_padding: 2.0,
        }
    }

    /// Mark cached geometry stale and request one re-layout pass from the
    /// bound stage, if any.
    pub fn invalidate(&mut self) {
        self.dirty = true;
        if let Some(stage) = &self.stage {
            stage.request_layout();
        }
    }

    pub fn into_shared(self) -> Rc<std::cell::RefCell<dyn Actor>>
    where
        E: 'static,
    {
        Rc::new(std::cell::RefCell::new(self))
    }

    fn refresh(&mut self, frame: Rect) {
        if !self.dirty {
            return;
        }
        let w = frame.width();
        let h = frame.height();
        let border = self
            .stage
            .as_ref()
            .map(StageHandle::spotlight_border)
            .unwrap_or(0.0);
        self.radius = match self.fit {
            SpotlightFit::Around => (w * w + h * h).sqrt() / 2.0 * self.scale + self.inner_padding,
            SpotlightFit::Inside => (w.min(h) / 2.0 - border) * self.scale - self.inner_padding,
            SpotlightFit::Fixed => self.scale,
        };
        self.center = frame.center();
        tracing::trace!(target: "limelight::actor", cx = self.center.x, cy = self.center.y, radius = self.radius, "actor geometry refreshed");
        self.dirty = false;
    }
}

impl<E: HostElement> Actor for AnchoredActor<E> {
    fn position(&mut self) -> Option<Point> {
        let frame = self.element.frame()?;
        self.refresh(frame);
        Some(self.center)
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn show(&mut self, stage: StageHandle) {
        self.stage = Some(stage);
        self.dirty = true;
    }

    fn hide(&mut self) {
        self.stage = None;
    }
}

pub struct AnchoredActorBuilder<E: HostElement> {
    element: E,
    fit: SpotlightFit,
    scale: f64,
    inner_padding: f64,
}

impl<E: HostElement> AnchoredActorBuilder<E> {
    pub fn fit(mut self, fit: SpotlightFit) -> Self {
        self.fit = fit;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn inner_padding(mut self, padding: f64) -> Self {
        self.inner_padding = padding;
        self
    }

    pub fn build(self) -> AnchoredActor<E> {
        AnchoredActor {
            element: self.element,
            fit: self.fit,
            scale: self.scale,
            inner_padding: self.inner_padding,
            center: Point::ZERO,
            radius: 0.0,
            dirty: true,
            stage: None,
        }
    }
}
