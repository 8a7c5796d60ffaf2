use std::cell::{Cell, RefCell};
use std::rc::Rc;

use limelight::{
    Actor, AnchoredActor, Circle, HostElement, HostSurface, Margins, Rect, SceneScript, Size,
    SlotKind, StageLayout, StageMetrics, StageTemplates, TemplateId,
};

#[derive(Debug, Default)]
struct SurfaceState {
    visible: bool,
    inflated: Vec<(SlotKind, String)>,
    placed: Vec<(SlotKind, Rect)>,
    spotlight: Option<Circle>,
    title: Option<String>,
    dismiss_text: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct FakeSurface(Rc<RefCell<SurfaceState>>);

impl HostSurface for FakeSurface {
    fn set_visible(&self, visible: bool) {
        self.0.borrow_mut().visible = visible;
    }

    fn set_opacity(&self, _opacity: f64) {}

    fn set_blocks_input(&self, _blocks: bool) {}

    fn inflate(&self, slot: SlotKind, template: &TemplateId) {
        self.0.borrow_mut().inflated.push((slot, template.0.clone()));
    }

    fn slot_margins(&self, _slot: SlotKind) -> Margins {
        Margins::ZERO
    }

    fn set_label_text(&self, title: Option<&str>, _detail: Option<&str>) {
        self.0.borrow_mut().title = title.map(str::to_string);
    }

    fn set_dismiss_text(&self, text: Option<&str>) {
        self.0.borrow_mut().dismiss_text = text.map(str::to_string);
    }

    fn measure_label(&self, max_width: f64) -> Size {
        Size::new(max_width.min(600.0), 40.0)
    }

    fn measure_dismiss(&self) -> Size {
        Size::new(100.0, 48.0)
    }

    fn place(&self, slot: SlotKind, frame: Rect) {
        self.0.borrow_mut().placed.push((slot, frame));
    }

    fn set_spotlight(&self, circle: Option<Circle>) {
        self.0.borrow_mut().spotlight = circle;
    }

    fn spotlight_border(&self) -> f64 {
        2.0
    }

    fn arm_dismiss(&self, _armed: bool) {}
}

struct FakeElement {
    frame: Rc<Cell<Option<Rect>>>,
}

impl HostElement for FakeElement {
    fn frame(&self) -> Option<Rect> {
        self.frame.get()
    }
}

fn templates() -> StageTemplates {
    StageTemplates {
        spotlight: "spotlight.default".into(),
        label: "label.default".into(),
        dismiss: "dismiss.default".into(),
    }
}

fn metrics() -> StageMetrics {
    StageMetrics::new(Size::new(1000.0, 800.0), 50.0)
}

fn placed_for(surface: &FakeSurface, slot: SlotKind) -> Vec<Rect> {
    surface
        .0
        .borrow()
        .placed
        .iter()
        .filter(|(s, _)| *s == slot)
        .map(|(_, r)| *r)
        .collect()
}

#[test]
fn layout_places_spotlight_label_and_dismiss() {
    let frame = Rc::new(Cell::new(Some(Rect::new(380.0, 280.0, 420.0, 320.0))));
    let actor = AnchoredActor::builder(FakeElement {
        frame: Rc::clone(&frame),
    })
    .inner_padding(0.0)
    .build()
    .into_shared();

    let script = SceneScript::builder()
        .title("look here")
        .dismiss_text("OK")
        .actor(actor)
        .add()
        .finish();
    let surface = FakeSurface::default();
    let mut stage = StageLayout::new(surface.clone(), templates());
    stage.set_scene(Some(Rc::clone(script.get(0).unwrap())));
    stage.show();
    stage.layout_if_needed(&metrics());

    let state = surface.0.borrow();
    assert!(state.visible);
    assert_eq!(state.title.as_deref(), Some("look here"));
    assert_eq!(state.dismiss_text.as_deref(), Some("OK"));

    // Target is a 40x40 box centred on (400, 300); Around fit gives a
    // 20*sqrt(2) radius and the 2px border rounds the outer box to 31.
    let spot = state.spotlight.expect("spotlight should be set");
    assert_eq!(spot.center, limelight::Point::new(400.0, 300.0));
    assert!((spot.radius - 3200.0_f64.sqrt() / 2.0).abs() < 1e-9);
    drop(state);

    assert_eq!(
        placed_for(&surface, SlotKind::Spotlight),
        vec![Rect::new(369.0, 269.0, 431.0, 331.0)]
    );
    // Short label fits above the spotlight at full width.
    assert_eq!(
        placed_for(&surface, SlotKind::Label),
        vec![Rect::new(0.0, 50.0, 600.0, 90.0)]
    );
    // Dismiss is anchored bottom-right.
    assert_eq!(
        placed_for(&surface, SlotKind::Dismiss),
        vec![Rect::new(900.0, 752.0, 1000.0, 800.0)]
    );
}

#[test]
fn hidden_target_renders_label_only() {
    let frame = Rc::new(Cell::new(None));
    let actor = AnchoredActor::builder(FakeElement { frame })
        .build()
        .into_shared();
    let script = SceneScript::builder()
        .title("no target")
        .actor(actor)
        .add()
        .finish();
    let surface = FakeSurface::default();
    let mut stage = StageLayout::new(surface.clone(), templates());
    stage.set_scene(Some(Rc::clone(script.get(0).unwrap())));
    stage.show();
    stage.layout_if_needed(&metrics());

    assert!(surface.0.borrow().spotlight.is_none());
    assert!(placed_for(&surface, SlotKind::Spotlight).is_empty());
    assert_eq!(placed_for(&surface, SlotKind::Label).len(), 1);
}

#[test]
fn actor_invalidation_requests_exactly_one_relayout() {
    let frame = Rc::new(Cell::new(Some(Rect::new(0.0, 0.0, 40.0, 40.0))));
    let actor = Rc::new(RefCell::new(
        AnchoredActor::builder(FakeElement {
            frame: Rc::clone(&frame),
        })
        .build(),
    ));
    let shared: Rc<RefCell<dyn Actor>> = actor.clone();

    let script = SceneScript::builder()
        .title("moving")
        .actor(shared)
        .add()
        .finish();
    let surface = FakeSurface::default();
    let mut stage = StageLayout::new(surface.clone(), templates());
    stage.set_scene(Some(Rc::clone(script.get(0).unwrap())));
    stage.show();
    stage.layout_if_needed(&metrics());
    let passes = placed_for(&surface, SlotKind::Label).len();

    // No pending request: another flush is a no-op.
    stage.layout_if_needed(&metrics());
    assert_eq!(placed_for(&surface, SlotKind::Label).len(), passes);

    // The element moved; two notifications still collapse into one pass.
    frame.set(Some(Rect::new(100.0, 100.0, 140.0, 140.0)));
    actor.borrow_mut().invalidate();
    actor.borrow_mut().invalidate();
    stage.layout_if_needed(&metrics());
    stage.layout_if_needed(&metrics());
    assert_eq!(placed_for(&surface, SlotKind::Label).len(), passes + 1);

    let spot = surface.0.borrow().spotlight.unwrap();
    assert_eq!(spot.center, limelight::Point::new(120.0, 120.0));
}

#[test]
fn templates_reinflate_only_on_change() {
    let script = SceneScript::builder()
        .title("one")
        .label_template("label.wide")
        .add()
        .title("two")
        .label_template("label.wide")
        .add()
        .title("three")
        .add()
        .finish();
    let surface = FakeSurface::default();
    let mut stage = StageLayout::new(surface.clone(), templates());
    stage.set_scene(Some(Rc::clone(script.get(0).unwrap())));
    stage.show();

    let label_inflations = |surface: &FakeSurface| {
        surface
            .0
            .borrow()
            .inflated
            .iter()
            .filter(|(slot, _)| *slot == SlotKind::Label)
            .map(|(_, t)| t.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(label_inflations(&surface), vec!["label.wide".to_string()]);

    // Same template on the next scene: no re-inflation.
    stage.set_scene(Some(Rc::clone(script.get(1).unwrap())));
    assert_eq!(label_inflations(&surface).len(), 1);

    // Back to the stage default: one more inflation.
    stage.set_scene(Some(Rc::clone(script.get(2).unwrap())));
    assert_eq!(
        label_inflations(&surface),
        vec!["label.wide".to_string(), "label.default".to_string()]
    );
}
