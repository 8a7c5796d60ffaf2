#![forbid(unsafe_code)]

pub mod actor;
pub mod error;
pub mod geom;
pub mod host;
pub mod placer;
pub mod scene;
pub mod sequencer;
pub mod stage;
pub mod store;

pub use actor::{Actor, AnchoredActor, HostElement, SpotlightFit, StageHandle};
pub use error::{LimelightError, LimelightResult};
pub use geom::{Circle, Margins, Point, Rect, Size, StageMetrics, Vec2};
pub use host::{FadeSpec, FadeTrack, Host, HostSurface, SlotKind, StageTemplates};
pub use placer::{LabelPlacement, Placement, PlacerInput, place_label};
pub use scene::{DEFAULT_FADE, Scene, SceneBuilder, SceneScript, TemplateId, Transition};
pub use sequencer::{SceneSequencer, TransitionOutcome};
pub use stage::StageLayout;
pub use store::{JsonFileStore, MemoryStore, OneShotStore};
