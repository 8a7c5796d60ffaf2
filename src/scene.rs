use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::actor::Actor;
use crate::store::OneShotStore;

/// Identifier for a host-side layout template. The host resolves it to
/// whatever its toolkit inflates (a resource, a widget factory, a style).
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TemplateId(pub String);

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How a stage appears and disappears when the walk reaches its scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Transition {
    #[default]
    None,
    Fade,
}

/// Fallback fade length, used until the builder is told otherwise.
pub const DEFAULT_FADE: Duration = Duration::from_millis(400);

/// One step of a guided tour. Immutable once built; construction goes
/// through [`SceneBuilder`].
pub struct Scene {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub dismiss_text: Option<String>,
    pub spotlight_template: Option<TemplateId>,
    pub label_template: Option<TemplateId>,
    pub dismiss_template: Option<TemplateId>,
    pub actor: Option<Rc<RefCell<dyn Actor>>>,
    pub transition: Transition,
    /// Terminal marker: the walk ends here without displaying this scene.
    /// Its `transition` still selects the ending animation.
    pub is_end: bool,
    pub fade_duration: Duration,
    /// `None` means the scene is shown on every walk. `Some(id)` means it is
    /// shown until recorded as fired under `oneShot{id}`.
    pub one_shot: Option<u32>,
}

impl Scene {
    pub fn one_shot_key(&self) -> Option<String> {
        self.one_shot.map(|id| format!("oneShot{id}"))
    }

    /// Whether a filtered walk should display this scene. Unkeyed scenes are
    /// always eligible; keyed scenes default to eligible when the store has
    /// no entry (fail-open).
    pub fn eligible(&self, store: &dyn OneShotStore) -> bool {
        match self.one_shot_key() {
            None => true,
            Some(key) => store.get(&key, true),
        }
    }

    pub fn record_fired(&self, store: &mut dyn OneShotStore) {
        if let Some(key) = self.one_shot_key() {
            store.set(&key, false);
        }
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("title", &self.title)
            .field("detail", &self.detail)
            .field("dismiss_text", &self.dismiss_text)
            .field("has_actor", &self.actor.is_some())
            .field("transition", &self.transition)
            .field("is_end", &self.is_end)
            .field("fade_duration", &self.fade_duration)
            .field("one_shot", &self.one_shot)
            .finish()
    }
}

/// Ordered scene list. Append-only while building; frozen once handed to the
/// sequencer.
#[derive(Clone, Debug, Default)]
pub struct SceneScript {
    scenes: Vec<Rc<Scene>>,
}

impl SceneScript {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rc<Scene>> {
        self.scenes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Scene>> {
        self.scenes.iter()
    }
}

/// Values that persist across scenes until changed by a `default_*` setter.
#[derive(Clone, Debug)]
struct SceneDefaults {
    dismiss_text: Option<String>,
    spotlight_template: Option<TemplateId>,
    label_template: Option<TemplateId>,
    dismiss_template: Option<TemplateId>,
    transition: Transition,
    fade_duration: Duration,
}

impl Default for SceneDefaults {
    fn default() -> Self {
        Self {
            dismiss_text: None,
            spotlight_template: None,
            label_template: None,
            dismiss_template: None,
            transition: Transition::None,
            fade_duration: DEFAULT_FADE,
        }
    }
}

/// Values that apply to the next `add()` only.
#[derive(Clone, Default)]
struct SceneOverrides {
    title: Option<String>,
    detail: Option<String>,
    dismiss_text: Option<String>,
    spotlight_template: Option<TemplateId>,
    label_template: Option<TemplateId>,
    dismiss_template: Option<TemplateId>,
    actor: Option<Rc<RefCell<dyn Actor>>>,
    transition: Option<Transition>,
    fade_duration: Option<Duration>,
    one_shot: Option<u32>,
}

/// Builds a [`SceneScript`] as a sequence of `add()` calls. Defaults and
/// per-scene overrides are kept in separate structs and merged only at
/// `add()` time, so setting a default mid-script never silently rewrites the
/// scene being assembled.
#[derive(Default)]
pub struct SceneBuilder {
    defaults: SceneDefaults,
    pending: SceneOverrides,
    scenes: Vec<Rc<Scene>>,
}

impl SceneBuilder {
    pub fn title(mut self, s: impl Into<String>) -> Self {
        self.pending.title = Some(s.into());
        self
    }

    pub fn detail(mut self, s: impl Into<String>) -> Self {
        self.pending.detail = Some(s.into());
        self
    }

    pub fn dismiss_text(mut self, s: impl Into<String>) -> Self {
        self.pending.dismiss_text = Some(s.into());
        self
    }

    pub fn default_dismiss_text(mut self, s: impl Into<String>) -> Self {
        self.defaults.dismiss_text = Some(s.into());
        self
    }

    pub fn clear_default_dismiss_text(mut self) -> Self {
        self.defaults.dismiss_text = None;
        self
    }

    pub fn spotlight_template(mut self, id: impl Into<TemplateId>) -> Self {
        self.pending.spotlight_template = Some(id.into());
        self
    }

    pub fn default_spotlight_template(mut self, id: impl Into<TemplateId>) -> Self {
        self.defaults.spotlight_template = Some(id.into());
        self
    }

    pub fn label_template(mut self, id: impl Into<TemplateId>) -> Self {
        self.pending.label_template = Some(id.into());
        self
    }

    pub fn default_label_template(mut self, id: impl Into<TemplateId>) -> Self {
        self.defaults.label_template = Some(id.into());
        self
    }

    pub fn dismiss_template(mut self, id: impl Into<TemplateId>) -> Self {
        self.pending.dismiss_template = Some(id.into());
        self
    }

    pub fn default_dismiss_template(mut self, id: impl Into<TemplateId>) -> Self {
        self.defaults.dismiss_template = Some(id.into());
        self
    }

    pub fn actor(mut self, actor: Rc<RefCell<dyn Actor>>) -> Self {
        self.pending.actor = Some(actor);
        self
    }

    pub fn transition(mut self, t: Transition) -> Self {
        self.pending.transition = Some(t);
        self
    }

    pub fn default_transition(mut self, t: Transition) -> Self {
        self.defaults.transition = t;
        self
    }

    pub fn fade_duration(mut self, d: Duration) -> Self {
        self.pending.fade_duration = Some(d);
        self
    }

    pub fn default_fade_duration(mut self, d: Duration) -> Self {
        self.defaults.fade_duration = d;
        self
    }

    pub fn one_shot(mut self, id: u32) -> Self {
        self.pending.one_shot = Some(id);
        self
    }

    /// Snapshot the pending overrides merged over the current defaults into
    /// an immutable [`Scene`], append it, and reset the per-scene fields.
    pub fn add(mut self) -> Self {
        let scene = self.merge();
        self.scenes.push(Rc::new(scene));
        self.pending = SceneOverrides::default();
        self
    }

    /// Append a terminal blank scene. The walk stops here; the pending or
    /// default transition decides how the last stage animates away.
    pub fn end(mut self) -> Self {
        let transition = self.pending.transition.unwrap_or(self.defaults.transition);
        let fade_duration = self
            .pending
            .fade_duration
            .unwrap_or(self.defaults.fade_duration);
        self.scenes.push(Rc::new(Scene {
            title: None,
            detail: None,
            dismiss_text: None,
            spotlight_template: None,
            label_template: None,
            dismiss_template: None,
            actor: None,
            transition,
            is_end: true,
            fade_duration,
            one_shot: None,
        }));
        self.pending = SceneOverrides::default();
        self
    }

    pub fn finish(self) -> SceneScript {
        SceneScript {
            scenes: self.scenes,
        }
    }

    fn merge(&mut self) -> Scene {
        let pending = std::mem::take(&mut self.pending);
        Scene {
            title: pending.title,
            detail: pending.detail,
            dismiss_text: pending.dismiss_text.or_else(|| self.defaults.dismiss_text.clone()),
            spotlight_template: pending
                .spotlight_template
                .or_else(|| self.defaults.spotlight_template.clone()),
            label_template: pending
                .label_template
                .or_else(|| self.defaults.label_template.clone()),
            dismiss_template: pending
                .dismiss_template
                .or_else(|| self.defaults.dismiss_template.clone()),
            actor: pending.actor,
            transition: pending.transition.unwrap_or(self.defaults.transition),
            is_end: false,
            fade_duration: pending
                .fade_duration
                .unwrap_or(self.defaults.fade_duration),
            one_shot: pending.one_shot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn defaults_apply_until_changed() {
        let script = SceneScript::builder()
            .default_dismiss_text("Got it")
            .default_transition(Transition::Fade)
            .title("one")
            .add()
            .title("two")
            .dismiss_text("Next")
            .add()
            .default_dismiss_text("Done")
            .title("three")
            .add()
            .finish();

        let scenes: Vec<_> = script.iter().collect();
        assert_eq!(scenes[0].dismiss_text.as_deref(), Some("Got it"));
        assert_eq!(scenes[0].transition, Transition::Fade);
        assert_eq!(scenes[1].dismiss_text.as_deref(), Some("Next"));
        assert_eq!(scenes[2].dismiss_text.as_deref(), Some("Done"));
    }

    #[test]
    fn per_scene_fields_reset_after_add() {
        let script = SceneScript::builder()
            .title("one")
            .one_shot(4)
            .add()
            .title("two")
            .add()
            .finish();

        let scenes: Vec<_> = script.iter().collect();
        assert_eq!(scenes[0].one_shot, Some(4));
        assert_eq!(scenes[1].one_shot, None);
    }

    #[test]
    fn dismiss_and_title_are_independent() {
        let script = SceneScript::builder()
            .title("heading")
            .dismiss_text("Skip")
            .add()
            .finish();
        let scene = script.get(0).unwrap();
        assert_eq!(scene.title.as_deref(), Some("heading"));
        assert_eq!(scene.dismiss_text.as_deref(), Some("Skip"));
    }

    #[test]
    fn end_marks_terminal_scene_with_current_transition() {
        let script = SceneScript::builder()
            .title("one")
            .add()
            .transition(Transition::Fade)
            .end()
            .finish();
        let last = script.get(1).unwrap();
        assert!(last.is_end);
        assert_eq!(last.transition, Transition::Fade);
        assert!(last.title.is_none());
    }

    #[test]
    fn one_shot_eligibility_and_firing() {
        let mut store = MemoryStore::new();
        let script = SceneScript::builder().title("s").one_shot(9).add().finish();
        let scene = script.get(0).unwrap();
        assert!(scene.eligible(&store));
        scene.record_fired(&mut store);
        assert!(!scene.eligible(&store));
        assert!(!store.get("oneShot9", true));
    }

    #[test]
    fn unkeyed_scene_never_persists() {
        let mut store = MemoryStore::new();
        let script = SceneScript::builder().title("s").add().finish();
        let scene = script.get(0).unwrap();
        scene.record_fired(&mut store);
        assert!(scene.eligible(&store));
    }
}
