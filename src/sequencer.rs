use std::rc::Rc;
use std::time::Duration;

use crate::host::{FadeSpec, FadeTrack, Host};
use crate::scene::{DEFAULT_FADE, Scene, SceneScript, Transition};
use crate::stage::StageLayout;
use crate::store::OneShotStore;

/// How a fade ended. Cancellation is treated as immediate completion, so the
/// sequencer can never wedge waiting on an animation that will not finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    Completed,
    Cancelled,
}

/// Where the sequencer is in its transition state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Not running, or torn down.
    Idle,
    /// One stage bound and armed, no animation in flight.
    Showing,
    /// First scene fading in on the single stage.
    FadingIn,
    /// Two live stages: `stage` fading out, `next_stage` fading in.
    Crossfading,
    /// Last stage fading out; settles into teardown.
    Ending,
}

/// Walks an ordered scene list, skipping already-fired one-shot scenes, and
/// drives show/hide/crossfade transitions between stages.
///
/// The sequencer owns stage lifetime so the stages themselves stay
/// transition-agnostic. A crossfade holds exactly two live stages (outgoing
/// and incoming) until the host reports settlement; at every other moment at
/// most one scene is current.
pub struct SceneSequencer<H: Host> {
    host: H,
    store: Box<dyn OneShotStore>,
    script: SceneScript,
    cursor: Option<usize>,
    show_all: bool,
    current: Option<Rc<Scene>>,
    stage: Option<StageLayout<H::Surface>>,
    next_stage: Option<StageLayout<H::Surface>>,
    phase: Phase,
}

impl<H: Host> SceneSequencer<H> {
    pub fn new(host: H, store: impl OneShotStore + 'static, script: SceneScript) -> Self {
        Self {
            host,
            store: Box::new(store),
            script,
            cursor: None,
            show_all: false,
            current: None,
            stage: None,
            next_stage: None,
            phase: Phase::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Start the walk. `show_all` bypasses one-shot filtering (manual
    /// replay). A no-op while already running.
    pub fn show(&mut self, show_all: bool) {
        if self.cursor.is_some() {
            return;
        }
        self.show_all = show_all;
        self.cursor = Some(0);
        self.advance();
    }

    /// The dismiss action: record the current scene as fired, disarm its
    /// control, and move on. Ignored unless a scene is currently armed.
    pub fn dismiss(&mut self) {
        if self.phase != Phase::Showing {
            return;
        }
        if let Some(scene) = &self.current {
            scene.record_fired(self.store.as_mut());
        }
        if let Some(stage) = &mut self.stage {
            stage.arm(false);
        }
        self.advance();
    }

    /// Tear everything down: cancel any in-flight fade, unbind both stages,
    /// remove the overlay, reset iteration. Idempotent.
    pub fn hide(&mut self) {
        tracing::debug!(target: "limelight::sequencer", "hide");
        // Idle first, so a settlement racing in after the cancel is guarded.
        self.phase = Phase::Idle;
        self.host.cancel_fade();
        if let Some(stage) = &mut self.stage {
            stage.hide();
            stage.set_scene(None);
        }
        if let Some(stage) = &mut self.next_stage {
            stage.hide();
            stage.set_scene(None);
        }
        self.stage = None;
        self.next_stage = None;
        self.host.remove_surfaces();
        self.cursor = None;
        self.current = None;
    }

    /// Settlement of the in-flight fade, completion and cancellation alike.
    /// Safe to call at any time; a stale or duplicate settlement (after
    /// `hide()`, or in a phase with nothing animating) is a no-op.
    pub fn on_transition_settled(&mut self, outcome: TransitionOutcome) {
        tracing::trace!(target: "limelight::sequencer", ?outcome, phase = ?self.phase, "transition settled");
        match self.phase {
            Phase::FadingIn => {
                if let Some(stage) = &mut self.stage {
                    stage.set_opacity(1.0);
                    stage.arm(true);
                }
                self.phase = Phase::Showing;
            }
            Phase::Crossfading => {
                tracing::debug!(target: "limelight::sequencer", "swap scenes");
                if let Some(outgoing) = &mut self.stage {
                    outgoing.hide();
                    outgoing.set_scene(None);
                }
                // The drained stage is kept around for the next crossfade.
                std::mem::swap(&mut self.stage, &mut self.next_stage);
                if let Some(stage) = &mut self.stage {
                    stage.set_opacity(1.0);
                    stage.arm(true);
                }
                self.phase = Phase::Showing;
            }
            Phase::Ending => self.hide(),
            Phase::Idle | Phase::Showing => {}
        }
    }

    /// Flush any re-layout passes requested by actor invalidations.
    pub fn layout_if_needed(&mut self) {
        let metrics = self.host.stage_metrics();
        for stage in [&mut self.stage, &mut self.next_stage].into_iter().flatten() {
            stage.layout_if_needed(&metrics);
        }
    }

    fn advance(&mut self) {
        let prev = self.current.take();
        let next = self.walk();

        let mut end = next.is_none();
        let mut transition = Transition::None;
        if let Some(scene) = &next {
            transition = scene.transition;
            if scene.is_end {
                end = true;
            }
        }

        if !end {
            self.ensure_stage();
            if transition == Transition::Fade && prev.is_some() {
                self.ensure_next_stage();
            }
        } else if self.stage.is_none() {
            // The walk ended before anything was ever shown.
            self.hide();
            return;
        }

        let fade_duration = fade_duration(&prev, &next, end);
        self.current = if end { None } else { next };
        let metrics = self.host.stage_metrics();

        match transition {
            Transition::None => {
                if end {
                    self.hide();
                } else if let Some(stage) = &mut self.stage {
                    stage.show();
                    stage.set_scene(self.current.clone());
                    stage.layout_if_needed(&metrics);
                    stage.arm(true);
                    self.phase = Phase::Showing;
                }
            }
            Transition::Fade => {
                if end {
                    tracing::debug!(target: "limelight::sequencer", "fade out final scene");
                    if let Some(stage) = &mut self.stage {
                        stage.arm(false);
                        let fade = FadeSpec {
                            duration: fade_duration,
                            tracks: vec![FadeTrack {
                                surface: stage.surface().clone(),
                                from: 1.0,
                                to: 0.0,
                            }],
                        };
                        self.host.begin_fade(fade);
                        self.phase = Phase::Ending;
                    }
                } else if prev.is_some() {
                    tracing::debug!(target: "limelight::sequencer", "crossfade scenes");
                    let Some(incoming) = &mut self.next_stage else {
                        return;
                    };
                    incoming.show();
                    incoming.set_scene(self.current.clone());
                    incoming.layout_if_needed(&metrics);
                    incoming.set_opacity(0.0);
                    let incoming_surface = incoming.surface().clone();
                    let Some(outgoing) = &mut self.stage else {
                        return;
                    };
                    // Outgoing stays visible but non-interactive during the
                    // overlap; both stages keep blocking the UI underneath.
                    outgoing.arm(false);
                    let fade = FadeSpec {
                        duration: fade_duration,
                        tracks: vec![
                            FadeTrack {
                                surface: outgoing.surface().clone(),
                                from: 1.0,
                                to: 0.0,
                            },
                            FadeTrack {
                                surface: incoming_surface,
                                from: 0.0,
                                to: 1.0,
                            },
                        ],
                    };
                    self.host.begin_fade(fade);
                    self.phase = Phase::Crossfading;
                } else {
                    tracing::debug!(target: "limelight::sequencer", "fade in first scene");
                    if let Some(stage) = &mut self.stage {
                        stage.show();
                        stage.set_scene(self.current.clone());
                        stage.layout_if_needed(&metrics);
                        stage.set_opacity(0.0);
                        let fade = FadeSpec {
                            duration: fade_duration,
                            tracks: vec![FadeTrack {
                                surface: stage.surface().clone(),
                                from: 0.0,
                                to: 1.0,
                            }],
                        };
                        self.host.begin_fade(fade);
                        self.phase = Phase::FadingIn;
                    }
                }
            }
        }
    }

    /// Move the cursor to the next scene the filter lets through.
    fn walk(&mut self) -> Option<Rc<Scene>> {
        while let Some(i) = self.cursor {
            let Some(candidate) = self.script.get(i) else {
                break;
            };
            let candidate = Rc::clone(candidate);
            self.cursor = Some(i + 1);
            if self.show_all || candidate.eligible(self.store.as_ref()) {
                return Some(candidate);
            }
            tracing::trace!(target: "limelight::sequencer", index = i, "skipping fired one-shot scene");
        }
        None
    }

    fn ensure_stage(&mut self) {
        if self.stage.is_none() {
            let surface = self.host.insert_surface();
            self.stage = Some(StageLayout::new(surface, self.host.default_templates()));
        }
    }

    fn ensure_next_stage(&mut self) {
        if self.next_stage.is_none() {
            let surface = self.host.insert_surface();
            self.next_stage = Some(StageLayout::new(surface, self.host.default_templates()));
        }
    }
}

fn fade_duration(prev: &Option<Rc<Scene>>, next: &Option<Rc<Scene>>, end: bool) -> Duration {
    if end {
        // An ending fade animates the previous scene's stage away, so its
        // duration governs; the terminal marker's only as a fallback.
        prev.as_ref()
            .map(|s| s.fade_duration)
            .or_else(|| next.as_ref().map(|s| s.fade_duration))
            .unwrap_or(DEFAULT_FADE)
    } else {
        next.as_ref()
            .map(|s| s.fade_duration)
            .unwrap_or(DEFAULT_FADE)
    }
}
