//! Scene implementation without a web engine.
//!
//! Keeps the scene contract observable: initialization and invalidation are announced,
//! sync reports whether anything changed since the last sync, and a navigation runs a
//! simulated load whose progress climbs from 0 to 100 one tick at a time.

use std::cell::RefCell;
use std::rc::Rc;
use anyhow::{bail, Result};
use url::Url;
use crate::gl::SurfaceFormat;
use crate::scene::{
    LifecycleState, LoadStatus, RenderControl, RenderTarget, Scene, SceneBuilder, SceneEvent, SceneEventSender,
    SceneWindow, WebView,
};
use crate::viewport::{SurfaceSize, Viewport};

pub struct HeadlessSceneBuilder {
    load_step: u8,
}

impl HeadlessSceneBuilder {
    pub fn new(load_step: u8) -> Self {
        Self {
            load_step: load_step.max(1),
        }
    }
}

impl Default for HeadlessSceneBuilder {
    fn default() -> Self {
        Self::new(10)
    }
}

impl SceneBuilder for HeadlessSceneBuilder {
    fn name(&self) -> &str {
        "headless"
    }

    fn build(&self, source: &str, events: SceneEventSender) -> Result<Scene> {
        if source.is_empty() {
            bail!("empty scene description");
        }

        let state = Rc::new(RefCell::new(HeadlessState::new(events, self.load_step)));

        Ok(Scene {
            window: Box::new(HeadlessWindow { state: state.clone() }),
            control: Box::new(HeadlessRenderControl { state: state.clone() }),
            root: Box::new(HeadlessWebView { state }),
        })
    }
}

struct HeadlessState {
    events: SceneEventSender,
    format: Option<SurfaceFormat>,
    geometry: Viewport,
    root_size: SurfaceSize,
    target: Option<RenderTarget>,
    initialized: bool,
    in_frame: bool,
    dirty: bool,
    frames: u64,

    url: Option<Url>,
    progress: u8,
    status: LoadStatus,
    lifecycle: LifecycleState,
    visible: bool,
    load_step: u8,
}

impl HeadlessState {
    fn new(events: SceneEventSender, load_step: u8) -> Self {
        Self {
            events,
            format: None,
            geometry: Viewport::default(),
            root_size: SurfaceSize::default(),
            target: None,
            initialized: false,
            in_frame: false,
            dirty: true,
            frames: 0,
            url: None,
            progress: 0,
            status: LoadStatus::Idle,
            lifecycle: LifecycleState::Active,
            visible: true,
            load_step,
        }
    }

    fn emit(&self, event: SceneEvent) {
        // The bridge may already be gone while the scene tears down
        let _ = self.events.send(event);
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.emit(SceneEvent::Changed);
    }

    fn advance_load(&mut self) {
        if self.status != LoadStatus::Started {
            return;
        }

        self.progress = self.progress.saturating_add(self.load_step).min(100);
        self.emit(SceneEvent::LoadProgress(self.progress));
        if self.progress == 100 {
            self.status = LoadStatus::Succeeded;
        }
        self.mark_changed();
    }
}

struct HeadlessWindow {
    state: Rc<RefCell<HeadlessState>>,
}

impl SceneWindow for HeadlessWindow {
    fn set_format(&mut self, format: SurfaceFormat) {
        self.state.borrow_mut().format = Some(format);
    }

    fn set_geometry(&mut self, geometry: Viewport) {
        let mut state = self.state.borrow_mut();
        if state.geometry != geometry {
            state.geometry = geometry;
            state.mark_changed();
        }
    }

    fn set_render_target(&mut self, target: Option<RenderTarget>) {
        let mut state = self.state.borrow_mut();
        state.target = target;
        if target.is_some() {
            state.emit(SceneEvent::SyncRequested);
        }
    }

    fn has_content_root(&self) -> bool {
        true
    }

    fn wants_tick(&self) -> bool {
        self.state.borrow().status == LoadStatus::Started
    }

    fn tick(&mut self) {
        self.state.borrow_mut().advance_load();
    }
}

struct HeadlessRenderControl {
    state: Rc<RefCell<HeadlessState>>,
}

impl RenderControl for HeadlessRenderControl {
    fn initialize(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.format.is_none() {
            bail!("scene format must be set before initialization");
        }

        if !state.initialized {
            state.initialized = true;
            state.emit(SceneEvent::Initialized);
        }
        Ok(())
    }

    fn begin_frame(&mut self) {
        self.state.borrow_mut().in_frame = true;
    }

    fn polish_items(&mut self) {}

    fn sync(&mut self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().dirty)
    }

    fn render(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.in_frame && state.target.is_some() {
            state.frames += 1;
        }
    }

    fn end_frame(&mut self) {
        self.state.borrow_mut().in_frame = false;
    }
}

impl Drop for HeadlessRenderControl {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.initialized {
            state.initialized = false;
            state.emit(SceneEvent::Invalidated);
        }
    }
}

struct HeadlessWebView {
    state: Rc<RefCell<HeadlessState>>,
}

impl WebView for HeadlessWebView {
    fn set_size(&mut self, size: SurfaceSize) {
        let mut state = self.state.borrow_mut();
        if state.root_size != size {
            state.root_size = size;
            state.mark_changed();
        }
    }

    fn set_url(&mut self, url: Url) {
        let mut state = self.state.borrow_mut();
        state.url = Some(url);
        state.progress = 0;
        state.status = LoadStatus::Started;
        state.emit(SceneEvent::LoadProgress(0));
        state.mark_changed();
    }

    fn url(&self) -> Option<Url> {
        self.state.borrow().url.clone()
    }

    fn load_progress(&self) -> u8 {
        self.state.borrow().progress
    }

    fn load_status(&self) -> LoadStatus {
        self.state.borrow().status
    }

    fn lifecycle_state(&self) -> LifecycleState {
        self.state.borrow().lifecycle
    }

    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<SceneEvent>) -> Vec<SceneEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn initialize_requires_format_and_announces_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scene = HeadlessSceneBuilder::default().build("embedded://webview", tx).unwrap();

        assert!(scene.control.initialize().is_err());

        scene.window.set_format(SurfaceFormat::default());
        scene.control.initialize().unwrap();
        scene.control.initialize().unwrap();
        assert_eq!(drain(&mut rx), vec![SceneEvent::Initialized]);

        drop(scene);
        assert_eq!(drain(&mut rx), vec![SceneEvent::Invalidated]);
    }

    #[test]
    fn load_progress_climbs_strictly_to_completion() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scene = HeadlessSceneBuilder::new(30).build("embedded://webview", tx).unwrap();

        scene.root.set_url(Url::parse("https://example.test").unwrap());
        assert_eq!(scene.root.load_status(), LoadStatus::Started);

        while scene.window.wants_tick() {
            scene.window.tick();
        }

        let progress: Vec<u8> = drain(&mut rx)
            .into_iter()
            .filter_map(|ev| match ev {
                SceneEvent::LoadProgress(p) => Some(p),
                _ => None,
            })
            .collect();

        assert_eq!(progress, vec![0, 30, 60, 90, 100]);
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(scene.root.load_status(), LoadStatus::Succeeded);
        assert_eq!(scene.root.url().unwrap().as_str(), "https://example.test/");
    }

    #[test]
    fn sync_reports_changes_once() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scene = HeadlessSceneBuilder::default().build("embedded://webview", tx).unwrap();

        assert!(scene.control.sync());
        assert!(!scene.control.sync());

        scene.root.set_size(SurfaceSize::new(10, 10));
        assert!(scene.control.sync());
        scene.root.set_size(SurfaceSize::new(10, 10));
        assert!(!scene.control.sync());
    }

    #[test]
    fn empty_description_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(HeadlessSceneBuilder::default().build("", tx).is_err());
    }
}
