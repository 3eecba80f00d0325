use std::rc::Rc;
use log::{debug, info, trace, warn};
use tokio::sync::mpsc;
use url::Url;
use crate::bridge::{BridgeId, UpdateScheduler};
use crate::errors::BridgeError;
use crate::gl::{GpuContext, OffscreenSurface, TextureId, NO_TEXTURE};
use crate::scene::event::SceneEventReceiver;
use crate::scene::{RenderTarget, Scene, SceneBuilder, SceneEvent, WebView};
use crate::viewport::{SurfaceSize, Viewport};

/// Called on the graphics thread whenever the bridge's texture changes, with `0` when
/// the texture goes away.
pub type TextureChanged = Box<dyn FnMut(BridgeId, TextureId) + Send>;

/// Lifecycle of a bridge's render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Render control has not been initialized (or failed to)
    Uninitialized,
    /// Ready to render but no texture is allocated
    TextureAbsent,
    /// A texture sized to the viewport is bound as render target
    TextureActive,
    /// Torn down; no further callbacks
    Destroyed,
}

/// Counters of render passes, for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Completed render passes
    pub passes: u64,
    /// Completed passes that ran polish and sync first
    pub synced_passes: u64,
    /// Passes skipped because nothing could be rendered into
    pub dropped_passes: u64,
}

/// Renders a scene into a texture shared with the host.
///
/// Lives on the graphics thread. The shared context is only made current for the
/// duration of a single operation and released afterwards.
pub struct RenderBridge {
    id: BridgeId,
    /// Dropped before `surface`, the scene may still reference it
    scene: Scene,
    surface: Box<dyn OffscreenSurface>,
    context: Rc<dyn GpuContext>,
    events: SceneEventReceiver,
    viewport: Viewport,
    texture: Option<RenderTarget>,
    scheduler: UpdateScheduler,
    on_texture_changed: Option<TextureChanged>,
    initialized: bool,
    /// Viewport changed but the texture still has the old size
    resize_pending: bool,
    destroyed: bool,
    stats: RenderStats,
}

impl RenderBridge {
    /// Create a bridge rendering `source` at `size`.
    ///
    /// Failing to make the context current or to initialize the render control is
    /// logged and leaves the bridge in a degraded state; only a missing surface or scene
    /// is an error.
    pub fn create(
        id: BridgeId,
        context: Rc<dyn GpuContext>,
        builder: &dyn SceneBuilder,
        source: &str,
        size: SurfaceSize,
        on_texture_changed: Option<TextureChanged>,
    ) -> Result<Self, BridgeError> {
        let format = context.format();
        let surface = context.create_offscreen_surface().map_err(BridgeError::Surface)?;

        let current = context.make_current(surface.as_ref());
        if !current {
            warn!("Bridge {id}: unable to make {} context current", context.name());
        }
        debug!("Bridge {id}: surface format {format}");

        let (events_tx, events) = mpsc::unbounded_channel();
        let scene = match builder.build(source, events_tx) {
            Ok(scene) => scene,
            Err(e) => {
                if current {
                    context.done_current();
                }
                return Err(BridgeError::Scene(e));
            }
        };

        let mut bridge = Self {
            id,
            scene,
            surface,
            context,
            events,
            viewport: Viewport::sized(size),
            texture: None,
            scheduler: UpdateScheduler::new(),
            on_texture_changed,
            initialized: false,
            resize_pending: false,
            destroyed: false,
            stats: RenderStats::default(),
        };

        bridge.scene.window.set_format(format);
        bridge.update_sizes();

        match bridge.scene.control.initialize() {
            Ok(()) => bridge.initialized = true,
            Err(e) => warn!("Bridge {id}: failed to initialize renderer: {e}"),
        }

        if current {
            bridge.context.done_current();
        }

        info!("Bridge {id} created at {}x{} ({} scene)", size.width, size.height, builder.name());
        Ok(bridge)
    }

    pub fn id(&self) -> BridgeId {
        self.id
    }

    pub fn state(&self) -> BridgeState {
        if self.destroyed {
            BridgeState::Destroyed
        } else if !self.initialized {
            BridgeState::Uninitialized
        } else if self.texture.is_some() {
            BridgeState::TextureActive
        } else {
            BridgeState::TextureAbsent
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current texture, `0` when none is allocated.
    pub fn texture(&self) -> TextureId {
        self.texture.map_or(NO_TEXTURE, |t| t.texture)
    }

    pub fn texture_size(&self) -> Option<SurfaceSize> {
        self.texture.map(|t| t.size)
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// The scene's root item as a web view.
    pub fn web_view(&mut self) -> &mut dyn WebView {
        self.scene.root.as_mut()
    }

    pub fn navigate(&mut self, url: &str) -> Result<(), BridgeError> {
        let url = Url::parse(url)?;
        debug!("Bridge {}: navigating to {url}", self.id);
        self.scene.root.set_url(url);
        Ok(())
    }

    /// Debounce an update. Any number of requests before the next loop turn result in
    /// a single render pass on that turn.
    pub fn request_update(&mut self, scene_changed: bool) {
        self.scheduler.request(scene_changed);
    }

    /// True when the next loop turn has something to do for this bridge.
    pub fn has_pending_work(&self) -> bool {
        self.scheduler.is_armed() || !self.events.is_empty()
    }

    /// Run the debounce timer if it was armed. Returns true if a render was attempted.
    pub fn fire_timer(&mut self) -> bool {
        if self.scheduler.take_due() {
            self.render();
            true
        } else {
            false
        }
    }

    /// Dispatch all queued scene notifications.
    pub fn pump_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.try_recv() {
            self.dispatch(event);
            count += 1;
        }
        count
    }

    pub fn wants_tick(&self) -> bool {
        self.scene.window.wants_tick()
    }

    pub fn tick(&mut self) {
        self.scene.window.tick();
    }

    fn dispatch(&mut self, event: SceneEvent) {
        trace!("Bridge {}: {:?}", self.id, event);
        if self.destroyed {
            return;
        }

        match event {
            SceneEvent::Initialized => self.on_scene_initialized(),
            SceneEvent::Invalidated => self.on_scene_invalidated(),
            SceneEvent::Changed => self.request_update(true),
            SceneEvent::SyncRequested => self.request_update(false),
            SceneEvent::LoadProgress(progress) => {
                let view = self.scene.root.as_ref();
                info!(
                    "Bridge {}: load progress {progress}, state = {}, lifecycle = {}, visible = {}",
                    self.id,
                    view.load_status(),
                    view.lifecycle_state(),
                    view.is_visible(),
                );
            }
        }
    }

    fn on_scene_initialized(&mut self) {
        if !self.resize_pending && self.texture_size() == Some(self.viewport.as_size()) {
            return;
        }

        if !self.swap_texture() {
            warn!("Bridge {}: context not current, texture not created", self.id);
        }
    }

    fn on_scene_invalidated(&mut self) {
        if self.texture.is_none() {
            return;
        }

        let current = self.context.make_current(self.surface.as_ref());
        self.destroy_texture(current);
        if current {
            self.context.done_current();
        }
    }

    /// Render one frame into the texture.
    ///
    /// With a pending structural change this polishes and syncs first and paints only if
    /// the sync reported changes; otherwise it repaints the unchanged scene.
    pub fn render(&mut self) {
        if self.destroyed || !self.initialized {
            self.stats.dropped_passes += 1;
            trace!("Bridge {}: not ready to render", self.id);
            return;
        }

        if self.resize_pending && !self.swap_texture() {
            self.stats.dropped_passes += 1;
            trace!("Bridge {}: resize still deferred, pass dropped", self.id);
            return;
        }

        if self.texture_size() != Some(self.viewport.as_size()) {
            self.stats.dropped_passes += 1;
            trace!("Bridge {}: no texture of the viewport size", self.id);
            return;
        }

        if !self.context.make_current(self.surface.as_ref()) {
            self.stats.dropped_passes += 1;
            trace!("Bridge {}: context not current, pass dropped", self.id);
            return;
        }

        let control = &mut self.scene.control;
        control.begin_frame();

        if self.scheduler.take_pending_change() {
            control.polish_items();
            if control.sync() {
                control.render();
            }
            self.stats.synced_passes += 1;
        } else {
            control.render();
        }

        control.end_frame();
        self.context.done_current();
        self.stats.passes += 1;
    }

    /// Resize the viewport, reallocate the texture and render once before returning.
    ///
    /// If the context cannot be made current the swap is deferred to the next render
    /// pass, and no pass paints until it has happened.
    pub fn resize(&mut self, size: SurfaceSize) {
        if self.destroyed {
            return;
        }

        self.viewport.resize(size.width, size.height);
        self.resize_pending = true;

        if !self.swap_texture() {
            warn!("Bridge {}: resize to {}x{} deferred", self.id, size.width, size.height);
            self.scheduler.request(true);
            return;
        }

        // Sizing marks the scene changed; take that into this pass
        self.pump_events();
        self.render();
    }

    /// Replace the texture with one of the viewport size and resize the scene to match.
    /// Returns false if the context could not be made current.
    fn swap_texture(&mut self) -> bool {
        if !self.scene.window.has_content_root() || !self.context.make_current(self.surface.as_ref()) {
            return false;
        }

        self.destroy_texture(true);
        self.create_texture();
        self.context.done_current();

        if self.resize_pending {
            self.resize_pending = false;
            self.update_sizes();
        }
        true
    }

    /// Tear the bridge down: release the texture and report `0`. Later calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        if self.texture.is_some() {
            let current = self.context.make_current(self.surface.as_ref());
            self.destroy_texture(current);
            if current {
                self.context.done_current();
            }
        } else {
            self.notify_texture_changed(NO_TEXTURE);
        }

        self.destroyed = true;
        self.on_texture_changed = None;
        debug!("Bridge {} destroyed", self.id);
    }

    fn update_sizes(&mut self) {
        self.scene.root.set_size(self.viewport.as_size());
        self.scene.window.set_geometry(self.viewport);
    }

    // Context must be current.
    fn create_texture(&mut self) {
        let size = self.viewport.as_size();

        match self.context.create_texture(size) {
            Ok(texture) => {
                let target = RenderTarget { texture, size };
                self.texture = Some(target);
                self.scene.window.set_render_target(Some(target));
                debug!("Bridge {}: texture {texture} ({}x{})", self.id, size.width, size.height);
                self.notify_texture_changed(texture);
            }
            Err(e) => warn!("Bridge {}: texture allocation failed: {e}", self.id),
        }
    }

    fn destroy_texture(&mut self, context_current: bool) {
        let Some(target) = self.texture.take() else {
            return;
        };

        self.notify_texture_changed(NO_TEXTURE);
        self.scene.window.set_render_target(None);

        if context_current {
            self.context.delete_texture(target.texture);
        } else {
            warn!("Bridge {}: texture {} released without a current context", self.id, target.texture);
        }
    }

    fn notify_texture_changed(&mut self, texture: TextureId) {
        if let Some(callback) = self.on_texture_changed.as_mut() {
            callback(self.id, texture);
        }
    }
}

impl Drop for RenderBridge {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use crate::gl::headless::HeadlessContext;
    use crate::scene::headless::HeadlessSceneBuilder;
    use crate::scene::{LoadStatus, SceneEventSender};

    type Calls = Arc<Mutex<Vec<TextureId>>>;

    /// Headless scenes whose notification channel the test can also send on.
    #[derive(Default)]
    struct TappedScenes {
        tap: RefCell<Option<SceneEventSender>>,
    }

    impl TappedScenes {
        fn send(&self, event: SceneEvent) {
            self.tap.borrow().as_ref().unwrap().send(event).unwrap();
        }
    }

    impl SceneBuilder for TappedScenes {
        fn name(&self) -> &str {
            "tapped"
        }

        fn build(&self, source: &str, events: SceneEventSender) -> anyhow::Result<Scene> {
            *self.tap.borrow_mut() = Some(events.clone());
            HeadlessSceneBuilder::default().build(source, events)
        }
    }

    fn bridge_from(ctx: &Rc<HeadlessContext>, scenes: &dyn SceneBuilder, size: SurfaceSize) -> (RenderBridge, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let callback: TextureChanged = Box::new(move |_, tex| sink.lock().unwrap().push(tex));

        let bridge = RenderBridge::create(
            BridgeId::from_raw(1).unwrap(),
            ctx.clone(),
            scenes,
            "embedded://webview",
            size,
            Some(callback),
        )
        .unwrap();

        (bridge, calls)
    }

    fn bridge_with(ctx: &Rc<HeadlessContext>, size: SurfaceSize) -> (RenderBridge, Calls) {
        bridge_from(ctx, &HeadlessSceneBuilder::default(), size)
    }

    /// One loop turn: due timers first, then notifications.
    fn turn(bridge: &mut RenderBridge) {
        bridge.fire_timer();
        bridge.pump_events();
    }

    fn settle(bridge: &mut RenderBridge) {
        for _ in 0..16 {
            if !bridge.has_pending_work() {
                return;
            }
            turn(bridge);
        }
        panic!("bridge did not settle");
    }

    #[test]
    fn texture_is_created_when_scene_initializes() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, calls) = bridge_with(&ctx, SurfaceSize::new(800, 600));

        assert_eq!(bridge.state(), BridgeState::TextureAbsent);
        assert_eq!(bridge.texture(), 0);

        turn(&mut bridge);

        let tex = bridge.texture();
        assert_ne!(tex, 0);
        assert_eq!(bridge.state(), BridgeState::TextureActive);
        assert_eq!(ctx.texture_size(tex), Some(SurfaceSize::new(800, 600)));
        assert_eq!(*calls.lock().unwrap(), vec![tex]);
        assert!(!ctx.is_current());
    }

    #[test]
    fn update_bursts_coalesce_into_one_pass_per_turn() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, _calls) = bridge_with(&ctx, SurfaceSize::new(64, 64));
        settle(&mut bridge);

        let before = bridge.stats().passes;
        for _ in 0..10 {
            bridge.request_update(false);
        }
        turn(&mut bridge);
        assert_eq!(bridge.stats().passes, before + 1);

        turn(&mut bridge);
        assert_eq!(bridge.stats().passes, before + 1);
    }

    #[test]
    fn pending_change_runs_sync_once() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, _calls) = bridge_with(&ctx, SurfaceSize::new(64, 64));
        settle(&mut bridge);

        let before = bridge.stats();
        bridge.request_update(true);
        bridge.request_update(false);
        turn(&mut bridge);
        bridge.request_update(false);
        turn(&mut bridge);

        let after = bridge.stats();
        assert_eq!(after.passes, before.passes + 2);
        assert_eq!(after.synced_passes, before.synced_passes + 1);
    }

    #[test]
    fn resize_swaps_texture_and_renders_before_returning() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, calls) = bridge_with(&ctx, SurfaceSize::new(800, 600));
        settle(&mut bridge);
        let first = bridge.texture();
        calls.lock().unwrap().clear();

        let before = bridge.stats();
        bridge.resize(SurfaceSize::new(400, 300));
        let after = bridge.stats();

        let second = bridge.texture();
        assert_eq!(after.passes, before.passes + 1);
        assert_eq!(after.synced_passes, before.synced_passes + 1);
        assert_eq!(*calls.lock().unwrap(), vec![0, second]);
        assert_eq!(bridge.texture_size(), Some(SurfaceSize::new(400, 300)));
        assert_eq!(ctx.texture_size(second), Some(SurfaceSize::new(400, 300)));
        assert_eq!(ctx.texture_size(first), None);
        assert_eq!(ctx.live_textures(), 1);
    }

    #[test]
    fn deferred_resize_completes_before_anything_paints() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, calls) = bridge_with(&ctx, SurfaceSize::new(800, 600));
        settle(&mut bridge);
        let first = bridge.texture();
        calls.lock().unwrap().clear();
        let before = bridge.stats();

        ctx.refuse_make_current(true);
        bridge.resize(SurfaceSize::new(400, 300));
        assert_eq!(bridge.viewport().as_size(), SurfaceSize::new(400, 300));
        assert_eq!(bridge.texture(), first);
        assert!(calls.lock().unwrap().is_empty());

        // Still refused: the stale texture is not painted into
        turn(&mut bridge);
        assert_eq!(bridge.stats().passes, before.passes);
        assert_eq!(bridge.stats().dropped_passes, before.dropped_passes + 1);

        ctx.refuse_make_current(false);
        bridge.request_update(false);
        turn(&mut bridge);

        let second = bridge.texture();
        assert_eq!(bridge.texture_size(), Some(SurfaceSize::new(400, 300)));
        assert_eq!(ctx.texture_size(second), Some(SurfaceSize::new(400, 300)));
        assert_eq!(ctx.texture_size(first), None);
        assert_eq!(*calls.lock().unwrap(), vec![0, second]);
        assert_eq!(bridge.stats().passes, before.passes + 1);
        assert_eq!(bridge.stats().synced_passes, before.synced_passes + 1);

        for _ in 0..3 {
            bridge.request_update(false);
            turn(&mut bridge);
        }
        assert_eq!(bridge.texture(), second);
        assert_eq!(bridge.stats().passes, before.passes + 4);
    }

    #[test]
    fn scene_invalidation_releases_texture_until_reinitialized() {
        let ctx = Rc::new(HeadlessContext::default());
        let scenes = TappedScenes::default();
        let (mut bridge, calls) = bridge_from(&ctx, &scenes, SurfaceSize::new(64, 64));
        settle(&mut bridge);
        calls.lock().unwrap().clear();

        scenes.send(SceneEvent::Invalidated);
        turn(&mut bridge);
        assert_eq!(bridge.state(), BridgeState::TextureAbsent);
        assert_eq!(*calls.lock().unwrap(), vec![0]);
        assert_eq!(ctx.live_textures(), 0);

        let before = bridge.stats();
        bridge.request_update(false);
        turn(&mut bridge);
        assert_eq!(bridge.stats().passes, before.passes);
        assert_eq!(bridge.stats().dropped_passes, before.dropped_passes + 1);

        scenes.send(SceneEvent::Initialized);
        turn(&mut bridge);
        let second = bridge.texture();
        assert_ne!(second, 0);
        assert_eq!(bridge.state(), BridgeState::TextureActive);
        assert_eq!(ctx.texture_size(second), Some(SurfaceSize::new(64, 64)));
        assert_eq!(*calls.lock().unwrap(), vec![0, second]);
    }

    #[test]
    fn reinitialization_replaces_a_stale_texture() {
        let ctx = Rc::new(HeadlessContext::default());
        let scenes = TappedScenes::default();
        let (mut bridge, calls) = bridge_from(&ctx, &scenes, SurfaceSize::new(800, 600));
        settle(&mut bridge);
        let first = bridge.texture();
        calls.lock().unwrap().clear();

        ctx.refuse_make_current(true);
        bridge.resize(SurfaceSize::new(400, 300));
        ctx.refuse_make_current(false);

        scenes.send(SceneEvent::Initialized);
        bridge.pump_events();
        let second = bridge.texture();
        assert_eq!(*calls.lock().unwrap(), vec![0, second]);
        assert_eq!(bridge.texture_size(), Some(SurfaceSize::new(400, 300)));
        assert_eq!(ctx.texture_size(first), None);
        assert_eq!(ctx.live_textures(), 1);

        // Already the right size: nothing to replace
        calls.lock().unwrap().clear();
        scenes.send(SceneEvent::Initialized);
        bridge.pump_events();
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(bridge.texture(), second);
    }

    #[test]
    fn destroy_is_terminal() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, calls) = bridge_with(&ctx, SurfaceSize::new(64, 64));
        settle(&mut bridge);
        let tex = bridge.texture();
        let passes = bridge.stats().passes;

        bridge.destroy();
        assert_eq!(bridge.state(), BridgeState::Destroyed);
        assert_eq!(*calls.lock().unwrap(), vec![tex, 0]);
        assert_eq!(ctx.live_textures(), 0);

        bridge.resize(SurfaceSize::new(32, 32));
        bridge.request_update(true);
        turn(&mut bridge);
        assert_eq!(bridge.stats().passes, passes);
        assert_eq!(bridge.texture(), 0);

        bridge.destroy();
        drop(bridge);
        assert_eq!(*calls.lock().unwrap(), vec![tex, 0]);
        assert_eq!(ctx.live_textures(), 0);
    }

    #[test]
    fn bridge_without_texture_still_reports_null_on_destroy() {
        let ctx = Rc::new(HeadlessContext::default());
        ctx.refuse_make_current(true);
        let (mut bridge, calls) = bridge_with(&ctx, SurfaceSize::new(64, 64));
        turn(&mut bridge);
        assert_eq!(bridge.texture(), 0);

        drop(bridge);
        assert_eq!(*calls.lock().unwrap(), vec![0]);
    }

    #[test]
    fn passes_without_current_context_are_dropped_and_recover() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, _calls) = bridge_with(&ctx, SurfaceSize::new(64, 64));
        settle(&mut bridge);
        let before = bridge.stats();

        ctx.refuse_make_current(true);
        bridge.request_update(true);
        turn(&mut bridge);
        assert_eq!(bridge.stats().passes, before.passes);
        assert_eq!(bridge.stats().dropped_passes, before.dropped_passes + 1);

        ctx.refuse_make_current(false);
        bridge.request_update(false);
        turn(&mut bridge);
        assert_eq!(bridge.stats().passes, before.passes + 1);
        // The change survived the dropped pass
        assert_eq!(bridge.stats().synced_passes, before.synced_passes + 1);
    }

    #[test]
    fn nothing_renders_before_a_texture_exists() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, _calls) = bridge_with(&ctx, SurfaceSize::new(64, 64));

        bridge.render();
        assert_eq!(bridge.stats().passes, 0);
        assert_eq!(bridge.stats().dropped_passes, 1);
    }

    #[test]
    fn drop_reports_null_texture_last() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, calls) = bridge_with(&ctx, SurfaceSize::new(64, 64));
        settle(&mut bridge);
        let tex = bridge.texture();

        drop(bridge);

        assert_eq!(*calls.lock().unwrap(), vec![tex, 0]);
        assert_eq!(ctx.live_textures(), 0);
    }

    #[test]
    fn navigation_drives_load_progress() {
        let ctx = Rc::new(HeadlessContext::default());
        let (mut bridge, _calls) = bridge_with(&ctx, SurfaceSize::new(64, 64));
        settle(&mut bridge);

        assert!(matches!(bridge.navigate("not a url"), Err(BridgeError::InvalidUrl(_))));

        bridge.navigate("https://example.test").unwrap();
        assert_eq!(bridge.web_view().load_progress(), 0);

        let mut seen = vec![bridge.web_view().load_progress()];
        while bridge.wants_tick() {
            bridge.tick();
            settle(&mut bridge);
            seen.push(bridge.web_view().load_progress());
        }

        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last(), Some(&100));
        assert_eq!(bridge.web_view().load_status(), LoadStatus::Succeeded);
    }

    #[test]
    fn uninitialized_bridge_stays_degraded() {
        struct NoFormat;
        impl SceneBuilder for NoFormat {
            fn name(&self) -> &str {
                "no-format"
            }
            fn build(&self, source: &str, events: crate::scene::SceneEventSender) -> anyhow::Result<Scene> {
                let mut scene = HeadlessSceneBuilder::default().build(source, events)?;
                // Swap in a control that refuses to initialize
                struct Broken;
                impl crate::scene::RenderControl for Broken {
                    fn initialize(&mut self) -> anyhow::Result<()> {
                        anyhow::bail!("no device")
                    }
                    fn begin_frame(&mut self) {}
                    fn polish_items(&mut self) {}
                    fn sync(&mut self) -> bool {
                        false
                    }
                    fn render(&mut self) {}
                    fn end_frame(&mut self) {}
                }
                scene.control = Box::new(Broken);
                Ok(scene)
            }
        }

        let ctx: Rc<dyn GpuContext> = Rc::new(HeadlessContext::default());
        let mut bridge = RenderBridge::create(
            BridgeId::from_raw(7).unwrap(),
            ctx,
            &NoFormat,
            "embedded://webview",
            SurfaceSize::new(32, 32),
            None,
        )
        .unwrap();

        assert_eq!(bridge.state(), BridgeState::Uninitialized);
        bridge.request_update(true);
        turn(&mut bridge);
        assert_eq!(bridge.stats().passes, 0);
    }
}
