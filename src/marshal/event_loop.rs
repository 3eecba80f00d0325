use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use std::time::Duration;
use log::{debug, info};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use crate::bridge::{BridgeId, RenderBridge, TextureChanged};
use crate::config::HostConfig;
use crate::errors::{BridgeError, HostError};
use crate::gl::GpuContext;
use crate::marshal::proxy::{LoopMessage, LoopProxy};
use crate::scene::SceneBuilder;
use crate::viewport::SurfaceSize;

/// State owned by the graphics thread: the shared root context and all bridges.
pub struct LoopContext {
    config: HostConfig,
    context: Rc<dyn GpuContext>,
    scenes: Box<dyn SceneBuilder>,
    bridges: BTreeMap<BridgeId, RenderBridge>,
    next_id: BridgeId,
    exit_code: Option<i32>,
}

impl LoopContext {
    pub fn new(config: HostConfig, context: Rc<dyn GpuContext>, scenes: Box<dyn SceneBuilder>) -> Self {
        Self {
            config,
            context,
            scenes,
            bridges: BTreeMap::new(),
            next_id: BridgeId::first(),
            exit_code: None,
        }
    }

    /// Create a bridge sharing the root context, sized to `size`.
    pub fn create_bridge(
        &mut self,
        size: SurfaceSize,
        on_texture_changed: Option<TextureChanged>,
    ) -> Result<BridgeId, BridgeError> {
        let id = self.next_id;
        self.next_id = id.next();

        let bridge = RenderBridge::create(
            id,
            self.context.clone(),
            self.scenes.as_ref(),
            &self.config.scene_source,
            size,
            on_texture_changed,
        )?;

        self.bridges.insert(id, bridge);
        Ok(id)
    }

    /// Destroy a bridge. Its texture callback reports `0` before this returns.
    pub fn destroy_bridge(&mut self, id: BridgeId) -> Result<(), BridgeError> {
        let mut bridge = self.bridges.remove(&id).ok_or(BridgeError::UnknownBridge(id))?;
        bridge.destroy();
        Ok(())
    }

    pub fn bridge_mut(&mut self, id: BridgeId) -> Result<&mut RenderBridge, BridgeError> {
        self.bridges.get_mut(&id).ok_or(BridgeError::UnknownBridge(id))
    }

    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }

    /// Stop the loop after the current message.
    pub fn request_quit(&mut self, code: i32) {
        if self.exit_code.is_none() {
            self.exit_code = Some(code);
        }
    }

    pub fn has_pending_work(&self) -> bool {
        self.bridges.values().any(|b| b.has_pending_work())
    }

    pub fn wants_tick(&self) -> bool {
        self.bridges.values().any(|b| b.wants_tick())
    }

    pub fn tick(&mut self) {
        for bridge in self.bridges.values_mut().filter(|b| b.wants_tick()) {
            bridge.tick();
        }
    }

    /// One cooperative loop turn: timers armed on earlier turns fire, then scene
    /// notifications are dispatched (possibly arming timers for the next turn).
    pub fn turn(&mut self) {
        for bridge in self.bridges.values_mut() {
            bridge.fire_timer();
            bridge.pump_events();
        }
    }

    /// Destroy every remaining bridge.
    pub fn shutdown(&mut self) {
        let bridges = std::mem::take(&mut self.bridges);
        if !bridges.is_empty() {
            info!("Destroying {} bridge(s) left at shutdown", bridges.len());
        }
        drop(bridges);
    }

    fn tick_interval(&self) -> Duration {
        self.config.tick_interval.max(Duration::from_millis(1))
    }
}

/// Single-threaded event loop of the graphics thread.
pub struct EventLoop {
    rx: mpsc::UnboundedReceiver<LoopMessage>,
    loop_thread: Arc<OnceLock<ThreadId>>,
}

impl EventLoop {
    /// Create a loop and the first proxy submitting to it.
    pub fn new() -> (Self, LoopProxy) {
        let (tx, rx) = mpsc::unbounded_channel();
        let loop_thread = Arc::new(OnceLock::new());

        let proxy = LoopProxy::new(tx, loop_thread.clone());
        (Self { rx, loop_thread }, proxy)
    }

    /// Run on the calling thread until quit, on a current-thread runtime.
    pub fn run_blocking(self, ctx: &mut LoopContext) -> Result<i32, HostError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| HostError::Runtime(e.to_string()))?;

        Ok(runtime.block_on(self.run(ctx)))
    }

    /// Run the loop until a quit request or until every proxy is dropped. Returns the
    /// exit code.
    pub async fn run(mut self, ctx: &mut LoopContext) -> i32 {
        let _ = self.loop_thread.set(thread::current().id());
        debug!("Graphics event loop started");

        let mut ticker = tokio::time::interval(ctx.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let code = loop {
            tokio::select! {
                biased;

                msg = self.rx.recv() => match msg {
                    Some(LoopMessage::Invoke(call)) => call(ctx),
                    Some(LoopMessage::Quit(code)) => ctx.request_quit(code),
                    None => ctx.request_quit(0),
                },
                _ = ticker.tick(), if ctx.wants_tick() => ctx.tick(),
                _ = tokio::task::yield_now(), if ctx.has_pending_work() => {}
            }

            if let Some(code) = ctx.exit_code.take() {
                break code;
            }

            ctx.turn();
        };

        // Refuse new calls; queued ones are dropped so their callers stop waiting
        self.rx.close();
        while self.rx.try_recv().is_ok() {}

        debug!("Graphics event loop exited with {code}");
        code
    }
}
