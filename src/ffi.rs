//! C boundary.
//!
//! The captured context and the running loop's proxy are process globals here and
//! nowhere else. Every per-view call blocks the calling thread until the graphics
//! thread has run it.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use lazy_static::lazy_static;
use log::{error, info, trace, warn};
use crate::bridge::{BridgeId, RenderBridge, TextureChanged};
use crate::config::HostConfig;
use crate::errors::{BridgeError, HostError, MarshalError};
use crate::gl::{discover_and_capture_external_context, GraphicsBootstrap, TextureId};
use crate::host;
use crate::marshal::LoopProxy;
use crate::scene::headless::HeadlessSceneBuilder;
use crate::viewport::SurfaceSize;

lazy_static! {
    static ref CAPTURED: Mutex<Option<GraphicsBootstrap>> = Mutex::new(None);
    static ref ACTIVE_LOOP: Mutex<Option<LoopProxy>> = Mutex::new(None);
}

static HOST_RUNNING: AtomicBool = AtomicBool::new(false);

/// Opaque per-view handle. `0` is the null handle.
///
/// Crosses the C boundary as a `uint64_t` on every target, not as a pointer; C hosts
/// declare it as `typedef uint64_t webview_handle;`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebViewHandle(u64);

impl WebViewHandle {
    pub const NULL: WebViewHandle = WebViewHandle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    fn bridge_id(&self) -> Option<BridgeId> {
        BridgeId::from_raw(self.0)
    }
}

impl From<BridgeId> for WebViewHandle {
    fn from(id: BridgeId) -> Self {
        WebViewHandle(id.as_raw())
    }
}

/// Texture change callback, `void (*)(uint64_t handle, uint32_t texture)` in C.
/// Receives `0` when the view's texture goes away.
pub type TextureChangedFn = extern "C" fn(WebViewHandle, TextureId);

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn active_loop() -> Option<LoopProxy> {
    lock(&ACTIVE_LOOP).clone()
}

/// Capture the GPU context current on the calling thread. Returns 0 on success.
#[no_mangle]
pub extern "C" fn load_gl_context() -> c_int {
    let format = HostConfig::default().surface_format;

    match discover_and_capture_external_context(&format) {
        Ok(bootstrap) => {
            info!("Captured host context: {bootstrap:?}");
            *lock(&CAPTURED) = Some(bootstrap);
            0
        }
        Err(e) => {
            error!("Unable to capture host context: {e}");
            *lock(&CAPTURED) = None;
            e.code()
        }
    }
}

/// Run the graphics event loop on the calling thread until [`host_quit`].
///
/// Recognised arguments: `--scene=<source>`, `--log=<filter>`, `--tick-ms=<ms>`.
///
/// # Safety
///
/// `argv` must point to `argc` valid NUL-terminated strings, or be null when `argc` is 0.
#[no_mangle]
pub unsafe extern "C" fn host_run(argc: c_int, argv: *const *const c_char) -> c_int {
    let args = collect_args(argc, argv);
    let (config, rejected) = parse_args(&args);

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter.as_str()))
        .try_init();
    for arg in rejected {
        warn!("Ignoring argument {arg}");
    }

    match run_host(config) {
        Ok(code) => code,
        Err(e) => {
            error!("host_run failed: {e}");
            e.code()
        }
    }
}

/// Ask the running event loop to stop. No-op when none is running.
#[no_mangle]
pub extern "C" fn host_quit() {
    match active_loop() {
        Some(proxy) => proxy.quit(0),
        None => trace!("host_quit: no event loop running"),
    }
}

/// Create a web view rendering into a shared texture of `width` x `height`.
///
/// Returns the null handle on failure.
#[no_mangle]
pub extern "C" fn webview_create(width: i32, height: i32, callback: Option<TextureChangedFn>) -> WebViewHandle {
    let Some(size) = SurfaceSize::from_signed(width, height) else {
        error!("webview_create: invalid size {width}x{height}");
        return WebViewHandle::NULL;
    };
    let Some(proxy) = active_loop() else {
        error!("webview_create: no event loop running");
        return WebViewHandle::NULL;
    };

    let on_texture_changed =
        callback.map(|cb| Box::new(move |id: BridgeId, texture: TextureId| cb(id.into(), texture)) as TextureChanged);

    match proxy.invoke_with_result(move |ctx| ctx.create_bridge(size, on_texture_changed)) {
        Ok(Ok(id)) => id.into(),
        Ok(Err(e)) => {
            error!("webview_create: {e}");
            WebViewHandle::NULL
        }
        Err(e) => {
            error!("webview_create: {e}");
            WebViewHandle::NULL
        }
    }
}

/// Destroy a web view. Its callback reports texture `0` before this returns.
#[no_mangle]
pub extern "C" fn webview_destroy(handle: WebViewHandle) {
    let Some(id) = handle.bridge_id() else {
        return;
    };

    on_graphics_thread("webview_destroy", move |proxy| {
        proxy.invoke_with_result(move |ctx| ctx.destroy_bridge(id))
    });
}

/// Navigate a web view to `url`.
///
/// # Safety
///
/// `url` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn webview_set_url(handle: WebViewHandle, url: *const c_char) {
    if url.is_null() {
        warn!("webview_set_url: null url");
        return;
    }
    let url = match CStr::from_ptr(url).to_str() {
        Ok(url) => url.to_string(),
        Err(e) => {
            warn!("webview_set_url: url is not UTF-8: {e}");
            return;
        }
    };

    with_bridge(handle, "webview_set_url", move |bridge| bridge.navigate(&url));
}

/// Resize a web view. The new texture is reported and rendered before this returns.
#[no_mangle]
pub extern "C" fn webview_set_size(handle: WebViewHandle, width: i32, height: i32) {
    let Some(size) = SurfaceSize::from_signed(width, height) else {
        error!("webview_set_size: invalid size {width}x{height}");
        return;
    };

    with_bridge(handle, "webview_set_size", move |bridge| {
        bridge.resize(size);
        Ok(())
    });
}

fn run_host(config: HostConfig) -> Result<i32, HostError> {
    if HOST_RUNNING.swap(true, Ordering::AcqRel) {
        return Err(HostError::AlreadyRunning);
    }

    let captured = lock(&CAPTURED).take();
    let result = match captured {
        Some(bootstrap) => {
            let scenes = Box::new(HeadlessSceneBuilder::new(config.headless_load_step));
            host::run(bootstrap, config, scenes, |proxy| {
                *lock(&ACTIVE_LOOP) = Some(proxy);
            })
        }
        None => Err(HostError::NotLoaded),
    };

    *lock(&ACTIVE_LOOP) = None;
    HOST_RUNNING.store(false, Ordering::Release);
    result
}

fn with_bridge<F>(handle: WebViewHandle, op: &'static str, f: F)
where
    F: FnOnce(&mut RenderBridge) -> Result<(), BridgeError> + Send + 'static,
{
    let Some(id) = handle.bridge_id() else {
        warn!("{op}: null handle");
        return;
    };

    on_graphics_thread(op, move |proxy| {
        proxy.invoke_with_result(move |ctx| ctx.bridge_mut(id).and_then(f))
    });
}

fn on_graphics_thread<F>(op: &'static str, call: F)
where
    F: FnOnce(&LoopProxy) -> Result<Result<(), BridgeError>, MarshalError>,
{
    let Some(proxy) = active_loop() else {
        warn!("{op}: no event loop running");
        return;
    };

    match call(&proxy) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("{op}: {e}"),
        Err(e) => warn!("{op}: {e}"),
    }
}

unsafe fn collect_args(argc: c_int, argv: *const *const c_char) -> Vec<String> {
    if argv.is_null() || argc <= 0 {
        return Vec::new();
    }

    (0..argc as usize)
        .filter_map(|i| {
            let arg = *argv.add(i);
            (!arg.is_null()).then(|| CStr::from_ptr(arg).to_string_lossy().into_owned())
        })
        .collect()
}

/// Returns the configuration and the arguments that were not understood.
fn parse_args(args: &[String]) -> (HostConfig, Vec<String>) {
    let mut config = HostConfig::default();
    let mut rejected = Vec::new();

    // First argument is the program name
    for arg in args.iter().skip(1) {
        if let Some(scene) = arg.strip_prefix("--scene=") {
            config.scene_source = scene.to_string();
        } else if let Some(filter) = arg.strip_prefix("--log=") {
            config.log_filter = filter.to_string();
        } else if let Some(ms) = arg.strip_prefix("--tick-ms=") {
            match ms.parse::<u64>() {
                Ok(ms) if ms > 0 => config.tick_interval = Duration::from_millis(ms),
                _ => rejected.push(arg.clone()),
            }
        } else {
            rejected.push(arg.clone());
        }
    }

    (config, rejected)
}
