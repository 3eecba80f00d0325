//! Lifetime of the graphics thread.
//!
//! [`run`] turns a captured [`GraphicsBootstrap`] into the root context, runs the event
//! loop on the calling thread until it is asked to quit, then tears every bridge down
//! before the root context goes away.

use log::{error, info};
use crate::config::HostConfig;
use crate::errors::HostError;
use crate::gl::GraphicsBootstrap;
use crate::marshal::{EventLoop, LoopContext, LoopProxy};
use crate::scene::SceneBuilder;

/// Run the graphics host on the calling thread, which becomes the graphics thread.
///
/// `on_started` receives the proxy once the root context is adopted and before the
/// loop starts. Calls made through it block until the loop picks them up. Returns the
/// loop's exit code.
pub fn run<F>(
    bootstrap: GraphicsBootstrap,
    config: HostConfig,
    scenes: Box<dyn SceneBuilder>,
    on_started: F,
) -> Result<i32, HostError>
where
    F: FnOnce(LoopProxy),
{
    info!("Starting graphics host with {bootstrap:?}, {} scenes", scenes.name());

    let context = bootstrap.adopt(&config.surface_format).inspect_err(|e| {
        error!("Unable to adopt captured context: {e}");
    })?;

    let (event_loop, proxy) = EventLoop::new();
    let mut ctx = LoopContext::new(config, context, scenes);

    on_started(proxy);
    let result = event_loop.run_blocking(&mut ctx);

    // Bridges release their textures while the root context still exists
    ctx.shutdown();
    drop(ctx);

    match &result {
        Ok(code) => info!("Graphics host stopped with exit code {code}"),
        Err(e) => error!("Graphics host failed: {e}"),
    }
    result
}
