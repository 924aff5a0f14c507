//! One controller per mounted canvas.
//!
//! [`CanvasController`] owns the engine, its clock and the pending frame
//! handle. The host forwards four kinds of events to it: frame callbacks,
//! resizes, pointer moves, and unmount. All mutation happens inside those
//! calls, so a single-threaded host needs no locking; a multi-threaded host
//! wraps the controller in one lock ([`SharedController`]).

use std::sync::{Arc, Mutex};

use glam::DVec2;
use tracing::debug;

use crate::clock::AnimationClock;
use crate::draw::DrawList;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::scheduler::{FrameHandle, FrameScheduler};

/// Controller behind a single lock, for hosts that deliver events from
/// several threads.
pub type SharedController<E, S> = Arc<Mutex<CanvasController<E, S>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    Disposed,
}

/// Drives one [`Engine`] from host frame callbacks.
pub struct CanvasController<E, S> {
    engine: E,
    scheduler: S,
    clock: AnimationClock,
    pending: Option<FrameHandle>,
    pointer: Option<DVec2>,
    lifecycle: Lifecycle,
}

impl<E: Engine, S: FrameScheduler> CanvasController<E, S> {
    pub fn new(engine: E, scheduler: S) -> Self {
        Self {
            engine,
            scheduler,
            clock: AnimationClock::new(),
            pending: None,
            pointer: None,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Wraps the controller for multi-threaded hosts.
    pub fn into_shared(self) -> SharedController<E, S> {
        Arc::new(Mutex::new(self))
    }

    /// Sizes the engine and requests the first frame.
    ///
    /// Mounting a disposed controller does nothing.
    pub fn mount(&mut self, width: f64, height: f64) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        self.engine.resize(width, height);
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
        self.lifecycle = Lifecycle::Mounted;
        debug!(width, height, "canvas mounted");
    }

    /// Handles a frame callback.
    ///
    /// The next frame is requested before the engine runs, mirroring the
    /// browser loop. Stale handles and callbacks after `dispose` are ignored.
    /// Returns `true` if the engine advanced.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) -> Result<bool, EngineError> {
        if self.lifecycle != Lifecycle::Mounted || self.pending != Some(handle) {
            return Ok(false);
        }
        self.pending = Some(self.scheduler.request_frame());

        let Some(delta) = self.clock.tick(timestamp_ms) else {
            return Ok(false);
        };
        if !self.engine.is_ready() {
            return Ok(false);
        }
        self.engine.set_pointer(self.pointer);
        self.engine.advance(delta.seconds)?;
        Ok(true)
    }

    pub fn on_resize(&mut self, width: f64, height: f64) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        debug!(width, height, "canvas resized");
        self.engine.resize(width, height);
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.pointer = Some(DVec2::new(x, y));
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer = None;
    }

    /// Cancels the pending frame and disposes the engine.
    ///
    /// Idempotent: later calls, frames, and resizes are no-ops.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        self.engine.dispose();
        self.lifecycle = Lifecycle::Disposed;
        debug!("canvas disposed");
    }

    /// Whether a frame callback is currently requested.
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    /// The handle the next `on_frame` must carry.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Appends the engine's current frame to `list`.
    pub fn draw(&self, list: &mut DrawList) {
        self.engine.draw(list);
    }

    /// Releases the engine without disposing it, for offline rendering.
    pub fn into_engine(self) -> E {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MAX_FRAME_DT;
    use crate::scheduler::ManualScheduler;
    use serde_json::{json, Value};

    #[derive(Default)]
    struct Recorder {
        steps: Vec<f64>,
        pointers: Vec<Option<DVec2>>,
        size: (f64, f64),
        disposals: u32,
    }

    impl Engine for Recorder {
        fn advance(&mut self, dt_seconds: f64) -> Result<(), EngineError> {
            self.steps.push(dt_seconds);
            Ok(())
        }

        fn resize(&mut self, width: f64, height: f64) {
            self.size = (width, height);
        }

        fn set_pointer(&mut self, pointer: Option<DVec2>) {
            self.pointers.push(pointer);
        }

        fn draw(&self, _list: &mut DrawList) {}

        fn params(&self) -> Value {
            json!({})
        }

        fn param_schema(&self) -> Value {
            json!({})
        }

        fn dispose(&mut self) {
            self.disposals += 1;
        }
    }

    fn controller() -> CanvasController<Recorder, ManualScheduler> {
        CanvasController::new(Recorder::default(), ManualScheduler::new())
    }

    /// Fires every pending frame at `timestamp_ms`.
    fn pump(c: &mut CanvasController<Recorder, ManualScheduler>, timestamp_ms: f64) {
        for handle in c.scheduler_mut().fire() {
            c.on_frame(handle, timestamp_ms).unwrap();
        }
    }

    #[test]
    fn mount_sizes_engine_and_schedules() {
        let mut c = controller();
        assert!(!c.is_scheduled());
        c.mount(800.0, 600.0);
        assert!(c.is_scheduled());
        assert_eq!(c.engine().size, (800.0, 600.0));
        assert_eq!(c.scheduler().pending().len(), 1);
    }

    #[test]
    fn first_frame_primes_then_steps_follow() {
        let mut c = controller();
        c.mount(100.0, 100.0);
        pump(&mut c, 0.0);
        assert!(c.engine().steps.is_empty());
        pump(&mut c, 16.0);
        pump(&mut c, 32.0);
        assert_eq!(c.engine().steps.len(), 2);
        assert!(c.is_scheduled());
    }

    #[test]
    fn long_gap_reaches_engine_clamped() {
        let mut c = controller();
        c.mount(100.0, 100.0);
        pump(&mut c, 0.0);
        pump(&mut c, 10_000.0);
        assert_eq!(c.engine().steps, vec![MAX_FRAME_DT]);
    }

    #[test]
    fn pointer_is_delivered_on_next_frame() {
        let mut c = controller();
        c.mount(100.0, 100.0);
        pump(&mut c, 0.0);
        c.on_pointer_move(10.0, 20.0);
        pump(&mut c, 16.0);
        c.on_pointer_leave();
        pump(&mut c, 32.0);
        assert_eq!(
            c.engine().pointers,
            vec![Some(DVec2::new(10.0, 20.0)), None]
        );
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut c = controller();
        c.mount(100.0, 100.0);
        let stepped = c.on_frame(FrameHandle(12345), 0.0).unwrap();
        assert!(!stepped);
        assert_eq!(c.scheduler().pending().len(), 1);
    }

    #[test]
    fn dispose_cancels_pending_frame_and_is_idempotent() {
        let mut c = controller();
        c.mount(100.0, 100.0);
        pump(&mut c, 0.0);
        c.dispose();
        c.dispose();
        assert!(!c.is_scheduled());
        assert!(c.is_disposed());
        assert!(c.scheduler().pending().is_empty());
        assert_eq!(c.scheduler().cancelled(), 1);
        assert_eq!(c.engine().disposals, 1);
    }

    #[test]
    fn nothing_runs_after_dispose() {
        let mut c = controller();
        c.mount(100.0, 100.0);
        let handle = c.pending_frame().unwrap();
        c.dispose();
        assert!(!c.on_frame(handle, 16.0).unwrap());
        c.on_resize(5.0, 5.0);
        c.mount(5.0, 5.0);
        assert_eq!(c.engine().size, (100.0, 100.0));
        assert!(!c.is_scheduled());
    }

    #[test]
    fn shared_controller_can_cross_threads() {
        let shared = controller().into_shared();
        let worker = Arc::clone(&shared);
        std::thread::spawn(move || {
            let mut c = worker.lock().unwrap();
            c.mount(64.0, 64.0);
        })
        .join()
        .unwrap();
        assert!(shared.lock().unwrap().is_scheduled());
    }
}
