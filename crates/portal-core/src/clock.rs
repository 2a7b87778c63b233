//! Frame timing and render-loop control.
//!
//! The loop itself is driven from outside (requestAnimationFrame on the web,
//! synthetic time in tests); `RenderLoop::tick` does the per-frame scene work
//! and reports whether another frame should be scheduled.

use crate::bindings::PortalScene;
use crate::camera::PerspectiveCamera;
use crate::orbit::OrbitControls;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the loop started.
    pub elapsed: f32,
    /// Seconds since the previous frame, never negative.
    pub delta: f32,
    pub frame: u64,
}

#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    last_elapsed: f32,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, elapsed: f32) -> FrameTime {
        let delta = (elapsed - self.last_elapsed).max(0.0);
        self.last_elapsed = elapsed;
        self.frame += 1;
        FrameTime {
            elapsed,
            delta,
            frame: self.frame,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }
}

/// Shared stop signal. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct LoopControl {
    stopped: Rc<Cell<bool>>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoopState {
    Continue(FrameTime),
    Stopped,
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    clock: FrameClock,
    control: LoopControl,
}

impl RenderLoop {
    pub fn new(control: LoopControl) -> Self {
        Self {
            clock: FrameClock::new(),
            control,
        }
    }

    pub fn control(&self) -> LoopControl {
        self.control.clone()
    }

    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    /// One iteration: advance time, animate the scene, step the controls.
    /// Does nothing once stopped.
    pub fn tick(
        &mut self,
        elapsed: f32,
        scene: &mut PortalScene,
        controls: &mut OrbitControls,
        camera: &mut PerspectiveCamera,
    ) -> LoopState {
        if self.control.is_stopped() {
            return LoopState::Stopped;
        }
        let time = self.clock.advance(elapsed);
        scene.advance(time);
        controls.update(camera);
        LoopState::Continue(time)
    }
}

/// State owned by a self-scheduling frame callback. It is dropped as soon as
/// a step reports the loop finished, so a callback that outlives its loop
/// holds nothing.
#[derive(Debug)]
pub struct LoopTask<T> {
    state: Option<T>,
}

impl<T> LoopTask<T> {
    pub fn new(state: T) -> Self {
        Self { state: Some(state) }
    }

    /// Run `step` on the state. Returns whether another frame should be
    /// scheduled; `false` from `step` drops the state for good.
    pub fn step(&mut self, step: impl FnOnce(&mut T) -> bool) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if step(state) {
            return true;
        }
        self.state = None;
        false
    }
}
