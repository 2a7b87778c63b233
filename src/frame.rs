use crate::panel::Panel;
use crate::render::{self, PendingTextures};
use instant::Instant;
use portal_core::{
    FrameStats, LoopState, LoopTask, OrbitControls, PerspectiveCamera, PortalScene, RenderLoop,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub struct FrameContext<'a> {
    pub scene: Rc<RefCell<PortalScene>>,
    pub camera: Rc<RefCell<PerspectiveCamera>>,
    pub controls: Rc<RefCell<OrbitControls>>,
    pub render_loop: RenderLoop,
    pub stats: FrameStats,
    pub panel: Rc<RefCell<Option<Panel>>>,

    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,
    pub textures: Rc<RefCell<PendingTextures>>,

    pub started: Instant,
}

impl<'a> FrameContext<'a> {
    /// One loop iteration. Returns false once the loop has been stopped.
    pub fn frame(&mut self) -> bool {
        self.stats.begin(instant::now());
        let elapsed = self.started.elapsed().as_secs_f32();

        let state = self.render_loop.tick(
            elapsed,
            &mut self.scene.borrow_mut(),
            &mut self.controls.borrow_mut(),
            &mut self.camera.borrow_mut(),
        );
        if state == LoopState::Stopped {
            return false;
        }

        if let Some(g) = &mut self.gpu {
            g.upload_textures(&mut self.textures.borrow_mut());
            g.resize_if_needed(self.canvas.width(), self.canvas.height());
            match g.render(&self.scene.borrow(), &self.camera.borrow()) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => g.reconfigure(),
                Err(e) => log::warn!("[frame] surface error: {:?}", e),
            }
        }

        if self.stats.end(instant::now()).is_some() {
            if let Some(panel) = self.panel.borrow().as_ref() {
                panel.draw_stats(&self.stats);
            }
        }
        true
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    pixel_ratio: f32,
) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas, pixel_ratio).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

/// Drive `frame_ctx` from requestAnimationFrame until the loop stops. The
/// context is dropped on the frame that sees the stop, and the closure's
/// reference to itself is released right after it returns.
pub fn start_loop(frame_ctx: FrameContext<'static>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let mut task = LoopTask::new(frame_ctx);
    let mut this = Some(tick.clone());
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let running = task.step(|ctx| {
            let running = ctx.frame();
            if !running {
                log::info!("[frame] loop stopped after {} frames", ctx.render_loop.frames());
            }
            running
        });
        if running {
            if let Some(this) = &this {
                request_frame(this);
            }
            return;
        }
        // a closure cannot be dropped while it runs
        if let Some(this) = this.take() {
            spawn_local(async move { drop(this) });
        }
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
