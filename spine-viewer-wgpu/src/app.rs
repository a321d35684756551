use crate::platform::DesktopPlatform;
use crate::textures::GpuTextures;
use spine_viewer::{Config, DirStorage, Gesture, GestureDetector, Viewport, ViewerSession};
use spine2d::DrawList;
use spine2d_wgpu::SpineRenderer;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowId};

const WINDOW_TITLE: &str = "Spine Viewer";
/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

pub type Session = ViewerSession<DesktopPlatform, DirStorage>;

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: SpineRenderer,
    textures: GpuTextures,
}

impl Gpu {
    fn new(window: Arc<Window>) -> Result<Self, String> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| format!("create_surface: {e}"))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            compatible_surface: Some(&surface),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
        }))
        .map_err(|e| format!("request_adapter: {e}"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("spine-viewer device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: Default::default(),
        }))
        .map_err(|e| format!("request_device: {e}"))?;

        let size = window.inner_size().max(PhysicalSize::new(1, 1));
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| "surface has no formats".to_string())?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = SpineRenderer::new(&device, config.format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            textures: GpuTextures::default(),
        })
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.config.width as f32, self.config.height as f32)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }
}

/// Desktop shell around a [`ViewerSession`]: window, GPU, input and the frame loop.
pub struct ViewerApp {
    clear_color: wgpu::Color,
    session: Session,
    gestures: GestureDetector,
    gpu: Option<Gpu>,
    draw_list: DrawList,
    started: Instant,
    last_frame: Option<Instant>,
    cursor: (f32, f32),
}

impl ViewerApp {
    pub fn new(config: &Config, platform: DesktopPlatform, storage: DirStorage) -> Self {
        let [r, g, b, a] = config.clear_color;
        Self {
            clear_color: wgpu::Color { r, g, b, a },
            session: ViewerSession::new(platform, storage, config),
            gestures: GestureDetector::new(config.gesture_settings()),
            gpu: None,
            draw_list: DrawList::default(),
            started: Instant::now(),
            last_frame: None,
            cursor: (0.0, 0.0),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn resume_session(&mut self) {
        match self.session.resume() {
            Ok(outcome) => {
                if outcome.skeleton_changed || outcome.background_changed {
                    log::debug!("session resumed: {outcome:?}");
                }
            }
            Err(e) => log::error!("failed to load imported files: {e}"),
        }
    }

    fn dispatch(&mut self, gesture: Option<Gesture>) {
        let Some(gesture) = gesture else {
            return;
        };
        let handled = self.session.handle_gesture(gesture);
        log::trace!("{gesture:?} handled={handled}");
        // A tap may have run an import; pick up whatever it changed.
        if matches!(gesture, Gesture::Tap { .. }) {
            self.resume_session();
        }
    }

    fn render(&mut self) {
        let now = Instant::now();
        let delta = self
            .last_frame
            .map(|t| now.duration_since(t).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.session.update(delta);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let viewport = gpu.viewport();
        gpu.textures
            .sync(&gpu.device, &gpu.queue, &gpu.renderer, &self.session);
        self.session.compose_frame(viewport, &mut self.draw_list);
        let textures = &gpu.textures;
        self.draw_list
            .draws
            .retain(|d| textures.contains(&d.texture_path));
        gpu.renderer
            .update_globals_matrix(&gpu.queue, self.session.clip_from_world(viewport));
        gpu.renderer.upload(&gpu.device, &gpu.queue, &self.draw_list);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("spine-viewer encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("spine-viewer pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            gpu.renderer
                .render(&mut pass, &self.draw_list, &gpu.textures.provider);
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_none() {
            let window = match event_loop
                .create_window(Window::default_attributes().with_title(WINDOW_TITLE))
            {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    log::error!("failed to create window: {e}");
                    event_loop.exit();
                    return;
                }
            };
            match Gpu::new(window) {
                Ok(gpu) => {
                    gpu.window.request_redraw();
                    self.gpu = Some(gpu);
                }
                Err(e) => {
                    log::error!("failed to initialise wgpu: {e}");
                    event_loop.exit();
                    return;
                }
            }
        }
        event_loop.set_control_flow(ControlFlow::Poll);
        self.resume_session();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let now = self.now();
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size);
                    gpu.window.request_redraw();
                }
            }
            WindowEvent::Focused(true) => self.resume_session(),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                let (x, y) = self.cursor;
                let gesture = self.gestures.touch_dragged(x, y, now);
                self.dispatch(gesture);
            }
            WindowEvent::CursorLeft { .. } => self.gestures.cancel(),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.cursor;
                match state {
                    ElementState::Pressed => self.gestures.touch_down(x, y, now),
                    ElementState::Released => {
                        let gesture = self.gestures.touch_up(x, y, now);
                        self.dispatch(gesture);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                let gesture = self.gestures.scrolled(lines, now);
                self.dispatch(gesture);
            }
            WindowEvent::RedrawRequested => self.render(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let now = self.now();
        for gesture in self.gestures.update(now) {
            self.dispatch(Some(gesture));
        }
        if let Some(gpu) = self.gpu.as_ref() {
            gpu.window.request_redraw();
        }
    }
}
