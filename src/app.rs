use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::color::Color;
use crate::gpu::GpuContext;
use crate::scene::Scene;

/// Context provided during app setup.
///
/// Geometry and materials are created through `gpu`; meshes built from them
/// go into `scene`.
pub struct SetupContext<'a> {
    pub gpu: &'a mut GpuContext,
    pub scene: &'a mut Scene,
    pub camera: &'a mut Camera,
}

impl SetupContext<'_> {
    /// Current aspect ratio of the window surface.
    pub fn aspect(&self) -> f32 {
        self.gpu.aspect()
    }
}

/// Context provided each frame, before the scene is rendered.
pub struct Frame<'a> {
    /// GPU context, for uniform updates such as material colors.
    pub gpu: &'a mut GpuContext,
    /// The scene that is drawn once this frame function returns.
    pub scene: &'a mut Scene,
    /// Camera used to draw the scene.
    pub camera: &'a mut Camera,
    /// Total elapsed time in seconds.
    pub time: f32,
    /// Delta time since last frame in seconds.
    pub dt: f32,
    /// Timestamp of this frame, for driving an [`Animator`](crate::Animator).
    pub now: Instant,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

impl Frame<'_> {
    /// Current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Configuration for the app window.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Background color each frame is cleared to.
    pub clear_color: Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Trigon".to_string(),
            width: 800,
            height: 600,
            clear_color: Color::rgb(0.05, 0.05, 0.08),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }
}

/// Run an application with setup and frame closures.
///
/// # Example
/// ```ignore
/// trigon::run(|ctx| {
///     let geometry = Rc::new(Geometry::new(ctx.gpu, primitives::cube(1.0))?);
///     let material = Rc::new(Material::basic(ctx.gpu)?);
///     let cube = ctx.scene.add(Mesh::new(geometry, material));
///
///     move |frame| {
///         frame.scene.get_mut(cube).unwrap().rotate_y(frame.dt);
///     }
/// })?;
/// ```
pub fn run<S, F>(setup: S) -> Result<(), EventLoopError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    run_with_config(AppConfig::default(), setup)
}

/// Run an application with custom configuration.
///
/// # Example
/// ```ignore
/// trigon::run_with_config(
///     AppConfig::new().title("Shapes").size(1280, 720).clear_color(Color::BLACK),
///     |ctx| {
///         ctx.camera.set_perspective(1.0, ctx.aspect(), 0.1, 100.0);
///         move |frame| {}
///     },
/// )?;
/// ```
pub fn run_with_config<S, F>(config: AppConfig, setup: S) -> Result<(), EventLoopError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TrigonApp::Pending {
        config,
        setup: Some(Box::new(move |ctx| {
            Box::new(setup(ctx)) as Box<dyn FnMut(&mut Frame)>
        })),
    };

    event_loop.run_app(&mut app)
}

type SetupFn = Box<dyn FnOnce(&mut SetupContext) -> Box<dyn FnMut(&mut Frame)>>;

enum TrigonApp {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        scene: Scene,
        camera: Camera,
        clear_color: Color,
        frame_fn: Box<dyn FnMut(&mut Frame)>,
        start_time: Instant,
        last_frame: Instant,
    },
}

impl ApplicationHandler for TrigonApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let TrigonApp::Pending { config, setup } = self else {
            return;
        };
        let Some(setup_fn) = setup.take() else {
            return;
        };

        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let mut gpu = GpuContext::new(window.clone());
        let mut scene = Scene::new();
        let mut camera = Camera::new();

        let frame_fn = setup_fn(&mut SetupContext {
            gpu: &mut gpu,
            scene: &mut scene,
            camera: &mut camera,
        });
        log::info!("setup complete with {} meshes", scene.len());

        window.request_redraw();
        *self = TrigonApp::Running {
            window,
            gpu,
            scene,
            camera,
            clear_color: config.clear_color,
            frame_fn,
            start_time: Instant::now(),
            last_frame: Instant::now(),
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let TrigonApp::Running {
            window,
            gpu,
            scene,
            camera,
            clear_color,
            frame_fn,
            start_time,
            last_frame,
        } = self
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let time = now.duration_since(*start_time).as_secs_f32();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                let (width, height) = (gpu.width(), gpu.height());
                frame_fn(&mut Frame {
                    gpu,
                    scene,
                    camera,
                    time,
                    dt,
                    now,
                    width,
                    height,
                });

                if let Err(err) = scene.render(gpu, camera) {
                    log::error!("scene render failed: {err}");
                }

                match gpu.present(*clear_color) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("surface out of memory, exiting");
                        event_loop.exit();
                        return;
                    }
                    Err(err) => log::warn!("dropped frame: {err}"),
                }

                window.request_redraw();
            }
            _ => {}
        }
    }
}
