//! Blobwave - play an audio file while a noise-deformed sphere
//! swells and spikes with its spectrum.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use blobwave::audio::CpalContext;
use blobwave::blob::BlobSystem;
use blobwave::camera::CameraSystem;
use blobwave::cli::Args;
use blobwave::config::Settings;
use blobwave::player::Player;
use blobwave::rendering::{RenderSystem, Uniforms};
use blobwave::ui::{self, Command};

/// Main application state
struct App {
    settings: Settings,

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    camera: CameraSystem,

    // Audio, transport, and blob; created with the window
    player: Option<Player<CpalContext>>,

    pending_input: Option<PathBuf>,
    autoplay: bool,
    title: String,

    // Time tracking
    start_time: Instant,
}

impl App {
    fn new(settings: Settings, args: &Args) -> Self {
        let camera = CameraSystem::new(&settings.render);

        Self {
            settings,
            window: None,
            render_system: None,
            camera,
            player: None,
            pending_input: args.input.clone(),
            autoplay: args.autoplay,
            title: String::new(),
            start_time: Instant::now(),
        }
    }

    fn is_running(&self) -> bool {
        self.player.as_ref().is_some_and(|p| p.is_running())
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(player) = self.player.as_mut() else {
            return;
        };

        // Get current time
        let now = self.start_time.elapsed().as_secs_f64();

        let Some(frame) = player.frame(now) else {
            return;
        };

        let title = player.title();
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }

        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        let blob = player.blob();
        let view_proj = self
            .camera
            .view_proj(&self.settings.render, render_system.aspect_ratio());
        let uniforms = Uniforms::new(
            view_proj,
            &blob.shading,
            frame.deformation.elapsed_s,
            frame.deformation.intensity,
        );

        render_system.update_vertices(&blob.mesh.vertices);
        render_system.update_uniforms(&uniforms);

        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_system.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                self.shutdown();
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    /// Stop audio and release the GPU before the event loop goes away
    fn shutdown(&mut self) {
        if let Some(player) = self.player.as_mut() {
            // Dropping the context closes the output stream
            drop(player.shutdown());
        }
        self.render_system = None;
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.is_running() {
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.player.is_some() {
            return; // Already initialized
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title("blobwave")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.render.window_width,
                self.settings.render.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let blob = BlobSystem::new(
            &self.settings.sphere,
            self.settings.deform.clone(),
            self.settings.signal.clone(),
            &self.settings.shading,
            self.start_time.elapsed().as_secs_f64(),
        );

        // Initialize rendering system
        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &blob.mesh,
            self.settings.render.clear_color,
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        // Initialize audio system; visuals still run without it
        let audio = match CpalContext::new(
            self.settings.analyser.clone(),
            self.settings.output.clone(),
        ) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::error!("Audio unavailable: {}", e);
                None
            }
        };

        let mut player = Player::new(audio, blob, self.autoplay);
        if let Some(path) = self.pending_input.take() {
            player.request_load(&path);
        }

        log::info!("blobwave is running (Space: play/pause, 0-9/arrows: seek, Esc: quit)");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.player = Some(player);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat,
                        ..
                    },
                ..
            } => {
                let Some(command) = ui::command_for_key(code) else {
                    return;
                };
                // Holding a key only repeats relative seeks
                if repeat && !matches!(command, Command::SeekBy(_)) {
                    return;
                }
                if let Some(player) = self.player.as_mut() {
                    if !player.handle_command(command) {
                        self.shutdown();
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::DroppedFile(path) => {
                if let Some(player) = self.player.as_mut() {
                    player.request_load(&path);
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let settings = Settings::resolve(&args).context("Failed to load configuration")?;
    settings
        .analyser
        .validate()
        .context("Invalid analyser settings")?;

    let mut app = App::new(settings, &args);
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop
        .run_app(&mut app)
        .context("Event loop terminated with an error")?;
    Ok(())
}
