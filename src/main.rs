//! Videomap viewer: shows a frame through the video texture material.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use videomap::config::{Config, ConfigOverrides};
use videomap::config_watcher::ConfigWatcher;
use videomap::frame::VideoFrame;
use videomap::output::WindowRenderer;
use videomap::texture::VideoTexture;
use videomap::{MaterialOptions, Mode, ModeStore, VideoTextureMaterial};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

/// Requested opacity change per arrow key press.
const OPACITY_STEP: f32 = 0.1;

/// Video texture material viewer for projection mapping.
#[derive(Parser, Debug)]
#[command(name = "videomap")]
#[command(about = "Preview a video frame through the projection mapping material")]
struct Args {
    /// YAML config file, reloaded on change
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image used as the video frame (a test card if omitted)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Window width
    #[arg(long, default_value = "1280", value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Window height
    #[arg(long, default_value = "720", value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Initial mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Start with blending enabled
    #[arg(long)]
    blend: bool,

    /// Requested video opacity while blending (0.0 - 1.0)
    #[arg(long)]
    opacity: Option<f32>,
}

impl Args {
    /// Values that win over the config file, on load and on every reload.
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            image: self.image.clone(),
            mode: self.mode,
            blend_enabled: self.blend.then_some(true),
            requested_opacity: self.opacity,
        }
    }

    /// Config file contents as written, before overrides.
    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => {
                info!("Loading config from {:?}", path);
                Ok(Config::load(path)?)
            }
            None => Ok(Config::default()),
        }
    }
}

/// Application state for the event loop.
struct VideomapApp {
    args: Args,
    overrides: ConfigOverrides,
    config: Config,
    window: Option<Arc<Window>>,
    renderer: Option<WindowRenderer>,
    video_texture: Option<VideoTexture>,
    material: VideoTextureMaterial<wgpu::TextureView>,
    modes: ModeStore,
    watcher: Option<ConfigWatcher>,
}

impl VideomapApp {
    fn new(args: Args, file_config: Config) -> Self {
        let overrides = args.overrides();
        let config = overrides.apply(file_config.clone());
        let material = VideoTextureMaterial::new(MaterialOptions {
            texture: None,
            blend_enabled: Some(config.material.blend_enabled),
            requested_opacity: config.material.requested_opacity,
        });
        let modes = ModeStore::new(config.mode);
        let watcher = args
            .config
            .clone()
            .and_then(|path| ConfigWatcher::new(path, Some(file_config)));

        Self {
            args,
            overrides,
            config,
            window: None,
            renderer: None,
            video_texture: None,
            material,
            modes,
            watcher,
        }
    }

    /// Upload the frame and bind it to the material.
    fn initialize(&mut self) -> Result<()> {
        let Some(renderer) = &mut self.renderer else {
            return Ok(());
        };

        let frame = match &self.config.image {
            Some(path) => {
                info!("Loading frame from {:?}", path);
                VideoFrame::from_image(path)?
            }
            None => {
                info!("No image given, using test card");
                VideoFrame::test_card(self.args.width, self.args.height)
            }
        };

        let gpu = renderer.gpu();
        let frame = frame.scale_to_fit(gpu.max_texture_dimension())?;
        let texture = VideoTexture::from_frame(&gpu.device, &gpu.queue, &frame)?;
        self.material.set_texture(texture.view());
        renderer.set_content_size(frame.width, frame.height);
        self.video_texture = Some(texture);

        info!(
            "Material ready: blend={}, requested_opacity={}, mode={}",
            self.material.blend_enabled(),
            self.material.requested_opacity(),
            self.modes.get()
        );
        Ok(())
    }

    fn apply_config_changes(&mut self) {
        let Some(watcher) = &mut self.watcher else {
            return;
        };
        if let Some(config) = watcher.check_for_changes() {
            self.apply_file_config(config);
        }
    }

    /// Apply a reloaded config file; command line values still win.
    fn apply_file_config(&mut self, config: Config) {
        let config = self.overrides.apply(config);

        self.material.apply(&config.material);
        if config.mode != self.config.mode {
            self.modes.set(config.mode);
        }
        if config.image != self.config.image {
            warn!("Image changes take effect on restart");
        }
        self.config = config;
    }

    fn handle_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed {
            return;
        }

        match event.logical_key.as_ref() {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Named(NamedKey::ArrowUp) => self.step_opacity(OPACITY_STEP),
            Key::Named(NamedKey::ArrowDown) => self.step_opacity(-OPACITY_STEP),
            Key::Character("b") | Key::Character("B") if !event.repeat => {
                let blend = !self.material.blend_enabled();
                self.material.set_blend_enabled(blend);
                info!("Blend {}", if blend { "enabled" } else { "disabled" });
            }
            Key::Character("1") => self.modes.set(Mode::Exhibition),
            Key::Character("2") => self.modes.set(Mode::Map),
            Key::Character("3") => self.modes.set(Mode::Setup),
            _ => {}
        }
    }

    fn step_opacity(&mut self, delta: f32) {
        let next = ((self.material.requested_opacity() + delta) * 10.0).round() / 10.0;
        self.material.set_requested_opacity(next.clamp(0.0, 1.0));
        info!("Requested opacity {:.1}", self.material.requested_opacity());
    }

    fn render(&mut self) {
        self.apply_config_changes();

        let Some(renderer) = &mut self.renderer else {
            return;
        };
        if let Err(e) = renderer.render(&self.material) {
            error!("Render error: {}", e);
        }
    }
}

fn window_title(mode: Mode) -> String {
    format!("Videomap - {}", mode)
}

impl ApplicationHandler for VideomapApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(window_title(self.modes.get()))
            .with_inner_size(PhysicalSize::new(self.args.width, self.args.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match WindowRenderer::new(window.clone()) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                info!("Window created successfully");
            }
            Err(e) => {
                error!("Failed to create renderer: {}", e);
                event_loop.exit();
                return;
            }
        }

        self.modes
            .subscribe(move |_, next| window.set_title(&window_title(next)));

        if let Err(e) = self.initialize() {
            error!("Initialization error: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event, event_loop),
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.load_config()?;

    info!("Starting Videomap...");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = VideomapApp::new(args, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let args = Args::parse_from(["videomap", "--mode", "map", "--blend", "--opacity", "0.3"]);
        let config = args.overrides().apply(args.load_config().unwrap());
        assert_eq!(config.mode, Mode::Map);
        assert!(config.material.blend_enabled);
        assert_eq!(config.material.requested_opacity, Some(0.3));
        assert_eq!(config.image, None);
    }

    #[test]
    fn test_no_flags_keep_config_defaults() {
        let args = Args::parse_from(["videomap"]);
        assert_eq!(args.overrides(), ConfigOverrides::default());
        assert_eq!(args.load_config().unwrap(), Config::default());
        assert_eq!((args.width, args.height), (1280, 720));
    }

    #[test]
    fn test_reloaded_config_keeps_cli_values() {
        let args = Args::parse_from(["videomap", "--blend", "--mode", "exhibition"]);
        let mut app = VideomapApp::new(args, Config::default());
        assert!(app.material.blend_enabled());

        let reloaded = Config::from_yaml("mode: setup\nmaterial:\n  requested_opacity: 0.2\n").unwrap();
        app.apply_file_config(reloaded);
        assert!(app.material.blend_enabled());
        assert_eq!(app.modes.get(), Mode::Exhibition);
        assert_eq!(app.config.mode, Mode::Exhibition);
        assert_eq!(app.material.effective_opacity(), 0.2);
    }

    #[test]
    fn test_zero_window_size_is_rejected() {
        assert!(Args::try_parse_from(["videomap", "--width", "0"]).is_err());
        assert!(Args::try_parse_from(["videomap", "--height", "0"]).is_err());
    }
}
