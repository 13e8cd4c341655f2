//! Kiln Player - opens a window and runs the orbit demo
//!
//! Usage:
//!   kiln-player [--settings <path>] [--fullscreen] [--free-aspect]

use anyhow::{Context, Result};
use clap::Parser;
use kiln_core::Color;
use kiln_player::demo::OrbitDemo;
use kiln_player::PlayerApp;
use kiln_render::SceneRenderer;
use kiln_runtime::{logging, Application, Settings, Subsystems};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "kiln-player")]
#[command(about = "Kiln player - run the orbit demo in a window")]
struct Args {
    /// Settings file (defaults to $KILN_SETTINGS or Settings/Application_Settings.json)
    #[arg(long)]
    settings: Option<String>,

    /// Start in fullscreen regardless of the settings file
    #[arg(long)]
    fullscreen: bool,

    /// Let the window be resized to any aspect ratio
    #[arg(long)]
    free_aspect: bool,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let path = args.settings.unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_or_default(&path);
    settings.fullscreen |= args.fullscreen;
    if args.free_aspect {
        settings.lock_aspect = false;
    }

    println!("Controls:");
    println!("  Alt+Enter - Toggle fullscreen");
    println!("  Space     - Hold to pause");
    println!("  F         - Toggle fullscreen");
    println!("  Escape    - Quit");

    let subsystems = Subsystems::with_renderer(SceneRenderer::new(Color::from_hex(0x101820)));
    let app = Application::new(subsystems, OrbitDemo::default()).with_settings(settings);

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut player = PlayerApp::new(app);
    event_loop
        .run_app(&mut player)
        .context("Event loop terminated with an error")?;

    Ok(())
}
