use spine_viewer::{Config, DirStorage, config};
use spine_viewer_wgpu::{DesktopPlatform, ViewerApp};
use winit::event_loop::EventLoop;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load().unwrap_or_else(|e| {
        log::warn!("ignoring unreadable settings: {e}");
        Config::default()
    });
    let storage = match config.storage_dir.as_deref() {
        Some(dir) => DirStorage::open(dir)?,
        None => DirStorage::open_default()?,
    };
    let platform = DesktopPlatform::new(storage.clone())?;
    let mut app = ViewerApp::new(&config, platform, storage);

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
