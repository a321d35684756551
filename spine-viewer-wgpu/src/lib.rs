//! Desktop front-end for `spine-viewer`: a `winit` window rendering the session through
//! `spine2d-wgpu`, with a native file dialog as the import platform.

pub mod app;
pub mod platform;
pub mod textures;

pub use app::ViewerApp;
pub use platform::DesktopPlatform;
