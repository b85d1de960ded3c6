pub mod config_loader;
pub mod editor;
pub mod media;
pub mod render;
pub mod resize;
pub mod stage;
