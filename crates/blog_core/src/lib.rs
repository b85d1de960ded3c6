//! Markdown-to-post publishing pipeline.
//!
//! A post source is rendered to HTML, its images and wiki-style links are
//! rewritten against the local image library and the post store, and the
//! result is stored as a [`model::Post`].

pub mod config;
pub mod convert;
pub mod error;
pub mod handle;
pub mod images;
pub mod ingest;
pub mod links;
pub mod maintain;
pub mod model;
pub mod resize;
pub mod store;
pub mod video;

pub use crate::error::BlogError;
