//! Markdown file to stored post.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::BlogConfig;
use crate::convert::{MarkdownRenderer, convert, read_source};
use crate::error::BlogError;
use crate::handle::title_handle;
use crate::images::{find_markdown_images, rewrite_images, strip_caption_directives};
use crate::links::rewrite_internal_links;
use crate::model::{NewPost, Post, Visibility};
use crate::resize::{ImageResizer, is_resize_exempt, parse_resize_directive, reduced_variant_path};
use crate::store::PostStore;
use crate::video::add_autoplay;

pub struct Publisher<'a> {
    config: &'a BlogConfig,
    renderer: &'a dyn MarkdownRenderer,
    resizer: &'a dyn ImageResizer,
}

impl<'a> Publisher<'a> {
    pub fn new(
        config: &'a BlogConfig,
        renderer: &'a dyn MarkdownRenderer,
        resizer: &'a dyn ImageResizer,
    ) -> Self {
        Self {
            config,
            renderer,
            resizer,
        }
    }

    /// Build a post from `markdown_path` and store it hidden.
    ///
    /// Nothing is written to the store unless every step succeeds.
    pub fn ingest(
        &self,
        markdown_path: &Path,
        store: &mut dyn PostStore,
    ) -> Result<Post, BlogError> {
        let new_post = self.prepare(markdown_path, &*store)?;
        let post = store.insert(new_post)?;
        info!(id = post.id, handle = %post.handle, "ingested {}", markdown_path.display());
        Ok(post)
    }

    pub fn prepare(&self, markdown_path: &Path, store: &dyn PostStore) -> Result<NewPost, BlogError> {
        let markdown = read_source(markdown_path)?;
        let doc = convert(&markdown, self.renderer)?;
        let handle = title_handle(&doc.title)?;
        debug!(title = %doc.title, handle = %handle, "converted markdown");

        self.produce_reduced_variants(&markdown)?;
        let content = rewrite_images(
            &doc.body,
            &self.config.publish.image_prefix,
            &self.config.paths.images_dir,
        );
        let content = rewrite_internal_links(&content, &self.config.publish.link_prefix, store)?;
        let content = strip_caption_directives(&content);
        let content = add_autoplay(&content);

        let now = Utc::now();
        Ok(NewPost {
            title: doc.title,
            handle,
            content,
            summary: doc.summary,
            visibility: Visibility::Hidden,
            post_ts: now,
            post_update_ts: now,
        })
    }

    pub fn produce_reduced_variants(&self, markdown: &str) -> Result<usize, BlogError> {
        let images_dir = &self.config.paths.images_dir;
        let mut produced = 0;
        for image in find_markdown_images(markdown) {
            if image.is_remote() {
                continue;
            }
            let source = images_dir.join(&image.path);
            if !source.is_file() {
                return Err(BlogError::FileNotFound(source));
            }
            let Some(spec) = parse_resize_directive(&image.caption) else {
                continue;
            };
            if is_resize_exempt(&image.path) {
                warn!(path = %image.path, "not resizing vector or animated image");
                continue;
            }
            let destination = images_dir.join(reduced_variant_path(&image.path));
            debug!(path = %image.path, %spec, "resizing image");
            self.resizer
                .resize(&source, spec, self.config.resize.quality, &destination)?;
            produced += 1;
        }
        Ok(produced)
    }
}
