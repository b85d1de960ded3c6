use std::path::PathBuf;

use blog_core::config::BlogConfig;
use blog_core::images::find_html_media;
use blog_core::model::Post;
use blog_core::resize::original_of_reduced;

/// Local files a published post's HTML points at, in document order.
///
/// Only sources under the configured image prefix are local. A reduced variant
/// brings its full-size original along.
pub fn post_media_files(post: &Post, config: &BlogConfig) -> Vec<PathBuf> {
    let prefix = format!("{}/", config.publish.image_prefix);
    let mut files: Vec<PathBuf> = Vec::new();
    for src in find_html_media(&post.content) {
        let Some(relative) = src.strip_prefix(&prefix) else {
            continue;
        };
        let mut found = vec![relative.to_string()];
        if let Some(original) = original_of_reduced(relative) {
            found.push(original);
        }
        for relative in found {
            let path = config.paths.images_dir.join(relative);
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }
    files
}
