use std::path::Path;

use anyhow::{Result, bail};
use blog_core::config::{BlogConfig, CONFIG_FILE_NAME, load_blog_config};

pub fn load_config(root: &Path) -> Result<BlogConfig> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        bail!(
            "Missing {CONFIG_FILE_NAME} in {}. Create one (it may be empty to use the defaults).",
            root.display()
        );
    }
    load_blog_config(&config_path)
}
