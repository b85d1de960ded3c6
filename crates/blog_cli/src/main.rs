use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blog_cli::config_loader::load_config;
use blog_cli::editor::{edit_text, editor_command};
use blog_cli::media::post_media_files;
use blog_cli::render::renderer_for;
use blog_cli::resize::resizer_for;
use blog_cli::stage::stage_note;
use blog_core::config::BlogConfig;
use blog_core::ingest::Publisher;
use blog_core::maintain::{delete_post, edit_content, hide, load_post, publish, unlist};
use blog_core::model::{Post, PostId};
use blog_core::store::PostStore;
use blog_store::SqlitePostStore;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "blog", about = "Publish Markdown notes as blog posts.")]
struct Cli {
    /// Directory holding blog.yaml.
    #[arg(long = "source-dir", short = 's', global = true, default_value = ".")]
    source_dir: PathBuf,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Convert a Markdown file and store it as a hidden post.")]
    Post {
        file: PathBuf,
        /// Copy the note and its images from the notes directory first.
        #[arg(long)]
        stage: bool,
    },
    #[command(about = "Copy a note and its images into the blog tree.")]
    Stage { note: PathBuf },
    #[command(about = "List every post.")]
    List {
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Print a post and its content.")]
    Show { id: PostId },
    Hide { id: PostId },
    Unlist { id: PostId },
    Publish { id: PostId },
    #[command(about = "Replace a post's stored HTML.")]
    Edit {
        id: PostId,
        /// Read the new HTML from a file instead of opening an editor.
        #[arg(long, value_name = "PATH")]
        from: Option<PathBuf>,
    },
    Delete { id: PostId },
    #[command(about = "List local media files referenced by a post.")]
    Media { id: PostId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli.source_dir)?;
    match &cli.command {
        Command::Post { file, stage } => run_post(&config, file, *stage),
        Command::Stage { note } => run_stage(&config, note),
        Command::List { json } => run_list(&config, *json),
        Command::Show { id } => run_show(&config, *id),
        Command::Hide { id } => {
            let post = hide(&mut open_store(&config)?, *id)?;
            print_post_line(&post);
            Ok(())
        }
        Command::Unlist { id } => {
            let post = unlist(&mut open_store(&config)?, *id)?;
            print_post_line(&post);
            Ok(())
        }
        Command::Publish { id } => {
            let post = publish(&mut open_store(&config)?, *id)?;
            print_post_line(&post);
            Ok(())
        }
        Command::Edit { id, from } => run_edit(&config, *id, from.as_deref()),
        Command::Delete { id } => {
            let post = delete_post(&mut open_store(&config)?, *id)?;
            println!("Deleted {post}");
            Ok(())
        }
        Command::Media { id } => run_media(&config, *id),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn open_store(config: &BlogConfig) -> Result<SqlitePostStore> {
    let database = &config.paths.database;
    SqlitePostStore::open(database)
        .with_context(|| format!("failed to open post database {}", database.display()))
}

fn run_post(config: &BlogConfig, file: &Path, stage: bool) -> Result<()> {
    let source = if stage {
        stage_note(file, config)?.post_path
    } else {
        file.to_path_buf()
    };
    let renderer = renderer_for(&config.render);
    let resizer = resizer_for(&config.resize);
    let publisher = Publisher::new(config, renderer.as_ref(), resizer.as_ref());
    let mut store = open_store(config)?;
    let post = publisher
        .ingest(&source, &mut store)
        .with_context(|| format!("failed to publish {}", source.display()))?;
    println!("Created post {post} ({})", post.visibility);
    Ok(())
}

fn run_stage(config: &BlogConfig, note: &Path) -> Result<()> {
    let summary = stage_note(note, config)?;
    for image in &summary.images {
        println!("Copied {}", image.display());
    }
    println!("Staged {}", summary.post_path.display());
    Ok(())
}

fn run_list(config: &BlogConfig, json: bool) -> Result<()> {
    let posts = open_store(config)?.all()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }
    for post in &posts {
        println!(
            "{:>4}  {:<9}  {}  {}",
            post.id,
            post.visibility,
            post.post_ts.format("%Y-%m-%d"),
            post.title
        );
    }
    Ok(())
}

fn run_show(config: &BlogConfig, id: PostId) -> Result<()> {
    let post = load_post(&open_store(config)?, id)?;
    println!("{post}");
    println!("handle:     {}", post.handle);
    println!("visibility: {}", post.visibility);
    println!("posted:     {}", post.post_ts.to_rfc3339());
    println!("updated:    {}", post.post_update_ts.to_rfc3339());
    println!("summary:    {}", post.summary);
    println!();
    println!("{}", post.content);
    Ok(())
}

fn run_edit(config: &BlogConfig, id: PostId, from: Option<&Path>) -> Result<()> {
    let mut store = open_store(config)?;
    let post = load_post(&store, id)?;
    let content = match from {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => edit_text(&editor_command(), &post.content)?,
    };
    if content == post.content {
        println!("No changes to {post}");
        return Ok(());
    }
    let post = edit_content(&mut store, id, content)?;
    println!("Updated {post}");
    Ok(())
}

fn run_media(config: &BlogConfig, id: PostId) -> Result<()> {
    let post = load_post(&open_store(config)?, id)?;
    for path in post_media_files(&post, config) {
        println!("{}", path.display());
    }
    Ok(())
}

fn print_post_line(post: &Post) {
    println!("{post} is now {}", post.visibility);
}
