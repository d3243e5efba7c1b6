//! Command-line interface for richard.
//!
//! Manages categories, speakers, tags, videos and related URLs in the
//! catalog database, and exports the catalog as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{self, ResolvedConfig};
use crate::domain::{
    Category, CategoryKind, Download, MediaFormat, Permalink, RelatedUrl, RelatedUrlId, Speaker,
    Video, VideoState,
};
use crate::export::CatalogExport;
use crate::store::{CatalogStore, VideoFilter};

/// richard - video index catalog
#[derive(Parser, Debug)]
#[command(name = "richard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog database (defaults to the configured path)
    #[arg(long, global = true, env = "RICHARD_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the catalog database if it does not exist
    Init,

    /// Manage categories (conferences, user groups)
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage speakers
    Speaker {
        #[command(subcommand)]
        command: SpeakerCommands,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Manage videos
    Video {
        #[command(subcommand)]
        command: VideoCommands,
    },

    /// Manage a video's related URLs
    Url {
        #[command(subcommand)]
        command: UrlCommands,
    },

    /// Export the whole catalog as JSON
    Export {
        /// Output file
        #[arg(short, long, default_value = "catalog.json")]
        output: PathBuf,
    },

    /// Show row counts
    Stats,

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Series name, e.g. "PyCon"
        #[arg(long)]
        name: String,

        /// Specific title, e.g. "PyCon 2012"
        #[arg(long)]
        title: String,

        /// URL identifier (defaults to the slugified title)
        #[arg(long)]
        slug: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// List categories
    List,

    /// Show a category and its videos
    Show { slug: String },

    /// Delete a category and all of its videos
    Delete { slug: String },
}

#[derive(Subcommand, Debug)]
pub enum SpeakerCommands {
    /// Add a speaker
    Add {
        name: String,

        /// URL identifier (defaults to the slugified name)
        #[arg(long)]
        slug: Option<String>,
    },

    /// List speakers
    List,

    /// Delete a speaker (videos are kept)
    Delete { slug: String },
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Add a tag (no-op if it exists)
    Add { label: String },

    /// List tags
    List,
}

#[derive(Subcommand, Debug)]
pub enum VideoCommands {
    /// Add a video
    Add {
        title: String,

        /// Category slug
        #[arg(short, long)]
        category: String,

        /// Speaker slug (repeatable)
        #[arg(short, long = "speaker")]
        speakers: Vec<String>,

        /// Tag label (repeatable, created if missing)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long, value_enum)]
        state: Option<StateArg>,

        /// Recording date (YYYY-MM-DD)
        #[arg(long)]
        recorded: Option<NaiveDate>,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        source_url: Option<String>,

        #[arg(long)]
        thumbnail_url: Option<String>,

        /// Downloadable encoding as FORMAT=URL (ogv, mp4 or webm; repeatable)
        #[arg(long = "download", value_parser = parse_download)]
        downloads: Vec<(MediaFormat, String)>,
    },

    /// Update a video; the slug follows the title
    Update {
        /// Current slug
        slug: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, value_enum)]
        state: Option<StateArg>,

        #[arg(long)]
        recorded: Option<NaiveDate>,

        #[arg(long)]
        whiteboard: Option<String>,
    },

    /// List videos, most recently recorded first
    List {
        /// Category slug
        #[arg(short, long)]
        category: Option<String>,

        /// Speaker slug
        #[arg(short, long)]
        speaker: Option<String>,

        /// Tag label
        #[arg(short, long)]
        tag: Option<String>,

        #[arg(long, value_enum)]
        state: Option<StateArg>,

        /// Maximum number of videos to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show a video
    Show { slug: String },

    /// Show the most recently recorded video
    Latest,

    /// Delete a video and its related URLs
    Delete { slug: String },
}

#[derive(Subcommand, Debug)]
pub enum UrlCommands {
    /// Attach a URL to a video
    Add {
        /// Video slug
        video: String,

        url: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// List a video's related URLs
    List {
        /// Video slug
        video: String,
    },

    /// Remove a related URL by id
    Delete { id: i64 },
}

/// Category kind for CLI (maps to CategoryKind)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Conference,
    Pug,
}

impl From<KindArg> for CategoryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Conference => CategoryKind::Conference,
            KindArg::Pug => CategoryKind::Pug,
        }
    }
}

/// Video state for CLI (maps to VideoState)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    Live,
    Draft,
}

impl From<StateArg> for VideoState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Live => VideoState::Live,
            StateArg::Draft => VideoState::Draft,
        }
    }
}

fn parse_download(value: &str) -> Result<(MediaFormat, String), String> {
    let (format, url) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FORMAT=URL, got {}", value))?;
    let format = MediaFormat::ALL
        .into_iter()
        .find(|f| f.extension().eq_ignore_ascii_case(format))
        .ok_or_else(|| format!("unknown format: {}", format))?;
    Ok((format, url.to_string()))
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Config => show_config(),
            command => {
                let mut store = open_store(self.database)?;
                execute_with_store(&mut store, command).await
            }
        }
    }
}

/// Execute a command that needs the catalog open
async fn execute_with_store(store: &mut CatalogStore, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            let counts = store.counts()?;
            println!(
                "Catalog ready at {} ({} videos)",
                store
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                counts.videos
            );
            Ok(())
        }
        Commands::Category { command } => execute_category(store, command),
        Commands::Speaker { command } => execute_speaker(store, command),
        Commands::Tag { command } => execute_tag(store, command),
        Commands::Video { command } => execute_video(store, command),
        Commands::Url { command } => execute_url(store, command),
        Commands::Export { output } => export_catalog(store, &output).await,
        Commands::Stats => show_stats(store),
        Commands::Config => show_config(),
    }
}

fn open_store(database: Option<PathBuf>) -> Result<CatalogStore> {
    let path = match database {
        Some(path) => path,
        None => config::database_path()?,
    };
    CatalogStore::open(&path)
        .with_context(|| format!("Failed to open catalog: {}", path.display()))
}

/// Resolved config, if it loads; used only to print absolute URLs
fn site_config() -> Option<&'static ResolvedConfig> {
    config::config().ok()
}

fn print_permalink<P: Permalink>(entity: &P) {
    let url = site_config()
        .and_then(|c| c.absolute_url(entity))
        .or_else(|| entity.permalink());
    if let Some(url) = url {
        println!("URL: {}", url);
    }
}

fn require_category(store: &CatalogStore, slug: &str) -> Result<Category> {
    store
        .category_by_slug(slug)?
        .with_context(|| format!("No category with slug: {}", slug))
}

fn require_speaker(store: &CatalogStore, slug: &str) -> Result<Speaker> {
    store
        .speaker_by_slug(slug)?
        .with_context(|| format!("No speaker with slug: {}", slug))
}

fn require_video(store: &CatalogStore, slug: &str) -> Result<Video> {
    store
        .video_by_slug(slug)?
        .with_context(|| format!("No video with slug: {}", slug))
}

fn execute_category(store: &mut CatalogStore, command: CategoryCommands) -> Result<()> {
    match command {
        CategoryCommands::Add {
            kind,
            name,
            title,
            slug,
            url,
            description,
            start_date,
        } => {
            let slug = slug.unwrap_or_else(|| crate::domain::slugify(&title));
            let mut category = Category::new(kind.into(), name, title, slug);
            category.url = url.unwrap_or_default();
            category.description = description.unwrap_or_default();
            category.start_date = start_date;

            let id = store.save_category(&mut category)?;
            println!("Added category {} ({})", category.slug, id);
            Ok(())
        }
        CategoryCommands::List => {
            let categories = store.categories()?;
            if categories.is_empty() {
                println!("No categories found");
                return Ok(());
            }

            println!("{:<6} {:<20} {:<30} {:<20}", "ID", "KIND", "TITLE", "SLUG");
            println!("{}", "-".repeat(80));
            for category in categories {
                println!(
                    "{:<6} {:<20} {:<30} {:<20}",
                    category.id.map(|id| id.to_string()).unwrap_or_default(),
                    category.kind.label(),
                    truncate(&category.title, 30),
                    category.slug
                );
            }
            Ok(())
        }
        CategoryCommands::Show { slug } => {
            let category = require_category(store, &slug)?;
            println!("Title: {}", category.title);
            println!("Name: {}", category.name);
            println!("Kind: {}", category.kind);
            if let Some(start) = category.start_date {
                println!("Starts: {}", start);
            }
            if !category.url.is_empty() {
                println!("Homepage: {}", category.url);
            }
            print_permalink(&category);

            if let Some(id) = category.id {
                let videos = store.videos(&VideoFilter::new().category(id))?;
                println!("\nVideos ({}):", videos.len());
                for video in videos {
                    println!("  {}", video_line(&video));
                }
            }
            Ok(())
        }
        CategoryCommands::Delete { slug } => {
            let category = require_category(store, &slug)?;
            if let Some(id) = category.id {
                store.delete_category(id)?;
            }
            println!("Deleted category {}", slug);
            Ok(())
        }
    }
}

fn execute_speaker(store: &mut CatalogStore, command: SpeakerCommands) -> Result<()> {
    match command {
        SpeakerCommands::Add { name, slug } => {
            let mut speaker = match slug {
                Some(slug) => Speaker::new(name, slug),
                None => Speaker::from_name(name),
            };
            let id = store.save_speaker(&mut speaker)?;
            println!("Added speaker {} ({})", speaker.slug, id);
            Ok(())
        }
        SpeakerCommands::List => {
            let speakers = store.speakers()?;
            if speakers.is_empty() {
                println!("No speakers found");
                return Ok(());
            }
            for speaker in speakers {
                println!("{:<30} {}", speaker.name, speaker.slug);
            }
            Ok(())
        }
        SpeakerCommands::Delete { slug } => {
            let speaker = require_speaker(store, &slug)?;
            if let Some(id) = speaker.id {
                store.delete_speaker(id)?;
            }
            println!("Deleted speaker {}", slug);
            Ok(())
        }
    }
}

fn execute_tag(store: &mut CatalogStore, command: TagCommands) -> Result<()> {
    match command {
        TagCommands::Add { label } => {
            let id = store.get_or_create_tag(&label)?;
            println!("Tag {} ({})", label.trim(), id);
            Ok(())
        }
        TagCommands::List => {
            for tag in store.tags()? {
                println!("{}", tag);
            }
            Ok(())
        }
    }
}

fn execute_video(store: &mut CatalogStore, command: VideoCommands) -> Result<()> {
    match command {
        VideoCommands::Add {
            title,
            category,
            speakers,
            tags,
            state,
            recorded,
            summary,
            source_url,
            thumbnail_url,
            downloads,
        } => {
            let category = require_category(store, &category)?;
            let category_id = category
                .id
                .context("Category loaded without an id")?;

            let mut video =
                Video::new(title, category_id).with_summary(summary.unwrap_or_default());
            video.state = state.map(Into::into);
            video.recorded = recorded;
            video.source_url = source_url;
            video.thumbnail_url = thumbnail_url;
            for (format, url) in downloads {
                *video.download_mut(format) = Download::new(url, None);
            }
            for slug in &speakers {
                if let Some(id) = require_speaker(store, slug)?.id {
                    video.speakers.push(id);
                }
            }

            let id = store.save_video_tagged(&mut video, &tags)?;
            println!("Added video {} ({})", video.slug, id);
            Ok(())
        }
        VideoCommands::Update {
            slug,
            title,
            state,
            recorded,
            whiteboard,
        } => {
            let mut video = require_video(store, &slug)?;
            if let Some(title) = title {
                video.title = title;
            }
            if let Some(state) = state {
                video.state = Some(state.into());
            }
            if recorded.is_some() {
                video.recorded = recorded;
            }
            if let Some(whiteboard) = whiteboard {
                video.whiteboard = whiteboard;
            }

            store.save_video(&mut video)?;
            println!("Updated video {}", video.slug);
            Ok(())
        }
        VideoCommands::List {
            category,
            speaker,
            tag,
            state,
            limit,
        } => {
            let mut filter = VideoFilter::new().limit(limit);
            if let Some(slug) = category {
                if let Some(id) = require_category(store, &slug)?.id {
                    filter = filter.category(id);
                }
            }
            if let Some(slug) = speaker {
                if let Some(id) = require_speaker(store, &slug)?.id {
                    filter = filter.speaker(id);
                }
            }
            if let Some(label) = tag {
                let tag = store
                    .tag_by_label(&label)?
                    .with_context(|| format!("No tag: {}", label))?;
                if let Some(id) = tag.id {
                    filter = filter.tag(id);
                }
            }
            if let Some(state) = state {
                filter = filter.state(state.into());
            }

            let videos = store.videos(&filter)?;
            if videos.is_empty() {
                println!("No videos found");
                return Ok(());
            }
            for video in videos {
                println!("{}", video_line(&video));
            }
            Ok(())
        }
        VideoCommands::Show { slug } => {
            let video = require_video(store, &slug)?;
            show_video(store, &video)
        }
        VideoCommands::Latest => match store.latest_video()? {
            Some(video) => show_video(store, &video),
            None => {
                println!("No dated videos found");
                Ok(())
            }
        },
        VideoCommands::Delete { slug } => {
            let video = require_video(store, &slug)?;
            if let Some(id) = video.id {
                store.delete_video(id)?;
            }
            println!("Deleted video {}", slug);
            Ok(())
        }
    }
}

fn execute_url(store: &mut CatalogStore, command: UrlCommands) -> Result<()> {
    match command {
        UrlCommands::Add {
            video,
            url,
            description,
        } => {
            let video = require_video(store, &video)?;
            let video_id = video.id.context("Video loaded without an id")?;
            let mut related =
                RelatedUrl::new(video_id, url).with_description(description.unwrap_or_default());
            let id = store.add_related_url(&mut related)?;
            println!("Added related url {} to {}", id, video.slug);
            Ok(())
        }
        UrlCommands::List { video } => {
            let video = require_video(store, &video)?;
            let video_id = video.id.context("Video loaded without an id")?;
            for related in store.related_urls(video_id)? {
                print_related(&related);
            }
            Ok(())
        }
        UrlCommands::Delete { id } => {
            store.delete_related_url(RelatedUrlId(id))?;
            println!("Deleted related url {}", id);
            Ok(())
        }
    }
}

fn show_video(store: &CatalogStore, video: &Video) -> Result<()> {
    println!("Title: {}", video.title);
    println!("Slug: {}", video.slug);
    if let Some(state) = video.state {
        println!("State: {}", state);
    }
    if !video.is_live() {
        println!("(not published)");
    }
    if let Some(category) = store.category(video.category)? {
        println!("Category: {}", category.title);
    }
    if let Some(recorded) = video.recorded {
        println!("Recorded: {}", recorded);
    }
    if let Some(id) = video.id {
        let speakers: Vec<String> = store
            .speakers_for_video(id)?
            .into_iter()
            .map(|s| s.name)
            .collect();
        if !speakers.is_empty() {
            println!("Speakers: {}", speakers.join(", "));
        }
        let tags: Vec<String> = store
            .tags_for_video(id)?
            .into_iter()
            .map(|t| t.tag)
            .collect();
        if !tags.is_empty() {
            println!("Tags: {}", tags.join(", "));
        }
    }
    for (format, download) in video.available_downloads() {
        match (&download.url, download.length) {
            (Some(url), Some(len)) => println!("{}: {} ({} bytes)", format.extension(), url, len),
            (Some(url), None) => println!("{}: {}", format.extension(), url),
            (None, Some(len)) => println!("{}: ({} bytes)", format.extension(), len),
            (None, None) => {}
        }
    }
    if let Some(source) = &video.source_url {
        println!("Source: {}", source);
    }
    if !video.whiteboard.is_empty() {
        println!("Whiteboard: {}", video.whiteboard);
    }
    print_permalink(video);

    if let Some(id) = video.id {
        let related = store.related_urls(id)?;
        if !related.is_empty() {
            println!("\nRelated:");
            for url in &related {
                print_related(url);
            }
        }
    }

    Ok(())
}

fn print_related(related: &RelatedUrl) {
    let id = related.id.map(|id| id.to_string()).unwrap_or_default();
    if related.description.is_empty() {
        println!("  [{}] {}", id, related.url);
    } else {
        println!("  [{}] {} - {}", id, related.url, related.description);
    }
}

fn video_line(video: &Video) -> String {
    format!(
        "{:<12} {:<7} {:<50} {}",
        video
            .recorded
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        video.state.map(|s| s.to_string()).unwrap_or_default(),
        truncate(&video.title, 50),
        video.slug
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

async fn export_catalog(store: &CatalogStore, output: &Path) -> Result<()> {
    let export = CatalogExport::collect(store)?;
    export
        .write_to(output)
        .await
        .with_context(|| format!("Failed to write export: {}", output.display()))?;

    println!(
        "Exported {} categories, {} speakers, {} tags, {} videos to {}",
        export.categories.len(),
        export.speakers.len(),
        export.tags.len(),
        export.videos.len(),
        output.display()
    );
    Ok(())
}

fn show_stats(store: &CatalogStore) -> Result<()> {
    let counts = store.counts()?;
    println!("Categories:    {}", counts.categories);
    println!("Speakers:      {}", counts.speakers);
    println!("Tags:          {}", counts.tags);
    println!("Videos:        {}", counts.videos);
    println!("Related URLs:  {}", counts.related_urls);
    println!("Tag links:     {}", counts.video_tags);
    println!("Speaker links: {}", counts.video_speakers);
    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;
    println!("Home:        {}", config.home.display());
    println!("Database:    {}", config.database.display());
    println!(
        "Base URL:    {}",
        config.base_url.as_deref().unwrap_or("(not set)")
    );
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    Ok(())
}
