//! Markdown content layer for public pages and news posts.
//!
//! Content editors maintain markdown files with YAML front matter under the
//! content directory; everything is loaded into memory at startup and
//! immutable thereafter.
//!
//! ```text
//! content/
//!   pages/about.md          static pages, slug = filename
//!   news/2026-03-01-foo.md  news posts, date prefix stripped from slug
//! ```

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors loading content from disk.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content parse error: {0}")]
    Parse(String),
}

/// Metadata for static pages (about, become-an-official, etc.)
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// Metadata for news posts.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    /// Members-only posts appear in the portal news feed, not on the
    /// public news page.
    #[serde(default)]
    pub members_only: bool,
    #[serde(default)]
    pub draft: bool,
}

/// A rendered page with metadata and HTML content.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// A rendered news post with metadata and HTML content.
#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
}

/// All site content, loaded once and shared.
#[derive(Debug, Clone)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load every markdown file under `content_dir`.
    ///
    /// A missing subdirectory yields an empty collection; an unreadable one
    /// is an error. A single malformed file is logged and skipped rather
    /// than failing startup.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] if a content directory cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let pages: HashMap<String, Page> = load_dir(&content_dir.join("pages"), load_page)?
            .into_iter()
            .map(|page| (page.slug.clone(), page))
            .collect();

        let mut posts = load_dir(&content_dir.join("news"), load_post)?;
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));

        tracing::info!(
            pages = pages.len(),
            posts = posts.len(),
            "content loaded"
        );

        Ok(Self {
            pages: Arc::new(pages),
            posts: Arc::new(posts),
        })
    }

    /// Get a page by slug.
    #[must_use]
    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Get a news post by slug.
    #[must_use]
    pub fn post(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// Publicly visible posts, newest first (no drafts, no members-only).
    pub fn public_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts
            .iter()
            .filter(|p| !p.meta.draft && !p.meta.members_only)
    }

    /// All published posts including members-only, newest first.
    pub fn member_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.meta.draft)
    }
}

/// Run `build` over every `.md` file in `dir`, skipping files that fail.
fn load_dir<T>(
    dir: &Path,
    build: fn(&Path, &str) -> Result<T, ContentError>,
) -> Result<Vec<T>, ContentError> {
    if !dir.exists() {
        tracing::warn!("content directory does not exist: {}", dir.display());
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match build(&path, stem) {
            Ok(item) => items.push(item),
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "skipping malformed content file");
            }
        }
    }
    Ok(items)
}

fn load_page(path: &Path, stem: &str) -> Result<Page, ContentError> {
    let raw = std::fs::read_to_string(path)?;
    let (meta, body) = parse_front_matter::<PageMeta>(&raw)?;
    Ok(Page {
        slug: stem.to_owned(),
        meta,
        content_html: render_markdown(&body),
    })
}

fn load_post(path: &Path, stem: &str) -> Result<Post, ContentError> {
    let raw = std::fs::read_to_string(path)?;
    let (meta, body) = parse_front_matter::<PostMeta>(&raw)?;
    Ok(Post {
        slug: date_stripped_slug(stem).to_owned(),
        meta,
        content_html: render_markdown(&body),
    })
}

/// Drop a leading `YYYY-MM-DD-` from a news filename, if present.
fn date_stripped_slug(stem: &str) -> &str {
    if stem.len() > 11 && stem.chars().nth(4) == Some('-') {
        stem.get(11..).unwrap_or(stem)
    } else {
        stem
    }
}

/// Split YAML front matter from the markdown body.
fn parse_front_matter<T: serde::de::DeserializeOwned>(
    raw: &str,
) -> Result<(T, String), ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<T> = matter
        .parse(raw)
        .map_err(|e| ContentError::Parse(format!("failed to parse front matter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("missing front matter".to_owned()))?;
    Ok((meta, parsed.content))
}

/// Render markdown to HTML.
fn render_markdown(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    markdown_to_html(markdown, &options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn front_matter_parses_page_meta() {
        let raw = "---\ntitle: About Us\ndescription: Who we are\n---\n# Hello\n";
        let (meta, body) = parse_front_matter::<PageMeta>(raw).unwrap();
        assert_eq!(meta.title, "About Us");
        assert_eq!(meta.description.as_deref(), Some("Who we are"));
        assert!(body.contains("# Hello"));
    }

    #[test]
    fn front_matter_parses_post_meta_with_flags() {
        let raw = "---\ntitle: Rule Update\npublished_at: 2026-03-01\nmembers_only: true\n---\nBody\n";
        let (meta, _) = parse_front_matter::<PostMeta>(raw).unwrap();
        assert_eq!(meta.published_at, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(meta.members_only);
        assert!(!meta.draft);
    }

    #[test]
    fn missing_front_matter_is_an_error() {
        assert!(parse_front_matter::<PageMeta>("just markdown").is_err());
    }

    #[test]
    fn news_filenames_lose_their_date_prefix() {
        assert_eq!(
            date_stripped_slug("2026-03-01-rule-update"),
            "rule-update"
        );
        assert_eq!(date_stripped_slug("no-date-here"), "no-date-here");
        assert_eq!(date_stripped_slug("2026-03-01-"), "2026-03-01-");
    }

    #[test]
    fn markdown_renders_to_html() {
        let html = render_markdown("# Title\n\nSome **bold** text.");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }
}
