use regex::Regex;
use std::sync::LazyLock;

pub const IMAGE_ENDPOINT: &str = "https://image.pollinations.ai/prompt";
pub const DEFAULT_IMAGE_WIDTH: u32 = 640;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 360;

/// Captures the video id that follows the usual YouTube URL shapes.
static YOUTUBE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("Invalid YouTube id regex")
});

/// Finds a bare YouTube link inside free text.
static YOUTUBE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(www\.)?(youtube\.com|youtu\.be)/[^\s]+")
        .expect("Invalid YouTube link regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        ImageSize {
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
        }
    }
}

/// Deterministic placeholder image for a description and seed.
pub fn image_url(description: &str, size: ImageSize, seed: u64) -> String {
    format!(
        "{}/{}?nologo=true&width={}&height={}&seed={}",
        IMAGE_ENDPOINT,
        urlencoding::encode(description),
        size.width,
        size.height,
        seed
    )
}

/// The 11-character video id, or `None` when the link is not embeddable.
pub fn youtube_id(url: &str) -> Option<String> {
    let captures = YOUTUBE_ID_REGEX.captures(url)?;
    let id = captures.get(2)?.as_str();
    if id.chars().count() == 11 {
        Some(id.to_string())
    } else {
        None
    }
}

pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{}", video_id)
}

pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

pub fn first_youtube_link(text: &str) -> Option<String> {
    YOUTUBE_LINK_REGEX.find(text).map(|m| m.as_str().to_string())
}

/// Search results page used when no concrete video was found.
pub fn video_search_url(title: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(&format!("{} recipe", title))
    )
}

/// How a recipe's video should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoLink {
    Embed { video_id: String, embed_url: String },
    External(String),
}

impl VideoLink {
    pub fn from_url(url: &str) -> Self {
        match youtube_id(url) {
            Some(video_id) => VideoLink::Embed {
                embed_url: embed_url(&video_id),
                video_id,
            },
            None => VideoLink::External(url.to_string()),
        }
    }
}
