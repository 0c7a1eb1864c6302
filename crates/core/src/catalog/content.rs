//! Marketing content: banners, carousel slides and blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BannerId, BlogId, CarouselId, RecordStatus};

/// Promotional banner shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub image: String,
    /// Where the banner links to, relative or absolute.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One slide of the home page hero carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselSlide {
    pub id: CarouselId,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    /// Ascending display order.
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub status: RecordStatus,
}

/// A blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: BlogId,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Article body as HTML, authored in the admin editor.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: RecordStatus,
}

impl BlogPost {
    /// Whether shoppers may see the post.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == RecordStatus::Active
    }
}
