//! Post records and their publication state

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BlogError;

pub type PostId = i64;

/// Publication state of a post, ordered `Hidden < Unlisted < Published`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Hidden,
    Unlisted,
    Published,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [
        Visibility::Hidden,
        Visibility::Unlisted,
        Visibility::Published,
    ];

    pub fn ordinal(self) -> i64 {
        match self {
            Visibility::Hidden => 0,
            Visibility::Unlisted => 1,
            Visibility::Published => 2,
        }
    }

    pub fn from_ordinal(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|visibility| visibility.ordinal() == value)
    }

    pub fn is_listed(self) -> bool {
        self == Visibility::Published
    }

    pub fn is_reachable(self) -> bool {
        self >= Visibility::Unlisted
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Hidden => "hidden",
            Visibility::Unlisted => "unlisted",
            Visibility::Published => "published",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = BlogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|visibility| visibility.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| BlogError::InvalidInput(format!("unknown visibility '{value}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub handle: String,
    pub content: String,
    pub summary: String,
    pub visibility: Visibility,
    pub post_ts: DateTime<Utc>,
    pub post_update_ts: DateTime<Utc>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub handle: String,
    pub content: String,
    pub summary: String,
    pub visibility: Visibility,
    pub post_ts: DateTime<Utc>,
    pub post_update_ts: DateTime<Utc>,
}

impl NewPost {
    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            title: self.title,
            handle: self.handle,
            content: self.content,
            summary: self.summary,
            visibility: self.visibility,
            post_ts: self.post_ts,
            post_update_ts: self.post_update_ts,
        }
    }
}
