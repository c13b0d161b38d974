use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub display_name: String,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    pub url: Option<String>,
}

impl Account {
    /// Display name, falling back to the handle for accounts that never set one.
    pub fn name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaAttachment {
    pub url: String,
    pub description: Option<String>,
}

/// A timeline entry as served by the backend (Mastodon status shape).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub account: Account,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_attachments: Vec<MediaAttachment>,
    pub created_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl Post {
    pub fn first_media(&self) -> Option<&MediaAttachment> {
        self.media_attachments.first()
    }

    pub fn created_unix(&self) -> Option<u64> {
        self.created_at.map(|t| t.timestamp().max(0) as u64)
    }
}

/// Identity returned by `/getuser`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserIdentity {
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
