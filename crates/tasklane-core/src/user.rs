use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::document_id;

/// A registered account. Read-only from the client's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserDocument")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    /// Profile image reference (URL or server-side path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    underscore_id: Option<String>,
    id: Option<String>,
    username: String,
    email: String,
    #[serde(rename = "createdAt", default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    image: Option<String>,
}

impl TryFrom<UserDocument> for User {
    type Error = String;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: document_id(doc.underscore_id, doc.id)?,
            username: doc.username,
            email: doc.email,
            created_at: doc.created_at,
            image: doc.image,
        })
    }
}

impl User {
    pub fn joined_on(&self) -> String {
        self.created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into())
    }
}
