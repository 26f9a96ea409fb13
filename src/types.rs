//! Client-facing data models, mapped from the upstream protobuf types so the
//! gateway controls the JSON shape it exposes.

use serde::Serialize;

use crate::grpc::proto::{authentication, video_catalog};

/// The verified identity resolved from a bearer credential.
///
/// Produced only by the token-verification middleware and carried through a
/// single request via its extensions; never constructed anywhere else.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<authentication::User> for Principal {
    fn from(user: authentication::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The raw bearer credential as received on the inbound request, re-forwarded
/// to downstream calls that must act on the same token (logout).
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub published_at: String,
}

impl From<video_catalog::Video> for Video {
    fn from(video: video_catalog::Video) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            thumbnail_url: video.thumbnail_url,
            published_at: video.published_at,
        }
    }
}
