// ============================================================================
// Video Routes
// ============================================================================
//
// Endpoints:
// - GET  /videos                        - List published videos
// - GET  /videos/:id                    - Look up one video
// - POST /videos/upload/presigned-url   - Mint a direct-upload URL (protected)
// - POST /videos/upload/webhook         - Register a finished upload (protected)
//
// ============================================================================

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::grpc::proto::upload::UploadedWebhookRequest;
use crate::grpc::Deadline;
use crate::response::{envelope, MSG_OK};
use crate::routes::extractors::AuthenticatedUser;
use crate::types::Video;
use crate::validation::{FieldErrors, Rules};

#[derive(Debug, Deserialize)]
pub struct UploadedWebhookInput {
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub thumbnail_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl UploadedWebhookInput {
    pub const FIELDS: &'static [&'static str] =
        &["video_id", "thumbnail_id", "title", "description"];

    fn validate(&self) -> Result<(), FieldErrors> {
        Rules::new(Self::FIELDS)
            .required("video_id", &self.video_id)
            .required("thumbnail_id", &self.thumbnail_id)
            .required("title", &self.title)
            .required("description", &self.description)
            .finish()
    }
}

/// GET /videos
pub async fn find_all(
    State(ctx): State<Arc<AppContext>>,
    deadline: Deadline,
) -> AppResult<impl IntoResponse> {
    let response = ctx
        .video_catalog
        .find_all(deadline)
        .await
        .map_err(|status| AppError::upstream(status, &[]))?;

    let videos: Vec<Video> = response.videos.into_iter().map(Video::from).collect();

    Ok(Json(envelope(MSG_OK, json!({ "videos": videos }))))
}

/// GET /videos/:id
pub async fn find_by_id(
    State(ctx): State<Arc<AppContext>>,
    deadline: Deadline,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id: i32 = id
        .parse()
        .map_err(|_| AppError::internal(format!("unparseable video id {id:?}")))?;

    let response = ctx
        .video_catalog
        .find_by_id(deadline, id)
        .await
        .map_err(|status| AppError::upstream(status, &[]))?;

    let video = response.video.map(Video::from);

    Ok(Json(envelope(MSG_OK, json!({ "video": video }))))
}

/// POST /videos/upload/presigned-url
pub async fn create_presigned_url(
    State(ctx): State<Arc<AppContext>>,
    deadline: Deadline,
) -> AppResult<impl IntoResponse> {
    let response = ctx
        .upload
        .create_presigned_url(deadline)
        .await
        .map_err(|status| AppError::upstream(status, &[]))?;

    Ok(Json(envelope(
        MSG_OK,
        json!({
            "url": response.url,
            "video_id": response.video_id,
            "thumbnail_url": response.thumbnail_url,
        }),
    )))
}

/// POST /videos/upload/webhook
/// Registers an uploaded video on behalf of the verified principal; the
/// principal's id travels to the backend as x-user-id metadata.
pub async fn uploaded_webhook(
    State(ctx): State<Arc<AppContext>>,
    deadline: Deadline,
    AuthenticatedUser(user): AuthenticatedUser,
    body: Result<Json<UploadedWebhookInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "webhook body rejected");
        AppError::Validation(FieldErrors::new())
    })?;

    input.validate().map_err(AppError::Validation)?;

    ctx.upload
        .uploaded_webhook(
            deadline,
            UploadedWebhookRequest {
                video_id: input.video_id,
                thumbnail_id: input.thumbnail_id,
                title: input.title,
                description: input.description,
            },
            &user.id.to_string(),
        )
        .await
        .map_err(|status| AppError::upstream(status, UploadedWebhookInput::FIELDS))?;

    Ok(Json(envelope(MSG_OK, json!({}))))
}
