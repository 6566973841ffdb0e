use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use bytes::Bytes;
use fl_ledger::{LedgerReader, LedgerWriter};
use fl_likes::{LikeResult, PayoutOutcome};
use fl_types::{Address, MediaType, PostId, PostRecord, PublicKey};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub error: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UploadBody {
    pub status: bool,
    pub metadata_hash: Address,
}

#[derive(Debug, Serialize)]
pub struct AddressBody {
    pub address: Address,
}

#[derive(Debug, Serialize)]
pub struct LikeBody {
    pub status: bool,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    #[serde(default)]
    pub user_address: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(default)]
    pub user_address: String,
    #[serde(default)]
    pub image_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub public_key: String,
    pub id: String,
    pub count: i64,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| ServerError::validation(e.body_text()))
}

/// Liveness probe.
pub async fn ping() -> &'static str {
    "."
}

pub async fn check() -> (StatusCode, Json<StatusBody>) {
    (
        StatusCode::ACCEPTED,
        Json(StatusBody {
            error: false,
            message: "Hit the service",
        }),
    )
}

/// Address of the current ledger snapshot.
pub async fn current_address(State(state): State<AppState>) -> ServerResult<Json<AddressBody>> {
    let address = state.ledger.current_address().await?;
    Ok(Json(AddressBody { address }))
}

pub async fn posts_by_author(
    State(state): State<AppState>,
    body: Result<Json<AuthorQuery>, JsonRejection>,
) -> ServerResult<Json<Vec<PostRecord>>> {
    let query = json_body(body)?;
    Ok(Json(state.ledger.get_by_author(&query.user_address).await?))
}

pub async fn posts_by_image(
    State(state): State<AppState>,
    body: Result<Json<ImageQuery>, JsonRejection>,
) -> ServerResult<Json<Vec<PostRecord>>> {
    let query = json_body(body)?;
    let posts = state
        .ledger
        .get_by_id_and_image(&query.user_address, &query.image_hash)
        .await?;
    Ok(Json(posts))
}

pub async fn add_like(
    State(state): State<AppState>,
    body: Result<Json<LikeRequest>, JsonRejection>,
) -> ServerResult<Json<LikeBody>> {
    let request = json_body(body)?;
    let liker = PublicKey::new(request.public_key)
        .map_err(|_| ServerError::validation("public_key is required"))?;
    let post_id =
        PostId::new(request.id).map_err(|_| ServerError::validation("id is required"))?;

    let body = match state.likes.apply_like(post_id, liker, request.count).await? {
        LikeResult::Applied {
            payout: PayoutOutcome::Failed(e),
            ..
        } => return Err(e.into()),
        LikeResult::Applied { .. } if request.count > 0 => LikeBody {
            status: true,
            message: "like added !",
        },
        LikeResult::Applied { .. } => LikeBody {
            status: true,
            message: "like removed !",
        },
        LikeResult::AlreadyLiked { .. } => LikeBody {
            status: false,
            message: "user has already liked the post!",
        },
        LikeResult::Unchanged { .. } => LikeBody {
            status: false,
            message: "user has not liked the post!",
        },
    };
    Ok(Json(body))
}

/// Fields collected from an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    user_address: Option<String>,
    media_type: Option<String>,
    desc: Option<String>,
    /// File name and contents.
    image: Option<(String, Bytes)>,
}

struct ValidUpload {
    author: PublicKey,
    media_type: MediaType,
    description: String,
    image: Option<(String, Bytes)>,
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::validation("upload exceeds the size limit")
    } else {
        ServerError::validation(e.body_text())
    }
}

impl UploadForm {
    async fn read(multipart: &mut Multipart) -> ServerResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "user_address" => {
                    form.user_address = Some(field.text().await.map_err(multipart_error)?)
                }
                "media_type" => {
                    form.media_type = Some(field.text().await.map_err(multipart_error)?)
                }
                "desc" => form.desc = Some(field.text().await.map_err(multipart_error)?),
                "image" => {
                    let file_name = field.file_name().unwrap_or("image").to_string();
                    let data = field.bytes().await.map_err(multipart_error)?;
                    if !data.is_empty() {
                        form.image = Some((file_name, data));
                    }
                }
                other => debug!(field = other, "ignoring upload field"),
            }
        }
        Ok(form)
    }

    fn validate(self) -> ServerResult<ValidUpload> {
        let author = self
            .user_address
            .and_then(|a| PublicKey::new(a.trim()).ok())
            .ok_or_else(|| ServerError::validation("Invalid user address"))?;
        let media_type: MediaType = self
            .media_type
            .as_deref()
            .map(str::trim)
            .and_then(|m| m.parse().ok())
            .ok_or_else(|| ServerError::validation("Invalid media type"))?;
        let description = self.desc.unwrap_or_default();
        if self.image.is_none() && description.is_empty() {
            return Err(ServerError::validation(
                "Request must contain either media or text",
            ));
        }
        Ok(ValidUpload {
            author,
            media_type,
            description,
            image: self.image,
        })
    }
}

/// Create a post from a multipart form.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Json<UploadBody>> {
    let mut multipart = multipart.map_err(|e| ServerError::validation(e.body_text()))?;
    let upload = UploadForm::read(&mut multipart).await?.validate()?;

    let image_ref = match &upload.image {
        Some((_, data)) => {
            let address = state.images.put(data.clone()).await?;
            Some(format!("{}{}", state.image_url_prefix, address))
        }
        None => None,
    };

    let record = PostRecord::new(
        PostId::generate(),
        upload.author.clone(),
        upload.description,
        upload.media_type,
        image_ref,
    );
    let metadata_hash = state.ledger.append_record(record).await?;

    if let (Some(mirror), Some((file_name, data))) = (&state.mirror, upload.image) {
        mirror.spawn(data, file_name, upload.author.to_string());
    }

    Ok(Json(UploadBody {
        status: true,
        metadata_hash,
    }))
}
