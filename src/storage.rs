use axum::http::StatusCode;
use std::env;
use std::io;
use std::path::PathBuf;
use uuid::Uuid;

/// Uploads are capped at 2MB, checked before anything touches disk.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

pub const PRODUCT_IMAGES: &str = "product-images";
pub const PAYMENT_PROOFS: &str = "proofs";

pub fn base_dir() -> PathBuf {
    env::var("STORAGE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("public/storage"))
}

/// Checks the upload contract for image files: an `image/*` content type and
/// at most [`MAX_UPLOAD_BYTES`] of data. Returns the file extension to store
/// the blob under.
pub fn validate_image(
    content_type: Option<&str>,
    len: usize,
) -> Result<&'static str, (StatusCode, String)> {
    let content_type = content_type
        .ok_or((StatusCode::BAD_REQUEST, "file must be an image".to_owned()))?;

    let ext = match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other if other.starts_with("image/") => "img",
        _ => return Err((StatusCode::BAD_REQUEST, "file must be an image".to_owned())),
    };

    if len > MAX_UPLOAD_BYTES {
        return Err((
            StatusCode::BAD_REQUEST,
            "image must be 2MB or smaller".to_owned(),
        ));
    }

    Ok(ext)
}

/// Writes a blob under `{base}/{namespace}/{uuid}.{ext}` and returns the
/// relative path recorded on the owning row.
pub async fn store(namespace: &str, ext: &str, data: &[u8]) -> io::Result<String> {
    let rel = format!("{}/{}.{}", namespace, Uuid::new_v4(), ext);
    let path = base_dir().join(&rel);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, data).await?;

    Ok(rel)
}

/// Removes a stored blob. A missing file is not an error; the row it belonged
/// to may have been saved before the blob write ever happened.
pub async fn delete(rel: &str) -> io::Result<()> {
    match tokio::fs::remove_file(base_dir().join(rel)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Public URL for a stored blob, served by the `/storage` route.
pub fn public_url(rel: &str) -> String {
    format!("/storage/{}", rel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_image_types() {
        assert_eq!(validate_image(Some("image/jpeg"), 1024), Ok("jpg"));
        assert_eq!(validate_image(Some("image/png"), 1024), Ok("png"));
        assert_eq!(validate_image(Some("image/webp"), 1024), Ok("webp"));
        assert_eq!(validate_image(Some("image/heic"), 1024), Ok("img"));
    }

    #[test]
    fn rejects_non_images() {
        assert!(validate_image(Some("application/pdf"), 1024).is_err());
        assert!(validate_image(Some("text/html"), 1024).is_err());
        assert!(validate_image(None, 1024).is_err());
    }

    #[test]
    fn rejects_oversized_uploads() {
        assert!(validate_image(Some("image/png"), MAX_UPLOAD_BYTES).is_ok());
        assert!(validate_image(Some("image/png"), MAX_UPLOAD_BYTES + 1).is_err());
    }

    #[test]
    fn public_url_points_at_storage_route() {
        assert_eq!(
            public_url("proofs/abc.jpg"),
            "/storage/proofs/abc.jpg".to_owned()
        );
    }
}
