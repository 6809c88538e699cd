use std::io::ErrorKind;
use std::path::{Component, Path};

use actix_web::{web, HttpResponse};

use crate::error::{AppError, Result};
use crate::state::AppState;

const IMAGE_EXTENSION: &str = "png";

/// True when `name` is a single plain path component inside the image directory.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Plain `.png` names only; staging files such as `moon.png.part` are never served.
fn is_servable_image(name: &str) -> bool {
    is_plain_file_name(name)
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == IMAGE_EXTENSION)
}

/// Serves a cached image from the image directory.
pub async fn handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let filename = path.into_inner();
    if !is_servable_image(&filename) {
        log::warn!("Rejected image request for '{}'", filename);
        return Err(AppError::InvalidImageName(filename));
    }

    let file_path = state.image_dir().join(&filename);
    let bytes = match tokio::fs::read(&file_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::ImageNotFound(filename));
        }
        Err(e) => return Err(e.into()),
    };

    log::debug!("Serving {} ({} bytes)", file_path.display(), bytes.len());
    Ok(HttpResponse::Ok().content_type("image/png").body(bytes))
}
