// src/utils/qr.rs

use std::path::PathBuf;

use async_trait::async_trait;
use qrcode::{QrCode, render::svg};
use url::Url;

use crate::error::AppError;

/// URL path prefix under which generated QR codes are served.
pub const QR_ROUTE: &str = "qr_codes";

/// Produces the retrievable artifact a guest receives after submitting.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Reference stored on the guest record. Known before rendering so it can
    /// be written in the submission transaction.
    fn artifact_path(&self, token: &str) -> String;

    /// Renders the artifact for `url` and returns its reference.
    async fn generate(&self, token: &str, url: &str) -> Result<String, AppError>;
}

/// Writes SVG QR codes into a directory served at [`QR_ROUTE`].
#[derive(Debug, Clone)]
pub struct SvgQrGenerator {
    dir: PathBuf,
}

impl SvgQrGenerator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactGenerator for SvgQrGenerator {
    fn artifact_path(&self, token: &str) -> String {
        format!("{}/{}.svg", QR_ROUTE, token)
    }

    async fn generate(&self, token: &str, url: &str) -> Result<String, AppError> {
        let image = render_svg(url)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(format!("{}.svg", token)), image).await?;

        Ok(self.artifact_path(token))
    }
}

/// Renders `url` as a standalone SVG QR code.
pub fn render_svg(url: &str) -> Result<String, AppError> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| AppError::InternalServerError(format!("QR encoding failed: {}", e)))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Link encoded into a guest's QR code: `<base>/answers/<token>`.
pub fn answers_url(base_url: &str, token: &str) -> Result<String, AppError> {
    join_base(base_url, &format!("answers/{}", token))
}

/// Admin login endpoint, for the QR code shown at the venue.
pub fn admin_login_url(base_url: &str) -> Result<String, AppError> {
    join_base(base_url, "api/admin/login")
}

fn join_base(base_url: &str, path: &str) -> Result<String, AppError> {
    let mut base = Url::parse(base_url)
        .map_err(|e| AppError::InternalServerError(format!("Invalid BASE_URL: {}", e)))?;

    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }

    base.join(path)
        .map(|url| url.to_string())
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_url() {
        assert_eq!(
            answers_url("http://192.168.1.20:5000", "abc").unwrap(),
            "http://192.168.1.20:5000/answers/abc"
        );
        assert_eq!(
            answers_url("https://example.org/sweepstake", "abc").unwrap(),
            "https://example.org/sweepstake/answers/abc"
        );
        assert!(answers_url("not a url", "abc").is_err());
    }

    #[test]
    fn test_admin_login_url() {
        assert_eq!(
            admin_login_url("http://192.168.1.20:5000/").unwrap(),
            "http://192.168.1.20:5000/api/admin/login"
        );
    }

    #[tokio::test]
    async fn test_svg_written_to_directory() {
        let dir = std::env::temp_dir().join(format!("qr-{}", uuid::Uuid::new_v4()));
        let generator = SvgQrGenerator::new(&dir);

        let path = generator
            .generate("tok123", "http://localhost:5000/answers/tok123")
            .await
            .unwrap();

        assert_eq!(path, "qr_codes/tok123.svg");
        let svg = std::fs::read_to_string(dir.join("tok123.svg")).unwrap();
        assert!(svg.contains("<svg"));
        std::fs::remove_dir_all(dir).ok();
    }
}
