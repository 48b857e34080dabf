//! 미디어 호스트 어댑터
//!
//! 로컬 파일을 외부 미디어 호스트(Cloudinary)에 업로드하고 영구 URL을
//! 받아오는 어댑터입니다. 업로드 실패는 "결과 없음"(`None`)으로
//! 표현되며, 임시 파일의 정리는 호출자의 책임입니다.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::MediaConfig;
use crate::errors::errors::{AppResult, ErrorContext};

/// 업로드 결과
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    /// 영구 접근 가능한 URL
    pub url: String,
    /// 미디어 호스트 측 식별자
    pub public_id: String,
}

/// 미디어 호스트 경계
///
/// 세션 수명주기 테스트에서 가짜 구현으로 대체할 수 있도록
/// trait으로 추상화합니다.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// 로컬 파일을 업로드하고 영구 URL을 반환합니다.
    ///
    /// 미디어 호스트가 결과를 돌려주지 않으면 `Ok(None)`을 반환합니다.
    /// 임시 파일은 호출자가 정리해야 합니다.
    async fn upload(&self, local_path: &Path) -> AppResult<Option<UploadedMedia>>;
}

/// Cloudinary 업로드 응답
#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
    public_id: String,
}

/// Cloudinary 미디어 호스트 클라이언트
///
/// 서명된 업로드 API를 사용합니다. 서명은 업로드 파라미터와
/// API 시크릿의 SHA-256 해시로 생성됩니다.
pub struct CloudinaryClient {
    config: MediaConfig,
    http: reqwest::Client,
}

impl CloudinaryClient {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn upload_endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.config.cloud_name
        )
    }

    /// 업로드 요청 서명 생성
    ///
    /// 서명 대상 문자열은 정렬된 파라미터 뒤에 API 시크릿을 붙인
    /// 형태입니다. 여기서는 timestamp 하나만 서명 대상입니다.
    fn sign(&self, timestamp: i64) -> String {
        let to_sign = format!("timestamp={}{}", timestamp, self.config.api_secret);
        format!("{:x}", Sha256::digest(to_sign.as_bytes()))
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, local_path: &Path) -> AppResult<Option<UploadedMedia>> {
        let file_bytes =
            std::fs::read(local_path).context("업로드할 파일을 읽을 수 없습니다")?;

        let file_name = local_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(timestamp);

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(file_bytes).file_name(file_name),
            )
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = match self
            .http
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("미디어 호스트 요청 실패: {}", e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            log::warn!("미디어 호스트 업로드 거부: HTTP {}", response.status());
            return Ok(None);
        }

        match response.json::<CloudinaryUploadResponse>().await {
            Ok(uploaded) => {
                log::info!("미디어 업로드 성공: {}", uploaded.public_id);
                Ok(Some(UploadedMedia {
                    url: uploaded.secure_url,
                    public_id: uploaded.public_id,
                }))
            }
            Err(e) => {
                log::warn!("미디어 호스트 응답 파싱 실패: {}", e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_deterministic_sha256_hex() {
        let client = CloudinaryClient::new(MediaConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        });

        let first = client.sign(1_700_000_000);
        let second = client.sign(1_700_000_000);

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_upload_endpoint_contains_cloud_name() {
        let client = CloudinaryClient::new(MediaConfig {
            cloud_name: "my-cloud".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        });

        assert_eq!(
            client.upload_endpoint(),
            "https://api.cloudinary.com/v1_1/my-cloud/auto/upload"
        );
    }
}
