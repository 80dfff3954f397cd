//! HTTP implementation of [`GeorefService`].

use std::time::Duration;

use reqwest::multipart;
use reqwest::{Client, RequestBuilder, Response};

use crate::config::{Endpoint, ServiceConfig};
use crate::error::{Result, ServiceError};
use crate::service::{Ack, GcpSubmission, GeorefService, ImagePayload, UploadReceipt};

/// Longest error body kept in [`ServiceError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Talks to the georeferencing service over HTTP with multipart bodies.
///
/// Requires a Tokio reactor on the calling thread.
#[derive(Debug, Clone)]
pub struct HttpGeorefService {
    client: Client,
    config: ServiceConfig,
}

impl HttpGeorefService {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ServiceError::ClientBuild)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<Response> {
        log::debug!("→ {} {}", endpoint, self.config.url(endpoint));

        let response = request
            .send()
            .await
            .map_err(|source| ServiceError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::status(
                endpoint,
                status.as_u16(),
                clip_body(body),
            ));
        }

        Ok(response)
    }

    async fn send_for_json(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<serde_json::Value> {
        let response = self.send(endpoint, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport { endpoint, source })?;

        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }

    fn post(&self, endpoint: Endpoint) -> RequestBuilder {
        self.client.post(self.config.url(endpoint))
    }
}

fn clip_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    body
}

impl GeorefService for HttpGeorefService {
    async fn upload_image(&self, image: ImagePayload<'_>) -> Result<UploadReceipt> {
        let endpoint = Endpoint::UploadImage;
        let part = multipart::Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.to_string())
            .mime_str(image.mime_type)
            .map_err(|source| ServiceError::InvalidRequest { endpoint, source })?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .send_for_json(endpoint, self.post(endpoint).multipart(form))
            .await?;
        log::info!("Image uploaded: {}", response);

        Ok(UploadReceipt { response })
    }

    async fn add_gcp(&self, gcp: &GcpSubmission) -> Result<Ack> {
        let endpoint = Endpoint::AddGcp;
        let form = multipart::Form::new()
            .text("x", gcp.x.to_string())
            .text("y", gcp.y.to_string())
            .text("lon", gcp.lon.to_string())
            .text("lat", gcp.lat.to_string());

        let response = self
            .send_for_json(endpoint, self.post(endpoint).multipart(form))
            .await?;
        log::debug!("GCP added: {}", response);

        Ok(Ack { response })
    }

    async fn georeference(&self) -> Result<Ack> {
        let endpoint = Endpoint::Georeference;
        let response = self.send_for_json(endpoint, self.post(endpoint)).await?;
        log::info!("Georeferencing complete: {}", response);

        Ok(Ack { response })
    }

    async fn fetch_result(&self) -> Result<Vec<u8>> {
        let endpoint = Endpoint::DownloadResult;
        let request = self.client.get(self.config.url(endpoint));
        let response = self.send(endpoint, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport { endpoint, source })?;

        log::info!("Downloaded georeferenced image ({} bytes)", bytes.len());
        Ok(bytes.to_vec())
    }

    fn result_url(&self) -> String {
        self.config.url(Endpoint::DownloadResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{Reply, TestServer};

    fn service_for(server: &TestServer) -> HttpGeorefService {
        HttpGeorefService::new(
            ServiceConfig::default()
                .with_base_url(server.base_url.clone())
                .with_timeout_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_upload_sends_file_part() {
        let server = TestServer::start(vec![Reply::json(r#"{"filename":"scan.png"}"#)]).await;
        let service = service_for(&server);

        let receipt = service
            .upload_image(ImagePayload {
                file_name: "scan.png",
                mime_type: "image/png",
                bytes: b"PNGDATA",
            })
            .await
            .unwrap();
        assert_eq!(receipt.response["filename"], "scan.png");

        let requests = server.requests().await;
        let upload = &requests[0];
        assert_eq!(upload.method, "POST");
        assert_eq!(upload.path, "/upload-image/");
        assert!(upload
            .content_type
            .as_deref()
            .unwrap()
            .starts_with("multipart/form-data"));
        let body = upload.body_text();
        assert!(body.contains(r#"name="file"; filename="scan.png""#));
        assert!(body.to_ascii_lowercase().contains("content-type: image/png"));
        assert_eq!(upload.form_field("file").as_deref(), Some("PNGDATA"));
    }

    #[tokio::test]
    async fn test_add_gcp_sends_text_fields() {
        let server = TestServer::start(vec![Reply::json("{}")]).await;
        let service = service_for(&server);

        let gcp = GcpSubmission {
            x: 12.5,
            y: 40.0,
            lon: -3.25,
            lat: 51.5,
        };
        service.add_gcp(&gcp).await.unwrap();

        let requests = server.requests().await;
        let sent = &requests[0];
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.path, "/add-gcp/");
        assert_eq!(sent.form_field("x").as_deref(), Some("12.5"));
        assert_eq!(sent.form_field("y").as_deref(), Some("40"));
        assert_eq!(sent.form_field("lon").as_deref(), Some("-3.25"));
        assert_eq!(sent.form_field("lat").as_deref(), Some("51.5"));
    }

    #[tokio::test]
    async fn test_trigger_and_fetch_routes() {
        let server = TestServer::start(vec![
            Reply::json(r#"{"status":"ok"}"#),
            Reply::bytes(b"GEOTIFF"),
        ])
        .await;
        let service = service_for(&server);

        let ack = service.georeference().await.unwrap();
        assert_eq!(ack.response["status"], "ok");
        assert_eq!(service.fetch_result().await.unwrap(), b"GEOTIFF");

        let requests = server.requests().await;
        let routes: Vec<(&str, &str)> = requests
            .iter()
            .map(|r| (r.method.as_str(), r.path.as_str()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("POST", "/georeference/"),
                ("GET", "/download-georeferenced-image/")
            ]
        );
    }

    #[tokio::test]
    async fn test_non_success_is_status_error() {
        let server = TestServer::start(vec![Reply::text(422, "lon out of range")]).await;
        let service = service_for(&server);

        let gcp = GcpSubmission {
            x: 1.0,
            y: 2.0,
            lon: 500.0,
            lat: 3.0,
        };
        match service.add_gcp(&gcp).await.unwrap_err() {
            ServiceError::Status {
                endpoint,
                status,
                body,
            } => {
                assert_eq!(endpoint, Endpoint::AddGcp);
                assert_eq!(status, 422);
                assert_eq!(body, "lon out of range");
            }
            other => panic!("unexpected {:?}", other),
        }
        server.requests().await;
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = TestServer::start(vec![Reply::text(200, "<html>oops</html>")]).await;
        let service = service_for(&server);

        let err = service.georeference().await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Decode {
                endpoint: Endpoint::Georeference,
                ..
            }
        ));
        server.requests().await;
    }

    #[tokio::test]
    async fn test_bad_mime_type_sends_nothing() {
        let server = TestServer::start(Vec::new()).await;
        let service = service_for(&server);

        let err = service
            .upload_image(ImagePayload {
                file_name: "scan.png",
                mime_type: "not a mime type",
                bytes: b"PNGDATA",
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidRequest {
                endpoint: Endpoint::UploadImage,
                ..
            }
        ));
        assert!(server.requests().await.is_empty());
    }

    #[test]
    fn test_result_url_follows_config() {
        let service =
            HttpGeorefService::new(ServiceConfig::default().with_base_url("http://geo.local:8080"))
                .unwrap();
        assert_eq!(
            service.result_url(),
            "http://geo.local:8080/download-georeferenced-image/"
        );
    }

    #[test]
    fn test_clip_body_respects_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let clipped = clip_body(body);
        assert!(clipped.len() <= MAX_ERROR_BODY);
        assert!(clipped.chars().all(|c| c == 'é'));
    }
}
