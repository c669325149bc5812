//! HTTP client for the CodeWithChat API.
//!
//! Every request reads the token from [`LocalStorage`] at send time, so a login
//! or logout takes effect on the very next call.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::ClientError;
use crate::models::{
    AuthResponse, CreateProjectResponse, ErrorBody, MessageResponse, ProfileResponse, Project,
    ProjectsResponse, RegisterForm, User,
};
use crate::storage::{LocalStorage, TOKEN_KEY};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Anything that can resolve the current user from the backend.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self) -> Result<User, ClientError>;
}

/// Maps a file extension to an image MIME type.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn LocalStorage>,
}

impl ApiClient {
    pub fn new(base_url: &str, storage: Arc<dyn LocalStorage>) -> Result<Self, ClientError> {
        // A trailing slash keeps `Url::join` from replacing the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            ClientError::InvalidInput(format!("Invalid API URL {}: {}", base_url, e))
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            storage,
        })
    }

    /// Builds a request, attaching the stored bearer token when there is one.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidInput(format!("Invalid path {}: {}", path, e)))?;

        let builder = self.http.request(method, url);
        Ok(match self.storage.get_item(TOKEN_KEY)? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(text);
        debug!("API error {}: {}", status, message);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// POST /users/register as multipart form data.
    pub async fn register(&self, form: &RegisterForm) -> Result<AuthResponse, ClientError> {
        let mut body = multipart::Form::new()
            .text("name", form.name.clone())
            .text("email", form.email.clone())
            .text("password", form.password.clone());

        if let Some(path) = &form.profile_pic {
            let mime = image_mime(path)
                .ok_or_else(|| ClientError::InvalidInput("Only image files allowed".to_string()))?;
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "profile".to_string());
            let part = multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(mime)?;
            body = body.part("profilePic", part);
        }

        // No explicit content type: the multipart encoder sets the boundary.
        let response = self
            .request(Method::POST, "users/register")?
            .multipart(body)
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let response = self
            .request(Method::POST, "users/login")?
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn profile(&self) -> Result<User, ClientError> {
        let response = self.request(Method::GET, "users/profile")?.send().await?;
        Ok(Self::read::<ProfileResponse>(response).await?.user)
    }

    pub async fn logout(&self) -> Result<String, ClientError> {
        let response = self.request(Method::POST, "users/logout")?.send().await?;
        Ok(Self::read::<MessageResponse>(response).await?.message)
    }

    pub async fn create_project(&self, name: &str) -> Result<Project, ClientError> {
        let response = self
            .request(Method::POST, "projects/create")?
            .json(&json!({ "name": name }))
            .send()
            .await?;
        Ok(Self::read::<CreateProjectResponse>(response).await?.project)
    }

    pub async fn all_projects(&self) -> Result<Vec<Project>, ClientError> {
        let response = self.request(Method::GET, "projects/all")?.send().await?;
        Ok(Self::read::<ProjectsResponse>(response).await?.projects)
    }
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn fetch_profile(&self) -> Result<User, ClientError> {
        self.profile().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::path::PathBuf;

    fn client(base: &str) -> (ApiClient, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (ApiClient::new(base, storage.clone()).unwrap(), storage)
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(&PathBuf::from("me.PNG")), Some("image/png"));
        assert_eq!(image_mime(&PathBuf::from("me.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(&PathBuf::from("notes.txt")), None);
        assert_eq!(image_mime(&PathBuf::from("noext")), None);
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let (client, _) = client("http://localhost:3000/api");
        let request = client
            .request(Method::GET, "/projects/all")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:3000/api/projects/all");
    }

    #[test]
    fn test_bearer_header_follows_storage() {
        let (client, storage) = client(DEFAULT_BASE_URL);

        let request = client.request(Method::GET, "users/profile").unwrap().build().unwrap();
        assert!(request.headers().get("authorization").is_none());

        storage.set_item(TOKEN_KEY, "abc").unwrap();
        let request = client.request(Method::GET, "users/profile").unwrap().build().unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer abc");

        storage.remove_item(TOKEN_KEY).unwrap();
        let request = client.request(Method::GET, "users/profile").unwrap().build().unwrap();
        assert!(request.headers().get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_non_image_before_sending() {
        // Nothing listens on this port; the check must fail first.
        let (client, _) = client("http://127.0.0.1:9/");
        let form = RegisterForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            profile_pic: Some(PathBuf::from("resume.pdf")),
        };

        let err = client.register(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "Only image files allowed");
    }
}
