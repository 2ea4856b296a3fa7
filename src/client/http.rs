//! Backend talking to a paste server's JSON API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;
use urlencoding::encode;

use super::{Backend, ClientError};
use crate::types::api::{
    CreatePaste, CreatedPaste, ListQuery, PasteSummary, PasteView, ViewCount, DELETE_KEY_HEADER,
    PASSWORD_HEADER,
};

const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    server: String,
}

impl HttpBackend {
    pub fn new(server: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(TIMEOUT).build()?;
        let mut server = server.into();
        while server.ends_with('/') {
            server.pop();
        }
        Ok(HttpBackend { client, server })
    }

    fn paste_url(&self, id: &str, action: Option<&str>) -> String {
        let mut url = format!("{}/api/pastes/{}", self.server, encode(id));
        if let Some(action) = action {
            url.push('/');
            url.push_str(action);
        }
        url
    }

    async fn send(
        &self,
        request: RequestBuilder,
        password: Option<&str>,
        forbidden: fn(String) -> ClientError,
    ) -> Result<Response, ClientError> {
        let request = match password.filter(|p| !p.is_empty()) {
            Some(password) => request.header(PASSWORD_HEADER, password),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        debug!(%status, %message, "request rejected");
        Err(match status {
            StatusCode::NOT_FOUND => ClientError::NotFound,
            StatusCode::GONE => ClientError::Expired,
            StatusCode::UNAUTHORIZED => ClientError::PasswordRequired,
            StatusCode::FORBIDDEN => forbidden(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            status if status.is_client_error() => ClientError::Rejected(message),
            _ => ClientError::Storage(message),
        })
    }
}

fn wrong_password(_: String) -> ClientError {
    ClientError::WrongPassword
}

impl Backend for HttpBackend {
    async fn create(&self, request: CreatePaste) -> Result<CreatedPaste, ClientError> {
        let request = self
            .client
            .post(format!("{}/api/pastes", self.server))
            .json(&request);
        Ok(self
            .send(request, None, ClientError::Rejected)
            .await?
            .json()
            .await?)
    }

    async fn open(&self, id: &str, password: Option<&str>) -> Result<PasteView, ClientError> {
        let request = self.client.get(self.paste_url(id, None));
        Ok(self
            .send(request, password, wrong_password)
            .await?
            .json()
            .await?)
    }

    async fn record_view(&self, id: &str, password: Option<&str>) -> Result<i64, ClientError> {
        let request = self.client.post(self.paste_url(id, Some("views")));
        let count: ViewCount = self
            .send(request, password, wrong_password)
            .await?
            .json()
            .await?;
        Ok(count.views)
    }

    async fn burn(&self, id: &str, password: Option<&str>) -> Result<(), ClientError> {
        let request = self.client.post(self.paste_url(id, Some("burn")));
        self.send(request, password, wrong_password).await?;
        Ok(())
    }

    async fn delete(&self, id: &str, delete_key: &str) -> Result<(), ClientError> {
        let request = self
            .client
            .delete(self.paste_url(id, None))
            .header(DELETE_KEY_HEADER, delete_key);
        self.send(request, None, ClientError::Rejected).await?;
        Ok(())
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<PasteSummary>, ClientError> {
        let request = self
            .client
            .get(format!("{}/api/pastes", self.server))
            .query(&query);
        Ok(self
            .send(request, None, ClientError::Rejected)
            .await?
            .json()
            .await?)
    }
}
