// Async HTTP client for the taskdeck backend.
//
// Wraps `reqwest::Client` with URL construction, `{ data }` envelope
// unwrapping, and error mapping. One method per endpoint; every method is
// exactly one round trip with no retries and no caching.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    Ack, CreateTodoRequest, DataEnvelope, DeleteTodoRequest, ImprovementRequest, ItemId, Position,
    TodoItem, UpdateTodoRequest, UploadFile,
};
use crate::transport::TransportConfig;

/// Multipart field name the backend reads the uploaded document from.
const RESUME_FIELD: &str = "resume";

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the todo and resume endpoints.
///
/// Holds no per-request state: cloning is cheap and every call is
/// independent of every other.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RemoteClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client with its own `reqwest::Client` from a transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The backend base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the base path ends in `/` so relative joins append
    /// instead of replacing the last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn todo_url(&self, id: &ItemId) -> Result<Url, Error> {
        let mut url = self.url("todo")?;
        url.path_segments_mut()
            .map_err(|()| Error::Client(format!("base URL cannot have paths: {}", self.base_url)))?
            .push(&id.to_string());
        Ok(url)
    }

    // ── Todos ────────────────────────────────────────────────────────

    /// `GET /todo`: the full collection in server order.
    pub async fn list_todos(&self) -> Result<Vec<TodoItem>, Error> {
        let url = self.url("todo")?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let envelope: DataEnvelope<Vec<TodoItem>> = self.handle_response(resp).await?;
        Ok(envelope.data)
    }

    /// `POST /todo`: create an item. The server assigns its id.
    pub async fn create_todo(&self, text: &str) -> Result<Ack, Error> {
        let url = self.url("todo")?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(&CreateTodoRequest { item: text })
            .send()
            .await?;
        self.handle_ack(resp).await
    }

    /// `PUT /todo/{id}`: replace an item's text.
    pub async fn update_todo(&self, id: &ItemId, text: &str) -> Result<Ack, Error> {
        let url = self.todo_url(id)?;
        debug!("PUT {url}");

        self.send_ack(self.http.put(url), &UpdateTodoRequest { item: text })
            .await
    }

    /// `DELETE /todo/{id}`.
    pub async fn delete_todo(&self, id: &ItemId) -> Result<Ack, Error> {
        let url = self.todo_url(id)?;
        debug!("DELETE {url}");

        self.send_ack(self.http.delete(url), &DeleteTodoRequest { id })
            .await
    }

    // ── Resume ───────────────────────────────────────────────────────

    /// `POST /resume/highlights`: upload a document as multipart field
    /// `resume` and receive the positions extracted from it.
    pub async fn upload_resume(&self, file: &UploadFile) -> Result<Vec<Position>, Error> {
        let url = self.url("resume/highlights")?;
        debug!(file = %file.file_name, bytes = file.content.len(), "POST {url}");

        let part = Part::bytes(file.content.to_vec()).file_name(file.file_name.clone());
        let form = Form::new().part(RESUME_FIELD, part);

        let resp = self.http.post(url).multipart(form).send().await?;
        let envelope: DataEnvelope<Vec<Position>> = self.handle_response(resp).await?;
        Ok(envelope.data)
    }

    /// `POST /resume/improvement`: suggestions for a single highlight line.
    pub async fn improve_highlight(&self, highlight: &str) -> Result<Vec<String>, Error> {
        let url = self.url("resume/improvement")?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(&ImprovementRequest { highlight })
            .send()
            .await?;
        let envelope: DataEnvelope<Vec<String>> = self.handle_response(resp).await?;
        Ok(envelope.data)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn send_ack<B: Serialize + Sync>(
        &self,
        builder: reqwest::RequestBuilder,
        body: &B,
    ) -> Result<Ack, Error> {
        let resp = builder.json(body).send().await?;
        self.handle_ack(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            decode(&body)
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    /// Writes only need a 2xx. An empty body is still a valid acknowledgement.
    async fn handle_ack(&self, resp: reqwest::Response) -> Result<Ack, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(Ack::default());
        }
        let envelope: DataEnvelope<serde_json::Value> = decode(&body)?;
        Ok(Ack::from_value(&envelope.data))
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&raw)
            .ok()
            .and_then(|v| {
                v.get("detail")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str().map(String::from))
            })
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                }
            });

        Error::Server {
            status: status.as_u16(),
            message,
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}
