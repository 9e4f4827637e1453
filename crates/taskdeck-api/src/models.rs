// Wire types for the taskdeck REST backend.
//
// Every JSON response is wrapped as `{ "data": ... }`. Field names follow
// the backend exactly (`item` for the todo text, camelCase for positions).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ── Envelope ────────────────────────────────────────────────────────

/// `{ "data": T }` envelope used by every JSON endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// ── Identifiers ─────────────────────────────────────────────────────

/// Server-assigned todo identifier.
///
/// Opaque to the client: the backend may hand out integers or strings,
/// and whichever it sent is echoed back verbatim in paths and bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(s.to_owned()),
        }
    }
}

// ── Todos ───────────────────────────────────────────────────────────

/// One todo as returned by `GET /todo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: ItemId,
    pub item: String,
}

/// Body for `POST /todo`. Carries no id: identifiers are server-assigned.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTodoRequest<'a> {
    pub item: &'a str,
}

/// Body for `PUT /todo/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateTodoRequest<'a> {
    pub item: &'a str,
}

/// Body for `DELETE /todo/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteTodoRequest<'a> {
    pub id: &'a ItemId,
}

/// Acknowledgement of a write.
///
/// The backend puts a human-readable confirmation in `data`, sometimes as
/// a string and sometimes as a one-element array. Neither is load-bearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

impl Ack {
    pub(crate) fn from_value(value: &serde_json::Value) -> Self {
        let message = match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(parts) => {
                let texts: Vec<&str> = parts.iter().filter_map(|p| p.as_str()).collect();
                if texts.is_empty() {
                    None
                } else {
                    Some(texts.join("; "))
                }
            }
            _ => None,
        };
        Self { message }
    }
}

// ── Resume ──────────────────────────────────────────────────────────

/// One employment position extracted from an uploaded resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub title: String,
    #[serde(default)]
    pub employer_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// Body for `POST /resume/improvement`.
#[derive(Debug, Clone, Serialize)]
pub struct ImprovementRequest<'a> {
    pub highlight: &'a str,
}

/// A document to send as the `resume` multipart field.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Read a document from disk, keeping only its file name for the upload.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "resume".into(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, content))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_id_accepts_numbers_and_strings() {
        let items: Vec<TodoItem> = serde_json::from_value(json!([
            { "id": 1, "item": "Read a book." },
            { "id": "a7f", "item": "Cycle around town." }
        ]))
        .unwrap();
        assert_eq!(items[0].id, ItemId::Number(1));
        assert_eq!(items[1].id, ItemId::Text("a7f".into()));
    }

    #[test]
    fn item_id_round_trips_its_original_form() {
        assert_eq!(serde_json::to_value(ItemId::Number(7)).unwrap(), json!(7));
        assert_eq!(
            serde_json::to_value(ItemId::Text("x1".into())).unwrap(),
            json!("x1")
        );
    }

    #[test]
    fn item_id_from_str_prefers_numbers() {
        assert_eq!("42".parse::<ItemId>().unwrap(), ItemId::Number(42));
        assert_eq!(
            "abc".parse::<ItemId>().unwrap(),
            ItemId::Text("abc".into())
        );
        assert_eq!(ItemId::from("9").to_string(), "9");
    }

    #[test]
    fn item_id_parse_and_from_agree() {
        for s in ["0", "-3", "42", "4 2", "abc", "", "99999999999999999999"] {
            assert_eq!(s.parse::<ItemId>().unwrap(), ItemId::from(s), "{s:?}");
        }
        assert_eq!(
            ItemId::from("99999999999999999999"),
            ItemId::Text("99999999999999999999".into())
        );
    }

    #[test]
    fn create_request_has_no_id() {
        let body = serde_json::to_value(CreateTodoRequest { item: "buy milk" }).unwrap();
        assert_eq!(body, json!({ "item": "buy milk" }));
    }

    #[test]
    fn ack_reads_string_and_array_payloads() {
        assert_eq!(
            Ack::from_value(&json!("Todo with id 1 has been updated.")).message,
            Some("Todo with id 1 has been updated.".into())
        );
        assert_eq!(
            Ack::from_value(&json!(["To-do added."])).message,
            Some("To-do added.".into())
        );
        assert_eq!(Ack::from_value(&json!({})), Ack::default());
    }

    #[test]
    fn position_tolerates_missing_metadata() {
        let pos: Position = serde_json::from_value(json!({
            "title": "Engineer",
            "highlights": ["Shipped the thing on time"]
        }))
        .unwrap();
        assert_eq!(pos.employer_name, None);
        assert_eq!(pos.highlights.len(), 1);
    }

    #[test]
    fn position_reads_camel_case_fields() {
        let pos: Position = serde_json::from_value(json!({
            "title": "Engineer",
            "employerName": "Acme",
            "startDate": "2019-01",
            "endDate": "2021-06",
            "highlights": []
        }))
        .unwrap();
        assert_eq!(pos.employer_name.as_deref(), Some("Acme"));
        assert_eq!(pos.start_date.as_deref(), Some("2019-01"));
        assert_eq!(pos.end_date.as_deref(), Some("2021-06"));
    }
}
