//! Firestore Store Module
//!
//! Student collection backed by Cloud Firestore through its REST API.

mod value;

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::FirestoreSettings;
use crate::error::{StoreError, StoreResult};
use crate::models::{StudentFields, StudentRecord, STUDENT_FIELD_NAMES};
use crate::store::StudentStore;

/// Documents requested per list page.
const LIST_PAGE_SIZE: u32 = 300;

/// Start of the message Firestore sends when a precondition finds no document.
/// Other 404s (unknown project or database) carry different text.
const MISSING_DOCUMENT_PREFIX: &str = "No document to update";

// == Wire Types ==
/// A document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct Document {
    /// Full resource name, ending in the document id
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl Document {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    /// Decodes the document, keeping every stored field.
    fn into_record(self) -> StoreResult<StudentRecord> {
        let data = value::decode_fields(&self.fields)?;
        Ok(StudentRecord::new(self.id(), data))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct WriteBody {
    fields: Map<String, Value>,
}

impl WriteBody {
    fn from_fields(fields: &StudentFields) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, value)| (name.to_string(), value::encode(value)))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    message: String,
}

// == Firestore Store ==
/// A Firestore collection reached over HTTPS.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Client,
    collection_url: Url,
    api_key: Option<String>,
}

impl fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("collection_url", &self.collection_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FirestoreStore {
    // == Constructor ==
    /// Creates a store for `collection` with its own HTTP client.
    ///
    /// `collection` may be a nested path such as `schools/abc/students`.
    pub fn new(settings: &FirestoreSettings, collection: &str) -> StoreResult<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, settings, collection)
    }

    /// Creates a store sharing an existing HTTP client.
    pub fn with_client(
        client: Client,
        settings: &FirestoreSettings,
        collection: &str,
    ) -> StoreResult<Self> {
        let mut collection_url = Url::parse(&settings.base_url).map_err(|err| {
            StoreError::Unavailable(format!(
                "invalid firestore base url {:?}: {err}",
                settings.base_url
            ))
        })?;

        {
            let mut segments = collection_url.path_segments_mut().map_err(|_| {
                StoreError::Unavailable(format!(
                    "firestore base url cannot hold a path: {}",
                    settings.base_url
                ))
            })?;
            segments.pop_if_empty().extend([
                "projects",
                settings.project_id.as_str(),
                "databases",
                settings.database.as_str(),
                "documents",
            ]);
            segments.extend(collection.split('/').filter(|part| !part.is_empty()));
        }

        Ok(Self {
            client,
            collection_url,
            api_key: settings.api_key.clone(),
        })
    }

    /// URL of the collection every call is made against.
    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    fn document_url(&self, id: &str) -> StoreResult<Url> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(StoreError::InvalidId(id.to_string()));
        }

        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidId(id.to_string()))?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.query(&[("key", key)]),
            None => builder,
        }
    }
}

/// Turns a non-success response into a [`StoreError::Backend`].
async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(StoreError::Backend {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| StoreError::Decode(err.to_string()))
}

#[async_trait]
impl StudentStore for FirestoreStore {
    async fn list(&self) -> StoreResult<Vec<StudentRecord>> {
        let mut students = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, self.collection_url.clone())
                .query(&[("pageSize", LIST_PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: ListDocumentsResponse = read_json(check(request.send().await?).await?).await?;
            for document in page.documents {
                students.push(document.into_record()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = students.len(), "listed firestore documents");
        Ok(students)
    }

    async fn insert(&self, fields: StudentFields) -> StoreResult<String> {
        let response = self
            .request(Method::POST, self.collection_url.clone())
            .json(&WriteBody::from_fields(&fields))
            .send()
            .await?;

        let document: Document = read_json(check(response).await?).await?;
        let id = document.id().to_string();
        if id.is_empty() {
            return Err(StoreError::Decode(format!(
                "created document has no id: {:?}",
                document.name
            )));
        }

        debug!(id = %id, "firestore document created");
        Ok(id)
    }

    async fn update_by_id(&self, id: &str, fields: StudentFields) -> StoreResult<()> {
        let mask: Vec<(&str, &str)> = STUDENT_FIELD_NAMES
            .iter()
            .map(|name| ("updateMask.fieldPaths", *name))
            .collect();

        let response = self
            .request(Method::PATCH, self.document_url(id)?)
            .query(&mask)
            .query(&[("currentDocument.exists", "true")])
            .json(&WriteBody::from_fields(&fields))
            .send()
            .await?;

        if let Err(err) = check(response).await {
            return Err(match err {
                StoreError::Backend { status, message }
                    if status == StatusCode::NOT_FOUND.as_u16()
                        && message.starts_with(MISSING_DOCUMENT_PREFIX) =>
                {
                    StoreError::NotFound(id.to_string())
                }
                StoreError::Backend { status, message }
                    if status == StatusCode::NOT_FOUND.as_u16() =>
                {
                    warn!(id = %id, message = %message, "firestore 404 is not a missing document");
                    StoreError::Backend { status, message }
                }
                other => other,
            });
        }

        debug!(id = %id, "firestore document updated");
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let response = self
            .request(Method::DELETE, self.document_url(id)?)
            .send()
            .await?;
        check(response).await?;

        debug!(id = %id, "firestore document deleted");
        Ok(())
    }
}
