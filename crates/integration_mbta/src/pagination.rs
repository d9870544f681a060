//! JSON:API pagination
//!
//! List endpoints answer with `{"data": [...], "links": {"next": "..."}}`.
//! [`fetch_all`] requests the first page with the largest page size the server
//! will honour, then follows `links.next` until it disappears, mapping every
//! record along the way. The next link already carries every parameter the
//! server needs, so follow-up requests add nothing to it.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::MbtaError;
use crate::mapper::{Record, lenient, lenient_or_default};

/// Query parameters as owned key/value pairs
pub type QueryParams = Vec<(String, String)>;

/// Top-level response document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Array of records for list endpoints, a single record for item endpoints
    pub data: Value,
    /// Pagination links
    #[serde(deserialize_with = "lenient_or_default")]
    pub links: Links,
}

/// Pagination links of a [`Document`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Links {
    /// Absolute URL of the next page, absent on the last page
    #[serde(deserialize_with = "lenient")]
    pub next: Option<String>,
}

impl Document {
    /// Decode a response body
    ///
    /// The top level must be a JSON object. Arrays and scalars are rejected
    /// rather than being read positionally into the document fields.
    ///
    /// # Errors
    ///
    /// Returns [`MbtaError::ParseError`] for invalid JSON or a non-object body.
    pub fn parse(body: &str) -> Result<Self, MbtaError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| MbtaError::ParseError(e.to_string()))?;
        if !value.is_object() {
            return Err(MbtaError::ParseError(
                "response body is not a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| MbtaError::ParseError(e.to_string()))
    }

    /// Link to the next page, ignoring empty strings
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.links.next.as_deref().filter(|link| !link.is_empty())
    }

    /// Raw records carried by this page
    ///
    /// A missing or `null` `data` member is an empty page; a single object is
    /// treated as a one-record page.
    #[must_use]
    pub fn into_records(self) -> Vec<Value> {
        match self.data {
            Value::Array(records) => records,
            Value::Null => Vec::new(),
            record => vec![record],
        }
    }
}

/// Something that can fetch one decoded page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// GET `url` with `params` appended and decode the body
    ///
    /// Implementations attach credentials and headers and must reject any
    /// non-success status with [`MbtaError::UnexpectedServerResponse`].
    async fn fetch_page(&self, url: &str, params: &[(String, String)])
    -> Result<Document, MbtaError>;
}

/// Fetch every page of a list endpoint and map all records in server order
///
/// The first request carries `params` plus `page[limit]`/`page[offset]`;
/// follow-up requests use the `links.next` URL as-is. Any failing page aborts
/// the whole call and nothing collected so far is returned.
///
/// # Errors
///
/// Returns the first error reported by `source`.
pub async fn fetch_all<S, A, T, F>(
    source: &S,
    url: &str,
    params: QueryParams,
    page_limit: u32,
    mapper: F,
) -> Result<Vec<T>, MbtaError>
where
    S: PageSource + ?Sized,
    A: DeserializeOwned + Default,
    F: Fn(Record<A>) -> T,
{
    let mut first_params: QueryParams = vec![
        ("page[limit]".to_string(), page_limit.to_string()),
        ("page[offset]".to_string(), "0".to_string()),
    ];
    first_params.extend(params);

    let mut items = Vec::new();
    let mut page = 1_usize;
    let mut document = source.fetch_page(url, &first_params).await?;

    loop {
        let next = document.next_link().map(str::to_owned);
        let records = document.into_records();

        if records.is_empty() {
            warn!(page, "Page carried no records");
        }
        debug!(page, count = records.len(), "Mapping page");

        items.extend(records.into_iter().map(|raw| mapper(Record::from_value(raw))));

        let Some(next) = next else {
            break;
        };

        page += 1;
        debug!(page, url = %next, "Following next link");
        document = source.fetch_page(&next, &[]).await?;
    }

    debug!(pages = page, total = items.len(), "Pagination complete");
    Ok(items)
}
