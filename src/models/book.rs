//! Book record model and the slice of the Google Books volumes response it is built from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a field best-effort: a value of the wrong shape becomes `None`
/// instead of failing the whole page.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// `items` as a list. Entries that are not objects are skipped.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<VolumeItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Option<Vec<serde_json::Value>> = lenient(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| VolumeItem::deserialize(item).ok())
        .collect())
}

/// Top-level body of a `GET /books/v1/volumes` response.
///
/// Only `items` is read. The API omits it entirely once a query runs past its last result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumesResponse {
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<VolumeItem>,
}

/// One search hit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeItem {
    #[serde(default, deserialize_with = "lenient")]
    pub volume_info: Option<VolumeInfo>,
}

/// The nested metadata object of a volume.
///
/// Each field is read on its own; one mistyped field leaves only that field empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub published_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub categories: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub average_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub ratings_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub page_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub preview_link: Option<String>,
}

/// A flattened book row.
///
/// Every field taken from the API is optional: a value missing upstream stays `None`
/// and is never filled in. `query` records which topic produced the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub published_date: Option<String>,
    pub categories: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub description: Option<String>,
    pub page_count: Option<u64>,
    pub language: Option<String>,
    pub preview_link: Option<String>,
    pub query: String,
}

impl BookRecord {
    /// Column names, in output order.
    pub const COLUMNS: [&'static str; 11] = [
        "title",
        "authors",
        "publishedDate",
        "categories",
        "averageRating",
        "ratingsCount",
        "description",
        "pageCount",
        "language",
        "previewLink",
        "query",
    ];

    /// Flatten a volume's metadata into a record tagged with the originating query.
    pub fn from_volume(info: VolumeInfo, query: &str) -> Self {
        Self {
            title: info.title,
            authors: info.authors,
            published_date: info.published_date,
            categories: info.categories,
            average_rating: info.average_rating,
            ratings_count: info.ratings_count,
            description: info.description,
            page_count: info.page_count,
            language: info.language,
            preview_link: info.preview_link,
            query: query.to_string(),
        }
    }

    /// Authors joined for display, empty when absent.
    pub fn author_list(&self) -> String {
        self.authors
            .as_ref()
            .map(|a| a.join(", "))
            .unwrap_or_default()
    }
}

impl VolumesResponse {
    /// Flatten every item into records for `query`, keeping item order.
    pub fn into_records(self, query: &str) -> Vec<BookRecord> {
        self.items
            .into_iter()
            .map(|item| BookRecord::from_volume(item.volume_info.unwrap_or_default(), query))
            .collect()
    }
}
