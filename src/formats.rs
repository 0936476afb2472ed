use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One entry of the book list, before any remote lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookStub {
    pub title: String,
    pub authors: BTreeSet<String>,
}

impl BookStub {
    /// Free-text search string: the title followed by every author, space separated.
    pub fn search_query(&self) -> String {
        let mut query = self.title.clone();
        for author in &self.authors {
            query.push(' ');
            query.push_str(author);
        }
        query
    }
}

/// Normalized metadata for a matched volume. Absent fields stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_identifiers: Option<IndustryIdentifiers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_modes: Option<ReadingModes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_links: Option<ImageLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndustryIdentifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn_10: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn_13: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadingModes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_thumbnail: Option<String>,
}

/// Search response envelope (`GET /books/v1/volumes`).
///
/// Items stay raw until one is chosen, so a malformed item the caller never
/// looks at cannot spoil the response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeSearch {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub volume_info: VolumeInfo,
}

/// Recognized `volumeInfo` keys. Anything not declared here
/// (`infoLink`, `contentVersion`, `panelizationSummary`, ...) is dropped on decode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub industry_identifiers: Option<Vec<RawIndustryIdentifier>>,
    pub reading_modes: Option<RawReadingModes>,
    pub page_count: Option<u32>,
    pub print_type: Option<String>,
    pub categories: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u32>,
    pub maturity_rating: Option<String>,
    pub image_links: Option<RawImageLinks>,
    pub language: Option<String>,
    pub preview_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReadingModes {
    pub text: Option<bool>,
    pub image: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImageLinks {
    pub thumbnail: Option<String>,
    #[serde(rename = "small_thumbnail", alias = "smallThumbnail")]
    pub small_thumbnail: Option<String>,
}

impl IndustryIdentifiers {
    /// Picks ISBN-10 / ISBN-13 out of typed identifiers; other types are dropped.
    pub fn from_raw(raw: &[RawIndustryIdentifier]) -> Self {
        let mut out = Self::default();
        for identifier in raw {
            match identifier.kind.as_str() {
                "ISBN_10" => out.isbn_10 = Some(identifier.identifier.clone()),
                "ISBN_13" => out.isbn_13 = Some(identifier.identifier.clone()),
                _ => {}
            }
        }
        out
    }
}

impl ReadingModes {
    pub fn from_raw(raw: &RawReadingModes) -> Self {
        Self {
            text: raw.text,
            image: raw.image,
        }
    }
}

impl ImageLinks {
    pub fn from_raw(raw: &RawImageLinks) -> Self {
        Self {
            thumbnail: raw.thumbnail.clone(),
            small_thumbnail: raw.small_thumbnail.clone(),
        }
    }
}

impl From<VolumeInfo> for BookRecord {
    fn from(info: VolumeInfo) -> Self {
        Self {
            industry_identifiers: info
                .industry_identifiers
                .as_deref()
                .map(IndustryIdentifiers::from_raw),
            reading_modes: info.reading_modes.as_ref().map(ReadingModes::from_raw),
            image_links: info.image_links.as_ref().map(ImageLinks::from_raw),
            title: info.title,
            authors: info.authors,
            publisher: info.publisher,
            published_date: info.published_date,
            description: info.description,
            page_count: info.page_count,
            print_type: info.print_type,
            categories: info.categories,
            average_rating: info.average_rating,
            ratings_count: info.ratings_count,
            maturity_rating: info.maturity_rating,
            language: info.language,
            preview_link: info.preview_link,
        }
    }
}
