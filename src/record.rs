//! Normalised character records parsed from the catalog response.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Descriptions at or below this many characters are not narrated.
pub const MIN_NARRATION_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub wiki_url: String,
    pub comics_url: String,
}

impl CharacterRecord {
    /// Whether the description is long enough to be worth synthesizing.
    pub fn is_narratable(&self) -> bool {
        self.description.chars().count() > MIN_NARRATION_CHARS
    }

    /// Display name with the first `/` replaced by a space.
    pub fn sanitized_name(&self) -> String {
        self.name.replacen('/', " ", 1)
    }

    /// Path of this record's audio file relative to the result directory.
    pub fn audio_relative_path(&self, letter: char) -> PathBuf {
        PathBuf::from("mp3")
            .join(letter.to_string())
            .join(format!("{}.mp3", self.sanitized_name()))
    }
}

#[derive(Deserialize)]
struct RawCharacter {
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    urls: Vec<RawUrl>,
}

#[derive(Deserialize)]
struct RawUrl {
    url: String,
}

/// Map `data.results[]` of a catalog response into records, preserving order.
pub fn parse_characters(body: &Value) -> Result<Vec<CharacterRecord>> {
    let results = body
        .pointer("/data/results")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::MalformedResponse("missing data.results array".into()))?;

    results
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let raw: RawCharacter = serde_json::from_value(entry.clone())
                .map_err(|e| Error::MalformedResponse(format!("result #{i}: {e}")))?;
            into_record(raw)
        })
        .collect()
}

fn into_record(raw: RawCharacter) -> Result<CharacterRecord> {
    let mut urls = raw.urls.into_iter().map(|u| u.url);
    let wiki_url = urls.next().ok_or_else(|| Error::MissingReferenceUrl {
        name: raw.name.clone(),
        position: 0,
    })?;
    let comics_url = urls.next().ok_or_else(|| Error::MissingReferenceUrl {
        name: raw.name.clone(),
        position: 1,
    })?;

    Ok(CharacterRecord {
        id: raw.id,
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        wiki_url,
        comics_url,
    })
}
