//! Speech synthesis for character descriptions.
//!
//! Every narratable record gets its own tokio task; all tasks are awaited
//! before [`Narrator::narrate`] returns, so the report is only rendered once
//! every audio file has either been written or has failed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::SpeechConfig;
use crate::error::{Error, Result};
use crate::record::CharacterRecord;

/// SSML voice gender requested from the synthesis API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoiceGender {
    #[default]
    #[value(name = "MALE")]
    Male,
    #[value(name = "FEMALE")]
    Female,
    #[value(name = "NEUTRAL")]
    Neutral,
}

impl VoiceGender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceGender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "NEUTRAL" => Ok(Self::Neutral),
            other => Err(format!("unknown voice gender '{other}' (expected MALE, FEMALE or NEUTRAL)")),
        }
    }
}

/// Turns text into MP3 bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, gender: VoiceGender) -> Result<Vec<u8>>;
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: Option<String>,
}

/// Google Cloud Text-to-Speech `text:synthesize` client.
pub struct GoogleSpeechClient {
    config: SpeechConfig,
    client: Client,
}

impl GoogleSpeechClient {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechClient {
    async fn synthesize(&self, text: &str, gender: VoiceGender) -> Result<Vec<u8>> {
        let body = json!({
            "input": { "text": text },
            "voice": {
                "languageCode": self.config.language_code,
                "ssmlGender": gender,
            },
            "audioConfig": { "audioEncoding": "MP3" }
        });

        debug!("Synthesizing {} chars ({gender})", text.chars().count());

        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("X-Goog-Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: self.config.endpoint.clone(),
                status,
            });
        }

        let data: SynthesizeResponse = resp.json().await?;
        let encoded = data
            .audio_content
            .ok_or_else(|| Error::MalformedResponse("missing audioContent".into()))?;
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    }
}

/// Outcome of narrating one record.
#[derive(Debug)]
pub struct NarrationOutcome {
    pub name: String,
    pub result: Result<PathBuf>,
}

/// Outcomes of one narration pass, in source order.
#[derive(Debug, Default)]
pub struct NarrationReport {
    pub outcomes: Vec<NarrationOutcome>,
}

impl NarrationReport {
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(PathBuf::as_path))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    pub fn written_count(&self) -> usize {
        self.written().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

pub struct Narrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    result_dir: PathBuf,
}

impl Narrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, result_dir: impl Into<PathBuf>) -> Self {
        Self {
            synthesizer,
            result_dir: result_dir.into(),
        }
    }

    /// Synthesize every narratable record and write `mp3/<letter>/<name>.mp3`.
    ///
    /// Requests are issued concurrently. A failing record is logged and
    /// recorded in the report; it does not stop the others.
    pub async fn narrate(
        &self,
        records: &[CharacterRecord],
        letter: char,
        gender: VoiceGender,
    ) -> NarrationReport {
        let mut pending = Vec::new();

        for record in records {
            if !record.is_narratable() {
                debug!("Skipping '{}': description too short", record.name);
                continue;
            }

            let synthesizer = self.synthesizer.clone();
            let path = self.result_dir.join(record.audio_relative_path(letter));
            let text = record.description.clone();
            let handle = tokio::spawn(async move {
                narrate_one(synthesizer.as_ref(), &text, gender, path).await
            });
            pending.push((record.name.clone(), handle));
        }

        // All tasks are already running; awaiting in order only fixes the
        // order outcomes are reported in.
        let mut outcomes = Vec::with_capacity(pending.len());
        for (name, handle) in pending {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(Error::Task(e)),
            };
            match &result {
                Ok(path) => info!("{} successfully created.", path.display()),
                Err(e) => warn!("Narration failed for '{name}': {e}"),
            }
            outcomes.push(NarrationOutcome { name, result });
        }

        NarrationReport { outcomes }
    }
}

async fn narrate_one(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    gender: VoiceGender,
    path: PathBuf,
) -> Result<PathBuf> {
    let audio = synthesizer.synthesize(text, gender).await?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    tokio::fs::write(&path, &audio)
        .await
        .map_err(|e| Error::io(&path, e))?;
    Ok(path)
}
