//! fetch → parse → narrate → report, for one starting letter.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::catalog::CharacterSource;
use crate::error::{Error, Result};
use crate::narrator::{NarrationReport, Narrator, SpeechSynthesizer, VoiceGender};
use crate::record::parse_characters;
use crate::report::{write_report, Templates};

/// Result of one run.
#[derive(Debug)]
pub struct RunSummary {
    pub letter: char,
    pub characters: usize,
    pub report_path: PathBuf,
    pub narration: NarrationReport,
}

pub struct Pipeline {
    source: Arc<dyn CharacterSource>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    templates: Templates,
    result_dir: PathBuf,
}

impl Pipeline {
    /// `synthesizer = None` renders the report without producing audio.
    pub fn new(
        source: Arc<dyn CharacterSource>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        templates: Templates,
        result_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            synthesizer,
            templates,
            result_dir: result_dir.into(),
        }
    }

    pub async fn run(&self, letter: char, voice: VoiceGender) -> Result<RunSummary> {
        self.create_folders(letter).await?;

        let body = self.source.fetch(letter).await?;
        let records = parse_characters(&body)?;
        info!("Found {} characters starting with '{letter}'", records.len());

        let narration = match &self.synthesizer {
            Some(synth) => {
                Narrator::new(synth.clone(), &self.result_dir)
                    .narrate(&records, letter, voice)
                    .await
            }
            None => NarrationReport::default(),
        };

        let report_path = write_report(&self.templates, &records, letter, &self.result_dir).await?;

        Ok(RunSummary {
            letter,
            characters: records.len(),
            report_path,
            narration,
        })
    }

    /// Create `<result>/mp3/<letter>`; existing directories are fine.
    async fn create_folders(&self, letter: char) -> Result<()> {
        let dir = self.result_dir.join("mp3").join(letter.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::io(dir, e))
    }
}

/// Pick the starting letter from a CLI argument.
///
/// Only the first character is used; the rest is ignored with a log line.
pub fn normalize_letter(arg: &str) -> Result<char> {
    let trimmed = arg.trim();
    let mut chars = trimmed.chars();
    let letter = chars
        .next()
        .ok_or_else(|| Error::InvalidLetter(arg.to_string()))?;
    if letter == '/' || letter == '\\' || letter == '.' {
        return Err(Error::InvalidLetter(arg.to_string()));
    }
    if chars.next().is_some() {
        info!("Found more than one letter, using the first ({letter})");
    }
    Ok(letter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct FixedSource(Value);

    #[async_trait]
    impl CharacterSource for FixedSource {
        async fn fetch(&self, _letter: char) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    struct DownSource;

    #[async_trait]
    impl CharacterSource for DownSource {
        async fn fetch(&self, _letter: char) -> Result<Value> {
            Err(Error::Status {
                url: "http://gateway.test/characters".into(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        }
    }

    #[derive(Default)]
    struct CountingSynth {
        texts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for CountingSynth {
        async fn synthesize(&self, text: &str, _gender: VoiceGender) -> Result<Vec<u8>> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(b"ID3fake".to_vec())
        }
    }

    fn catalog(results: Vec<Value>) -> Value {
        json!({ "code": 200, "data": { "offset": 0, "limit": 100, "results": results } })
    }

    fn character(id: i64, name: &str, description: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": description,
            "urls": [
                { "type": "detail", "url": format!("http://marvel.com/{id}/detail") },
                { "type": "wiki", "url": format!("http://marvel.com/{id}/wiki") },
                { "type": "comiclink", "url": format!("http://marvel.com/{id}/comics") },
            ]
        })
    }

    #[tokio::test]
    async fn full_run_writes_report_and_audio() {
        let dir = tempfile::tempdir().unwrap();
        let synth = Arc::new(CountingSynth::default());
        let source = Arc::new(FixedSource(catalog(vec![
            character(1, "Spider-Man/Woman", "Friendly neighbourhood heroes."),
            character(2, "Sif", ""),
            character(3, "Storm", "Weather witch."),
        ])));
        let pipeline = Pipeline::new(source, Some(synth.clone()), Templates::default(), dir.path());

        let summary = pipeline.run('S', VoiceGender::Male).await.unwrap();

        assert_eq!(summary.characters, 3);
        assert_eq!(summary.narration.written_count(), 2);
        assert_eq!(synth.texts.lock().unwrap().len(), 2);
        assert_eq!(summary.report_path, dir.path().join("S-Marvel_Heroes.html"));
        assert!(dir.path().join("mp3/S/Spider-Man Woman.mp3").exists());
        assert!(dir.path().join("mp3/S/Storm.mp3").exists());
        assert!(!dir.path().join("mp3/S/Sif.mp3").exists());

        let html = std::fs::read_to_string(&summary.report_path).unwrap();
        assert_eq!(html.matches("<audio").count(), 2);
        assert!(html.contains("<td>none</td>"));
        assert!(html.contains(r#"<a href="http://marvel.com/2/detail">Sif wiki</a>"#));
        assert!(html.contains(r#"<a href="http://marvel.com/2/wiki">Sif comics</a>"#));
    }

    #[tokio::test]
    async fn empty_letter_writes_blank_report_and_no_audio() {
        let dir = tempfile::tempdir().unwrap();
        let synth = Arc::new(CountingSynth::default());
        let pipeline = Pipeline::new(
            Arc::new(FixedSource(catalog(vec![]))),
            Some(synth.clone()),
            Templates::default(),
            dir.path(),
        );

        let summary = pipeline.run('Z', VoiceGender::Female).await.unwrap();

        assert_eq!(summary.characters, 0);
        assert!(synth.texts.lock().unwrap().is_empty());
        let html = std::fs::read_to_string(&summary.report_path).unwrap();
        assert!(html.contains("Hero starts with Z wasn't found"));
        assert!(!html.contains("<th>Name</th>"));
        assert_eq!(std::fs::read_dir(dir.path().join("mp3/Z")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_writes_no_report() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(Arc::new(DownSource), None, Templates::default(), dir.path());

        assert!(pipeline.run('A', VoiceGender::Male).await.is_err());
        assert!(!dir.path().join("A-Marvel_Heroes.html").exists());
    }

    #[tokio::test]
    async fn malformed_entry_aborts_before_report() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FixedSource(catalog(vec![json!({
            "id": 5, "name": "Linkless", "description": "No links at all.", "urls": []
        })])));
        let pipeline = Pipeline::new(source, None, Templates::default(), dir.path());

        let err = pipeline.run('L', VoiceGender::Male).await.unwrap_err();
        assert!(matches!(err, Error::MissingReferenceUrl { position: 0, .. }));
        assert!(!dir.path().join("L-Marvel_Heroes.html").exists());
    }

    #[tokio::test]
    async fn without_synthesizer_report_still_links_audio() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FixedSource(catalog(vec![character(
            1,
            "Thor",
            "God of thunder.",
        )])));
        let pipeline = Pipeline::new(source, None, Templates::default(), dir.path());

        let summary = pipeline.run('T', VoiceGender::Male).await.unwrap();
        assert_eq!(summary.narration.outcomes.len(), 0);
        let html = std::fs::read_to_string(&summary.report_path).unwrap();
        assert!(html.contains(r#"src="./mp3/T/Thor.mp3""#));
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FixedSource(catalog(vec![character(1, "Ant-Man", "Shrinks down.")])));
        let synth = Arc::new(CountingSynth::default());
        let pipeline = Pipeline::new(source, Some(synth), Templates::default(), dir.path());

        let first = pipeline.run('A', VoiceGender::Male).await.unwrap();
        let second = pipeline.run('A', VoiceGender::Male).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&first.report_path).unwrap(),
            std::fs::read_to_string(&second.report_path).unwrap()
        );
        assert_eq!(std::fs::read_dir(dir.path().join("mp3/A")).unwrap().count(), 1);
        // report + mp3 dir
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn letter_normalization() {
        assert_eq!(normalize_letter("S").unwrap(), 'S');
        assert_eq!(normalize_letter("Spider").unwrap(), 'S');
        assert_eq!(normalize_letter(" z ").unwrap(), 'z');
        assert!(matches!(normalize_letter(""), Err(Error::InvalidLetter(_))));
        assert!(matches!(normalize_letter("/etc"), Err(Error::InvalidLetter(_))));
    }
}
