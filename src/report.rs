//! HTML roster rendering.
//!
//! The page is a header template followed by one `<tr>` per record and a
//! fixed closing. Record fields are HTML-escaped before insertion.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::record::CharacterRecord;

const POPULATED_TEMPLATE: &str = include_str!("../templates/template.html");
const BLANK_TEMPLATE: &str = include_str!("../templates/blank.html");
const CLOSING: &str = "</table></body></html>";

/// Cell text used when a record has no narration.
pub const NO_AUDIO_PLACEHOLDER: &str = "none";

#[derive(Debug, Clone)]
pub struct Templates {
    pub populated: String,
    pub blank: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            populated: POPULATED_TEMPLATE.to_string(),
            blank: BLANK_TEMPLATE.to_string(),
        }
    }
}

impl Templates {
    /// Read `template.html` and `blank.html` from `dir`, keeping the built-in
    /// version of any file that is not there.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut templates = Self::default();
        let Some(dir) = dir else {
            return Ok(templates);
        };

        for (file, slot) in [
            ("template.html", &mut templates.populated),
            ("blank.html", &mut templates.blank),
        ] {
            let path = dir.join(file);
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    info!("Using template {}", path.display());
                    *slot = contents;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("{} not found, using built-in template", path.display());
                }
                Err(e) => return Err(Error::io(path, e)),
            }
        }
        Ok(templates)
    }
}

/// Path of the report for `letter` under `result_dir`.
pub fn report_path(result_dir: &Path, letter: char) -> PathBuf {
    result_dir.join(format!("{letter}-Marvel_Heroes.html"))
}

/// Render the roster page for `records`.
///
/// The audio cell is decided by [`CharacterRecord::is_narratable`], not by
/// whether synthesis actually succeeded.
pub fn render_report(templates: &Templates, records: &[CharacterRecord], letter: char) -> String {
    let mut html = String::new();

    if records.is_empty() {
        html.push_str(&templates.blank);
        let _ = write!(
            html,
            "<tr><td>Hero starts with {} wasn't found</td></tr>",
            escape_html(&letter.to_string())
        );
    } else {
        html.push_str(&templates.populated);
        for record in records {
            push_row(&mut html, record, letter);
        }
    }

    html.push_str(CLOSING);
    html
}

fn push_row(html: &mut String, record: &CharacterRecord, letter: char) {
    let name = escape_html(&record.name);
    let audio = if record.is_narratable() {
        format!(
            r#"<audio controls="controls"><source src="./mp3/{}/{}.mp3" type="audio/mpeg"></audio>"#,
            escape_html(&letter.to_string()),
            escape_html(&record.sanitized_name()),
        )
    } else {
        NO_AUDIO_PLACEHOLDER.to_string()
    };

    let _ = write!(
        html,
        r#"<tr><td>{id}</td><td>{name}</td><td>{audio}</td><td><a href="{wiki}">{name} wiki</a></td><td><a href="{comics}">{name} comics</a></td></tr>"#,
        id = record.id,
        wiki = escape_html(&record.wiki_url),
        comics = escape_html(&record.comics_url),
    );
    html.push('\n');
}

/// Render and write the report, returning the written path.
pub async fn write_report(
    templates: &Templates,
    records: &[CharacterRecord],
    letter: char,
    result_dir: &Path,
) -> Result<PathBuf> {
    let html = render_report(templates, records, letter);
    let path = report_path(result_dir, letter);
    tokio::fs::write(&path, html)
        .await
        .map_err(|e| Error::io(&path, e))?;
    info!("{} successfully created.", path.display());
    Ok(path)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
