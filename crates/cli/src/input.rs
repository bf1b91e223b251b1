use anyhow::{Context, Result};
use biograph_entities::TaggedToken;
use biograph_protocol::{BiographyRecord, Letter};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A letters file holds either a bare letter array or a full biography record
#[derive(Deserialize)]
#[serde(untagged)]
enum LettersFile {
    Letters(Vec<Letter>),
    Record(BiographyRecord),
}

/// Letters plus the record they came from, when there was one
pub struct LoadedLetters {
    pub letters: Vec<Letter>,
    pub subject: Option<String>,
}

pub fn read_letters(path: &Path) -> Result<LoadedLetters> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read letters from {}", path.display()))?;
    let parsed: LettersFile = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a letter list or biography record", path.display()))?;

    let loaded = match parsed {
        LettersFile::Letters(letters) => LoadedLetters {
            letters,
            subject: None,
        },
        LettersFile::Record(record) => LoadedLetters {
            subject: record.subject_name(),
            letters: record.letters,
        },
    };
    log::info!("Read {} letters from {}", loaded.letters.len(), path.display());
    Ok(loaded)
}

/// Pre-tagged tokens keyed by letter index (`{"0": [...], "3": [...]}`)
pub fn read_tokens(path: &Path) -> Result<BTreeMap<usize, Vec<TaggedToken>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tokens from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid token file {}", path.display()))
}

/// Write `contents` to `out`, or to stdout when `out` is `None`
pub fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}
