//! Stage file access
//!
//! Stage paths look like `@"DB"."SCHEMA"."STAGE"/dir/file.png`. Identifiers
//! may be quoted or bare; the leading `@` is optional. [`LocalStage`]
//! resolves them under a local directory laid out as
//! `<root>/<DB>/<SCHEMA>/<STAGE>/dir/file.png`.

use crate::error::{AnalystDeskError, Result};
use std::fmt;
use std::path::PathBuf;

/// Parsed, fully qualified stage file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePath {
    /// Database identifier
    pub database: String,
    /// Schema identifier
    pub schema: String,
    /// Stage identifier
    pub stage: String,
    /// Path of the file inside the stage, `/`-separated
    pub file: String,
}

impl StagePath {
    /// Parse a stage path
    ///
    /// # Examples
    ///
    /// ```
    /// use analyst_desk::storage::StagePath;
    ///
    /// let path = StagePath::parse(r#"@"CORTEX"."WINTER_GAME"."RAW_DATA"/logo.png"#).unwrap();
    /// assert_eq!(path.schema, "WINTER_GAME");
    /// assert_eq!(path.file, "logo.png");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let invalid =
            |reason: &str| AnalystDeskError::Storage(format!("Invalid stage path {}: {}", input, reason));

        let body = input.trim().strip_prefix('@').unwrap_or(input.trim());

        let mut identifiers = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = body.char_indices().peekable();
        let mut file_start = None;

        while let Some((idx, ch)) = chars.next() {
            match ch {
                '"' if in_quotes => {
                    if matches!(chars.peek(), Some((_, '"'))) {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                }
                '"' => in_quotes = true,
                '.' if !in_quotes => identifiers.push(std::mem::take(&mut current)),
                '/' if !in_quotes => {
                    identifiers.push(std::mem::take(&mut current));
                    file_start = Some(idx + 1);
                    break;
                }
                _ => current.push(ch),
            }
        }

        if in_quotes {
            return Err(invalid("unterminated quoted identifier").into());
        }
        let file_start = file_start.ok_or_else(|| invalid("missing file name"))?;
        if identifiers.len() != 3 || identifiers.iter().any(|i| i.is_empty()) {
            return Err(invalid("expected <database>.<schema>.<stage>").into());
        }

        let file = body[file_start..].trim_matches('/').to_string();
        if file.is_empty() {
            return Err(invalid("missing file name").into());
        }

        let mut identifiers = identifiers.into_iter();
        Ok(Self {
            database: identifiers.next().unwrap_or_default(),
            schema: identifiers.next().unwrap_or_default(),
            stage: identifiers.next().unwrap_or_default(),
            file,
        })
    }
}

impl fmt::Display for StagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@\"{}\".\"{}\".\"{}\"/{}",
            self.database, self.schema, self.stage, self.file
        )
    }
}

/// Reader of raw stage file bytes
pub trait StageReader: Send + Sync {
    /// Read the whole file
    fn read(&self, path: &StagePath) -> Result<Vec<u8>>;
}

/// Stage mirror on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalStage {
    root: PathBuf,
}

impl LocalStage {
    /// Create a reader rooted at `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Local file backing a stage path
    pub fn resolve(&self, path: &StagePath) -> Result<PathBuf> {
        let mut resolved = self
            .root
            .join(&path.database)
            .join(&path.schema)
            .join(&path.stage);

        for segment in path.file.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(AnalystDeskError::Storage(format!(
                    "Stage path {} escapes its stage",
                    path
                ))
                .into());
            }
            resolved.push(segment);
        }

        Ok(resolved)
    }
}

impl StageReader for LocalStage {
    fn read(&self, path: &StagePath) -> Result<Vec<u8>> {
        let file = self.resolve(path)?;
        tracing::debug!("Reading stage file {} from {}", path, file.display());
        std::fs::read(&file).map_err(|e| {
            AnalystDeskError::Storage(format!("Failed to load {}: {}", path, e)).into()
        })
    }
}
