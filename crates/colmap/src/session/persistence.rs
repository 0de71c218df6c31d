//! Session files: save/load the current mapping state as JSON.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::state::{Session, SourceFile, TargetFile};
use crate::error::{ColmapError, Result};
use crate::input::SourceMetadata;
use crate::llm::AiSuggestions;
use crate::mapping::MappingTable;
use crate::matching::validate_threshold;
use crate::schema::{SourceSchema, TargetSchema};

/// On-disk form of a session. Holds the current state only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    /// Version of colmap that wrote the file.
    pub colmap_version: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Template the mapping targets.
    pub target: SourceMetadata,

    /// Source file the mapping reads from.
    pub source: SourceMetadata,

    pub target_schema: TargetSchema,
    pub source_schema: SourceSchema,

    /// Delimiter the source was read with, reused when it is read again.
    pub delimiter: char,

    /// Lexical acceptance threshold.
    pub threshold: u8,

    /// Model that produced `suggestions`, if any.
    pub model: Option<String>,

    pub suggestions: AiSuggestions,
    pub mapping: MappingTable,
}

impl SessionFile {
    /// Save the session file as pretty JSON.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use colmap::SessionFile;
    /// # fn example(file: &SessionFile) -> colmap::Result<()> {
    /// file.save("upload.colmap.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ColmapError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = File::create(path).map_err(|e| {
            ColmapError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            ColmapError::Persistence(format!("Failed to serialize session: {}", e))
        })?;

        debug!(path = %path.display(), "saved session file");
        Ok(())
    }

    /// Load a session file.
    ///
    /// The mapping is not checked here; [`Session::restore`] does that.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            ColmapError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        let session: SessionFile = serde_json::from_reader(reader).map_err(|e| {
            ColmapError::Persistence(format!(
                "Failed to parse session file '{}': {}",
                path.display(),
                e
            ))
        })?;

        if session.colmap_version != env!("CARGO_PKG_VERSION") {
            warn!(
                written_by = %session.colmap_version,
                "session file was written by a different colmap version"
            );
        }

        Ok(session)
    }
}

impl Session {
    /// Snapshot the session for saving. Needs both files and a mapping.
    pub fn to_file(&self) -> Result<SessionFile> {
        let target = self
            .target()
            .ok_or_else(|| ColmapError::SchemaMissing("Target template".to_string()))?;
        let source = self
            .source()
            .ok_or_else(|| ColmapError::SchemaMissing("Source file".to_string()))?;
        let mapping = self.mapping_or_err()?;

        Ok(SessionFile {
            colmap_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: self.created_at(),
            updated_at: Utc::now(),
            target: target.metadata.clone(),
            source: source.metadata.clone(),
            target_schema: target.schema.clone(),
            source_schema: source.schema.clone(),
            delimiter: char::from(source.data.delimiter),
            threshold: self.threshold(),
            model: self.suggestions().model.clone(),
            suggestions: self.suggestions().clone(),
            mapping: mapping.clone(),
        })
    }

    /// Rebuild a session from a saved file and a freshly read source.
    ///
    /// Fails with [`ColmapError::StaleSession`] when the source changed since
    /// the file was written, and with [`ColmapError::InconsistentMapping`] when
    /// the stored table does not fit the stored schemas.
    pub fn restore(file: SessionFile, source: SourceFile) -> Result<Self> {
        if source.metadata.hash != file.source.hash {
            return Err(ColmapError::StaleSession(format!(
                "'{}' changed since the session was saved ({} != {}); run map again",
                source.metadata.file, source.metadata.hash, file.source.hash
            )));
        }
        if source.schema != file.source_schema {
            return Err(ColmapError::StaleSession(format!(
                "columns of '{}' no longer match the session",
                source.metadata.file
            )));
        }

        validate_threshold(file.threshold)?;
        file.mapping.validate(&file.target_schema, &file.source_schema)?;

        let mut session = Session::new(file.threshold)?;
        session.created_at = file.created_at;
        session.load_target(TargetFile {
            schema: file.target_schema,
            metadata: file.target,
        })?;
        session.load_source(source);
        session.set_suggestions(file.suggestions);
        session.set_mapping(file.mapping);
        Ok(session)
    }
}

/// Default session file path for a source file: `<stem>.colmap.json` next to it.
///
/// # Example
///
/// ```
/// use colmap::session_path;
///
/// let path = session_path("data/upload.csv");
/// assert_eq!(path.to_string_lossy(), "data/upload.colmap.json");
/// ```
pub fn session_path(source: impl AsRef<Path>) -> PathBuf {
    let source = source.as_ref();
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    source.with_file_name(format!("{}.colmap.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Parser;
    use crate::mapping::{OverrideAction, Origin};

    fn build(dir: &Path) -> (Session, PathBuf) {
        let source_path = dir.join("upload.csv");
        fs::write(&source_path, "name,mail\nAlice,a@x\n").unwrap();

        let parser = Parser::new();
        let (data, metadata) = parser.parse_file(&source_path).unwrap();

        let mut session = Session::default();
        session
            .load_target(TargetFile {
                schema: TargetSchema::new(["Name", "Email"]).unwrap(),
                metadata: SourceMetadata::new(
                    dir.join("template.csv"),
                    String::new(),
                    0,
                    "csv".into(),
                    0,
                    2,
                ),
            })
            .unwrap();
        session.load_source(SourceFile::new(data, metadata).unwrap());
        session.resolve().unwrap();
        (session, source_path)
    }

    fn reread(path: &Path) -> SourceFile {
        let (data, metadata) = Parser::new().parse_file(path).unwrap();
        SourceFile::new(data, metadata).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, source_path) = build(dir.path());
        session
            .apply_override("Email", OverrideAction::Assign("mail".to_string()))
            .unwrap();

        let path = session_path(&source_path);
        session.to_file().unwrap().save(&path).unwrap();

        let loaded = SessionFile::load(&path).unwrap();
        let restored = Session::restore(loaded, reread(&source_path)).unwrap();

        assert_eq!(restored.mapping(), session.mapping());
        assert_eq!(
            restored.mapping().unwrap().get("Email").unwrap().origin,
            Origin::Manual
        );
        assert_eq!(restored.created_at(), session.created_at());
    }

    #[test]
    fn test_stale_source_detected() {
        let dir = tempfile::tempdir().unwrap();
        let (session, source_path) = build(dir.path());
        let file = session.to_file().unwrap();

        fs::write(&source_path, "name,mail\nBob,b@x\n").unwrap();
        let err = Session::restore(file, reread(&source_path)).unwrap_err();
        assert!(matches!(err, ColmapError::StaleSession(_)));
    }

    #[test]
    fn test_tampered_mapping_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (session, source_path) = build(dir.path());
        let path = dir.path().join("s.colmap.json");
        session.to_file().unwrap().save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.replace("\"source\": \"name\"", "\"source\": \"ghost\"")).unwrap();

        let loaded = SessionFile::load(&path).unwrap();
        let err = Session::restore(loaded, reread(&source_path)).unwrap_err();
        assert!(matches!(err, ColmapError::InconsistentMapping(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SessionFile::load("/nonexistent/x.colmap.json").unwrap_err();
        assert!(matches!(err, ColmapError::Persistence(_)));
    }

    #[test]
    fn test_to_file_requires_mapping() {
        assert!(Session::default().to_file().is_err());
    }
}
