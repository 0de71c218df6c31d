//! Main ColumnMapper struct and public API.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::input::{Parser, ParserConfig};
use crate::llm::{AiSuggestions, LlmConfig, LlmProvider, SuggestionAdapter};
use crate::mapping::ReplacementPolicy;
use crate::matching::{DEFAULT_THRESHOLD, validate_threshold};
use crate::schema::TargetSchema;
use crate::session::{Session, SessionFile, SourceFile, TargetFile};

/// Configuration for column mapping.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Lexical acceptance threshold (50-100).
    pub threshold: u8,
    /// Model settings used when building an LLM provider.
    pub llm: LlmConfig,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            threshold: DEFAULT_THRESHOLD,
            llm: LlmConfig::default(),
        }
    }
}

impl MapperConfig {
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = llm;
        self
    }

    /// Check threshold and model settings.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        self.llm.validate()
    }
}

/// Loads files, asks for suggestions, and builds sessions.
pub struct ColumnMapper {
    config: MapperConfig,
    parser: Parser,
    source_parser: Parser,
    adapter: Option<SuggestionAdapter>,
}

impl ColumnMapper {
    /// Create a mapper with default configuration and no LLM.
    pub fn new() -> Self {
        let config = MapperConfig::default();
        Self {
            parser: Parser::with_config(config.parser.clone().with_allow_empty(false)),
            source_parser: Parser::with_config(config.parser.clone().with_allow_empty(true)),
            config,
            adapter: None,
        }
    }

    /// Create a mapper with custom configuration.
    pub fn with_config(config: MapperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: Parser::with_config(config.parser.clone().with_allow_empty(false)),
            source_parser: Parser::with_config(config.parser.clone().with_allow_empty(true)),
            config,
            adapter: None,
        })
    }

    /// Add an LLM provider for AI suggestions.
    ///
    /// Without one, mapping is purely lexical.
    pub fn with_llm(mut self, provider: impl LlmProvider + 'static) -> Self {
        self.adapter = Some(SuggestionAdapter::new(provider));
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn has_llm(&self) -> bool {
        self.adapter.is_some()
    }

    /// Read a template; only its header row is used.
    pub fn load_target(&self, path: impl AsRef<Path>) -> Result<TargetFile> {
        let (table, metadata) = self.parser.parse_file(path)?;
        let schema = TargetSchema::from_table(&table)?;
        Ok(TargetFile { schema, metadata })
    }

    /// Read a source file with its rows.
    ///
    /// A blank upload loads as a source without columns, so every target
    /// ends up unmapped instead of the run failing.
    pub fn load_source(&self, path: impl AsRef<Path>) -> Result<SourceFile> {
        let (table, metadata) = self.source_parser.parse_file(path)?;
        SourceFile::new(table, metadata)
    }

    /// Ask the configured model for suggestions, degrading on any failure.
    pub fn suggest(&self, target: &TargetFile, source: &SourceFile) -> AiSuggestions {
        match &self.adapter {
            Some(adapter) => adapter.suggest_or_degrade(&target.schema, &source.schema),
            None => AiSuggestions::disabled(),
        }
    }

    /// Load both files, gather suggestions, and resolve.
    pub fn map(&self, template: impl AsRef<Path>, source: impl AsRef<Path>) -> Result<Session> {
        let target = self.load_target(template)?;
        let source = self.load_source(source)?;
        let suggestions = self.suggest(&target, &source);

        let mut session = Session::new(self.config.threshold)?;
        session.load_target(target)?;
        session.load_source(source);
        session.set_suggestions(suggestions);
        session.resolve()?;
        Ok(session)
    }

    /// Fetch fresh suggestions (if a provider is set) and resolve again.
    ///
    /// Without a provider the previous suggestions are kept.
    pub fn rerun(&self, session: &mut Session, policy: ReplacementPolicy) -> Result<()> {
        if let Some(adapter) = &self.adapter {
            let (target, source) = session.schemas()?;
            let fresh = adapter.suggest_or_degrade(target, source);
            session.set_suggestions(fresh);
        }
        session.rerun(policy)?;
        Ok(())
    }

    /// Load a saved session, re-reading and checking its source file.
    pub fn resume(&self, path: impl AsRef<Path>) -> Result<Session> {
        let path = path.as_ref();
        let file = SessionFile::load(path)?;

        let source_path = locate_source(path, &file);
        let mut parser_config = self.config.parser.clone().with_allow_empty(true);
        parser_config.delimiter = u8::try_from(file.delimiter).ok();
        let (table, metadata) = Parser::with_config(parser_config).parse_file(&source_path)?;
        let source = SourceFile::new(table, metadata)?;

        let session = Session::restore(file, source)?;
        info!(session = %path.display(), "resumed session");
        Ok(session)
    }
}

impl Default for ColumnMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Source path recorded in the session, or the same file name next to the
/// session file when the recorded path no longer resolves.
fn locate_source(session_path: &Path, file: &SessionFile) -> PathBuf {
    let recorded = &file.source.path;
    if recorded.exists() {
        return recorded.clone();
    }

    let sibling = session_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(&file.source.file);
    if sibling.exists() {
        warn!(
            recorded = %recorded.display(),
            using = %sibling.display(),
            "source file moved, using copy next to the session"
        );
        return sibling;
    }

    recorded.clone()
}
