//! The mapping session: loaded files, suggestions, and the current table.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::convert::{ConversionResult, project};
use crate::error::{ColmapError, Result};
use crate::input::{DataTable, SourceMetadata};
use crate::llm::AiSuggestions;
use crate::mapping::{
    MappingTable, OverrideAction, OverrideOutcome, ReplacementPolicy, Resolver,
};
use crate::schema::{SourceSchema, TargetSchema};

/// A loaded target template.
#[derive(Debug, Clone)]
pub struct TargetFile {
    pub schema: TargetSchema,
    pub metadata: SourceMetadata,
}

/// A loaded source file with its rows.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub schema: SourceSchema,
    pub data: DataTable,
    pub metadata: SourceMetadata,
}

impl SourceFile {
    /// Build from parsed data, deriving the schema from the header row.
    pub fn new(data: DataTable, metadata: SourceMetadata) -> Result<Self> {
        let schema = SourceSchema::from_table(&data)?;
        Ok(Self {
            schema,
            data,
            metadata,
        })
    }
}

/// All state for mapping one source file onto one template.
///
/// Sessions are plain values; nothing is shared between them.
#[derive(Debug, Clone)]
pub struct Session {
    target: Option<TargetFile>,
    source: Option<SourceFile>,
    mapping: Option<MappingTable>,
    suggestions: AiSuggestions,
    resolver: Resolver,
    pub(crate) created_at: DateTime<Utc>,
}

impl Session {
    /// Empty session with the given lexical threshold.
    pub fn new(threshold: u8) -> Result<Self> {
        Ok(Self {
            target: None,
            source: None,
            mapping: None,
            suggestions: AiSuggestions::disabled(),
            resolver: Resolver::new(threshold)?,
            created_at: Utc::now(),
        })
    }

    // === Loading ===

    /// Set the template. A session accepts exactly one.
    pub fn load_target(&mut self, target: TargetFile) -> Result<()> {
        if let Some(existing) = &self.target {
            return Err(ColmapError::Config(format!(
                "Target template already loaded from '{}'",
                existing.metadata.file
            )));
        }
        info!(file = %target.metadata.file, columns = target.metadata.column_count, "loaded target template");
        self.target = Some(target);
        Ok(())
    }

    /// Set or replace the source file, dropping the mapping and suggestions.
    pub fn load_source(&mut self, source: SourceFile) {
        info!(
            file = %source.metadata.file,
            columns = source.metadata.column_count,
            rows = source.metadata.row_count,
            "loaded source file"
        );
        self.source = Some(source);
        self.mapping = None;
        self.suggestions = AiSuggestions::disabled();
    }

    pub fn set_suggestions(&mut self, suggestions: AiSuggestions) {
        self.suggestions = suggestions;
    }

    /// Change the lexical threshold for later resolutions.
    pub fn set_threshold(&mut self, threshold: u8) -> Result<()> {
        self.resolver = Resolver::new(threshold)?;
        Ok(())
    }

    // === Mapping ===

    /// Build a fresh table from the current suggestions.
    pub fn resolve(&mut self) -> Result<&MappingTable> {
        let (target, source) = self.schemas()?;
        let table = self.resolver.resolve(target, source, &self.suggestions);
        Ok(self.mapping.insert(table))
    }

    /// Resolve again, keeping or replacing manual entries.
    pub fn rerun(&mut self, policy: ReplacementPolicy) -> Result<&MappingTable> {
        let (target, source) = self.schemas()?;
        let table = match &self.mapping {
            Some(previous) => {
                self.resolver
                    .rerun(previous, target, source, &self.suggestions, policy)
            }
            None => self.resolver.resolve(target, source, &self.suggestions),
        };
        Ok(self.mapping.insert(table))
    }

    /// Apply a manual edit to the current table.
    pub fn apply_override(&mut self, target: &str, action: OverrideAction) -> Result<OverrideOutcome> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ColmapError::SchemaMissing("Source file".to_string()))?;
        let table = self
            .mapping
            .as_mut()
            .ok_or_else(|| ColmapError::SchemaMissing("Mapping".to_string()))?;
        table.apply_override(&source.schema, target, action)
    }

    /// Project the source rows through the current table.
    pub fn convert(&self) -> Result<ConversionResult> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ColmapError::SchemaMissing("Source file".to_string()))?;
        let table = self.mapping_or_err()?;
        Ok(project(table, &source.data))
    }

    // === Accessors ===

    pub fn target(&self) -> Option<&TargetFile> {
        self.target.as_ref()
    }

    pub fn source(&self) -> Option<&SourceFile> {
        self.source.as_ref()
    }

    pub fn mapping(&self) -> Option<&MappingTable> {
        self.mapping.as_ref()
    }

    pub fn suggestions(&self) -> &AiSuggestions {
        &self.suggestions
    }

    pub fn threshold(&self) -> u8 {
        self.resolver.scorer().threshold()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn schemas(&self) -> Result<(&TargetSchema, &SourceSchema)> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| ColmapError::SchemaMissing("Target template".to_string()))?;
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ColmapError::SchemaMissing("Source file".to_string()))?;
        Ok((&target.schema, &source.schema))
    }

    pub(crate) fn mapping_or_err(&self) -> Result<&MappingTable> {
        self.mapping
            .as_ref()
            .ok_or_else(|| ColmapError::SchemaMissing("Mapping".to_string()))
    }

    pub(crate) fn set_mapping(&mut self, table: MappingTable) {
        self.mapping = Some(table);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            target: None,
            source: None,
            mapping: None,
            suggestions: AiSuggestions::disabled(),
            resolver: Resolver::default(),
            created_at: Utc::now(),
        }
    }
}
