//! CLI command implementations.

pub mod candidates;
pub mod convert;
pub mod map;
pub mod remap;
pub mod render;
pub mod set;
pub mod status;

use std::path::{Path, PathBuf};
use std::time::Duration;

use colmap::{
    ColumnMapper, LlmConfig, MapperConfig, MockProvider, OllamaProvider, Session, session_path,
};

use crate::cli::{LlmArgs, LlmProviderChoice};

/// Session file for a path given on the command line: used as is when it is
/// JSON, otherwise treated as the source data file.
pub fn session_file_path(path: &Path) -> PathBuf {
    if path.extension().map(|e| e == "json").unwrap_or(false) {
        path.to_path_buf()
    } else {
        session_path(path)
    }
}

/// Load a saved session, re-reading its source file.
pub fn open_session(path: &Path) -> Result<(PathBuf, Session), Box<dyn std::error::Error>> {
    let session_file = session_file_path(path);

    if !session_file.exists() {
        return Err(format!(
            "Session file not found: {}\nRun 'colmap map <TEMPLATE> {}' first.",
            session_file.display(),
            path.display()
        )
        .into());
    }

    let session = ColumnMapper::new().resume(&session_file)?;
    Ok((session_file, session))
}

/// Build a mapper with the requested model backend.
///
/// `fallback_model` is used when `--model` was not given.
pub fn build_mapper(
    threshold: u8,
    args: &LlmArgs,
    fallback_model: Option<&str>,
) -> Result<ColumnMapper, Box<dyn std::error::Error>> {
    let mut llm = LlmConfig::default().with_timeout(Duration::from_secs(args.timeout));
    if let Some(model) = args.model.as_deref().or(fallback_model) {
        llm = llm.with_model(model);
    }

    let config = MapperConfig::default()
        .with_threshold(threshold)
        .with_llm(llm.clone());
    let mapper = ColumnMapper::with_config(config)?;

    let mapper = match args.llm {
        LlmProviderChoice::None => mapper,
        LlmProviderChoice::Ollama => mapper.with_llm(OllamaProvider::with_config(llm)?),
        LlmProviderChoice::Mock => mapper.with_llm(MockProvider::new()),
    };
    Ok(mapper)
}
