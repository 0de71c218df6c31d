//! Prompt templates for LLM interactions.

/// Build the column mapping prompt.
pub fn mapping_prompt(targets: &[&str], sources: &[&str]) -> String {
    format!(
        r#"Map the columns of a source spreadsheet onto a fixed target template.

## Target columns (template)
{}

## Source columns (uploaded file)
{}

## Task
For every target column pick the single source column that holds the same
information, judging by:
1. Meaning of the names, across languages (English, Chinese, Indonesian, ...)
2. Partial matches and abbreviations
3. Common business terminology

Use each source column at most once. Copy column names exactly as listed,
including spaces and bracketed translations. If nothing fits, use null.

Respond with a JSON object only, keys are target columns:
{{
  "<target column>": "<source column>",
  "<target column>": null
}}"#,
        bullet_list(targets),
        bullet_list(sources)
    )
}

fn bullet_list(names: &[&str]) -> String {
    if names.is_empty() {
        return "(none)".to_string();
    }
    names
        .iter()
        .map(|name| format!("- \"{}\"", name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// System prompt for all colmap LLM interactions.
pub fn system_prompt() -> &'static str {
    r#"You are a data analyst who reconciles spreadsheet layouts.

Guidelines:
- Only use column names that appear in the lists you are given
- Never invent columns; answer null when unsure
- Column names may be in different languages or carry translations in brackets
- Always respond with valid JSON when requested"#
}
