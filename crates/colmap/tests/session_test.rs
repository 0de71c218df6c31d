//! Integration tests for ColumnMapper sessions on real files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};

use colmap::llm::{LlmConfig, OllamaProvider};
use colmap::{
    ColmapError, ColumnMapper, MapperConfig, MockProvider, OutputFormat, OverrideAction, Origin,
    Parser, ReplacementPolicy, SuggestionStatus, session_path,
};
use rust_xlsxwriter::Workbook;

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write file");
    path
}

/// Write a one-sheet workbook; cells that parse as numbers are stored as numbers.
fn write_workbook(dir: &Path, name: &str, rows: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            let written = match value.parse::<f64>() {
                Ok(number) => sheet.write_number(r, c, number),
                Err(_) => sheet.write_string(r, c, *value),
            };
            written.expect("Failed to write cell");
        }
    }
    workbook.save(&path).expect("Failed to save workbook");
    path
}

const TEMPLATE: &str = "Name,Email,Phone,Website\n";

const UPLOAD: &str = "公司名称,邮箱,电话,Website \n\
                      Acme,info@acme.test,555-0100,acme.test\n\
                      Globex,hi@globex.test,555-0199,globex.test\n";

// =============================================================================
// Mapping Pipeline
// =============================================================================

#[test]
fn test_map_without_llm_is_lexical_only() {
    let template = create_test_file(TEMPLATE, ".csv");
    let upload = create_test_file(UPLOAD, ".csv");

    let session = ColumnMapper::new()
        .map(template.path(), upload.path())
        .unwrap();

    assert_eq!(session.suggestions().status, SuggestionStatus::Disabled);
    let table = session.mapping().unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.get("Website").unwrap().origin, Origin::Lexical);
    assert_eq!(table.summary().unmapped, 3);
}

#[test]
fn test_map_with_ai_suggestions() {
    let template = create_test_file(TEMPLATE, ".csv");
    let upload = create_test_file(UPLOAD, ".csv");
    let mock = MockProvider::canned(
        "```json\n{\"Name\": \"公司名称\", \"Email\": \"邮箱\", \"Phone\": \"电话\", \"Website\": null}\n```",
    );

    let session = ColumnMapper::new()
        .with_llm(mock)
        .map(template.path(), upload.path())
        .unwrap();

    let table = session.mapping().unwrap();
    assert_eq!(table.summary().ai, 3);
    assert_eq!(table.get("Website").unwrap().origin, Origin::Lexical);

    let converted = session.convert().unwrap();
    assert_eq!(converted.headers, vec!["Name", "Email", "Phone", "Website"]);
    assert_eq!(
        converted.rows[1],
        vec!["Globex", "hi@globex.test", "555-0199", "globex.test"]
    );
}

#[test]
fn test_unreachable_ollama_degrades() {
    let template = create_test_file(TEMPLATE, ".csv");
    let upload = create_test_file(UPLOAD, ".csv");

    let config = LlmConfig::default().with_timeout(std::time::Duration::from_secs(2));
    let provider = OllamaProvider::with_host(config, "http://127.0.0.1:9").unwrap();

    let session = ColumnMapper::new()
        .with_llm(provider)
        .map(template.path(), upload.path())
        .unwrap();

    assert!(matches!(
        session.suggestions().status,
        SuggestionStatus::Unavailable { .. }
    ));
    assert_eq!(
        session.mapping().unwrap().get("Website").unwrap().origin,
        Origin::Lexical
    );
    assert!(session.convert().is_ok());
}

#[test]
fn test_duplicate_template_columns_rejected() {
    let template = create_test_file("Name,name (名称)\n", ".csv");
    let upload = create_test_file(UPLOAD, ".csv");

    let err = ColumnMapper::new()
        .map(template.path(), upload.path())
        .unwrap_err();
    assert!(matches!(err, ColmapError::DuplicateColumn { .. }));
}

#[test]
fn test_workbook_template_and_upload() {
    let dir = TempDir::new().unwrap();
    let template = write_workbook(
        dir.path(),
        "template.xlsx",
        &[&["Name", "Email", "Phone", "Website"]],
    );
    let upload = write_workbook(
        dir.path(),
        "upload.xlsx",
        &[
            &["公司名称", "邮箱", "电话", "Website "],
            &["Acme", "info@acme.test", "5550100", "acme.test"],
        ],
    );

    let mapper = ColumnMapper::new().with_llm(MockProvider::canned(
        r#"{"Name": "公司名称", "Email": "邮箱", "Phone": "电话"}"#,
    ));
    let session = mapper.map(&template, &upload).unwrap();
    assert_eq!(session.source().unwrap().metadata.format, "xlsx");

    let converted = session.convert().unwrap();
    assert_eq!(
        converted.rows[0],
        vec!["Acme", "info@acme.test", "5550100", "acme.test"]
    );

    let out = dir.path().join("converted.xlsx");
    converted.write(&out, OutputFormat::Xlsx).unwrap();
    let (table, _) = Parser::new().parse_file(&out).unwrap();
    assert_eq!(table.headers, vec!["Name", "Email", "Phone", "Website"]);
    assert_eq!(table.rows, converted.rows);
}

#[test]
fn test_blank_upload_leaves_every_target_unmapped() {
    let dir = TempDir::new().unwrap();
    let template = write_file(dir.path(), "template.csv", TEMPLATE);
    let upload = write_file(dir.path(), "upload.csv", "\n\n");

    let mapper = ColumnMapper::new().with_llm(MockProvider::unreachable());
    let session = mapper.map(&template, &upload).unwrap();

    let table = session.mapping().unwrap();
    assert_eq!(table.len(), 4);
    assert!(
        table
            .iter()
            .all(|entry| entry.origin == Origin::Unmapped && entry.source.is_none())
    );

    let converted = session.convert().unwrap();
    assert_eq!(converted.column_count(), 4);
    assert_eq!(converted.row_count(), 0);

    let path = session_path(&upload);
    session.to_file().unwrap().save(&path).unwrap();
    let resumed = mapper.resume(&path).unwrap();
    assert_eq!(resumed.mapping(), session.mapping());

    let empty = create_test_file("", ".csv");
    assert!(ColumnMapper::new().map(&template, empty.path()).is_ok());
}

#[test]
fn test_blank_template_rejected() {
    let template = create_test_file("\n", ".csv");
    let upload = create_test_file(UPLOAD, ".csv");

    let err = ColumnMapper::new()
        .map(template.path(), upload.path())
        .unwrap_err();
    assert!(matches!(err, ColmapError::EmptyData(_)));
}

#[test]
fn test_invalid_config_rejected() {
    assert!(ColumnMapper::with_config(MapperConfig::default().with_threshold(30)).is_err());
    assert!(
        ColumnMapper::with_config(
            MapperConfig::default().with_llm(LlmConfig::default().with_model("gpt-4"))
        )
        .is_err()
    );
}

// =============================================================================
// Session Files
// =============================================================================

#[test]
fn test_save_edit_resume_convert() {
    let dir = TempDir::new().unwrap();
    let template = write_file(dir.path(), "template.csv", TEMPLATE);
    let upload = write_file(dir.path(), "upload.csv", UPLOAD);

    let mapper = ColumnMapper::new().with_llm(MockProvider::new());
    let mut session = mapper.map(&template, &upload).unwrap();
    session
        .apply_override("Name", OverrideAction::Assign("公司名称".to_string()))
        .unwrap();

    let path = session_path(&upload);
    session.to_file().unwrap().save(&path).unwrap();
    assert!(path.ends_with("upload.colmap.json"));

    let resumed = mapper.resume(&path).unwrap();
    assert_eq!(resumed.mapping(), session.mapping());

    let out = dir.path().join("out/converted.json");
    resumed.convert().unwrap().write(&out, OutputFormat::Json).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("\"Name\": \"Acme\""));
}

#[test]
fn test_resume_detects_changed_source() {
    let dir = TempDir::new().unwrap();
    let template = write_file(dir.path(), "template.csv", TEMPLATE);
    let upload = write_file(dir.path(), "upload.csv", UPLOAD);

    let mapper = ColumnMapper::new();
    let session = mapper.map(&template, &upload).unwrap();
    let path = session_path(&upload);
    session.to_file().unwrap().save(&path).unwrap();

    fs::write(&upload, format!("{}Initech,x@y,1,z\n", UPLOAD)).unwrap();

    let err = mapper.resume(&path).unwrap_err();
    assert!(matches!(err, ColmapError::StaleSession(_)));
}

#[test]
fn test_rerun_preserves_manual_entries() {
    let dir = TempDir::new().unwrap();
    let template = write_file(dir.path(), "template.csv", TEMPLATE);
    let upload = write_file(dir.path(), "upload.csv", UPLOAD);

    let mapper = ColumnMapper::new().with_llm(MockProvider::canned(
        "{\"Email\": \"邮箱\", \"Phone\": \"电话\"}",
    ));
    let mut session = mapper.map(&template, &upload).unwrap();
    session
        .apply_override("Phone", OverrideAction::Unassign)
        .unwrap();

    mapper
        .rerun(&mut session, ReplacementPolicy::PreserveManual)
        .unwrap();
    let phone = session.mapping().unwrap().get("Phone").unwrap();
    assert_eq!(phone.origin, Origin::Manual);
    assert!(phone.source.is_none());

    mapper
        .rerun(&mut session, ReplacementPolicy::ReplaceAll)
        .unwrap();
    let phone = session.mapping().unwrap().get("Phone").unwrap();
    assert_eq!(phone.origin, Origin::Ai);
}

#[test]
fn test_rerun_replaces_ai_entries_and_keeps_manual() {
    let dir = TempDir::new().unwrap();
    let template = write_file(dir.path(), "template.csv", TEMPLATE);
    let upload = write_file(dir.path(), "upload.csv", UPLOAD);

    let first = ColumnMapper::new().with_llm(MockProvider::canned(
        "{\"Email\": \"邮箱\", \"Phone\": \"电话\"}",
    ));
    let mut session = first.map(&template, &upload).unwrap();
    session
        .apply_override("Name", OverrideAction::Assign("公司名称".to_string()))
        .unwrap();
    let email = session.mapping().unwrap().get("Email").unwrap();
    assert_eq!(email.origin, Origin::Ai);
    assert_eq!(email.source.as_ref().map(|s| s.raw()), Some("邮箱"));

    let second = ColumnMapper::new().with_llm(MockProvider::canned("{\"Email\": \"电话\"}"));
    second
        .rerun(&mut session, ReplacementPolicy::PreserveManual)
        .unwrap();

    let table = session.mapping().unwrap();
    let email = table.get("Email").unwrap();
    assert_eq!(email.origin, Origin::Ai);
    assert_eq!(email.source.as_ref().map(|s| s.raw()), Some("电话"));

    let name = table.get("Name").unwrap();
    assert_eq!(name.origin, Origin::Manual);
    assert_eq!(name.source.as_ref().map(|s| s.raw()), Some("公司名称"));

    assert_ne!(table.get("Phone").unwrap().origin, Origin::Ai);
    table
        .validate(
            &session.target().unwrap().schema,
            &session.source().unwrap().schema,
        )
        .unwrap();
}

#[test]
fn test_header_only_source_converts_to_header_only_output() {
    let template = create_test_file(TEMPLATE, ".csv");
    let upload = create_test_file("email,website\n", ".csv");

    let session = ColumnMapper::new()
        .map(template.path(), upload.path())
        .unwrap();
    let converted = session.convert().unwrap();
    assert_eq!(converted.row_count(), 0);
    assert_eq!(converted.column_count(), 4);
}
