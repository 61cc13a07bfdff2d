use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

use crate::error::{ProgramError, Result};
use crate::models::{DocumentBlob, ProgramData};

/// Filename used for exports until a file has been imported.
pub const DEFAULT_EXPORT_FILENAME: &str = "service_program.json";

/// Pretty-print the program with a four-space indent so exported files stay
/// readable and diffable.
pub fn serialize_program(data: &ProgramData) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    data.serialize(&mut serializer)
        .map_err(ProgramError::Encode)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the program to `dir/filename` and return the written path.
pub fn export_program(data: &ProgramData, dir: &Path, filename: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|err| ProgramError::io(dir, err))?;
    let path = dir.join(filename);
    let contents = serialize_program(data)?;
    fs::write(&path, contents).map_err(|err| ProgramError::io(&path, err))?;
    Ok(path)
}

/// Parse the contents of an import file. Only text that is not structured
/// data at all is an error; anything that parses is repaired field by field.
pub fn parse_program(contents: &str) -> Result<ProgramData> {
    let value: Value = serde_json::from_str(contents).map_err(ProgramError::Parse)?;
    ProgramData::from_value(&value).ok_or_else(|| {
        ProgramError::Parse(serde::de::Error::custom(
            "expected a program object at the top level",
        ))
    })
}

/// Read and parse an import file from disk.
pub fn import_program(path: &Path) -> Result<ProgramData> {
    let contents = fs::read_to_string(path).map_err(|err| ProgramError::io(path, err))?;
    parse_program(&contents)
}

/// Name remembered for the next export: the imported file's name, forced to
/// a `.json` extension.
pub fn remembered_filename(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_string());
    if name.ends_with(".json") {
        name
    } else {
        format!("{name}.json")
    }
}

/// Load a chord sheet from disk. The song name is the file name without its
/// extension.
pub fn read_document(path: &Path) -> Result<(String, DocumentBlob)> {
    let bytes = fs::read(path).map_err(|err| ProgramError::io(path, err))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().and_then(|ext| ext.to_str());
    Ok((name, DocumentBlob::from_file_bytes(extension, bytes)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{OrderItem, Song};

    fn sample() -> ProgramData {
        ProgramData {
            program_name: "Pentecost".to_string(),
            program_date: NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
            songs_list: vec![
                Song {
                    name: "Spirit of God".to_string(),
                    document: DocumentBlob::new("application/pdf", b"%PDF-1.7".to_vec()),
                    notes: "Start soft".to_string(),
                },
                Song::new("Spirit of God", DocumentBlob::default()),
            ],
            order_list: vec![OrderItem::new("Worship"), OrderItem::new("Message")],
        }
    }

    #[test]
    fn export_then_import_yields_the_same_program() {
        let dir = tempfile::tempdir().unwrap();
        let data = sample();

        let path = export_program(&data, dir.path(), DEFAULT_EXPORT_FILENAME).unwrap();
        assert_eq!(path, dir.path().join("service_program.json"));
        assert_eq!(import_program(&path).unwrap(), data);
    }

    #[test]
    fn export_is_pretty_printed() {
        let text = serialize_program(&sample()).unwrap();
        assert!(text.starts_with("{\n    \"programName\": \"Pentecost\""));
        assert!(text.contains("\n        {\n            \"name\": \"Spirit of God\""));
    }

    #[test]
    fn unparsable_input_is_a_parse_error() {
        assert!(parse_program("{ not json").unwrap_err().is_parse());
        assert!(parse_program("").unwrap_err().is_parse());
        assert!(parse_program("[1, 2]").unwrap_err().is_parse());
    }

    #[test]
    fn parsed_input_is_repaired() {
        let data = parse_program(r#"{"songsList": {}, "orderList": []}"#).unwrap();
        assert!(data.songs_list.is_empty());
        assert!(data.order_list.is_empty());
        assert_eq!(data.program_name, crate::models::DEFAULT_PROGRAM_NAME);
    }

    #[test]
    fn remembered_filename_always_ends_in_json() {
        assert_eq!(remembered_filename(Path::new("/tmp/easter.json")), "easter.json");
        assert_eq!(remembered_filename(Path::new("easter.txt")), "easter.txt.json");
        assert_eq!(remembered_filename(Path::new("backup")), "backup.json");
    }

    #[test]
    fn read_document_strips_the_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Amazing Grace.pdf");
        fs::write(&path, b"%PDF-1.4").unwrap();

        let (name, blob) = read_document(&path).unwrap();
        assert_eq!(name, "Amazing Grace");
        assert_eq!(blob.media_type(), "application/pdf");
        assert_eq!(blob.bytes(), b"%PDF-1.4");
    }

    #[test]
    fn missing_files_report_their_path() {
        let err = read_document(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.pdf"));
    }
}
