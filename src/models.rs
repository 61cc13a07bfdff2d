//! Domain models for a single service program. These types stay plain data
//! holders: the mutation rules live in [`crate::program`], and the
//! persistence layer only ever serializes or decodes them as a whole.
//!
//! The JSON field names (`programName`, `songsList`, ...) are the wire
//! contract shared by the durable store and the export files, so two
//! installations can exchange programs.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{Local, NaiveDate};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Name used whenever no persisted or imported program supplies one.
pub const DEFAULT_PROGRAM_NAME: &str = "Service Program";

/// Liturgy seeded into every fresh program.
pub const DEFAULT_ORDER_TITLES: [&str; 5] = [
    "Opening & Prayer",
    "Worship",
    "Scripture Reading",
    "Message",
    "Closing",
];

/// Wire format for `programDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Root aggregate: everything that gets saved, exported, or imported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramData {
    pub program_name: String,
    pub program_date: NaiveDate,
    pub songs_list: Vec<Song>,
    pub order_list: Vec<OrderItem>,
}

impl Default for ProgramData {
    /// Generic name, today's date, no songs, and the default order of
    /// service.
    fn default() -> Self {
        Self {
            program_name: DEFAULT_PROGRAM_NAME.to_string(),
            program_date: today(),
            songs_list: Vec::new(),
            order_list: default_order(),
        }
    }
}

impl ProgramData {
    /// Decode loosely-shaped JSON into a program, substituting defaults for
    /// anything missing or of the wrong shape instead of rejecting the whole
    /// document. Returns `None` only when the top level is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;

        let program_name = fields
            .get("programName")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string());

        let program_date = fields
            .get("programDate")
            .and_then(Value::as_str)
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok())
            .unwrap_or_else(today);

        let songs_list = match fields.get("songsList") {
            Some(Value::Array(entries)) => entries.iter().filter_map(Song::from_value).collect(),
            _ => Vec::new(),
        };

        let order_list = match fields.get("orderList") {
            Some(Value::Array(entries)) => {
                entries.iter().filter_map(OrderItem::from_value).collect()
            }
            _ => default_order(),
        };

        Some(Self {
            program_name,
            program_date,
            songs_list,
            order_list,
        })
    }

    /// Date rendered the way the header shows it, e.g. "March 3, 2024".
    pub fn long_date(&self) -> String {
        self.program_date.format("%B %-d, %Y").to_string()
    }
}

/// A performable piece plus its attached chord/lyric sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    pub name: String,
    pub document: DocumentBlob,
    pub notes: String,
}

impl Song {
    pub fn new(name: impl Into<String>, document: DocumentBlob) -> Self {
        Self {
            name: name.into(),
            document,
            notes: String::new(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        // Files written by the browser version stored the sheet under `pdfData`.
        let document = fields
            .get("document")
            .or_else(|| fields.get("pdfData"))
            .and_then(Value::as_str)
            .and_then(DocumentBlob::from_data_uri)
            .unwrap_or_default();

        Some(Self {
            name: text_field(fields, "name"),
            document,
            notes: text_field(fields, "notes"),
        })
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One segment of the liturgy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub title: String,
    pub observation: String,
}

impl OrderItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            observation: String::new(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        Some(Self {
            title: text_field(fields, "title"),
            observation: text_field(fields, "observation"),
        })
    }
}

impl fmt::Display for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Opaque chord-sheet content. The bytes are never inspected; the blob is
/// addressed by its `data:` URI, which is also how it travels on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentBlob {
    media_type: String,
    bytes: Vec<u8>,
}

impl DocumentBlob {
    /// The media type is reduced to its lowercase essence (`type/subtype`),
    /// since that is all the `data:` URI form carries back.
    pub fn new(media_type: impl AsRef<str>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type_essence(media_type.as_ref()),
            bytes,
        }
    }

    /// Guess the media type from a file extension. Only the formats a chord
    /// sheet realistically comes in are recognized.
    pub fn from_file_bytes(extension: Option<&str>, bytes: Vec<u8>) -> Self {
        let media_type = match extension.map(str::to_ascii_lowercase).as_deref() {
            Some("pdf") => "application/pdf",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("txt") | Some("cho") | Some("chopro") => "text/plain",
            _ => FALLBACK_MEDIA_TYPE,
        };
        Self::new(media_type, bytes)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the media type, used when the blob has to be
    /// materialized for an external viewer.
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "application/pdf" => "pdf",
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "text/plain" => "txt",
            _ => "bin",
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            STANDARD.encode(&self.bytes)
        )
    }

    /// Parse a `data:` URI. Payloads without `;base64` are percent-decoded.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;

        let (media_type, is_base64) = match header.strip_suffix(";base64") {
            Some(media_type) => (media_type, true),
            None => (header, false),
        };

        let bytes = if is_base64 {
            STANDARD.decode(payload.trim()).ok()?
        } else {
            percent_decode(payload)?
        };

        Some(Self::new(media_type, bytes))
    }
}

impl Default for DocumentBlob {
    fn default() -> Self {
        Self::new(FALLBACK_MEDIA_TYPE, Vec::new())
    }
}

impl fmt::Debug for DocumentBlob {
    /// Payloads can be megabytes; print the size instead of the bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentBlob")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Serialize for DocumentBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_uri())
    }
}

/// Fresh deep copy of the default order of service.
pub fn default_order() -> Vec<OrderItem> {
    DEFAULT_ORDER_TITLES.iter().map(|title| OrderItem::new(*title)).collect()
}

/// Today's date on the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn media_type_essence(raw: &str) -> String {
    let essence = raw.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        FALLBACK_MEDIA_TYPE.to_string()
    } else {
        essence.to_ascii_lowercase()
    }
}

/// `None` on a truncated or non-hex escape.
fn percent_decode(payload: &str) -> Option<Vec<u8>> {
    let raw = payload.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let hex = std::str::from_utf8(raw.get(i + 1..i + 3)?).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    Some(out)
}

fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_program() -> ProgramData {
        ProgramData {
            program_name: "Easter Sunday".to_string(),
            program_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            songs_list: vec![Song {
                name: "Amazing Grace".to_string(),
                document: DocumentBlob::new("application/pdf", b"%PDF-1.4 sheet".to_vec()),
                notes: "Capo 2".to_string(),
            }],
            order_list: vec![OrderItem {
                title: "Worship".to_string(),
                observation: "Two songs".to_string(),
            }],
        }
    }

    #[test]
    fn serialized_program_decodes_to_the_same_program() {
        let program = sample_program();
        let value = serde_json::to_value(&program).unwrap();
        assert_eq!(ProgramData::from_value(&value), Some(program));
    }

    #[test]
    fn wire_format_uses_stable_field_names() {
        let value = serde_json::to_value(sample_program()).unwrap();
        assert_eq!(value["programName"], "Easter Sunday");
        assert_eq!(value["programDate"], "2024-03-31");
        assert_eq!(value["songsList"][0]["name"], "Amazing Grace");
        assert_eq!(value["songsList"][0]["notes"], "Capo 2");
        assert!(value["songsList"][0]["document"]
            .as_str()
            .unwrap()
            .starts_with("data:application/pdf;base64,"));
        assert_eq!(value["orderList"][0]["title"], "Worship");
        assert_eq!(value["orderList"][0]["observation"], "Two songs");
    }

    #[test]
    fn malformed_order_list_falls_back_to_defaults_and_keeps_songs() {
        let value = json!({
            "programName": "Evening",
            "programDate": "2024-01-01",
            "songsList": [{ "name": "Be Thou My Vision", "document": "", "notes": "" }],
            "orderList": "not a list",
        });

        let program = ProgramData::from_value(&value).unwrap();
        assert_eq!(program.order_list, default_order());
        assert_eq!(program.songs_list.len(), 1);
        assert_eq!(program.songs_list[0].name, "Be Thou My Vision");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let program = ProgramData::from_value(&json!({ "songsList": 3 })).unwrap();
        assert_eq!(program.program_name, DEFAULT_PROGRAM_NAME);
        assert_eq!(program.program_date, today());
        assert!(program.songs_list.is_empty());
        assert_eq!(program.order_list.len(), 5);
    }

    #[test]
    fn blank_name_and_bad_date_are_replaced() {
        let value = json!({ "programName": "  ", "programDate": "31/03/2024" });
        let program = ProgramData::from_value(&value).unwrap();
        assert_eq!(program.program_name, DEFAULT_PROGRAM_NAME);
        assert_eq!(program.program_date, today());
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let value = json!({
            "orderList": [{ "title": "Welcome" }, 7, null, { "observation": "quiet" }],
        });
        let program = ProgramData::from_value(&value).unwrap();
        assert_eq!(
            program.order_list,
            vec![
                OrderItem::new("Welcome"),
                OrderItem {
                    title: String::new(),
                    observation: "quiet".to_string()
                },
            ]
        );
    }

    #[test]
    fn legacy_pdf_data_key_is_accepted() {
        let value = json!({
            "songsList": [{ "name": "Holy", "pdfData": "data:application/pdf;base64,JVBERg==" }],
        });
        let program = ProgramData::from_value(&value).unwrap();
        assert_eq!(program.songs_list[0].document.bytes(), b"%PDF");
        assert_eq!(program.songs_list[0].document.media_type(), "application/pdf");
    }

    #[test]
    fn top_level_must_be_an_object() {
        assert_eq!(ProgramData::from_value(&json!([1, 2, 3])), None);
        assert_eq!(ProgramData::from_value(&Value::Null), None);
    }

    #[test]
    fn data_uri_without_base64_is_percent_decoded() {
        let blob = DocumentBlob::from_data_uri("data:text/plain,G%20C D%2c").unwrap();
        assert_eq!(blob.media_type(), "text/plain");
        assert_eq!(blob.bytes(), b"G C D,");
        assert!(DocumentBlob::from_data_uri("data:text/plain,50%").is_none());
        assert!(DocumentBlob::from_data_uri("data:text/plain,%zz").is_none());
        assert!(DocumentBlob::from_data_uri("https://example.com/a.pdf").is_none());
    }

    #[test]
    fn media_type_survives_the_data_uri() {
        for raw in ["", "text/plain;charset=utf-8", " Application/PDF "] {
            let blob = DocumentBlob::new(raw, b"G C".to_vec());
            let back = DocumentBlob::from_data_uri(&blob.to_data_uri()).unwrap();
            assert_eq!(back, blob);
        }
        assert_eq!(DocumentBlob::new("", Vec::new()).media_type(), FALLBACK_MEDIA_TYPE);
        assert_eq!(
            DocumentBlob::new("text/plain;charset=utf-8", Vec::new()).media_type(),
            "text/plain"
        );
    }

    #[test]
    fn long_date_spells_out_the_month() {
        assert_eq!(sample_program().long_date(), "March 31, 2024");
    }
}
