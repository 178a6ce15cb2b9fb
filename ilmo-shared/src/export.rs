/// Attendee CSV export
///
/// Output is UTF-8 with a byte order mark, `;`-delimited, CRLF-terminated,
/// quoting only where needed, so spreadsheet applications open it directly.
///
/// ```text
/// event;name;email;phone;<extra columns...>
/// ```
///
/// Extra columns are the decoded `attendee_details` keys in first-seen order.

use crate::models::attendee::{decode_details, AttendeeExportRow};
use serde_json::{Map, Value};

/// Fixed leading columns
pub const FIXED_COLUMNS: [&str; 4] = ["event", "name", "email", "phone"];

/// Download name used for exports
pub const EXPORT_FILENAME: &str = "osallistujat.csv";

const BOM: &str = "\u{feff}";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No attendees selected for export")]
    Empty,

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to finish CSV output: {0}")]
    Io(#[from] std::io::Error),
}

/// Flattens attendees into column maps
///
/// Fixed columns come first, followed by the decoded details. Details that do
/// not decode to a JSON object add no columns.
pub fn get_eventattendee_rows(attendees: &[AttendeeExportRow]) -> Vec<Map<String, Value>> {
    attendees
        .iter()
        .map(|attendee| {
            let mut row = Map::new();
            row.insert("event".to_string(), Value::String(attendee.event_title.clone()));
            row.insert("name".to_string(), Value::String(attendee.attendee_name.clone()));
            row.insert("email".to_string(), Value::String(attendee.attendee_email.clone()));
            row.insert("phone".to_string(), Value::String(attendee.attendee_phone.clone()));

            for (key, value) in decode_details(&attendee.attendee_details) {
                // details never override the fixed columns
                if !FIXED_COLUMNS.contains(&key.as_str()) {
                    row.insert(key, value);
                }
            }
            row
        })
        .collect()
}

/// Header row: fixed columns, then extra keys in first-seen order
pub fn header(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders the CSV document, BOM included
///
/// # Errors
///
/// `ExportError::Empty` when `attendees` is empty.
///
/// # Example
///
/// ```
/// use ilmo_shared::export::export_eventattendees_csv;
/// use ilmo_shared::models::attendee::AttendeeExportRow;
///
/// let rows = vec![AttendeeExportRow {
///     event_title: "Sitsit".to_string(),
///     attendee_name: "Jane Doe".to_string(),
///     attendee_email: "j@example.com".to_string(),
///     attendee_phone: "123".to_string(),
///     attendee_details: r#"{"diet": "vegan"}"#.to_string(),
/// }];
///
/// let csv = String::from_utf8(export_eventattendees_csv(&rows).unwrap()).unwrap();
/// assert_eq!(csv, "\u{feff}event;name;email;phone;diet\r\nSitsit;Jane Doe;j@example.com;123;vegan\r\n");
/// ```
pub fn export_eventattendees_csv(attendees: &[AttendeeExportRow]) -> Result<Vec<u8>, ExportError> {
    if attendees.is_empty() {
        return Err(ExportError::Empty);
    }

    let rows = get_eventattendee_rows(attendees);
    let columns = header(&rows);

    let mut buffer = BOM.as_bytes().to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .terminator(csv::Terminator::CRLF)
            .from_writer(&mut buffer);

        writer.write_record(&columns)?;
        for row in &rows {
            writer.write_record(columns.iter().map(|column| cell(row.get(column))))?;
        }
        writer.flush()?;
    }

    Ok(buffer)
}
