// LogVista - core/ingest.rs
//
// Tabular source parsing: raw file bytes in, normalised rows out.
// Format is inferred from the file extension (.csv or .xlsx).
// Core layer: accepts in-memory buffers, never touches the filesystem.
//
// The .xlsx reader handles the subset of OOXML that log exports use:
// the first worksheet of the workbook, shared strings, inline strings,
// numeric, boolean, and formula-string cells. Styles (and therefore
// date *formatting*) are ignored; date cells arrive as Excel serial
// numbers and are converted during the derive step.

use crate::core::model::{LogRow, Value};
use crate::core::region::Region;
use crate::util::constants;
use crate::util::error::IngestError;
use std::io::{Cursor, Read};

/// A single parsed source file: kept column headers in file order, plus
/// one `LogRow` per data row.  Region is stamped by the loader after
/// parsing (classification needs the filename, not the content).
#[derive(Debug, Default)]
pub struct ParsedSource {
    pub columns: Vec<String>,
    pub rows: Vec<LogRow>,
}

/// Parse one source file's bytes according to its extension.
pub fn parse_source(name: &str, bytes: &[u8]) -> Result<ParsedSource, IngestError> {
    let lower = name.to_lowercase();
    if lower.ends_with(".csv") {
        parse_csv(name, bytes)
    } else if lower.ends_with(".xlsx") {
        parse_xlsx(name, bytes)
    } else {
        Err(IngestError::UnsupportedFormat {
            name: name.to_string(),
        })
    }
}

// =============================================================================
// Header routing
// =============================================================================

/// Where a source column's cells land on the `LogRow`.
enum ColumnTarget {
    Datetime,
    Exception,
    ObjectName,
    Region,
    Hour,
    HourLabel,
    Extra(String),
}

/// Placeholder headers (auto-generated index columns) are dropped, as
/// are columns with no header at all.
fn keep_header(header: &str) -> bool {
    !header.is_empty() && !header.starts_with(constants::UNNAMED_COLUMN_PREFIX)
}

fn target_for(header: &str) -> ColumnTarget {
    match header {
        constants::COL_DATETIME => ColumnTarget::Datetime,
        constants::COL_EXCEPTION => ColumnTarget::Exception,
        constants::COL_OBJECT_NAME => ColumnTarget::ObjectName,
        constants::COL_REGION => ColumnTarget::Region,
        constants::COL_HOUR => ColumnTarget::Hour,
        constants::COL_HOUR_LABEL => ColumnTarget::HourLabel,
        other => ColumnTarget::Extra(other.to_string()),
    }
}

/// Assemble `LogRow`s from a header row and positional data rows.
/// Shared by both formats so routing semantics cannot drift apart.
fn assemble(headers: &[String], data_rows: Vec<Vec<Value>>) -> ParsedSource {
    let targets: Vec<Option<ColumnTarget>> = headers
        .iter()
        .map(|h| keep_header(h).then(|| target_for(h)))
        .collect();

    let columns: Vec<String> = headers
        .iter()
        .filter(|h| keep_header(h))
        .cloned()
        .collect();

    let mut rows = Vec::with_capacity(data_rows.len());
    for cells in data_rows {
        let mut row = LogRow::default();
        for (idx, value) in cells.into_iter().enumerate() {
            if value.is_empty() {
                continue; // absent cells stay absent
            }
            // Cells beyond the header row (ragged data) have no column name.
            let Some(Some(target)) = targets.get(idx) else {
                continue;
            };
            match target {
                ColumnTarget::Datetime => row.datetime_cell = Some(value),
                ColumnTarget::Exception => row.exception = Some(value.to_string()),
                ColumnTarget::ObjectName => row.object_name = Some(value.to_string()),
                ColumnTarget::Region => row.region = Region::from_label(&value.to_string()),
                ColumnTarget::Hour => {
                    row.hour = value
                        .as_number()
                        .map(|n| n as u32)
                        .or_else(|| value.to_string().parse().ok());
                }
                ColumnTarget::HourLabel => row.hour_label = Some(value.to_string()),
                ColumnTarget::Extra(name) => {
                    row.extra.insert(name.clone(), value);
                }
            }
        }
        rows.push(row);
    }

    ParsedSource { columns, rows }
}

// =============================================================================
// CSV
// =============================================================================

/// CSV cells are untyped text; empty cells become `Value::Empty`.
fn parse_csv(name: &str, bytes: &[u8]) -> Result<ParsedSource, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::Csv {
            name: name.to_string(),
            source: e,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut data_rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Csv {
            name: name.to_string(),
            source: e,
        })?;
        let cells: Vec<Value> = record
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    Value::Empty
                } else {
                    Value::Text(cell.to_string())
                }
            })
            .collect();
        data_rows.push(cells);
    }

    tracing::debug!(
        source = name,
        rows = data_rows.len(),
        columns = headers.len(),
        "CSV parsed"
    );

    Ok(assemble(&headers, data_rows))
}

// =============================================================================
// XLSX
// =============================================================================

fn parse_xlsx(name: &str, bytes: &[u8]) -> Result<ParsedSource, IngestError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| IngestError::XlsxContainer {
            name: name.to_string(),
            source: e,
        })?;

    let shared = match read_member(&mut archive, name, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(name, &xml)?,
        None => Vec::new(),
    };

    // Resolve the first worksheet via workbook.xml + its rels; fall back
    // to the conventional path when either part is absent or unusual.
    let sheet_path = first_sheet_path(&mut archive, name)?
        .unwrap_or_else(|| "xl/worksheets/sheet1.xml".to_string());

    let sheet_xml = read_member(&mut archive, name, &sheet_path)?.ok_or_else(|| {
        IngestError::XlsxMissingPart {
            name: name.to_string(),
            part: sheet_path.clone(),
        }
    })?;

    let mut grid = parse_sheet(name, &sheet_xml, &shared)?;
    if grid.is_empty() {
        return Ok(ParsedSource::default());
    }

    let headers: Vec<String> = grid.remove(0).iter().map(|v| v.to_string()).collect();

    tracing::debug!(
        source = name,
        rows = grid.len(),
        columns = headers.len(),
        "Worksheet parsed"
    );

    Ok(assemble(&headers, grid))
}

/// Read a named archive member to a string.  A missing member is `None`,
/// not an error -- optional parts (sharedStrings) are simply absent in
/// some workbooks.
fn read_member(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
    member: &str,
) -> Result<Option<String>, IngestError> {
    let mut file = match archive.by_name(member) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(IngestError::XlsxContainer {
                name: name.to_string(),
                source: e,
            })
        }
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| IngestError::Io {
            name: name.to_string(),
            source: e,
        })?;
    Ok(Some(content))
}

/// Find the archive path of the workbook's first worksheet.
///
/// workbook.xml lists sheets in workbook order with relationship IDs;
/// the rels part maps those IDs to worksheet targets.
fn first_sheet_path(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, IngestError> {
    let Some(workbook) = read_member(archive, name, "xl/workbook.xml")? else {
        return Ok(None);
    };
    let Some(rid) = first_sheet_rid(name, &workbook)? else {
        return Ok(None);
    };
    let Some(rels) = read_member(archive, name, "xl/_rels/workbook.xml.rels")? else {
        return Ok(None);
    };
    let Some(target) = relationship_target(name, &rels, &rid)? else {
        return Ok(None);
    };

    // Targets are usually relative to xl/ ("worksheets/sheet1.xml");
    // absolute targets start with '/'.
    let path = if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else if target.starts_with("xl/") {
        target
    } else {
        format!("xl/{target}")
    };
    Ok(Some(path))
}

/// Relationship ID (`r:id`) of the first `<sheet>` element.
fn first_sheet_rid(name: &str, workbook_xml: &str) -> Result<Option<String>, IngestError> {
    let mut reader = quick_xml::Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) | Ok(quick_xml::events::Event::Empty(e))
                if local_name(e.name().as_ref()) == b"sheet" =>
            {
                for attr in e.attributes().flatten() {
                    if local_name(attr.key.as_ref()) == b"id" {
                        return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(IngestError::XlsxXml {
                    name: name.to_string(),
                    source: e,
                })
            }
            _ => {}
        }
        buf.clear();
    }
}

/// Target path for a relationship ID in a .rels part.
fn relationship_target(
    name: &str,
    rels_xml: &str,
    rid: &str,
) -> Result<Option<String>, IngestError> {
    let mut reader = quick_xml::Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) | Ok(quick_xml::events::Event::Empty(e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match local_name(attr.key.as_ref()) {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).into_owned())
                        }
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rid) {
                    return Ok(target);
                }
            }
            Ok(quick_xml::events::Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(IngestError::XlsxXml {
                    name: name.to_string(),
                    source: e,
                })
            }
            _ => {}
        }
        buf.clear();
    }
}

/// Parse sharedStrings.xml into the string table.
/// Rich-text runs are flattened: all `<t>` content within an `<si>` is
/// concatenated.
fn parse_shared_strings(name: &str, xml: &str) -> Result<Vec<String>, IngestError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if local_name(e.name().as_ref()) == b"t" {
                    in_t = true;
                }
            }
            Ok(quick_xml::events::Event::Text(t)) if in_t => {
                match t.unescape() {
                    Ok(text) => current.push_str(&text),
                    Err(e) => {
                        return Err(IngestError::XlsxXml {
                            name: name.to_string(),
                            source: e,
                        })
                    }
                };
            }
            Ok(quick_xml::events::Event::End(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_t = false,
                b"si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(IngestError::XlsxXml {
                    name: name.to_string(),
                    source: e,
                })
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Parse a worksheet into a dense positional grid.
///
/// Cells carry their column position in the `r` attribute ("B2");
/// omitted cells are padded with `Value::Empty` so every row lines up
/// against the header row by position.
fn parse_sheet(
    name: &str,
    xml: &str,
    shared: &[String],
) -> Result<Vec<Vec<Value>>, IngestError> {
    // No trim_text here: cell content is only captured inside <v>/<t>,
    // and leading/trailing whitespace in a cell is data.
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut grid: Vec<Vec<Value>> = Vec::new();
    let mut row: Vec<Value> = Vec::new();
    let mut next_col = 0usize;

    let mut cell_col: Option<usize> = None;
    let mut cell_type = String::new();
    let mut text = String::new();
    let mut capture = false;

    loop {
        let event = reader.read_event_into(&mut buf);
        match event {
            Ok(quick_xml::events::Event::Start(ref e))
            | Ok(quick_xml::events::Event::Empty(ref e)) => {
                let is_empty = matches!(event, Ok(quick_xml::events::Event::Empty(_)));
                match local_name(e.name().as_ref()) {
                    b"row" => {
                        row = Vec::new();
                        next_col = 0;
                    }
                    b"c" => {
                        cell_col = None;
                        cell_type.clear();
                        text.clear();
                        for attr in e.attributes().flatten() {
                            match local_name(attr.key.as_ref()) {
                                b"r" => {
                                    cell_col = column_index(&String::from_utf8_lossy(&attr.value));
                                }
                                b"t" => {
                                    cell_type =
                                        String::from_utf8_lossy(&attr.value).into_owned();
                                }
                                _ => {}
                            }
                        }
                        if is_empty {
                            // Self-closing cell: no value, advance position.
                            let col = cell_col.unwrap_or(next_col);
                            next_col = col + 1;
                        }
                    }
                    b"v" | b"t" => {
                        if !is_empty {
                            capture = true;
                        }
                    }
                    _ => {}
                }
            }
            Ok(quick_xml::events::Event::Text(ref t)) if capture => {
                match t.unescape() {
                    Ok(s) => text.push_str(&s),
                    Err(e) => {
                        return Err(IngestError::XlsxXml {
                            name: name.to_string(),
                            source: e,
                        })
                    }
                };
            }
            Ok(quick_xml::events::Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"v" | b"t" => capture = false,
                b"c" => {
                    let col = cell_col.unwrap_or(next_col);
                    if row.len() <= col {
                        row.resize(col + 1, Value::Empty);
                    }
                    row[col] = cell_value(&cell_type, &text, shared);
                    next_col = col + 1;
                }
                b"row" => grid.push(std::mem::take(&mut row)),
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(IngestError::XlsxXml {
                    name: name.to_string(),
                    source: e,
                })
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(grid)
}

/// Convert a raw cell (type attribute + accumulated text) to a `Value`.
fn cell_value(cell_type: &str, text: &str, shared: &[String]) -> Value {
    match cell_type {
        "s" => text
            .parse::<usize>()
            .ok()
            .and_then(|idx| shared.get(idx))
            .map(|s| Value::Text(s.clone()))
            .unwrap_or(Value::Empty),
        "str" | "inlineStr" | "d" => {
            if text.is_empty() {
                Value::Empty
            } else {
                Value::Text(text.to_string())
            }
        }
        "b" => Value::Bool(text == "1"),
        "e" => Value::Empty,
        // Untyped / "n": numeric, with a text fallback for odd producers.
        _ => {
            if text.is_empty() {
                Value::Empty
            } else if let Ok(n) = text.parse::<f64>() {
                Value::Number(n)
            } else {
                Value::Text(text.to_string())
            }
        }
    }
}

/// 0-based column index from a cell reference ("A1" -> 0, "AB3" -> 27).
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: String = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let mut acc = 0usize;
    for c in letters.chars() {
        acc = acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(acc - 1)
}

/// Shorthand: strip any namespace prefix from an XML name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_routes_well_known_columns() {
        let csv = "Datetime,Exception,Object Name,Server\n\
                   2024-06-01 10:15:00,NullReferenceException,JobRunner,app-01\n\
                   2024-06-01 11:00:00,TimeoutException,,app-02\n";
        let parsed = parse_source("NSK_errors.csv", csv.as_bytes()).unwrap();

        assert_eq!(
            parsed.columns,
            vec!["Datetime", "Exception", "Object Name", "Server"]
        );
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(
            parsed.rows[0].exception.as_deref(),
            Some("NullReferenceException")
        );
        assert_eq!(parsed.rows[0].object_name.as_deref(), Some("JobRunner"));
        // Empty cell stays absent, not "".
        assert_eq!(parsed.rows[1].object_name, None);
        assert_eq!(
            parsed.rows[1].extra.get("Server"),
            Some(&Value::Text("app-02".into()))
        );
        // Datetime is kept raw here; coercion happens in the derive step.
        assert_eq!(
            parsed.rows[0].datetime_cell,
            Some(Value::Text("2024-06-01 10:15:00".into()))
        );
        assert!(parsed.rows[0].datetime.is_none());
    }

    #[test]
    fn test_csv_drops_unnamed_and_empty_headers() {
        let csv = "Unnamed: 0,Exception,,Code\n0,Boom,junk,E42\n";
        let parsed = parse_source("MUM_log.csv", csv.as_bytes()).unwrap();
        assert_eq!(parsed.columns, vec!["Exception", "Code"]);
        assert_eq!(parsed.rows[0].exception.as_deref(), Some("Boom"));
        assert_eq!(
            parsed.rows[0].extra.get("Code"),
            Some(&Value::Text("E42".into()))
        );
        assert!(parsed.rows[0].extra.get("Unnamed: 0").is_none());
    }

    #[test]
    fn test_csv_tolerates_ragged_rows() {
        let csv = "Exception,Code\nBoom\nBang,E1,overflow\n";
        let parsed = parse_source("x.csv", csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].exception.as_deref(), Some("Boom"));
        assert!(parsed.rows[0].extra.is_empty());
        // The cell beyond the header row has no column and is dropped.
        assert_eq!(parsed.rows[1].extra.len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_source("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_corrupt_xlsx_is_container_error() {
        let err = parse_source("bad.xlsx", b"this is not a zip archive").unwrap_err();
        assert!(matches!(err, IngestError::XlsxContainer { .. }));
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("B2"), Some(1));
        assert_eq!(column_index("Z9"), Some(25));
        assert_eq!(column_index("AA10"), Some(26));
        assert_eq!(column_index("AB3"), Some(27));
        assert_eq!(column_index("123"), None);
    }

    /// Hand-built minimal workbook covering shared strings, inline
    /// strings, sparse cells, and numeric values.
    fn tiny_xlsx() -> Vec<u8> {
        use std::io::Write;
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let opts: zip::write::SimpleFileOptions = Default::default();

            zip.start_file("xl/workbook.xml", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="Logs" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
            )
            .unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Target="worksheets/sheet1.xml"/>
</Relationships>"#,
            )
            .unwrap();

            zip.start_file("xl/sharedStrings.xml", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
<sst><si><t>Datetime</t></si><si><t>Exception</t></si><si><t>Retries</t></si><si><t>TimeoutException</t></si></sst>"#,
            )
            .unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
<worksheet>
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1" t="s"><v>1</v></c>
      <c r="C1" t="s"><v>2</v></c>
    </row>
    <row r="2">
      <c r="A2" t="inlineStr"><is><t>2024-06-01 10:15:00</t></is></c>
      <c r="B2" t="s"><v>3</v></c>
      <c r="C2"><v>4</v></c>
    </row>
    <row r="3">
      <c r="B3" t="inlineStr"><is><t>DiskFullException</t></is></c>
    </row>
  </sheetData>
</worksheet>"#,
            )
            .unwrap();

            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_xlsx_parse_typed_and_sparse_cells() {
        let bytes = tiny_xlsx();
        let parsed = parse_source("MUM_june.xlsx", &bytes).unwrap();

        assert_eq!(parsed.columns, vec!["Datetime", "Exception", "Retries"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(
            parsed.rows[0].exception.as_deref(),
            Some("TimeoutException")
        );
        assert_eq!(
            parsed.rows[0].extra.get("Retries"),
            Some(&Value::Number(4.0))
        );
        // Sparse row: A3 omitted entirely, so Datetime is absent.
        assert!(parsed.rows[1].datetime_cell.is_none());
        assert_eq!(
            parsed.rows[1].exception.as_deref(),
            Some("DiskFullException")
        );
    }
}
