// LogVista - core/export.rs
//
// Spreadsheet and CSV export of the filtered view.
// Core layer: writes to any Write (+ Seek for the zip container).
//
// The .xlsx writer emits the minimal OOXML package a single-sheet
// export needs: content types, package rels, workbook, workbook rels,
// a bare styles part, and one worksheet with inline-string cells.
// One sheet, all columns, header row, no index column.

use crate::core::model::LogTable;
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::{Seek, Write};
use std::path::Path;

/// Export the view to a single-sheet .xlsx workbook.
/// Returns the number of data rows written.
pub fn export_xlsx<W: Write + Seek>(
    table: &LogTable,
    view: &[usize],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    if view.len() > constants::MAX_EXPORT_ROWS {
        return Err(ExportError::TooManyRows {
            count: view.len(),
            max: constants::MAX_EXPORT_ROWS,
        });
    }

    let mut zip = zip::ZipWriter::new(writer);
    let opts: zip::write::SimpleFileOptions = Default::default();

    let xlsx_err = |source: zip::result::ZipError| ExportError::Xlsx {
        path: export_path.to_path_buf(),
        source,
    };
    let io_err = |source: std::io::Error| ExportError::Io {
        path: export_path.to_path_buf(),
        source,
    };

    zip.start_file("[Content_Types].xml", opts).map_err(xlsx_err)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes()).map_err(io_err)?;

    zip.start_file("_rels/.rels", opts).map_err(xlsx_err)?;
    zip.write_all(PACKAGE_RELS_XML.as_bytes()).map_err(io_err)?;

    zip.start_file("xl/workbook.xml", opts).map_err(xlsx_err)?;
    zip.write_all(workbook_xml().as_bytes()).map_err(io_err)?;

    zip.start_file("xl/_rels/workbook.xml.rels", opts)
        .map_err(xlsx_err)?;
    zip.write_all(WORKBOOK_RELS_XML.as_bytes()).map_err(io_err)?;

    zip.start_file("xl/styles.xml", opts).map_err(xlsx_err)?;
    zip.write_all(STYLES_XML.as_bytes()).map_err(io_err)?;

    zip.start_file("xl/worksheets/sheet1.xml", opts)
        .map_err(xlsx_err)?;
    zip.write_all(worksheet_xml(table, view).as_bytes())
        .map_err(io_err)?;

    zip.finish().map_err(xlsx_err)?;

    tracing::debug!(
        path = %export_path.display(),
        rows = view.len(),
        columns = table.columns.len(),
        "Spreadsheet export complete"
    );
    Ok(view.len())
}

/// Export the view to CSV with the same header row and cell strings as
/// the spreadsheet export.
pub fn export_csv<W: Write>(
    table: &LogTable,
    view: &[usize],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    if view.len() > constants::MAX_EXPORT_ROWS {
        return Err(ExportError::TooManyRows {
            count: view.len(),
            max: constants::MAX_EXPORT_ROWS,
        });
    }

    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(&table.columns)
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for &idx in view {
        let Some(row) = table.rows.get(idx) else {
            continue;
        };
        let record: Vec<String> = table.columns.iter().map(|col| row.cell(col)).collect();
        csv_writer
            .write_record(&record)
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

// =============================================================================
// OOXML parts
// =============================================================================

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="1"><fill><patternFill patternType="none"/></fill></fills>
<borders count="1"><border/></borders>
<cellStyleXfs count="1"><xf/></cellStyleXfs>
<cellXfs count="1"><xf xfId="0"/></cellXfs>
</styleSheet>"#;

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
        xml_escape(constants::EXPORT_SHEET_NAME)
    )
}

/// Build the worksheet: a header row of column names followed by one
/// row per view index, all cells as inline strings.
fn worksheet_xml(table: &LogTable, view: &[usize]) -> String {
    let mut xml = String::with_capacity(64 * (view.len() + 1) * table.columns.len().max(1));
    xml.push_str(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>"#,
    );

    push_row(&mut xml, 1, table.columns.iter().map(String::as_str));

    let mut row_num = 2u32;
    for &idx in view {
        let Some(row) = table.rows.get(idx) else {
            continue;
        };
        let cells: Vec<String> = table.columns.iter().map(|col| row.cell(col)).collect();
        push_row(&mut xml, row_num, cells.iter().map(String::as_str));
        row_num += 1;
    }

    xml.push_str("</sheetData>\n</worksheet>");
    xml
}

fn push_row<'a>(xml: &mut String, row_num: u32, cells: impl Iterator<Item = &'a str>) {
    use std::fmt::Write as _;
    let _ = write!(xml, "<row r=\"{row_num}\">");
    for (col, cell) in cells.enumerate() {
        if cell.is_empty() {
            continue;
        }
        let _ = write!(
            xml,
            "<c r=\"{}{row_num}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
            column_letters(col),
            xml_escape(cell)
        );
    }
    xml.push_str("</row>\n");
}

/// Column letters for a 0-based index (0 -> "A", 27 -> "AB").
fn column_letters(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII column letters")
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::derive;
    use crate::core::ingest;
    use crate::core::model::{LogRow, Value};
    use crate::core::region::Region;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn sample_table() -> LogTable {
        let mut row_a = LogRow {
            datetime_cell: Some(Value::Text("2024-06-01 10:15:00".into())),
            exception: Some("TimeoutException".into()),
            object_name: Some("JobRunner".into()),
            region: Region::Mumbai,
            ..Default::default()
        };
        row_a
            .extra
            .insert("Server".into(), Value::Text("app-01".into()));
        let row_b = LogRow {
            exception: Some("A & B <weird> \"quoted\"".into()),
            region: Region::Nashik,
            ..Default::default()
        };
        let mut table = LogTable {
            rows: vec![row_a, row_b],
            columns: vec![
                "Datetime".into(),
                "Exception".into(),
                "Object Name".into(),
                "Server".into(),
            ],
        };
        derive::derive(&mut table);
        table
    }

    #[test]
    fn test_csv_export_header_and_rows() {
        let table = sample_table();
        let view: Vec<usize> = vec![0, 1];
        let mut buf = Vec::new();
        let count = export_csv(&table, &view, &mut buf, &PathBuf::from("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Datetime,Exception,Object Name,Server,Region,Hour,Hour_Label"
        );
        assert!(output.contains("TimeoutException"));
        assert!(output.contains("Mumbai"));
    }

    #[test]
    fn test_csv_export_respects_view() {
        let table = sample_table();
        let mut buf = Vec::new();
        let count = export_csv(&table, &[1], &mut buf, &PathBuf::from("out.csv")).unwrap();
        assert_eq!(count, 1);
        let output = String::from_utf8(buf).unwrap();
        assert!(!output.contains("TimeoutException"));
        assert!(output.contains("Nashik"));
    }

    #[test]
    fn test_export_too_many_rows_rejected() {
        let table = sample_table();
        let view: Vec<usize> = (0..constants::MAX_EXPORT_ROWS + 1).collect();
        let err = export_csv(&table, &view, Vec::new(), &PathBuf::from("out.csv")).unwrap_err();
        assert!(matches!(err, ExportError::TooManyRows { .. }));
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
    }

    /// Exporting a view and re-ingesting the workbook yields the same
    /// columns and cell strings (modulo type coercion of empty cells).
    #[test]
    fn test_xlsx_round_trip() {
        let table = sample_table();
        let view: Vec<usize> = vec![0, 1];

        let mut cursor = Cursor::new(Vec::new());
        let count =
            export_xlsx(&table, &view, &mut cursor, &PathBuf::from("MUM_rt.xlsx")).unwrap();
        assert_eq!(count, 2);

        let bytes = cursor.into_inner();
        let parsed = ingest::parse_source("MUM_rt.xlsx", &bytes).unwrap();
        assert_eq!(parsed.columns, table.columns);
        assert_eq!(parsed.rows.len(), table.rows.len());

        // Re-derive so the Datetime column round-trips through coercion.
        let mut reloaded = LogTable {
            rows: parsed.rows,
            columns: parsed.columns,
        };
        derive::derive(&mut reloaded);

        for (orig, back) in table.rows.iter().zip(reloaded.rows.iter()) {
            for col in &table.columns {
                assert_eq!(orig.cell(col), back.cell(col), "column {col:?}");
            }
        }
    }
}
