//! End-to-end tests against XLSX archives written on the fly.
//!
//! Run with: cargo test --test parse_workbook

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vsxlsx::container::WorkingDir;
use vsxlsx::{column, ParseOptions, Parser};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const HEADER: [&str; 5] = ["id", "name", "number", "date", "complete"];

const DATA: [[&str; 5]; 9] = [
    ["1", "foo", "65", "42736", "Yes"],
    ["2", "bar", "12", "42737", "No"],
    ["3", "baz", "7", "42738", "Yes"],
    ["4", "qux", "90", "42739", "No"],
    ["5", "quux", "3", "42740", "Yes"],
    ["6", "corge", "18", "42741", "Yes"],
    ["7", "grault", "25", "42742", "No"],
    ["8", "garply", "61", "42743", "Yes"],
    ["9", "", "44", "42716", "No"],
];

/// Builds worksheet and shared-strings XML from a grid of values.
/// Numeric values are stored inline, text through the shared strings
/// table, and empty values are left out.
#[derive(Default)]
struct SheetBuilder {
    strings: Vec<String>,
    rows: Vec<String>,
}

impl SheetBuilder {
    fn string_index(&mut self, value: &str) -> usize {
        match self.strings.iter().position(|s| s == value) {
            Some(idx) => idx,
            None => {
                self.strings.push(value.to_string());
                self.strings.len() - 1
            }
        }
    }

    fn row(&mut self, values: &[&str]) -> &mut Self {
        let r = self.rows.len() + 1;
        let mut xml = format!(r#"<row r="{}">"#, r);
        for (col, value) in values.iter().enumerate() {
            let reference = format!("{}{}", column::encode(col).to_uppercase(), r);
            if value.is_empty() {
                continue;
            }
            if value.parse::<f64>().is_ok() {
                xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value));
            } else {
                let idx = self.string_index(value);
                xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, idx));
            }
        }
        xml.push_str("</row>");
        self.rows.push(xml);
        self
    }

    fn sheet_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>{}</sheetData>
</worksheet>"#,
            self.rows.join("\n")
        )
    }

    fn strings_xml(&self) -> String {
        let entries: String = self
            .strings
            .iter()
            .map(|s| format!("<si><t>{}</t></si>", s))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
            self.strings.len(),
            entries
        )
    }
}

fn write_xlsx(path: &Path, parts: &[(&str, String)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="xml" ContentType="application/xml"/>
</Types>"#,
    )
    .unwrap();

    for (name, content) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Workspace with a `tmp` directory for extraction and a workbook path.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("tmp")).unwrap();
        Self { dir }
    }

    fn tmp(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn workbook_1(&self) -> PathBuf {
        let mut builder = SheetBuilder::default();
        builder.row(&HEADER);
        for row in &DATA {
            builder.row(row);
        }
        let path = self.path("workbook_1.xlsx");
        write_xlsx(
            &path,
            &[
                ("xl/sharedStrings.xml", builder.strings_xml()),
                ("xl/worksheets/sheet1.xml", builder.sheet_xml()),
            ],
        );
        path
    }

    fn parser(&self, file: &Path) -> Parser {
        let mut parser = Parser::new(file);
        parser.set_tmp_dir(self.tmp());
        parser
    }

    fn tmp_is_empty(&self) -> bool {
        fs::read_dir(self.tmp()).unwrap().next().is_none()
    }
}

fn assert_row(row: &vsxlsx::ParsedRow, expected: &[&str; 5]) {
    for (key, value) in HEADER.iter().zip(expected.iter()) {
        assert_eq!(row.get(key), Some(*value), "column {}", key);
    }
}

#[test]
fn test_parse() {
    let fx = Fixture::new();
    let mut parser = fx.parser(&fx.workbook_1());

    assert!(parser.parse(), "errors: {:?}", parser.errors());
    assert!(parser.errors().is_empty());

    let parsed = parser.parsed();
    assert_eq!(parsed.len(), 9);
    assert_row(&parsed[0], &DATA[0]);
    assert_row(&parsed[8], &DATA[8]);
    assert_eq!(parsed[0].keys().collect::<Vec<_>>(), HEADER.to_vec());
    assert_eq!(parsed[0].row_number, None);
}

#[test]
fn test_parse_with_row_numbers() {
    let fx = Fixture::new();
    let mut parser = fx.parser(&fx.workbook_1());
    parser.row_numbers(true);

    assert!(parser.parse());
    let parsed = parser.parsed();
    assert_eq!(parsed.len(), 9);
    assert_eq!(parsed[0].row_number, Some(2));
    assert_eq!(parsed[8].row_number, Some(10));
    assert_row(&parsed[0], &DATA[0]);

    let json = serde_json::to_value(&parsed[0]).unwrap();
    assert_eq!(json["__row_number"], 2);
    assert_eq!(json["name"], "foo");
}

#[test]
fn test_without_header_row() {
    let fx = Fixture::new();
    let mut parser = fx.parser(&fx.workbook_1());
    parser.has_header_row(false);

    assert!(parser.parse());
    let parsed = parser.parsed();
    assert_eq!(parsed.len(), 10);
    assert_eq!(parsed[0].get("a"), Some("id"));
    assert_eq!(parsed[1].keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d", "e"]);
    // The empty name cell is absent, so its column is too.
    assert_eq!(parsed[9].keys().collect::<Vec<_>>(), vec!["a", "c", "d", "e"]);
}

#[test]
fn test_header_overrides() {
    let fx = Fixture::new();
    let mut parser = fx.parser(&fx.workbook_1());
    parser.header_names([("0", "identifier"), ("D", "serial_date")]);

    assert!(parser.parse());
    for row in parser.parsed() {
        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["identifier", "name", "number", "serial_date", "complete"]
        );
    }
    assert_eq!(parser.parsed()[0].get("identifier"), Some("1"));
    assert_eq!(parser.parsed()[0].get("serial_date"), Some("42736"));
}

#[test]
fn test_missing_file() {
    let fx = Fixture::new();
    let missing = fx.path("nope.xlsx");
    let mut parser = fx.parser(&missing);

    assert!(!parser.parse());
    assert!(parser.parsed().is_empty());
    assert!(!parser.errors().is_empty());
    assert!(parser.errors()[0].contains("nope.xlsx"));
    assert!(fx.tmp_is_empty());
}

#[test]
fn test_missing_worksheet() {
    let fx = Fixture::new();
    let mut parser = fx.parser(&fx.workbook_1());
    parser.use_sheet(2);

    assert!(!parser.parse());
    assert_eq!(parser.errors(), ["Cannot find worksheet: 2".to_string()]);
    assert!(fx.tmp_is_empty());
}

#[test]
fn test_missing_shared_strings() {
    let fx = Fixture::new();
    let path = fx.path("no_strings.xlsx");
    let mut builder = SheetBuilder::default();
    builder.row(&["1", "2"]);
    write_xlsx(&path, &[("xl/worksheets/sheet1.xml", builder.sheet_xml())]);

    let mut parser = fx.parser(&path);
    assert!(!parser.parse());
    assert!(parser.errors()[0].starts_with("Cannot find shared strings"));
    assert!(fx.tmp_is_empty());
}

#[test]
fn test_not_an_archive() {
    let fx = Fixture::new();
    let path = fx.path("broken.xlsx");
    fs::write(&path, "this is not a zip archive").unwrap();

    let mut parser = fx.parser(&path);
    assert!(!parser.parse());
    assert!(parser.errors()[0].starts_with("Failed to unzip file: "));
    assert!(fx.tmp_is_empty());
}

#[test]
fn test_bad_shared_string_index() {
    let fx = Fixture::new();
    let path = fx.path("bad_index.xlsx");
    let sheet = r#"<worksheet><sheetData>
        <row r="1"><c r="A1" t="s"><v>4</v></c></row>
    </sheetData></worksheet>"#;
    write_xlsx(
        &path,
        &[
            ("xl/sharedStrings.xml", "<sst><si><t>only</t></si></sst>".to_string()),
            ("xl/worksheets/sheet1.xml", sheet.to_string()),
        ],
    );

    let mut parser = fx.parser(&path);
    assert!(!parser.parse());
    assert_eq!(parser.errors().len(), 1);
    assert!(parser.errors()[0].contains("out of range"));
    assert!(parser.parsed().is_empty());
    assert!(fx.tmp_is_empty());
}

#[test]
fn test_rich_and_inline_strings() {
    let fx = Fixture::new();
    let path = fx.path("rich.xlsx");
    let strings = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
        <si><t>Label</t></si>
        <si><r><rPr><b/></rPr><t>foo</t></r><r><t>bar</t></r></si>
    </sst>"#;
    let sheet = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
        <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>Other   Label</t></is></c></row>
        <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="inlineStr"><is><t>plain</t></is></c></row>
    </sheetData></worksheet>"#;
    write_xlsx(
        &path,
        &[
            ("xl/sharedStrings.xml", strings.to_string()),
            ("xl/worksheets/sheet1.xml", sheet.to_string()),
        ],
    );

    let mut parser = fx.parser(&path);
    assert!(parser.parse(), "errors: {:?}", parser.errors());
    let row = &parser.parsed()[0];
    assert_eq!(row.get("label"), Some("foobar"));
    assert_eq!(row.get("other_label"), Some("plain"));
}

#[test]
fn test_missing_tmp_dir() {
    let fx = Fixture::new();
    let mut parser = fx.parser(&fx.workbook_1());
    parser.set_tmp_dir(fx.path("not-there"));

    assert!(!parser.parse());
    assert!(parser.errors()[0].starts_with("Temporary directory does not exist"));
}

#[test]
fn test_reparse_replaces_result() {
    let fx = Fixture::new();
    let mut parser = fx.parser(&fx.workbook_1());

    assert!(parser.parse());
    assert_eq!(parser.parsed().len(), 9);

    parser.use_sheet(5);
    assert!(!parser.parse());
    assert!(parser.parsed().is_empty());
    assert_eq!(parser.errors().len(), 1);

    parser.use_sheet(1);
    assert!(parser.parse());
    assert!(parser.errors().is_empty());
    assert!(fx.tmp_is_empty());
}

#[test]
fn test_parse_file_with_options() {
    let fx = Fixture::new();
    let options = ParseOptions::new()
        .with_tmp_dir(fx.tmp())
        .with_row_numbers(true);

    let result = vsxlsx::parse_file_with_options(fx.workbook_1(), options);
    assert!(result.success);
    assert_eq!(result.rows.len(), 9);
    assert_eq!(result.rows[8].row_number, Some(10));
    assert!(fx.tmp_is_empty());
}

#[test]
fn test_shared_tmp_dir_same_stem() {
    let fx = Fixture::new();
    let original = fx.workbook_1();
    let copies: Vec<PathBuf> = ["left", "right"]
        .iter()
        .map(|dir| {
            fs::create_dir(fx.path(dir)).unwrap();
            let copy = fx.path(dir).join("workbook_1.xlsx");
            fs::copy(&original, &copy).unwrap();
            copy
        })
        .collect();

    let first = WorkingDir::extract(fx.tmp(), &copies[0]).unwrap();
    let second = WorkingDir::extract(fx.tmp(), &copies[1]).unwrap();
    assert_ne!(first.path(), second.path());
    assert!(first.cleanup());
    assert!(second.part("xl/worksheets/sheet1.xml").is_file());
    assert!(second.cleanup());
    assert!(fx.tmp_is_empty());

    let results: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = copies
            .iter()
            .map(|copy| {
                let mut parser = fx.parser(copy);
                scope.spawn(move || parser.parse() && parser.parsed().len() == 9)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, vec![true, true]);
    assert!(fx.tmp_is_empty());
}

#[test]
fn test_header_only_sheet() {
    let fx = Fixture::new();
    let path = fx.path("header_only.xlsx");
    let mut builder = SheetBuilder::default();
    builder.row(&HEADER);
    write_xlsx(
        &path,
        &[
            ("xl/sharedStrings.xml", builder.strings_xml()),
            ("xl/worksheets/sheet1.xml", builder.sheet_xml()),
        ],
    );

    let mut parser = fx.parser(&path);
    assert!(parser.parse(), "errors: {:?}", parser.errors());
    assert!(parser.parsed().is_empty());
    let headers = parser.headers().unwrap();
    assert_eq!(headers.names().collect::<Vec<_>>(), HEADER.to_vec());

    parser.has_header_row(false);
    assert!(parser.parse());
    assert!(parser.headers().is_none());
    assert_eq!(parser.parsed().len(), 1);
}
