//! Sheet serializer: writes a [`Sheet`] as a minimal Office Open XML
//! workbook.
//!
//! The package holds one worksheet. Text cells are written as inline strings
//! so no shared-string table is needed; the header row uses cell style `1`
//! (bold).

use std::{borrow::Cow, io::Cursor};

use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
  Error, Result,
  archive::write_archive,
  sheet::{Cell, Sheet},
};

/// MIME type for `.xlsx` downloads.
pub const CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str =
  "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// Style 0 is the default; style 1 applies the bold font.
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

const BOLD_STYLE: &str = "1";

// ─── Public API ──────────────────────────────────────────────────────────────

/// Serialise `sheet` to the bytes of an `.xlsx` file.
pub fn write_xlsx(sheet: &Sheet) -> Result<Vec<u8>> {
  let workbook = workbook_xml(&sheet.name)?;
  let worksheet = worksheet_xml(sheet)?;

  write_archive(&[
    ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
    ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
    ("xl/workbook.xml", workbook.as_slice()),
    ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
    ("xl/styles.xml", STYLES_XML.as_bytes()),
    ("xl/worksheets/sheet1.xml", worksheet.as_slice()),
  ])
}

/// Spreadsheet column letters for a zero-based index: `0 → A`, `26 → AA`.
pub fn column_name(index: usize) -> String {
  let mut n = index + 1;
  let mut letters = Vec::new();
  while n > 0 {
    let rem = (n - 1) % 26;
    letters.push(b'A' + rem as u8);
    n = (n - 1) / 26;
  }
  letters.reverse();
  String::from_utf8_lossy(&letters).into_owned()
}

// ─── Parts ───────────────────────────────────────────────────────────────────

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_err(e: impl std::fmt::Display) -> Error { Error::Xml(e.to_string()) }

fn new_writer() -> Result<XmlWriter> {
  let mut writer = Writer::new(Cursor::new(Vec::new()));
  writer
    .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
    .map_err(xml_err)?;
  Ok(writer)
}

fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>> {
  let mut w = new_writer()?;

  let mut root = BytesStart::new("workbook");
  root.push_attribute(("xmlns", NS_MAIN));
  root.push_attribute(("xmlns:r", NS_REL));
  write(&mut w, Event::Start(root))?;
  write_start(&mut w, "sheets")?;

  let name = xml_chars(sheet_name);
  let mut sheet = BytesStart::new("sheet");
  sheet.push_attribute(("name", &*name));
  sheet.push_attribute(("sheetId", "1"));
  sheet.push_attribute(("r:id", "rId1"));
  write(&mut w, Event::Empty(sheet))?;

  write_end(&mut w, "sheets")?;
  write_end(&mut w, "workbook")?;
  Ok(w.into_inner().into_inner())
}

fn worksheet_xml(sheet: &Sheet) -> Result<Vec<u8>> {
  let mut w = new_writer()?;

  let mut root = BytesStart::new("worksheet");
  root.push_attribute(("xmlns", NS_MAIN));
  write(&mut w, Event::Start(root))?;

  if !sheet.columns.is_empty() {
    write_start(&mut w, "cols")?;
    for (i, column) in sheet.columns.iter().enumerate() {
      let index = (i + 1).to_string();
      let width = column.width.to_string();
      let mut col = BytesStart::new("col");
      col.push_attribute(("min", index.as_str()));
      col.push_attribute(("max", index.as_str()));
      col.push_attribute(("width", width.as_str()));
      col.push_attribute(("customWidth", "1"));
      write(&mut w, Event::Empty(col))?;
    }
    write_end(&mut w, "cols")?;
  }

  write_start(&mut w, "sheetData")?;

  let header: Vec<Cell> = sheet.headers().map(Cell::from).collect();
  write_row(&mut w, 1, &header, Some(BOLD_STYLE))?;
  for (i, row) in sheet.rows.iter().enumerate() {
    write_row(&mut w, i + 2, row, None)?;
  }

  write_end(&mut w, "sheetData")?;
  write_end(&mut w, "worksheet")?;
  Ok(w.into_inner().into_inner())
}

fn write_row(
  w: &mut XmlWriter,
  row_number: usize,
  cells: &[Cell],
  style: Option<&str>,
) -> Result<()> {
  let r = row_number.to_string();
  let mut row = BytesStart::new("row");
  row.push_attribute(("r", r.as_str()));
  write(w, Event::Start(row))?;

  for (i, cell) in cells.iter().enumerate() {
    let reference = format!("{}{row_number}", column_name(i));
    let mut c = BytesStart::new("c");
    c.push_attribute(("r", reference.as_str()));
    if let Some(s) = style {
      c.push_attribute(("s", s));
    }

    match cell {
      Cell::Number(n) => {
        write(w, Event::Start(c))?;
        write_text_elem(w, "v", &n.to_string())?;
      }
      Cell::Text(text) => {
        c.push_attribute(("t", "inlineStr"));
        write(w, Event::Start(c))?;
        write_start(w, "is")?;
        write_text_elem(w, "t", text)?;
        write_end(w, "is")?;
      }
    }
    write_end(w, "c")?;
  }

  write_end(w, "row")
}

// ─── XML writer helpers ──────────────────────────────────────────────────────

fn write(w: &mut XmlWriter, event: Event<'_>) -> Result<()> {
  w.write_event(event).map_err(xml_err)
}

fn write_start(w: &mut XmlWriter, tag: &str) -> Result<()> {
  write(w, Event::Start(BytesStart::new(tag)))
}

fn write_end(w: &mut XmlWriter, tag: &str) -> Result<()> {
  write(w, Event::End(BytesEnd::new(tag)))
}

fn write_text_elem(w: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
  write_start(w, tag)?;
  write(w, Event::Text(BytesText::new(&xml_chars(text))))?;
  write_end(w, tag)
}

/// `text` without the characters XML 1.0 cannot carry at all (C0 controls
/// other than tab, LF and CR, plus U+FFFE and U+FFFF). Escaping does not
/// help for these, so they are dropped.
fn xml_chars(text: &str) -> Cow<'_, str> {
  if text.chars().any(is_xml_illegal) {
    Cow::Owned(text.chars().filter(|c| !is_xml_illegal(*c)).collect())
  } else {
    Cow::Borrowed(text)
  }
}

fn is_xml_illegal(c: char) -> bool {
  matches!(
    c,
    '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
  )
}

#[cfg(test)]
mod tests {
  use std::io::Read as _;

  use super::*;
  use crate::sheet::Column;

  fn sample() -> Sheet {
    Sheet {
      name:    "Scores".to_owned(),
      columns: vec![
        Column { header: "S/N".to_owned(), width: 15.0 },
        Column { header: "NAMES".to_owned(), width: 15.0 },
      ],
      rows:    vec![vec![Cell::Number(1.0), Cell::from("Ada & Co <x>")]],
    }
  }

  fn part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut out = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
    out
  }

  #[test]
  fn column_names() {
    assert_eq!(column_name(0), "A");
    assert_eq!(column_name(25), "Z");
    assert_eq!(column_name(26), "AA");
    assert_eq!(column_name(51), "AZ");
    assert_eq!(column_name(52), "BA");
    assert_eq!(column_name(701), "ZZ");
    assert_eq!(column_name(702), "AAA");
  }

  #[test]
  fn package_contains_required_parts() {
    let bytes = write_xlsx(&sample()).unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    for required in [
      "[Content_Types].xml",
      "_rels/.rels",
      "xl/workbook.xml",
      "xl/_rels/workbook.xml.rels",
      "xl/styles.xml",
      "xl/worksheets/sheet1.xml",
    ] {
      assert!(names.contains(&required), "missing part {required}");
    }
  }

  #[test]
  fn header_is_bold_and_cells_are_typed() {
    let bytes = write_xlsx(&sample()).unwrap();
    let sheet = part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="1" t="inlineStr"><is><t>S/N</t></is></c>"#), "{sheet}");
    assert!(sheet.contains(r#"<c r="A2"><v>1</v></c>"#), "{sheet}");
    assert!(sheet.contains("Ada &amp; Co &lt;x&gt;"), "{sheet}");
    assert!(sheet.contains(r#"<col min="2" max="2" width="15" customWidth="1"/>"#), "{sheet}");
  }

  #[test]
  fn control_characters_are_dropped_from_cells() {
    let mut sheet = sample();
    sheet.name = "Sc\u{7}ores".to_owned();
    sheet.rows[0][1] = Cell::from("Ada\u{1}Obi\u{1F}\tX");

    let bytes = write_xlsx(&sheet).unwrap();
    let worksheet = part(&bytes, "xl/worksheets/sheet1.xml");
    let workbook = part(&bytes, "xl/workbook.xml");

    assert!(worksheet.contains("<t>AdaObi\tX</t>"), "{worksheet}");
    assert!(workbook.contains(r#"name="Scores""#), "{workbook}");
    for xml in [&worksheet, &workbook] {
      assert!(!xml.chars().any(is_xml_illegal), "{xml:?}");
    }
  }

  #[test]
  fn workbook_names_the_sheet() {
    let bytes = write_xlsx(&sample()).unwrap();
    let workbook = part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="Scores""#), "{workbook}");
  }
}
