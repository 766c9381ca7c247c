//! Shared test utilities for the clinic ledger.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test records with sensible defaults, and building an in-memory
//! report template.

use crate::{
    config::{ProductSeed, report_layout::ReportLayout},
    core::{access::AccessContext, staff},
    entities::{Category, StaffModel, StaffRole},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::io::{Cursor, Write};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// An admin context for tests.
#[must_use]
pub fn admin() -> AccessContext {
    AccessContext::admin("tester")
}

/// Parses a `YYYY-MM-DD` literal.
///
/// # Panics
/// Panics on a malformed literal.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Adds a staff member through the admin path.
pub async fn create_test_staff(
    db: &DatabaseConnection,
    name: &str,
    role: StaffRole,
) -> Result<StaffModel> {
    staff::create_staff(db, &admin(), name, role).await
}

fn seed(
    category: Category,
    name: &str,
    base_price: i64,
    senior_price: Option<i64>,
    standard_price: Option<i64>,
    is_group: bool,
) -> ProductSeed {
    ProductSeed {
        category,
        name: name.to_string(),
        base_price,
        senior_price,
        standard_price,
        is_group,
    }
}

/// A small slice of the clinic's price list.
///
/// # Defaults
/// * `기본검사` exam: 100,000
/// * `1회권` PT pass: senior 100,000 / standard 80,000
/// * `10회권` PT pass: senior 900,000 / standard 750,000
/// * `그룹 1개월` group PT: 350,000
/// * `ZT` retail: 55,000
#[must_use]
pub fn sample_seeds() -> Vec<ProductSeed> {
    vec![
        seed(Category::Exam, "기본검사", 100_000, None, None, false),
        seed(
            Category::PersonalTraining,
            "1회권",
            80_000,
            Some(100_000),
            Some(80_000),
            false,
        ),
        seed(
            Category::PersonalTraining,
            "10회권",
            750_000,
            Some(900_000),
            Some(750_000),
            false,
        ),
        seed(Category::PersonalTraining, "그룹 1개월", 350_000, None, None, true),
        seed(Category::Retail, "ZT", 55_000, None, None, false),
    ]
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Daily &amp; Co" sheetId="1" r:id="rId1"/></sheets><calcPr calcId="191029"/></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain" Target="calcChain.xml"/></Relationships>"#;

const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1" spans="1:30"><c r="A1" s="1" t="inlineStr"><is><t>Daily report</t></is></c></row><row r="3" spans="1:30"><c r="C3" s="2"/><c r="H3" s="2"/></row><row r="37" spans="1:30"><c r="P37" s="5"/><c r="Z37" s="6"/><c r="AF37" s="6"><f>SUM(Z37:Z50)</f></c></row><row r="51" spans="1:30"><c r="P51" s="5"/></row></sheetData><mergeCells count="1"><mergeCell ref="A1:F1"/></mergeCells></worksheet>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="0"/><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="1"><border/></borders><cellXfs count="7"><xf/><xf/><xf/><xf/><xf/><xf/><xf/></cellXfs></styleSheet>"#;

const CALC_CHAIN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<calcChain xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><c r="AF37" i="1"/></calcChain>"#;

/// Builds a minimal `.xlsx` template in memory.
///
/// The single sheet `Daily & Co` has styled cells at A1 (a title), C3 and H3
/// (date and weekday), P37/Z37 (first sale line), AF37 (a formula) and P51
/// (first expense line), plus a calculation chain.
///
/// # Panics
/// Panics if the archive cannot be written, which does not happen in memory.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn template_fixture() -> Vec<u8> {
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", SHEET),
        ("xl/styles.xml", STYLES),
        ("xl/calcChain.xml", CALC_CHAIN),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in parts {
        writer.start_file(name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

const SAMPLE_LAYOUT: &str = r#"
version = 1
sheet = "Daily & Co"
date_cell = "C3"
weekday_cell = "H3"
weekday_labels = ["월", "화", "수", "목", "금", "토", "일"]

[labels]
card = "카드"
cash = "현금"
bank_transfer = "계좌 이체"
exam = "운동 검사"
retail = "상품"

[sales_lines]
start_row = 37
capacity = 14
payment_method = "P"
category = "Q"
product = "U"
final_price = "Z"
short_date = "AD"

[expense_lines]
start_row = 51
capacity = 2
store_name = "P"
short_date = "T"
card_last4 = "V"
amount = "X"

[[tallies]]
category = "personal_training"
role = "senior"
period = "month"
count_cell = "E10"
amount_cell = "F10"

[[tallies]]
staff = "Kim"
period = "day"
count_cell = "E11"
"#;

/// Layout matching [`template_fixture`], with an expense capacity of two.
///
/// # Panics
/// Panics if the embedded layout is invalid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn sample_layout() -> ReportLayout {
    ReportLayout::from_toml_str(SAMPLE_LAYOUT).unwrap()
}
