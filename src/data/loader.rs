use std::io::Read;
use std::path::Path;
use std::time::Instant;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{SaleFields, SaleRecord, SalesDataset};
use super::parse::{parse_amount, parse_date, parse_integer, parse_quantity};
use super::schema::{Column, SourceLayout, SourceSlot};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a source could not be turned into a [`SalesDataset`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("cannot decode Arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("source has no header row")]
    EmptySource,
    #[error("source is missing columns {missing:?} (found {found:?})")]
    SchemaMismatch {
        missing: Vec<String>,
        found: Vec<String>,
    },
    #[error("column {0} appears more than once")]
    DuplicateColumn(String),
    #[error("{0}")]
    Shape(String),
    #[error("row {row}, column {column}: invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one sale per line (the primary format)
/// * `.json`    – `[{ "ORDER_NUMBER": 10107, ... }, ...]`
/// * `.parquet` – one column per schema field, any scalar Arrow type
pub fn load_file(path: &Path) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let started = Instant::now();
    let table = match ext.as_str() {
        "csv" | "txt" => read_csv(open(path)?)?,
        "json" => read_json(open(path)?)?,
        "parquet" | "pq" => read_parquet(open(path)?)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    let dataset = build_dataset(table)?;

    log::info!(
        "Loaded {} sales rows from {} in {:?}",
        dataset.len(),
        path.display(),
        started.elapsed()
    );
    Ok(dataset)
}

/// Load CSV from any reader, e.g. the bytes of a previous export.
pub fn load_csv<R: Read>(reader: R) -> Result<SalesDataset, LoadError> {
    build_dataset(read_csv(reader)?)
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// RawTable – every format is first reduced to text cells
// ---------------------------------------------------------------------------

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn build_dataset(table: RawTable) -> Result<SalesDataset, LoadError> {
    let layout = SourceLayout::resolve(&table.headers)?;

    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_row(&layout, row, i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SalesDataset::new(records, layout))
}

fn parse_row(layout: &SourceLayout, row: &[String], row_no: usize) -> Result<SaleRecord, LoadError> {
    let cell = |col: Column| row.get(layout.position(col)).map(String::as_str).unwrap_or("");

    fn field<T>(
        row_no: usize,
        col: Column,
        raw: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, LoadError> {
        parse(raw).ok_or_else(|| LoadError::InvalidValue {
            row: row_no,
            column: col.name(),
            value: raw.to_string(),
        })
    }
    let text = |col: Column| cell(col).trim().to_string();

    let fields = SaleFields {
        order_number: field(row_no, Column::OrderNumber, cell(Column::OrderNumber), parse_integer)?,
        order_date: field(row_no, Column::OrderDate, cell(Column::OrderDate), parse_date)?,
        quantity_ordered: field(
            row_no,
            Column::QuantityOrdered,
            cell(Column::QuantityOrdered),
            parse_quantity,
        )?,
        price_each: field(row_no, Column::PriceEach, cell(Column::PriceEach), parse_amount)?,
        msrp: field(row_no, Column::Msrp, cell(Column::Msrp), parse_amount)?,
        sales: field(row_no, Column::Sales, cell(Column::Sales), parse_amount)?,
        product_line: text(Column::ProductLine),
        product_code: text(Column::ProductCode),
        country: text(Column::Country),
        deal_size: text(Column::DealSize),
        status: text(Column::Status),
        customer_name: text(Column::CustomerName),
        year: field(row_no, Column::Year, cell(Column::Year), |s| {
            parse_integer(s).and_then(|y| i32::try_from(y).ok())
        })?,
    };

    let mut extras = vec![String::new(); layout.extra_count()];
    for (idx, (_, slot)) in layout.slots().enumerate() {
        if let SourceSlot::Extra(e) = slot {
            extras[e] = row.get(idx).cloned().unwrap_or_default();
        }
    }

    Ok(SaleRecord::new(fields, extras))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::EmptySource);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|v| v.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as `df.to_json(orient='records')`
/// writes it). Headers come from the first object's keys.
fn read_json<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Shape("expected a top-level JSON array".to_string()))?;

    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Shape(format!("row {} is not a JSON object", i + 1)))?;
        objects.push(obj);
    }

    if objects.is_empty() {
        return Err(LoadError::EmptySource);
    }
    // Header order is first appearance across all records; absent keys read as empty.
    let mut headers: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Every Arrow column is rendered to text and then goes through the same
/// cell parsers as CSV, so typed and string-typed files load identically.
fn read_parquet(file: std::fs::File) -> Result<RawTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch.columns();
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(columns.len());
            for col in columns {
                let cell = if col.is_null(row) {
                    String::new()
                } else {
                    array_value_to_string(col, row)?
                };
                cells.push(cell);
            }
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    pub(crate) const HEADER: &str = "ORDER_NUMBER,ORDER_DATE,QUANTITY_ORDERED,PRICE_EACH,MSRP,SALES,PRODUCTLINE,PRODUCTCODE,COUNTRY,DEALSIZE,STATUS,CUSTOMER_NAME,YEAR";

    fn csv_with(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn loads_rows_with_thousands_separators() {
        let text = csv_with(&[
            "\"10,107\",2/24/2003 0:00,30,95.7,95,\"2,871.00\",Motorcycles,S10_1678,USA,Small,Shipped,Land of Toys Inc.,2003",
        ]);
        let ds = load_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);

        let rec = &ds.records()[0];
        assert_eq!(rec.fields().order_number, 10107);
        assert_eq!(rec.fields().sales, 2871.0);
        assert_eq!(rec.year_month(), "2003-02");
        assert!((rec.profit() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn zero_price_row_loads_with_nan_margin() {
        let text = csv_with(&[
            "10100,2003-01-06,10,0,50,0,Ships,S18_1,France,Small,Shipped,Atelier,2003",
        ]);
        let ds = load_csv(text.as_bytes()).unwrap();
        assert!(ds.records()[0].profit_margin().is_nan());
    }

    #[test]
    fn invalid_cells_name_row_and_column() {
        let text = csv_with(&[
            "10100,2003-01-06,10,1,1,1,Ships,S18_1,France,Small,Shipped,Atelier,2003",
            "10101,yesterday,10,1,1,1,Ships,S18_1,France,Small,Shipped,Atelier,2003",
        ]);
        match load_csv(text.as_bytes()) {
            Err(LoadError::InvalidValue { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "ORDER_DATE");
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let text = csv_with(&[
            "10100,2003-01-06,10,1,1,-5,Ships,S18_1,France,Small,Shipped,Atelier,2003",
        ]);
        assert!(matches!(
            load_csv(text.as_bytes()),
            Err(LoadError::InvalidValue { column: "SALES", .. })
        ));
    }

    #[test]
    fn missing_columns_surface_as_schema_mismatch() {
        let text = "ORDER_NUMBER,SALES\n1,2\n";
        assert!(matches!(
            load_csv(text.as_bytes()),
            Err(LoadError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn empty_source_is_an_error() {
        assert!(load_csv("".as_bytes()).is_err());
    }

    #[test]
    fn extra_columns_are_kept() {
        let text = format!(
            "TERRITORY,{HEADER}\nEMEA,10100,2003-01-06,10,1,1,1,Ships,S18_1,France,Small,Shipped,Atelier,2003"
        );
        let ds = load_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].extras(), ["EMEA"]);
        assert_eq!(ds.records()[0].fields().country, "France");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("sales.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn json_records_load_like_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"ORDER_NUMBER": 10107, "ORDER_DATE": "2003-02-24", "QUANTITY_ORDERED": 30,
                "PRICE_EACH": 95.7, "MSRP": 95, "SALES": 2871.0, "PRODUCTLINE": "Motorcycles",
                "PRODUCTCODE": "S10_1678", "COUNTRY": "USA", "DEALSIZE": "Small",
                "STATUS": "Shipped", "CUSTOMER_NAME": "Land of Toys Inc.", "YEAR": 2003}}]"#
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].fields().customer_name, "Land of Toys Inc.");
        assert_eq!(ds.records()[0].fields().quantity_ordered, 30);
    }

    #[test]
    fn json_must_be_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        std::fs::write(&path, r#"{"ORDER_NUMBER": 1}"#).unwrap();
        assert!(matches!(load_file(&path), Err(LoadError::Shape(_))));
    }

    #[test]
    fn json_key_order_is_the_export_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        std::fs::write(
            &path,
            r#"[{"ORDER_NUMBER": 10107, "ORDER_DATE": "2003-02-24", "QUANTITY_ORDERED": 30,
                "PRICE_EACH": 95.7, "MSRP": 95, "SALES": 2871.0, "PRODUCTLINE": "Motorcycles",
                "PRODUCTCODE": "S10_1678", "COUNTRY": "USA", "DEALSIZE": "Small",
                "STATUS": "Shipped", "CUSTOMER_NAME": "Land of Toys Inc.", "YEAR": 2003}]"#,
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        let bytes = crate::data::export::to_csv_bytes(&crate::data::filter::apply(
            &ds,
            &crate::data::filter::FilterSelection::all(&ds),
        ))
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header_line = text.lines().next().unwrap();
        assert!(
            header_line.starts_with(HEADER),
            "unexpected header order: {header_line}"
        );
    }

    #[test]
    fn json_keys_missing_from_the_first_record_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        std::fs::write(
            &path,
            r#"[{"ORDER_NUMBER": 10100, "ORDER_DATE": "2003-01-06", "QUANTITY_ORDERED": 10,
                "PRICE_EACH": 1, "MSRP": 1, "SALES": 10, "PRODUCTLINE": "Ships",
                "PRODUCTCODE": "S18_1", "COUNTRY": "France", "DEALSIZE": "Small",
                "STATUS": "Shipped", "CUSTOMER_NAME": "Atelier", "YEAR": 2003},
               {"ORDER_NUMBER": 10101, "ORDER_DATE": "2003-01-09", "QUANTITY_ORDERED": 10,
                "PRICE_EACH": 1, "MSRP": 1, "SALES": 10, "PRODUCTLINE": "Ships",
                "PRODUCTCODE": "S18_2", "COUNTRY": "France", "DEALSIZE": "Small",
                "STATUS": "Shipped", "CUSTOMER_NAME": "Baane", "YEAR": 2003,
                "TERRITORY": "EMEA"}]"#,
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].extras(), [""]);
        assert_eq!(ds.records()[1].extras(), ["EMEA"]);
        assert!(ds.layout().export_headers().iter().any(|h| h == "TERRITORY"));
    }

    #[test]
    fn parquet_nulls_load_as_empty_cells() {
        use std::sync::Arc;

        use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let text = |v: &str| -> ArrayRef { Arc::new(StringArray::from(vec![v, v])) };
        let schema = Arc::new(Schema::new(vec![
            Field::new("ORDER_NUMBER", DataType::Int64, false),
            Field::new("ORDER_DATE", DataType::Utf8, false),
            Field::new("QUANTITY_ORDERED", DataType::Int64, false),
            Field::new("PRICE_EACH", DataType::Float64, false),
            Field::new("MSRP", DataType::Float64, false),
            Field::new("SALES", DataType::Float64, false),
            Field::new("PRODUCTLINE", DataType::Utf8, false),
            Field::new("PRODUCTCODE", DataType::Utf8, false),
            Field::new("COUNTRY", DataType::Utf8, false),
            Field::new("DEALSIZE", DataType::Utf8, false),
            Field::new("STATUS", DataType::Utf8, false),
            Field::new("CUSTOMER_NAME", DataType::Utf8, false),
            Field::new("YEAR", DataType::Int64, false),
            Field::new("TERRITORY", DataType::Utf8, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![10107, 10108])),
            text("2003-02-24"),
            Arc::new(Int64Array::from(vec![30, 20])),
            Arc::new(Float64Array::from(vec![95.7, 50.0])),
            Arc::new(Float64Array::from(vec![95.0, 45.0])),
            Arc::new(Float64Array::from(vec![2871.0, 1000.0])),
            text("Motorcycles"),
            text("S10_1678"),
            text("USA"),
            text("Small"),
            text("Shipped"),
            text("Land of Toys Inc."),
            Arc::new(Int64Array::from(vec![2003, 2003])),
            Arc::new(StringArray::from(vec![Some("EMEA"), None])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.fields().order_number, 10107);
        assert_eq!(first.fields().sales, 2871.0);
        assert_eq!(first.fields().msrp, 95.0);
        assert_eq!(first.extras(), ["EMEA"]);
        assert_eq!(ds.records()[1].extras(), [""]);
    }
}
