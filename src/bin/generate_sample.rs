use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use sales_dashboard::format::format_count;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64() as usize % items.len()]
    }
}

/// (product line, product code, msrp)
const PRODUCTS: &[(&str, &str, f64)] = &[
    ("Classic Cars", "S10_1949", 214.0),
    ("Classic Cars", "S12_1108", 207.0),
    ("Classic Cars", "S18_2238", 163.0),
    ("Vintage Cars", "S18_1749", 170.0),
    ("Vintage Cars", "S24_3151", 83.0),
    ("Motorcycles", "S10_1678", 95.0),
    ("Motorcycles", "S12_2823", 150.0),
    ("Trucks and Buses", "S12_1666", 136.0),
    ("Trucks and Buses", "S18_2319", 122.0),
    ("Planes", "S18_1662", 157.0),
    ("Planes", "S24_1785", 109.0),
    ("Ships", "S18_3029", 86.0),
    ("Ships", "S700_2610", 54.0),
    ("Trains", "S18_3259", 100.0),
    ("Trains", "S32_3207", 62.0),
];

/// (customer, country)
const CUSTOMERS: &[(&str, &str)] = &[
    ("Land of Toys Inc.", "USA"),
    ("Mini Gifts Distributors Ltd.", "USA"),
    ("Reims Collectables", "France"),
    ("Lyon Souveniers", "France"),
    ("Euro Shopping Channel", "Spain"),
    ("Australian Collectors, Co.", "Australia"),
    ("Toys4GrownUps.com", "USA"),
    ("Corporate Gift Ideas Co.", "USA"),
    ("Baane Mini Imports", "Norway"),
    ("Danish Wholesale Imports", "Denmark"),
    ("Dragon Souveniers, Ltd.", "Singapore"),
    ("Handji Gifts& Co", "Singapore"),
    ("Oulu Toy Supplies, Inc.", "Finland"),
    ("Tokyo Collectables, Ltd", "Japan"),
    ("UK Collectables, Ltd.", "UK"),
    ("Mini Caravy", "France"),
    ("Canadian Gift Exchange Network", "Canada"),
    ("Muscle Machine Inc", "USA"),
];

const STATUSES: &[&str] = &[
    "Shipped", "Shipped", "Shipped", "Shipped", "Shipped", "Shipped", "Cancelled", "Resolved",
    "On Hold", "In Process", "Disputed",
];

struct Row {
    order_number: i64,
    order_date: NaiveDate,
    quantity: i64,
    price_each: f64,
    msrp: f64,
    sales: f64,
    product_line: &'static str,
    product_code: &'static str,
    country: &'static str,
    deal_size: &'static str,
    status: &'static str,
    customer: &'static str,
}

fn deal_size(sales: f64) -> &'static str {
    if sales < 3000.0 {
        "Small"
    } else if sales < 7000.0 {
        "Medium"
    } else {
        "Large"
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let first_day = NaiveDate::from_ymd_opt(2003, 1, 6).expect("valid date");
    let mut rows = Vec::new();

    for order in 0..300i64 {
        let order_number = 10100 + order;
        // Orders are spread over roughly 29 months, in date order.
        let order_date = first_day + chrono::Duration::days(order * 3 + rng.range(0, 2) as i64);
        let &(customer, country) = rng.pick(CUSTOMERS);
        let status = *rng.pick(STATUSES);

        for _ in 0..rng.range(1, 5) {
            let &(product_line, product_code, msrp) = rng.pick(PRODUCTS);
            let quantity = rng.range(20, 50) as i64;
            let price_each = round2(msrp * (0.8 + 0.4 * rng.next_f64()));
            let sales = round2(quantity as f64 * price_each);
            rows.push(Row {
                order_number,
                order_date,
                quantity,
                price_each,
                msrp,
                sales,
                product_line,
                product_code,
                country,
                deal_size: deal_size(sales),
                status,
                customer,
            });
        }
    }

    // A complimentary line: zero price, so the margin is undefined.
    let complimentary = rows.last().map(|last| Row {
        price_each: 0.0,
        sales: 0.0,
        deal_size: "Small",
        ..*last
    });
    rows.extend(complimentary);
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "ORDER_NUMBER",
        "ORDER_DATE",
        "QUANTITY_ORDERED",
        "PRICE_EACH",
        "MSRP",
        "SALES",
        "PRODUCTLINE",
        "PRODUCTCODE",
        "COUNTRY",
        "DEALSIZE",
        "STATUS",
        "CUSTOMER_NAME",
        "YEAR",
    ])?;
    for r in rows {
        writer.write_record([
            // Thousands separators, as exported by spreadsheet tools.
            format_count(r.order_number as usize),
            format!(
                "{}/{}/{} 0:00",
                r.order_date.month(),
                r.order_date.day(),
                r.order_date.year()
            ),
            r.quantity.to_string(),
            format!("{:.2}", r.price_each),
            format!("{:.0}", r.msrp),
            format!("{:.2}", r.sales),
            r.product_line.to_string(),
            r.product_code.to_string(),
            r.country.to_string(),
            r.deal_size.to_string(),
            r.status.to_string(),
            r.customer.to_string(),
            r.order_date.year().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let ints = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let floats = |f: fn(&Row) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let dates: ArrayRef = Arc::new(StringArray::from(
        rows.iter()
            .map(|r| r.order_date.format("%Y-%m-%d").to_string())
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("ORDER_NUMBER", ints(|r| r.order_number)),
        ("ORDER_DATE", dates),
        ("QUANTITY_ORDERED", ints(|r| r.quantity)),
        ("PRICE_EACH", floats(|r| r.price_each)),
        ("MSRP", floats(|r| r.msrp)),
        ("SALES", floats(|r| r.sales)),
        ("PRODUCTLINE", text(|r| r.product_line)),
        ("PRODUCTCODE", text(|r| r.product_code)),
        ("COUNTRY", text(|r| r.country)),
        ("DEALSIZE", text(|r| r.deal_size)),
        ("STATUS", text(|r| r.status)),
        ("CUSTOMER_NAME", text(|r| r.customer)),
        ("YEAR", ints(|r| i64::from(r.order_date.year()))),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "sales_data.csv")?;
    write_parquet(&rows, "sales_data.parquet")?;

    println!("Wrote {} sales rows to sales_data.csv and sales_data.parquet", rows.len());
    Ok(())
}
