use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const HEADERS: [&str; 8] = [
    "Crime ID",
    "Month",
    "LSOA code",
    "LSOA name",
    "Crime type",
    "Latitude",
    "Longitude",
    "Population Density (people per km^2)",
];

const CRIME_TYPES: [(&str, f64); 8] = [
    ("Anti-social behaviour", 0.28),
    ("Violence and sexual offences", 0.24),
    ("Shoplifting", 0.10),
    ("Criminal damage and arson", 0.09),
    ("Burglary", 0.08),
    ("Vehicle crime", 0.08),
    ("Public order", 0.08),
    ("Drugs", 0.05),
];

/// (town, centre latitude, centre longitude, number of LSOAs, base density)
const TOWNS: [(&str, f64, f64, usize, f64); 6] = [
    ("Leeds", 53.800, -1.549, 6, 4200.0),
    ("York", 53.959, -1.082, 4, 2500.0),
    ("Bristol, City of", 51.454, -2.587, 5, 3900.0),
    ("Cardiff", 51.481, -3.179, 4, 2600.0),
    ("Belfast", 54.597, -5.930, 3, 2900.0),
    ("Isles of Scilly", 49.914, -6.315, 1, 140.0),
];

const MONTHS: [&str; 3] = ["2025-01", "2025-02", "2025-03"];

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Pick from `(item, weight)` pairs; weights need not sum to one.
    fn weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for &(item, w) in items {
            if roll < w {
                return item;
            }
            roll -= w;
        }
        items[items.len() - 1].0
    }
}

/// One generated row; `None` cells are written empty.
struct Row {
    crime_id: Option<String>,
    month: &'static str,
    lsoa_code: String,
    lsoa_name: String,
    crime_type: &'static str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    density: f64,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut lsoa_no = 0u32;

    for &(town, lat, lon, n_lsoas, base_density) in &TOWNS {
        for i in 0..n_lsoas {
            lsoa_no += 1;
            let lsoa_code = format!("E01{lsoa_no:06}");
            let suffix = (b'A' + (i % 4) as u8) as char;
            let lsoa_name = format!("{town} {:03}{suffix}", i + 1);
            let density = (base_density * rng.range(0.5, 1.5)).round();
            let (lsoa_lat, lsoa_lon) = (lat + rng.range(-0.03, 0.03), lon + rng.range(-0.05, 0.05));

            for &month in &MONTHS {
                // Busier where denser.
                let n_crimes = (density / 250.0 * rng.range(0.6, 1.4)).round().max(1.0) as usize;
                for _ in 0..n_crimes {
                    let crime_type = rng.weighted(&CRIME_TYPES);
                    // Police data leaves anti-social behaviour without a crime ID.
                    let crime_id = (crime_type != "Anti-social behaviour")
                        .then(|| format!("{:016x}", rng.next_u64()));
                    // A few incidents lack a snapped location.
                    let located = rng.next_f64() > 0.02;
                    rows.push(Row {
                        crime_id,
                        month,
                        lsoa_code: lsoa_code.clone(),
                        lsoa_name: lsoa_name.clone(),
                        crime_type,
                        latitude: located.then(|| lsoa_lat + rng.range(-0.004, 0.004)),
                        longitude: located.then(|| lsoa_lon + rng.range(-0.004, 0.004)),
                        density,
                    });
                }
            }
        }
    }

    rows
}

fn write_csv(rows: &[Row], path: &Path) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer.write_record(HEADERS).expect("Failed to write CSV header");

    let opt = |v: Option<f64>| v.map(|v| format!("{v:.6}")).unwrap_or_default();
    for row in rows {
        writer
            .write_record([
                row.crime_id.clone().unwrap_or_default(),
                row.month.to_string(),
                row.lsoa_code.clone(),
                row.lsoa_name.clone(),
                row.crime_type.to_string(),
                opt(row.latitude),
                opt(row.longitude),
                row.density.to_string(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");
}

fn write_parquet(rows: &[Row], path: &Path) {
    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, true),
        Field::new(HEADERS[1], DataType::Utf8, false),
        Field::new(HEADERS[2], DataType::Utf8, false),
        Field::new(HEADERS[3], DataType::Utf8, false),
        Field::new(HEADERS[4], DataType::Utf8, false),
        Field::new(HEADERS[5], DataType::Float64, true),
        Field::new(HEADERS[6], DataType::Float64, true),
        Field::new(HEADERS[7], DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.crime_id.as_deref()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.month).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.lsoa_code.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.lsoa_name.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.crime_type).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.density).collect::<Vec<_>>(),
            )),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).expect("Failed to create data directory");

    let csv_path = out_dir.join("crime_data_merged.csv");
    let parquet_path = out_dir.join("crime_data_merged.parquet");
    write_csv(&rows, &csv_path);
    write_parquet(&rows, &parquet_path);

    let n_lsoas: usize = TOWNS.iter().map(|t| t.3).sum();
    println!(
        "Wrote {} crimes ({} LSOAs, {} months) to {} and {}",
        rows.len(),
        n_lsoas,
        MONTHS.len(),
        csv_path.display(),
        parquet_path.display()
    );
}
