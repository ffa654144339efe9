use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HOURS: usize = 24 * 30;
const SENTINEL: f64 = -200.0;

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Replace a reading with the sentinel with probability `p`.
fn maybe_missing(rng: &mut StdRng, value: f64, p: f64) -> f64 {
    if rng.gen::<f64>() < p { SENTINEL } else { value }
}

struct Column {
    name: &'static str,
    values: Vec<f64>,
}

fn main() {
    let mut rng = StdRng::seed_from_u64(42);

    let names = [
        "CO(GT)",
        "PT08.S1(CO)",
        "NMHC(GT)",
        "C6H6(GT)",
        "PT08.S2(NMHC)",
        "NOx(GT)",
        "PT08.S3(NOx)",
        "NO2(GT)",
        "PT08.S4(NO2)",
        "PT08.S5(O3)",
        "T",
        "RH",
        "AH",
    ];
    let mut columns: Vec<Column> = names
        .iter()
        .map(|&name| Column {
            name,
            values: Vec::with_capacity(HOURS),
        })
        .collect();
    let mut dates = Vec::with_capacity(HOURS);
    let mut times = Vec::with_capacity(HOURS);

    for h in 0..HOURS {
        let hour = (h + 18) % 24;
        let day = 10 + (h + 18) / 24;
        dates.push(if day <= 31 {
            format!("{day:02}/03/2004")
        } else {
            format!("{:02}/04/2004", day - 31)
        });
        times.push(format!("{hour:02}.00.00"));

        // Rush-hour traffic drives every pollutant; temperature follows the sun.
        let rush = (-((hour as f64 - 8.5).powi(2)) / 4.0).exp()
            + (-((hour as f64 - 19.0).powi(2)) / 5.0).exp();
        let traffic = (0.3 + rush + gauss(&mut rng, 0.0, 0.15)).max(0.05);
        let temp = 12.0 + 6.0 * ((hour as f64 - 9.0) / 24.0 * 2.0 * std::f64::consts::PI).sin()
            + gauss(&mut rng, 0.0, 1.0);
        let rh = (60.0 - 1.5 * (temp - 12.0) + gauss(&mut rng, 0.0, 5.0)).clamp(10.0, 95.0);

        let co = 2.5 * traffic + gauss(&mut rng, 0.0, 0.2);
        let benzene = (12.0 * traffic + gauss(&mut rng, 0.0, 1.0)).max(0.1);
        let nmhc = 180.0 * traffic + gauss(&mut rng, 0.0, 20.0);
        let nox = 220.0 * traffic + gauss(&mut rng, 0.0, 25.0);
        let no2 = 60.0 + 70.0 * traffic + gauss(&mut rng, 0.0, 8.0);

        let readings = [
            maybe_missing(&mut rng, co.max(0.1), 0.05),
            850.0 + 230.0 * traffic + gauss(&mut rng, 0.0, 30.0),
            maybe_missing(&mut rng, nmhc.max(7.0), 0.25),
            benzene,
            600.0 + 50.0 * benzene - 0.6 * benzene.powi(2) + gauss(&mut rng, 0.0, 15.0),
            maybe_missing(&mut rng, nox.max(2.0), 0.05),
            1300.0 - 280.0 * traffic + gauss(&mut rng, 0.0, 40.0),
            maybe_missing(&mut rng, no2, 0.05),
            1400.0 + 15.0 * temp + 120.0 * traffic + gauss(&mut rng, 0.0, 40.0),
            800.0 + 500.0 * traffic + gauss(&mut rng, 0.0, 60.0),
            temp,
            rh,
            0.007 * rh * (0.06 * temp).exp() + gauss(&mut rng, 0.0, 0.02),
        ];

        // Whole-row sensor outages, as in the UCI recordings.
        let outage = rng.gen::<f64>() < 0.02;
        for (col, value) in columns.iter_mut().zip(readings) {
            col.values.push(if outage { SENTINEL } else { value });
        }
    }

    // ---- Parquet ----
    let mut fields = vec![
        Field::new("Date", DataType::Utf8, false),
        Field::new("Time", DataType::Utf8, false),
    ];
    fields.extend(columns.iter().map(|c| Field::new(c.name, DataType::Float64, false)));
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(dates.clone())),
        Arc::new(StringArray::from(times.clone())),
    ];
    arrays.extend(
        columns
            .iter()
            .map(|c| Arc::new(Float64Array::from(c.values.clone())) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), arrays).expect("Failed to create RecordBatch");

    let parquet_path = "AirQualityUCI_sample.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // ---- CSV, in the UCI layout: ';' separator, decimal comma ----
    let csv_path = "AirQualityUCI_sample.csv";
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(csv_path)
        .expect("Failed to create CSV file");

    let mut header = vec!["Date", "Time"];
    header.extend(columns.iter().map(|c| c.name));
    csv_writer.write_record(&header).expect("Failed to write CSV header");

    for row in 0..HOURS {
        let mut record = vec![dates[row].clone(), times[row].clone()];
        record.extend(columns.iter().map(|c| {
            let v = c.values[row];
            if v == SENTINEL {
                "-200".to_string()
            } else {
                format!("{v:.1}").replace('.', ",")
            }
        }));
        csv_writer.write_record(&record).expect("Failed to write CSV row");
    }
    csv_writer.flush().expect("Failed to flush CSV");

    println!("Wrote {HOURS} hourly readings to {parquet_path} and {csv_path}");
}
