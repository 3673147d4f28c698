use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};

const DEFAULT_ROWS: usize = 1_000_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "data/report_data.csv".to_string());
    let rows = match args.next() {
        Some(n) => n.parse()?,
        None => DEFAULT_ROWS,
    };

    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "id,amount,category,region,status")?;

    let mut rng = rand::rng();
    for i in 0..rows {
        let amount = rng.random_range(1..1000);
        let category = ['A', 'B', 'C', 'D'][rng.random_range(0..4)];
        let region =
            ["US", "EU", "ASIA", "AFRICA", "AUSTRALIA", "SOUTH AMERICA"][rng.random_range(0..6)];
        let status = ["open", "closed", "pending"][rng.random_range(0..3)];
        writeln!(writer, "{},{},{},{},{}", i, amount, category, region, status)?;
    }
    writer.flush()?;

    println!("Sample CSV generated: {} ({} rows)", path, rows);
    Ok(())
}
