mod cleaner;
mod columns;
mod models;
mod reader;
mod writer;

use anyhow::Result;
use clap::{Arg, Command};
use cleaner::{CleanOutcome, RecordCleaner};
use models::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("placement_screener=info")),
        )
        .init();

    let matches = Command::new("placement-screener")
        .version("1.0")
        .about("Screens campus placement applicant sheets against eligibility cutoffs")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Applicant workbook (.xlsx) with a 'Form responses 1' sheet")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output workbook path")
                .default_value("processed_file.xlsx"),
        )
        .get_matches();

    let config_file = matches.get_one::<String>("config").unwrap();
    let input_file = matches.get_one::<String>("input").unwrap();
    let output_file = matches.get_one::<String>("output").unwrap();

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        let default_config = Config::default();
        default_config.save_to_file(config_file)?;
        println!("   Edit {} to change the cutoffs; continuing with defaults.", config_file);
        default_config
    };
    config.validate()?;

    println!("🔍 Processing applicant sheet: {}", input_file);
    println!(
        "   Cutoffs: 10th >= {}, 12th >= {}, CGPA >= {}, Live KT <= {}, Drop <= {}, Gap <= {}",
        config.cutoff_10th,
        config.cutoff_12th,
        config.cutoff_btech_cgpa,
        config.cutoff_live_kt,
        config.cutoff_drop,
        config.cutoff_gap
    );
    println!("   Degree metric kept: {}", config.kept_metric());

    let table = reader::read_workbook(input_file)?;
    let input_rows = table.len();

    let cleaner = RecordCleaner::new(&config);
    let outcome = cleaner.run(table)?;

    writer::write_workbook(
        output_file,
        &outcome.cleaned,
        &outcome.removed,
        &config.sheet_name,
    )?;

    print_summary(input_rows, &outcome);
    println!("\n✅ Processing completed successfully!");
    println!("📂 Output written to: {}", output_file);
    Ok(())
}

fn print_summary(input_rows: usize, outcome: &CleanOutcome) {
    println!("\n📊 SUMMARY");
    println!("==========");
    println!("   Input rows: {}", input_rows);

    let duplicates = input_rows - outcome.cleaned.len() - outcome.removed.len();
    if duplicates > 0 {
        println!("   🔄 Duplicate identifiers dropped: {}", duplicates);
    }

    println!("\n   Removed per criterion:");
    for (criterion, count) in &outcome.removal_counts {
        println!("   ❌ {}: {}", criterion, count);
    }

    println!("\n   ✅ Eligible applicants: {}", outcome.cleaned.len());
    println!("   🗑️  Removed applicants: {}", outcome.removed.len());

    if !outcome.year_diagnostics.is_empty() {
        println!(
            "   ⚠️  Malformed year-of-passing values: {} (details in the log)",
            outcome.year_diagnostics.len()
        );
    }
}
