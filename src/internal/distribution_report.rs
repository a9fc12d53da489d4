#![allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]

//! Runs the distribution harness over every hash function and probe sequence, prints the ranked
//! results and optionally renders bar charts of the worst chains and clusters.

use std::{
    error::Error,
    path::{Path, PathBuf},
};

use clap::Parser;
use plotters::prelude::*;
use probebench::{
    analysis::{self, ChainReport, ClusterReport},
    hash_functions, probing,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

/// Font used for every chart
const FONT_FAMILY: &str = "sans-serif";
/// Caption font size
const TITLE_SIZE: u32 = 35;
/// Axis description font size
const TEXT_SIZE: u32 = 16;
/// Bar colors, cycled per bar
const COLORS: [RGBColor; 4] = [
    RGBColor(220, 50, 50),  // Bright red
    RGBColor(50, 90, 220),  // Bright blue
    RGBColor(50, 180, 50),  // Bright green
    RGBColor(180, 50, 180), // Bright magenta
];

/// Compare hash functions and probe sequences by how evenly they spread random keys
#[derive(Debug, Parser)]
#[command(name = "distribution_report", version, about)]
struct Args {
    /// Pairs inserted into each chained table
    #[arg(long, default_value_t = 100_000)]
    chained_elements: usize,
    /// Bucket count of each chained table
    #[arg(long, default_value_t = 1_000)]
    chained_buckets: usize,
    /// Pairs inserted into each open-addressing table
    #[arg(long, default_value_t = 10_000)]
    open_elements: usize,
    /// Initial capacity of each open-addressing table
    #[arg(long, default_value_t = 10_000)]
    open_capacity: usize,
    /// Seed for key generation; a random seed is drawn and logged when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Directory to write PNG charts into
    #[arg(long)]
    plot_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, "generating key-value pairs");

    // Generate the keys once so every configuration sees the same input
    let mut rng = StdRng::seed_from_u64(seed);
    let pairs = analysis::generate_pairs(args.chained_elements.max(args.open_elements), &mut rng);
    let chained_pairs = pairs.get(..args.chained_elements).unwrap_or(&pairs);
    let open_pairs = pairs.get(..args.open_elements).unwrap_or(&pairs);

    let chained = analysis::run_chained_suite(
        hash_functions::CHAINED_HASH_FUNCTIONS,
        args.chained_buckets,
        chained_pairs,
    );
    print_chained(&chained, chained_pairs.len());

    let open = analysis::run_open_addressing_suite(
        hash_functions::OPEN_ADDRESSING_HASH_FUNCTIONS,
        probing::PROBE_FUNCTIONS,
        args.open_capacity,
        open_pairs,
    );
    print_open_addressing(&open, open_pairs.len());

    if let Some(dir) = args.plot_dir {
        std::fs::create_dir_all(&dir)?;

        let chain_bars: Vec<(String, f64)> =
            chained.iter().map(|r| (r.name.clone(), r.max_chain as f64)).collect();
        plot_bars(
            &dir.join("max_chain.png"),
            "Longest Chain per Hash Function",
            "Longest chain (entries)",
            &chain_bars,
        )?;

        let cluster_bars: Vec<(String, f64)> = open
            .iter()
            .filter(|r| !r.table_full)
            .map(|r| (format!("{}/{}", r.name, r.probe), r.max_cluster as f64))
            .collect();
        plot_bars(
            &dir.join("max_cluster.png"),
            "Longest Cluster per Hash Function and Probe",
            "Longest cluster (slots)",
            &cluster_bars,
        )?;

        println!("Generated plot images in {}: max_chain.png, max_cluster.png", dir.display());
    }

    Ok(())
}

/// Prints the ranked chained results and the winner
fn print_chained(reports: &[ChainReport], elements: usize) {
    println!("=== Chained tables: {elements} pairs ===");
    for report in reports {
        println!(
            "  {}: filled {}/{} ({:.2}%), longest chain {}, shortest chain {}",
            report.name,
            report.filled_buckets,
            report.capacity,
            report.fill_percent,
            report.max_chain,
            report.min_chain
        );
    }
    if let Some(best) = reports.first() {
        println!(
            "Best hash function: {} (longest chain {}, fill {:.2}%)",
            best.name, best.max_chain, best.fill_percent
        );
    }
}

/// Prints the ranked open-addressing results and the winner
fn print_open_addressing(reports: &[ClusterReport], elements: usize) {
    println!("=== Open-addressing tables: {elements} pairs ===");
    for report in reports {
        let status = if report.table_full { " [table full]" } else { "" };
        println!(
            "  {} + {}: stored {} in {} slots (load {:.2}), longest cluster {}{}",
            report.name,
            report.probe,
            report.inserted,
            report.capacity,
            report.load_factor,
            report.max_cluster,
            status
        );
    }
    if let Some(best) = reports.first() {
        println!(
            "Best combination: {} + {} (longest cluster {})",
            best.name, best.probe, best.max_cluster
        );
    }
}

/// Renders one bar per `(label, value)` pair into a PNG at `path`
fn plot_bars(
    path: &Path,
    caption: &str,
    y_desc: &str,
    bars: &[(String, f64)],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_value = bars.iter().map(|(_, value)| *value).fold(0.0, f64::max) * 1.1; // Add 10% margin
    let max_value = if max_value > 0.0 { max_value } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..bars.len().max(1), 0.0..max_value)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len().max(1))
        .x_label_formatter(&|x| bars.get(*x).map(|(label, _)| label.clone()).unwrap_or_default())
        .y_desc(y_desc)
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        let color = COLORS.get(i % COLORS.len()).copied().unwrap_or(BLACK);
        Rectangle::new([(i, 0.0), (i + 1, *value)], color.filled())
    }))?;

    root.present()?;
    info!(path = %path.display(), bars = bars.len(), "chart written");
    Ok(())
}
