//! Stratus - a terminal-based explorer for hierarchical scientific data files.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use stratus::data::{ingest, Array, AttrValue, NetcdfSource, TreeNode};
use stratus::view::{project, SliceProjection};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "stratus")]
#[command(about = "A terminal-based explorer for hierarchical scientific data files", long_about = None)]
struct Args {
    /// Path to the data file to open
    file: PathBuf,

    /// Show only this sub-group of the file
    #[arg(long)]
    group: Option<String>,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Print a 2D slice of this variable (slash-separated tree path)
    #[arg(long)]
    slice: Option<String>,

    /// Row dimension index for --slice
    #[arg(long, default_value_t = 0)]
    row: usize,

    /// Column dimension index for --slice
    #[arg(long, default_value_t = 1)]
    col: usize,

    /// Fix a dimension for --slice, as name=index (repeatable)
    #[arg(long = "at", value_parser = parse_at)]
    at: Vec<(String, usize)>,
}

fn parse_at(s: &str) -> std::result::Result<(String, usize), String> {
    let (name, index) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=index, got '{}'", s))?;
    let index = index
        .parse::<usize>()
        .map_err(|e| format!("bad index in '{}': {}", s, e))?;
    Ok((name.to_string(), index))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging if --log option is provided
    if let Some(log_path) = &args.log {
        let log_path = log_path.clone();
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_writer(move || {
                std::fs::OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&log_path)
                    .expect("Failed to open log file")
            })
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting Stratus");
    }

    if !args.file.exists() {
        eprintln!("Error: Path not found: {}", args.file.display());
        std::process::exit(1);
    }

    // The handle stays open for the whole ingestion pass and is released
    // before anything is printed.
    let source = NetcdfSource::open(&args.file)?;
    let ingested = ingest(&source, args.group.as_deref())?;
    drop(source);

    print_tree(&ingested.root, 0);

    let report = &ingested.report;
    if !report.is_clean() {
        println!();
        if report.unresolved_refs > 0 {
            println!("Unresolved references: {}", report.unresolved_refs);
        }
        if !report.skipped.is_empty() {
            println!("Skipped entries: {}", report.skipped.len());
            for skip in &report.skipped {
                println!("  {}: {}", skip.path, skip.reason);
            }
        }
    }

    if let Some(ref var_path) = args.slice {
        let (node, array) = find_array(&ingested.root, var_path)?;
        let fixed: HashMap<String, usize> = args.at.iter().cloned().collect();
        let projection = project(array, args.row, args.col, &fixed, node)?;
        println!();
        print_slice(array, &projection);
    }

    Ok(())
}

fn find_array<'a>(root: &'a TreeNode, path: &str) -> Result<(&'a TreeNode, &'a Array)> {
    let trimmed = path.trim_matches('/');
    let (group_path, name) = match trimmed.rsplit_once('/') {
        Some((group, name)) => (group, name),
        None => ("", trimmed),
    };
    let node = root
        .subtree(group_path)
        .ok_or_else(|| stratus::StratusError::group_not_found(group_path))?;
    let array = node
        .array(name)
        .ok_or_else(|| stratus::StratusError::array_not_found(name))?;
    Ok((node, array))
}

fn print_tree(node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{}/", indent, node.name());

    if !node.dims().is_empty() {
        let mut dims: Vec<String> = node
            .dims()
            .iter()
            .map(|(name, extent)| format!("{}={}", name, extent))
            .collect();
        dims.sort();
        println!("{}  dimensions: {}", indent, dims.join(", "));
    }
    for array in node.coord_arrays() {
        println!("{}  {} (coordinate)", indent, describe_array(array));
        print_attributes(array, &indent);
    }
    for array in node.data_arrays() {
        println!("{}  {}", indent, describe_array(array));
        print_attributes(array, &indent);
    }
    for child in node.children() {
        print_tree(child, depth + 1);
    }
}

fn print_attributes(array: &Array, indent: &str) {
    let mut attributes: Vec<(&String, &AttrValue)> = array.attributes().iter().collect();
    attributes.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in attributes {
        println!("{}    {}: {}", indent, name, value);
    }
}

fn describe_array(array: &Array) -> String {
    let dims: Vec<String> = array
        .dim_names()
        .iter()
        .zip(array.shape())
        .map(|(name, extent)| format!("{}={}", name, extent))
        .collect();
    let mut out = format!(
        "{}({}) [{}D] {:?}",
        array.name(),
        dims.join(", "),
        array.rank(),
        array.kind()
    );
    if !array.attributes().is_empty() {
        out.push_str(&format!(" ({} attributes)", array.attributes().len()));
    }
    out
}

fn print_slice(array: &Array, projection: &SliceProjection) {
    if projection.fixed.is_empty() {
        println!("{}", array.name());
    } else {
        let info: Vec<String> = projection
            .fixed
            .iter()
            .map(|(dim, index)| format!("{}={}", dim, index))
            .collect();
        println!("{} ({})", array.name(), info.join(", "));
    }

    print!("{:>14}", format!("{}\\{}", projection.row_dim, projection.col_dim));
    for label in &projection.col_labels {
        print!(" {:>14}", label);
    }
    println!();

    for (r, row_label) in projection.row_labels.iter().enumerate() {
        print!("{:>14}", row_label);
        for c in 0..projection.col_labels.len() {
            print!(" {:>14.4}", projection.values[(r, c)]);
        }
        println!();
    }
}
