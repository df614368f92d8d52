use bubble_tally::annotate::OverlayAnnotator;
use bubble_tally::decoder::decode_qr_region;
use bubble_tally::tools::{DEFAULT_OVERLAY_PATH, load_rgb, save_rgb, scan_paths};
use bubble_tally::{CounterStore, FormReader, LumaPlane, ReaderConfig, Region, analyze_sections};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "formtool", version, about = "Tally form reader tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode scans into one tally and print it
    Decode {
        /// Scan files or directories of scans, applied in order
        #[arg(long, required = true, num_args = 1..)]
        image: Vec<PathBuf>,
        /// Where to write the diagnostic overlay
        #[arg(long, default_value = DEFAULT_OVERLAY_PATH)]
        annotate: PathBuf,
        /// Skip the diagnostic overlay
        #[arg(long)]
        no_annotate: bool,
        /// Rename entries after decoding, as KEY=NAME
        #[arg(long, value_parser = parse_rename)]
        rename: Vec<(String, String)>,
    },
    /// Print the rectangles probed for every row
    Layout,
    /// Analyse one bubble group
    Sections {
        #[arg(long)]
        image: PathBuf,
        /// Rectangle as x0,y0,x1,y1
        #[arg(long, value_parser = parse_region)]
        rect: Region,
        #[arg(long, default_value_t = 10)]
        sections: usize,
    },
    /// Decode the QR symbol inside one rectangle
    Key {
        #[arg(long)]
        image: PathBuf,
        /// Rectangle as x0,y0,x1,y1
        #[arg(long, value_parser = parse_region)]
        rect: Region,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Decode {
            image,
            annotate,
            no_annotate,
            rename,
        } => {
            let overlay = (!no_annotate).then_some(annotate.as_path());
            decode_cmd(&image, overlay, &rename)
        }
        Command::Layout => {
            layout_cmd();
            ExitCode::SUCCESS
        }
        Command::Sections {
            image,
            rect,
            sections,
        } => sections_cmd(&image, rect, sections),
        Command::Key { image, rect } => key_cmd(&image, rect),
    }
}

fn decode_cmd(inputs: &[PathBuf], overlay: Option<&Path>, renames: &[(String, String)]) -> ExitCode {
    let reader = FormReader::new();
    let store = CounterStore::new();
    let scans = scan_paths(inputs);
    let mut failures = 0usize;

    for (i, path) in scans.iter().enumerate() {
        let image = match load_rgb(path) {
            Ok(image) => image,
            Err(err) => {
                error!("{err}");
                failures += 1;
                continue;
            }
        };

        let mut annotator = OverlayAnnotator::new(&image);
        let report = reader.decode(&image, &store, &mut annotator);
        println!(
            "{}: {} rows applied, {} blank, {} unmarked, {} failed",
            path.display(),
            report.rows_applied(),
            report.blank_rows,
            report.unmarked_rows,
            report.failed_rows
        );
        for row in &report.applied {
            println!(
                "  row {:>2}: {} +{} ({}{}) -> {}",
                row.row, row.key, row.count, row.tens, row.ones, row.total
            );
        }

        if let Some(base) = overlay {
            let target = overlay_path(base, i, scans.len());
            if let Err(err) = save_rgb(annotator.image(), &target) {
                error!("{err}");
            }
        }
    }

    for (key, name) in renames {
        if !store.rename(key, name) {
            println!("No entry for {key}, rename ignored");
        }
    }

    println!();
    println!("{:<24} {:<24} {:>8}", "KEY", "NAME", "VALUE");
    for entry in store.snapshot() {
        println!(
            "{:<24} {:<24} {:>8}",
            entry.key, entry.display_name, entry.value
        );
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn layout_cmd() {
    let reader = FormReader::new();
    let layout = reader.layout();
    println!("{} rows, pitch {:.2}px", layout.rows, layout.pitch);
    for (row, regions) in layout.iter_rows().enumerate() {
        println!(
            "  row {:>2}: key={} tens={} ones={}",
            row, regions.key, regions.tens, regions.ones
        );
    }
}

fn sections_cmd(path: &Path, rect: Region, sections: usize) -> ExitCode {
    let image = match load_rgb(path) {
        Ok(image) => image,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let luma = LumaPlane::from_rgb(&image);
    let config = ReaderConfig::from_env();

    match analyze_sections(&luma, rect, sections, &config) {
        Ok(reading) => {
            println!("Region: {} ({} sections)", rect, sections);
            println!("Strip widths: {:?}", reading.strip_widths());
            println!("Dark counts:  {:?}", reading.counts());
            println!(
                "Mean: {:.1}, significance threshold: {:.1}",
                reading.mean(),
                (1.0 + config.significance_factor) * reading.mean()
            );
            match reading.winner() {
                Some(i) => println!("Standout: {i}"),
                None => println!("Standout: none"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn key_cmd(path: &Path, rect: Region) -> ExitCode {
    let image = match load_rgb(path) {
        Ok(image) => image,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let luma = LumaPlane::from_rgb(&image);

    match decode_qr_region(&luma, rect) {
        Ok(key) => {
            println!("Key: {key:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("No key: {err}");
            ExitCode::FAILURE
        }
    }
}

fn overlay_path(base: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "overlay".to_string());
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    base.with_file_name(format!("{stem}-{}.{ext}", index + 1))
}

fn parse_region(value: &str) -> Result<Region, String> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;
    match parts.as_slice() {
        [x0, y0, x1, y1] => Ok(Region::new(*x0, *y0, *x1, *y1)),
        _ => Err("expected x0,y0,x1,y1".to_string()),
    }
}

fn parse_rename(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, name)) if !key.is_empty() => Ok((key.to_string(), name.to_string())),
        _ => Err("expected KEY=NAME".to_string()),
    }
}
