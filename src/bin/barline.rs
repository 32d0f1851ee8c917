//! Command-line barcode scanner
//!
//! Scans each image file for barcodes and prints one line per distinct
//! (type, text) pair through a format template.

// The CLI accepts every code type name, so it requires all decoders.
#[cfg(not(all(
    feature = "ean",
    feature = "code128",
    feature = "code39",
    feature = "i25"
)))]
compile_error!(
    "barline binary requires all symbology features enabled. \
     Build with default features: `cargo build --bin barline` \
     For a minimal library, use: `cargo build --lib --no-default-features --features ean`"
);

use std::collections::HashSet;
use std::io::Write;
use std::process;

use barline::{BarcodeScanner, CodeTypes, Directions, ScanConfig, ScannerResult};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::prelude::*;

const DEFAULT_FORMAT: &str = "%c [type: %t at: (%x,%y)]\\n";

/// Scan and decode 1-D bar codes from one or more image files
#[derive(Parser)]
#[command(name = "barline")]
#[command(version)]
#[command(about = "Scan and decode 1-D bar codes from one or more image files", long_about = None)]
struct Args {
    /// Initial binarization threshold (0-255)
    #[arg(short, long, default_value_t = 150)]
    threshold: u8,

    /// Scan directions: any, lr, rl, tb, bt or a comma separated list
    #[arg(short, long, default_value = "any", value_parser = Directions::parse_list)]
    directions: Directions,

    /// Code types: any, ean, code128, a type name or a comma separated list;
    /// code39-mod43 and code39-ext are only enabled by name [default: any]
    #[arg(short = 'c', long = "types", value_parser = CodeTypes::parse_list)]
    types: Option<CodeTypes>,

    /// Raster lines averaged into one scan line
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    concurrent_lines: u32,

    /// Raster lines between the starts of two scan lines
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
    line_skip: u32,

    /// Output template: %f file, %t type, %c code, %x/%y position, %% percent
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    format: String,

    /// Log decoding progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Do not print the summary or file errors
    #[arg(short, long)]
    quiet: bool,

    /// Image files to scan
    #[arg(required = true)]
    files: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "barline=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Expand the output template for one result
fn render(format: &str, file: &str, result: &ScannerResult) -> String {
    let mut out = String::with_capacity(format.len() + result.text.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('%', Some(spec)) => {
                match spec {
                    'f' => out.push_str(file),
                    't' => out.push_str(result.code_type.name()),
                    'c' => out.push_str(&result.text),
                    'x' => out.push_str(&result.x.to_string()),
                    'y' => out.push_str(&result.y.to_string()),
                    '%' => out.push('%'),
                    other => {
                        out.push('%');
                        out.push(other);
                    }
                }
                chars.next();
            }
            ('\\', Some(esc @ ('n' | 't' | '\\'))) => {
                out.push(match esc {
                    'n' => '\n',
                    't' => '\t',
                    _ => '\\',
                });
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = ScanConfig::new()
        .directions(args.directions)
        .threshold(args.threshold)
        .concurrent_lines(args.concurrent_lines)
        .line_skip(args.line_skip);
    if let Some(types) = args.types {
        config = config.types(types);
    }

    let mut total = 0;
    let mut failed = false;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for filename in &args.files {
        let img = match ::image::open(filename) {
            Ok(img) => img,
            Err(e) => {
                if !args.quiet {
                    error!(file = %filename, "failed to load image: {e}");
                }
                failed = true;
                continue;
            }
        };
        let gray = img.to_luma8();
        debug!(file = %filename, width = gray.width(), height = gray.height(), "scanning");

        // Same code read on several scan lines or directions is printed once
        let mut seen = HashSet::new();
        for result in BarcodeScanner::with_config(&gray, &config) {
            if !seen.insert((result.code_type, result.text.clone())) {
                continue;
            }
            total += 1;
            if out
                .write_all(render(&args.format, filename, &result).as_bytes())
                .is_err()
            {
                process::exit(2);
            }
        }
    }
    let _ = out.flush();

    if !args.quiet {
        eprintln!(
            "scanned {} barcode symbols from {} image(s)",
            total,
            args.files.len()
        );
    }
    if total == 0 || failed {
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barline::CodeType;

    fn result() -> ScannerResult {
        ScannerResult {
            code_type: CodeType::Ean13,
            text: "4006381333931".into(),
            x: 12,
            y: 40,
        }
    }

    #[test]
    fn test_default_format() {
        assert_eq!(
            render(DEFAULT_FORMAT, "a.png", &result()),
            "4006381333931 [type: ean13 at: (12,40)]\n"
        );
    }

    #[test]
    fn test_placeholders_and_escapes() {
        assert_eq!(
            render("%f:%t\\t%c 100%% %q", "b.png", &result()),
            "b.png:ean13\t4006381333931 100% %q"
        );
        assert_eq!(render("trailing %", "", &result()), "trailing %");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["barline", "-d", "lr,rl", "-c", "ean,code128", "x.png"])
            .unwrap();
        assert_eq!(args.directions, Directions::HORIZONTAL);
        let types = args.types.unwrap();
        assert!(types.contains(CodeType::Gs1_128));
        assert!(!types.contains(CodeType::Code39));
        assert_eq!(args.threshold, 150);
        assert!(Args::try_parse_from(["barline", "-d", "up", "x.png"]).is_err());
        assert!(Args::try_parse_from(["barline", "-c", "qr", "x.png"]).is_err());
        assert!(Args::try_parse_from(["barline", "x.png"]).unwrap().types.is_none());

        let args = Args::try_parse_from(["barline", "-c", "code39", "x.png"]).unwrap();
        let types = args.types.unwrap();
        assert!(types.contains(CodeType::Code39));
        assert!(!types.contains(CodeType::Code39Mod43));
    }
}
