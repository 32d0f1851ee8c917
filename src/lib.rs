//! 1-D barcode scanning
//!
//! Scans raster images for EAN-13/EAN-8/UPC-A, Code 128/GS1-128, Code 39 and
//! Interleaved 2 of 5 barcodes. The image is read through a
//! [`LuminanceSource`] along horizontal and vertical scan lines; each line is
//! tokenized into bar/space runs with an adaptive threshold, and every run
//! that follows a quiet zone is offered to the symbology decoders.
//!
//! ```
//! use barline::{synth, BarcodeScanner, CodeType};
//!
//! let widths = synth::i25_widths("123456", 3).unwrap();
//! let image = synth::render_image(&widths, 2, 12, 16);
//!
//! let found = BarcodeScanner::new(&image).unique();
//! assert_eq!(found[0].code_type, CodeType::Code25i);
//! assert_eq!(found[0].text, "123456");
//! ```

pub mod color;
pub mod config;
mod decoder;
mod decoders;
pub mod direction;
pub mod error;
pub mod image;
pub mod scanner;
pub mod symbol;
pub mod synth;
pub mod tokenizer;

// Re-export main types
pub use color::Color;
pub use config::ScanConfig;
pub use direction::{Direction, Directions};
pub use error::{Error, Result};
pub use image::{Image, LuminanceSource};
pub use scanner::BarcodeScanner;
pub use symbol::{CodeType, CodeTypes, ScannerResult};
pub use tokenizer::{Token, Tokenizer};
