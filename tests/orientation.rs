//! Integration test for scan directions
//!
//! A barcode rotated by any multiple of 90 degrees, or mirrored, is read by
//! one of the four scan directions.

use barline::{synth, BarcodeScanner, CodeType, Direction, ScanConfig, ScannerResult};
use image::{imageops, GrayImage};

fn code128_image() -> GrayImage {
    let widths = synth::code128_widths("PJJ123C").expect("encodable text");
    synth::render_image(&widths, 2, 10, 48)
}

fn scan(image: &GrayImage, config: &ScanConfig) -> Vec<ScannerResult> {
    BarcodeScanner::with_config(image, config).unique()
}

#[test]
fn test_all_rotations_decode() {
    let img = code128_image();

    struct TestCase {
        name: &'static str,
        image: GrayImage,
        direction: Direction,
    }

    let test_cases = vec![
        TestCase {
            name: "0 degrees",
            image: img.clone(),
            direction: Direction::LeftRight,
        },
        TestCase {
            name: "90 degrees clockwise",
            image: imageops::rotate90(&img),
            direction: Direction::TopDown,
        },
        TestCase {
            name: "180 degrees",
            image: imageops::rotate180(&img),
            direction: Direction::RightLeft,
        },
        TestCase {
            name: "270 degrees clockwise",
            image: imageops::rotate270(&img),
            direction: Direction::BottomUp,
        },
    ];

    for test_case in test_cases {
        let found = scan(&test_case.image, &ScanConfig::new());
        assert_eq!(found.len(), 1, "expected one symbol at {}", test_case.name);
        assert_eq!(found[0].code_type, CodeType::Code128);
        assert_eq!(found[0].text, "PJJ123C", "wrong text at {}", test_case.name);

        // Only the matching direction reads it
        for direction in Direction::ALL {
            let config = ScanConfig::new().directions(direction);
            let count = BarcodeScanner::with_config(&test_case.image, &config).count();
            if direction == test_case.direction {
                assert!(count > 0, "{direction} should read {}", test_case.name);
            } else {
                assert_eq!(count, 0, "{direction} should not read {}", test_case.name);
            }
        }
    }
}

#[test]
fn test_mirrored_image_reads_right_to_left() {
    let img = imageops::flip_horizontal(&code128_image());
    let found = scan(&img, &ScanConfig::new().directions(Direction::RightLeft));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text, "PJJ123C");
}

#[test]
fn test_positions_follow_direction() {
    let img = code128_image();
    let lr = scan(&img, &ScanConfig::new().directions(Direction::LeftRight));
    assert_eq!((lr[0].x, lr[0].y), (20, 0));

    // The symbol starts at its first bar in the scan direction
    let rotated = imageops::rotate90(&img);
    let tb = scan(&rotated, &ScanConfig::new().directions(Direction::TopDown));
    assert_eq!((tb[0].x, tb[0].y), (0, 20));
}
