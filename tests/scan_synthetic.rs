//! End-to-end scans over rendered pucks.

use image::{imageops, GrayImage, Luma};
use nalgebra::Point2;

use puckscan::synth;
use puckscan::{GrayView, PuckTemplate, ScanParams, Scanner};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn blank(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255u8]))
}

#[test]
fn single_symbol_decodes_without_alignment() {
    init();
    let mut canvas = blank(400, 400);
    let bits = synth::message_bits(&[0x41, 0x42]).unwrap();
    synth::draw_symbol(&mut canvas, &bits, 130, 130, 10);

    let scanner = Scanner::new(PuckTemplate::unipuck(), ScanParams::default());
    let result = scanner.scan(&GrayView::from_luma8(&canvas));

    assert_eq!(result.symbols.len(), 1);
    assert_eq!(result.symbols[0].message, Ok(vec![0x41, 0x42]));
    // One center can never fix a puck transform.
    assert!(result.alignment.is_none());
    assert!(result.symbols[0].slot.is_none());
}

#[test]
fn rotated_frames_still_decode() {
    init();
    let mut canvas = blank(400, 400);
    let bits = synth::message_bits(&[0x41, 0x42]).unwrap();
    synth::draw_symbol(&mut canvas, &bits, 130, 130, 10);

    let frames = [
        canvas.clone(),
        imageops::rotate90(&canvas),
        imageops::rotate180(&canvas),
        imageops::rotate270(&canvas),
    ];
    let scanner = Scanner::new(PuckTemplate::unipuck(), ScanParams::default());
    for (turn, frame) in frames.iter().enumerate() {
        let result = scanner.scan(&GrayView::from_luma8(frame));
        assert_eq!(result.symbols.len(), 1, "quarter turn {turn}");
        assert_eq!(
            result.symbols[0].message,
            Ok(vec![0x41, 0x42]),
            "quarter turn {turn}"
        );
    }
}

#[test]
fn populated_puck_is_aligned_and_sorted_by_slot() {
    init();
    let puck = PuckTemplate::unipuck();
    let module = 8u32;
    let extent = synth::symbol_extent(module) as i32;
    let scale = 600.0f32;
    let center = Point2::new(800.0f32, 800.0);

    // Three empty slots: alignment must work from a partial puck.
    let present: Vec<usize> = (0..puck.slot_count())
        .filter(|i| ![3usize, 8, 13].contains(i))
        .collect();

    let mut canvas = blank(1600, 1600);
    for &i in &present {
        let slot_center = center + puck.slots()[i].coords * scale;
        let bits = synth::message_bits(&[0x20 + i as u8]).unwrap();
        synth::draw_symbol(
            &mut canvas,
            &bits,
            slot_center.x as i32 - extent / 2,
            slot_center.y as i32 - extent / 2,
            module,
        );
    }

    let scanner = Scanner::new(puck, ScanParams::default());
    let result = scanner.scan(&GrayView::from_luma8(&canvas));

    assert_eq!(result.symbols.len(), present.len());
    let alignment = result.alignment.as_ref().expect("puck alignment");
    assert_eq!(alignment.inliers, present.len());
    let px_per_unit = alignment.transform.scale();
    assert!((px_per_unit - scale).abs() < scale * 0.02, "scale {px_per_unit}");

    // Scan output is sorted by slot index.
    for (symbol, &slot) in result.symbols.iter().zip(&present) {
        assert_eq!(symbol.slot, Some(slot));
        assert_eq!(symbol.message, Ok(vec![0x20 + slot as u8]));
    }
}
