//! Synthetic symbol rendering.
//!
//! Builds valid symbols from message bytes and paints them into grayscale
//! canvases. Integration tests scan these renders end to end, and demos
//! use them to produce known-good imagery without a camera.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use nalgebra::{Point2, Vector2};

use crate::decode::{codeword_cells, encode, DATA_LEN, END_OF_MESSAGE};
use crate::locate::FinderPattern;
use crate::sample::{BitMatrix, MATRIX_SIZE};

const SYMBOL_SIZE: usize = MATRIX_SIZE + 2;

/// Pad a message into a full data block. `None` when the message leaves no
/// room for the end-of-message codeword.
pub fn encode_data(message: &[u8]) -> Option<[u8; DATA_LEN]> {
    if message.len() >= DATA_LEN {
        return None;
    }
    let mut data = [END_OF_MESSAGE; DATA_LEN];
    data[..message.len()].copy_from_slice(message);
    Some(data)
}

/// Data-region bits encoding `message` with valid parity.
pub fn message_bits(message: &[u8]) -> Option<BitMatrix> {
    let block = encode(&encode_data(message)?);
    let mut bits = BitMatrix::default();
    for (byte, codeword) in block.iter().zip(codeword_cells()) {
        for (k, &(r, c)) in codeword.iter().enumerate() {
            bits.set(r as usize, c as usize, (byte >> (7 - k)) & 1 == 1);
        }
    }
    Some(bits)
}

/// Side length in pixels of a rendered symbol.
#[inline]
pub fn symbol_extent(module: u32) -> u32 {
    SYMBOL_SIZE as u32 * module
}

/// Whether the module at grid position `(row, col)` of the full 14x14
/// symbol is dark, finder edges and clock tracks included. The solid
/// corner sits at the bottom-left.
fn module_is_dark(bits: &BitMatrix, row: usize, col: usize) -> bool {
    if col == 0 || row == SYMBOL_SIZE - 1 {
        true
    } else if row == 0 {
        col % 2 == 0
    } else if col == SYMBOL_SIZE - 1 {
        row % 2 == 1
    } else {
        bits.get(row - 1, col - 1)
    }
}

/// Paint a symbol with its top-left at `(left, top)`, axis aligned. Dark
/// modules are drawn; light modules keep the canvas background.
pub fn draw_symbol(canvas: &mut GrayImage, bits: &BitMatrix, left: i32, top: i32, module: u32) {
    for row in 0..SYMBOL_SIZE {
        for col in 0..SYMBOL_SIZE {
            if module_is_dark(bits, row, col) {
                let rect = Rect::at(
                    left + (col as u32 * module) as i32,
                    top + (row as u32 * module) as i32,
                )
                .of_size(module, module);
                draw_filled_rect_mut(canvas, rect, Luma([0u8]));
            }
        }
    }
}

/// The finder pattern a perfect read of a symbol drawn by [`draw_symbol`]
/// would produce.
pub fn drawn_pattern(left: i32, top: i32, module: u32) -> FinderPattern {
    let extent = symbol_extent(module) as f32;
    let corner = Point2::new(left as f32, top as f32 + extent);
    FinderPattern::new(
        corner,
        Vector2::new(extent, 0.0),
        Vector2::new(0.0, -extent),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    #[test]
    fn rendered_bits_decode_back_to_the_message() {
        let message = [0x41u8, 0x42];
        let bits = message_bits(&message).unwrap();
        assert_eq!(decode(&bits), Ok(message.to_vec()));
    }

    #[test]
    fn empty_message_round_trips() {
        let bits = message_bits(&[]).unwrap();
        assert_eq!(decode(&bits), Ok(Vec::new()));
    }

    #[test]
    fn message_without_terminator_room_is_rejected() {
        assert!(encode_data(&[0u8; DATA_LEN]).is_none());
        assert!(message_bits(&[1, 2, 3, 4, 5, 6, 7, 8]).is_none());
    }

    #[test]
    fn drawn_symbol_samples_back_to_its_bits() {
        let bits = message_bits(&[7, 7, 7]).unwrap();
        let module = 10u32;
        let extent = symbol_extent(module);
        let mut canvas = GrayImage::from_pixel(extent + 40, extent + 40, Luma([255u8]));
        draw_symbol(&mut canvas, &bits, 20, 20, module);

        let view = crate::raster::GrayView::from_luma8(&canvas);
        let pattern = drawn_pattern(20, 20, module);
        let sampled = crate::sample::sample_bits(&view, &pattern, &Default::default());
        assert_eq!(sampled, bits);
    }
}
