//! ECC200 codeword placement for the 12x12 data region.
//!
//! The diagonal walk lays each 8-bit codeword down as an L-shaped "utah"
//! cluster, with one corner shape where the walk leaves the grid. A 12x12
//! region holds exactly 18 codewords with no remainder.

use super::reed_solomon::BLOCK_LEN;
use crate::sample::MATRIX_SIZE as GRID;

const NROW: i32 = GRID as i32;
const NCOL: i32 = GRID as i32;

/// Module coordinates `(row, col)` for each codeword, most significant bit
/// first. Rows count down from the top of the data region.
pub fn codeword_cells() -> [[(u8, u8); 8]; BLOCK_LEN] {
    let mut walk = Walk {
        cells: [[(0, 0); 8]; BLOCK_LEN],
        taken: [[false; GRID]; GRID],
    };

    let mut pos = 0usize;
    let mut row = 4i32;
    let mut col = 0i32;
    loop {
        // The only corner shape a 12x12 region hits: the walk reaches
        // (NROW, 0) once, and the codeword splits across both far edges.
        if row == NROW && col == 0 {
            walk.corner(pos);
            pos += 1;
        }
        // Sweep up and to the right.
        loop {
            if row < NROW && col >= 0 && !walk.taken[row as usize][col as usize] {
                walk.utah(pos, row, col);
                pos += 1;
            }
            row -= 2;
            col += 2;
            if row < 0 || col >= NCOL {
                break;
            }
        }
        row += 1;
        col += 3;
        // Sweep down and to the left.
        loop {
            if row >= 0 && col < NCOL && !walk.taken[row as usize][col as usize] {
                walk.utah(pos, row, col);
                pos += 1;
            }
            row += 2;
            col -= 2;
            if row >= NROW || col < 0 {
                break;
            }
        }
        row += 3;
        col += 1;
        if row >= NROW && col >= NCOL {
            break;
        }
    }
    debug_assert_eq!(pos, BLOCK_LEN);

    walk.cells
}

struct Walk {
    cells: [[(u8, u8); 8]; BLOCK_LEN],
    taken: [[bool; GRID]; GRID],
}

impl Walk {
    fn place(&mut self, pos: usize, bit: usize, mut row: i32, mut col: i32) {
        if row < 0 {
            row += NROW;
            col += 4 - ((NROW + 4) % 8);
        }
        if col < 0 {
            col += NCOL;
            row += 4 - ((NCOL + 4) % 8);
        }
        self.cells[pos][bit - 1] = (row as u8, col as u8);
        self.taken[row as usize][col as usize] = true;
    }

    fn utah(&mut self, pos: usize, row: i32, col: i32) {
        self.place(pos, 1, row - 2, col - 2);
        self.place(pos, 2, row - 2, col - 1);
        self.place(pos, 3, row - 1, col - 2);
        self.place(pos, 4, row - 1, col - 1);
        self.place(pos, 5, row - 1, col);
        self.place(pos, 6, row, col - 2);
        self.place(pos, 7, row, col - 1);
        self.place(pos, 8, row, col);
    }

    fn corner(&mut self, pos: usize) {
        self.place(pos, 1, NROW - 1, 0);
        self.place(pos, 2, NROW - 1, 1);
        self.place(pos, 3, NROW - 1, 2);
        self.place(pos, 4, 0, NCOL - 2);
        self.place(pos, 5, 0, NCOL - 1);
        self.place(pos, 6, 1, NCOL - 1);
        self.place(pos, 7, 2, NCOL - 1);
        self.place(pos, 8, 3, NCOL - 1);
    }
}
