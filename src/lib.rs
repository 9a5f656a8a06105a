//! Data Matrix puck scanning.
//!
//! Locates ECC200 Data Matrix symbols on a scanned sample puck, decodes
//! their messages with Reed-Solomon error correction, fits the puck's
//! circular slot template to the located symbols and labels each decoded
//! message with its slot index.
//!
//! The pipeline runs in four stages, composed by [`Scanner::scan`]:
//!
//! 1. [`locate`] finds the L-shaped finder pattern of every symbol
//!    candidate from contours of the thresholded frame.
//! 2. [`sample_bits`] projects the 12x12 module grid through each located
//!    geometry and reads it into a [`BitMatrix`].
//! 3. [`decode`] corrects up to five bad codewords and recovers the
//!    message bytes.
//! 4. [`align`] fits a [`PuckTemplate`] to the located centers and
//!    assigns each symbol its slot.
//!
//! Every stage is also usable on its own; [`synth`] renders valid symbols
//! for tests and demos.
//!
//! ## Quickstart
//!
//! ```no_run
//! use image::ImageReader;
//! use puckscan::{GrayView, PuckTemplate, ScanParams, Scanner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("puck.png")?.decode()?.to_luma8();
//! let scanner = Scanner::new(PuckTemplate::unipuck(), ScanParams::default());
//!
//! let result = scanner.scan(&GrayView::from_luma8(&img));
//! for symbol in &result.symbols {
//!     println!("slot {:?}: {:?}", symbol.slot, symbol.message);
//! }
//! # Ok(())
//! # }
//! ```

mod align;
mod decode;
mod geom;
mod locate;
mod logger;
mod params;
mod puck;
mod raster;
mod sample;
mod scanner;
mod segment;
pub mod synth;
mod threshold;

pub use align::{align, AlignError, AlignParams, PuckAlignment, Similarity};
pub use decode::{decode, DecodeError, END_OF_MESSAGE};
pub use locate::{locate, FinderPattern, LocateParams};
pub use logger::init_with_level;
pub use params::ScanParams;
pub use puck::{PuckIoError, PuckTemplate, PuckTemplateError, PuckTemplateSpec};
pub use raster::GrayView;
pub use sample::{sample_bits, BitMatrix, SampleParams, MATRIX_SIZE};
pub use scanner::{ScanResult, Scanner, Symbol};
