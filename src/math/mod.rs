//! Numeric core: Householder QR, least squares, and sketched least squares.

pub mod householder;
pub mod lstsq;
pub mod qr;
pub mod sketch;

pub use householder::*;
pub use lstsq::*;
pub use qr::*;
pub use sketch::*;
