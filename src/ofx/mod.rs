//! OFX 1.x output: fixed SGML header plus XML aggregate.

pub mod types;
pub mod writer;

pub use types::{OfxAmount, OfxDate, OfxDateTime};
pub use writer::{OFX_HEADER, OfxWriter};
