//! fd44-core - Identity field codec for ASUS FD44 firmware modules
//!
//! ASUS boards of the 6-series, C602 and 7-series generations keep their
//! per-board identity (hardware address, sensor key, system UUID and serial
//! number) in an FD44 module inside the BIOS image. This crate decodes those
//! fields from an image and writes edited fields back into every copy of the
//! module, keeping the network controller region in sync.
//!
//! # Example
//!
//! ```ignore
//! use fd44_core::record::SerialNumber;
//! use fd44_core::{decode, encode, Decoded};
//!
//! fn change_serial(image: &[u8]) -> fd44_core::Result<Vec<u8>> {
//!     match decode(image)? {
//!         Decoded::Valid(mut decoded) => {
//!             decoded.record.serial_number = Some(SerialNumber::from_text("MT1234")?);
//!             encode(image, &decoded.info.identity, &decoded.record, &decoded.profile)
//!         }
//!         _ => Err(fd44_core::Error::MissingField { field: "module data" }),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod board;
pub mod error;
pub mod image;
pub mod module;
pub mod patch;
pub mod pipeline;
pub mod record;
pub mod scan;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
pub use pipeline::{
    decode, decode_with, encode, encode_decoded, Decoded, DecodedImage, EmptyImage, ImageInfo,
    PartialImage, Undecided,
};
