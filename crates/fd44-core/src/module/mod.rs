//! FD44 module: format constants, header search, body codec and replication

mod codec;
mod format;
mod header;
mod replicate;

pub use codec::{decode_body, encode_body, AsciiAddress, BodyFields, KeyRecord};
pub use format::*;
pub use header::{find_modules, is_empty_body, ModuleHeader, ModuleInstance};
pub use replicate::write_modules;
