pub mod codec;

pub use codec::{decode, encode_form, encode_xml, WireFormat};
