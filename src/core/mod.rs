// Core modules implementing classification, decoding, and error modeling.
pub mod date;
pub mod decode;
pub mod error;
pub mod value;
