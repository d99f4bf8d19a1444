// Core modules implementing value decoding, type dispatch, and error modeling.
pub mod diagnostic;
pub mod envelope;
pub mod error;
pub mod objects;
pub mod registry;
pub mod value;
