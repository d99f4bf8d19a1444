//! Purpose: Define the stable public Rust API boundary for envelope decoding.
//! Exports: Decoder entry points, value and payload types, registry, and errors.
//! Role: Public, additive-only surface; `core` layout may move underneath it.
//! Invariants: Everything a caller needs to decode and inspect an envelope is re-exported here.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::diagnostic::{DiagnosticSink, NoopSink, RecordingSink, TracingSink};
pub use crate::core::envelope::{
    DecodeOptions, Envelope, EnvelopeDecoder, PreviousAttributes, PreviousAttributesPolicy,
    decode_envelope, decode_envelope_str,
};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::objects::{self, EventObject, ObjectType, RawObject};
pub use crate::core::registry::{
    DecodeFn, RegistryBuilder, TypeDescriptor, TypeRegistry, standard_registry,
};
pub use crate::core::value::{GenericValue, JsonKind, JsonNode, decode_value, decode_value_with};
