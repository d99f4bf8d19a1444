//! Purpose: Decode an event envelope into its typed payload and previous-values diff.
//! Exports: `Envelope`, `PreviousAttributes`, `PreviousAttributesPolicy`, `DecodeOptions`,
//! `EnvelopeDecoder`, `decode_envelope`, `decode_envelope_str`.
//! Role: Dispatches `object` through the type registry; `previous_attributes` stays generic.
//! Invariants: Structural envelope problems fail with no partial result.
//! Invariants: Unknown discriminator tags decode to `EventObject::Raw`, never an error.
//! Invariants: Unknown envelope fields are ignored.
//! Invariants: Per-type decoder errors are attached as the error source without rewriting.
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::core::diagnostic::TracingSink;
use crate::core::error::{Error, ErrorKind};
use crate::core::objects::{EventObject, RawObject};
use crate::core::registry::{TypeRegistry, standard_registry};
use crate::core::value::{GenericValue, decode_entries};

const OBJECT_FIELD: &str = "object";
const DISCRIMINATOR_FIELD: &str = "object.object";
const PREVIOUS_ATTRIBUTES_FIELD: &str = "previous_attributes";

/// Values of changed fields before the event, as sent alongside the payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PreviousAttributes {
    /// The envelope had no `previous_attributes` field.
    #[default]
    Absent,
    /// The envelope carried `"previous_attributes": null`.
    Null,
    Changed(BTreeMap<String, GenericValue>),
}

impl PreviousAttributes {
    /// The diff mapping; `Absent` and `Null` both read as `None`.
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, GenericValue>> {
        match self {
            PreviousAttributes::Changed(map) => Some(map),
            PreviousAttributes::Absent | PreviousAttributes::Null => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, PreviousAttributes::Absent)
    }

    pub fn get(&self, key: &str) -> Option<&GenericValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }
}

/// How to treat a `previous_attributes` value that is neither null nor an object.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PreviousAttributesPolicy {
    /// Leave the diff `Absent` and keep decoding.
    #[default]
    Ignore,
    /// Fail with `ErrorKind::WrongShape`.
    Reject,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodeOptions {
    pub previous_attributes: PreviousAttributesPolicy,
    /// When false, an envelope without `object` decodes with the payload unset.
    pub require_object: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self {
            previous_attributes: PreviousAttributesPolicy::Ignore,
            require_object: true,
        }
    }

    pub fn with_previous_attributes(mut self, policy: PreviousAttributesPolicy) -> Self {
        self.previous_attributes = policy;
        self
    }

    pub fn with_require_object(mut self, require_object: bool) -> Self {
        self.require_object = require_object;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    object: Option<EventObject>,
    previous_attributes: PreviousAttributes,
}

impl Envelope {
    pub fn object(&self) -> Option<&EventObject> {
        self.object.as_ref()
    }

    pub fn previous_attributes(&self) -> &PreviousAttributes {
        &self.previous_attributes
    }

    pub fn into_parts(self) -> (Option<EventObject>, PreviousAttributes) {
        (self.object, self.previous_attributes)
    }
}

pub struct EnvelopeDecoder<'r> {
    registry: &'r TypeRegistry,
    options: DecodeOptions,
}

impl<'r> EnvelopeDecoder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            options: DecodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    pub fn decode(&self, json: &Value) -> Result<Envelope, Error> {
        let Value::Object(fields) = json else {
            return Err(wrong_shape("envelope", "object", json));
        };

        let mut object = None;
        let mut previous_attributes = PreviousAttributes::Absent;
        for (key, value) in fields {
            match key.as_str() {
                PREVIOUS_ATTRIBUTES_FIELD => {
                    previous_attributes = self.decode_previous_attributes(value)?;
                }
                OBJECT_FIELD => object = Some(self.decode_object(value)?),
                other => tracing::trace!(field = other, "ignoring unknown envelope field"),
            }
        }

        if object.is_none() && self.options.require_object {
            return Err(Error::new(ErrorKind::MissingField)
                .with_message("envelope has no payload")
                .with_field(OBJECT_FIELD));
        }

        Ok(Envelope {
            object,
            previous_attributes,
        })
    }

    fn decode_previous_attributes(&self, value: &Value) -> Result<PreviousAttributes, Error> {
        match value {
            Value::Null => Ok(PreviousAttributes::Null),
            Value::Object(map) => Ok(PreviousAttributes::Changed(self.decode_map(map))),
            other => match self.options.previous_attributes {
                PreviousAttributesPolicy::Ignore => {
                    tracing::debug!(
                        kind = json_kind(other),
                        "ignoring previous_attributes that is not an object"
                    );
                    Ok(PreviousAttributes::Absent)
                }
                PreviousAttributesPolicy::Reject => Err(wrong_shape(
                    PREVIOUS_ATTRIBUTES_FIELD,
                    "object or null",
                    other,
                )),
            },
        }
    }

    fn decode_object(&self, value: &Value) -> Result<EventObject, Error> {
        let Value::Object(payload) = value else {
            return Err(wrong_shape(OBJECT_FIELD, "object", value));
        };
        let tag = match payload.get(OBJECT_FIELD) {
            Some(Value::String(tag)) => tag.as_str(),
            Some(other) => return Err(wrong_shape(DISCRIMINATOR_FIELD, "string", other)),
            None => {
                return Err(Error::new(ErrorKind::MissingField)
                    .with_message("payload has no type discriminator")
                    .with_field(DISCRIMINATOR_FIELD)
                    .with_hint("The payload object must carry its type tag under \"object\"."));
            }
        };

        match self.registry.lookup(tag) {
            Some(descriptor) => {
                let object = descriptor.decode(value).map_err(|err| {
                    Error::new(ErrorKind::Decode)
                        .with_message(format!("failed to decode {tag} payload"))
                        .with_field(OBJECT_FIELD)
                        .with_source(err)
                })?;
                tracing::debug!(tag, type_name = descriptor.type_name(), "decoded typed payload");
                Ok(object)
            }
            None => {
                tracing::debug!(tag, "no registered type; keeping raw payload");
                Ok(EventObject::Raw(RawObject::new(tag, self.decode_map(payload))))
            }
        }
    }

    // `serde_json::Value` has no node kinds outside JSON, so the sink never fires here.
    fn decode_map(&self, map: &Map<String, Value>) -> BTreeMap<String, GenericValue> {
        decode_entries(
            map.iter().map(|(key, value)| (key.as_str(), value)),
            &TracingSink,
        )
    }
}

/// Decodes with the standard registry and default options.
pub fn decode_envelope(json: &Value) -> Result<Envelope, Error> {
    EnvelopeDecoder::new(standard_registry()).decode(json)
}

/// Parses `text` with `serde_json`, then decodes it with the standard registry.
pub fn decode_envelope_str(text: &str) -> Result<Envelope, Error> {
    let json = serde_json::from_str::<Value>(text).map_err(|err| {
        Error::new(ErrorKind::WrongShape)
            .with_message("envelope is not valid JSON")
            .with_source(err)
    })?;
    decode_envelope(&json)
}

fn wrong_shape(field: &str, expected: &str, found: &Value) -> Error {
    Error::new(ErrorKind::WrongShape)
        .with_message(format!("expected {expected}, found {}", json_kind(found)))
        .with_field(field)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
