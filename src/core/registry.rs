//! Purpose: Map discriminator tags to the decoders of their concrete record types.
//! Exports: `TypeRegistry`, `RegistryBuilder`, `TypeDescriptor`, `DecodeFn`, `standard_registry`.
//! Role: Read-only lookup table consulted by the envelope decoder.
//! Invariants: Lookups are exact and case-sensitive; misses return `None`, never an error.
//! Invariants: A registry is immutable once built; tags are unique within it.
//! Notes: The process-wide standard registry is built lazily on first use and never mutated.
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::core::objects::{self, EventObject, ObjectType};

/// Structured decoder for one record type.
pub type DecodeFn = fn(&Value) -> Result<EventObject, serde_json::Error>;

#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    tag: &'static str,
    type_name: &'static str,
    decode: DecodeFn,
}

impl TypeDescriptor {
    pub fn of<T: ObjectType>() -> Self {
        Self {
            tag: T::TAG,
            type_name: T::TYPE_NAME,
            decode: decode_as::<T>,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn decode(&self, json: &Value) -> Result<EventObject, serde_json::Error> {
        (self.decode)(json)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn decode_as<T: ObjectType>(json: &Value) -> Result<EventObject, serde_json::Error> {
    T::deserialize(json).map(Into::into)
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<&'static str, TypeDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: ObjectType>(&mut self) -> Result<&mut Self, Error> {
        self.insert(TypeDescriptor::of::<T>())
    }

    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Result<&mut Self, Error> {
        if let Some(existing) = self.entries.get(descriptor.tag) {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!(
                    "tag {:?} is already registered to {}",
                    descriptor.tag, existing.type_name
                ))
                .with_hint("Each tag maps to exactly one record type."));
        }
        self.entries.insert(descriptor.tag, descriptor);
        Ok(self)
    }

    /// Inserts without the duplicate check; later entries replace earlier ones.
    pub(crate) fn insert_unchecked(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.entries.insert(descriptor.tag, descriptor);
        self
    }

    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            entries: self.entries,
        }
    }
}

#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<&'static str, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with no entries; every payload decodes to the raw wrapper.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in record catalog.
    pub fn standard() -> Self {
        let mut builder = RegistryBuilder::new();
        for descriptor in objects::standard_descriptors() {
            builder.insert_unchecked(descriptor);
        }
        builder.build()
    }

    pub fn lookup(&self, tag: &str) -> Option<&TypeDescriptor> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = self.entries.keys().copied().collect::<Vec<_>>();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static STANDARD: OnceLock<TypeRegistry> = OnceLock::new();

pub fn standard_registry() -> &'static TypeRegistry {
    STANDARD.get_or_init(TypeRegistry::standard)
}

#[cfg(test)]
mod tests {
    use super::{RegistryBuilder, TypeDescriptor, TypeRegistry, standard_registry};
    use crate::core::error::ErrorKind;
    use crate::core::objects::{Charge, EventObject, Refund, standard_descriptors};
    use serde_json::json;

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let registry = TypeRegistry::standard();
        assert_eq!(
            registry.lookup("charge").map(TypeDescriptor::type_name),
            Some("Charge")
        );
        for miss in ["", "Charge", "CHARGE", "charge ", "charges", "char", "unknown_future_type"] {
            assert!(registry.lookup(miss).is_none(), "unexpected hit for {miss:?}");
        }
    }

    #[test]
    fn standard_catalog_tags_are_sorted_and_unique() {
        let tags = standard_registry().tags();
        assert_eq!(tags.len(), standard_registry().len());
        assert!(tags.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(tags.contains(&"balance_transaction"));
        assert!(tags.contains(&"subscription"));
    }

    #[test]
    fn standard_catalog_passes_duplicate_check() {
        let descriptors = standard_descriptors();
        let mut builder = RegistryBuilder::new();
        for descriptor in &descriptors {
            builder.insert(*descriptor).expect("unique tag");
        }
        let checked = builder.build();
        assert_eq!(checked.len(), descriptors.len());
        assert_eq!(checked.tags(), TypeRegistry::standard().tags());
    }

    #[test]
    fn standard_registry_is_shared() {
        let first = standard_registry() as *const TypeRegistry;
        let second = standard_registry() as *const TypeRegistry;
        assert_eq!(first, second);
    }

    #[test]
    fn alternate_registry_only_knows_its_entries() {
        let mut builder = TypeRegistry::builder();
        builder.register::<Refund>().expect("register");
        let registry = builder.build();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("refund"));
        assert!(!registry.contains("charge"));
        assert!(TypeRegistry::empty().is_empty());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut builder = TypeRegistry::builder();
        builder.register::<Charge>().expect("first");
        let err = builder.register::<Charge>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.to_string().contains("charge"));
    }

    #[test]
    fn descriptor_decodes_into_its_variant() {
        let descriptor = TypeDescriptor::of::<Charge>();
        let object = descriptor
            .decode(&json!({"object": "charge", "id": "ch_1", "amount": 100}))
            .expect("decode");
        match object {
            EventObject::Charge(charge) => assert_eq!(charge.amount, Some(100)),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
