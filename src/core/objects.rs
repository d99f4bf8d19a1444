//! Purpose: Closed catalog of payload record types an envelope can carry.
//! Exports: `EventObject`, `RawObject`, `ObjectType`, and one struct per registered tag.
//! Role: Typed targets for registry dispatch; `Raw` holds payloads with unregistered tags.
//! Invariants: Each record type has exactly one tag; tags are lower snake case and unique.
//! Invariants: Record decoding requires `id`; unknown payload fields are ignored.
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::core::registry::TypeDescriptor;
use crate::core::value::GenericValue;

/// A record type the registry can dispatch to.
pub trait ObjectType: DeserializeOwned + Into<EventObject> {
    /// Discriminator value found at the payload's `object` key.
    const TAG: &'static str;
    const TYPE_NAME: &'static str;
}

/// Decoded envelope payload.
#[derive(Clone, Debug, PartialEq)]
pub enum EventObject {
    Account(Account),
    BalanceTransaction(BalanceTransaction),
    Card(Card),
    Charge(Charge),
    Coupon(Coupon),
    Customer(Customer),
    Dispute(Dispute),
    Invoice(Invoice),
    Plan(Plan),
    Product(Product),
    Refund(Refund),
    Subscription(Subscription),
    Transfer(Transfer),
    /// Payload whose tag has no registry entry.
    Raw(RawObject),
}

impl EventObject {
    pub fn is_raw(&self) -> bool {
        matches!(self, EventObject::Raw(_))
    }

    pub fn as_raw(&self) -> Option<&RawObject> {
        match self {
            EventObject::Raw(raw) => Some(raw),
            _ => None,
        }
    }
}

/// Untyped payload: the discriminator tag plus every field as a generic value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawObject {
    tag: String,
    fields: BTreeMap<String, GenericValue>,
}

impl RawObject {
    pub fn new(tag: impl Into<String>, fields: BTreeMap<String, GenericValue>) -> Self {
        Self {
            tag: tag.into(),
            fields,
        }
    }

    pub fn object_type(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(GenericValue::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, GenericValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&GenericValue> {
        self.fields.get(key)
    }

    /// The payload as a single generic mapping.
    pub fn to_value(&self) -> GenericValue {
        GenericValue::Mapping(self.fields.clone())
    }

    pub fn into_fields(self) -> BTreeMap<String, GenericValue> {
        self.fields
    }
}

macro_rules! object_types {
    ($($variant:ident => $tag:literal),* $(,)?) => {
        $(
            impl ObjectType for $variant {
                const TAG: &'static str = $tag;
                const TYPE_NAME: &'static str = stringify!($variant);
            }

            impl From<$variant> for EventObject {
                fn from(object: $variant) -> Self {
                    EventObject::$variant(object)
                }
            }
        )*

        impl EventObject {
            /// The discriminator tag of this payload.
            pub fn object_type(&self) -> &str {
                match self {
                    $(EventObject::$variant(_) => $tag,)*
                    EventObject::Raw(raw) => raw.object_type(),
                }
            }

            pub fn id(&self) -> Option<&str> {
                match self {
                    $(EventObject::$variant(object) => Some(object.id.as_str()),)*
                    EventObject::Raw(raw) => raw.id(),
                }
            }
        }

        pub(crate) fn standard_descriptors() -> Vec<TypeDescriptor> {
            vec![$(TypeDescriptor::of::<$variant>(),)*]
        }
    };
}

object_types! {
    Account => "account",
    BalanceTransaction => "balance_transaction",
    Card => "card",
    Charge => "charge",
    Coupon => "coupon",
    Customer => "customer",
    Dispute => "dispute",
    Invoice => "invoice",
    Plan => "plan",
    Product => "product",
    Refund => "refund",
    Subscription => "subscription",
    Transfer => "transfer",
}

pub type Metadata = BTreeMap<String, String>;

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: Option<String>,
    pub country: Option<String>,
    pub default_currency: Option<String>,
    pub charges_enabled: Option<bool>,
    pub payouts_enabled: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BalanceTransaction {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub fee: Option<i64>,
    pub net: Option<i64>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub source: Option<String>,
    pub created: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub id: String,
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<u32>,
    pub exp_year: Option<u32>,
    pub country: Option<String>,
    pub customer: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Charge {
    pub id: String,
    pub amount: Option<i64>,
    pub amount_refunded: Option<i64>,
    pub currency: Option<String>,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub paid: Option<bool>,
    pub refunded: Option<bool>,
    pub captured: Option<bool>,
    pub status: Option<String>,
    pub failure_code: Option<String>,
    pub created: Option<i64>,
    pub livemode: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub percent_off: Option<f64>,
    pub amount_off: Option<i64>,
    pub currency: Option<String>,
    pub duration: Option<String>,
    pub duration_in_months: Option<u32>,
    pub valid: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
    pub description: Option<String>,
    pub currency: Option<String>,
    pub delinquent: Option<bool>,
    pub default_source: Option<String>,
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Dispute {
    pub id: String,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub charge: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
    pub created: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    pub amount_due: Option<i64>,
    pub amount_paid: Option<i64>,
    pub currency: Option<String>,
    pub paid: Option<bool>,
    pub attempt_count: Option<u32>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Plan {
    pub id: String,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub interval: Option<String>,
    pub interval_count: Option<u32>,
    pub product: Option<String>,
    pub active: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub charge: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer: Option<String>,
    pub status: Option<String>,
    pub plan: Option<Plan>,
    pub quantity: Option<u64>,
    pub cancel_at_period_end: Option<bool>,
    pub current_period_end: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub destination: Option<String>,
    pub reversed: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}
