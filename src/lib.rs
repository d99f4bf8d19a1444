//! Purpose: Library crate backing the `event-envelope` CLI and its tests.
//! Exports: `core` (values, registry, payload catalog, envelope decoding, errors) and `api`.
//! Role: Decode event envelopes whose payload type is chosen by a nested tag.
//! Invariants: Decoding is pure and synchronous; the only shared state is a read-only registry.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
