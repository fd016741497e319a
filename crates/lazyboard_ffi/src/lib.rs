//! Flutter-facing bindings for LazyBoard core.

pub mod api;
