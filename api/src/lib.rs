// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - infrastructure: filesystem store and document server HTTP adapters
// - presentation: HTTP handlers and routing
// - application: use cases, ports, token signing and per-document locks
// - domain: document records and callback statuses

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
