//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → matcher.rs (resolve dot segments)
//!     → router.rs (RouteTable::classify)
//!     → matcher.rs (API raw prefix, page segment prefixes)
//!     → Return: Api | Page(entry) | Root | Unknown
//!
//! Route Compilation (at startup):
//!     EdgeConfig
//!     → Parse origins (origin.rs)
//!     → Check prefix invariants
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod origin;
pub mod router;

pub use matcher::{has_file_extension, normalize_path};
pub use origin::{Origin, OriginError};
pub use router::{ApiRoute, Category, Classification, RouteEntry, RouteTable};
