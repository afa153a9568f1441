//! Analysis modules.
//!
//! Pure computations over period documents: record aggregation, target
//! reconciliation and the supervisor overview.

pub mod aggregator;
pub mod overview;
pub mod reconcile;

pub use aggregator::*;
pub use overview::*;
pub use reconcile::*;
