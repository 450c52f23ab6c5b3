//! # gridcheck Verification
//!
//! Re-derives what the Application should have returned and compares it with
//! what it did return. This crate is the judge of every scenario.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** a pure logic crate with no knowledge of HTTP or of
//!   the service's settings workflow. It depends only on `core-types`.
//! - **Stateless Calculation:** every check is a function from in-memory
//!   series to `Result<_, VerificationError>`. Inputs are never mutated; the
//!   recalculations return fresh series.
//!
//! ## Public API
//!
//! - `sorting`: multi-column sort/group verification, `TreeOrders`.
//! - `wmm`: rescale, annualization, currency conversion, index and real-value
//!   rebasing, and the `Transform` pipeline chaining them.
//! - `compare`: 9-decimal banker's-rounding comparison of two series.
//! - `subtotals`, `paging`, `columns`: grid-level checks and helpers.

pub mod columns;
pub mod compare;
pub mod error;
pub mod paging;
pub mod sorting;
pub mod subtotals;
pub mod wmm;

pub use compare::{round_observation, verify_series_matches};
pub use error::VerificationError;
pub use sorting::{run_boundaries, verify_multi_column_sort, TreeOrders};
pub use wmm::{apply_all, Transform};
