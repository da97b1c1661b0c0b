//! Integration test binary for the document model.
//!
//! A single test binary rather than one file per concern, following
//! matklad's "delete cargo integration tests" layout that this codebase's
//! lineage already uses for its own integration suite:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
//!
//! - `fixtures`: the `Player`/`Wallet`/`Equipment`/`CashInfo` schema used to
//!   exercise the core engine, carried over from the original source's
//!   `example` package and adapted to this crate's generic map family.
//! - `scenarios`: end-to-end Scenarios A-F (spec §8).
//! - `invariants`: universal properties (spec §8) not already pinned down by
//!   a specific scenario.

mod invariants;
mod scenarios;
