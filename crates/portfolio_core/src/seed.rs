//! Fixed demonstration portfolio used on first start and after reset.

use crate::service::portfolio_store::{PortfolioSnapshot, PortfolioStore};
use once_cell::sync::Lazy;

const SEED_JSON: &str = include_str!("seed.json");

static SEED_STORE: Lazy<PortfolioStore> = Lazy::new(|| {
    let snapshot: PortfolioSnapshot =
        serde_json::from_str(SEED_JSON).expect("embedded seed dataset parses");
    PortfolioStore::from_snapshot(snapshot).expect("embedded seed dataset has unique ids")
});

/// Fresh copy of the seed store (version 0).
pub fn seed_store() -> PortfolioStore {
    SEED_STORE.clone()
}

/// Seed dataset as plain snapshot data.
pub fn seed_snapshot() -> PortfolioSnapshot {
    SEED_STORE.snapshot()
}
