//! The front-end's product cache: a concurrent map from product name to the
//! last price/quantity snapshot seen from the catalog, evicted by
//! `Invalidate` pushes (`spec.md` §3, §4.3). Reused directly from the
//! workspace template's `orderbook` concurrency toolkit — `DashMap` is
//! exactly the "concurrent mapping" the spec allows in place of an explicit
//! mutex.

use dashmap::DashMap;

#[derive(Debug, Clone)]
pub struct CachedProduct {
    pub price: String,
    pub quantity: i64,
}

pub struct ProductCache {
    entries: DashMap<String, CachedProduct>,
}

impl Default for ProductCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn get(&self, product_name: &str) -> Option<CachedProduct> {
        self.entries.get(product_name).map(|entry| entry.clone())
    }

    pub fn insert(&self, product_name: String, product: CachedProduct) {
        self.entries.insert(product_name, product);
    }

    /// `Invalidate(product_name)`: remove the entry if present, always
    /// "succeeds" (`spec.md` §4.3).
    pub fn invalidate(&self, product_name: &str) {
        self.entries.remove(product_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_insert_then_hit() {
        let cache = ProductCache::new();
        assert!(cache.get("Tux").is_none());
        cache.insert("Tux".to_string(), CachedProduct { price: "19.99".into(), quantity: 100 });
        let hit = cache.get("Tux").unwrap();
        assert_eq!(hit.price, "19.99");
        assert_eq!(hit.quantity, 100);
    }

    #[test]
    fn invalidate_evicts_entry() {
        let cache = ProductCache::new();
        cache.insert("Tux".to_string(), CachedProduct { price: "19.99".into(), quantity: 100 });
        cache.invalidate("Tux");
        assert!(cache.get("Tux").is_none());
    }

    #[test]
    fn invalidate_on_absent_key_is_a_no_op() {
        let cache = ProductCache::new();
        cache.invalidate("Nonesuch");
        assert!(cache.get("Nonesuch").is_none());
    }
}
