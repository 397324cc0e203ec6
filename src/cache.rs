//! Cache mémoire du processus pour les lectures tolérantes à l'obsolescence:
//! résultats de recherche, liste des bons approuvés, agrégats de revenus.
//!
//! L'invalidation est explicite et à la charge de l'appelant: chaque chemin
//! d'écriture qui peut périmer une entrée doit appeler `clear`. Le cache est
//! local au processus: en déploiement multi-instance, chaque instance a le
//! sien (limitation assumée, voir DESIGN.md).

use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct CacheEntry {
    value: Value,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Mapping clé → (valeur, horodatage d'insertion, TTL).
/// Expiration paresseuse: une entrée périmée est supprimée au premier accès
/// et n'est jamais retournée, même si elle est encore stockée physiquement.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
        }
        // Expired: drop the dead entry on first access
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        None
    }

    /// Écrase toute entrée existante: dernier écrivain gagnant, pas de fusion.
    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Invalidation grossière: une clé précise, ou tout le cache.
    pub fn clear(&self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.entries.remove(key);
            }
            None => self.entries.clear(),
        }
    }

    /// Nombre d'entrées physiquement stockées (les périmées comprises)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// === Constructeurs de clés ===
// Toutes les clés passent par ici pour que les chemins d'écriture et de
// lecture ne divergent jamais sur le format.

pub fn food_search_key(query: &str, limit: i64) -> String {
    format!("food_search:{}:{}", query.to_lowercase(), limit)
}

pub fn approved_vouchers_key() -> String {
    "vouchers:approved".to_string()
}

pub fn enterprise_revenue_key(enterprise_id: Uuid) -> String {
    format!("revenue:{}", enterprise_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    const LONG_TTL: Duration = Duration::from_secs(60);

    #[test]
    fn get_returns_value_within_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", json!({"answer": 42}), LONG_TTL);

        assert_eq!(cache.get("k"), Some(json!({"answer": 42})));
        assert!(cache.has("k"));
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("missing"), None);
        assert!(!cache.has("missing"));
    }

    #[test]
    fn expired_entry_is_never_returned() {
        let cache = MemoryCache::new();
        cache.set("k", json!("v"), Duration::from_millis(10));

        std::thread::sleep(Duration::from_millis(25));

        assert_eq!(cache.get("k"), None);
        // Lazy expiry removed the dead entry on access
        assert!(cache.is_empty());
    }

    #[test]
    fn has_performs_lazy_expiry_too() {
        let cache = MemoryCache::new();
        cache.set("k", json!("v"), Duration::from_millis(10));

        std::thread::sleep(Duration::from_millis(25));

        assert!(!cache.has("k"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn clear_single_key_removes_it_regardless_of_ttl() {
        let cache = MemoryCache::new();
        cache.set("a", json!(1), LONG_TTL);
        cache.set("b", json!(2), LONG_TTL);

        cache.clear(Some("a"));

        assert!(!cache.has("a"));
        assert!(cache.has("b"));
    }

    #[test]
    fn clear_without_key_wipes_everything() {
        let cache = MemoryCache::new();
        cache.set("a", json!(1), LONG_TTL);
        cache.set("b", json!(2), LONG_TTL);

        cache.clear(None);

        assert!(cache.is_empty());
        assert!(!cache.has("a"));
        assert!(!cache.has("b"));
    }

    #[test]
    fn set_overwrites_previous_value_last_write_wins() {
        let cache = MemoryCache::new();
        cache.set("k", json!("first"), LONG_TTL);
        cache.set("k", json!("second"), LONG_TTL);

        assert_eq!(cache.get("k"), Some(json!("second")));
    }

    #[test]
    fn concurrent_writes_to_same_key_leave_one_winner() {
        let cache = Arc::new(MemoryCache::new());
        let key = food_search_key("pizza", 20);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                std::thread::spawn(move || {
                    cache.set(&key, json!(i), LONG_TTL);
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread panicked");
        }

        // No merge semantics: the surviving value is exactly one of the writes
        let winner = cache.get(&key).expect("a value must survive");
        let winner = winner.as_i64().expect("value is an integer");
        assert!((0..8).contains(&winner));
    }

    #[test]
    fn key_builders_are_stable() {
        assert_eq!(food_search_key("Pizza", 20), "food_search:pizza:20");
        assert_eq!(approved_vouchers_key(), "vouchers:approved");

        let id = Uuid::nil();
        assert_eq!(
            enterprise_revenue_key(id),
            format!("revenue:{}", Uuid::nil())
        );
    }
}
