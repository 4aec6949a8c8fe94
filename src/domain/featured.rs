//! Deterministic daily featured-temple selection.
//!
//! Every record gets a per-day key `FNV-1a("<YYYY-MM-DD>-<id>")` and the
//! catalog is ordered by that key. The order is stable for a calendar day and
//! reshuffles on the next one without any stored state or random source.

use chrono::NaiveDate;

use crate::domain::temple::Temple;

/// 32-bit FNV-1a offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
/// 32-bit FNV-1a prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// Number of featured temples shown on the home view.
pub const DEFAULT_FEATURED_COUNT: usize = 4;

/// Records that can take part in the featured shuffle.
pub trait FeatureKey {
    /// Stable string identifier hashed together with the day key.
    fn feature_id(&self) -> String;
}

impl FeatureKey for Temple {
    fn feature_id(&self) -> String {
        self.id.to_string()
    }
}

/// FNV-1a over raw bytes (XOR, then wrapping multiply).
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    fnv1a_32_iter(bytes.iter().copied())
}

fn fnv1a_32_iter(bytes: impl Iterator<Item = u8>) -> u32 {
    bytes.fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Calendar day serialized as `YYYY-MM-DD`.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Hash of `day_key + "-" + id` without building the joined string.
pub fn featured_hash(day_key: &str, id: &str) -> u32 {
    fnv1a_32_iter(
        day_key
            .bytes()
            .chain(std::iter::once(b'-'))
            .chain(id.bytes()),
    )
}

/// Orders `catalog` by the per-day hash and keeps the first `count` records.
///
/// Hash collisions keep their input order. An empty catalog yields an empty
/// selection and a `count` above the catalog size returns every record.
pub fn select_featured<T: FeatureKey>(catalog: &[T], date: NaiveDate, count: usize) -> Vec<&T> {
    let key = day_key(date);
    let mut keyed = catalog
        .iter()
        .map(|record| (featured_hash(&key, &record.feature_id()), record))
        .collect::<Vec<_>>();

    keyed.sort_by_key(|(hash, _)| *hash);

    keyed
        .into_iter()
        .take(count)
        .map(|(_, record)| record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(&'static str);

    impl FeatureKey for Item {
        fn feature_id(&self) -> String {
            self.0.to_string()
        }
    }

    const IDS: [&str; 20] = [
        "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16",
        "17", "18", "19", "20",
    ];

    fn catalog() -> Vec<Item> {
        IDS.iter().map(|id| Item(*id)).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(selection: &[&Item]) -> Vec<&'static str> {
        selection.iter().map(|item| item.0).collect()
    }

    #[test]
    fn matches_known_fnv1a_vectors() {
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
        assert_eq!(fnv1a_32(b"2024-01-01-1"), 0xbd72_91e7);
    }

    #[test]
    fn featured_hash_equals_hash_of_joined_key() {
        assert_eq!(featured_hash("2024-01-01", "1"), 3_178_402_279);
        assert_eq!(
            featured_hash("2024-01-02", "17"),
            fnv1a_32(b"2024-01-02-17")
        );
    }

    #[test]
    fn day_key_is_iso_date() {
        assert_eq!(day_key(date(2024, 1, 1)), "2024-01-01");
        assert_eq!(day_key(date(2025, 12, 31)), "2025-12-31");
    }

    #[test]
    fn selection_is_deterministic_within_a_day() {
        let catalog = catalog();
        let first = select_featured(&catalog, date(2024, 1, 1), 4);
        let second = select_featured(&catalog, date(2024, 1, 1), 4);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first), vec!["17", "16", "15", "14"]);
    }

    #[test]
    fn selection_changes_between_days() {
        let catalog = catalog();
        let day_one = select_featured(&catalog, date(2024, 1, 1), 4);
        let day_two = select_featured(&catalog, date(2024, 1, 2), 4);
        assert_ne!(ids(&day_one), ids(&day_two));
        assert_eq!(ids(&day_two), vec!["12", "13", "10", "11"]);
    }

    #[test]
    fn selection_does_not_depend_on_input_order() {
        let catalog = catalog();
        let reversed = catalog.iter().rev().map(|i| Item(i.0)).collect::<Vec<_>>();
        assert_eq!(
            ids(&select_featured(&catalog, date(2024, 3, 9), 6)),
            ids(&select_featured(&reversed, date(2024, 3, 9), 6))
        );
    }

    #[test]
    fn truncates_to_requested_count() {
        let catalog = catalog();
        for count in [0, 1, 4, 20, 50] {
            let selection = select_featured(&catalog, date(2024, 6, 1), count);
            assert_eq!(selection.len(), count.min(catalog.len()));
        }
    }

    #[test]
    fn empty_catalog_yields_empty_selection() {
        let catalog: Vec<Item> = Vec::new();
        assert!(select_featured(&catalog, date(2024, 1, 1), 4).is_empty());
    }

    #[test]
    fn colliding_hashes_keep_input_order() {
        let catalog = vec![Item("7"), Item("7"), Item("7")];
        let selection = select_featured(&catalog, date(2024, 1, 1), 3);
        assert!(std::ptr::eq(selection[0], &catalog[0]));
        assert!(std::ptr::eq(selection[2], &catalog[2]));
    }
}
