//! Catalog search predicates.

use rust_decimal::Decimal;

use sweetshop_core::{Entity, creation_order};

use crate::CatalogItem;

/// Conjunction of optional predicates. An absent field places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
}

impl SearchFilter {
    /// Trim text predicates and drop the blank ones.
    pub fn normalized(self) -> Self {
        fn non_blank(s: Option<String>) -> Option<String> {
            s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            search: non_blank(self.search),
            category: non_blank(self.category),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.search.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let in_name = item.name.to_lowercase().contains(&needle);
            let in_description = item
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }

        let price = item.price.as_decimal();
        if self.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| price > max) {
            return false;
        }

        true
    }
}

/// Newest first; ties broken by id (also time-ordered).
pub fn sort_newest_first<E: Entity>(items: &mut [E]) {
    items.sort_by(|a, b| creation_order(b, a));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewItem;
    use chrono::Utc;
    use proptest::prelude::*;

    fn item(name: &str, description: Option<&str>, category: &str, price: i64) -> CatalogItem {
        NewItem {
            name: name.to_string(),
            category: category.to_string(),
            description: description.map(str::to_string),
            price: Decimal::from(price),
            quantity: 1,
            image_url: None,
        }
        .into_item(Utc::now())
        .unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = SearchFilter::default();
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&item("Fudge", None, "Chocolate", 3)));
    }

    #[test]
    fn substring_is_case_insensitive_over_name_and_description() {
        let filter = SearchFilter {
            search: Some("CHOC".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&item("Dark Chocolate Bar", None, "Bars", 3)));
        assert!(filter.matches(&item("Truffle", Some("rich chocolate ganache"), "Bars", 3)));
        assert!(!filter.matches(&item("Lemon Drop", Some("tangy"), "Hard", 3)));
    }

    #[test]
    fn category_is_exact() {
        let filter = SearchFilter {
            category: Some("Chocolate".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&item("Fudge", None, "Chocolate", 3)));
        assert!(!filter.matches(&item("Fudge", None, "chocolate", 3)));
        assert!(!filter.matches(&item("Fudge", None, "Chocolates", 3)));
    }

    #[test]
    fn price_range_is_inclusive() {
        let filter = SearchFilter {
            min_price: Some(Decimal::from(2)),
            max_price: Some(Decimal::from(5)),
            ..Default::default()
        };
        assert!(filter.matches(&item("a", None, "c", 2)));
        assert!(filter.matches(&item("a", None, "c", 5)));
        assert!(!filter.matches(&item("a", None, "c", 1)));
        assert!(!filter.matches(&item("a", None, "c", 6)));
    }

    #[test]
    fn blank_text_predicates_are_dropped() {
        let filter = SearchFilter {
            search: Some("   ".to_string()),
            category: Some(String::new()),
            ..Default::default()
        }
        .normalized();
        assert!(filter.is_unconstrained());
    }

    #[test]
    fn sorts_newest_first() {
        let older = item("old", None, "c", 1);
        let newer = CatalogItem {
            created_at: older.created_at + chrono::Duration::seconds(1),
            ..item("new", None, "c", 1)
        };
        let mut items = vec![older.clone(), newer.clone()];
        sort_newest_first(&mut items);
        assert_eq!(items[0].id, newer.id);
        assert_eq!(items[1].id, older.id);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a filter matches iff every one of its predicates does (AND semantics).
        #[test]
        fn filters_compose_with_and(
            price in 1i64..100,
            min in proptest::option::of(0i64..100),
            max in proptest::option::of(0i64..100),
            use_category in any::<bool>(),
            use_search in any::<bool>(),
        ) {
            let it = item("Peanut Brittle", Some("crunchy"), "Hard", price);

            let filter = SearchFilter {
                search: use_search.then(|| "brittle".to_string()),
                category: use_category.then(|| "Soft".to_string()),
                min_price: min.map(Decimal::from),
                max_price: max.map(Decimal::from),
            };

            let only = |f: SearchFilter| f.matches(&it);
            let expected = only(SearchFilter { search: filter.search.clone(), ..Default::default() })
                && only(SearchFilter { category: filter.category.clone(), ..Default::default() })
                && only(SearchFilter { min_price: filter.min_price, ..Default::default() })
                && only(SearchFilter { max_price: filter.max_price, ..Default::default() });

            prop_assert_eq!(filter.matches(&it), expected);
            prop_assert_eq!(filter.matches(&it), !use_category
                && min.is_none_or(|m| price >= m)
                && max.is_none_or(|m| price <= m));
        }
    }
}
