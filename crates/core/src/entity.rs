//! Entity trait: identity + continuity across state changes.

use core::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier. Ids are time-ordered, so `Ord`
    /// doubles as a creation tiebreaker.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// When the entity was first persisted.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Creation order, oldest first; ties broken by id.
pub fn creation_order<E: Entity>(a: &E, b: &E) -> Ordering {
    a.created_at()
        .cmp(&b.created_at())
        .then_with(|| a.id().cmp(&b.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemId;

    struct Row {
        id: ItemId,
        at: DateTime<Utc>,
    }

    impl Entity for Row {
        type Id = ItemId;

        fn id(&self) -> ItemId {
            self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    #[test]
    fn equal_timestamps_fall_back_to_id() {
        let at = Utc::now();
        let first = Row { id: ItemId::new(), at };
        let second = Row { id: ItemId::new(), at };
        let later = Row { id: ItemId::new(), at: at + chrono::Duration::seconds(1) };

        assert_eq!(creation_order(&first, &second), first.id.cmp(&second.id));
        assert_eq!(creation_order(&later, &first), Ordering::Greater);
        assert_eq!(creation_order(&first, &first), Ordering::Equal);
    }
}
