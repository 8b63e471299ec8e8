use serde::{Deserialize, Serialize};

/// Declares an opaque integer identifier backed by `i64`.
///
/// Identifiers are assigned by the store and are only ever compared,
/// hashed, and printed, so no arithmetic is exposed.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from its raw value.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a persisted order.
    OrderId
);
define_id!(
    /// Identifier of a staff user account.
    UserId
);
define_id!(
    /// Identifier of the person behind a user account.
    PersonId
);
define_id!(
    /// Identifier of a dining table.
    TableId
);
define_id!(
    /// Identifier of a catalog product.
    ProductId
);
define_id!(
    /// Identifier of a product type (starter, main, drink, ...).
    ProductTypeId
);
define_id!(
    /// Identifier of a row in the status vocabulary.
    StatusId
);

/// Revision counter of an order, used for optimistic concurrency control.
///
/// A freshly persisted order is at revision 1; every status write
/// increments it by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// Creates a revision from a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the revision of a freshly persisted order.
    pub const fn first() -> Self {
        Self(1)
    }

    /// Returns the following revision.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Revision {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_preserve_raw_value() {
        let id = OrderId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(OrderId::from(42), id);
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&TableId::new(5)).unwrap();
        assert_eq!(json, "5");

        let id: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(id, ProductId::new(7));
    }

    #[test]
    fn id_display() {
        assert_eq!(UserId::new(3).to_string(), "3");
    }

    #[test]
    fn revision_starts_at_one_and_increments() {
        let rev = Revision::first();
        assert_eq!(rev.as_u64(), 1);
        assert_eq!(rev.next(), Revision::new(2));
        assert!(rev.next() > rev);
    }
}
