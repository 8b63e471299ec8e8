//! Demo catalog used by the in-memory store and local runs.

use common::{Money, PersonId, ProductId, ProductTypeId, Role, StatusId, TableId, UserId};

use crate::{Person, Product, ProductType, StatusRow, Table, User};

/// A complete set of catalog rows.
#[derive(Debug, Clone, Default)]
pub struct CatalogSeed {
    pub statuses: Vec<StatusRow>,
    pub persons: Vec<Person>,
    pub users: Vec<User>,
    pub tables: Vec<Table>,
    pub product_types: Vec<ProductType>,
    pub products: Vec<Product>,
}

const STATUSES: [&str; 8] = [
    "Created",
    "Pending",
    "InPreparation",
    "Ready",
    "Delivered",
    "Cancelled",
    "Active",
    "Inactive",
];

const ACTIVE: StatusId = StatusId::new(7);

const PRODUCT_TYPES: [&str; 5] = ["Starter", "Main Course", "Drink", "Dessert", "Side"];

// (type index, name, price in cents)
const PRODUCTS: [(usize, &str, i64); 18] = [
    (1, "Pizza Margherita", 1_200_000),
    (1, "Pizza Pepperoni", 1_400_000),
    (1, "Classic Burger", 1_000_000),
    (1, "BBQ Burger", 1_200_000),
    (1, "Pasta Carbonara", 1_300_000),
    (1, "Pasta Bolognese", 1_300_000),
    (0, "Caesar Salad", 800_000),
    (0, "Mixed Salad", 700_000),
    (4, "French Fries", 400_000),
    (4, "Onion Rings", 450_000),
    (0, "Chicken Wings", 900_000),
    (0, "Nachos", 800_000),
    (2, "Soda", 250_000),
    (2, "Fresh Juice", 300_000),
    (2, "Beer", 400_000),
    (2, "Wine", 1_500_000),
    (3, "Tiramisu", 600_000),
    (3, "Ice Cream", 500_000),
];

// (first name, last name, username, role)
const STAFF: [(&str, &str, &str, Role); 4] = [
    ("Juan", "Perez", "admin", Role::Admin),
    ("Maria", "Gonzalez", "maria", Role::Waiter),
    ("Carlos", "Martinez", "carlos", Role::Waiter),
    ("Chef", "Principal", "kitchen", Role::Kitchen),
];

impl CatalogSeed {
    /// The restaurant catalog the system ships with: eight statuses, four
    /// staff accounts, ten tables and eighteen products.
    pub fn demo() -> Self {
        let statuses = STATUSES
            .iter()
            .zip(1..)
            .map(|(name, id)| StatusRow {
                id: StatusId::new(id),
                name: (*name).to_string(),
            })
            .collect();

        let mut persons = Vec::with_capacity(STAFF.len());
        let mut users = Vec::with_capacity(STAFF.len());
        for ((first, last, username, role), id) in STAFF.iter().zip(1..) {
            persons.push(Person {
                id: PersonId::new(id),
                first_name: (*first).to_string(),
                last_name: (*last).to_string(),
            });
            users.push(User {
                id: UserId::new(id),
                person_id: PersonId::new(id),
                role: *role,
                username: (*username).to_string(),
                status_id: ACTIVE,
            });
        }

        let tables = (1..=10)
            .map(|n| Table {
                id: TableId::new(n),
                label: format!("Table {n}"),
            })
            .collect();

        let product_types = PRODUCT_TYPES
            .iter()
            .zip(1..)
            .map(|(name, id)| ProductType {
                id: ProductTypeId::new(id),
                name: (*name).to_string(),
            })
            .collect();

        let products = PRODUCTS
            .iter()
            .zip(1..)
            .map(|((type_index, name, cents), id)| Product {
                id: ProductId::new(id),
                type_id: ProductTypeId::new(*type_index as i64 + 1),
                name: (*name).to_string(),
                price: Money::from_cents(*cents),
                status_id: ACTIVE,
            })
            .collect();

        Self {
            statuses,
            persons,
            users,
            tables,
            product_types,
            products,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalog_is_internally_consistent() {
        let seed = CatalogSeed::demo();

        assert_eq!(seed.statuses.len(), 8);
        assert_eq!(seed.tables.len(), 10);
        assert_eq!(seed.products.len(), 18);

        for user in &seed.users {
            assert!(seed.persons.iter().any(|p| p.id == user.person_id));
            assert!(seed.statuses.iter().any(|s| s.id == user.status_id));
        }
        for product in &seed.products {
            assert!(seed.product_types.iter().any(|t| t.id == product.type_id));
            assert!(seed.statuses.iter().any(|s| s.id == product.status_id));
        }
    }

    #[test]
    fn active_status_is_named_active() {
        let seed = CatalogSeed::demo();
        let active = seed.statuses.iter().find(|s| s.id == ACTIVE).unwrap();
        assert_eq!(active.name, "Active");
    }
}
