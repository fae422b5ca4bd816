//! Static order book backing the support agent's order lookups

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub number: String,
    pub status: String,
    pub date: String,
    pub items: String,
    pub tracking: String,
}

impl Order {
    fn new(number: &str, status: &str, date: &str, items: &str, tracking: &str) -> Self {
        Self {
            number: number.to_string(),
            status: status.to_string(),
            date: date.to_string(),
            items: items.to_string(),
            tracking: tracking.to_string(),
        }
    }
}

/// Read-only order lookup keyed by uppercase order number
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: BTreeMap<String, Order>,
}

impl OrderBook {
    /// Demo orders ORD-001 to ORD-003
    pub fn sample() -> Self {
        Self::from_orders([
            Order::new("ORD-001", "Delivered", "2026-02-20", "Blue Jacket (M)", "RM12345678GB"),
            Order::new("ORD-002", "In Transit", "2026-02-22", "Running Shoes (42)", "RM87654321GB"),
            Order::new("ORD-003", "Processing", "2026-02-23", "Wool Scarf, Gloves Set", "Not yet assigned"),
        ])
    }

    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: orders
                .into_iter()
                .map(|o| (o.number.to_uppercase(), o))
                .collect(),
        }
    }

    /// Case-insensitive lookup
    pub fn lookup(&self, number: &str) -> Option<&Order> {
        self.orders.get(&number.trim().to_uppercase())
    }

    pub fn numbers(&self) -> impl Iterator<Item = &str> {
        self.orders.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let book = OrderBook::sample();
        let order = book.lookup("ord-002").unwrap();
        assert_eq!(order.status, "In Transit");
        assert_eq!(order.tracking, "RM87654321GB");
        assert!(book.lookup("ORD-999").is_none());
        assert_eq!(book.numbers().count(), 3);
    }
}
