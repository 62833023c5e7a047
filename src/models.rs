use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Direction {
    #[default]
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

impl TryFrom<String> for Direction {
    type Error = AppError;

    fn try_from(keyword: String) -> Result<Self, Self::Error> {
        Direction::from_keyword(&keyword).ok_or(AppError::InvalidDirection(keyword))
    }
}

impl Direction {
    /// Parses a direction keyword (`ASC`, `ASCENDING`, `DESC`, `DESCENDING`),
    /// ignoring case. Anything else is not a direction.
    pub fn from_keyword(s: &str) -> Option<Direction> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Direction::Ascending),
            "desc" | "descending" => Some(Direction::Descending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }

    pub fn is_ascending(&self) -> bool {
        *self == Direction::Ascending
    }

    pub fn is_descending(&self) -> bool {
        *self == Direction::Descending
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(property, direction)` clause of a [`Sort`].
///
/// The property is trimmed and never blank or dot-only; [`Order::new`]
/// refuses such a property and deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OrderRepr")]
pub struct Order {
    property: String,
    direction: Direction,
}

#[derive(Deserialize)]
struct OrderRepr {
    property: String,
    #[serde(default)]
    direction: Direction,
}

impl TryFrom<OrderRepr> for Order {
    type Error = AppError;

    fn try_from(repr: OrderRepr) -> Result<Self, Self::Error> {
        Order::new(repr.direction, repr.property)
    }
}

/// Trims `raw` and returns it if it can name a property. Blank and
/// dot-only (`.`, `..`) tokens cannot.
pub(crate) fn normalize_property(raw: &str) -> Option<&str> {
    let token = raw.trim();
    if token.is_empty() || token.chars().all(|c| c == '.') {
        None
    } else {
        Some(token)
    }
}

impl Order {
    /// The property is stored trimmed, so an order always renders back to a
    /// token the parser reads as the same property.
    pub fn new(direction: Direction, property: impl Into<String>) -> AppResult<Order> {
        let property = property.into();
        let Some(normalized) = normalize_property(&property) else {
            return Err(AppError::InvalidProperty(property));
        };
        Ok(Order {
            property: normalized.to_string(),
            direction,
        })
    }

    pub fn asc(property: impl Into<String>) -> AppResult<Order> {
        Order::new(Direction::Ascending, property)
    }

    pub fn desc(property: impl Into<String>) -> AppResult<Order> {
        Order::new(Direction::Descending, property)
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn with_direction(&self, direction: Direction) -> Order {
        Order {
            property: self.property.clone(),
            direction,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.property, self.direction)
    }
}

/// Ordered list of [`Order`] clauses. Earlier clauses take precedence; an
/// empty `Sort` means unsorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Sort {
        Sort::default()
    }

    /// Builds a sort over `properties` sharing one direction. Properties
    /// [`Order::new`] refuses are skipped.
    pub fn by<I, P>(direction: Direction, properties: I) -> Sort
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let orders = properties
            .into_iter()
            .filter_map(|property| Order::new(direction, property).ok())
            .collect();
        Sort { orders }
    }

    pub fn by_properties<I, P>(properties: I) -> Sort
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Sort::by(Direction::Ascending, properties)
    }

    pub fn by_orders(orders: impl IntoIterator<Item = Order>) -> Sort {
        Sort {
            orders: orders.into_iter().collect(),
        }
    }

    /// Appends the clauses of `other` after this sort's clauses.
    pub fn and(mut self, other: Sort) -> Sort {
        self.orders.extend(other.orders);
        self
    }

    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order_for(&self, property: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.property == property)
    }
}

impl FromIterator<Order> for Sort {
    fn from_iter<T: IntoIterator<Item = Order>>(iter: T) -> Self {
        Sort::by_orders(iter)
    }
}

impl IntoIterator for Sort {
    type Item = Order;
    type IntoIter = std::vec::IntoIter<Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.orders.is_empty() {
            return f.write_str("UNSORTED");
        }
        let rendered: Vec<String> = self.orders.iter().map(|o| o.to_string()).collect();
        f.write_str(&rendered.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direction_from_keyword() {
        assert_eq!(Direction::from_keyword("asc"), Some(Direction::Ascending));
        assert_eq!(Direction::from_keyword("ASCENDING"), Some(Direction::Ascending));
        assert_eq!(Direction::from_keyword("Desc"), Some(Direction::Descending));
        assert_eq!(Direction::from_keyword("descending"), Some(Direction::Descending));
        assert_eq!(Direction::from_keyword("up"), None);
        assert_eq!(Direction::from_keyword(""), None);
    }

    #[test]
    fn test_order_rejects_blank_property() {
        assert!(Order::asc("name").is_ok());
        assert!(matches!(Order::asc(""), Err(AppError::InvalidProperty(_))));
        assert!(matches!(Order::desc("   "), Err(AppError::InvalidProperty(_))));
        assert!(matches!(Order::asc("."), Err(AppError::InvalidProperty(_))));
        assert!(matches!(Order::asc(" .. "), Err(AppError::InvalidProperty(_))));
    }

    #[test]
    fn test_order_trims_property() {
        let order = Order::asc(" name ").unwrap();
        assert_eq!(order.property(), "name");
        assert_eq!(order.to_string(), "name,ASC");
        assert_eq!(Order::desc("address.city").unwrap().property(), "address.city");
    }

    #[test]
    fn test_direction_deserialization_ignores_case() {
        for (raw, expected) in [
            ("\"Desc\"", Direction::Descending),
            ("\"dEsCeNdInG\"", Direction::Descending),
            ("\"Asc\"", Direction::Ascending),
            ("\"ASCENDING\"", Direction::Ascending),
        ] {
            let direction: Direction = serde_json::from_str(raw).unwrap();
            assert_eq!(direction, expected, "{}", raw);
        }
        assert!(serde_json::from_str::<Direction>("\"sideways\"").is_err());
        assert_eq!(serde_json::to_string(&Direction::Descending).unwrap(), "\"DESC\"");
    }

    #[test]
    fn test_order_deserialization_with_mixed_case_direction() {
        let order: Order =
            serde_yaml::from_str("property: id\ndirection: Desc\n").unwrap();
        assert_eq!(order, Order::desc("id").unwrap());
    }

    #[test]
    fn test_sort_by_skips_blank_properties() {
        let sort = Sort::by(Direction::Descending, ["a", "", " ", "b"]);
        assert_eq!(sort.len(), 2);
        assert_eq!(sort.orders()[0].property(), "a");
        assert_eq!(sort.orders()[1].property(), "b");
        assert!(sort.iter().all(|o| o.direction().is_descending()));
    }

    #[test]
    fn test_sort_and_keeps_order() {
        let sort = Sort::by_properties(["bar", "foo"]).and(Sort::by_properties(["fizz", "buzz"]));
        let properties: Vec<&str> = sort.iter().map(|o| o.property()).collect();
        assert_eq!(properties, vec!["bar", "foo", "fizz", "buzz"]);
    }

    #[test]
    fn test_unsorted() {
        let sort = Sort::unsorted();
        assert!(sort.is_unsorted());
        assert!(!sort.is_sorted());
        assert_eq!(sort.to_string(), "UNSORTED");
    }

    #[test]
    fn test_order_for() {
        let sort = Sort::by(Direction::Descending, ["lastname"]).and(Sort::by_properties(["firstname"]));
        assert_eq!(
            sort.order_for("lastname").map(|o| o.direction()),
            Some(Direction::Descending)
        );
        assert!(sort.order_for("age").is_none());
    }

    #[test]
    fn test_sort_serialization() {
        let sort = Sort::by(Direction::Descending, ["name"]);
        let value = serde_json::to_value(&sort).unwrap();
        assert_eq!(value, json!([{"property": "name", "direction": "DESC"}]));
    }

    #[test]
    fn test_sort_deserialization_defaults_direction() {
        let sort: Sort = serde_json::from_value(json!([
            {"property": "id"},
            {"property": "created", "direction": "descending"}
        ]))
        .unwrap();
        assert_eq!(
            sort,
            Sort::by_properties(["id"]).and(Sort::by(Direction::Descending, ["created"]))
        );

        let blank: Result<Sort, _> = serde_json::from_value(json!([{"property": ""}]));
        assert!(blank.is_err());
    }
}
