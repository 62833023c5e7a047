use tracing::trace;

use crate::models::{normalize_property, Direction, Order, Sort};

pub const DEFAULT_PROPERTY_DELIMITER: &str = ",";

/// Turns raw `sort` parameter values such as `name,DESC` or
/// `firstname,lastname,asc` into [`Order`] clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortParser {
    property_delimiter: String,
}

impl Default for SortParser {
    fn default() -> Self {
        SortParser::new(DEFAULT_PROPERTY_DELIMITER)
    }
}

impl SortParser {
    pub fn new(property_delimiter: impl Into<String>) -> Self {
        SortParser {
            property_delimiter: property_delimiter.into(),
        }
    }

    pub fn property_delimiter(&self) -> &str {
        &self.property_delimiter
    }

    /// Parses every raw value and concatenates the clauses in encounter order.
    pub fn parse<S: AsRef<str>>(&self, values: &[S]) -> Sort {
        values
            .iter()
            .flat_map(|value| self.parse_value(value.as_ref()))
            .collect()
    }

    /// Parses one raw value. Malformed pieces are dropped, never reported.
    pub fn parse_value(&self, raw: &str) -> Vec<Order> {
        let mut tokens: Vec<&str> = raw
            .split(self.property_delimiter.as_str())
            .filter_map(normalize_property)
            .collect();

        let direction = match tokens.last().and_then(|last| Direction::from_keyword(last)) {
            Some(direction) => {
                tokens.pop();
                direction
            }
            None => Direction::Ascending,
        };

        let orders: Vec<Order> = tokens
            .into_iter()
            .filter_map(|token| Order::new(direction, token).ok())
            .collect();

        if orders.is_empty() && !raw.is_empty() {
            trace!(raw, "sort value produced no clauses");
        }
        orders
    }
}
