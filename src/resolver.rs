use std::any::TypeId;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Direction, Sort};
use crate::params::RequestParams;
use crate::parser::{SortParser, DEFAULT_PROPERTY_DELIMITER};

pub const DEFAULT_SORT_PARAMETER: &str = "sort";
pub const DEFAULT_QUALIFIER_DELIMITER: &str = "_";

/// Default ordering attached to one sort target, used when the request
/// carries no usable sort value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortDefault {
    pub properties: Vec<String>,
    pub direction: Direction,
}

impl SortDefault {
    pub fn new<I, P>(properties: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        SortDefault {
            properties: properties.into_iter().map(Into::into).collect(),
            direction: Direction::Ascending,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn to_sort(&self) -> Sort {
        Sort::by(self.direction, self.properties.iter().cloned())
    }
}

/// Per-target settings: an optional qualifier that prefixes the parameter
/// name and an optional default sort.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortBinding {
    qualifier: Option<String>,
    default: Option<Sort>,
}

impl SortBinding {
    pub fn unqualified() -> Self {
        SortBinding::default()
    }

    pub fn builder() -> SortBindingBuilder {
        SortBindingBuilder::default()
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn default_sort(&self) -> Option<&Sort> {
        self.default.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortBindingBuilder {
    qualifier: Option<String>,
    single: Option<SortDefault>,
    container: Option<Vec<SortDefault>>,
}

impl SortBindingBuilder {
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn sort_default(mut self, default: SortDefault) -> Self {
        self.single = Some(default);
        self
    }

    /// Several defaults, concatenated in the given order.
    pub fn sort_defaults(mut self, defaults: Vec<SortDefault>) -> Self {
        self.container = Some(defaults);
        self
    }

    /// Fails when both a single default and a list of defaults were declared.
    pub fn build(self) -> AppResult<SortBinding> {
        let default = match (self.single, self.container) {
            (Some(_), Some(_)) => {
                return Err(AppError::InvalidSortDefault(format!(
                    "sort target{} declares both a single default and a list of defaults",
                    self.qualifier
                        .as_deref()
                        .map(|q| format!(" '{}'", q))
                        .unwrap_or_default()
                )));
            }
            (Some(single), None) => Some(single.to_sort()),
            (None, Some(container)) => Some(
                container
                    .iter()
                    .fold(Sort::unsorted(), |sort, default| sort.and(default.to_sort())),
            ),
            (None, None) => None,
        };

        Ok(SortBinding {
            qualifier: self.qualifier,
            default,
        })
    }
}

/// Resolves request sort parameters into a [`Sort`].
///
/// Malformed input never fails: unusable tokens are dropped, and a request
/// that yields no clause resolves to the binding's default, then to the
/// configured fallback, then to [`Sort::unsorted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortResolver {
    sort_parameter: String,
    qualifier_delimiter: String,
    parser: SortParser,
    fallback: Sort,
}

impl Default for SortResolver {
    fn default() -> Self {
        SortResolver {
            sort_parameter: DEFAULT_SORT_PARAMETER.to_string(),
            qualifier_delimiter: DEFAULT_QUALIFIER_DELIMITER.to_string(),
            parser: SortParser::new(DEFAULT_PROPERTY_DELIMITER),
            fallback: Sort::unsorted(),
        }
    }
}

impl SortResolver {
    pub fn new() -> Self {
        SortResolver::default()
    }

    pub fn with_sort_parameter(mut self, sort_parameter: impl Into<String>) -> Self {
        self.sort_parameter = sort_parameter.into();
        self
    }

    pub fn with_property_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.parser = SortParser::new(delimiter);
        self
    }

    pub fn with_qualifier_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.qualifier_delimiter = delimiter.into();
        self
    }

    pub fn with_fallback(mut self, fallback: Sort) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn sort_parameter(&self) -> &str {
        &self.sort_parameter
    }

    pub fn qualifier_delimiter(&self) -> &str {
        &self.qualifier_delimiter
    }

    /// Whether `name` is the sort parameter, bare or behind a non-blank
    /// qualifier (`sort`, `left_sort`).
    pub fn is_sort_parameter(&self, name: &str) -> bool {
        if name == self.sort_parameter {
            return true;
        }
        name.strip_suffix(self.sort_parameter.as_str())
            .and_then(|rest| rest.strip_suffix(self.qualifier_delimiter.as_str()))
            .is_some_and(|qualifier| !qualifier.trim().is_empty())
    }

    pub fn fallback(&self) -> &Sort {
        &self.fallback
    }

    /// Whether values of type `T` can be produced by this resolver.
    pub fn supports<T: ?Sized + 'static>(&self) -> bool {
        TypeId::of::<T>() == TypeId::of::<Sort>()
    }

    /// `<qualifier><delimiter><sort parameter>` for a non-blank qualifier,
    /// otherwise the bare sort parameter.
    pub fn parameter_name(&self, qualifier: Option<&str>) -> String {
        match qualifier.filter(|q| !q.trim().is_empty()) {
            Some(qualifier) => format!(
                "{}{}{}",
                qualifier, self.qualifier_delimiter, self.sort_parameter
            ),
            None => self.sort_parameter.clone(),
        }
    }

    pub fn default_for(&self, binding: &SortBinding) -> Sort {
        binding
            .default_sort()
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Resolves the raw values of the binding's sort parameter.
    ///
    /// An explicitly empty value does not override the binding's default:
    /// `sort=` on a target with a default resolves to that default.
    pub fn resolve<S: AsRef<str>>(&self, raw_values: &[S], binding: &SortBinding) -> Sort {
        if raw_values.iter().all(|value| value.as_ref().trim().is_empty()) {
            debug!(
                parameter = %self.parameter_name(binding.qualifier()),
                "no sort value supplied, using default"
            );
            return self.default_for(binding);
        }

        let sort = self.parser.parse(raw_values);
        if sort.is_unsorted() {
            debug!(
                parameter = %self.parameter_name(binding.qualifier()),
                "sort values yielded no clauses, using default"
            );
            return self.default_for(binding);
        }
        sort
    }

    pub fn resolve_params(&self, params: &RequestParams, binding: &SortBinding) -> Sort {
        let name = self.parameter_name(binding.qualifier());
        self.resolve(params.get_all(&name), binding)
    }

    /// Renders `sort` as raw parameter values. Consecutive clauses with the
    /// same direction share one value (`a,b,DESC`).
    pub fn to_request_values(&self, sort: &Sort) -> Vec<String> {
        let delimiter = self.parser.property_delimiter();
        let mut values = Vec::new();
        let mut group: Vec<&str> = Vec::new();
        let mut current: Option<Direction> = None;

        for order in sort {
            if current.is_some_and(|d| d != order.direction()) {
                values.push(render_group(&group, current, delimiter));
                group.clear();
            }
            current = Some(order.direction());
            group.push(order.property());
        }
        if !group.is_empty() {
            values.push(render_group(&group, current, delimiter));
        }
        values
    }

    /// Encodes `sort` as a query string for the (optionally qualified)
    /// sort parameter, e.g. `sort=lastname%2CDESC`.
    pub fn to_query_string(&self, sort: &Sort, qualifier: Option<&str>) -> String {
        let name = self.parameter_name(qualifier);
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for value in self.to_request_values(sort) {
            serializer.append_pair(&name, &value);
        }
        serializer.finish()
    }
}

fn render_group(properties: &[&str], direction: Option<Direction>, delimiter: &str) -> String {
    let mut value = properties.join(delimiter);
    if let Some(direction) = direction {
        value.push_str(delimiter);
        value.push_str(direction.as_str());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Order;

    #[test]
    fn test_parameter_name() {
        let resolver = SortResolver::new();
        assert_eq!(resolver.parameter_name(None), "sort");
        assert_eq!(resolver.parameter_name(Some("qual")), "qual_sort");
        assert_eq!(resolver.parameter_name(Some("  ")), "sort");

        let custom = SortResolver::new()
            .with_sort_parameter("order")
            .with_qualifier_delimiter("-");
        assert_eq!(custom.parameter_name(Some("left")), "left-order");
    }

    #[test]
    fn test_is_sort_parameter() {
        let resolver = SortResolver::new();
        assert!(resolver.is_sort_parameter("sort"));
        assert!(resolver.is_sort_parameter("left_sort"));
        assert!(!resolver.is_sort_parameter("resort"));
        assert!(!resolver.is_sort_parameter("xsort"));
        assert!(!resolver.is_sort_parameter("_sort"));
        assert!(!resolver.is_sort_parameter("sorted"));

        let custom = SortResolver::new()
            .with_sort_parameter("order")
            .with_qualifier_delimiter("-");
        assert!(custom.is_sort_parameter("left-order"));
        assert!(!custom.is_sort_parameter("left_order"));
        assert!(!custom.is_sort_parameter("sort"));
    }

    #[test]
    fn test_supports() {
        let resolver = SortResolver::new();
        assert!(resolver.supports::<Sort>());
        assert!(!resolver.supports::<String>());
        assert!(!resolver.supports::<Order>());
    }

    #[test]
    fn test_fallback_when_nothing_supplied() {
        let fallback = Sort::by(Direction::Ascending, ["ID"]);
        let resolver = SortResolver::new().with_fallback(fallback.clone());
        let empty: [&str; 0] = [];
        assert_eq!(resolver.resolve(&empty, &SortBinding::unqualified()), fallback);
        assert_eq!(resolver.resolve(&[""], &SortBinding::unqualified()), fallback);
        assert_eq!(resolver.resolve(&[",DESC"], &SortBinding::unqualified()), fallback);
    }

    #[test]
    fn test_default_fallback_is_unsorted() {
        let resolver = SortResolver::new();
        let empty: [&str; 0] = [];
        assert!(resolver.resolve(&empty, &SortBinding::unqualified()).is_unsorted());
    }

    #[test]
    fn test_binding_default_wins_over_fallback() {
        let resolver = SortResolver::new().with_fallback(Sort::by_properties(["id"]));
        let binding = SortBinding::builder()
            .sort_default(SortDefault::new(["firstname", "lastname"]))
            .build()
            .unwrap();
        assert_eq!(
            resolver.resolve(&[""], &binding),
            Sort::by_properties(["firstname", "lastname"])
        );
    }

    #[test]
    fn test_request_value_wins_over_default() {
        let resolver = SortResolver::new();
        let binding = SortBinding::builder()
            .sort_default(SortDefault::new(["firstname"]))
            .build()
            .unwrap();
        assert_eq!(
            resolver.resolve(&["age,DESC"], &binding),
            Sort::by(Direction::Descending, ["age"])
        );
    }

    #[test]
    fn test_container_defaults_concatenate() {
        let binding = SortBinding::builder()
            .sort_defaults(vec![
                SortDefault::new(["foo"]),
                SortDefault::new(["bar"]).direction(Direction::Descending),
            ])
            .build()
            .unwrap();
        assert_eq!(
            binding.default_sort(),
            Some(&Sort::by_properties(["foo"]).and(Sort::by(Direction::Descending, ["bar"])))
        );
    }

    #[test]
    fn test_conflicting_defaults_rejected() {
        let result = SortBinding::builder()
            .qualifier("qual")
            .sort_default(SortDefault::new(["bar", "foo"]))
            .sort_defaults(vec![SortDefault::new(["foo", "bar"])])
            .build();
        assert!(matches!(result, Err(AppError::InvalidSortDefault(_))));
    }

    #[test]
    fn test_to_request_values_folds_directions() {
        let resolver = SortResolver::new();
        let sort = Sort::by_properties(["a", "b"])
            .and(Sort::by(Direction::Descending, ["c"]))
            .and(Sort::by_properties(["d"]));
        assert_eq!(
            resolver.to_request_values(&sort),
            vec!["a,b,ASC", "c,DESC", "d,ASC"]
        );
        assert!(resolver.to_request_values(&Sort::unsorted()).is_empty());
    }

    #[test]
    fn test_to_query_string() {
        let resolver = SortResolver::new();
        let sort = Sort::by(Direction::Descending, ["lastname"]);
        assert_eq!(resolver.to_query_string(&sort, None), "sort=lastname%2CDESC");
        assert_eq!(
            resolver.to_query_string(&sort, Some("qual")),
            "qual_sort=lastname%2CDESC"
        );
    }

    #[test]
    fn test_custom_delimiter_round_trip() {
        let resolver = SortResolver::new().with_property_delimiter(";");
        let sort = Sort::by(Direction::Descending, ["a", "b"]).and(Sort::by_properties(["c"]));
        let values = resolver.to_request_values(&sort);
        assert_eq!(values, vec!["a;b;DESC", "c;ASC"]);
        assert_eq!(resolver.resolve(&values, &SortBinding::unqualified()), sort);
    }
}
