//! Admin-facing lists. Each panel fetches its rows from the store and
//! narrows them with plain equality and substring predicates.

pub mod analytics;
pub mod dashboard;
pub mod incidents;
pub mod reports;
pub mod tourists;
pub mod zones;

use std::str::FromStr;

use crate::models::UnknownVariant;

/// Equality filter on one enum-valued field. `all` matches every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr<Err = UnknownVariant>> Filter<T> {
    /// Reads a query-string value; absent, blank and `all` mean no filter.
    pub fn parse(raw: Option<&str>) -> Result<Self, UnknownVariant> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Ok(Filter::All),
            Some(value) => value.parse().map(Filter::Only),
        }
    }
}

/// Case-insensitive substring match; an empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sos_alert::AlertStatus;

    #[test]
    fn all_and_blank_mean_no_filter() {
        assert_eq!(Filter::<AlertStatus>::parse(None).unwrap(), Filter::All);
        assert_eq!(Filter::<AlertStatus>::parse(Some(" all ")).unwrap(), Filter::All);
        assert_eq!(
            Filter::<AlertStatus>::parse(Some("pending")).unwrap(),
            Filter::Only(AlertStatus::Pending)
        );
        assert!(Filter::<AlertStatus>::parse(Some("open")).is_err());
    }

    #[test]
    fn substring_search_ignores_case() {
        assert!(contains_ignore_case("Sarah Johnson", "john"));
        assert!(contains_ignore_case("Sarah Johnson", ""));
        assert!(!contains_ignore_case("Sarah Johnson", "chen"));
    }
}
