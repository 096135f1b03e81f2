/// UI filter operator names and their backend enum names.
pub const OPERATOR_MAP: [(&str, &str); 12] = [
    ("equals", "EQUALS"),
    ("notEquals", "NOT_EQUALS"),
    ("contains", "CONTAINS"),
    ("notContains", "NOT_CONTAINS"),
    ("startsWith", "STARTS_WITH"),
    ("endsWith", "ENDS_WITH"),
    ("greaterThan", "GREATER_THAN"),
    ("lessThan", "LESS_THAN"),
    ("greaterThanOrEqual", "GREATER_THAN_OR_EQUAL"),
    ("lessThanOrEqual", "LESS_THAN_OR_EQUAL"),
    ("isEmpty", "IS_NULL"),
    ("isNotEmpty", "IS_NOT_NULL"),
];

/// Unknown operators are passed through upper-cased.
#[must_use]
pub fn to_backend(operator: &str) -> String {
    OPERATOR_MAP
        .iter()
        .find(|(ui, _)| *ui == operator)
        .map_or_else(|| operator.to_uppercase(), |(_, backend)| (*backend).to_string())
}

#[cfg(test)]
mod tests {
    use super::to_backend;

    #[test]
    fn maps_known_operators() {
        assert_eq!(to_backend("equals"), "EQUALS");
        assert_eq!(to_backend("greaterThanOrEqual"), "GREATER_THAN_OR_EQUAL");
        assert_eq!(to_backend("isEmpty"), "IS_NULL");
        assert_eq!(to_backend("isNotEmpty"), "IS_NOT_NULL");
    }

    #[test]
    fn unknown_operators_are_upper_cased() {
        assert_eq!(to_backend("between"), "BETWEEN");
        assert_eq!(to_backend("in"), "IN");
    }
}
