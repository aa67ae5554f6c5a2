/// Countries offered to the user, with the job-search API's country code.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("United States", "us"),
    ("New Zealand", "nz"),
    ("United Kingdom", "gb"),
    ("Australia", "au"),
    ("Canada", "ca"),
    ("India", "in"),
];

pub const DEFAULT_COUNTRY: &str = "us";

/// Resolves a country by display name or code, case-insensitively.
pub fn resolve_country(input: &str) -> Option<&'static str> {
    let input = input.trim();
    COUNTRIES
        .iter()
        .find(|(name, code)| name.eq_ignore_ascii_case(input) || code.eq_ignore_ascii_case(input))
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_name_and_code() {
        assert_eq!(resolve_country("United Kingdom"), Some("gb"));
        assert_eq!(resolve_country("new zealand"), Some("nz"));
        assert_eq!(resolve_country("IN"), Some("in"));
        assert_eq!(resolve_country(" au "), Some("au"));
    }

    #[test]
    fn test_unknown_country() {
        assert_eq!(resolve_country("Atlantis"), None);
        assert_eq!(resolve_country(""), None);
    }

    #[test]
    fn test_default_is_listed() {
        assert_eq!(resolve_country(DEFAULT_COUNTRY), Some(DEFAULT_COUNTRY));
    }
}
