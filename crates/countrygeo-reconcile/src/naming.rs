//! How a country is named and constrained when querying the provider.

use countrygeo_core::models::CountryCode;

/// Names that geocode better than the registry's short name.
const NAME_REPLACEMENTS: &[(&str, &str)] = &[
    ("BQ", "Caribbean Netherlands"),
    ("CG", "Congo-Brazzaville"),
    ("CW", "Curaçao island"),
    ("CX", "Territory of Christmas Island"),
    ("FK", "Falkland Islands"),
    ("FR", "Mainland France"),
    ("KP", "North Korea"),
    ("KR", "South Korea"),
    ("MF", "Collectivité de Saint-Martin"),
    ("MH", "Republic of the Marshall Islands"),
    ("MT", "Republic of Malta"),
    ("NL", "Mainland Netherlands"),
    ("PS", "State of Palestine"),
    ("VG", "British Virgin Islands"),
    ("VI", "U.S. Virgin Islands"),
    ("ZA", "Republic of South Africa"),
];

/// Dependent territories reported by the provider under their sovereign's code.
const CODE_REPLACEMENTS: &[(&str, &str)] = &[("AS", "US"), ("CC", "AU"), ("HM", "AU"), ("PR", "US")];

/// Territories classified as a `state` of their owner rather than a `country`.
const AUTONOMOUS_STATES: &[(&str, &str)] = &[
    ("AW", "NL"),
    ("AX", "FI"),
    ("BQ", "NL"),
    ("CX", "AU"),
    ("VI", "VI"),
    ("YT", "FR"),
];

fn lookup(table: &[(&str, &'static str)], code: &CountryCode) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == code.as_str()).map(|&(_, value)| value)
}

/// Free-text name used for the strict query: the replacement name, else the registry name.
pub fn query_name(code: &CountryCode) -> Option<&'static str> {
    lookup(NAME_REPLACEMENTS, code).or_else(|| code.name())
}

/// Whether the code has a replacement name or political code.
pub fn is_renamed(code: &CountryCode) -> bool {
    lookup(NAME_REPLACEMENTS, code).is_some() || lookup(CODE_REPLACEMENTS, code).is_some()
}

/// Code the provider reports in the ISO component for this country.
pub fn political_code(code: &CountryCode) -> CountryCode {
    lookup(CODE_REPLACEMENTS, code).map(CountryCode::from_static).unwrap_or(*code)
}

/// Owner code for autonomous territories.
pub fn autonomous_owner(code: &CountryCode) -> Option<CountryCode> {
    lookup(AUTONOMOUS_STATES, code).map(CountryCode::from_static)
}

/// Country constraint of the strict query.
pub fn query_constraint(code: &CountryCode) -> CountryCode {
    autonomous_owner(code).unwrap_or_else(|| political_code(code))
}

/// Classification the strict query looks for.
pub fn expected_kind(code: &CountryCode) -> &'static str {
    if autonomous_owner(code).is_some() {
        "state"
    } else {
        "country"
    }
}
