//! Intent extraction — sport and city from a free-text message.
//!
//! Pure keyword scanning, no model calls. Ordered lists so matching is
//! deterministic: the first sport keyword and the first city token win.

use tracing::debug;

use crate::types::SearchArgs;

/// Sport keywords in scan order. First match wins; combinations are
/// not detected.
pub const SPORTS: [&str; 3] = ["cricket", "football", "badminton"];

/// City tokens recognized anywhere in the message, in scan order.
const CITIES: [&str; 11] = [
    "mumbai",
    "delhi",
    "bangalore",
    "bengaluru",
    "chennai",
    "kolkata",
    "hyderabad",
    "pune",
    "kochi",
    "kakkanad",
    "trivandrum",
];

/// Cities accepted by the positional "in <city>" heuristic. Narrower
/// than `CITIES`: only places the default provider directly serves.
const DIRECTLY_SUPPORTED: [&str; 5] = ["mumbai", "delhi", "bangalore", "bengaluru", "kakkanad"];

/// Canonicalize city aliases to the form providers key on.
fn canonical_city(city: &str) -> String {
    match city {
        "bengaluru" => "bangalore".to_string(),
        other => other.to_string(),
    }
}

/// Extract a (sport, location) pair from a message.
///
/// Returns `None` unless both resolve — a sport without a resolvable
/// city is not a search. Matching is case-insensitive and the returned
/// location is lower-cased canonical.
pub fn extract(message: &str) -> Option<SearchArgs> {
    let message = message.to_lowercase();

    let sport = SPORTS.iter().find(|s| message.contains(*s))?;

    let mut location = CITIES
        .iter()
        .find(|c| message.contains(*c))
        .map(|c| canonical_city(c));

    if location.is_none() {
        // Positional heuristic: the word right after the literal "in",
        // accepted only from the directly supported set.
        let words: Vec<&str> = message.split_whitespace().collect();
        if let Some(in_idx) = words.iter().position(|w| *w == "in") {
            if let Some(candidate) = words.get(in_idx + 1) {
                if DIRECTLY_SUPPORTED.contains(candidate) {
                    location = Some(canonical_city(candidate));
                }
            }
        }
    }

    let location = location?;
    debug!(sport = %sport, location = %location, "Search intent extracted");

    Some(SearchArgs {
        sport: sport.to_string(),
        location,
    })
}

/// Whether the message mentions any known sport at all.
///
/// Used by the router to pick the narrower "specify both" prompt when
/// `extract` fails only on the location side.
pub fn mentions_sport(message: &str) -> bool {
    let message = message.to_lowercase();
    SPORTS.iter().any(|s| message.contains(s))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_cricket_mumbai() {
        let args = extract("Find cricket venues in Mumbai").unwrap();
        assert_eq!(args.sport, "cricket");
        assert_eq!(args.location, "mumbai");
    }

    #[test]
    fn test_extract_football_delhi() {
        let args = extract("Show me football grounds in Delhi").unwrap();
        assert_eq!(args.sport, "football");
        assert_eq!(args.location, "delhi");
    }

    #[test]
    fn test_extract_badminton_bangalore() {
        let args = extract("I need badminton courts in Bangalore").unwrap();
        assert_eq!(args.sport, "badminton");
        assert_eq!(args.location, "bangalore");
    }

    #[test]
    fn test_bengaluru_canonicalizes_to_bangalore() {
        let args = extract("cricket venues in Bengaluru").unwrap();
        assert_eq!(args.location, "bangalore");
    }

    #[test]
    fn test_extract_kakkanad() {
        let args = extract("badminton in Kakkanad").unwrap();
        assert_eq!(args.sport, "badminton");
        assert_eq!(args.location, "kakkanad");
    }

    #[test]
    fn test_case_insensitive() {
        let upper = extract("CRICKET VENUES IN MUMBAI").unwrap();
        let lower = extract("cricket venues in mumbai").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_no_sport_returns_none_even_with_city() {
        assert!(extract("Find venues in Mumbai").is_none());
    }

    #[test]
    fn test_sport_without_city_returns_none() {
        assert!(extract("Find cricket venues").is_none());
    }

    #[test]
    fn test_first_sport_wins() {
        let args = extract("cricket or football in mumbai").unwrap();
        assert_eq!(args.sport, "cricket");
    }

    #[test]
    fn test_positional_heuristic_rejects_unknown_city() {
        // "in atlantis" — not in the directly supported set
        assert!(extract("cricket courts in atlantis").is_none());
    }

    #[test]
    fn test_positional_heuristic_accepts_supported_city() {
        // No city-list substring hit would be needed if the token is
        // out-of-list, but a supported word after "in" still resolves.
        let args = extract("Book a football slot in kakkanad tomorrow").unwrap();
        assert_eq!(args.location, "kakkanad");
    }

    #[test]
    fn test_mentions_sport() {
        assert!(mentions_sport("any CRICKET nearby?"));
        assert!(!mentions_sport("any tennis nearby?"));
    }
}
