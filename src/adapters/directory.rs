//! Static city directory resolver.
//!
//! Resolution order: canonical name, alias, IATA code, then fuzzy match
//! against names and aliases by edit-distance similarity. The directory
//! reports fuzzy candidates with their similarity as confidence and lets
//! the caller's acceptance rules decide; suggestions are ranked by the
//! same similarity.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::nlu::{CityMatchType, CityRef};
use crate::ports::CityResolver;

struct CityEntry {
    code: &'static str,
    name: &'static str,
    aliases: &'static [&'static str],
}

const CITIES: &[CityEntry] = &[
    CityEntry { code: "BOM", name: "mumbai", aliases: &["bombay"] },
    CityEntry { code: "DEL", name: "delhi", aliases: &["new delhi"] },
    CityEntry { code: "BLR", name: "bangalore", aliases: &["bengaluru"] },
    CityEntry { code: "MAA", name: "chennai", aliases: &["madras"] },
    CityEntry { code: "CCU", name: "kolkata", aliases: &["calcutta"] },
    CityEntry { code: "HYD", name: "hyderabad", aliases: &[] },
    CityEntry { code: "PNQ", name: "pune", aliases: &[] },
    CityEntry { code: "AMD", name: "ahmedabad", aliases: &[] },
    CityEntry { code: "GOI", name: "goa", aliases: &["panaji"] },
    CityEntry { code: "JAI", name: "jaipur", aliases: &[] },
    CityEntry { code: "LKO", name: "lucknow", aliases: &[] },
    CityEntry { code: "COK", name: "kochi", aliases: &["cochin"] },
    CityEntry { code: "IXC", name: "chandigarh", aliases: &[] },
    CityEntry { code: "GAU", name: "guwahati", aliases: &[] },
    CityEntry { code: "BBI", name: "bhubaneswar", aliases: &[] },
    CityEntry { code: "IDR", name: "indore", aliases: &[] },
    CityEntry { code: "NAG", name: "nagpur", aliases: &[] },
    CityEntry { code: "BDQ", name: "vadodara", aliases: &["baroda"] },
    CityEntry { code: "CJB", name: "coimbatore", aliases: &[] },
    CityEntry { code: "VTZ", name: "visakhapatnam", aliases: &["vizag"] },
    CityEntry { code: "SXR", name: "srinagar", aliases: &[] },
    CityEntry { code: "ATQ", name: "amritsar", aliases: &[] },
    CityEntry { code: "VNS", name: "varanasi", aliases: &["banaras"] },
    CityEntry { code: "PAT", name: "patna", aliases: &[] },
    CityEntry { code: "UDR", name: "udaipur", aliases: &[] },
];

/// In-process city resolver backed by a fixed directory.
#[derive(Debug, Default)]
pub struct CityDirectory;

impl CityDirectory {
    pub fn new() -> Self {
        Self
    }

    fn lookup(&self, raw: &str) -> Option<CityRef> {
        let query = raw.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        for entry in CITIES {
            if entry.name == query {
                return Some(CityRef::new(entry.code, entry.name, CityMatchType::Exact));
            }
        }
        for entry in CITIES {
            if entry.aliases.contains(&query.as_str()) {
                return Some(CityRef::new(entry.code, entry.name, CityMatchType::Alias));
            }
        }
        if query.len() == 3 {
            let code = query.to_uppercase();
            for entry in CITIES {
                if entry.code == code {
                    return Some(CityRef::new(entry.code, entry.name, CityMatchType::AirportCode));
                }
            }
        }

        self.best_fuzzy(&query)
    }

    fn best_fuzzy(&self, query: &str) -> Option<CityRef> {
        let mut best: Option<(f64, &CityEntry)> = None;
        for entry in CITIES {
            let score = std::iter::once(entry.name)
                .chain(entry.aliases.iter().copied())
                .map(|name| similarity(query, name))
                .fold(0.0_f64, f64::max);
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, entry));
            }
        }
        best.map(|(score, entry)| {
            CityRef::new(entry.code, entry.name, CityMatchType::Fuzzy).with_confidence(score)
        })
    }
}

#[async_trait]
impl CityResolver for CityDirectory {
    async fn resolve(&self, raw: &str) -> Result<Option<CityRef>, DomainError> {
        Ok(self.lookup(raw))
    }

    async fn suggestions(&self, raw: &str, limit: usize) -> Result<Vec<String>, DomainError> {
        let query = raw.trim().to_lowercase();
        let mut scored: Vec<(f64, &'static str)> = CITIES
            .iter()
            .map(|entry| {
                let score = std::iter::once(entry.name)
                    .chain(entry.aliases.iter().copied())
                    .map(|name| similarity(&query, name))
                    .fold(0.0_f64, f64::max);
                (score, entry.name)
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().take(limit).map(|(_, name)| name.to_string()).collect())
    }
}

/// Edit-distance similarity in [0, 1], normalized by the longer string.
fn similarity(a: &str, b: &str) -> f64 {
    let longer = a.chars().count().max(b.chars().count());
    if longer == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longer as f64
}

/// Classic two-row Levenshtein distance over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(raw: &str) -> Option<CityRef> {
        CityDirectory::new().lookup(raw)
    }

    mod edit_distance {
        use super::*;

        #[test]
        fn identical_strings_have_zero_distance() {
            assert_eq!(levenshtein("mumbai", "mumbai"), 0);
        }

        #[test]
        fn single_substitution_costs_one() {
            assert_eq!(levenshtein("mumbai", "mumbay"), 1);
        }

        #[test]
        fn empty_string_distance_is_other_length() {
            assert_eq!(levenshtein("", "goa"), 3);
        }

        #[test]
        fn similarity_is_normalized_by_longer_string() {
            assert!((similarity("mumbai", "mumbay") - 5.0 / 6.0).abs() < 1e-9);
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn canonical_name_is_exact() {
            let city = resolve("Mumbai").unwrap();
            assert_eq!(city.code, "BOM");
            assert_eq!(city.match_type, CityMatchType::Exact);
        }

        #[test]
        fn alias_resolves_to_canonical() {
            let city = resolve("bombay").unwrap();
            assert_eq!(city.code, "BOM");
            assert_eq!(city.canonical_name, "mumbai");
            assert_eq!(city.match_type, CityMatchType::Alias);
        }

        #[test]
        fn iata_code_resolves_case_insensitively() {
            let city = resolve("del").unwrap();
            assert_eq!(city.code, "DEL");
            assert_eq!(city.match_type, CityMatchType::AirportCode);
        }

        #[test]
        fn close_misspelling_is_fuzzy_with_high_confidence() {
            let city = resolve("mumbay").unwrap();
            assert_eq!(city.code, "BOM");
            assert_eq!(city.match_type, CityMatchType::Fuzzy);
            assert!(city.confidence >= 0.7, "confidence {}", city.confidence);
        }

        #[test]
        fn unrelated_text_has_low_confidence() {
            let city = resolve("xyzzy").unwrap();
            assert!(city.confidence < 0.7, "confidence {}", city.confidence);
        }
    }

    mod suggestions {
        use super::*;

        #[tokio::test]
        async fn closest_city_ranks_first() {
            let names = CityDirectory::new().suggestions("mumbay", 3).await.unwrap();
            assert_eq!(names[0], "mumbai");
            assert_eq!(names.len(), 3);
        }

        #[tokio::test]
        async fn limit_caps_the_list() {
            let names = CityDirectory::new().suggestions("delli", 2).await.unwrap();
            assert_eq!(names.len(), 2);
            assert_eq!(names[0], "delhi");
        }
    }
}
