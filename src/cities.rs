//! City reference table: manifest parsing, slug derivation and the built-in fallback list.

use crate::models::City;
use serde_json::Value;

/// Cities used when the manifest cannot be fetched.
pub fn fallback_cities() -> Vec<City> {
    vec![
        City::new("Ciudad de México", "ciudad-de-mexico", 19.433, -99.133),
        City::new("Veracruz", "veracruz", 19.173, -96.134),
        City::new("Guadalajara", "guadalajara", 20.673, -103.346),
    ]
}

/// URL-safe identifier for a city name: lowercase ASCII, accents folded,
/// every other run of characters collapsed to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            c => c,
        };
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(folded);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Parse a city manifest (`[{name, slug?, lat, lon}, ...]`).
///
/// Entries that do not deserialize are skipped; missing slugs are derived from the name.
pub fn parse_manifest(v: &Value) -> Option<Vec<City>> {
    let arr = v.as_array()?;
    let mut out = Vec::with_capacity(arr.len());
    for (idx, item) in arr.iter().enumerate() {
        match serde_json::from_value::<City>(item.clone()) {
            Ok(mut city) => {
                if city.slug.trim().is_empty() {
                    city.slug = slugify(&city.name);
                }
                out.push(city);
            }
            Err(e) => log::debug!("skipping manifest entry {idx}: {e}"),
        }
    }
    Some(out)
}

pub fn find<'a>(cities: &'a [City], slug: &str) -> Option<&'a City> {
    cities.iter().find(|c| c.slug == slug)
}

/// Entry for `slug`, else the first known city, else the first fallback city.
pub fn resolve(cities: &[City], slug: &str) -> City {
    find(cities, slug)
        .or_else(|| cities.first())
        .cloned()
        .unwrap_or_else(|| fallback_cities().remove(0))
}

/// Display name for a slug, falling back to the slug itself.
pub fn display_name(cities: &[City], slug: &str) -> String {
    find(cities, slug)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| slug.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_folds_accents_and_separators() {
        assert_eq!(slugify("Ciudad de México"), "ciudad-de-mexico");
        assert_eq!(slugify("  Tuxtla  Gutiérrez "), "tuxtla-gutierrez");
        assert_eq!(slugify("San Luis Potosí"), "san-luis-potosi");
        assert_eq!(slugify("Nezahualcóyotl"), "nezahualcoyotl");
    }

    #[test]
    fn resolve_falls_back_to_first() {
        let cities = fallback_cities();
        assert_eq!(resolve(&cities, "veracruz").name, "Veracruz");
        assert_eq!(resolve(&cities, "nowhere").name, "Ciudad de México");
        assert_eq!(resolve(&[], "nowhere").slug, "ciudad-de-mexico");
    }
}
