//! Label matching policy for the scan pipeline.
//!
//! Plain string comparison, not fuzzy ranking: an exact name match wins;
//! failing that, a case-insensitive comparison of trimmed names. The first
//! product to match is returned.

use crate::product::Product;

pub fn match_label<'a>(products: &'a [Product], label: &str) -> Option<&'a Product> {
    if let Some(product) = products.iter().find(|p| p.name == label) {
        return Some(product);
    }

    let needle = label.trim();
    products
        .iter()
        .find(|p| p.name.trim().eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::NewProduct;
    use chrono::Utc;

    fn product(name: &str) -> Product {
        Product::create(
            NewProduct {
                name: name.to_string(),
                category: "grocery".to_string(),
                quantity: 1,
                unit_cost_cents: 0,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn exact_match_wins_over_case_insensitive() {
        let products = vec![product("widget"), product("Widget")];
        let matched = match_label(&products, "Widget").unwrap();
        assert_eq!(matched.name, "Widget");
    }

    #[test]
    fn falls_back_to_case_insensitive_trimmed_comparison() {
        let products = vec![product("Olive Oil")];
        let matched = match_label(&products, "  olive oil ").unwrap();
        assert_eq!(matched.name, "Olive Oil");
    }

    #[test]
    fn no_match_returns_none() {
        let products = vec![product("Widget")];
        assert!(match_label(&products, "Sprocket").is_none());
    }
}
