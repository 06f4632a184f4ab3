//! Turns one free-text ingredient line into a canonical name, quantity and unit.

use regex::Regex;
use std::sync::LazyLock;

const UNIT_ALTERNATION: &str = "cups|cup|tablespoons|tablespoon|tbsp|teaspoons|teaspoon|tsp|\
ounces|ounce|oz|pounds|pound|lbs|lb|kilograms|kilogram|kg|grams|gram|g|ml|liters|liter|l|\
small|medium|large";

static LEADING_QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)").expect("valid quantity regex"));

static QUANTITY_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\d+(?:\.\d+)?\s*({})\b\s*", UNIT_ALTERNATION))
        .expect("valid unit regex")
});

static QUANTITY_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:\.\d+)?\s*(?:extra large|small|medium|large)\b\s*")
        .expect("valid size regex")
});

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?\s*").expect("valid number regex"));

static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:a|an|the)\s+").expect("valid article regex"));

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthetical regex"));

static PREPARATION_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:diced|chopped|sliced|shredded|minced|grated|fresh|frozen|dried|cooked|raw)\b")
        .expect("valid preparation regex")
});

/// Substring rules folding ingredient variants onto one name. First match wins.
///
/// "pepper" also matches "peppercorn" and "black pepper"; that overlap is kept as is.
// "pepper" also matches "peppercorn", which lands on bell pepper. Fractions such as
// "1/2 cup oats" are not quantities: the line counts as 1 and keeps "/2 cup oats"
// as its name.
const CANONICAL_RULES: &[(&[&str], &str)] = &[
    (&["zucchini"], "zucchini"),
    (&["sweet potato"], "sweet potato"),
    (&["bell pepper", "pepper"], "bell pepper"),
    (&["onion"], "onion"),
    (&["garlic"], "garlic"),
    (&["tomato"], "tomato"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIngredient {
    /// The trimmed, lower-cased input line.
    pub original: String,
    pub quantity: f64,
    pub unit: Option<String>,
    /// Canonical base name; the aggregation key.
    pub name: String,
}

/// Parses one ingredient line. Returns `None` for blank lines and water.
pub fn parse_ingredient(text: &str) -> Option<ParsedIngredient> {
    let original = text.trim().to_lowercase();
    if original.is_empty() || is_plain_water(&original) {
        return None;
    }

    let name = canonical_name(&base_ingredient(&original));
    if name == "water" {
        return None;
    }

    Some(ParsedIngredient {
        quantity: leading_quantity(&original).unwrap_or(1.0),
        unit: leading_unit(&original),
        name,
        original,
    })
}

/// "water", or any single token containing it.
pub fn is_plain_water(lowered: &str) -> bool {
    lowered == "water" || (lowered.contains("water") && !lowered.contains(char::is_whitespace))
}

pub fn leading_quantity(lowered: &str) -> Option<f64> {
    LEADING_QUANTITY
        .captures(lowered)
        .and_then(|caps| caps[1].parse().ok())
}

/// The recognized unit directly after a leading quantity, if any.
pub fn leading_unit(lowered: &str) -> Option<String> {
    QUANTITY_UNIT
        .captures(lowered)
        .map(|caps| caps[1].to_string())
}

/// Strips quantities, units, articles, trailing notes and preparation words.
/// Falls back to the input when nothing is left.
pub fn base_ingredient(lowered: &str) -> String {
    let mut s = QUANTITY_UNIT.replace(lowered, "").into_owned();
    s = QUANTITY_SIZE.replace(&s, "").into_owned();
    s = BARE_NUMBER.replace(&s, "").into_owned();
    s = LEADING_ARTICLE.replace(&s, "").into_owned();
    if let Some(comma) = s.find(',') {
        s.truncate(comma);
    }
    s = PARENTHETICAL.replace_all(&s, " ").into_owned();
    s = PREPARATION_WORDS.replace_all(&s, " ").into_owned();

    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        lowered.to_string()
    } else {
        collapsed
    }
}

pub fn canonical_name(base: &str) -> String {
    CANONICAL_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| base.contains(needle)))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quantity_unit_and_strips_preparation() {
        let parsed = parse_ingredient("2 cups chopped spinach").unwrap();
        assert_eq!(parsed.quantity, 2.0);
        assert_eq!(parsed.unit.as_deref(), Some("cups"));
        assert_eq!(parsed.name, "spinach");
    }

    #[test]
    fn decimal_quantity_without_space() {
        let parsed = parse_ingredient("1.5kg Chicken Thighs").unwrap();
        assert_eq!(parsed.quantity, 1.5);
        assert_eq!(parsed.unit.as_deref(), Some("kg"));
        assert_eq!(parsed.name, "chicken thighs");
    }

    #[test]
    fn unit_must_be_a_whole_word() {
        assert_eq!(leading_unit("2 garlic cloves"), None);
        assert_eq!(leading_unit("3 lemons"), None);
        assert_eq!(leading_unit("1 large egg").as_deref(), Some("large"));
        assert_eq!(leading_unit("2 grams salt").as_deref(), Some("grams"));
        assert_eq!(leading_unit("cup of tea"), None);
    }

    #[test]
    fn fractions_are_not_quantities() {
        let parsed = parse_ingredient("1/2 cup oats").unwrap();
        assert_eq!(parsed.quantity, 1.0);
        assert_eq!(parsed.unit, None);
        assert_eq!(parsed.name, "/2 cup oats");
    }

    #[test]
    fn defaults_to_one_without_leading_number() {
        let parsed = parse_ingredient("Spinach").unwrap();
        assert_eq!(parsed.quantity, 1.0);
        assert_eq!(parsed.unit, None);
    }

    #[test]
    fn strips_size_article_comma_and_parenthetical() {
        assert_eq!(base_ingredient("2 extra large eggs"), "eggs");
        assert_eq!(base_ingredient("an avocado, pitted and sliced"), "avocado");
        assert_eq!(base_ingredient("1 can (15 oz) black beans"), "can black beans");
        assert_eq!(base_ingredient("the fresh basil leaves"), "basil leaves");
    }

    #[test]
    fn falls_back_to_original_when_everything_is_stripped() {
        assert_eq!(base_ingredient("2 cups"), "2 cups");
        assert_eq!(base_ingredient("chopped"), "chopped");
    }

    #[test]
    fn canonical_rules_apply_in_priority_order() {
        assert_eq!(canonical_name("red bell pepper"), "bell pepper");
        assert_eq!(canonical_name("zucchini and onion"), "zucchini");
        assert_eq!(canonical_name("sweet potato wedges"), "sweet potato");
        assert_eq!(canonical_name("red onions"), "onion");
        assert_eq!(canonical_name("cherry tomatoes"), "tomato");
        assert_eq!(canonical_name("brown rice"), "brown rice");
    }

    #[test]
    fn peppercorn_folds_into_bell_pepper() {
        assert_eq!(parse_ingredient("1 tsp peppercorns").unwrap().name, "bell pepper");
    }

    #[test]
    fn water_is_excluded() {
        assert!(parse_ingredient("Water").is_none());
        assert!(parse_ingredient("  water ").is_none());
        assert!(parse_ingredient("sparkling-water").is_none());
        assert!(parse_ingredient("2 cups water").is_none());
        assert!(parse_ingredient("coconut water").is_some());
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(parse_ingredient("   ").is_none());
        assert!(parse_ingredient("").is_none());
    }
}
