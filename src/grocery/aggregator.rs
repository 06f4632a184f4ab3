use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::category::{categorize, GroceryCategory};
use super::parse::parse_ingredient;
use crate::models::Meal;

/// One ingredient line together with the meal it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLine {
    pub meal_name: String,
    pub text: String,
}

impl IngredientLine {
    pub fn new(meal_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            meal_name: meal_name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    /// Canonical ingredient name; unique within a list.
    pub name: String,
    /// Number of ingredient lines folded into this item.
    pub count: u32,
    pub quantity: f64,
    pub display: String,
    /// Distinct meal names in first-seen order.
    pub meals: Vec<String>,
    pub category: GroceryCategory,
}

struct Accumulator {
    name: String,
    first_unit: Option<String>,
    count: u32,
    quantity: f64,
    meals: Vec<String>,
}

/// Flattens meals into ingredient lines, preserving meal and ingredient order.
pub fn ingredient_lines(meals: &[Meal]) -> Vec<IngredientLine> {
    meals
        .iter()
        .flat_map(|meal| {
            meal.ingredients
                .iter()
                .map(move |text| IngredientLine::new(meal.name.clone(), text.clone()))
        })
        .collect()
}

/// Builds the deduplicated, sorted shopping list. Lines that do not parse are
/// skipped; no input yields an empty list.
pub fn build_grocery_list(lines: &[IngredientLine]) -> Vec<GroceryItem> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Accumulator> = Vec::new();

    for line in lines {
        let Some(parsed) = parse_ingredient(&line.text) else {
            continue;
        };

        let slot = *index.entry(parsed.name.clone()).or_insert_with(|| {
            groups.push(Accumulator {
                name: parsed.name.clone(),
                // display unit comes from the first line seen for this name
                first_unit: parsed.unit.clone(),
                count: 0,
                quantity: 0.0,
                meals: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.count += 1;
        group.quantity += parsed.quantity;
        if !group.meals.contains(&line.meal_name) {
            group.meals.push(line.meal_name.clone());
        }
    }

    let mut items: Vec<GroceryItem> = groups
        .into_iter()
        .map(|group| GroceryItem {
            display: display_string(group.quantity, group.first_unit.as_deref(), &group.name),
            category: categorize(&group.name),
            name: group.name,
            count: group.count,
            quantity: group.quantity,
            meals: group.meals,
        })
        .collect();

    sort_by_display(&mut items);
    items
}

pub fn display_string(quantity: f64, unit: Option<&str>, name: &str) -> String {
    match unit {
        Some(unit) => format!("{} {} {}", format_quantity(quantity), unit, name),
        None if quantity > 1.0 => format!("{} {}", format_quantity(quantity), name),
        None => name.to_string(),
    }
}

/// Renders a quantity with at most two decimals and no trailing zeros.
pub fn format_quantity(quantity: f64) -> String {
    let rounded = (quantity * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        let text = format!("{:.2}", rounded);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Case-insensitive ascending order on the display string.
pub fn sort_by_display(items: &mut [GroceryItem]) {
    items.sort_by(|a, b| {
        a.display
            .to_lowercase()
            .cmp(&b.display.to_lowercase())
            .then_with(|| a.display.cmp(&b.display))
    });
}

/// Groups a sorted list by category, keeping the list order inside each group
/// and skipping empty categories.
pub fn group_by_category(items: &[GroceryItem]) -> Vec<(GroceryCategory, Vec<&GroceryItem>)> {
    GroceryCategory::ALL
        .iter()
        .map(|category| {
            (
                *category,
                items.iter().filter(|item| item.category == *category).collect::<Vec<_>>(),
            )
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(entries: &[(&str, &str)]) -> Vec<IngredientLine> {
        entries
            .iter()
            .map(|(meal, text)| IngredientLine::new(*meal, *text))
            .collect()
    }

    #[test]
    fn quantity_formatting() {
        assert_eq!(format_quantity(4.0), "4");
        assert_eq!(format_quantity(1.5), "1.5");
        assert_eq!(format_quantity(0.1 + 0.2), "0.3");
        assert_eq!(format_quantity(2.256), "2.26");
    }

    #[test]
    fn huge_quantities_are_printed_in_full() {
        assert_eq!(format_quantity(1e20), "100000000000000000000");
        let items = build_grocery_list(&lines(&[("Pilaf", "100000000000000000000 cups rice")]));
        assert_eq!(items[0].display, "100000000000000000000 cups rice");
    }

    #[test]
    fn display_rules() {
        assert_eq!(display_string(4.0, Some("cups"), "spinach"), "4 cups spinach");
        assert_eq!(display_string(3.0, None, "egg"), "3 egg");
        assert_eq!(display_string(1.0, None, "avocado"), "avocado");
        assert_eq!(display_string(1.0, Some("lb"), "salmon"), "1 lb salmon");
    }

    #[test]
    fn unit_comes_from_first_seen_line_only() {
        let items = build_grocery_list(&lines(&[
            ("Omelette", "spinach"),
            ("Salad", "2 cups spinach"),
        ]));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3.0);
        assert_eq!(items[0].display, "3 spinach");
    }

    #[test]
    fn repeated_line_in_one_meal_counts_twice_but_lists_meal_once() {
        let items = build_grocery_list(&lines(&[
            ("Stir fry", "1 clove garlic"),
            ("Stir fry", "2 cloves garlic, minced"),
        ]));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "garlic");
        assert_eq!(items[0].count, 2);
        assert_eq!(items[0].quantity, 3.0);
        assert_eq!(items[0].meals, vec!["Stir fry"]);
        assert_eq!(items[0].category, GroceryCategory::Produce);
    }

    #[test]
    fn blank_and_water_lines_are_ignored() {
        let items = build_grocery_list(&lines(&[
            ("Soup", "water"),
            ("Soup", "   "),
            ("Soup", "4 cups water"),
            ("Soup", "1 cup lentils"),
        ]));
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["lentils"]);
    }

    #[test]
    fn category_grouping_follows_category_order() {
        let items = build_grocery_list(&lines(&[
            ("Bowl", "1 cup rice"),
            ("Bowl", "1 lb chicken"),
            ("Bowl", "1 cup broccoli"),
        ]));
        let grouped = group_by_category(&items);
        let order: Vec<GroceryCategory> = grouped.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            order,
            vec![
                GroceryCategory::Produce,
                GroceryCategory::Protein,
                GroceryCategory::Grains
            ]
        );
    }
}
