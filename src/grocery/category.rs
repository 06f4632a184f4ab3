use serde::{Deserialize, Serialize};
use std::fmt;

/// Store section a grocery item is shown under. Presentation only; it plays no
/// part in deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroceryCategory {
    Produce,
    Protein,
    Dairy,
    Grains,
    Pantry,
    Other,
}

impl GroceryCategory {
    pub const ALL: [GroceryCategory; 6] = [
        GroceryCategory::Produce,
        GroceryCategory::Protein,
        GroceryCategory::Dairy,
        GroceryCategory::Grains,
        GroceryCategory::Pantry,
        GroceryCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GroceryCategory::Produce => "Produce",
            GroceryCategory::Protein => "Protein",
            GroceryCategory::Dairy => "Dairy",
            GroceryCategory::Grains => "Grains",
            GroceryCategory::Pantry => "Pantry",
            GroceryCategory::Other => "Other",
        }
    }
}

impl fmt::Display for GroceryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Checked top to bottom; the first keyword found as a substring decides.
const CATEGORY_RULES: &[(GroceryCategory, &[&str])] = &[
    (
        GroceryCategory::Produce,
        &[
            "apple", "banana", "berries", "berry", "lemon", "lime", "orange", "avocado",
            "mango", "grape", "pear", "peach", "pineapple", "spinach", "kale", "lettuce",
            "arugula", "greens", "broccoli", "cauliflower", "cabbage", "carrot", "celery",
            "cucumber", "zucchini", "squash", "eggplant", "tomato", "onion", "garlic",
            "potato", "bell pepper", "mushroom", "asparagus", "green bean", "peas", "beet",
            "radish", "ginger", "cilantro", "parsley", "basil", "mint", "scallion",
        ],
    ),
    (
        GroceryCategory::Protein,
        &[
            "chicken", "beef", "turkey", "pork", "lamb", "bacon", "sausage", "fish",
            "salmon", "tuna", "cod", "shrimp", "tofu", "tempeh", "seitan", "egg", "lentil",
            "bean", "chickpea", "edamame", "peanut", "protein powder",
        ],
    ),
    (
        GroceryCategory::Dairy,
        &[
            "milk", "cheese", "yogurt", "butter", "cream", "kefir", "cottage", "ricotta",
            "mozzarella", "parmesan", "feta",
        ],
    ),
    (
        GroceryCategory::Grains,
        &[
            "rice", "quinoa", "oat", "bread", "pasta", "spaghetti", "noodle", "tortilla",
            "flour", "barley", "couscous", "bulgur", "farro", "cereal", "granola", "cracker",
            "bagel", "pita",
        ],
    ),
    (
        GroceryCategory::Pantry,
        &[
            "oil", "vinegar", "salt", "sugar", "honey", "syrup", "sauce", "broth", "stock",
            "spice", "cumin", "paprika", "cinnamon", "oregano", "turmeric", "chili",
            "mustard", "ketchup", "mayo", "almond", "walnut", "cashew", "pecan", "seed",
            "nut", "baking", "vanilla", "cocoa", "chocolate", "canned",
        ],
    ),
];

pub fn categorize(name: &str) -> GroceryCategory {
    let lowered = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(GroceryCategory::Other)
}
