mod common;

use chrono::NaiveDate;
use common::*;
use meal_optim::meal_generator::{generate_meal_plan, regenerate_meal};
use meal_optim::models::MealType;
use meal_optim::store::{InMemoryStore, MealStore};
use meal_optim::MealPlanError;

fn two_day_plan_reply() -> String {
    serde_json::json!({
        "meals": [
            {"day_of_week": 1, "meal_type": "breakfast", "name": "Greek yogurt parfait",
             "description": "Yogurt with berries", "ingredients": ["1 cup greek yogurt", "0.5 cup blueberries"],
             "instructions": "Layer and serve.", "calories": 350, "protein": 25, "fiber": 6},
            {"day_of_week": 1, "meal_type": "dinner", "name": "Chickpea curry",
             "description": "Spiced chickpeas", "ingredients": ["1 can chickpeas", "1 onion, diced"],
             "instructions": "Simmer 20 minutes.", "calories": 700, "protein": 28, "fiber": 16},
            {"day_of_week": 2, "meal_type": "lunch", "name": "Lentil salad",
             "description": "", "ingredients": ["1 cup cooked lentils"],
             "instructions": "Toss.", "calories": 480, "protein": 26, "fiber": 15}
        ]
    })
    .to_string()
}

#[tokio::test]
async fn generated_plan_is_stored_as_the_active_plan() {
    let store = store_with_meals(vec![meal("old-1", 1, MealType::Lunch, 20.0, 5.0)]);
    let generator = ScriptedGenerator::replying(&[format!(
        "Here is your plan:\n```json\n{}\n```",
        two_day_plan_reply()
    )]);
    let start = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();

    let (plan, meals) = generate_meal_plan(&store, &generator, USER_ID, " Week 44 ", start)
        .await
        .unwrap();

    assert_eq!(plan.name, "Week 44");
    assert_eq!(plan.end_date, NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
    assert_eq!(meals.len(), 3);
    assert!(meals.iter().all(|m| m.meal_plan_id == plan.id));

    let stored = store.meals_for_plan(&plan.id).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].name, "Greek yogurt parfait");
    assert_eq!(stored[2].day_of_week, 2);

    let snapshot = store.snapshot().await;
    let active: Vec<&str> = snapshot
        .meal_plans
        .iter()
        .filter(|p| p.is_active)
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(active, vec![plan.id.as_str()]);

    let prompt = &generator.prompts()[0];
    assert!(prompt.user.contains("mediterranean"));
    assert!(prompt.user.contains("at least 100.0 g"));
}

#[tokio::test]
async fn invalid_plan_reply_persists_nothing() {
    let store = store_with_meals(vec![]);
    let before = store.snapshot().await;
    let generator = ScriptedGenerator::replying(&[r#"{"meals": [{"day_of_week": 9, "meal_type": "lunch",
        "name": "Soup", "ingredients": [], "calories": 300, "protein": 10, "fiber": 4}]}"#
        .to_string()]);
    let start = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();

    let err = generate_meal_plan(&store, &generator, USER_ID, "Week 44", start)
        .await
        .unwrap_err();

    assert!(err.is_collaborator());
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn generation_needs_preferences_and_a_name() {
    let store = InMemoryStore::new();
    let generator = ScriptedGenerator::replying(&[]);
    let start = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();

    let err = generate_meal_plan(&store, &generator, USER_ID, "Week 44", start)
        .await
        .unwrap_err();
    assert!(matches!(err, MealPlanError::NotFound { .. }));

    let err = generate_meal_plan(&store, &generator, USER_ID, "   ", start)
        .await
        .unwrap_err();
    assert!(matches!(err, MealPlanError::Validation { field: "plan_name", .. }));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn regenerated_meal_keeps_its_slot() {
    let store = store_with_meals(vec![meal("m1", 4, MealType::Dinner, 20.0, 4.0)]);
    let generator = ScriptedGenerator::replying(&[serde_json::json!({
        "name": "Salmon with quinoa",
        "description": "Baked salmon",
        "ingredients": ["6 oz salmon", "1 cup quinoa"],
        "instructions": "Bake at 200C for 15 minutes.",
        "calories": 640,
        "protein": 45,
        "fiber": 7
    })
    .to_string()]);

    let meal = regenerate_meal(&store, &generator, USER_ID, "m1").await.unwrap();

    assert_eq!(meal.name, "Salmon with quinoa");
    assert_eq!(meal.meal_type, MealType::Dinner);
    assert_eq!(meal.day_of_week, 4);
    assert_eq!(store.meal("m1").await.unwrap().unwrap(), meal);
    assert!(generator.prompts()[0].user.contains("Thursday"));
}

#[tokio::test]
async fn regenerating_an_unknown_meal_is_not_found() {
    let store = store_with_meals(vec![]);
    let generator = ScriptedGenerator::replying(&[]);
    let err = regenerate_meal(&store, &generator, USER_ID, "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, MealPlanError::NotFound { entity: "meal", .. }));
}

#[tokio::test]
async fn meals_of_other_users_cannot_be_regenerated() {
    let mut snapshot = snapshot_with_meals(vec![meal("m1", 4, MealType::Dinner, 20.0, 4.0)]);
    let mut other_goals = goals();
    other_goals.user_id = "user-2".to_string();
    snapshot.nutritional_goals.push(other_goals);
    let mut other_restrictions = restrictions();
    other_restrictions.user_id = "user-2".to_string();
    snapshot.dietary_restrictions.push(other_restrictions);
    let store = InMemoryStore::from_snapshot(snapshot);
    let before = store.snapshot().await;
    let generator = ScriptedGenerator::replying(&[]);

    let err = regenerate_meal(&store, &generator, "user-2", "m1")
        .await
        .unwrap_err();

    assert!(matches!(err, MealPlanError::NotFound { entity: "meal", .. }));
    assert_eq!(generator.calls(), 0);
    assert_eq!(store.snapshot().await, before);
}
