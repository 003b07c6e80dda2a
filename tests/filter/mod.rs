use cookmatch::aliases::AliasTable;
use cookmatch::dataset::parse_recipes;
use cookmatch::error::RecommendError;
use cookmatch::filter::*;
use cookmatch::normalization::normalize_ingredients;
use cookmatch::{CandidateScore, MealType, Recipe};

const DEFAULT_THRESHOLD: f64 = cookmatch::config::DEFAULT_OVERLAP_THRESHOLD;

const DATASET: &str = "\
recipe_name,ingredients,cooking_time,meal_type,cuisine,instructions
Tomato Rice,rice tomato onion spices,20,Lunch,Indian,Cook rice with tomato masala.
Jeera Rice,rice cumin oil salt,15,Lunch,Indian,Temper cumin and toss with rice.
Onion Rice,rice onion oil spices,20,Lunch,Indian,Fry onions and mix.
Lemon Rice,rice lemon oil salt,15,Lunch,Indian,Mix lemon juice into rice.
Tomato Soup,tomato onion garlic water,25,Dinner,Indian,Simmer and blend.
Pasta Pomodoro,pasta tomato garlic oil,20,Lunch,Italian,Boil pasta and toss.
Slow Biryani,rice chicken onion yogurt spices,90,Lunch,Indian,Layer and steam.
";

fn recipes() -> Vec<Recipe> {
    parse_recipes(DATASET.as_bytes(), &AliasTable::builtin()).unwrap()
}

fn run<'a>(
    recipes: &'a [Recipe],
    ingredients: &str,
    max_time: u32,
    meal_type: MealType,
    cuisine: &str,
) -> Result<Vec<CandidateScore<'a>>, RecommendError> {
    let user = normalize_ingredients(ingredients, &AliasTable::builtin());
    let criteria = FilterCriteria {
        ingredients: &user,
        max_time,
        meal_type,
        cuisine,
    };
    filter_candidates(recipes, &criteria, &FilterOptions::default())
}

#[test]
fn test_tomato_rice_scenario() {
    let recipes = recipes();
    let candidates = run(&recipes, "rice, tomato, onion", 30, MealType::Lunch, "Indian").unwrap();

    assert_eq!(candidates[0].recipe.name, "Tomato Rice");
    assert!((candidates[0].overlap_ratio - 0.75).abs() < 1e-9);
    assert_eq!(candidates[0].matched, 3);
}

#[test]
fn test_time_limit_excludes_regardless_of_match() {
    let recipes = recipes();
    let result = run(&recipes, "rice, tomato, onion, spices", 10, MealType::Lunch, "Indian");
    assert!(matches!(result, Err(RecommendError::NoCandidates { .. })));
}

#[test]
fn test_unknown_cuisine_is_no_candidates() {
    let recipes = recipes();
    let err = run(&recipes, "rice, tomato, onion", 30, MealType::Lunch, "French").unwrap_err();
    match err {
        RecommendError::NoCandidates {
            rejected_cuisine, ..
        } => assert!(rejected_cuisine > 0),
    }
}

#[test]
fn test_cuisine_match_is_case_insensitive() {
    let recipes = recipes();
    let candidates = run(&recipes, "rice, tomato, onion", 30, MealType::Lunch, "  iNDIAN ").unwrap();
    assert_eq!(candidates[0].recipe.name, "Tomato Rice");
}

#[test]
fn test_below_threshold_excluded() {
    let recipes = recipes();
    // Tomato Rice has 2/4 = 0.5 here
    let result = run(&recipes, "rice, tomato", 30, MealType::Lunch, "Indian");
    assert!(result.is_err());
}

#[test]
fn test_ties_keep_dataset_order() {
    let recipes = recipes();
    let candidates = run(&recipes, "rice, oil, salt, onion, spices, tomato, cumin, lemon", 30, MealType::Lunch, "Indian").unwrap();
    let names: Vec<&str> = candidates.iter().map(|c| c.recipe.name.as_str()).collect();
    assert_eq!(names, vec!["Tomato Rice", "Jeera Rice", "Onion Rice", "Lemon Rice"]);
    assert!(candidates.iter().all(|c| c.overlap_ratio == 1.0));
}

#[test]
fn test_sorted_descending_and_truncated() {
    let recipes = recipes();
    let user = normalize_ingredients("rice, oil, salt, onion, spices, cumin", &AliasTable::builtin());
    let criteria = FilterCriteria {
        ingredients: &user,
        max_time: 30,
        meal_type: MealType::Lunch,
        cuisine: "Indian",
    };
    let options = FilterOptions {
        threshold: 0.5,
        top_n: 2,
    };
    let candidates = filter_candidates(&recipes, &criteria, &options).unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].recipe.name, "Jeera Rice");
    assert_eq!(candidates[1].recipe.name, "Onion Rice");
    assert!(candidates[0].overlap_ratio >= candidates[1].overlap_ratio);
}

#[test]
fn test_candidate_iff_all_constraints_hold() {
    let recipes = recipes();
    let user = normalize_ingredients("rice, tomato, onion, garlic, oil", &AliasTable::builtin());
    let options = FilterOptions {
        threshold: DEFAULT_THRESHOLD,
        top_n: recipes.len(),
    };

    for meal_type in [MealType::Lunch, MealType::Dinner] {
        for cuisine in ["Indian", "Italian"] {
            for max_time in [10, 20, 30, 120] {
                let criteria = FilterCriteria {
                    ingredients: &user,
                    max_time,
                    meal_type,
                    cuisine,
                };
                let names: Vec<String> = filter_candidates(&recipes, &criteria, &options)
                    .map(|c| c.iter().map(|c| c.recipe.name.clone()).collect())
                    .unwrap_or_default();

                for recipe in &recipes {
                    let expected = recipe.cooking_time <= max_time
                        && recipe.meal_type == meal_type
                        && recipe.cuisine.eq_ignore_ascii_case(cuisine)
                        && overlap_ratio(&user, &recipe.ingredients) >= DEFAULT_THRESHOLD;
                    assert_eq!(names.contains(&recipe.name), expected, "{} {:?} {} {}", recipe.name, meal_type, cuisine, max_time);
                }
            }
        }
    }
}
