use crate::aliases::AliasTable;
use crate::error::DatasetError;
use crate::normalization::normalize_ingredient;
use crate::structures::{MealType, Recipe};
use indexmap::IndexSet;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

const REQUIRED_COLUMNS: &[&str] = &["recipe_name", "ingredients", "cooking_time", "meal_type", "cuisine"];

#[derive(Debug, Deserialize)]
struct RecipeRow {
    recipe_name: String,
    ingredients: String,
    cooking_time: String,
    meal_type: String,
    cuisine: String,
    #[serde(default)]
    instructions: Option<String>,
}

/// Splits the dataset's ingredient field. Space-separated tokens, unless
/// the field uses commas, in which case multi-word names are kept whole.
fn split_ingredient_field(field: &str) -> Vec<&str> {
    if field.contains(',') {
        field.split(',').collect()
    } else {
        field.split_whitespace().collect()
    }
}

fn row_to_recipe(row: RecipeRow, aliases: &AliasTable) -> Result<Recipe, String> {
    let name = row.recipe_name.trim().to_string();
    if name.is_empty() {
        return Err("blank recipe_name".to_string());
    }

    let cooking_time: u32 = row
        .cooking_time
        .trim()
        .parse()
        .map_err(|_| format!("cooking_time '{}' is not a whole number of minutes", row.cooking_time))?;

    let meal_type: MealType = row.meal_type.parse()?;

    let cuisine = row.cuisine.trim().to_string();
    if cuisine.is_empty() {
        return Err("blank cuisine".to_string());
    }

    let ingredients: IndexSet<String> = split_ingredient_field(&row.ingredients)
        .into_iter()
        .map(|token| normalize_ingredient(token, aliases).0)
        .filter(|token| !token.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err("no ingredients".to_string());
    }

    Ok(Recipe {
        name,
        ingredients,
        cooking_time,
        meal_type,
        cuisine,
        instructions: row.instructions.unwrap_or_default().trim().to_string(),
    })
}

/// Parses CSV recipe rows. Malformed rows are skipped with a warning; only
/// an unusable header or an empty result is an error.
pub fn parse_recipes<R: Read>(reader: R, aliases: &AliasTable) -> Result<Vec<Recipe>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(DatasetError::Header)?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(DatasetError::MissingColumn(column.to_string()));
        }
    }

    let mut recipes = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("⚠️  Skipping unreadable dataset row: {}", e);
                skipped += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let row: RecipeRow = match record.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(e) => {
                warn!("⚠️  Skipping dataset line {}: {}", line, e);
                skipped += 1;
                continue;
            }
        };

        match row_to_recipe(row, aliases) {
            Ok(recipe) => recipes.push(recipe),
            Err(reason) => {
                warn!("⚠️  Skipping dataset line {}: {}", line, reason);
                skipped += 1;
            }
        }
    }

    if recipes.is_empty() {
        return Err(DatasetError::Empty);
    }

    debug!("Parsed {} recipes, skipped {} rows", recipes.len(), skipped);
    Ok(recipes)
}

pub fn load_recipes(path: &Path, aliases: &AliasTable) -> Result<Vec<Recipe>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Open {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let recipes = parse_recipes(file, aliases)?;
    info!("✅ Loaded {} recipes from {}", recipes.len(), path.display());
    Ok(recipes)
}
