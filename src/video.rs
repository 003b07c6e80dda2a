use url::Url;

const SEARCH_BASE_URL: &str = "https://www.youtube.com/results";
const RECIPE_QUERY_SUFFIX: &str = "recipe cooking";

fn search_url(query: &str) -> String {
    match Url::parse_with_params(SEARCH_BASE_URL, &[("search_query", query)]) {
        Ok(url) => url.into(),
        // Unreachable with the constant base.
        Err(_) => format!("{}?search_query={}", SEARCH_BASE_URL, query.replace(' ', "+")),
    }
}

/// Video search link for a recipe: `"{name} recipe cooking"`, form-encoded.
pub fn recipe_search_url(recipe_name: &str) -> String {
    search_url(&format!("{} {}", recipe_name.trim(), RECIPE_QUERY_SUFFIX))
}

/// Video search link for browsing a whole cuisine.
pub fn cuisine_search_url(cuisine: &str) -> String {
    search_url(&format!("{} recipes", cuisine.trim()))
}
