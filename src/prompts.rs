//! Prompt builders: pure functions from a typed request to the instruction
//! string sent to the model. No I/O, deterministic given identical input.
//!
//! Optional collections render as a literal placeholder ("None" /
//! "not restricted") because the output feeds a natural-language
//! instruction, not a data structure.

use crate::models::{MealLogRequest, MealPlanRequest, RecipeRequest};

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn fmt_opt_f64(value: Option<f64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| format!("{v:.1}"))
}

/// Daily meal plan generation prompt.
pub fn meal_plan_prompt(request: &MealPlanRequest) -> String {
    let dietary = join_or(&request.dietary_preferences, "not restricted");
    let allergies = join_or(&request.allergies, "None");
    let health_issues = join_or(&request.health_issues, "None");

    format!(
        r#"You are a world-class AI nutritionist and meal planner. Your job is to generate a personalized daily meal plan that aligns with the user's dietary preferences, health conditions, regional food availability, and nutritional needs.

### User profile & preferences
- Meal goal: {goal}
- Dietary preferences: {dietary}
- Allergies / food restrictions: {allergies}
- Region / country: {region} (ensure meals use common ingredients in this region)
- Activity level: {activity}
- Age: {age}
- Gender: {gender}
- Portion size preference: {portion} (small, balanced, large)
- Health issues: {health_issues}
- Cooking experience: {cooking}
- Eating frequency: {frequency}
- BMI: {bmi}, BMI category: {bmi_category}
- Meals per day: {meal_count} (ensure meal count aligns with eating frequency)
- Snack & sweet preference: include a healthy snack and a dessert based on user goals & restrictions.

### Meal plan generation rules
1. Ensure meal diversity and avoid repetition: suggest different meal types each day and rotate proteins, grains, and vegetables.
2. Regional adaptation: if an ingredient is uncommon in {region}, suggest a regional substitute; use locally available foods whenever possible.
3. Balance nutrition with precise portion control:
   - Adjust portion sizes based on {portion} and {activity}.
   - Each ingredient must include a precise weight in grams (g).
   - The total meal weight must reflect the portion size: small = ~350-450g per meal, balanced = ~500-650g per meal, large = ~700-900g per meal.
   - Estimate macronutrients (protein, carbs, fats, calories) conservatively: internally consider a realistic range but return the upper bound estimate for each value, rounded to the nearest integer, so caloric intake is never underestimated.
4. Strictly adhere to dietary preferences and allergies: exclude any ingredients from: {allergies}. Ensure meals are strictly {dietary}.
5. Adapt to cooking skill level: recommend meals matching a {cooking} cook; quick meals for beginners, more elaborate dishes for experienced cooks.
6. Generate {meal_count} meals per day based on {frequency}. If the frequency is two_meals or intermittent_fasting, include only breakfast and dinner. If it is one_large_meal, make it a nutrient-dense meal covering all macronutrients. Always include one healthy snack and one healthy dessert aligned with {goal}, the dietary preferences, allergies and health issues.
7. Ingredient and meal name uniqueness: never repeat the same meal name, even with different ingredients. Each meal must introduce at least one new primary ingredient or preparation style, and meals should feel different in cuisine, base ingredients, or flavor profile.
8. Strict JSON format, no additional text. The response must be a JSON array where each object represents a meal:
[
    {{
        "meal": "Breakfast",
        "name": "Oatmeal with Banana & Honey",
        "ingredients": [
            {{"name": "rolled oats", "quantity": "50g"}},
            {{"name": "banana", "quantity": "100g"}},
            {{"name": "honey", "quantity": "15g"}},
            {{"name": "almond milk", "quantity": "200ml"}}
        ],
        "calories": 350,
        "cooking_instructions": [
            "Boil almond milk.",
            "Add oats & cook for 5 minutes.",
            "Top with banana & drizzle honey."
        ],
        "macros": {{"protein": 8, "carbs": 50, "fats": 5}},
        "cooking_time": "10 minutes",
        "difficulty": "easy",
        "total_weight": "450g"
    }}
]
"#,
        goal = request.meal_goal,
        dietary = dietary,
        allergies = allergies,
        region = request.region,
        activity = request.activity_level,
        age = request.age,
        gender = request.gender,
        portion = request.portion_size.as_str(),
        health_issues = health_issues,
        cooking = request.cooking_experience.as_str(),
        frequency = request.eating_frequency.as_str(),
        bmi = fmt_opt_f64(request.bmi),
        bmi_category = request.bmi_category.as_deref().unwrap_or("unknown"),
        meal_count = request.meal_count,
    )
}

/// Yes/no gate before generating a meal log from free text.
pub fn meal_log_validation_prompt(description: &str) -> String {
    format!(
        r#"You are a strict meal log validator. Respond with only one word: "yes" or "no".

Here is the user's input:
"{description}"

Does it look like a valid meal description (containing food items, what they ate, or meal-related info)?"#
    )
}

/// Structured meal log extraction from a free-text meal description.
pub fn meal_log_generation_prompt(request: &MealLogRequest) -> String {
    format!(
        r#"You are a certified AI nutritionist trained to analyze real-world meal descriptions. Your job is to extract structured, accurate nutritional information from a user's free-text meal entry.

The user described their meal as:
"""
{description}
"""

### Instructions
1. Parse the ingredients and estimate quantities in grams or standard servings (e.g., 1 cup, 2 slices). If no quantity is mentioned, assume a typical portion size.
2. Estimate total calories and macronutrients (protein, carbs, fats) for the entire meal using realistic values from USDA/FoodData Central or similar databases. Internally estimate a realistic range for each value and return only the upper bound of the estimate so nothing is underestimated. Assume full servings, sauces, oils and garnishes if likely.
3. Estimate the total weight of the dish in grams.
4. Return a reasonable cooking time and a difficulty level (easy, intermediate, expert).
5. If no valid meal can be confidently extracted, respond with the exact string "INVALID".

Output must be returned in strict JSON format like below:
```json
{{
  "name": "Grilled Chicken with Brown Rice",
  "ingredients": [
    {{ "name": "Grilled chicken breast", "quantity": "150g" }},
    {{ "name": "Brown rice", "quantity": "1 cup (195g)" }},
    {{ "name": "Olive oil", "quantity": "1 tbsp" }}
  ],
  "calories": 750,
  "macros": {{
    "protein": 50,
    "carbs": 50,
    "fats": 30
  }},
  "cooking_time": "25 minutes",
  "difficulty": "easy",
  "total_weight": "500g"
}}
```"#,
        description = request.meal_description
    )
}

/// Recipe-from-leftovers generation prompt.
pub fn recipe_prompt(request: &RecipeRequest) -> String {
    format!(
        r#"You are a professional chef and nutritionist. Help users create a healthy, creative recipe based on leftover ingredients.

The user has provided:
- Ingredients: {ingredients}
- Tags: {tags}
- Lifestyle: {lifestyle}

Your tasks:
- Suggest a creative recipe using ONLY or mostly the listed ingredients.
- Assume the user has basic kitchen & pantry items (e.g., salt, pepper, oil).
- Respect the tags (e.g., under 30 min, high protein) and lifestyle (e.g., vegan).

Strict output rules:
- Estimate realistic macros (protein, carbs, fats) and calories based on common ingredient knowledge.
- Only set a macro value to 0 if it is truly negligible or missing.
- Always output macros and calories as integers (no decimals, no strings).
- Respond only with pure JSON (no markdown, no explanations, no comments).

Output format:
```json
{{
  "name": "Zucchini Feta Omelette",
  "ingredients": [
    {{ "name": "zucchini", "quantity": "100g" }},
    {{ "name": "feta cheese", "quantity": "50g" }},
    {{ "name": "eggs", "quantity": "2 large" }}
  ],
  "instructions": [
    "Grate the zucchini and squeeze out excess moisture.",
    "Beat the eggs with crumbled feta and zucchini.",
    "Cook the mixture in a non-stick pan for 5-7 minutes.",
    "Fold and serve warm."
  ],
  "estimated_time": "10 minutes",
  "difficulty": "easy",
  "calories": 350,
  "macros": {{
    "protein": 25,
    "carbs": 10,
    "fats": 20
  }},
  "servings": 2
}}
```"#,
        ingredients = join_or(&request.ingredients, "None"),
        tags = join_or(&request.tags, "None"),
        lifestyle = request.lifestyle.as_deref().unwrap_or("None"),
    )
}

/// Food-photo analysis prompt. The reply must carry a `meal_data.name`
/// discriminator; `difficulty` and `cooking_time` are strings.
pub fn image_analysis_prompt() -> String {
    r#"You are a nutrition and food vision expert. Given a real-world food image, analyze it and return structured meal data that matches a specific schema for logging meals.

Please perform the following:
1. Assign a unified meal name for the dish (e.g., "Grilled Chicken and Jalapeno Sandwich on Brown Bread").
2. Identify key ingredients and estimate their quantities.
3. Estimate macronutrients for the full meal: fats (g), carbs (g), protein (g).
4. Estimate total calories and total weight (in grams) for the entire meal.
5. Suggest a "difficulty" level for cooking this dish and a best estimate for "cooking_time".

Format your response in strict JSON using this structure:
```json
{
  "meal_data": {
    "meal": "Snack",
    "name": "Grilled Chicken and Jalapeno Sandwich on Brown Bread",
    "macros": {
      "fats": 15,
      "carbs": 45,
      "protein": 30
    },
    "calories": 420,
    "difficulty": "easy",
    "ingredients": [
      { "name": "Grilled chicken breast", "quantity": "100g" },
      { "name": "Jalapeno slices", "quantity": "20g" },
      { "name": "Brown bread", "quantity": "2 slices (60g)" }
    ],
    "cooking_time": "30 minutes",
    "total_weight": "180g"
  },
  "description": "A short description of the dish as seen in the image."
}
```"#
    .to_string()
}

/// Image-synthesis prompt for a named meal.
pub fn meal_image_prompt(meal_name: &str) -> String {
    format!(
        "A realistic, high-quality photo of {meal_name} served beautifully on a plate. Clean background."
    )
}

/// Image-synthesis prompt for a single ingredient, styled like a stock
/// grocery photo.
pub fn ingredient_image_prompt(ingredient_name: &str) -> String {
    format!(
        "A clear, isolated stock photo of {ingredient_name}, sliced or whole, on a clean white \
         background. The ingredient should be fresh, realistic, and photographed from a top-down \
         or slightly angled view. No shadows, no additional objects. The image should have a \
         smooth, uniform white background similar to stock grocery images. Ensure it is a small, \
         centered object with no extra styling. The image should be crisp, sharp, and look like a \
         real food stock image. Size should be 100x100 pixels, perfectly framed, no blur or \
         artistic details."
    )
}
