use serde::{Deserialize, Serialize};
use validator::Validate;

/// Portion size preference for a meal plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortionSize {
    Small,
    Balanced,
    Large,
}

impl PortionSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortionSize::Small => "small",
            PortionSize::Balanced => "balanced",
            PortionSize::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookingExperience {
    Beginner,
    Intermediate,
    Expert,
}

impl CookingExperience {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookingExperience::Beginner => "beginner",
            CookingExperience::Intermediate => "intermediate",
            CookingExperience::Expert => "expert",
        }
    }
}

/// How many eating occasions the user wants per day.
///
/// Open enum: clients send free-form strings here, so unrecognized values
/// deserialize to `Other` and fall back to the default meal count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EatingFrequency {
    ThreeMeals,
    TwoMeals,
    IntermittentFasting,
    SmallFrequentMeals,
    OneLargeMeal,
    #[serde(other)]
    Other,
}

impl EatingFrequency {
    /// Fixed frequency-to-meal-count table. The client-supplied meal_count
    /// is always overwritten with this value.
    pub fn meal_count(&self) -> u32 {
        match self {
            EatingFrequency::ThreeMeals => 3,
            EatingFrequency::TwoMeals => 2,
            EatingFrequency::IntermittentFasting => 2,
            EatingFrequency::SmallFrequentMeals => 5,
            EatingFrequency::OneLargeMeal => 1,
            EatingFrequency::Other => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EatingFrequency::ThreeMeals => "three_meals",
            EatingFrequency::TwoMeals => "two_meals",
            EatingFrequency::IntermittentFasting => "intermittent_fasting",
            EatingFrequency::SmallFrequentMeals => "small_frequent_meals",
            EatingFrequency::OneLargeMeal => "one_large_meal",
            EatingFrequency::Other => "unspecified",
        }
    }
}

/// Inbound body for POST /generate-meals
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MealPlanRequest {
    pub meal_goal: String,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub region: String,
    pub activity_level: String,
    #[validate(range(min = 1))]
    pub age: u32,
    pub gender: String,
    pub portion_size: PortionSize,
    pub cooking_experience: CookingExperience,
    #[serde(default)]
    pub health_issues: Vec<String>,
    pub eating_frequency: EatingFrequency,
    /// Derived field; any client-supplied value is ignored and overwritten
    /// from `eating_frequency` before prompting.
    #[serde(default)]
    pub meal_count: u32,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub bmi_category: Option<String>,
    #[serde(default)]
    pub is_pro: bool,
    #[serde(default)]
    pub regenerate_count: u32,
}

impl MealPlanRequest {
    pub fn apply_meal_count(&mut self) {
        self.meal_count = self.eating_frequency.meal_count();
    }
}

/// Inbound body for POST /generate-recipe-from-leftovers
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecipeRequest {
    #[validate(length(min = 1, message = "ingredients must not be empty"))]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lifestyle: Option<String>,
    #[serde(default)]
    pub is_pro: bool,
}

/// Inbound body for POST /generate-meal-log-from-text
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MealLogRequest {
    #[validate(length(min = 1, message = "meal_description must not be empty"))]
    pub meal_description: String,
    #[serde(default)]
    pub is_pro: bool,
}

/// Inbound body for POST /analyze-image
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeImageRequest {
    #[validate(length(min = 1, message = "image_base64 must not be empty"))]
    pub image_base64: String,
}

// Gemini generateContent wire format. The model id is routed through the
// URL, not the body, so it is skipped during serialization.

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    #[serde(skip)]
    pub model: String,
    pub contents: Vec<ModelContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelContent {
    #[serde(default)]
    pub parts: Vec<ModelPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        rename = "inlineData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inline_data: Option<InlineData>,
}

/// Inline binary payload; `data` is base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: ModelContent,
}

impl GenerateRequest {
    /// Plain text prompt request.
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: vec![ModelContent {
                parts: vec![ModelPart {
                    text: Some(prompt.into()),
                    inline_data: None,
                }],
            }],
            generation_config: None,
        }
    }

    /// Image-plus-prompt request (image part first, like the vision flow).
    pub fn with_inline_image(
        model: impl Into<String>,
        prompt: impl Into<String>,
        mime_type: impl Into<String>,
        base64_data: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            contents: vec![ModelContent {
                parts: vec![
                    ModelPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.into(),
                            data: base64_data.into(),
                        }),
                    },
                    ModelPart {
                        text: Some(prompt.into()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: None,
        }
    }

    /// Image-synthesis request; the model must be allowed to answer with an
    /// inline image part.
    pub fn image_generation(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        let mut request = Self::text(model, prompt);
        request.generation_config = Some(GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
        });
        request
    }
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any text was returned.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let mut out = String::new();
        for part in &candidate.content.parts {
            if let Some(text) = &part.text {
                out.push_str(text);
            }
        }
        if out.is_empty() { None } else { Some(out) }
    }

    /// First inline (binary) part of the first candidate, if any.
    pub fn inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|part| part.inline_data.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_count_table_is_fixed() {
        assert_eq!(EatingFrequency::ThreeMeals.meal_count(), 3);
        assert_eq!(EatingFrequency::TwoMeals.meal_count(), 2);
        assert_eq!(EatingFrequency::IntermittentFasting.meal_count(), 2);
        assert_eq!(EatingFrequency::SmallFrequentMeals.meal_count(), 5);
        assert_eq!(EatingFrequency::OneLargeMeal.meal_count(), 1);
        assert_eq!(EatingFrequency::Other.meal_count(), 3);
    }

    #[test]
    fn unknown_eating_frequency_defaults_to_three_meals() {
        let body = serde_json::json!({
            "meal_goal": "weight loss",
            "region": "Sweden",
            "activity_level": "moderately active",
            "age": 30,
            "gender": "female",
            "portion_size": "balanced",
            "cooking_experience": "beginner",
            "eating_frequency": "grazing_all_day",
            "meal_count": 99
        });

        let mut request: MealPlanRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.eating_frequency, EatingFrequency::Other);

        request.apply_meal_count();
        // Client-supplied 99 is discarded in favor of the table default.
        assert_eq!(request.meal_count, 3);
    }

    #[test]
    fn client_meal_count_is_always_overwritten() {
        let body = serde_json::json!({
            "meal_goal": "muscle gain",
            "region": "Brazil",
            "activity_level": "highly active",
            "age": 24,
            "gender": "male",
            "portion_size": "large",
            "cooking_experience": "expert",
            "eating_frequency": "small_frequent_meals",
            "meal_count": 1
        });

        let mut request: MealPlanRequest = serde_json::from_value(body).unwrap();
        request.apply_meal_count();
        assert_eq!(request.meal_count, 5);
    }

    #[test]
    fn generate_request_serializes_camel_case_without_model() {
        let request = GenerateRequest::image_generation("img-model", "a plate of food");
        let value = serde_json::to_value(&request).unwrap();

        assert!(value.get("model").is_none());
        assert_eq!(
            value["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT", "IMAGE"])
        );
        assert_eq!(
            value["contents"][0]["parts"][0]["text"],
            serde_json::json!("a plate of food")
        );
    }

    #[test]
    fn response_text_concatenates_parts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [ {"text": "Hello "}, {"text": "world"} ] }
            }]
        }))
        .unwrap();

        assert_eq!(response.text().unwrap(), "Hello world");
        assert!(response.inline_image().is_none());
    }

    #[test]
    fn response_inline_image_is_found_after_text_parts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    {"text": "here is your image"},
                    {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}
                ] }
            }]
        }))
        .unwrap();

        let inline = response.inline_image().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "aGVsbG8=");
    }

    #[test]
    fn empty_response_has_no_text() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(response.text().is_none());
    }
}
