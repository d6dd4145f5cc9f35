//! Model-variant selection policy.
//!
//! This is a cost/quality trade-off table, not an algorithm: it must stay a
//! literal table and the tests enumerate it.

/// The five model-backed use cases served by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCase {
    MealPlan,
    Recipe,
    MealLogValidation,
    MealLogGeneration,
    ImageAnalysis,
}

/// Abstract model tiers; `GeminiConfig::model_id` maps them to model ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    Fast,
    Premium,
    Thinking,
    Validation,
}

/// Pure selection policy over (use case, pro flag, regenerate count).
pub fn select_model(use_case: UseCase, pro: bool, regenerate_count: u32) -> ModelVariant {
    match use_case {
        UseCase::MealPlan => {
            if !pro {
                ModelVariant::Fast
            } else if regenerate_count == 0 {
                ModelVariant::Premium
            } else if regenerate_count % 2 != 0 {
                ModelVariant::Thinking
            } else {
                ModelVariant::Premium
            }
        }
        UseCase::Recipe | UseCase::MealLogGeneration => {
            if pro {
                ModelVariant::Premium
            } else {
                ModelVariant::Fast
            }
        }
        // Validation is deliberately pinned to one model regardless of tier.
        UseCase::MealLogValidation => ModelVariant::Validation,
        UseCase::ImageAnalysis => ModelVariant::Premium,
    }
}
