use crate::params::ParamAction;

#[inline]
pub fn action_for_key(key: &str) -> Option<ParamAction> {
    match key {
        "+" | "=" => Some(ParamAction::IncreaseRayDepth),
        "-" | "_" => Some(ParamAction::DecreaseRayDepth),
        "n" | "N" => Some(ParamAction::ToggleNormals),
        "]" => Some(ParamAction::IncreaseRefraction),
        "[" => Some(ParamAction::DecreaseRefraction),
        "." => Some(ParamAction::IncreaseAbsorption),
        "," => Some(ParamAction::DecreaseAbsorption),
        "b" | "B" => Some(ParamAction::CycleBackground),
        "c" | "C" => Some(ParamAction::CycleGemColor),
        _ => None,
    }
}
