pub mod lineup_json;

pub use lineup_json::{
    apply_interaction_json, compute_chemistry_json, formation_preset_json, list_presets_json,
    ApiError, ApiResponse, ChemistryRequest, FormationPresetRequest, InteractionRequest,
    InteractionResponse, InteractionStatus, InteractionStep, PresetSummary, API_VERSION,
};
