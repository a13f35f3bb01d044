//! JSON API for lineup operations
//!
//! String-in, string-out entry points for UI hosts. Every call answers with an
//! `ApiResponse<T>` envelope; failures carry the `PositioningError` code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::chemistry::{
    compute_chemistry, ChemistryReport, FamiliarityTable, MentoringGroups, RelationshipBook,
};
use crate::config::PositioningConfig;
use crate::error::PositioningError;
use crate::formation::{FieldPoint, Formation, FormationPreset};
use crate::models::{PlayerId, Roster};
use crate::positioning::{
    CancelReason, ConflictContext, DragHandle, OutcomeOption, PositioningMode, ReleaseOutcome,
    ResolutionOutcome, TacticsBoard,
};

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self { code: code.to_string(), message: message.to_string(), details: None }
    }

    pub fn from_positioning_error(error: &PositioningError) -> Self {
        let mut details = HashMap::new();
        details.insert("recoverable".to_string(), serde_json::Value::Bool(error.is_recoverable()));
        Self { code: error.code().to_string(), message: error.to_string(), details: Some(details) }
    }
}

impl From<PositioningError> for ApiError {
    fn from(error: PositioningError) -> Self {
        Self::from_positioning_error(&error)
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn parse_request<T: for<'de> Deserialize<'de>>(request_json: &str, kind: &str) -> Result<T, ApiError> {
    serde_json::from_str(request_json).map_err(|e| {
        error!("Failed to parse {}: {}", kind, e);
        ApiError::new("INVALID_JSON", &format!("Invalid JSON format: {}", e))
    })
}

fn check_schema(version: &Option<String>) -> Result<(), ApiError> {
    match version.as_deref() {
        None | Some(API_VERSION) => Ok(()),
        Some(other) => Err(ApiError::new(
            "UNSUPPORTED_SCHEMA",
            &format!("Unsupported schema version: {}", other),
        )),
    }
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> String {
    match result {
        Ok(data) => ApiResponse::success(data).to_json(),
        Err(error) => ApiResponse::<T>::error(error).to_json(),
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationPresetRequest {
    pub schema_version: Option<String>,
    /// `T433` or `4-3-3`
    pub preset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetSummary {
    pub id: String,
    pub display_name: String,
}

pub fn formation_preset_json(request_json: &str) -> String {
    respond(formation_preset(request_json))
}

fn formation_preset(request_json: &str) -> Result<Formation, ApiError> {
    let request: FormationPresetRequest = parse_request(request_json, "FormationPresetRequest")?;
    check_schema(&request.schema_version)?;
    let preset = FormationPreset::parse(&request.preset).ok_or_else(|| {
        warn!("Unknown formation preset: {}", request.preset);
        ApiError::new("UNKNOWN_PRESET", &format!("Unknown formation preset: {}", request.preset))
    })?;
    debug!("Built preset {}", preset.id());
    Ok(preset.build())
}

pub fn list_presets_json() -> String {
    let presets: Vec<PresetSummary> = FormationPreset::all()
        .into_iter()
        .map(|p| PresetSummary { id: p.id().to_string(), display_name: p.display_name().to_string() })
        .collect();
    ApiResponse::success(presets).to_json()
}

// ---------------------------------------------------------------------------
// Chemistry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemistryRequest {
    pub schema_version: Option<String>,
    pub formation: Formation,
    #[serde(default)]
    pub relationships: RelationshipBook,
    #[serde(default)]
    pub mentoring: MentoringGroups,
    #[serde(default)]
    pub familiarity: FamiliarityTable,
    #[serde(default)]
    pub config: Option<PositioningConfig>,
}

pub fn compute_chemistry_json(request_json: &str) -> String {
    info!("Processing chemistry request");
    respond(chemistry(request_json))
}

fn chemistry(request_json: &str) -> Result<ChemistryReport, ApiError> {
    let request: ChemistryRequest = parse_request(request_json, "ChemistryRequest")?;
    check_schema(&request.schema_version)?;
    let config = request.config.unwrap_or_default();
    config.validate()?;
    request.formation.check_unique_bindings()?;

    let report = compute_chemistry(
        &request.formation,
        &request.relationships,
        &request.mentoring,
        &request.familiarity,
        &config,
    );
    info!(
        "Scored {} pairs, formation average {:.1}",
        report.pair_scores.len(),
        report.formation_average
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Interaction replay
// ---------------------------------------------------------------------------

/// One recorded UI event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionStep {
    PickUp {
        player_id: PlayerId,
        at: FieldPoint,
        #[serde(default)]
        mode: PositioningMode,
    },
    LongPress {
        player_id: PlayerId,
        at: FieldPoint,
        #[serde(default)]
        mode: PositioningMode,
    },
    Move {
        at: FieldPoint,
    },
    Release,
    Cancel,
    Resolve {
        outcome: ResolutionOutcome,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRequest {
    pub schema_version: Option<String>,
    pub formation: Formation,
    pub roster: Roster,
    #[serde(default)]
    pub relationships: RelationshipBook,
    #[serde(default)]
    pub mentoring: MentoringGroups,
    #[serde(default)]
    pub familiarity: FamiliarityTable,
    #[serde(default)]
    pub config: Option<PositioningConfig>,
    pub steps: Vec<InteractionStep>,
    /// Applied if the steps end on a pending conflict
    #[serde(default)]
    pub outcome: Option<ResolutionOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Committed,
    Conflict,
    Cancelled,
    /// Steps ran out before a release
    InProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub status: InteractionStatus,
    pub formation: Formation,
    pub conflict: Option<ConflictContext>,
    /// Menu for a pending conflict
    pub options: Vec<OutcomeOption>,
    pub cancel_reason: Option<CancelReason>,
    pub chemistry: ChemistryReport,
}

pub fn apply_interaction_json(request_json: &str) -> String {
    info!("Processing interaction replay");
    respond(apply_interaction(request_json))
}

fn apply_interaction(request_json: &str) -> Result<InteractionResponse, ApiError> {
    let request: InteractionRequest = parse_request(request_json, "InteractionRequest")?;
    check_schema(&request.schema_version)?;

    let config = request.config.unwrap_or_else(PositioningConfig::from_env_or_default);
    let mut board = TacticsBoard::new(request.formation, request.roster, config)?.with_chemistry(
        request.relationships,
        request.mentoring,
        request.familiarity,
    );

    let mut handle: Option<DragHandle> = None;
    let mut last: Option<ReleaseOutcome> = None;
    for step in request.steps {
        last = replay_step(&mut board, &mut handle, step)?;
    }

    if let (Some(ReleaseOutcome::Conflict(_)), Some(outcome), Some(h)) = (&last, request.outcome, handle) {
        debug!("Applying trailing outcome {:?}", outcome);
        last = Some(board.resolve_conflict(h, outcome)?);
    }

    let chemistry = board.compute_chemistry();
    let formation = board.formation().clone();
    let response = match last {
        Some(ReleaseOutcome::Committed { .. }) => InteractionResponse {
            status: InteractionStatus::Committed,
            formation,
            conflict: None,
            options: Vec::new(),
            cancel_reason: None,
            chemistry,
        },
        Some(ReleaseOutcome::Conflict(conflict)) => InteractionResponse {
            status: InteractionStatus::Conflict,
            formation,
            options: conflict.available_outcomes(),
            conflict: Some(conflict),
            cancel_reason: None,
            chemistry,
        },
        Some(ReleaseOutcome::Cancelled(reason)) => InteractionResponse {
            status: InteractionStatus::Cancelled,
            formation,
            conflict: None,
            options: Vec::new(),
            cancel_reason: Some(reason),
            chemistry,
        },
        None => InteractionResponse {
            status: InteractionStatus::InProgress,
            formation,
            conflict: None,
            options: Vec::new(),
            cancel_reason: None,
            chemistry,
        },
    };
    info!("Interaction finished with status {:?}", response.status);
    Ok(response)
}

fn replay_step(
    board: &mut TacticsBoard,
    handle: &mut Option<DragHandle>,
    step: InteractionStep,
) -> Result<Option<ReleaseOutcome>, PositioningError> {
    match step {
        InteractionStep::PickUp { player_id, at, mode } => {
            *handle = Some(board.start_drag(&player_id, at, mode)?);
            Ok(None)
        }
        InteractionStep::LongPress { player_id, at, mode } => {
            *handle = Some(board.start_long_press(&player_id, at, mode)?);
            Ok(None)
        }
        InteractionStep::Move { at } => {
            let update = board.update_drag(require(*handle, "move")?, at)?;
            Ok(update.cancelled.map(ReleaseOutcome::Cancelled))
        }
        InteractionStep::Release => Ok(Some(board.release_drag(require(*handle, "release")?)?)),
        InteractionStep::Cancel => {
            board.cancel_drag(require(*handle, "abort")?)?;
            Ok(Some(ReleaseOutcome::Cancelled(CancelReason::Aborted)))
        }
        InteractionStep::Resolve { outcome } => {
            Ok(Some(board.resolve_conflict(require(*handle, "choose")?, outcome)?))
        }
    }
}

fn require(handle: Option<DragHandle>, event: &'static str) -> Result<DragHandle, PositioningError> {
    handle.ok_or(PositioningError::InvalidTransition { state: "idle", event })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::SlotId;
    use serde_json::json;

    fn lineup_json() -> serde_json::Value {
        let formation = FormationPreset::T442.build();
        let mut formation = serde_json::to_value(&formation).unwrap();
        let bindings = [(0usize, "gk"), (1, "lb"), (2, "lcb"), (3, "rcb")];
        for (slot, player) in bindings {
            formation["slots"][slot]["player"] = json!(player);
        }
        json!({
            "formation": formation,
            "roster": [
                { "id": "gk", "name": "Keeper", "role": "GK" },
                { "id": "lb", "name": "Left Back", "role": "LB" },
                { "id": "lcb", "name": "Left CB", "role": "LCB" },
                { "id": "rcb", "name": "Right CB", "role": "RCB" },
                { "id": "sub", "name": "Sub", "role": "CB" }
            ],
            "relationships": [ { "a": "lcb", "b": "rcb", "kind": "friendship" } ]
        })
    }

    #[test]
    fn test_formation_preset_json() {
        let response = formation_preset_json(r#"{"preset": "4-3-3"}"#);
        let result: ApiResponse<Formation> = serde_json::from_str(&response).unwrap();
        assert!(result.success);
        let formation = result.data.unwrap();
        assert_eq!(formation.slots.len(), 11);

        let response = formation_preset_json(r#"{"preset": "9-0-1"}"#);
        let result: ApiResponse<Formation> = serde_json::from_str(&response).unwrap();
        assert!(!result.success);
        assert_eq!(result.error.unwrap().code, "UNKNOWN_PRESET");
    }

    #[test]
    fn test_list_presets_json() {
        let result: ApiResponse<Vec<PresetSummary>> =
            serde_json::from_str(&list_presets_json()).unwrap();
        assert_eq!(result.data.unwrap().len(), 14);
    }

    #[test]
    fn test_invalid_json_and_schema() {
        let result: ApiResponse<ChemistryReport> =
            serde_json::from_str(&compute_chemistry_json("not json")).unwrap();
        assert_eq!(result.error.unwrap().code, "INVALID_JSON");

        let mut request = lineup_json();
        request["schema_version"] = json!("v9");
        let result: ApiResponse<ChemistryReport> =
            serde_json::from_str(&compute_chemistry_json(&request.to_string())).unwrap();
        assert_eq!(result.error.unwrap().code, "UNSUPPORTED_SCHEMA");
    }

    #[test]
    fn test_compute_chemistry_json() {
        let response = compute_chemistry_json(&lineup_json().to_string());
        let result: ApiResponse<ChemistryReport> = serde_json::from_str(&response).unwrap();
        assert!(result.success);
        let report = result.data.unwrap();
        assert_eq!(report.pair_scores.len(), 6);
        assert_eq!(report.score(&PlayerId::from("rcb"), &PlayerId::from("lcb")), Some(20));
    }

    #[test]
    fn test_compute_chemistry_json_rejects_duplicate_bindings() {
        let mut request = lineup_json();
        request["formation"]["slots"][4]["player"] = json!("lcb");
        let result: ApiResponse<ChemistryReport> =
            serde_json::from_str(&compute_chemistry_json(&request.to_string())).unwrap();
        assert!(!result.success);
        assert_eq!(result.error.unwrap().code, "DUPLICATE_BINDING");
    }

    #[test]
    fn test_apply_interaction_reports_left_field() {
        let mut request = lineup_json();
        request["steps"] = json!([
            { "type": "pick_up", "player_id": "lcb", "at": { "x": 40.0, "y": 20.0 } },
            { "type": "move", "at": { "x": 40.0, "y": -30.0 } }
        ]);
        let result: ApiResponse<InteractionResponse> =
            serde_json::from_str(&apply_interaction_json(&request.to_string())).unwrap();
        let data = result.data.unwrap();
        assert_eq!(data.status, InteractionStatus::Cancelled);
        assert_eq!(data.cancel_reason, Some(CancelReason::LeftField));
        assert_eq!(data.formation.occupant(SlotId(2)), Some(&PlayerId::from("lcb")));
    }

    #[test]
    fn test_apply_interaction_swap() {
        let mut request = lineup_json();
        request["steps"] = json!([
            { "type": "pick_up", "player_id": "lcb", "at": { "x": 40.0, "y": 20.0 } },
            { "type": "move", "at": { "x": 59.0, "y": 20.0 } },
            { "type": "release" }
        ]);

        let result: ApiResponse<InteractionResponse> =
            serde_json::from_str(&apply_interaction_json(&request.to_string())).unwrap();
        let data = result.data.unwrap();
        assert_eq!(data.status, InteractionStatus::Conflict);
        assert_eq!(data.options.len(), 4);
        assert!(data.options[0].recommended);

        request["outcome"] = json!("swap");
        let result: ApiResponse<InteractionResponse> =
            serde_json::from_str(&apply_interaction_json(&request.to_string())).unwrap();
        let data = result.data.unwrap();
        assert_eq!(data.status, InteractionStatus::Committed);
        assert_eq!(data.formation.occupant(SlotId(2)), Some(&PlayerId::from("rcb")));
        assert_eq!(data.formation.occupant(SlotId(3)), Some(&PlayerId::from("lcb")));
    }

    #[test]
    fn test_apply_interaction_reports_engine_errors() {
        let mut request = lineup_json();
        request["steps"] = json!([{ "type": "release" }]);
        let result: ApiResponse<InteractionResponse> =
            serde_json::from_str(&apply_interaction_json(&request.to_string())).unwrap();
        let error = result.error.unwrap();
        assert_eq!(error.code, "INVALID_TRANSITION");
        assert_eq!(error.details.unwrap()["recoverable"], json!(true));
    }
}
