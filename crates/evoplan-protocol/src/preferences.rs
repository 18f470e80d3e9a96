use serde::{Deserialize, Serialize};

/// The `preferences_data` object stored per (recruitment, user) and sent
/// verbatim by the client on PUT. Capitalized field names are fixed by the
/// client; do not rename.
///
/// Slot weights and shape weights live in [-5, 5]. The `[value, weight]`
/// pairs carry a slot index (or block count) plus a weight; weight 0 means
/// the pair is inert regardless of its value (the client disables the value
/// input in that case).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PreferencesData {
    #[serde(rename = "PreferredTimeslots")]
    pub preferred_timeslots: Vec<f32>,

    #[serde(rename = "FreeDays")]
    pub free_days: f32,
    #[serde(rename = "ShortDays")]
    pub short_days: f32,
    #[serde(rename = "UniformDays")]
    pub uniform_days: f32,
    #[serde(rename = "ConcentratedDays")]
    pub concentrated_days: f32,

    #[serde(rename = "MinGapsLength")]
    pub min_gaps_length: [f32; 2],
    #[serde(rename = "MaxGapsLength")]
    pub max_gaps_length: [f32; 2],
    #[serde(rename = "MinDayLength")]
    pub min_day_length: [f32; 2],
    #[serde(rename = "MaxDayLength")]
    pub max_day_length: [f32; 2],
    #[serde(rename = "PreferredDayStartTimeslot")]
    pub preferred_day_start_timeslot: [f32; 2],
    #[serde(rename = "PreferredDayEndTimeslot")]
    pub preferred_day_end_timeslot: [f32; 2],

    // Loose optional fields observed in stored payloads. Shape is not
    // pinned down by the client, so they pass through opaquely.
    #[serde(rename = "TagOrder", skip_serializing_if = "Option::is_none")]
    pub tag_order: Option<serde_json::Value>,
    #[serde(rename = "PreferredGroups", skip_serializing_if = "Option::is_none")]
    pub preferred_groups: Option<serde_json::Value>,
}

impl Default for PreferencesData {
    fn default() -> Self {
        Self {
            preferred_timeslots: Vec::new(),
            free_days: 0.0,
            short_days: 0.0,
            uniform_days: 0.0,
            concentrated_days: 0.0,
            min_gaps_length: [0.0, 0.0],
            max_gaps_length: [0.0, 0.0],
            min_day_length: [0.0, 0.0],
            max_day_length: [0.0, 0.0],
            preferred_day_start_timeslot: [0.0, 0.0],
            preferred_day_end_timeslot: [0.0, 0.0],
            tag_order: None,
            preferred_groups: None,
        }
    }
}

/// Envelope used by both GET responses and PUT request bodies.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserPreferencesBody {
    pub preferences_data: PreferencesData,
}
