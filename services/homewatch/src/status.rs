//! Response validation and status message formatting

use serde_json::Value;

use crate::error::WatchError;

/// Message sent when the API reports no homework updates
pub const NO_NEW_STATUSES: &str = "Нет новых статусов домашних работ.";

/// A structurally validated API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub homeworks: Vec<Value>,
    pub current_date: i64,
}

/// Look up the human-readable verdict for a known review status
fn verdict_text(status: &str) -> Option<&'static str> {
    match status {
        "approved" => Some("Работа проверена: ревьюеру всё понравилось. Ура!"),
        "reviewing" => Some("Работа взята на проверку ревьюером."),
        "rejected" => Some("Работа проверена: у ревьюера есть замечания."),
        _ => None,
    }
}

/// Validate the structural contract of a raw API response.
///
/// Checks run in a fixed order and stop at the first violation, so the
/// reported problem always names the outermost broken invariant.
pub fn check_response(raw: &Value) -> crate::Result<ApiResponse> {
    let object = raw
        .as_object()
        .ok_or_else(|| WatchError::Shape("response must be a JSON object".to_string()))?;

    let homeworks = object
        .get("homeworks")
        .ok_or(WatchError::MissingField("homeworks"))?;
    let homeworks = homeworks
        .as_array()
        .ok_or_else(|| WatchError::Shape("`homeworks` must be an array".to_string()))?;

    let current_date = object
        .get("current_date")
        .ok_or(WatchError::MissingField("current_date"))?;
    let current_date = current_date
        .as_i64()
        .ok_or_else(|| WatchError::Shape("`current_date` must be an integer".to_string()))?;

    Ok(ApiResponse {
        homeworks: homeworks.clone(),
        current_date,
    })
}

/// Map a single homework record to its notification text.
///
/// Key existence is checked before any value is read so a failure always
/// names the missing key rather than tripping over a lookup.
pub fn parse_status(homework: &Value) -> crate::Result<String> {
    let name = homework
        .get("homework_name")
        .ok_or(WatchError::MissingField("homework_name"))?;
    let status = homework
        .get("status")
        .ok_or(WatchError::MissingField("status"))?;

    let status = status
        .as_str()
        .ok_or_else(|| WatchError::Shape("`status` must be a string".to_string()))?;
    let verdict =
        verdict_text(status).ok_or_else(|| WatchError::UnknownStatus(status.to_string()))?;
    let name = name
        .as_str()
        .ok_or_else(|| WatchError::Shape("`homework_name` must be a string".to_string()))?;

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name, verdict
    ))
}
