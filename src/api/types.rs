use serde::Serialize;

/// Envelope for endpoints that report `success`.
///
/// The payload is flattened next to the flag, so `ApiResponse::success(LoginBody {..})`
/// serializes as `{"success": true, "token": .., "user": ..}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure text again under the key browser clients read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: None,
            error: Some(message.clone()),
            message: Some(message),
        }
    }
}

/// Flattens to nothing: `{"success": true}`.
#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VersionBody {
    pub version: i64,
}
