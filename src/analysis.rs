use serde::{Deserialize, Serialize};

/// Multipart field carrying the video, on both the relay and the engine
pub const VIDEO_FIELD: &str = "video";

/// File name the client attaches to its upload
pub const CLIENT_UPLOAD_FILE_NAME: &str = "video.mp4";

/// Path of the analysis endpoint on the relay and on the engine
pub const ANALYZE_PATH: &str = "/analyze-pose-video";

/// Result returned by the pose engine and relayed back to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Annotated video, base64 encoded
    pub processed_video: String,
    pub avg_upper_body_angle: f64,
    pub avg_back_leg_angle: f64,
    pub avg_front_leg_angle: f64,
}

/// Error body returned by the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Join a base URL and the analysis path without doubling slashes
pub fn analyze_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_uses_camel_case_wire_names() {
        let json = r#"{"processedVideo":"AAA=","avgUpperBodyAngle":12.34,"avgBackLegAngle":56.78,"avgFrontLegAngle":90.12}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.processed_video, "AAA=");
        assert_eq!(result.avg_upper_body_angle, 12.34);
        assert_eq!(result.avg_back_leg_angle, 56.78);
        assert_eq!(result.avg_front_leg_angle, 90.12);
    }

    #[test]
    fn test_analyze_url() {
        assert_eq!(
            analyze_url("http://localhost:5000"),
            "http://localhost:5000/analyze-pose-video"
        );
        assert_eq!(
            analyze_url("http://localhost:5000/"),
            "http://localhost:5000/analyze-pose-video"
        );
    }
}
