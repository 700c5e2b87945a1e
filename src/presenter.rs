use crate::analysis::AnalysisResult;
use crate::error::PresentError;
use crate::media::RECORDING_MIME_TYPE;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

/// Annotated video decoded from the engine's base64 payload
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedVideo {
    bytes: Bytes,
    encoded: String,
}

impl ProcessedVideo {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        RECORDING_MIME_TYPE
    }

    /// `data:` URI a video element can play directly
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", RECORDING_MIME_TYPE, self.encoded)
    }
}

/// One labelled joint angle, rounded only for display
#[derive(Debug, Clone, PartialEq)]
pub struct AngleReading {
    pub label: &'static str,
    pub degrees: f64,
}

impl AngleReading {
    pub fn formatted(&self) -> String {
        format_angle(self.degrees)
    }
}

/// Everything the result view shows
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub video: ProcessedVideo,
    pub angles: Vec<AngleReading>,
}

impl Presentation {
    /// "Average Upper Body Angle: 12.34°" style lines
    pub fn summary_lines(&self) -> Vec<String> {
        self.angles
            .iter()
            .map(|a| format!("Average {}: {}", a.label, a.formatted()))
            .collect()
    }
}

pub fn format_angle(degrees: f64) -> String {
    format!("{:.2}°", degrees)
}

/// Decode the processed video and label the three angle averages
pub fn present(result: &AnalysisResult) -> Result<Presentation, PresentError> {
    let decoded = STANDARD
        .decode(result.processed_video.as_bytes())
        .map_err(|e| PresentError::InvalidVideo {
            details: e.to_string(),
        })?;

    Ok(Presentation {
        video: ProcessedVideo {
            bytes: Bytes::from(decoded),
            encoded: result.processed_video.clone(),
        },
        angles: vec![
            AngleReading {
                label: "Upper Body Angle",
                degrees: result.avg_upper_body_angle,
            },
            AngleReading {
                label: "Back Leg Angle",
                degrees: result.avg_back_leg_angle,
            },
            AngleReading {
                label: "Front Leg Angle",
                degrees: result.avg_front_leg_angle,
            },
        ],
    })
}
