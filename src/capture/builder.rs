use super::controller::CaptureController;
use super::device::{CaptureDevice, PreviewSink};
use crate::error::{PosecamError, Result};
use std::sync::Arc;

/// Builder for the capture controller
pub struct CaptureControllerBuilder {
    device: Option<Arc<dyn CaptureDevice>>,
    preview: Option<Arc<dyn PreviewSink>>,
}

impl CaptureControllerBuilder {
    pub fn new() -> Self {
        Self {
            device: None,
            preview: None,
        }
    }

    pub fn device(mut self, device: Arc<dyn CaptureDevice>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn preview(mut self, preview: Arc<dyn PreviewSink>) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn build(self) -> Result<CaptureController> {
        let device = self
            .device
            .ok_or_else(|| PosecamError::system("Capture device must be specified"))?;

        Ok(CaptureController::new(device, self.preview))
    }
}

impl Default for CaptureControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
