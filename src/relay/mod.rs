mod engine;
mod handlers;
mod server;
mod staging;

pub use engine::{EngineClient, ENGINE_UPLOAD_FILE_NAME};
pub use handlers::{analyze_pose_video_handler, health_handler, RELAY_FAILURE_MESSAGE};
pub use server::{RelayServer, RelayServerBuilder, RelayState};
pub use staging::{StagedFile, StagingArea, FIXED_STAGING_FILE_NAME};
