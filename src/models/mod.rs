// Data models module
// Author: kelexine (https://github.com/kelexine)

pub mod choices;
pub mod requests;
pub mod responses;

pub use choices::VideoQuality;
pub use requests::{parse_body, ImagePayload, ImageRequest, UpscaleRequest, VideoRequest};
pub use responses::{Envelope, HealthResponse, HealthStatus, ModelInfo, ModelsResponse};
