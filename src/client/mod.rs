// Client side of the gateway: HTTP client and user session
// Author: kelexine (https://github.com/kelexine)

mod gateway;
mod studio;

pub use gateway::{encode_image_file, GatewayClient};
pub use studio::Studio;
