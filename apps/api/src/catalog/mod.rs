// Catalog of maritime-career writing services and prompt rendering.
// Pure data + string handling; no I/O.

pub mod prompts;
pub mod render;
pub mod services;

pub use render::render_prompt;
pub use services::{find_service, Service, ServiceId, SERVICES};
