//! SortScope Visualization Server
//!
//! Serves the sort engine to browser clients.
//!
//! # Architecture
//!
//! - **Renderer**: publishes every engine frame on a broadcast channel
//! - **REST API**: start/stop/pause runs, regenerate or reset the sequence,
//!   set tempo
//! - **WebSocket**: streams frames to the frontend and accepts commands
//!
//! # Usage
//!
//! ```ignore
//! let server = VisServer::new(VisualizerConfig::default())?;
//! server.serve(3000).await?;
//! ```

mod render;
mod server;

pub use render::BroadcastRenderer;
pub use server::{ApiError, VisServer};
