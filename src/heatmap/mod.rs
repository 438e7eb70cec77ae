//! Client side of the heatmap file-transfer protocol
//!
//! The heatmap generator is a separate service reached over raw TCP. Every
//! exchange starts with a fixed-size, space-padded text header; payloads
//! follow as raw bytes.

pub mod client;
pub mod protocol;

// Re-export commonly used types
pub use client::{HeatmapClient, TcpHeatmapClient};
pub use protocol::{FrameHeader, StatusReply, HEADER_SIZE, SEPARATOR};
