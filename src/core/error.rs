// Copyright @yucwang 2026

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TurretError {
    #[error("index {index} out of range for {vertex_count} vertices")]
    OutOfRange { index: usize, vertex_count: usize },

    #[error("mismatched mesh buffers: {0}")]
    MismatchedBuffers(String),

    #[error("transform is not invertible")]
    SingularTransform,

    #[error("homogeneous w is zero, point is at infinity")]
    ZeroW,

    #[error("viewport has no area ({width}x{height})")]
    InvalidViewport { width: f32, height: f32 },
}

pub type Result<T> = std::result::Result<T, TurretError>;
