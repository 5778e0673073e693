//! Particle blending.

use serde::{Deserialize, Serialize};

/// How point sprites composite over the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard alpha blending (default).
    ///
    /// Relies on the back-to-front sort for correct overlap.
    #[default]
    Alpha,

    /// Additive blending.
    ///
    /// Overlapping sprites brighten each other; order independent, so the
    /// sort only matters for the mix of colours, not correctness.
    Additive,
}

impl BlendMode {
    pub fn to_wgpu(self) -> wgpu::BlendState {
        match self {
            BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }
}
