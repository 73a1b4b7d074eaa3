// Graphics backend seam.
//
// `RenderBackend` is the ordered set of operations the renderer sequences.
// Its signatures stay free of Vulkan types so the lifecycle state machine
// can be driven against a test double; the production implementation is
// `VulkanBackend`.

pub mod device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vulkan;

pub use vulkan::VulkanBackend;

use crate::error::Result;
use crate::renderer::{AppInfo, Shader};
use crate::window::RenderTarget;
use std::fmt;

/// Pixel dimensions of a surface or framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamps both dimensions into the inclusive `[min, max]` range
    /// reported by the surface capabilities.
    pub fn clamp(self, min: Extent, max: Extent) -> Extent {
        Extent {
            width: self.width.clamp(min.width, max.width),
            height: self.height.clamp(min.height, max.height),
        }
    }
}

/// The subset of surface capabilities the renderer needs for sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub min_extent: Extent,
    pub max_extent: Extent,
    pub min_image_count: u32,
    /// Zero means the surface imposes no upper bound.
    pub max_image_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Discrete,
    Integrated,
    Virtual,
    Cpu,
    Other,
}

/// What the selection policy gets to see about an enumerated adapter.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub kind: AdapterKind,
    pub has_graphics_queue: bool,
}

/// Pluggable scoring over enumerated adapters. An adapter without a
/// graphics queue is never eligible; a score of zero rejects the adapter;
/// ties keep the first candidate.
pub struct SelectionPolicy {
    score: Box<dyn Fn(&AdapterProfile) -> u32 + Send + Sync>,
}

impl SelectionPolicy {
    pub fn new(score: impl Fn(&AdapterProfile) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            score: Box::new(score),
        }
    }

    pub fn select(&self, profiles: &[AdapterProfile]) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (index, profile) in profiles.iter().enumerate() {
            if !profile.has_graphics_queue {
                continue;
            }
            let score = (self.score)(profile);
            if score == 0 {
                continue;
            }
            if best.map_or(true, |(_, held)| score > held) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::new(|profile| match profile.kind {
            AdapterKind::Discrete => 1000,
            AdapterKind::Integrated => 100,
            _ => 1,
        })
    }
}

impl fmt::Debug for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SelectionPolicy")
    }
}

/// Outcome of asking the swapchain for the next presentable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAcquire {
    Ready { index: u32, suboptimal: bool },
    OutOfDate,
}

/// Outcome of queueing an image for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    Suboptimal,
    OutOfDate,
}

/// The operations the renderer sequences, split into the construction tier
/// (lives for the renderer's whole lifetime) and the surface tier (lives
/// between `start` and `stop`). Destruction must mirror creation exactly;
/// the renderer calls the `destroy_*` operations in reverse order after
/// `wait_idle`.
pub trait RenderBackend {
    fn create_instance(&mut self, app: &AppInfo) -> Result<()>;
    fn enumerate_adapters(&mut self, policy: &SelectionPolicy) -> Result<AdapterProfile>;
    fn create_device(&mut self) -> Result<()>;

    fn create_surface(&mut self, target: &dyn RenderTarget) -> Result<SurfaceCapabilities>;
    /// Re-queries the capabilities of the existing surface (used when the
    /// swapchain has gone stale and must be rebuilt at a new size).
    fn surface_capabilities(&mut self) -> Result<SurfaceCapabilities>;
    /// Returns the number of swapchain images actually created.
    fn create_swapchain(&mut self, extent: Extent, vsync: bool) -> Result<usize>;
    fn create_image_views(&mut self) -> Result<()>;
    fn create_shader_modules(&mut self, shaders: &[Shader]) -> Result<()>;
    fn create_pipeline(&mut self, extent: Extent) -> Result<()>;
    fn create_framebuffers(&mut self, extent: Extent) -> Result<()>;
    fn create_command_pool(&mut self) -> Result<()>;
    fn create_command_buffers(&mut self) -> Result<()>;
    fn record_commands(&mut self, extent: Extent, clear_color: [f32; 4]) -> Result<()>;
    fn create_semaphores(&mut self) -> Result<()>;

    fn destroy_semaphores(&mut self);
    fn destroy_command_buffers(&mut self);
    fn destroy_command_pool(&mut self);
    fn destroy_framebuffers(&mut self);
    fn destroy_pipeline(&mut self);
    fn destroy_shader_modules(&mut self);
    fn destroy_image_views(&mut self);
    fn destroy_swapchain(&mut self);
    fn destroy_surface(&mut self);

    /// Blocks until the device has finished all in-flight work.
    fn wait_idle(&mut self);

    fn acquire_image(&mut self) -> Result<ImageAcquire>;
    fn submit(&mut self, image_index: u32) -> Result<()>;
    fn present(&mut self, image_index: u32) -> Result<PresentOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_clamps_into_capability_bounds() {
        let min = Extent::new(16, 16);
        let max = Extent::new(1024, 768);
        assert_eq!(Extent::new(4000, 4000).clamp(min, max), max);
        assert_eq!(Extent::new(1, 1).clamp(min, max), min);
        assert_eq!(Extent::new(800, 600).clamp(min, max), Extent::new(800, 600));
        assert_eq!(Extent::new(4000, 1).clamp(min, max), Extent::new(1024, 16));
    }

    fn profile(name: &str, kind: AdapterKind, graphics: bool) -> AdapterProfile {
        AdapterProfile {
            name: name.to_owned(),
            kind,
            has_graphics_queue: graphics,
        }
    }

    #[test]
    fn default_policy_prefers_discrete_adapters() {
        let policy = SelectionPolicy::default();
        let profiles = [
            profile("igpu", AdapterKind::Integrated, true),
            profile("dgpu", AdapterKind::Discrete, true),
        ];
        assert_eq!(policy.select(&profiles), Some(1));
    }

    #[test]
    fn adapters_without_graphics_queues_are_never_selected() {
        let policy = SelectionPolicy::default();
        let profiles = [
            profile("dgpu", AdapterKind::Discrete, false),
            profile("cpu", AdapterKind::Cpu, true),
        ];
        assert_eq!(policy.select(&profiles), Some(1));
        assert_eq!(
            policy.select(&[profile("dgpu", AdapterKind::Discrete, false)]),
            None
        );
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let policy = SelectionPolicy::default();
        let profiles = [
            profile("first", AdapterKind::Integrated, true),
            profile("second", AdapterKind::Integrated, true),
        ];
        assert_eq!(policy.select(&profiles), Some(0));
    }
}
