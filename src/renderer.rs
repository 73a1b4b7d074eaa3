// Renderer lifecycle state machine and per-frame submission.
//
// Two nested phases: the construction tier (instance, adapter, device) is
// built once in `new` and lives until drop; the surface tier (surface
// through semaphores) exists only between `start` and `stop`. Inside the
// started phase the swapchain is either valid or stale; staleness is
// entered from a resize or a suboptimal/out-of-date presentation result
// and exited by rebuilding the surface tier below the surface at the new
// framebuffer size.

use crate::backend::{
    Extent, ImageAcquire, PresentOutcome, RenderBackend, SelectionPolicy, VulkanBackend,
};
use crate::error::{Error, Result};
use crate::logger::{Actor, Level, Logger};
use crate::window::{Platform, RenderTarget};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// A loaded shader binary, immutable once registered.
#[derive(Debug, Clone)]
pub struct Shader {
    stage: ShaderStage,
    bytes: Vec<u8>,
}

impl Shader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Packs the version the way `VK_MAKE_API_VERSION` does (variant 0).
    pub fn as_vulkan(self) -> u32 {
        (self.major << 22) | (self.minor << 12) | self.patch
    }
}

/// Immutable identification baked into the graphics instance.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub app_name: String,
    pub app_version: Version,
    pub engine_name: String,
    pub engine_version: Version,
}

#[derive(Debug)]
pub struct RendererSettings {
    pub vsync: bool,
    pub clear_color: [f32; 4],
    pub validation: bool,
    pub adapter_policy: SelectionPolicy,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            validation: cfg!(debug_assertions),
            adapter_policy: SelectionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwapchainHealth {
    Valid,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Constructed,
    Started(SwapchainHealth),
}

pub struct Renderer<B: RenderBackend = VulkanBackend> {
    id: u64,
    name: String,
    info: AppInfo,
    settings: RendererSettings,
    extent: Extent,
    shaders: Vec<Shader>,
    logger: Arc<Logger>,
    backend: B,
    phase: Phase,
}

impl Renderer<VulkanBackend> {
    /// Builds a renderer over the real Vulkan backend. The platform supplies
    /// the display handle the instance extensions are chosen from.
    pub fn vulkan(
        settings: RendererSettings,
        info: AppInfo,
        id: u64,
        logger: Arc<Logger>,
        platform: &Platform,
    ) -> Result<Self> {
        let backend = VulkanBackend::new(
            platform.raw_display_handle()?,
            settings.validation,
            logger.clone(),
            format!("renderer_{id}"),
        );
        Self::new(settings, info, id, logger, backend)
    }
}

impl<B: RenderBackend> Renderer<B> {
    /// Creates the renderer and its construction-tier resources: instance,
    /// adapter selection, logical device. Irreversible until drop.
    pub fn new(
        settings: RendererSettings,
        info: AppInfo,
        id: u64,
        logger: Arc<Logger>,
        mut backend: B,
    ) -> Result<Self> {
        let name = format!("renderer_{id}");

        logger.nlog(Level::Info, Actor::Core, &name, "initialisation");

        logger.nlog(Level::Trace, Actor::Core, &name, "vulkan: instance creation");
        backend.create_instance(&info)?;

        logger.nlog(
            Level::Trace,
            Actor::Core,
            &name,
            "vulkan: physical device enumeration",
        );
        let adapter = backend.enumerate_adapters(&settings.adapter_policy)?;
        logger.nlog(
            Level::Info,
            Actor::Core,
            &name,
            &format!("vulkan: selected adapter {}", adapter.name),
        );

        logger.nlog(Level::Trace, Actor::Core, &name, "vulkan: device creation");
        backend.create_device()?;

        Ok(Self {
            id,
            name,
            info,
            settings,
            extent: Extent::new(0, 0),
            shaders: Vec::new(),
            logger,
            backend,
            phase: Phase::Constructed,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn app_info(&self) -> &AppInfo {
        &self.info
    }

    pub fn is_started(&self) -> bool {
        matches!(self.phase, Phase::Started(_))
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Current clamped framebuffer extent, zero before the first `start`.
    pub fn size(&self) -> (u32, u32) {
        (self.extent.width, self.extent.height)
    }

    /// Reads a shader binary from disk and registers it. Only legal while
    /// the renderer is not started; the collection stays untouched on any
    /// failure.
    pub fn load_shader(&mut self, stage: ShaderStage, path: impl AsRef<Path>) -> Result<()> {
        if self.is_started() {
            return Err(Error::logic(
                "failed to load shader: renderer must not be started",
            ));
        }

        let path = path.as_ref();
        self.trace(&format!(
            "loading shader_{} at {}",
            self.shaders.len(),
            path.display()
        ));

        let resource = |e| Error::Resource {
            what: format!("shader {}", path.display()),
            source: e,
        };

        let mut file = File::open(path).map_err(resource)?;
        let size = file.metadata().map_err(resource)?.len();
        let mut bytes = Vec::with_capacity(size as usize);
        file.read_to_end(&mut bytes).map_err(resource)?;
        // The handle is closed here; the loaded bytes stay valid on their own.
        drop(file);

        self.shaders.push(Shader { stage, bytes });
        self.debug(&format!(
            "successfully loaded shader_{}",
            self.shaders.len() - 1
        ));
        Ok(())
    }

    /// Builds the surface-tier resources against `target` in strict
    /// dependency order. A second call while started is a silent no-op.
    pub fn start(&mut self, target: &dyn RenderTarget) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }

        if !target.is_open() {
            return Err(Error::logic(
                "failed to start renderer: window is not opened",
            ));
        }

        let has_vertex = self
            .shaders
            .iter()
            .any(|s| s.stage() == ShaderStage::Vertex);
        let has_fragment = self
            .shaders
            .iter()
            .any(|s| s.stage() == ShaderStage::Fragment);
        if !has_vertex || !has_fragment {
            self.error("vulkan: required shader missing");
            return Err(Error::logic(
                "failed to start renderer: a vertex and a fragment shader must be loaded",
            ));
        }

        self.trace("vulkan: surface creation");
        let caps = self.backend.create_surface(target)?;

        let (width, height) = target.framebuffer_size();
        self.extent = Extent::new(width, height).clamp(caps.min_extent, caps.max_extent);
        self.trace(&format!(
            "vulkan: image extent is {}x{}",
            self.extent.width, self.extent.height
        ));

        self.trace("vulkan: swapchain creation");
        self.backend
            .create_swapchain(self.extent, self.settings.vsync)?;

        self.trace("vulkan: imageviews creation");
        self.backend.create_image_views()?;

        self.trace("vulkan: shader creation");
        self.backend.create_shader_modules(&self.shaders)?;

        self.trace("vulkan: pipeline creation");
        self.backend.create_pipeline(self.extent)?;

        self.trace("vulkan: framebuffer creation");
        self.backend.create_framebuffers(self.extent)?;

        self.trace("vulkan: commandpool creation");
        self.backend.create_command_pool()?;

        self.trace("vulkan: commandbuffer creation");
        self.backend.create_command_buffers()?;

        self.trace("vulkan: commandbuffer recording");
        self.backend
            .record_commands(self.extent, self.settings.clear_color)?;

        self.trace("vulkan: semaphore creation");
        self.backend.create_semaphores()?;

        self.phase = Phase::Started(SwapchainHealth::Valid);
        Ok(())
    }

    /// Destroys the surface-tier resources in exact reverse creation order,
    /// after a full device idle wait. A call while not started is a silent
    /// no-op.
    pub fn stop(&mut self) {
        if !self.is_started() {
            return;
        }

        self.backend.wait_idle();

        self.trace("vulkan: semaphore destruction");
        self.backend.destroy_semaphores();

        self.trace("vulkan: commandbuffer destruction");
        self.backend.destroy_command_buffers();

        self.trace("vulkan: commandpool destruction");
        self.backend.destroy_command_pool();

        self.trace("vulkan: framebuffer destruction");
        self.backend.destroy_framebuffers();

        self.trace("vulkan: pipeline destruction");
        self.backend.destroy_pipeline();

        self.trace("vulkan: shader destruction");
        self.backend.destroy_shader_modules();

        self.trace("vulkan: imageviews destruction");
        self.backend.destroy_image_views();

        self.trace("vulkan: swapchain destruction");
        self.backend.destroy_swapchain();

        self.trace("vulkan: surface destruction");
        self.backend.destroy_surface();

        self.phase = Phase::Constructed;
    }

    /// Records a new framebuffer size. While started this marks the
    /// swapchain stale; the next `update` rebuilds at the recorded size.
    /// Zero-sized framebuffers (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            self.debug("ignoring zero-sized resize");
            return;
        }

        self.extent = Extent::new(width, height);
        if self.is_started() {
            self.phase = Phase::Started(SwapchainHealth::Stale);
            self.trace("vulkan: swapchain marked stale");
        }
    }

    /// Advances one frame: acquire, submit the pre-recorded commands,
    /// present. Returns whether an image was presented; an out-of-date
    /// swapchain skips the frame and is rebuilt on the next call.
    pub fn update(&mut self) -> Result<bool> {
        let health = match self.phase {
            Phase::Constructed => {
                return Err(Error::logic("failed to draw frame: renderer is not started"))
            }
            Phase::Started(health) => health,
        };

        if health == SwapchainHealth::Stale {
            self.rebuild_swapchain()?;
        }

        let (index, suboptimal) = match self.backend.acquire_image()? {
            ImageAcquire::OutOfDate => {
                self.mark_stale();
                return Ok(false);
            }
            ImageAcquire::Ready { index, suboptimal } => (index, suboptimal),
        };
        if suboptimal {
            self.mark_stale();
        }

        self.backend.submit(index)?;

        match self.backend.present(index)? {
            PresentOutcome::Presented => {}
            PresentOutcome::Suboptimal | PresentOutcome::OutOfDate => self.mark_stale(),
        }

        Ok(true)
    }

    /// Tears the started tier down to (but not including) the surface and
    /// rebuilds it against freshly queried capabilities at the recorded
    /// size. Instance- and device-tier state is untouched.
    fn rebuild_swapchain(&mut self) -> Result<()> {
        self.trace("vulkan: swapchain rebuild");

        self.backend.wait_idle();
        self.backend.destroy_semaphores();
        self.backend.destroy_command_buffers();
        self.backend.destroy_command_pool();
        self.backend.destroy_framebuffers();
        self.backend.destroy_pipeline();
        self.backend.destroy_shader_modules();
        self.backend.destroy_image_views();
        self.backend.destroy_swapchain();

        let caps = self.backend.surface_capabilities()?;
        self.extent = self.extent.clamp(caps.min_extent, caps.max_extent);
        self.trace(&format!(
            "vulkan: image extent is {}x{}",
            self.extent.width, self.extent.height
        ));

        self.backend
            .create_swapchain(self.extent, self.settings.vsync)?;
        self.backend.create_image_views()?;
        self.backend.create_shader_modules(&self.shaders)?;
        self.backend.create_pipeline(self.extent)?;
        self.backend.create_framebuffers(self.extent)?;
        self.backend.create_command_pool()?;
        self.backend.create_command_buffers()?;
        self.backend
            .record_commands(self.extent, self.settings.clear_color)?;
        self.backend.create_semaphores()?;

        self.phase = Phase::Started(SwapchainHealth::Valid);
        Ok(())
    }

    fn mark_stale(&mut self) {
        if self.is_started() {
            self.phase = Phase::Started(SwapchainHealth::Stale);
        }
    }

    fn trace(&self, message: &str) {
        self.logger
            .nlog(Level::Trace, Actor::Core, &self.name, message);
    }

    fn debug(&self, message: &str) {
        self.logger
            .nlog(Level::Debug, Actor::Core, &self.name, message);
    }

    fn error(&self, message: &str) {
        self.logger
            .nlog(Level::Error, Actor::Core, &self.name, message);
    }
}

impl<B: RenderBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_packs_like_vulkan() {
        assert_eq!(Version::new(0, 0, 0).as_vulkan(), 0);
        assert_eq!(Version::new(1, 2, 3).as_vulkan(), (1 << 22) | (2 << 12) | 3);
    }
}
