// Vulkan implementation of the backend seam.
//
// Handles are grouped by tier: instance/adapter/device blocks exist for the
// backend's whole lifetime once created, everything below them only between
// the renderer's `start` and `stop`. Every result code passes through
// `check` (logs the call, fails with the symbolic result name) or
// `check_quiet` (same failure path, success log suppressed for the
// per-frame calls).

use super::{
    device, pipeline, shader, swapchain, sync::FrameSemaphores, AdapterProfile, Extent,
    ImageAcquire, PresentOutcome, RenderBackend, SelectionPolicy, SurfaceCapabilities,
};
use crate::error::{Error, Result};
use crate::logger::{Actor, Level, Logger};
use crate::renderer::{AppInfo, Shader};
use crate::window::RenderTarget;
use ash::extensions::khr;
use ash::prelude::VkResult;
use ash::{vk, Entry};
use raw_window_handle::RawDisplayHandle;
use std::sync::Arc;

struct InstanceBlock {
    entry: Entry,
    instance: ash::Instance,
    surface_loader: khr::Surface,
}

struct AdapterBlock {
    devices: Vec<vk::PhysicalDevice>,
    queue_families: Vec<Option<u32>>,
    index: usize,
}

impl AdapterBlock {
    fn physical(&self) -> vk::PhysicalDevice {
        self.devices[self.index]
    }

    fn queue_family(&self) -> u32 {
        // The selection policy only ever picks adapters with a graphics
        // queue family.
        self.queue_families[self.index].expect("selected adapter has a graphics queue")
    }
}

struct DeviceBlock {
    device: ash::Device,
    queue: vk::Queue,
    swapchain_loader: khr::Swapchain,
}

struct SurfaceBlock {
    surface: vk::SurfaceKHR,
    format: vk::SurfaceFormatKHR,
    present_modes: Vec<vk::PresentModeKHR>,
}

struct SwapchainBlock {
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
}

struct PipelineBlock {
    layout: vk::PipelineLayout,
    render_pass: vk::RenderPass,
    pipeline: vk::Pipeline,
}

pub struct VulkanBackend {
    logger: Arc<Logger>,
    name: String,
    display: RawDisplayHandle,
    validation: bool,

    instance: Option<InstanceBlock>,
    adapters: Option<AdapterBlock>,
    device: Option<DeviceBlock>,

    surface: Option<SurfaceBlock>,
    swapchain: Option<SwapchainBlock>,
    image_views: Vec<vk::ImageView>,
    shader_modules: Vec<(vk::ShaderModule, vk::ShaderStageFlags)>,
    pipeline: Option<PipelineBlock>,
    framebuffers: Vec<vk::Framebuffer>,
    command_pool: Option<vk::CommandPool>,
    command_buffers: Vec<vk::CommandBuffer>,
    semaphores: Option<FrameSemaphores>,
}

fn missing(what: &'static str) -> Error {
    Error::Logic(format!("vulkan: {what} not created"))
}

fn caps_from(caps: &vk::SurfaceCapabilitiesKHR) -> SurfaceCapabilities {
    SurfaceCapabilities {
        min_extent: Extent::new(caps.min_image_extent.width, caps.min_image_extent.height),
        max_extent: Extent::new(caps.max_image_extent.width, caps.max_image_extent.height),
        min_image_count: caps.min_image_count,
        max_image_count: caps.max_image_count,
    }
}

impl VulkanBackend {
    /// `display` is the window system's display handle, needed to pick the
    /// platform surface extensions before any window exists.
    pub fn new(
        display: RawDisplayHandle,
        validation: bool,
        logger: Arc<Logger>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            logger,
            name: name.into(),
            display,
            validation,
            instance: None,
            adapters: None,
            device: None,
            surface: None,
            swapchain: None,
            image_views: Vec::new(),
            shader_modules: Vec::new(),
            pipeline: None,
            framebuffers: Vec::new(),
            command_pool: None,
            command_buffers: Vec::new(),
            semaphores: None,
        }
    }

    #[track_caller]
    fn check<T>(&self, call: &'static str, result: VkResult<T>) -> Result<T> {
        self.check_result(call, result, false)
    }

    #[track_caller]
    fn check_quiet<T>(&self, call: &'static str, result: VkResult<T>) -> Result<T> {
        self.check_result(call, result, true)
    }

    #[track_caller]
    fn check_result<T>(&self, call: &'static str, result: VkResult<T>, quiet: bool) -> Result<T> {
        match result {
            Ok(value) => {
                if !quiet {
                    self.debug(&format!("vulkan: {call} succeeded"));
                }
                Ok(value)
            }
            Err(code) => {
                let site = std::panic::Location::caller();
                self.logger.nlog(
                    Level::Error,
                    Actor::Core,
                    &self.name,
                    &format!(
                        "vulkan: {call} failed with {code} at {}:{}",
                        site.file(),
                        site.line()
                    ),
                );
                Err(Error::Graphics {
                    call,
                    result: code.to_string(),
                })
            }
        }
    }

    fn debug(&self, message: &str) {
        self.logger
            .nlog(Level::Debug, Actor::Core, &self.name, message);
    }
}

impl RenderBackend for VulkanBackend {
    fn create_instance(&mut self, app: &AppInfo) -> Result<()> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| Error::Platform(format!("failed to load the vulkan library: {e}")))?;

        let instance = self.check(
            "vkCreateInstance",
            device::create_instance(&entry, app, self.display, self.validation),
        )?;

        let surface_loader = khr::Surface::new(&entry, &instance);
        self.instance = Some(InstanceBlock {
            entry,
            instance,
            surface_loader,
        });
        Ok(())
    }

    fn enumerate_adapters(&mut self, policy: &SelectionPolicy) -> Result<AdapterProfile> {
        let instance = self.instance.as_ref().ok_or_else(|| missing("instance"))?;

        let set = self.check(
            "vkEnumeratePhysicalDevices",
            device::enumerate_adapters(&instance.instance),
        )?;
        if set.devices.is_empty() {
            return Err(Error::logic("no vulkan-capable adapter present"));
        }

        let index = policy
            .select(&set.profiles)
            .ok_or_else(|| Error::logic("no enumerated adapter satisfies the selection policy"))?;
        let profile = set.profiles[index].clone();

        self.adapters = Some(AdapterBlock {
            devices: set.devices,
            queue_families: set.queue_families,
            index,
        });
        Ok(profile)
    }

    fn create_device(&mut self) -> Result<()> {
        let instance = self.instance.as_ref().ok_or_else(|| missing("instance"))?;
        let adapters = self.adapters.as_ref().ok_or_else(|| missing("adapter"))?;

        let (logical, queue) = self.check(
            "vkCreateDevice",
            device::create_logical_device(
                &instance.instance,
                adapters.physical(),
                adapters.queue_family(),
            ),
        )?;

        let swapchain_loader = khr::Swapchain::new(&instance.instance, &logical);
        self.device = Some(DeviceBlock {
            device: logical,
            queue,
            swapchain_loader,
        });
        Ok(())
    }

    fn create_surface(&mut self, target: &dyn RenderTarget) -> Result<SurfaceCapabilities> {
        let instance = self.instance.as_ref().ok_or_else(|| missing("instance"))?;
        let adapters = self.adapters.as_ref().ok_or_else(|| missing("adapter"))?;

        let handle = target
            .surface_handle()
            .ok_or_else(|| Error::logic("render target has no native window"))?;
        let display = handle
            .display_handle()
            .map_err(|e| Error::Platform(e.to_string()))?
            .as_raw();
        let window = handle
            .window_handle()
            .map_err(|e| Error::Platform(e.to_string()))?
            .as_raw();

        let surface = self.check(
            "vkCreateSurfaceKHR",
            device::create_surface(&instance.entry, &instance.instance, display, window),
        )?;

        let physical = adapters.physical();
        let loader = &instance.surface_loader;

        let supported = self.check("vkGetPhysicalDeviceSurfaceSupportKHR", unsafe {
            loader.get_physical_device_surface_support(physical, adapters.queue_family(), surface)
        })?;
        if !supported {
            unsafe { loader.destroy_surface(surface, None) };
            return Err(Error::logic(
                "selected adapter cannot present to this surface",
            ));
        }

        let caps = self.check("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", unsafe {
            loader.get_physical_device_surface_capabilities(physical, surface)
        })?;

        let formats = self.check("vkGetPhysicalDeviceSurfaceFormatsKHR", unsafe {
            loader.get_physical_device_surface_formats(physical, surface)
        })?;
        let format = self.check("vkGetPhysicalDeviceSurfaceFormatsKHR", {
            swapchain::choose_format(&formats)
        })?;

        let present_modes = self.check("vkGetPhysicalDeviceSurfacePresentModesKHR", unsafe {
            loader.get_physical_device_surface_present_modes(physical, surface)
        })?;

        self.surface = Some(SurfaceBlock {
            surface,
            format,
            present_modes,
        });
        Ok(caps_from(&caps))
    }

    fn surface_capabilities(&mut self) -> Result<SurfaceCapabilities> {
        let instance = self.instance.as_ref().ok_or_else(|| missing("instance"))?;
        let adapters = self.adapters.as_ref().ok_or_else(|| missing("adapter"))?;
        let surface = self.surface.as_ref().ok_or_else(|| missing("surface"))?;

        let caps = self.check_quiet("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", unsafe {
            instance
                .surface_loader
                .get_physical_device_surface_capabilities(adapters.physical(), surface.surface)
        })?;
        Ok(caps_from(&caps))
    }

    fn create_swapchain(&mut self, extent: Extent, vsync: bool) -> Result<usize> {
        let instance = self.instance.as_ref().ok_or_else(|| missing("instance"))?;
        let adapters = self.adapters.as_ref().ok_or_else(|| missing("adapter"))?;
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let surface = self.surface.as_ref().ok_or_else(|| missing("surface"))?;

        let caps = self.check("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", unsafe {
            instance
                .surface_loader
                .get_physical_device_surface_capabilities(adapters.physical(), surface.surface)
        })?;

        let present_mode = swapchain::choose_present_mode(&surface.present_modes, vsync);
        self.debug(&format!("vulkan: present mode is {present_mode:?}"));

        let chain = self.check(
            "vkCreateSwapchainKHR",
            swapchain::create_swapchain(
                &device.swapchain_loader,
                surface.surface,
                &caps,
                surface.format,
                present_mode,
                extent,
            ),
        )?;

        let images = self.check("vkGetSwapchainImagesKHR", unsafe {
            device.swapchain_loader.get_swapchain_images(chain)
        })?;
        let count = images.len();

        self.swapchain = Some(SwapchainBlock {
            swapchain: chain,
            images,
        });
        Ok(count)
    }

    fn create_image_views(&mut self) -> Result<()> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let surface = self.surface.as_ref().ok_or_else(|| missing("surface"))?;
        let chain = self.swapchain.as_ref().ok_or_else(|| missing("swapchain"))?;

        let mut views = Vec::with_capacity(chain.images.len());
        for &image in &chain.images {
            let view = self.check(
                "vkCreateImageView",
                swapchain::create_image_view(&device.device, image, surface.format.format),
            )?;
            views.push(view);
        }

        self.image_views = views;
        Ok(())
    }

    fn create_shader_modules(&mut self, shaders: &[Shader]) -> Result<()> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;

        let mut modules = Vec::with_capacity(shaders.len());
        for entry in shaders {
            let module = self.check(
                "vkCreateShaderModule",
                shader::create_shader_module(&device.device, entry.bytes()),
            )?;
            modules.push((module, shader::stage_flags(entry.stage())));
        }

        self.shader_modules = modules;
        Ok(())
    }

    fn create_pipeline(&mut self, extent: Extent) -> Result<()> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let surface = self.surface.as_ref().ok_or_else(|| missing("surface"))?;

        let layout = self.check(
            "vkCreatePipelineLayout",
            pipeline::create_pipeline_layout(&device.device),
        )?;
        let render_pass = self.check(
            "vkCreateRenderPass",
            pipeline::create_render_pass(&device.device, surface.format.format),
        )?;
        let handle = self.check(
            "vkCreateGraphicsPipelines",
            pipeline::create_graphics_pipeline(
                &device.device,
                layout,
                render_pass,
                &self.shader_modules,
                extent,
            ),
        )?;

        self.pipeline = Some(PipelineBlock {
            layout,
            render_pass,
            pipeline: handle,
        });
        Ok(())
    }

    fn create_framebuffers(&mut self, extent: Extent) -> Result<()> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let block = self.pipeline.as_ref().ok_or_else(|| missing("pipeline"))?;

        let mut framebuffers = Vec::with_capacity(self.image_views.len());
        for &view in &self.image_views {
            let framebuffer = self.check(
                "vkCreateFramebuffer",
                pipeline::create_framebuffer(&device.device, block.render_pass, view, extent),
            )?;
            framebuffers.push(framebuffer);
        }

        self.framebuffers = framebuffers;
        Ok(())
    }

    fn create_command_pool(&mut self) -> Result<()> {
        let adapters = self.adapters.as_ref().ok_or_else(|| missing("adapter"))?;
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;

        let pool_info =
            vk::CommandPoolCreateInfo::builder().queue_family_index(adapters.queue_family());
        let pool = self.check("vkCreateCommandPool", unsafe {
            device.device.create_command_pool(&pool_info, None)
        })?;

        self.command_pool = Some(pool);
        Ok(())
    }

    fn create_command_buffers(&mut self) -> Result<()> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let chain = self.swapchain.as_ref().ok_or_else(|| missing("swapchain"))?;
        let pool = self.command_pool.ok_or_else(|| missing("command pool"))?;

        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(chain.images.len() as u32);

        let buffers = self.check("vkAllocateCommandBuffers", unsafe {
            device.device.allocate_command_buffers(&alloc_info)
        })?;

        self.command_buffers = buffers;
        Ok(())
    }

    fn record_commands(&mut self, extent: Extent, clear_color: [f32; 4]) -> Result<()> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let block = self.pipeline.as_ref().ok_or_else(|| missing("pipeline"))?;

        // Recorded once with SIMULTANEOUS_USE so the same buffers replay
        // every frame without re-recording.
        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::SIMULTANEOUS_USE);

        let clear_values = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: clear_color,
            },
        }];

        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: vk::Extent2D {
                width: extent.width,
                height: extent.height,
            },
        };

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = render_area;

        for (i, &cmd) in self.command_buffers.iter().enumerate() {
            self.check("vkBeginCommandBuffer", unsafe {
                device.device.begin_command_buffer(cmd, &begin_info)
            })?;

            let render_pass_begin = vk::RenderPassBeginInfo::builder()
                .render_pass(block.render_pass)
                .framebuffer(self.framebuffers[i])
                .render_area(render_area)
                .clear_values(&clear_values);

            unsafe {
                device.device.cmd_begin_render_pass(
                    cmd,
                    &render_pass_begin,
                    vk::SubpassContents::INLINE,
                );
                device.device.cmd_bind_pipeline(
                    cmd,
                    vk::PipelineBindPoint::GRAPHICS,
                    block.pipeline,
                );
                device.device.cmd_set_viewport(cmd, 0, &[viewport]);
                device.device.cmd_set_scissor(cmd, 0, &[scissor]);
                // Three vertices, one instance, no vertex buffers: the
                // triangle is generated in the vertex shader.
                device.device.cmd_draw(cmd, 3, 1, 0, 0);
                device.device.cmd_end_render_pass(cmd);
            }

            self.check("vkEndCommandBuffer", unsafe {
                device.device.end_command_buffer(cmd)
            })?;
        }

        Ok(())
    }

    fn create_semaphores(&mut self) -> Result<()> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;

        let semaphores = self.check("vkCreateSemaphore", FrameSemaphores::new(&device.device))?;
        self.semaphores = Some(semaphores);
        Ok(())
    }

    fn destroy_semaphores(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if let Some(semaphores) = self.semaphores.take() {
            semaphores.destroy(&device.device);
            self.logger.nlog(
                Level::Debug,
                Actor::Core,
                &self.name,
                "vulkan: vkDestroySemaphore",
            );
        }
    }

    fn destroy_command_buffers(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if let (Some(pool), false) = (self.command_pool, self.command_buffers.is_empty()) {
            unsafe {
                device
                    .device
                    .free_command_buffers(pool, &self.command_buffers)
            };
            self.command_buffers.clear();
            self.logger.nlog(
                Level::Debug,
                Actor::Core,
                &self.name,
                "vulkan: vkFreeCommandBuffers",
            );
        }
    }

    fn destroy_command_pool(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if let Some(pool) = self.command_pool.take() {
            unsafe { device.device.destroy_command_pool(pool, None) };
            self.logger.nlog(
                Level::Debug,
                Actor::Core,
                &self.name,
                "vulkan: vkDestroyCommandPool",
            );
        }
    }

    fn destroy_framebuffers(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if self.framebuffers.is_empty() {
            return;
        }
        for framebuffer in self.framebuffers.drain(..) {
            unsafe { device.device.destroy_framebuffer(framebuffer, None) };
        }
        self.logger.nlog(
            Level::Debug,
            Actor::Core,
            &self.name,
            "vulkan: vkDestroyFramebuffer",
        );
    }

    fn destroy_pipeline(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if let Some(block) = self.pipeline.take() {
            unsafe {
                device.device.destroy_pipeline(block.pipeline, None);
                device.device.destroy_render_pass(block.render_pass, None);
                device.device.destroy_pipeline_layout(block.layout, None);
            }
            self.logger.nlog(
                Level::Debug,
                Actor::Core,
                &self.name,
                "vulkan: vkDestroyPipeline",
            );
        }
    }

    fn destroy_shader_modules(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if self.shader_modules.is_empty() {
            return;
        }
        for (module, _) in self.shader_modules.drain(..) {
            unsafe { device.device.destroy_shader_module(module, None) };
        }
        self.logger.nlog(
            Level::Debug,
            Actor::Core,
            &self.name,
            "vulkan: vkDestroyShaderModule",
        );
    }

    fn destroy_image_views(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if self.image_views.is_empty() {
            return;
        }
        for view in self.image_views.drain(..) {
            unsafe { device.device.destroy_image_view(view, None) };
        }
        self.logger.nlog(
            Level::Debug,
            Actor::Core,
            &self.name,
            "vulkan: vkDestroyImageView",
        );
    }

    fn destroy_swapchain(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if let Some(chain) = self.swapchain.take() {
            unsafe {
                device
                    .swapchain_loader
                    .destroy_swapchain(chain.swapchain, None)
            };
            self.logger.nlog(
                Level::Debug,
                Actor::Core,
                &self.name,
                "vulkan: vkDestroySwapchainKHR",
            );
        }
    }

    fn destroy_surface(&mut self) {
        let Some(instance) = self.instance.as_ref() else {
            return;
        };
        if let Some(block) = self.surface.take() {
            unsafe { instance.surface_loader.destroy_surface(block.surface, None) };
            self.logger.nlog(
                Level::Debug,
                Actor::Core,
                &self.name,
                "vulkan: vkDestroySurfaceKHR",
            );
        }
    }

    fn wait_idle(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        if let Err(code) = unsafe { device.device.device_wait_idle() } {
            self.logger.nlog(
                Level::Warn,
                Actor::Core,
                &self.name,
                &format!("vulkan: vkDeviceWaitIdle failed with {code}"),
            );
        }
    }

    fn acquire_image(&mut self) -> Result<ImageAcquire> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let chain = self.swapchain.as_ref().ok_or_else(|| missing("swapchain"))?;
        let semaphores = self.semaphores.as_ref().ok_or_else(|| missing("semaphores"))?;

        let result = unsafe {
            device.swapchain_loader.acquire_next_image(
                chain.swapchain,
                u64::MAX,
                semaphores.image_available,
                vk::Fence::null(),
            )
        };

        match result {
            Ok((index, suboptimal)) => Ok(ImageAcquire::Ready { index, suboptimal }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(ImageAcquire::OutOfDate),
            Err(code) => self.check_quiet("vkAcquireNextImageKHR", Err(code)),
        }
    }

    fn submit(&mut self, image_index: u32) -> Result<()> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let semaphores = self.semaphores.as_ref().ok_or_else(|| missing("semaphores"))?;
        let cmd = *self
            .command_buffers
            .get(image_index as usize)
            .ok_or_else(|| missing("command buffers"))?;

        let wait_semaphores = [semaphores.image_available];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [cmd];
        let signal_semaphores = [semaphores.rendering_done];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        self.check_quiet("vkQueueSubmit", unsafe {
            device
                .device
                .queue_submit(device.queue, &[submit_info.build()], vk::Fence::null())
        })
    }

    fn present(&mut self, image_index: u32) -> Result<PresentOutcome> {
        let device = self.device.as_ref().ok_or_else(|| missing("device"))?;
        let chain = self.swapchain.as_ref().ok_or_else(|| missing("swapchain"))?;
        let semaphores = self.semaphores.as_ref().ok_or_else(|| missing("semaphores"))?;

        let wait_semaphores = [semaphores.rendering_done];
        let swapchains = [chain.swapchain];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            device
                .swapchain_loader
                .queue_present(device.queue, &present_info)
        };

        match result {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(code) => self.check_quiet("vkQueuePresentKHR", Err(code)),
        }
    }
}

impl Drop for VulkanBackend {
    fn drop(&mut self) {
        // The renderer tears the surface tier down in `stop`; anything still
        // alive here is released in the same reverse order before the
        // device and instance go away.
        self.wait_idle();
        self.destroy_semaphores();
        self.destroy_command_buffers();
        self.destroy_command_pool();
        self.destroy_framebuffers();
        self.destroy_pipeline();
        self.destroy_shader_modules();
        self.destroy_image_views();
        self.destroy_swapchain();
        self.destroy_surface();

        if let Some(block) = self.device.take() {
            unsafe { block.device.destroy_device(None) };
            self.debug("vulkan: vkDestroyDevice");
        }
        if let Some(block) = self.instance.take() {
            unsafe { block.instance.destroy_instance(None) };
            self.debug("vulkan: vkDestroyInstance");
        }
    }
}
