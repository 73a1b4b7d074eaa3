// Drives the renderer lifecycle state machine over a recording backend
// double and a headless render target: creation/destruction ordering,
// idempotence, shader bookkeeping and steady-state frame submission.

use easel::backend::{
    AdapterKind, AdapterProfile, Extent, ImageAcquire, PresentOutcome, RenderBackend,
    SelectionPolicy, SurfaceCapabilities,
};
use easel::renderer::{AppInfo, Shader};
use easel::window::{RenderTarget, SurfaceHandle};
use easel::{Error, Logger, LoggerSettings, Renderer, RendererSettings, Result, ShaderStage, Version};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn count(&self, name: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.as_str() == name)
            .count()
    }
}

struct RecordingBackend {
    log: CallLog,
    caps: SurfaceCapabilities,
    images: usize,
}

impl RecordingBackend {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            caps: SurfaceCapabilities {
                min_extent: Extent::new(16, 16),
                max_extent: Extent::new(1024, 768),
                min_image_count: 2,
                max_image_count: 8,
            },
            images: 3,
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn create_instance(&mut self, _app: &AppInfo) -> Result<()> {
        self.log.push("create_instance");
        Ok(())
    }

    fn enumerate_adapters(&mut self, policy: &SelectionPolicy) -> Result<AdapterProfile> {
        self.log.push("enumerate_adapters");
        let profiles = [AdapterProfile {
            name: "test adapter".to_owned(),
            kind: AdapterKind::Discrete,
            has_graphics_queue: true,
        }];
        let index = policy
            .select(&profiles)
            .expect("the default policy accepts a discrete adapter");
        Ok(profiles[index].clone())
    }

    fn create_device(&mut self) -> Result<()> {
        self.log.push("create_device");
        Ok(())
    }

    fn create_surface(&mut self, _target: &dyn RenderTarget) -> Result<SurfaceCapabilities> {
        self.log.push("create_surface");
        Ok(self.caps)
    }

    fn surface_capabilities(&mut self) -> Result<SurfaceCapabilities> {
        self.log.push("surface_capabilities");
        Ok(self.caps)
    }

    fn create_swapchain(&mut self, extent: Extent, _vsync: bool) -> Result<usize> {
        self.log
            .push(format!("create_swapchain:{}x{}", extent.width, extent.height));
        Ok(self.images)
    }

    fn create_image_views(&mut self) -> Result<()> {
        self.log.push("create_image_views");
        Ok(())
    }

    fn create_shader_modules(&mut self, shaders: &[Shader]) -> Result<()> {
        self.log
            .push(format!("create_shader_modules:{}", shaders.len()));
        Ok(())
    }

    fn create_pipeline(&mut self, _extent: Extent) -> Result<()> {
        self.log.push("create_pipeline");
        Ok(())
    }

    fn create_framebuffers(&mut self, _extent: Extent) -> Result<()> {
        self.log.push("create_framebuffers");
        Ok(())
    }

    fn create_command_pool(&mut self) -> Result<()> {
        self.log.push("create_command_pool");
        Ok(())
    }

    fn create_command_buffers(&mut self) -> Result<()> {
        self.log.push("create_command_buffers");
        Ok(())
    }

    fn record_commands(&mut self, _extent: Extent, _clear_color: [f32; 4]) -> Result<()> {
        self.log.push("record_commands");
        Ok(())
    }

    fn create_semaphores(&mut self) -> Result<()> {
        self.log.push("create_semaphores");
        Ok(())
    }

    fn destroy_semaphores(&mut self) {
        self.log.push("destroy_semaphores");
    }

    fn destroy_command_buffers(&mut self) {
        self.log.push("destroy_command_buffers");
    }

    fn destroy_command_pool(&mut self) {
        self.log.push("destroy_command_pool");
    }

    fn destroy_framebuffers(&mut self) {
        self.log.push("destroy_framebuffers");
    }

    fn destroy_pipeline(&mut self) {
        self.log.push("destroy_pipeline");
    }

    fn destroy_shader_modules(&mut self) {
        self.log.push("destroy_shader_modules");
    }

    fn destroy_image_views(&mut self) {
        self.log.push("destroy_image_views");
    }

    fn destroy_swapchain(&mut self) {
        self.log.push("destroy_swapchain");
    }

    fn destroy_surface(&mut self) {
        self.log.push("destroy_surface");
    }

    fn wait_idle(&mut self) {
        self.log.push("wait_idle");
    }

    fn acquire_image(&mut self) -> Result<ImageAcquire> {
        self.log.push("acquire_image");
        Ok(ImageAcquire::Ready {
            index: 0,
            suboptimal: false,
        })
    }

    fn submit(&mut self, _image_index: u32) -> Result<()> {
        self.log.push("submit");
        Ok(())
    }

    fn present(&mut self, _image_index: u32) -> Result<PresentOutcome> {
        self.log.push("present");
        Ok(PresentOutcome::Presented)
    }
}

struct HeadlessTarget {
    open: bool,
    size: (u32, u32),
}

impl RenderTarget for HeadlessTarget {
    fn is_open(&self) -> bool {
        self.open
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn surface_handle(&self) -> Option<SurfaceHandle> {
        None
    }
}

const CONSTRUCTION_SEQUENCE: [&str; 3] = ["create_instance", "enumerate_adapters", "create_device"];

const TEARDOWN_SEQUENCE: [&str; 10] = [
    "wait_idle",
    "destroy_semaphores",
    "destroy_command_buffers",
    "destroy_command_pool",
    "destroy_framebuffers",
    "destroy_pipeline",
    "destroy_shader_modules",
    "destroy_image_views",
    "destroy_swapchain",
    "destroy_surface",
];

fn quiet_logger() -> Arc<Logger> {
    Logger::stderr(
        LoggerSettings {
            disabled: true,
            ..LoggerSettings::default()
        },
        "test",
    )
}

fn app_info() -> AppInfo {
    AppInfo {
        app_name: "lifecycle test".to_owned(),
        app_version: Version::new(0, 1, 0),
        engine_name: "easel".to_owned(),
        engine_version: Version::new(0, 1, 0),
    }
}

fn new_renderer() -> (Renderer<RecordingBackend>, CallLog) {
    let log = CallLog::default();
    let renderer = Renderer::new(
        RendererSettings::default(),
        app_info(),
        0,
        quiet_logger(),
        RecordingBackend::new(log.clone()),
    )
    .expect("construction against the recording backend succeeds");
    (renderer, log)
}

fn target(width: u32, height: u32) -> HeadlessTarget {
    HeadlessTarget {
        open: true,
        size: (width, height),
    }
}

/// Writes a throwaway shader file; the recording backend never reads it,
/// but the loader does.
fn shader_file(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("easel-lifecycle-{}-{tag}.spv", std::process::id()));
    std::fs::write(&path, [0u8; 16]).expect("temp shader file is writable");
    path
}

fn load_default_shaders(renderer: &mut Renderer<RecordingBackend>) {
    renderer
        .load_shader(ShaderStage::Vertex, shader_file("vert"))
        .unwrap();
    renderer
        .load_shader(ShaderStage::Fragment, shader_file("frag"))
        .unwrap();
}

#[test]
fn construction_runs_instance_adapter_device_in_order() {
    let (_renderer, log) = new_renderer();
    assert_eq!(log.entries(), CONSTRUCTION_SEQUENCE);
}

#[test]
fn start_builds_the_surface_tier_in_dependency_order() {
    let (mut renderer, log) = new_renderer();
    load_default_shaders(&mut renderer);
    renderer.start(&target(800, 600)).unwrap();

    let entries = log.entries();
    assert_eq!(
        &entries[CONSTRUCTION_SEQUENCE.len()..],
        [
            "create_surface",
            "create_swapchain:800x600",
            "create_image_views",
            "create_shader_modules:2",
            "create_pipeline",
            "create_framebuffers",
            "create_command_pool",
            "create_command_buffers",
            "record_commands",
            "create_semaphores",
        ]
    );
    assert!(renderer.is_started());
}

#[test]
fn second_start_creates_nothing() {
    let (mut renderer, log) = new_renderer();
    load_default_shaders(&mut renderer);
    renderer.start(&target(800, 600)).unwrap();

    let before = log.len();
    renderer.start(&target(800, 600)).unwrap();
    assert_eq!(log.len(), before);
}

#[test]
fn stop_destroys_in_exact_reverse_creation_order() {
    let (mut renderer, log) = new_renderer();
    load_default_shaders(&mut renderer);
    renderer.start(&target(800, 600)).unwrap();

    let before = log.len();
    renderer.stop();

    let entries = log.entries();
    assert_eq!(&entries[before..], TEARDOWN_SEQUENCE);
    assert!(!renderer.is_started());
}

#[test]
fn second_stop_destroys_nothing() {
    let (mut renderer, log) = new_renderer();
    load_default_shaders(&mut renderer);
    renderer.start(&target(800, 600)).unwrap();
    renderer.stop();

    let before = log.len();
    renderer.stop();
    assert_eq!(log.len(), before);
}

#[test]
fn framebuffer_size_is_clamped_into_surface_bounds() {
    let (mut renderer, log) = new_renderer();
    load_default_shaders(&mut renderer);

    // Larger than the surface maximum on both axes.
    renderer.start(&target(4000, 4000)).unwrap();
    assert_eq!(log.count("create_swapchain:1024x768"), 1);
    assert_eq!(renderer.size(), (1024, 768));

    renderer.stop();
    renderer.resize(1, 1);
    renderer.start(&target(1, 1)).unwrap();
    assert_eq!(log.count("create_swapchain:16x16"), 1);
}

#[test]
fn loading_n_shaders_creates_n_modules() {
    let (mut renderer, log) = new_renderer();
    renderer
        .load_shader(ShaderStage::Vertex, shader_file("v0"))
        .unwrap();
    renderer
        .load_shader(ShaderStage::Vertex, shader_file("v1"))
        .unwrap();
    renderer
        .load_shader(ShaderStage::Fragment, shader_file("f0"))
        .unwrap();
    assert_eq!(renderer.shader_count(), 3);

    renderer.start(&target(800, 600)).unwrap();
    assert_eq!(log.count("create_shader_modules:3"), 1);
}

#[test]
fn shader_load_after_start_fails_without_mutating_the_collection() {
    let (mut renderer, _log) = new_renderer();
    load_default_shaders(&mut renderer);
    renderer.start(&target(800, 600)).unwrap();

    let result = renderer.load_shader(ShaderStage::Vertex, shader_file("late"));
    assert!(matches!(result, Err(Error::Logic(_))));
    assert_eq!(renderer.shader_count(), 2);
}

#[test]
fn start_without_both_shader_stages_is_rejected() {
    let (mut renderer, log) = new_renderer();
    renderer
        .load_shader(ShaderStage::Vertex, shader_file("only-vert"))
        .unwrap();

    let result = renderer.start(&target(800, 600));
    assert!(matches!(result, Err(Error::Logic(_))));
    assert!(!renderer.is_started());
    assert_eq!(log.count("create_surface"), 0);
}

#[test]
fn start_requires_an_open_window() {
    let (mut renderer, _log) = new_renderer();
    load_default_shaders(&mut renderer);

    let closed = HeadlessTarget {
        open: false,
        size: (800, 600),
    };
    assert!(matches!(renderer.start(&closed), Err(Error::Logic(_))));
    assert!(!renderer.is_started());
}

#[test]
fn update_before_start_is_a_logic_error() {
    let (mut renderer, _log) = new_renderer();
    assert!(matches!(renderer.update(), Err(Error::Logic(_))));
}

#[test]
fn a_hundred_consecutive_frames_submit_cleanly() {
    let (mut renderer, log) = new_renderer();
    load_default_shaders(&mut renderer);
    renderer.start(&target(800, 600)).unwrap();

    for _ in 0..100 {
        assert!(renderer.update().unwrap());
    }
    assert_eq!(log.count("acquire_image"), 100);
    assert_eq!(log.count("submit"), 100);
    assert_eq!(log.count("present"), 100);
}

#[test]
fn resize_rebuilds_the_swapchain_on_the_next_update_only() {
    let (mut renderer, log) = new_renderer();
    load_default_shaders(&mut renderer);
    renderer.start(&target(800, 600)).unwrap();

    renderer.resize(640, 480);
    let before = log.len();
    assert!(renderer.update().unwrap());

    let entries = log.entries();
    assert_eq!(
        &entries[before..],
        [
            "wait_idle",
            "destroy_semaphores",
            "destroy_command_buffers",
            "destroy_command_pool",
            "destroy_framebuffers",
            "destroy_pipeline",
            "destroy_shader_modules",
            "destroy_image_views",
            "destroy_swapchain",
            "surface_capabilities",
            "create_swapchain:640x480",
            "create_image_views",
            "create_shader_modules:2",
            "create_pipeline",
            "create_framebuffers",
            "create_command_pool",
            "create_command_buffers",
            "record_commands",
            "create_semaphores",
            "acquire_image",
            "submit",
            "present",
        ]
    );
    // The surface itself survives the rebuild.
    assert_eq!(log.count("destroy_surface"), 0);

    // Once rebuilt, the next frame goes straight to acquire.
    let before = log.len();
    assert!(renderer.update().unwrap());
    assert_eq!(
        &log.entries()[before..],
        ["acquire_image", "submit", "present"]
    );
}

#[test]
fn zero_sized_resizes_are_ignored() {
    let (mut renderer, log) = new_renderer();
    load_default_shaders(&mut renderer);
    renderer.start(&target(800, 600)).unwrap();

    renderer.resize(0, 0);
    let before = log.len();
    assert!(renderer.update().unwrap());
    assert_eq!(
        &log.entries()[before..],
        ["acquire_image", "submit", "present"]
    );
}

#[test]
fn dropping_a_started_renderer_stops_it_first() {
    let log = CallLog::default();
    {
        let mut renderer = Renderer::new(
            RendererSettings::default(),
            app_info(),
            7,
            quiet_logger(),
            RecordingBackend::new(log.clone()),
        )
        .unwrap();
        load_default_shaders(&mut renderer);
        renderer.start(&target(800, 600)).unwrap();
    }

    let entries = log.entries();
    assert_eq!(&entries[entries.len() - TEARDOWN_SEQUENCE.len()..], TEARDOWN_SEQUENCE);
}
