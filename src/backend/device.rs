// Instance, surface plumbing, adapter enumeration and logical device
// creation.

use super::{AdapterKind, AdapterProfile};
use crate::renderer::AppInfo;
use ash::extensions::khr;
use ash::prelude::VkResult;
use ash::{vk, Entry};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::ffi::{c_char, CStr, CString};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Instance extensions the window system requires for presentable
/// surfaces, keyed off the display handle the way GLFW's required-extension
/// query works.
fn surface_extensions(display: RawDisplayHandle) -> VkResult<Vec<*const c_char>> {
    let platform = match display {
        RawDisplayHandle::Windows(_) => khr::Win32Surface::name(),
        RawDisplayHandle::Xlib(_) => khr::XlibSurface::name(),
        RawDisplayHandle::Xcb(_) => khr::XcbSurface::name(),
        RawDisplayHandle::Wayland(_) => khr::WaylandSurface::name(),
        _ => return Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT),
    };
    Ok(vec![khr::Surface::name().as_ptr(), platform.as_ptr()])
}

pub(super) fn create_instance(
    entry: &Entry,
    app: &AppInfo,
    display: RawDisplayHandle,
    validation: bool,
) -> VkResult<ash::Instance> {
    // Interior nul bytes cannot come from well-formed names; fall back to a
    // fixed string rather than failing instance creation over a log label.
    let app_name =
        CString::new(app.app_name.as_str()).unwrap_or_else(|_| CString::from(c"app"));
    let engine_name =
        CString::new(app.engine_name.as_str()).unwrap_or_else(|_| CString::from(c"engine"));

    let app_info = vk::ApplicationInfo::builder()
        .application_name(&app_name)
        .application_version(app.app_version.as_vulkan())
        .engine_name(&engine_name)
        .engine_version(app.engine_version.as_vulkan())
        .api_version(vk::API_VERSION_1_2);

    // The window system dictates which surface extensions the instance
    // needs.
    let extensions = surface_extensions(display)?;

    let layers: Vec<*const c_char> = if validation {
        vec![VALIDATION_LAYER.as_ptr()]
    } else {
        Vec::new()
    };

    let create_info = vk::InstanceCreateInfo::builder()
        .application_info(&app_info)
        .enabled_extension_names(&extensions)
        .enabled_layer_names(&layers);

    unsafe { entry.create_instance(&create_info, None) }
}

/// Builds a presentable surface for the window behind the raw handle pair.
/// Each platform arm feeds its native handles into the matching surface
/// extension.
pub(super) fn create_surface(
    entry: &Entry,
    instance: &ash::Instance,
    display: RawDisplayHandle,
    window: RawWindowHandle,
) -> VkResult<vk::SurfaceKHR> {
    match (display, window) {
        (RawDisplayHandle::Windows(_), RawWindowHandle::Win32(handle)) => {
            let hinstance = handle
                .hinstance
                .map(|h| h.get())
                .unwrap_or(0) as *const std::ffi::c_void;
            let create_info = vk::Win32SurfaceCreateInfoKHR::builder()
                .hinstance(hinstance)
                .hwnd(handle.hwnd.get() as *const std::ffi::c_void);
            let loader = khr::Win32Surface::new(entry, instance);
            unsafe { loader.create_win32_surface(&create_info, None) }
        }
        (RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(handle)) => {
            let dpy = display
                .display
                .map(|d| d.as_ptr())
                .unwrap_or(std::ptr::null_mut());
            let create_info = vk::XlibSurfaceCreateInfoKHR::builder()
                .dpy(dpy.cast())
                .window(handle.window);
            let loader = khr::XlibSurface::new(entry, instance);
            unsafe { loader.create_xlib_surface(&create_info, None) }
        }
        (RawDisplayHandle::Xcb(display), RawWindowHandle::Xcb(handle)) => {
            let connection = display
                .connection
                .map(|c| c.as_ptr())
                .unwrap_or(std::ptr::null_mut());
            let create_info = vk::XcbSurfaceCreateInfoKHR::builder()
                .connection(connection.cast())
                .window(handle.window.get());
            let loader = khr::XcbSurface::new(entry, instance);
            unsafe { loader.create_xcb_surface(&create_info, None) }
        }
        (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(handle)) => {
            let create_info = vk::WaylandSurfaceCreateInfoKHR::builder()
                .display(display.display.as_ptr().cast())
                .surface(handle.surface.as_ptr().cast());
            let loader = khr::WaylandSurface::new(entry, instance);
            unsafe { loader.create_wayland_surface(&create_info, None) }
        }
        _ => Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT),
    }
}

pub(super) struct AdapterSet {
    pub devices: Vec<vk::PhysicalDevice>,
    pub profiles: Vec<AdapterProfile>,
    /// Index of a graphics-capable queue family per adapter, if any.
    pub queue_families: Vec<Option<u32>>,
}

pub(super) fn enumerate_adapters(instance: &ash::Instance) -> VkResult<AdapterSet> {
    let devices = unsafe { instance.enumerate_physical_devices() }?;

    let mut profiles = Vec::with_capacity(devices.len());
    let mut queue_families = Vec::with_capacity(devices.len());

    for &device in &devices {
        let props = unsafe { instance.get_physical_device_properties(device) };
        let name = unsafe { CStr::from_ptr(props.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        let kind = match props.device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => AdapterKind::Discrete,
            vk::PhysicalDeviceType::INTEGRATED_GPU => AdapterKind::Integrated,
            vk::PhysicalDeviceType::VIRTUAL_GPU => AdapterKind::Virtual,
            vk::PhysicalDeviceType::CPU => AdapterKind::Cpu,
            _ => AdapterKind::Other,
        };

        let families = unsafe { instance.get_physical_device_queue_family_properties(device) };
        let graphics_family = families
            .iter()
            .enumerate()
            .find(|(_, family)| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .map(|(index, _)| index as u32);

        profiles.push(AdapterProfile {
            name,
            kind,
            has_graphics_queue: graphics_family.is_some(),
        });
        queue_families.push(graphics_family);
    }

    Ok(AdapterSet {
        devices,
        profiles,
        queue_families,
    })
}

pub(super) fn create_logical_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    graphics_queue_family: u32,
) -> VkResult<(ash::Device, vk::Queue)> {
    let queue_priorities = [1.0];
    let queue_create_info = vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(graphics_queue_family)
        .queue_priorities(&queue_priorities)
        .build();

    let extensions = [ash::extensions::khr::Swapchain::name().as_ptr()];
    let features = vk::PhysicalDeviceFeatures::default();

    let create_info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(std::slice::from_ref(&queue_create_info))
        .enabled_extension_names(&extensions)
        .enabled_features(&features);

    let device = unsafe { instance.create_device(physical_device, &create_info, None) }?;
    let graphics_queue = unsafe { device.get_device_queue(graphics_queue_family, 0) };

    Ok((device, graphics_queue))
}
