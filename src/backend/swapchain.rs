// Surface queries and swapchain construction.

use super::Extent;
use ash::extensions::khr;
use ash::prelude::VkResult;
use ash::vk;

/// Preferred presentable format: UNORM first, then SRGB, then whatever the
/// surface reports first.
pub(super) fn choose_format(formats: &[vk::SurfaceFormatKHR]) -> VkResult<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_UNORM
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| {
            formats.iter().find(|f| {
                f.format == vk::Format::B8G8R8A8_SRGB
                    && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
            })
        })
        .or_else(|| formats.first())
        .copied()
        .ok_or(vk::Result::ERROR_FORMAT_NOT_SUPPORTED)
}

/// FIFO is the only mode Vulkan guarantees; it doubles as the vsync mode.
/// Without vsync, lower-latency modes are preferred when available.
pub(super) fn choose_present_mode(
    modes: &[vk::PresentModeKHR],
    vsync: bool,
) -> vk::PresentModeKHR {
    if vsync {
        return vk::PresentModeKHR::FIFO;
    }
    for wanted in [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::MAILBOX] {
        if modes.contains(&wanted) {
            return wanted;
        }
    }
    vk::PresentModeKHR::FIFO
}

pub(super) fn create_swapchain(
    loader: &khr::Swapchain,
    surface: vk::SurfaceKHR,
    caps: &vk::SurfaceCapabilitiesKHR,
    format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    extent: Extent,
) -> VkResult<vk::SwapchainKHR> {
    let mut image_count = caps.min_image_count + 1;
    if caps.max_image_count > 0 && image_count > caps.max_image_count {
        image_count = caps.max_image_count;
    }

    let create_info = vk::SwapchainCreateInfoKHR::builder()
        .surface(surface)
        .min_image_count(image_count)
        .image_format(format.format)
        .image_color_space(format.color_space)
        .image_extent(vk::Extent2D {
            width: extent.width,
            height: extent.height,
        })
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        .pre_transform(caps.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(present_mode)
        .clipped(true);

    unsafe { loader.create_swapchain(&create_info, None) }
}

pub(super) fn create_image_view(
    device: &ash::Device,
    image: vk::Image,
    format: vk::Format,
) -> VkResult<vk::ImageView> {
    let create_info = vk::ImageViewCreateInfo::builder()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .components(vk::ComponentMapping {
            r: vk::ComponentSwizzle::IDENTITY,
            g: vk::ComponentSwizzle::IDENTITY,
            b: vk::ComponentSwizzle::IDENTITY,
            a: vk::ComponentSwizzle::IDENTITY,
        })
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        });

    unsafe { device.create_image_view(&create_info, None) }
}
