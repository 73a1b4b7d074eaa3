// GPU-side synchronization primitives.

use ash::prelude::VkResult;
use ash::vk;

/// The two binary semaphores ordering one frame: image acquisition ahead of
/// submission, submission ahead of presentation.
pub(super) struct FrameSemaphores {
    pub image_available: vk::Semaphore,
    pub rendering_done: vk::Semaphore,
}

impl FrameSemaphores {
    pub fn new(device: &ash::Device) -> VkResult<Self> {
        let semaphore_info = vk::SemaphoreCreateInfo::builder();
        unsafe {
            Ok(Self {
                image_available: device.create_semaphore(&semaphore_info, None)?,
                rendering_done: device.create_semaphore(&semaphore_info, None)?,
            })
        }
    }

    pub fn destroy(&self, device: &ash::Device) {
        unsafe {
            device.destroy_semaphore(self.rendering_done, None);
            device.destroy_semaphore(self.image_available, None);
        }
    }
}
