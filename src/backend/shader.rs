// Shader module creation from loaded SPIR-V bytes.

use crate::renderer::ShaderStage;
use ash::prelude::VkResult;
use ash::util::read_spv;
use ash::vk;
use std::io::Cursor;

/// Builds a shader module from raw bytes. The bytes are reinterpreted as
/// SPIR-V words; content is otherwise unvalidated and malformed bytecode
/// surfaces as a module-creation failure.
pub(super) fn create_shader_module(
    device: &ash::Device,
    bytes: &[u8],
) -> VkResult<vk::ShaderModule> {
    let words =
        read_spv(&mut Cursor::new(bytes)).map_err(|_| vk::Result::ERROR_INVALID_SHADER_NV)?;

    let create_info = vk::ShaderModuleCreateInfo::builder().code(&words);
    unsafe { device.create_shader_module(&create_info, None) }
}

pub(super) fn stage_flags(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
    }
}
