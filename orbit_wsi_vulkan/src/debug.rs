//! Validation-layer plumbing, compiled in with the `vulkan-validation` feature
//!
//! Installs VK_LAYER_KHRONOS_validation when the loader offers it and routes
//! debug-utils messages to the console with severity coloring.

use ash::vk;
use colored::*;
use orbit_wsi::wsi_warn;
use std::ffi::{c_char, c_void, CStr};

const SRC: &str = "orbit::vulkan";

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Layer names to enable, empty when the validation layer is not installed
pub(crate) fn validation_layers(entry: &ash::Entry) -> Vec<*const c_char> {
    let available = match unsafe { entry.enumerate_instance_layer_properties() } {
        Ok(layers) => layers,
        Err(e) => {
            wsi_warn!(SRC, "Failed to enumerate instance layers: {:?}", e);
            return Vec::new();
        }
    };

    let found = available.iter().any(|layer| {
        layer
            .layer_name_as_c_str()
            .map(|name| name == VALIDATION_LAYER)
            .unwrap_or(false)
    });

    if found {
        vec![VALIDATION_LAYER.as_ptr()]
    } else {
        wsi_warn!(SRC, "Validation layer requested but not installed");
        Vec::new()
    }
}

/// Create the debug messenger. Failure is non-fatal; the context runs
/// without validation output.
pub(crate) fn setup_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
) -> (
    Option<ash::ext::debug_utils::Instance>,
    Option<vk::DebugUtilsMessengerEXT>,
) {
    let loader = ash::ext::debug_utils::Instance::new(entry, instance);

    let messenger_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback));

    match unsafe { loader.create_debug_utils_messenger(&messenger_info, None) } {
        Ok(messenger) => (Some(loader), Some(messenger)),
        Err(e) => {
            wsi_warn!(SRC, "Failed to create debug messenger: {:?}", e);
            (Some(loader), None)
        }
    }
}

unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let callback_data = *p_callback_data;
    let message = if callback_data.p_message.is_null() {
        std::borrow::Cow::from("<no message>")
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    let severity = match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => "ERROR".red().bold(),
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => "WARN ".yellow(),
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => "INFO ".green(),
        _ => "VERBO".bright_black(),
    };

    let kind = match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => "validation",
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => "performance",
        _ => "general",
    };

    println!("[vulkan] [{}] [{}] {}", severity, kind, message);

    vk::FALSE
}
