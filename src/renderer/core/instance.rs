use std::ffi::{c_char, c_void, CStr, CString};
use ash::vk;
use crate::renderer::api::NativeWindow;
use crate::renderer::config::RenderConfig;
use crate::renderer::core::error::{BringUpError, InstanceCreationError, SurfaceCreationError};

pub const REQUIRED_VALIDATION_LAYERS: &[&CStr] = &[c"VK_LAYER_KHRONOS_validation"];

pub fn create_instance(
    entry: &ash::Entry,
    window: &dyn NativeWindow,
    config: &RenderConfig,
) -> Result<ash::Instance, InstanceCreationError> {
    if config.enable_validation {
        check_validation_layers_supported(entry)?;
    }

    let application_name = CString::new(config.application_name.as_str())
        .unwrap_or_else(|_| c"vkbringup".to_owned());
    let application_info = vk::ApplicationInfo::default()
        .application_name(&application_name)
        .application_version(vk::make_api_version(0, 1, 0, 0))
        .engine_name(c"No Engine")
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(vk::API_VERSION_1_0);

    let enabled_layer_names = if config.enable_validation {
        REQUIRED_VALIDATION_LAYERS
            .iter()
            .map(|layer| layer.as_ptr())
            .collect::<Vec<*const c_char>>()
    } else {
        Vec::new()
    };
    let enabled_extension_names = get_required_instance_extensions(window, config)?
        .iter()
        .map(|ext| ext.as_ptr())
        .collect::<Vec<*const c_char>>();

    // Also covers messages emitted by vkCreateInstance/vkDestroyInstance themselves
    let mut debug_info = debug_utils_messenger_create_info();
    let mut instance_info = vk::InstanceCreateInfo::default()
        .application_info(&application_info)
        .enabled_layer_names(&enabled_layer_names)
        .enabled_extension_names(&enabled_extension_names);
    if config.enable_validation {
        instance_info = instance_info.push_next(&mut debug_info);
    }

    #[cfg(target_os = "macos")]
    let instance_info = instance_info
        .flags(vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR);

    let instance = unsafe {
        entry.create_instance(&instance_info, None)?
    };
    log::info!(
        "Created instance ({} extension(s), {} layer(s))",
        enabled_extension_names.len(),
        enabled_layer_names.len(),
    );
    Ok(instance)
}

pub fn create_debug_utils_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT), BringUpError> {
    let debug_utils_loader = ash::ext::debug_utils::Instance::new(entry, instance);
    let debug_utils_info = debug_utils_messenger_create_info();
    let debug_utils_messenger = unsafe {
        debug_utils_loader
            .create_debug_utils_messenger(&debug_utils_info, None)
            .map_err(BringUpError::DebugSetup)?
    };
    log::info!("Installed debug messenger");
    Ok((debug_utils_loader, debug_utils_messenger))
}

pub fn create_surface(
    entry: &ash::Entry,
    instance: &ash::Instance,
    window: &dyn NativeWindow,
) -> Result<(vk::SurfaceKHR, ash::khr::surface::Instance), SurfaceCreationError> {
    let surface = unsafe {
        ash_window::create_surface(
            entry,
            instance,
            window.display_handle()?.as_raw(),
            window.window_handle()?.as_raw(),
            None,
        )?
    };
    let surface_loader = ash::khr::surface::Instance::new(entry, instance);
    log::info!("Created window surface");
    Ok((surface, surface_loader))
}

/// Windowing-layer extensions, plus debug utils when diagnostics are on.
fn get_required_instance_extensions(
    window: &dyn NativeWindow,
    config: &RenderConfig,
) -> Result<Vec<&'static CStr>, InstanceCreationError> {
    let mut exts = ash_window::enumerate_required_extensions(
        window.display_handle()?.as_raw()
    )?
        .iter()
        .map(|ext| unsafe {
            CStr::from_ptr(*ext)
        })
        .collect::<Vec<_>>();

    if config.enable_validation {
        exts.push(ash::ext::debug_utils::NAME);
    }

    #[cfg(target_os = "macos")]
    {
        exts.push(ash::khr::portability_enumeration::NAME);
        exts.push(ash::khr::get_physical_device_properties2::NAME);
    }

    Ok(exts)
}

fn check_validation_layers_supported(entry: &ash::Entry) -> Result<(), InstanceCreationError> {
    let layer_properties = unsafe {
        entry.enumerate_instance_layer_properties()?
    };
    let supported_layers = layer_properties
        .iter()
        .filter_map(|props| props.layer_name_as_c_str().ok())
        .collect::<Vec<_>>();

    match missing_layer(REQUIRED_VALIDATION_LAYERS, &supported_layers) {
        Some(layer) => Err(InstanceCreationError::MissingValidationLayer(
            layer.to_string_lossy().into_owned(),
        )),
        None => Ok(()),
    }
}

fn missing_layer<'a>(required: &[&'a CStr], supported: &[&CStr]) -> Option<&'a CStr> {
    required
        .iter()
        .copied()
        .find(|layer| !supported.contains(layer))
}

fn debug_utils_messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
    let message_severity = vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR;
    let message_type = vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE;
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(message_severity)
        .message_type(message_type)
        .pfn_user_callback(Some(debug_callback))
}

fn message_category(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "[Validation]"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "[Performance]"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL) {
        "[General]"
    } else {
        "[Unknown]"
    }
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut c_void,
) -> vk::Bool32 {
    let category = message_category(message_type);
    let msg = unsafe {
        if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
            c"<no message>"
        } else {
            CStr::from_ptr((*p_callback_data).p_message)
        }
    };

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::error!("validation layer: {} {}", category, msg.to_string_lossy());
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::warn!("validation layer: {} {}", category, msg.to_string_lossy());
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::info!("validation layer: {} {}", category, msg.to_string_lossy());
    } else {
        log::trace!("validation layer: {} {}", category, msg.to_string_lossy());
    }

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_first_missing_layer() {
        let supported = [c"VK_LAYER_LUNARG_api_dump"];
        assert_eq!(
            missing_layer(REQUIRED_VALIDATION_LAYERS, &supported),
            Some(c"VK_LAYER_KHRONOS_validation")
        );

        let supported = [c"VK_LAYER_LUNARG_api_dump", c"VK_LAYER_KHRONOS_validation"];
        assert_eq!(missing_layer(REQUIRED_VALIDATION_LAYERS, &supported), None);
    }

    #[test]
    fn debug_sink_covers_warnings_and_errors_in_all_categories() {
        let info = debug_utils_messenger_create_info();
        assert!(info.message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
        assert!(info.message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
        assert!(!info.message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
        assert!(info.message_type.contains(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
        ));
        assert!(info.pfn_user_callback.is_some());
    }

    #[test]
    fn categories_name_the_most_specific_type() {
        assert_eq!(
            message_category(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
            ),
            "[Validation]"
        );
        assert_eq!(message_category(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE), "[Performance]");
        assert_eq!(message_category(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL), "[General]");
    }
}
