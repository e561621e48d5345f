//! Swapchain builder policy - pure selection over surface capabilities
//!
//! Everything in here is a deterministic function of the queried surface
//! state, so the whole builder policy is unit-testable without a device.
//! The device module queries the driver and feeds the results through these
//! functions when (re)creating a swapchain.

use ash::vk;
use orbit_wsi::orbit::device::PixelFormat;

/// Environment variable overriding vertical sync.
///
/// Unset means vsync on. A set value is parsed as an unsigned integer;
/// non-zero means on, zero or unparsable means off.
pub const VSYNC_ENV: &str = "ORBIT_WSI_VSYNC";

pub(crate) fn vsync_enabled() -> bool {
    match std::env::var(VSYNC_ENV) {
        Err(_) => true,
        Ok(value) => parse_unsigned_prefix(&value) != 0,
    }
}

/// Longest unsigned numeric prefix with C strtoul base auto-detection:
/// leading whitespace skipped, `0x`/`0X` hex, leading `0` octal, decimal
/// otherwise. No digits parses as zero; overflow saturates.
fn parse_unsigned_prefix(value: &str) -> u64 {
    let trimmed = value.trim_start();
    let (digits, radix) = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        (hex, 16)
    } else if trimmed.starts_with('0') {
        (trimmed, 8)
    } else {
        (trimmed, 10)
    };

    let prefix: String = digits.chars().take_while(|c| c.is_digit(radix)).collect();
    match u64::from_str_radix(&prefix, radix) {
        Ok(v) => v,
        Err(_) if prefix.is_empty() => 0,
        Err(_) => u64::MAX,
    }
}

/// Whether the surface can currently back a swapchain at all. A max image
/// extent of 0x0 means the surface is gone (window minimized on some
/// platforms) and creation must back off rather than fail.
pub(crate) fn surface_usable(capabilities: &vk::SurfaceCapabilitiesKHR) -> bool {
    capabilities.max_image_extent.width != 0 || capabilities.max_image_extent.height != 0
}

/// Select the surface format.
///
/// A single-entry list with format UNDEFINED means the surface accepts
/// anything. Otherwise the first SRGB-capable 8-bit format wins, and if none
/// is offered the first advertised format is taken verbatim.
pub(crate) fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
) -> Option<vk::SurfaceFormatKHR> {
    if formats.is_empty() {
        return None;
    }

    if formats.len() == 1 && formats[0].format == vk::Format::UNDEFINED {
        return Some(vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: formats[0].color_space,
        });
    }

    for candidate in formats {
        if matches!(
            candidate.format,
            vk::Format::R8G8B8A8_SRGB | vk::Format::B8G8R8A8_SRGB | vk::Format::A8B8G8R8_SRGB_PACK32
        ) {
            return Some(*candidate);
        }
    }

    Some(formats[0])
}

/// Select the swapchain extent for the desired window dimensions.
///
/// A current extent width of u32::MAX is the adaptive sentinel: the surface
/// takes whatever the swapchain says, so the desired size passes through
/// untouched. Any other current extent means the surface has a fixed size
/// and the desired extent is clamped into the supported range.
pub(crate) fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    width: u32,
    height: u32,
) -> vk::Extent2D {
    if capabilities.current_extent.width == u32::MAX {
        return vk::Extent2D { width, height };
    }

    vk::Extent2D {
        width: width
            .min(capabilities.max_image_extent.width)
            .max(capabilities.min_image_extent.width),
        height: height
            .min(capabilities.max_image_extent.height)
            .max(capabilities.min_image_extent.height),
    }
}

/// Select the present mode. FIFO is the only mode every driver supports and
/// is always the vsync choice; with vsync off, MAILBOX is preferred over
/// IMMEDIATE, falling back to FIFO when neither is offered.
pub(crate) fn choose_present_mode(
    modes: &[vk::PresentModeKHR],
    vsync: bool,
) -> vk::PresentModeKHR {
    if !vsync {
        if modes.contains(&vk::PresentModeKHR::MAILBOX) {
            return vk::PresentModeKHR::MAILBOX;
        }
        if modes.contains(&vk::PresentModeKHR::IMMEDIATE) {
            return vk::PresentModeKHR::IMMEDIATE;
        }
    }
    vk::PresentModeKHR::FIFO
}

/// One image more than the driver minimum, clamped to the maximum when the
/// driver reports one (0 means unbounded).
pub(crate) fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        count = capabilities.max_image_count;
    }
    count
}

/// Identity transform when supported, otherwise whatever the surface is
/// currently rotated to.
pub(crate) fn choose_pre_transform(
    capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::SurfaceTransformFlagsKHR {
    if capabilities
        .supported_transforms
        .contains(vk::SurfaceTransformFlagsKHR::IDENTITY)
    {
        vk::SurfaceTransformFlagsKHR::IDENTITY
    } else {
        capabilities.current_transform
    }
}

/// Composite alpha by fixed preference order, taking the first mode the
/// surface supports.
pub(crate) fn choose_composite_alpha(
    capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::CompositeAlphaFlagsKHR {
    const PREFERENCE: [vk::CompositeAlphaFlagsKHR; 4] = [
        vk::CompositeAlphaFlagsKHR::INHERIT,
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
    ];
    for mode in PREFERENCE {
        if capabilities.supported_composite_alpha.contains(mode) {
            return mode;
        }
    }
    vk::CompositeAlphaFlagsKHR::OPAQUE
}

/// Usage flags for swapchain images: render target plus transfer source,
/// so frames can be copied out (screenshots, readback).
pub(crate) fn swapchain_image_usage() -> vk::ImageUsageFlags {
    vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_SRC
}

/// Map a Vulkan format onto the core pixel-format enum. Formats the builder
/// can never select map to Unknown.
pub fn pixel_format_from_vk(format: vk::Format) -> PixelFormat {
    match format {
        vk::Format::B8G8R8A8_UNORM => PixelFormat::B8G8R8A8_UNORM,
        vk::Format::R8G8B8A8_UNORM => PixelFormat::R8G8B8A8_UNORM,
        vk::Format::B8G8R8A8_SRGB => PixelFormat::B8G8R8A8_SRGB,
        vk::Format::R8G8B8A8_SRGB => PixelFormat::R8G8B8A8_SRGB,
        vk::Format::A8B8G8R8_SRGB_PACK32 => PixelFormat::A8B8G8R8_SRGB,
        _ => PixelFormat::Unknown,
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
