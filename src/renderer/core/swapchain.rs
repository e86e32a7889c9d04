use ash::prelude::VkResult;
use ash::vk;
use smallvec::SmallVec;
use crate::renderer::core::error::BringUpError;
use crate::renderer::core::probe::SurfaceSupport;
use crate::renderer::core::queue::QueueFamilies;

/// Presentable image ring plus one view per image.
/// The images belong to the swapchain; the views are created here.
#[derive(Debug)]
pub struct Swapchain {
    pub handle: vk::SwapchainKHR,
    pub format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
}

impl Swapchain {
    pub fn new(
        swapchain_loader: &ash::khr::swapchain::Device,
        device: &ash::Device,
        surface: vk::SurfaceKHR,
        support: &SurfaceSupport,
        queue_families: QueueFamilies,
        default_extent: vk::Extent2D,
    ) -> Result<Self, BringUpError> {
        let format = choose_surface_format(&support.formats)
            .ok_or(BringUpError::SwapchainCreation(vk::Result::ERROR_FORMAT_NOT_SUPPORTED))?;
        let present_mode = choose_present_mode(&support.present_modes);
        let extent = choose_extent(&support.capabilities, default_extent);
        let min_image_count = choose_image_count(&support.capabilities);
        let (sharing_mode, sharing_families) = choose_sharing(queue_families);

        let swapchain_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(min_image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(&sharing_families)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(choose_composite_alpha(&support.capabilities))
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());

        let handle = unsafe {
            swapchain_loader
                .create_swapchain(&swapchain_info, None)
                .map_err(BringUpError::SwapchainCreation)?
        };

        // The driver may return more images than requested
        let images = match unsafe { swapchain_loader.get_swapchain_images(handle) } {
            Ok(images) => images,
            Err(e) => {
                unsafe {
                    swapchain_loader.destroy_swapchain(handle, None);
                }
                return Err(BringUpError::SwapchainCreation(e));
            }
        };

        let image_views = create_image_views(
            &images,
            format.format,
            |info| unsafe { device.create_image_view(info, None) },
            |view| unsafe { device.destroy_image_view(view, None) },
        );
        let image_views = match image_views {
            Ok(views) => views,
            Err(e) => {
                unsafe {
                    swapchain_loader.destroy_swapchain(handle, None);
                }
                return Err(e);
            }
        };

        log::info!(
            "Created swapchain: {:?}/{:?}, {:?}, {}x{}, {} image(s) (requested {})",
            format.format,
            format.color_space,
            present_mode,
            extent.width,
            extent.height,
            images.len(),
            min_image_count,
        );

        Ok(Self {
            handle,
            format,
            present_mode,
            extent,
            images,
            image_views,
        })
    }
}

/// Prefers BGRA8 sRGB with a nonlinear sRGB color space, otherwise the first entry.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first().copied())
}

/// Mailbox when offered, else FIFO, which every surface supports.
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    present_modes
        .iter()
        .copied()
        .find(|m| *m == vk::PresentModeKHR::MAILBOX)
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    default_extent: vk::Extent2D,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    // min-then-max; `clamp` panics on an inverted range
    vk::Extent2D {
        width: default_extent
            .width
            .min(capabilities.max_image_extent.width)
            .max(capabilities.min_image_extent.width),
        height: default_extent
            .height
            .min(capabilities.max_image_extent.height)
            .max(capabilities.min_image_extent.height),
    }
}

/// One more than the minimum, capped by a nonzero maximum (zero means unbounded).
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut image_count = capabilities.min_image_count.saturating_add(1);
    if capabilities.max_image_count > 0 {
        image_count = image_count.min(capabilities.max_image_count);
    }
    image_count
}

/// Opaque when the surface allows it, else the first blend mode it does support.
pub fn choose_composite_alpha(capabilities: &vk::SurfaceCapabilitiesKHR) -> vk::CompositeAlphaFlagsKHR {
    [
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
    ]
    .into_iter()
    .find(|mode| capabilities.supported_composite_alpha.contains(*mode))
    .unwrap_or(vk::CompositeAlphaFlagsKHR::INHERIT)
}

/// Whether the surface's current extent calls for a new swapchain.
///
/// Without a swapchain any nonzero extent does. Otherwise an undefined extent (`u32::MAX`)
/// never does, and a zero-area surface (minimized)
/// is skipped until it has a size again.
pub fn needs_recreation(current: vk::Extent2D, existing: Option<vk::Extent2D>) -> bool {
    if current.width == 0 || current.height == 0 {
        return false;
    }
    match existing {
        Some(extent) => current.width != u32::MAX && current != extent,
        None => true,
    }
}

/// Concurrent access only when graphics and present really are different families.
pub fn choose_sharing(queue_families: QueueFamilies) -> (vk::SharingMode, SmallVec<[u32; 2]>) {
    if queue_families.is_shared() {
        (vk::SharingMode::EXCLUSIVE, SmallVec::new())
    } else {
        (vk::SharingMode::CONCURRENT, queue_families.unique())
    }
}

/// Creates one color view per image. On failure the views created so far are destroyed.
fn create_image_views<C, D>(
    images: &[vk::Image],
    format: vk::Format,
    mut create: C,
    mut destroy: D,
) -> Result<Vec<vk::ImageView>, BringUpError>
where
    C: FnMut(&vk::ImageViewCreateInfo) -> VkResult<vk::ImageView>,
    D: FnMut(vk::ImageView),
{
    let mut views = Vec::with_capacity(images.len());

    for image in images {
        let view_info = vk::ImageViewCreateInfo::default()
            .image(*image)
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

        match create(&view_info) {
            Ok(view) => views.push(view),
            Err(e) => {
                for view in views.drain(..).rev() {
                    destroy(view);
                }
                return Err(BringUpError::ImageViewCreation(e));
            }
        }
    }

    Ok(views)
}
