use ash::vk;
use crate::renderer::api::NativeWindow;
use crate::renderer::config::RenderConfig;
use crate::renderer::core::device::{create_logical_device, get_required_device_extensions};
use crate::renderer::core::error::{BringUpError, InstanceCreationError};
use crate::renderer::core::instance::{create_debug_utils_messenger, create_instance, create_surface};
use crate::renderer::core::probe::{CapabilityProbe, SurfaceSupport, VulkanProbe};
use crate::renderer::core::queue::QueueFamilies;
use crate::renderer::core::selector::select_from_enumeration;
use crate::renderer::core::swapchain::{needs_recreation, Swapchain};
use crate::renderer::core::teardown::{Acquired, ResourceLedger, VulkanDestroyer};

/// Owns every Vulkan object created during bring-up, down to the swapchain image views.
/// Everything is destroyed when the context is dropped.
pub struct GraphicsContext {
    pub instance: ash::Instance,
    pub surface: vk::SurfaceKHR,
    pub physical_device: vk::PhysicalDevice,
    pub queue_families: QueueFamilies,
    pub device: ash::Device,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,

    surface_loader: ash::khr::surface::Instance,
    debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
    swapchain_loader: ash::khr::swapchain::Device,
    swapchain: Option<Swapchain>,
    swapchain_mark: usize,
    default_extent: vk::Extent2D,

    ledger: ResourceLedger,

    // Keeps the Vulkan library loaded; must outlive every handle above
    _entry: ash::Entry,
}

impl GraphicsContext {
    /// Runs the full bring-up: instance, debug messenger, surface, device selection,
    /// logical device and queues, then the swapchain and its image views.
    pub fn new(
        window: &dyn NativeWindow,
        config: &RenderConfig,
    ) -> Result<Self, BringUpError> {
        let entry = unsafe {
            ash::Entry::load().map_err(InstanceCreationError::from)?
        };

        let instance = create_instance(&entry, window, config)?;
        let mut ledger = ResourceLedger::default();
        ledger.record(Acquired::Instance);

        // Until the context exists, a failed step releases what the ledger holds so far
        let debug_utils = if config.enable_validation {
            let (loader, messenger) = create_debug_utils_messenger(&entry, &instance)
                .map_err(|e| {
                    ledger.abandon(&mut VulkanDestroyer::instance_level(&instance, None, None), e)
                })?;
            ledger.record(Acquired::DebugMessenger(messenger));
            Some((loader, messenger))
        } else {
            None
        };
        let debug_loader = debug_utils.as_ref().map(|(loader, _)| loader);

        let (surface, surface_loader) = create_surface(&entry, &instance, window)
            .map_err(|e| {
                ledger.abandon(&mut VulkanDestroyer::instance_level(&instance, debug_loader, None), e)
            })?;
        ledger.record(Acquired::Surface(surface));

        let selected = {
            let probe = VulkanProbe::new(&instance, &surface_loader, surface);
            select_from_enumeration(
                &probe,
                unsafe { instance.enumerate_physical_devices() },
                &get_required_device_extensions(),
            )
        };
        let (selected, (device, graphics_queue, present_queue)) = selected
            .and_then(|selected| {
                let created = create_logical_device(
                    &instance,
                    selected.physical,
                    selected.queue_families,
                )?;
                Ok((selected, created))
            })
            .map_err(|e| {
                let mut destroyer = VulkanDestroyer::instance_level(
                    &instance,
                    debug_loader,
                    Some(&surface_loader),
                );
                ledger.abandon(&mut destroyer, e)
            })?;
        ledger.record(Acquired::Device);

        let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

        let mut ctx = Self {
            instance,
            surface,
            physical_device: selected.physical,
            queue_families: selected.queue_families,
            device,
            graphics_queue,
            present_queue,
            surface_loader,
            debug_utils,
            swapchain_loader,
            swapchain: None,
            swapchain_mark: ledger.mark(),
            default_extent: config.default_extent,
            ledger,
            _entry: entry,
        };

        // From here on a failure drops `ctx`, which tears down what was recorded
        ctx.create_swapchain(&selected.surface)?;

        Ok(ctx)
    }

    pub fn surface_support(&self) -> Result<SurfaceSupport, BringUpError> {
        VulkanProbe::new(&self.instance, &self.surface_loader, self.surface)
            .surface_support(self.physical_device)
            .map_err(BringUpError::SwapchainCreation)
    }

    /// Recreates the swapchain when the surface reports a defined extent that no longer
    /// matches. Returns whether a new swapchain was built.
    ///
    /// Surfaces that leave the current extent undefined never trigger this.
    pub fn refresh_swapchain(&mut self) -> Result<bool, BringUpError> {
        let support = self.surface_support()?;
        let current = support.capabilities.current_extent;

        let existing = self.swapchain.as_ref().map(|swapchain| swapchain.extent);
        if !needs_recreation(current, existing) {
            return Ok(false);
        }

        log::info!("Surface extent changed to {}x{}, recreating swapchain", current.width, current.height);
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(BringUpError::SwapchainCreation)?;
        }
        self.release_swapchain();
        self.create_swapchain(&support)?;
        Ok(true)
    }

    fn create_swapchain(&mut self, support: &SurfaceSupport) -> Result<(), BringUpError> {
        let swapchain = Swapchain::new(
            &self.swapchain_loader,
            &self.device,
            self.surface,
            support,
            self.queue_families,
            self.default_extent,
        )?;

        self.swapchain_mark = self.ledger.mark();
        self.ledger.record(Acquired::Swapchain(swapchain.handle));
        for view in &swapchain.image_views {
            self.ledger.record(Acquired::ImageView(*view));
        }
        self.swapchain = Some(swapchain);

        Ok(())
    }

    /// Destroys the image views, then the swapchain
    fn release_swapchain(&mut self) {
        if self.swapchain.take().is_none() {
            return;
        }
        let mut ledger = std::mem::take(&mut self.ledger);
        ledger.unwind_to(self.swapchain_mark, &mut self.destroyer());
        self.ledger = ledger;
    }

    fn destroyer(&self) -> VulkanDestroyer<'_> {
        VulkanDestroyer {
            instance: &self.instance,
            debug_utils: self.debug_utils.as_ref().map(|(loader, _)| loader),
            surface_loader: Some(&self.surface_loader),
            device: Some(&self.device),
            swapchain_loader: Some(&self.swapchain_loader),
        }
    }
}

impl Drop for GraphicsContext {
    fn drop(&mut self) {
        if let Err(e) = unsafe { self.device.device_wait_idle() } {
            log::warn!("device_wait_idle failed before teardown: {}", e);
        }

        self.swapchain = None;
        let mut ledger = std::mem::take(&mut self.ledger);
        ledger.teardown(&mut self.destroyer());
        log::info!("Graphics context destroyed");
    }
}
