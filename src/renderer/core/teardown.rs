use ash::vk;

/// A resource confirmed created during bring-up.
/// Instance and device are owned by their loaders, so they carry no handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    Instance,
    DebugMessenger(vk::DebugUtilsMessengerEXT),
    Surface(vk::SurfaceKHR),
    Device,
    Swapchain(vk::SwapchainKHR),
    ImageView(vk::ImageView),
}

impl Acquired {
    /// Lower ranks are destroyed first.
    fn teardown_rank(&self) -> u8 {
        match self {
            Acquired::ImageView(_) => 0,
            Acquired::Swapchain(_) => 1,
            Acquired::Device => 2,
            Acquired::DebugMessenger(_) => 3,
            Acquired::Surface(_) => 4,
            Acquired::Instance => 5,
        }
    }
}

pub trait ResourceDestroyer {
    fn destroy(&mut self, resource: Acquired);
}

/// Creation-ordered record of everything the context owns
#[derive(Debug, Default)]
pub struct ResourceLedger {
    acquired: Vec<Acquired>,
}

impl ResourceLedger {
    pub fn record(&mut self, resource: Acquired) {
        self.acquired.push(resource);
    }

    /// Position to later unwind back to.
    pub fn mark(&self) -> usize {
        self.acquired.len()
    }

    pub fn len(&self) -> usize {
        self.acquired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquired.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Acquired> {
        self.acquired.iter()
    }

    /// Destroys everything recorded after `mark`, newest first.
    pub fn unwind_to(&mut self, mark: usize, destroyer: &mut dyn ResourceDestroyer) {
        while self.acquired.len() > mark {
            if let Some(resource) = self.acquired.pop() {
                destroyer.destroy(resource);
            }
        }
    }

    /// Destroys every recorded resource and leaves the ledger empty.
    /// Order is reverse acquisition, except that the debug messenger goes before the surface.
    pub fn teardown(&mut self, destroyer: &mut dyn ResourceDestroyer) {
        let mut order = std::mem::take(&mut self.acquired);
        order.reverse();
        // Stable: equal ranks keep reverse-acquisition order
        order.sort_by_key(Acquired::teardown_rank);

        for resource in order {
            destroyer.destroy(resource);
        }
    }

    /// Tears down after a failed bring-up step and hands `error` back to the caller.
    pub fn abandon<E: std::fmt::Display>(
        &mut self,
        destroyer: &mut dyn ResourceDestroyer,
        error: E,
    ) -> E {
        log::error!("Bring-up failed, releasing {} resource(s): {}", self.len(), error);
        self.teardown(destroyer);
        error
    }
}

/// Destroys resources through the live loaders of a graphics context.
/// Device-level loaders are absent when bring-up fails before the logical device exists.
pub struct VulkanDestroyer<'a> {
    pub instance: &'a ash::Instance,
    pub debug_utils: Option<&'a ash::ext::debug_utils::Instance>,
    pub surface_loader: Option<&'a ash::khr::surface::Instance>,
    pub device: Option<&'a ash::Device>,
    pub swapchain_loader: Option<&'a ash::khr::swapchain::Device>,
}

impl<'a> VulkanDestroyer<'a> {
    /// Destroyer for the instance-level resources recorded before device creation.
    pub fn instance_level(
        instance: &'a ash::Instance,
        debug_utils: Option<&'a ash::ext::debug_utils::Instance>,
        surface_loader: Option<&'a ash::khr::surface::Instance>,
    ) -> Self {
        Self {
            instance,
            debug_utils,
            surface_loader,
            device: None,
            swapchain_loader: None,
        }
    }
}

impl ResourceDestroyer for VulkanDestroyer<'_> {
    fn destroy(&mut self, resource: Acquired) {
        log::debug!("Destroying {:?}", resource);
        unsafe {
            match resource {
                Acquired::ImageView(view) => {
                    if let Some(device) = self.device {
                        device.destroy_image_view(view, None);
                    }
                }
                Acquired::Swapchain(swapchain) => {
                    if let Some(swapchain_loader) = self.swapchain_loader {
                        swapchain_loader.destroy_swapchain(swapchain, None);
                    }
                }
                Acquired::Device => {
                    if let Some(device) = self.device {
                        device.destroy_device(None);
                    }
                }
                Acquired::DebugMessenger(messenger) => {
                    if let Some(debug_utils) = self.debug_utils {
                        debug_utils.destroy_debug_utils_messenger(messenger, None);
                    }
                }
                Acquired::Surface(surface) => {
                    if let Some(surface_loader) = self.surface_loader {
                        surface_loader.destroy_surface(surface, None);
                    }
                }
                Acquired::Instance => {
                    self.instance.destroy_instance(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[derive(Default)]
    struct RecordingDestroyer {
        destroyed: Vec<Acquired>,
    }

    impl ResourceDestroyer for RecordingDestroyer {
        fn destroy(&mut self, resource: Acquired) {
            self.destroyed.push(resource);
        }
    }

    fn view(raw: u64) -> Acquired {
        Acquired::ImageView(vk::ImageView::from_raw(raw))
    }

    fn bring_up_ledger(with_debug: bool) -> ResourceLedger {
        let mut ledger = ResourceLedger::default();
        ledger.record(Acquired::Instance);
        if with_debug {
            ledger.record(Acquired::DebugMessenger(vk::DebugUtilsMessengerEXT::from_raw(2)));
        }
        ledger.record(Acquired::Surface(vk::SurfaceKHR::from_raw(3)));
        ledger.record(Acquired::Device);
        ledger.record(Acquired::Swapchain(vk::SwapchainKHR::from_raw(5)));
        ledger.record(view(10));
        ledger.record(view(11));
        ledger.record(view(12));
        ledger
    }

    #[test]
    fn teardown_reverses_bring_up() {
        let mut ledger = bring_up_ledger(true);
        let mut destroyer = RecordingDestroyer::default();

        ledger.teardown(&mut destroyer);

        assert_eq!(
            destroyer.destroyed,
            vec![
                view(12),
                view(11),
                view(10),
                Acquired::Swapchain(vk::SwapchainKHR::from_raw(5)),
                Acquired::Device,
                Acquired::DebugMessenger(vk::DebugUtilsMessengerEXT::from_raw(2)),
                Acquired::Surface(vk::SurfaceKHR::from_raw(3)),
                Acquired::Instance,
            ]
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn teardown_without_diagnostics_skips_debug_messenger() {
        let mut ledger = bring_up_ledger(false);
        let mut destroyer = RecordingDestroyer::default();

        ledger.teardown(&mut destroyer);

        assert_eq!(destroyer.destroyed.len(), 7);
        assert!(!destroyer
            .destroyed
            .iter()
            .any(|r| matches!(r, Acquired::DebugMessenger(_))));
        assert_eq!(destroyer.destroyed.last(), Some(&Acquired::Instance));
    }

    #[test]
    fn second_teardown_destroys_nothing() {
        let mut ledger = bring_up_ledger(true);
        let mut destroyer = RecordingDestroyer::default();

        ledger.teardown(&mut destroyer);
        let first = destroyer.destroyed.len();
        ledger.teardown(&mut destroyer);

        assert_eq!(destroyer.destroyed.len(), first);
    }

    #[test]
    fn partial_ledger_only_destroys_what_was_recorded() {
        let mut ledger = ResourceLedger::default();
        ledger.record(Acquired::Instance);
        ledger.record(Acquired::Surface(vk::SurfaceKHR::from_raw(3)));
        let mut destroyer = RecordingDestroyer::default();

        ledger.teardown(&mut destroyer);

        assert_eq!(
            destroyer.destroyed,
            vec![Acquired::Surface(vk::SurfaceKHR::from_raw(3)), Acquired::Instance]
        );
    }

    #[test]
    fn abandoned_bring_up_destroys_instance_level_resources() {
        let mut ledger = ResourceLedger::default();
        ledger.record(Acquired::Instance);
        ledger.record(Acquired::DebugMessenger(vk::DebugUtilsMessengerEXT::from_raw(2)));
        ledger.record(Acquired::Surface(vk::SurfaceKHR::from_raw(3)));
        let mut destroyer = RecordingDestroyer::default();

        let err = ledger.abandon(&mut destroyer, vk::Result::ERROR_INITIALIZATION_FAILED);

        assert_eq!(err, vk::Result::ERROR_INITIALIZATION_FAILED);
        assert_eq!(
            destroyer.destroyed,
            vec![
                Acquired::DebugMessenger(vk::DebugUtilsMessengerEXT::from_raw(2)),
                Acquired::Surface(vk::SurfaceKHR::from_raw(3)),
                Acquired::Instance,
            ]
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn unwind_to_mark_releases_only_newer_entries() {
        let mut ledger = ResourceLedger::default();
        ledger.record(Acquired::Instance);
        ledger.record(Acquired::Device);
        let mark = ledger.mark();
        ledger.record(Acquired::Swapchain(vk::SwapchainKHR::from_raw(5)));
        ledger.record(view(10));
        ledger.record(view(11));
        let mut destroyer = RecordingDestroyer::default();

        ledger.unwind_to(mark, &mut destroyer);

        assert_eq!(
            destroyer.destroyed,
            vec![view(11), view(10), Acquired::Swapchain(vk::SwapchainKHR::from_raw(5))]
        );
        assert_eq!(ledger.len(), 2);
        assert_eq!(
            ledger.iter().copied().collect::<Vec<_>>(),
            vec![Acquired::Instance, Acquired::Device]
        );
    }
}
