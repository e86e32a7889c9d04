use ash::vk;
use smallvec::SmallVec;

/// Queue family assignment for one physical device, as found by the probe.
/// A family that was not found stays `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// Both families, or `None` while either is unassigned.
    pub fn complete(&self) -> Option<QueueFamilies> {
        match (self.graphics, self.present) {
            (Some(graphics), Some(present)) => Some(QueueFamilies { graphics, present }),
            _ => None,
        }
    }
}

/// Fully assigned queue families. Only this type reaches device and swapchain creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilies {
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// Distinct family indices, graphics first. One entry when both roles share a family.
    pub fn unique(&self) -> SmallVec<[u32; 2]> {
        let mut families = SmallVec::new();
        families.push(self.graphics);
        if !self.is_shared() {
            families.push(self.present);
        }
        families
    }
}

/// Scans `families` and records the first family exposing each capability.
/// Presentation is tested per family through `supports_present`, independently of graphics.
pub fn find_queue_families<F>(
    families: &[vk::QueueFamilyProperties],
    mut supports_present: F,
) -> QueueFamilyIndices
where
    F: FnMut(u32) -> bool,
{
    let mut indices = QueueFamilyIndices::default();

    for (i, family) in families.iter().enumerate() {
        let i = i as u32;
        if indices.graphics.is_none() && family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            indices.graphics = Some(i);
        }
        if indices.present.is_none() && supports_present(i) {
            indices.present = Some(i);
        }
        if indices.is_complete() {
            break;
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn unset_indices_are_incomplete() {
        let indices = QueueFamilyIndices::default();
        assert!(!indices.is_complete());
        assert_eq!(indices.complete(), None);

        let half = QueueFamilyIndices { graphics: Some(0), present: None };
        assert!(!half.is_complete());
        assert_eq!(half.complete(), None);
    }

    #[test]
    fn index_zero_counts_as_set() {
        let indices = QueueFamilyIndices { graphics: Some(0), present: Some(0) };
        assert_eq!(indices.complete(), Some(QueueFamilies { graphics: 0, present: 0 }));
    }

    #[test]
    fn unique_collapses_shared_family() {
        let shared = QueueFamilies { graphics: 2, present: 2 };
        assert!(shared.is_shared());
        assert_eq!(shared.unique().as_slice(), &[2]);

        let split = QueueFamilies { graphics: 0, present: 1 };
        assert_eq!(split.unique().as_slice(), &[0, 1]);
    }

    #[test]
    fn finds_first_family_for_each_role() {
        let families = [
            family(vk::QueueFlags::TRANSFER),
            family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE),
            family(vk::QueueFlags::GRAPHICS),
            family(vk::QueueFlags::COMPUTE),
        ];

        let indices = find_queue_families(&families, |i| i == 3 || i == 2);
        assert_eq!(indices.graphics, Some(1));
        assert_eq!(indices.present, Some(2));
    }

    #[test]
    fn stops_scanning_once_complete() {
        let families = [
            family(vk::QueueFlags::GRAPHICS),
            family(vk::QueueFlags::GRAPHICS),
            family(vk::QueueFlags::GRAPHICS),
        ];
        let mut queried = Vec::new();

        let indices = find_queue_families(&families, |i| {
            queried.push(i);
            true
        });

        assert_eq!(indices.complete(), Some(QueueFamilies { graphics: 0, present: 0 }));
        assert_eq!(queried, vec![0]);
    }

    #[test]
    fn missing_present_support_leaves_present_unset() {
        let families = [family(vk::QueueFlags::GRAPHICS)];
        let indices = find_queue_families(&families, |_| false);
        assert_eq!(indices.graphics, Some(0));
        assert_eq!(indices.present, None);
    }
}
