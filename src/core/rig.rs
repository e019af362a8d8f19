use tracing::info;

use crate::data::Catalog;

use super::error::RigError;
use super::state::MetaState;

/// Permanent computing stats plus the bonuses of installed parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigStats {
    pub processing_power: u32,
    pub speed: f64,
    pub memory: u32,
    pub storage_slots: u32,
}

impl RigStats {
    /// Concurrent program slots.
    pub fn program_capacity(&self) -> u32 {
        self.processing_power.max(1)
    }

    /// Factor applied to automatic bit generation.
    pub fn speed_factor(&self) -> f64 {
        1.0 + self.speed * 0.1
    }
}

pub fn effective_stats(meta: &MetaState, catalog: &Catalog) -> RigStats {
    let mut stats = RigStats {
        processing_power: meta.processing_power,
        speed: meta.speed,
        memory: meta.memory,
        storage_slots: meta.storage_slots,
    };
    for part in meta
        .installed_parts
        .iter()
        .filter_map(|id| catalog.part(id))
    {
        stats.processing_power += part.effects.processing_power;
        stats.speed += part.effects.speed;
        stats.memory += part.effects.memory;
    }
    stats
}

pub fn install_part(meta: &mut MetaState, catalog: &Catalog, id: &str) -> Result<(), RigError> {
    let part = catalog
        .part(id)
        .ok_or_else(|| RigError::Unknown(id.to_string()))?;
    if meta.installed_parts.iter().any(|installed| installed == id) {
        return Err(RigError::AlreadyInstalled(id.to_string()));
    }
    if meta.installed_parts.len() >= meta.storage_slots as usize {
        return Err(RigError::NoFreeSlot(meta.storage_slots));
    }
    meta.installed_parts.push(part.id.clone());
    info!(part = %part.id, "part installed");
    Ok(())
}

pub fn uninstall_part(meta: &mut MetaState, id: &str) -> Result<(), RigError> {
    let index = meta
        .installed_parts
        .iter()
        .position(|installed| installed == id)
        .ok_or_else(|| RigError::NotInstalled(id.to_string()))?;
    meta.installed_parts.remove(index);
    info!(part = %id, "part uninstalled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{effective_stats, install_part, uninstall_part};
    use crate::core::error::RigError;
    use crate::core::state::MetaState;
    use crate::data::Catalog;

    #[test]
    fn installs_are_bounded_by_storage_slots() {
        let catalog = Catalog::bundled().expect("catalog");
        let mut meta = MetaState::default();

        install_part(&mut meta, &catalog, "cpu").expect("first slot");
        assert_eq!(
            install_part(&mut meta, &catalog, "gpu"),
            Err(RigError::NoFreeSlot(1))
        );
        assert_eq!(
            install_part(&mut meta, &catalog, "cpu"),
            Err(RigError::AlreadyInstalled("cpu".to_string()))
        );
        assert_eq!(
            install_part(&mut meta, &catalog, "floppy"),
            Err(RigError::Unknown("floppy".to_string()))
        );

        meta.storage_slots = 2;
        install_part(&mut meta, &catalog, "mobo").expect("second slot");
        assert_eq!(meta.installed_parts, vec!["cpu".to_string(), "mobo".to_string()]);
    }

    #[test]
    fn effective_stats_add_part_bonuses_to_permanent_stats() {
        let catalog = Catalog::bundled().expect("catalog");
        let mut meta = MetaState {
            storage_slots: 2,
            ..MetaState::default()
        };
        install_part(&mut meta, &catalog, "cpu").expect("cpu");
        install_part(&mut meta, &catalog, "network").expect("network");

        let stats = effective_stats(&meta, &catalog);

        assert_eq!(stats.processing_power, 4);
        assert_eq!(stats.program_capacity(), 4);
        assert_eq!(stats.memory, 20);
        assert!((stats.speed - 1.1).abs() < 1e-9);
        assert!((stats.speed_factor() - 1.11).abs() < 1e-9);
        assert_eq!(meta.processing_power, 0);
    }

    #[test]
    fn uninstall_frees_the_slot() {
        let catalog = Catalog::bundled().expect("catalog");
        let mut meta = MetaState::default();
        install_part(&mut meta, &catalog, "ram").expect("ram");

        uninstall_part(&mut meta, "ram").expect("uninstall");

        assert!(meta.installed_parts.is_empty());
        assert_eq!(
            uninstall_part(&mut meta, "ram"),
            Err(RigError::NotInstalled("ram".to_string()))
        );
        assert_eq!(effective_stats(&meta, &catalog).program_capacity(), 1);
    }
}
