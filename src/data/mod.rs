mod loader;
mod part_data;
mod program_data;
mod upgrade_data;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};

use crate::model::Tier;

pub use loader::{
    PARTS_FILE_NAME, PROGRAMS_FILE_NAME, UPGRADES_FILE_NAME, bundled_part_data,
    bundled_program_data, bundled_upgrade_data, load_part_data_from_path,
    load_program_data_from_path, load_upgrade_data_from_path,
};
pub use part_data::{PartDataFile, PartDefinition, PartEffects};
pub use program_data::{ProgramDataFile, ProgramDefinition, ProgramSchema};
pub use upgrade_data::{TierSchema, UpgradeDataFile, UpgradeDefinition};

/// Validated, read-only view over the upgrade, program and part catalogs.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    tiers: Vec<TierSchema>,
    schemas: Vec<ProgramSchema>,
    programs: Vec<ProgramDefinition>,
    parts: Vec<PartDefinition>,
}

impl Catalog {
    pub fn new(
        upgrades: UpgradeDataFile,
        programs: ProgramDataFile,
        parts: PartDataFile,
    ) -> Result<Self> {
        let mut tiers = upgrades.tiers;
        tiers.sort_by_key(|schema| schema.tier);
        let catalog = Self {
            tiers,
            schemas: programs.schemas,
            programs: programs.programs,
            parts: parts.parts,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Catalog compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::new(
            bundled_upgrade_data()?,
            bundled_program_data()?,
            bundled_part_data()?,
        )
        .context("bundled catalog is invalid")
    }

    /// Loads `upgrades.json`, `programs.json` and `parts.json` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::new(
            load_upgrade_data_from_path(dir.join(UPGRADES_FILE_NAME))?,
            load_program_data_from_path(dir.join(PROGRAMS_FILE_NAME))?,
            load_part_data_from_path(dir.join(PARTS_FILE_NAME))?,
        )
        .with_context(|| format!("catalog in {} is invalid", dir.display()))
    }

    pub fn tiers(&self) -> &[TierSchema] {
        &self.tiers
    }

    pub fn tier_schema(&self, tier: Tier) -> Option<&TierSchema> {
        self.tiers.iter().find(|schema| schema.tier == tier)
    }

    pub fn reveal_threshold(&self, tier: Tier) -> Option<f64> {
        self.tier_schema(tier).map(|schema| schema.threshold)
    }

    /// Every upgrade with the tier whose currency pays for it, bit tier first.
    pub fn upgrades_in_tier_order(&self) -> impl Iterator<Item = (Tier, &UpgradeDefinition)> {
        self.tiers
            .iter()
            .flat_map(|schema| schema.upgrades.iter().map(move |upgrade| (schema.tier, upgrade)))
    }

    pub fn upgrade(&self, key: &str) -> Option<(Tier, &UpgradeDefinition)> {
        self.upgrades_in_tier_order()
            .find(|(_, upgrade)| upgrade.key == key)
    }

    pub fn schemas(&self) -> &[ProgramSchema] {
        &self.schemas
    }

    pub fn programs(&self) -> &[ProgramDefinition] {
        &self.programs
    }

    pub fn program(&self, key: &str) -> Option<&ProgramDefinition> {
        self.programs.iter().find(|program| program.key == key)
    }

    pub fn schema_for_program(&self, key: &str) -> Option<&ProgramSchema> {
        self.schemas
            .iter()
            .find(|schema| schema.programs.iter().any(|program| program == key))
    }

    pub fn parts(&self) -> &[PartDefinition] {
        &self.parts
    }

    pub fn part(&self, id: &str) -> Option<&PartDefinition> {
        self.parts.iter().find(|part| part.id == id)
    }

    fn validate(&self) -> Result<()> {
        let mut seen_tiers = BTreeSet::new();
        let mut upgrade_keys = BTreeSet::new();
        for schema in &self.tiers {
            ensure!(
                seen_tiers.insert(schema.tier),
                "tier {} is described twice",
                schema.tier
            );
            for upgrade in &schema.upgrades {
                ensure!(
                    upgrade_keys.insert(upgrade.key.as_str()),
                    "duplicate upgrade key '{}'",
                    upgrade.key
                );
                ensure!(
                    upgrade.cost.is_finite() && upgrade.cost >= 0.0,
                    "upgrade '{}' has an invalid cost",
                    upgrade.key
                );
            }
        }

        let mut program_keys = BTreeSet::new();
        for program in &self.programs {
            ensure!(
                program_keys.insert(program.key.as_str()),
                "duplicate program key '{}'",
                program.key
            );
            match (program.permanent, program.duration) {
                (true, Some(_)) => bail!("permanent program '{}' has a duration", program.key),
                (false, None) => bail!("program '{}' has no duration", program.key),
                (false, Some(0)) => bail!("program '{}' has a zero duration", program.key),
                _ => {}
            }
            ensure!(
                self.schema_for_program(&program.key).is_some(),
                "program '{}' is not listed by any schema",
                program.key
            );
        }
        for schema in &self.schemas {
            for key in &schema.programs {
                ensure!(
                    program_keys.contains(key.as_str()),
                    "schema '{}' lists unknown program '{key}'",
                    schema.key
                );
            }
        }

        let mut part_ids = BTreeSet::new();
        for part in &self.parts {
            ensure!(
                part_ids.insert(part.id.as_str()),
                "duplicate part id '{}'",
                part.id
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, PartDataFile, ProgramDataFile, bundled_program_data, bundled_upgrade_data};
    use crate::model::{Effect, Tier};

    #[test]
    fn bundled_data_files_have_entries() {
        let catalog = Catalog::bundled().expect("bundled catalog should load");

        assert_eq!(catalog.tiers().len(), Tier::ALL.len());
        assert!(catalog.upgrades_in_tier_order().count() > 40);
        assert_eq!(catalog.programs().len(), 7);
        assert_eq!(catalog.parts().len(), 8);
    }

    #[test]
    fn asset_directory_matches_bundled_catalog() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/data");

        let catalog = Catalog::from_dir(&dir).expect("asset directory should load");

        assert_eq!(catalog, Catalog::bundled().expect("bundled catalog"));
    }

    #[test]
    fn upgrades_resolve_to_their_paying_tier() {
        let catalog = Catalog::bundled().expect("bundled catalog should load");

        let (tier, upgrade) = catalog.upgrade("nibbleShift").expect("known upgrade");
        assert_eq!(tier, Tier::Nibble);
        assert_eq!(upgrade.cost, 200.0);
        assert!(matches!(upgrade.effect, Effect::ConversionBonus { per_amount: 10, .. }));

        let order = catalog
            .upgrades_in_tier_order()
            .map(|(tier, _)| tier)
            .collect::<Vec<_>>();
        assert!(order.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn programs_belong_to_a_schema() {
        let catalog = Catalog::bundled().expect("bundled catalog should load");

        let schema = catalog
            .schema_for_program("backgroundEncryptor")
            .expect("listed program");
        assert_eq!(schema.unlock_threshold, 150.0);
        let program = catalog.program("backgroundEncryptor").expect("known program");
        assert!(program.permanent);
        assert_eq!(program.duration, None);
        assert_eq!(catalog.program("optimizeMemory").and_then(|p| p.duration), Some(30));
    }

    #[test]
    fn orphaned_programs_are_rejected() {
        let upgrades = bundled_upgrade_data().expect("upgrades");
        let mut programs = bundled_program_data().expect("programs");
        programs.schemas.clear();

        let result = Catalog::new(upgrades, programs, PartDataFile { parts: Vec::new() });

        assert!(result.is_err());
    }

    #[test]
    fn duplicate_upgrade_keys_are_rejected() {
        let mut upgrades = bundled_upgrade_data().expect("upgrades");
        let copy = upgrades.tiers[0].upgrades[0].clone();
        upgrades.tiers[1].upgrades.push(copy);

        let result = Catalog::new(
            upgrades,
            ProgramDataFile { schemas: Vec::new(), programs: Vec::new() },
            PartDataFile { parts: Vec::new() },
        );

        assert!(result.is_err());
    }
}
