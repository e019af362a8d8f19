pub mod console;
pub mod core;
pub mod data;
pub mod model;
pub mod save;

pub use core::{GameState, ResourceStore, Simulation, Snapshot};
pub use data::Catalog;
pub use model::{ConversionPair, Effect, FeatureFlag, Tier};
pub use save::{SaveData, SaveStorage, apply_save_data, save_data_from_simulation};
