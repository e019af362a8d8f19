mod bridge;
mod codec;
mod model;
mod storage;

pub use bridge::{SaveError, apply_save_data, save_data_from_simulation};
pub use codec::{
    export_to_base64, import_from_base64, import_save, load_from_json_string, save_to_json_string,
};
pub use model::{SAVE_VERSION, SaveData, SaveGeneration, SaveMeta, SaveSystems};
pub use storage::{FileStorage, LoadOutcome, MemoryStorage, SaveStorage, load_or_reset};
