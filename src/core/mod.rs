mod conversion;
mod effects;
mod error;
mod hooks;
mod prestige;
mod programs;
mod resource_store;
mod rig;
mod simulation;
mod state;

pub use conversion::{
    Conversion, ConversionReceipt, MAX_DIMINISHING, affordable_units, conversion_rate,
    diminishing_factor, effective_gain,
};
pub use effects::{EffectContext, TemporaryBoost, apply_effect, apply_effect_logged};
pub use error::{
    ConversionError, EffectError, PrestigeError, ProgramError, PurchaseError, RigError,
};
pub use hooks::{CONVERSION_COUNT_WRAP, HookKey, PassiveHook, PassiveHookRegistry};
pub use prestige::{
    BASE_CYCLE_THRESHOLD, COMPUTING_UNLOCK_CYCLES, CycleProgress, RecompileOutcome,
    calculate_prestige, computing_prestige_cost, cycle_progress,
};
pub use programs::{LaunchLimits, ProgramExecutor, ProgramStatus, ProgramSummary, RunningProgram};
pub use resource_store::{ResourceStore, TickDeltas};
pub use rig::RigStats;
pub use simulation::{DEFAULT_TICK_MILLIS, PendingEffect, Simulation, Snapshot};
pub use state::{
    AutoConvertToggle, AutomationState, DEFAULT_CONVERSION_SPEED, GameState, GenerationState,
    MetaState,
};
