use bevy::prelude::*;

/// `Boot` loads the catalog and the save; console input and ticking only
/// happen once the session reaches `InGame`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum AppPhase {
    #[default]
    Boot,
    InGame,
}

/// Follows `Simulation::paused`. The console `pause` and `resume` verbs flip
/// the flag on the simulation, `sync_run_state` moves this state to match,
/// and `tick_simulation` only runs while `Running`. A save restored as paused
/// boots straight into `Paused`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum SimRunState {
    #[default]
    Running,
    Paused,
}
