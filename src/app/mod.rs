mod input;
mod resources;
mod setup;
mod simulation;
mod state;
mod view;

use bevy::prelude::*;

pub use resources::RuntimeConfig;
use resources::ConsoleOutput;
use state::{AppPhase, SimRunState};

pub struct MemoryAppPlugin;

impl Plugin for MemoryAppPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppPhase>()
            .init_state::<SimRunState>()
            .init_resource::<RuntimeConfig>()
            .add_event::<ConsoleOutput>()
            .add_systems(Startup, setup::spawn_console_reader)
            .add_systems(OnEnter(AppPhase::Boot), setup::bootstrap_session)
            .add_systems(OnEnter(SimRunState::Running), simulation::mark_sim_running)
            .add_systems(OnEnter(SimRunState::Paused), simulation::mark_sim_paused)
            .add_systems(
                Update,
                (
                    input::drain_console_input,
                    simulation::sync_run_state,
                    simulation::tick_simulation.run_if(in_state(SimRunState::Running)),
                    simulation::autosave_session,
                    view::print_console_output,
                )
                    .chain()
                    .run_if(in_state(AppPhase::InGame)),
            )
            .add_systems(Last, simulation::save_on_exit);
    }
}
