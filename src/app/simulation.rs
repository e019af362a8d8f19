use bevy::prelude::*;
use memory_ascension::save::{SaveStorage, save_data_from_simulation};
use tracing::{info, warn};

use super::resources::SessionState;
use super::state::SimRunState;

pub fn tick_simulation(time: Res<Time>, mut session: ResMut<SessionState>) {
    let steps = session
        .tick_timer
        .tick(time.delta())
        .times_finished_this_tick();

    for _ in 0..steps {
        session.simulation.tick();
    }
}

pub fn sync_run_state(
    session: Res<SessionState>,
    run_state: Res<State<SimRunState>>,
    mut next_run_state: ResMut<NextState<SimRunState>>,
) {
    let wanted = if session.simulation.paused {
        SimRunState::Paused
    } else {
        SimRunState::Running
    };
    if *run_state.get() != wanted {
        next_run_state.set(wanted);
    }
}

pub fn mark_sim_running(session: Option<ResMut<SessionState>>) {
    if let Some(mut session) = session {
        session.simulation.paused = false;
        info!("simulation running");
    }
}

pub fn mark_sim_paused(session: Option<ResMut<SessionState>>) {
    if let Some(mut session) = session {
        session.simulation.paused = true;
        info!("simulation paused");
    }
}

pub fn autosave_session(time: Res<Time>, mut session: ResMut<SessionState>) {
    if !session.autosave_timer.tick(time.delta()).just_finished() {
        return;
    }
    persist(&mut session);
}

pub fn save_on_exit(mut exits: EventReader<AppExit>, session: Option<ResMut<SessionState>>) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut session) = session {
        persist(&mut session);
    }
}

fn persist(session: &mut SessionState) {
    let save = save_data_from_simulation(&session.simulation);
    match session.storage.save(&save) {
        Ok(()) => {
            if session.last_save_error.take().is_some() {
                info!("saving recovered");
            }
        }
        Err(err) => {
            let message = format!("{err:#}");
            if session.last_save_error.as_deref() != Some(message.as_str()) {
                warn!("autosave failed: {message}");
            }
            session.last_save_error = Some(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::prelude::*;
    use bevy::state::app::StatesPlugin;
    use memory_ascension::save::MemoryStorage;
    use memory_ascension::{Catalog, Simulation};

    use super::sync_run_state;
    use crate::app::resources::SessionState;
    use crate::app::state::SimRunState;

    fn session() -> SessionState {
        SessionState {
            simulation: Simulation::new(Arc::new(Catalog::bundled().expect("bundled catalog"))),
            storage: Box::new(MemoryStorage::default()),
            tick_timer: Timer::from_seconds(0.1, TimerMode::Repeating),
            autosave_timer: Timer::from_seconds(3.0, TimerMode::Repeating),
            last_save_error: None,
        }
    }

    fn run_state(app: &App) -> SimRunState {
        *app.world().resource::<State<SimRunState>>().get()
    }

    #[test]
    fn run_state_follows_console_pause_and_resume() {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<SimRunState>()
            .insert_resource(session())
            .add_systems(Update, sync_run_state);

        app.world_mut().resource_mut::<SessionState>().simulation.paused = true;
        app.update();
        app.update();
        assert_eq!(run_state(&app), SimRunState::Paused);

        app.world_mut().resource_mut::<SessionState>().simulation.paused = false;
        app.update();
        app.update();
        assert_eq!(run_state(&app), SimRunState::Running);
    }
}
