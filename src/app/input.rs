use bevy::prelude::*;
use crossbeam_channel::TryRecvError;
use memory_ascension::console::execute_line;
use tracing::{debug, info};

use super::resources::{ConsoleInput, ConsoleOutput, SessionState};

pub fn drain_console_input(
    mut input: ResMut<ConsoleInput>,
    mut session: ResMut<SessionState>,
    mut output: EventWriter<ConsoleOutput>,
) {
    if input.closed {
        return;
    }
    let session = &mut *session;
    loop {
        match input.lines.try_recv() {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                debug!(%line, "console input");
                let reply = execute_line(&mut session.simulation, session.storage.as_mut(), &line);
                output.send(ConsoleOutput(reply));
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                info!("console input closed");
                input.closed = true;
                break;
            }
        }
    }
}
