use std::io::{self, Write};

use bevy::prelude::*;
use memory_ascension::console::ConsoleAction;

use super::resources::ConsoleOutput;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub fn print_console_output(
    mut replies: EventReader<ConsoleOutput>,
    mut exit: EventWriter<AppExit>,
) {
    let mut stdout = io::stdout().lock();
    for ConsoleOutput(reply) in replies.read() {
        if reply.action == ConsoleAction::Clear {
            let _ = write!(stdout, "{CLEAR_SCREEN}");
        }
        for line in &reply.lines {
            let _ = writeln!(stdout, "{line}");
        }
        if reply.action == ConsoleAction::Exit {
            exit.send(AppExit::Success);
        }
    }
    let _ = stdout.flush();
}
