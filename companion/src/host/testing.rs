//! In-memory host for tests.

use std::sync::Mutex;

use super::{Badge, CookieSetPlan, ExtensionHost, HostCommand, NativeNotification};

#[derive(Default)]
pub struct RecordingHost {
    commands: Mutex<Vec<HostCommand>>,
}

impl RecordingHost {
    pub fn commands(&self) -> Vec<HostCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<NativeNotification> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                HostCommand::CreateNotification(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn badges(&self) -> Vec<Badge> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                HostCommand::SetBadge(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn opened_tabs(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                HostCommand::OpenTab { url } => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn cookie_plans(&self) -> Vec<CookieSetPlan> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                HostCommand::SetCookie(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }
}

impl ExtensionHost for RecordingHost {
    fn execute(&self, command: HostCommand) {
        self.commands.lock().unwrap().push(command);
    }
}
