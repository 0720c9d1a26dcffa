//! Navigation collaborator.
//!
//! The screen never decides *how* to leave; it only asks its `Router` to go
//! back. In the terminal app "back" means closing the screen and returning
//! to the shell, which `TerminalRouter` records as a flag the event loop polls.

use tracing::debug;

/// Something that can navigate away from the current screen.
pub trait Router {
    fn back(&mut self);
}

/// Router for the standalone terminal screen: going back ends the event loop.
#[derive(Debug, Default)]
pub struct TerminalRouter {
    went_back: bool,
}

impl TerminalRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once `back()` has been called.
    pub fn went_back(&self) -> bool {
        self.went_back
    }
}

impl Router for TerminalRouter {
    fn back(&mut self) {
        debug!("navigating back");
        self.went_back = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_sets_flag() {
        let mut router = TerminalRouter::new();
        assert!(!router.went_back());
        router.back();
        assert!(router.went_back());
    }
}
