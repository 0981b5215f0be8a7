use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cooperative stop request shared between the trainer and whoever may cancel it.
///
/// The trainer polls the token once per generation boundary; a generation that has
/// started always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    requested: Arc<AtomicBool>,
}

impl StopToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the holder of any clone of this token to stop.
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = StopToken::new();
        let remote = token.clone();
        assert!(!token.is_stop_requested());
        thread::spawn(move || remote.request_stop()).join().unwrap();
        assert!(token.is_stop_requested());
    }
}
