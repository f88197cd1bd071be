use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop request, set from a signal handler and polled by the
/// observation loop. Clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    requested: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let signal = StopSignal::new();
        let handle = signal.clone();
        assert!(!signal.is_requested());

        handle.request();

        assert!(signal.is_requested());
    }

    #[test]
    fn test_request_from_another_thread() {
        let signal = StopSignal::new();
        let handle = signal.clone();
        std::thread::spawn(move || handle.request()).join().unwrap();
        assert!(signal.is_requested());
    }
}
