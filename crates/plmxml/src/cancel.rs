use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{PlmxmlError, Result};

/// Shared cancellation flag for a load attempt
///
/// Clones share the flag, so a UI thread or a signal handler can cancel a
/// build running elsewhere. The pipeline polls it between stages and
/// periodically while building the tree.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(PlmxmlError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(token.check().is_ok());
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(PlmxmlError::Cancelled)));
    }
}
