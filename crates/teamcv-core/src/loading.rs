use std::cell::Cell;
use std::rc::Rc;

/// Shared "work in progress" indicator, e.g. behind an export button.
///
/// Busy while at least one [`LoadingGuard`] is alive.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    active: Rc<Cell<usize>>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.active.get() > 0
    }

    /// Number of operations currently holding a guard
    pub fn active(&self) -> usize {
        self.active.get()
    }

    pub fn begin(&self) -> LoadingGuard {
        self.active.set(self.active.get() + 1);
        LoadingGuard {
            active: self.active.clone(),
        }
    }
}

/// Clears its share of the busy flag when dropped, on success and error paths alike
#[derive(Debug)]
#[must_use = "the flag is cleared as soon as the guard is dropped"]
pub struct LoadingGuard {
    active: Rc<Cell<usize>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.set(self.active.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_export(flag: &BusyFlag) -> Result<(), String> {
        let _guard = flag.begin();
        assert!(flag.is_busy());
        Err("renderer failed".into())
    }

    #[test]
    fn test_guard_clears_on_error() {
        let flag = BusyFlag::new();
        assert!(failing_export(&flag).is_err());
        assert!(!flag.is_busy());
    }

    #[test]
    fn test_overlapping_guards() {
        let flag = BusyFlag::new();
        let first = flag.begin();
        let second = flag.begin();
        assert_eq!(flag.active(), 2);

        drop(first);
        assert!(flag.is_busy());
        drop(second);
        assert!(!flag.is_busy());
    }
}
