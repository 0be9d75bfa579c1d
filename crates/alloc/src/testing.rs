//! Instrumented element types for exercising drop and panic paths.

use std::{cell::Cell, rc::Rc};

#[derive(Default)]
struct Counts {
    live: Cell<usize>,
    drops: Cell<usize>,
    clones: Cell<usize>,
    // clones allowed before the next one panics, `None` means unlimited
    clone_budget: Cell<Option<usize>>,
}

/// Shared record of every [`Tracked`] value created from it.
#[derive(Clone, Default)]
pub(crate) struct Ledger(Rc<Counts>);

impl Ledger {
    pub fn track(&self, value: i32) -> Tracked {
        self.0.live.set(self.0.live.get() + 1);
        Tracked {
            value,
            ledger: self.clone(),
        }
    }

    /// Number of tracked values currently alive.
    pub fn live(&self) -> usize {
        self.0.live.get()
    }

    pub fn drops(&self) -> usize {
        self.0.drops.get()
    }

    pub fn clones(&self) -> usize {
        self.0.clones.get()
    }

    /// Lets `n` more clones succeed, then makes every clone panic.
    pub fn panic_after_clones(&self, n: usize) {
        self.0.clone_budget.set(Some(n));
    }
}

pub(crate) struct Tracked {
    pub value: i32,
    ledger: Ledger,
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        let counts = &self.ledger.0;
        match counts.clone_budget.get() {
            Some(0) => panic!("clone budget exhausted"),
            Some(n) => counts.clone_budget.set(Some(n - 1)),
            None => {}
        }
        counts.clones.set(counts.clones.get() + 1);
        self.ledger.track(self.value)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        let counts = &self.ledger.0;
        let live = counts.live.get();
        assert!(live > 0, "tracked value dropped twice");
        counts.live.set(live - 1);
        counts.drops.set(counts.drops.get() + 1);
    }
}
