//! Traits the host engine implements so the core can read its state.

use crate::ids::SwitchId;

/// Read access to the host's boolean switches.
pub trait SwitchState {
    /// Current value of a switch. Unknown switches read as `false`.
    fn value(&self, id: SwitchId) -> bool;
}

impl<F> SwitchState for F
where
    F: Fn(SwitchId) -> bool,
{
    fn value(&self, id: SwitchId) -> bool {
        self(id)
    }
}
