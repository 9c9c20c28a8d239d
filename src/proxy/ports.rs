//! Replacement-port selection for the port-conflict retry.
//!
//! Injectable so tests can pin the replacement port instead of
//! depending on process-wide randomness.

pub const RANDOM_PORT_START: u16 = 8000;
pub const RANDOM_PORT_RANGE: u16 = 1000;

pub trait PortSelector: Send + Sync {
    fn select(&self) -> u16;
}

/// Picks uniformly from [`RANDOM_PORT_START`] ..
/// [`RANDOM_PORT_START`]` + `[`RANDOM_PORT_RANGE`].
pub struct RandomPortSelector;

impl PortSelector for RandomPortSelector {
    fn select(&self) -> u16 {
        RANDOM_PORT_START + fastrand::u16(..RANDOM_PORT_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_ports_stay_in_range() {
        let selector = RandomPortSelector;
        for _ in 0..1000 {
            let port = selector.select();
            assert!((RANDOM_PORT_START..RANDOM_PORT_START + RANDOM_PORT_RANGE).contains(&port));
        }
    }
}
