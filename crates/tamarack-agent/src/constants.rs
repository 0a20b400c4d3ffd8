//! Constants for the read orchestrator.
//!
//! Tiger Style: All constants are explicitly typed with fixed limits
//! to prevent unbounded resource usage.

use std::time::Duration;

/// Maximum number of links accepted in a value chain.
/// Tiger Style: Bounded to keep decomposition and dispatch memory
/// proportional to a known limit.
pub const MAX_CHAIN_LINKS: usize = 4096;

/// Default deadline for a whole read, including repair restarts.
/// Tiger Style: Explicit timeout prevents unbounded waiting.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Compile-Time Constant Assertions
// ============================================================================

// Chain bound must be positive and small enough that per-link bookkeeping
// stays cheap
const _: () = assert!(MAX_CHAIN_LINKS > 0);
const _: () = assert!(MAX_CHAIN_LINKS <= 65_536);

// Default deadline must be positive
const _: () = assert!(DEFAULT_READ_TIMEOUT.as_secs() > 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_bounded() {
        assert!(MAX_CHAIN_LINKS >= 1);
        assert!(MAX_CHAIN_LINKS <= 65_536);
        assert!(DEFAULT_READ_TIMEOUT >= Duration::from_secs(1));
        assert!(DEFAULT_READ_TIMEOUT <= Duration::from_secs(300));
    }
}
