use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;

/// Key for callers whose address is unknown; they share one budget
pub const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

const PRUNE_ABOVE_CLIENTS: usize = 1024;

/// Caps PIN attempts per minute for each client address, so one noisy
/// client cannot spend the budget of another.
pub struct LoginThrottle {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl LoginThrottle {
    /// `None` when `attempts` is zero, meaning throttling is disabled
    pub fn per_minute(attempts: u32) -> Option<Self> {
        NonZeroU32::new(attempts).map(|n| Self {
            limiter: RateLimiter::keyed(Quota::per_minute(n)),
        })
    }

    /// Consume one attempt for `client`; false when its budget is exhausted
    pub fn try_acquire(&self, client: IpAddr) -> bool {
        let allowed = self.limiter.check_key(&client).is_ok();
        if self.limiter.len() > PRUNE_ABOVE_CLIENTS {
            self.limiter.retain_recent();
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, last))
    }

    #[test]
    fn test_zero_disables_throttling() {
        assert!(LoginThrottle::per_minute(0).is_none());
    }

    #[test]
    fn test_budget_is_exhausted_after_burst() {
        let throttle = LoginThrottle::per_minute(3).unwrap();

        assert!(throttle.try_acquire(client(1)));
        assert!(throttle.try_acquire(client(1)));
        assert!(throttle.try_acquire(client(1)));
        assert!(!throttle.try_acquire(client(1)));
    }

    #[test]
    fn test_clients_have_separate_budgets() {
        let throttle = LoginThrottle::per_minute(2).unwrap();
        assert!(throttle.try_acquire(client(1)));
        assert!(throttle.try_acquire(client(1)));
        assert!(!throttle.try_acquire(client(1)));

        assert!(throttle.try_acquire(client(2)));
        assert!(throttle.try_acquire(UNKNOWN_CLIENT));
    }
}
