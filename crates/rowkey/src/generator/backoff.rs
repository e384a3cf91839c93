use core::{fmt, str::FromStr, time::Duration};

/// Strategies for waiting out a [`Pending`] poll.
///
/// A generator goes pending when the sequence for the current millisecond is
/// exhausted, which resolves as soon as the clock ticks over. Each strategy
/// trades CPU for latency differently.
///
/// [`Pending`]: crate::IdGenStatus::Pending
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Backoff {
    /// Busy-waits in a tight loop.
    ///
    /// Offers maximum throughput at the cost of high CPU usage.
    Spin,

    /// Yields to the OS scheduler to allow other threads to run.
    #[default]
    Yield,

    /// Sleeps for the requested delay in milliseconds.
    ///
    /// Lowest CPU usage, but may oversleep depending on scheduler resolution.
    Sleep,
}

impl Backoff {
    /// Waits according to the strategy. A zero `yield_for` never sleeps.
    pub fn wait(self, yield_for: u64) {
        match self {
            Self::Spin => core::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep if yield_for == 0 => std::thread::yield_now(),
            Self::Sleep => std::thread::sleep(Duration::from_millis(yield_for)),
        }
    }
}

impl fmt::Display for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spin => "spin",
            Self::Yield => "yield",
            Self::Sleep => "sleep",
        })
    }
}

impl FromStr for Backoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spin" => Ok(Self::Spin),
            "yield" => Ok(Self::Yield),
            "sleep" => Ok(Self::Sleep),
            other => Err(format!(
                "unknown backoff `{other}` (expected spin, yield or sleep)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Spin".parse::<Backoff>(), Ok(Backoff::Spin));
        assert_eq!("yield".parse::<Backoff>(), Ok(Backoff::Yield));
        assert_eq!("SLEEP".parse::<Backoff>(), Ok(Backoff::Sleep));
        assert!("nap".parse::<Backoff>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for backoff in [Backoff::Spin, Backoff::Yield, Backoff::Sleep] {
            assert_eq!(backoff.to_string().parse::<Backoff>(), Ok(backoff));
        }
    }
}
