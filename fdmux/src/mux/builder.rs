use super::{LevelRescan, ListBased, Multiplexer, Strategy};
use crate::epoll::Session;
use crate::error::Result;

/// Expected descriptor count from which edge registration is preferred.
pub const DEFAULT_EDGE_THRESHOLD: usize = 64;

/// Builder for configuring and creating a [`Multiplexer`].
///
/// The strategy is decided once, here, for the lifetime of the multiplexer.
/// Unless one is forced with [`strategy`](Self::strategy), edge registration
/// is chosen when the platform supports it and the expected descriptor count
/// reaches the threshold; the list-based strategy is chosen otherwise.
///
/// # Examples
///
/// ```rust
/// use fdmux::MultiplexerBuilder;
///
/// let mux = MultiplexerBuilder::new()
///     .expected_descriptors(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MultiplexerBuilder {
    /// Number of descriptors the owning library expects to register.
    expected_descriptors: usize,

    /// Count at or above which edge registration is preferred.
    edge_threshold: usize,

    /// Strategy forced by the caller, bypassing the probe.
    strategy: Option<Strategy>,
}

impl MultiplexerBuilder {
    /// Creates a new `MultiplexerBuilder` with default configuration.
    ///
    /// By default sixteen descriptors are expected and the threshold is
    /// [`DEFAULT_EDGE_THRESHOLD`].
    pub fn new() -> Self {
        Self {
            expected_descriptors: 16,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            strategy: None,
        }
    }

    /// Sets the number of descriptors expected to be registered.
    ///
    /// This sizes the registration table and the session hint.
    pub fn expected_descriptors(mut self, n: usize) -> Self {
        self.expected_descriptors = n;
        self
    }

    /// Sets the expected descriptor count from which edge registration is
    /// preferred.
    pub fn edge_threshold(mut self, n: usize) -> Self {
        self.edge_threshold = n;
        self
    }

    /// Forces a strategy instead of probing for one.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Builds the multiplexer with the configured options.
    ///
    /// # Errors
    ///
    /// Forcing [`Strategy::EdgeRegistration`] on a platform without it fails
    /// with [`CapabilityUnavailable`](crate::Error::CapabilityUnavailable).
    pub fn build(self) -> Result<Multiplexer> {
        let strategy = self
            .strategy
            .unwrap_or_else(|| Strategy::probe(self.expected_descriptors, self.edge_threshold));

        log::debug!(
            "multiplexer strategy {:?} for {} expected descriptors",
            strategy,
            self.expected_descriptors
        );

        match strategy {
            Strategy::LevelRescan => Ok(Multiplexer::LevelRescan(LevelRescan::new())),
            Strategy::ListBased => Ok(Multiplexer::ListBased(ListBased::with_capacity(
                self.expected_descriptors,
            ))),
            Strategy::EdgeRegistration => {
                let hint = i32::try_from(self.expected_descriptors.max(1)).unwrap_or(i32::MAX);
                Session::create(hint).map(Multiplexer::EdgeRegistration)
            }
        }
    }
}

impl Default for MultiplexerBuilder {
    /// Creates a default `MultiplexerBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
