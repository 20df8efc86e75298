use crate::{ArchitectureError, FEATURE_COUNT};

/// Shape of the single-hidden-layer network.
///
/// The flat weight vector is laid out as
/// `[W1 (features × hidden, row-major) | b1 (hidden) | W2 (hidden) | b2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("{num_features}-{hidden_size}-1")]
pub struct Architecture {
    num_features: usize,
    hidden_size: usize,
}

impl Default for Architecture {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Architecture {
    pub const DEFAULT_HIDDEN_SIZE: usize = 8;

    /// Six features, eight hidden neurons: 65 weights.
    pub const DEFAULT: Self = Self {
        num_features: FEATURE_COUNT,
        hidden_size: Self::DEFAULT_HIDDEN_SIZE,
    };

    /// Creates an architecture, rejecting shapes the controller cannot drive.
    ///
    /// ```
    /// use flapevo_controller::{Architecture, ArchitectureError};
    ///
    /// let arch = Architecture::new(6, 4).unwrap();
    /// assert_eq!(arch.total_weights(), 6 * 4 + 4 + 4 + 1);
    /// assert_eq!(
    ///     Architecture::new(5, 4),
    ///     Err(ArchitectureError::UnsupportedFeatureCount { num_features: 5 }),
    /// );
    /// ```
    pub fn new(num_features: usize, hidden_size: usize) -> Result<Self, ArchitectureError> {
        if num_features != FEATURE_COUNT {
            return Err(ArchitectureError::UnsupportedFeatureCount { num_features });
        }
        if hidden_size == 0 {
            return Err(ArchitectureError::EmptyHiddenLayer);
        }
        Ok(Self {
            num_features,
            hidden_size,
        })
    }

    #[must_use]
    pub const fn num_features(&self) -> usize {
        self.num_features
    }

    #[must_use]
    pub const fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    #[must_use]
    pub const fn total_weights(&self) -> usize {
        self.num_features * self.hidden_size + self.hidden_size + self.hidden_size + 1
    }

    /// Bound of the uniform initialization range, `sqrt(6 / (fan_in + fan_out))`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn xavier_limit(&self) -> f32 {
        (6.0 / (self.num_features + self.hidden_size) as f32).sqrt()
    }

    /// Checks that `len` weights fit this architecture.
    pub fn check_weight_count(&self, len: usize) -> Result<(), ArchitectureError> {
        let expected = self.total_weights();
        if len != expected {
            return Err(ArchitectureError::WeightCountMismatch {
                expected,
                actual: len,
            });
        }
        Ok(())
    }
}
