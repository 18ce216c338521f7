use std::sync::Arc;

use crate::{provider::Medium, stowage::DEFAULT_PREFIX, Stowage};

/// Builder struct for [`Stowage`](../struct.Stowage.html)
///
/// The medium is a required, injected collaborator: there is no ambient
/// default, every facade instance is explicitly bound to the medium it
/// delegates to. The prefix falls back to
/// [`DEFAULT_PREFIX`](../constant.DEFAULT_PREFIX.html) when not set.
#[derive(Default)]
pub struct StowageBuilder<M = ()> {
    medium: Option<M>,
    prefix: Option<String>,
}

impl StowageBuilder {
    #[must_use = "Builder must be used by calling finish"]
    /// This method can be used to set a [`Medium`](trait.Medium.html), the second
    /// call to this method will overwrite the medium.
    pub fn medium<M>(self, medium: M) -> StowageBuilder<M>
    where
        M: Medium + 'static,
    {
        StowageBuilder {
            medium: Some(medium),
            prefix: self.prefix,
        }
    }
}

impl<M: Medium + 'static> StowageBuilder<M> {
    #[must_use = "Builder must be used by calling finish"]
    /// Overwrite the namespace prefix prepended to every key.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_owned());
        self
    }

    /// Build the Stowage
    pub fn finish(self) -> Stowage {
        Stowage {
            prefix: self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX).into(),
            medium: Arc::new(self.medium.unwrap()),
        }
    }
}
