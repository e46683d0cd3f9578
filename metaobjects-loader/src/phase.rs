use std::fmt;

/// Lifecycle of a loader.
///
/// Documents may be merged until [`init`](crate::MetaDataLoader::init)
/// validates the tree and moves it into the read phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadingPhase {
    /// No document merged yet.
    #[default]
    Uninitialized,
    /// At least one document merged; more may follow.
    Loading,
    /// Validated and read-only.
    Initialized,
    /// Tree dropped; the loader can no longer be used.
    Destroyed,
}

impl LoadingPhase {
    /// Returns true while documents may still be merged.
    #[must_use]
    pub fn accepts_documents(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    #[must_use]
    pub fn is_ready(self) -> bool {
        self == Self::Initialized
    }
}

impl fmt::Display for LoadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Initialized => "initialized",
            Self::Destroyed => "destroyed",
        })
    }
}
