//! Progress reporting from the toolchain back to the caller

/// Phase the toolchain is currently in for a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainPhase {
    Downloading,
    Installing,
}

/// One progress callback: phase plus overall percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolchainProgress {
    pub phase: ToolchainPhase,
    /// 0..=100, clamped on construction
    pub percent: u8,
}

impl ToolchainProgress {
    #[must_use]
    pub fn new(phase: ToolchainPhase, percent: u8) -> Self {
        Self {
            phase,
            percent: percent.min(100),
        }
    }
}

/// Answer of a [`ProgressSink`] telling the toolchain whether to go on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressControl {
    Continue,
    Abort,
}

impl ProgressControl {
    #[must_use]
    pub fn is_abort(self) -> bool {
        self == Self::Abort
    }
}

/// Receiver of toolchain progress, invoked synchronously from the toolchain
pub trait ProgressSink {
    fn report(&mut self, progress: ToolchainProgress) -> ProgressControl;

    /// Polled by the toolchain between callbacks
    fn should_abort(&self) -> bool {
        false
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(ToolchainProgress) -> ProgressControl,
{
    fn report(&mut self, progress: ToolchainProgress) -> ProgressControl {
        self(progress)
    }
}
