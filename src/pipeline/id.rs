//! Identity types for the pipeline system.
//!
//! IDs are newtypes over `u32` that serve as direct indices into their
//! storage: `SpecId` into a resolved chain, `OutputId` into a pipeline's
//! output bindings.

use std::fmt;

/// Index of a processor spec within a resolved chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SpecId(pub u32);

impl SpecId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpecId({})", self.0)
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Index into `Pipeline::outputs`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(pub u32);

impl OutputId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_id() {
        let id = SpecId(3);
        assert_eq!(id.index(), 3);
        assert!(SpecId(1) < SpecId(2));
        assert_eq!(id.to_string(), "SpecId(3)");
    }

    #[test]
    fn test_output_id() {
        let id = OutputId(5);
        assert_eq!(id.index(), 5);
        assert_eq!(format!("{:?}", id), "OutputId(5)");
    }
}
