use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Newtype wrapper around `u8`.
/// Each bit is one thing a provider can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Capabilities(u8);

impl Capabilities {
    /// Prompt in, text out.
    pub const TEXT: Self = Self(1 << 0);
    /// Prompt in, image out.
    pub const IMAGE: Self = Self(1 << 1);
    /// Source image + reference face in, edited image out.
    pub const FACE_SWAP: Self = Self(1 << 2);
    /// Image generation that accepts a reference image in the same call.
    pub const REFERENCE_IMAGE: Self = Self(1 << 3);

    #[inline(always)]
    pub const fn none() -> Self {
        Self(0)
    }

    #[inline(always)]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns true if `self` is a superset of `required`.
    #[inline(always)]
    pub const fn contains_all(&self, required: Capabilities) -> bool {
        (self.0 & required.0) == required.0
    }

    #[inline(always)]
    pub const fn union(self, other: Capabilities) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for Capabilities {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_all_requires_every_bit() {
        let caps = Capabilities::IMAGE | Capabilities::REFERENCE_IMAGE;
        assert!(caps.contains_all(Capabilities::IMAGE));
        assert!(caps.contains_all(Capabilities::IMAGE | Capabilities::REFERENCE_IMAGE));
        assert!(!caps.contains_all(Capabilities::IMAGE | Capabilities::TEXT));
    }

    #[test]
    fn union_sets_bits_and_none_is_empty() {
        let caps = Capabilities::TEXT | Capabilities::FACE_SWAP;
        assert_eq!(caps.bits(), 0b101);
        assert_eq!(caps, Capabilities::TEXT.union(Capabilities::FACE_SWAP));
        assert_eq!(Capabilities::none().bits(), 0);
        assert!(caps.contains_all(Capabilities::none()));
    }
}
