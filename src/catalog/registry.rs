use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Capabilities;

/// Every vendor the pipeline knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Claude,
    Gemini,
    Openai,
    Replicate,
}

/// The job a provider is selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Text,
    Image,
    FaceSwap,
}

impl Role {
    pub const fn required(self) -> Capabilities {
        match self {
            Role::Text => Capabilities::TEXT,
            Role::Image => Capabilities::IMAGE,
            Role::FaceSwap => Capabilities::FACE_SWAP,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Text => "text",
            Role::Image => "image",
            Role::FaceSwap => "face-swap",
        })
    }
}

impl ProviderName {
    pub const ALL: [ProviderName; 4] = [
        ProviderName::Claude,
        ProviderName::Gemini,
        ProviderName::Openai,
        ProviderName::Replicate,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ProviderName::Claude => "claude",
            ProviderName::Gemini => "gemini",
            ProviderName::Openai => "openai",
            ProviderName::Replicate => "replicate",
        }
    }

    /// The fixed capability table.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            ProviderName::Claude => Capabilities::TEXT,
            ProviderName::Gemini | ProviderName::Openai => Capabilities::TEXT
                .union(Capabilities::IMAGE)
                .union(Capabilities::FACE_SWAP)
                .union(Capabilities::REFERENCE_IMAGE),
            ProviderName::Replicate => Capabilities::FACE_SWAP,
        }
    }

    pub const fn supports(self, role: Role) -> bool {
        self.capabilities().contains_all(role.required())
    }

    /// Whether the provider can take a reference image inside a generation call.
    pub const fn supports_reference_image(self) -> bool {
        self.capabilities()
            .contains_all(Capabilities::REFERENCE_IMAGE)
    }

    /// Comma separated names of providers able to serve `role`, for error messages.
    pub fn names_for(role: Role) -> String {
        Self::ALL
            .iter()
            .filter(|p| p.supports(role))
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or(())
    }
}

/// How the expert face gets into the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceStrategy {
    /// No face step; the image call gets no reference.
    Plain,
    /// One image call carrying the reference face.
    Inline,
    /// Generate first, then hand the image to the face-swap provider.
    TwoCall(ProviderName),
}

/// The single decision table for the face step.
///
/// Every image provider accepts a reference image, so `TwoCall` only comes up for
/// swap-only providers such as Replicate.
pub fn face_strategy(image: ProviderName, face_swap: Option<ProviderName>) -> FaceStrategy {
    match face_swap {
        None => FaceStrategy::Plain,
        Some(face) if image.supports_reference_image() && face.supports_reference_image() => {
            FaceStrategy::Inline
        }
        Some(face) => FaceStrategy::TwoCall(face),
    }
}
