//! Travel modes understood by every routing backend.
//!
//! # Examples
//! ```
//! use busline_core::RouteProfile;
//!
//! assert_eq!(RouteProfile::default(), RouteProfile::Driving);
//! assert_eq!("walking".parse::<RouteProfile>(), Ok(RouteProfile::Walking));
//! assert_eq!(RouteProfile::Cycling.to_string(), "cycling");
//! ```

/// How the vehicle moves along the road network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RouteProfile {
    /// Motor vehicle on roads. The bus default.
    #[default]
    Driving,
    /// Pedestrian paths.
    Walking,
    /// Bicycle lanes and roads.
    Cycling,
}

impl RouteProfile {
    /// Return the profile as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
        }
    }
}

impl std::fmt::Display for RouteProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" | "car" => Ok(Self::Driving),
            "walking" | "foot" => Ok(Self::Walking),
            "cycling" | "bike" => Ok(Self::Cycling),
            _ => Err(format!("unknown route profile '{s}'")),
        }
    }
}

/// Per-call routing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteOptions {
    /// Travel mode, driving by default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile: RouteProfile,
}

impl RouteOptions {
    /// Options for the given profile.
    #[must_use]
    pub const fn with_profile(profile: RouteProfile) -> Self {
        Self { profile }
    }
}
