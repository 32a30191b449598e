//! Preset AWS region lists grouped by continent
//!
//! Convenience defaults for the orchestrator's region list. Any region
//! identifier the provider accepts can be used; these are just the
//! commonly enabled ones.

/// North American regions (the default set)
pub const NORTH_AMERICA: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-west-1",
    "ca-central-1",
    "mx-central-1",
];

/// European regions
pub const EUROPE: &[&str] = &[
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "eu-central-2",
    "eu-south-1",
    "eu-south-2",
    "eu-north-1",
];

/// Asia-Pacific regions
pub const ASIA_PACIFIC: &[&str] = &[
    "ap-south-1",
    "ap-northeast-3",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "ap-east-1",
];

/// South American regions
pub const SOUTH_AMERICA: &[&str] = &["sa-east-1"];

/// African regions
pub const AFRICA: &[&str] = &["af-south-1"];

/// Middle Eastern regions
pub const MIDDLE_EAST: &[&str] = &["me-south-1", "me-central-1", "il-central-1"];

/// Default region set used when none is configured
pub const DEFAULT_REGIONS: &[&str] = NORTH_AMERICA;

/// All preset regions across every continent group
pub fn all() -> Vec<String> {
    [
        NORTH_AMERICA,
        EUROPE,
        ASIA_PACIFIC,
        SOUTH_AMERICA,
        AFRICA,
        MIDDLE_EAST,
    ]
    .iter()
    .flat_map(|group| group.iter().map(|r| r.to_string()))
    .collect()
}
