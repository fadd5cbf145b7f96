//! Descriptor tables for each thematic variable group.

use std::fmt;
use std::str::FromStr;

use crate::group::VariableGroup;

pub mod base;
pub mod ice_mp;
pub mod liquid_mp;

/// The variable groups a case can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Base,
    IceMp,
    LiquidMp,
}

impl GroupKind {
    pub const ALL: [GroupKind; 3] = [GroupKind::Base, GroupKind::IceMp, GroupKind::LiquidMp];

    pub fn name(&self) -> &'static str {
        match self {
            GroupKind::Base => "base variables",
            GroupKind::IceMp => "ice mp variables",
            GroupKind::LiquidMp => "liquid mp variables",
        }
    }

    /// Build the group's descriptor table
    pub fn build(&self) -> VariableGroup {
        match self {
            GroupKind::Base => base::group(),
            GroupKind::IceMp => ice_mp::group(),
            GroupKind::LiquidMp => liquid_mp::group(),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(GroupKind::Base),
            "ice_mp" | "icemp" => Ok(GroupKind::IceMp),
            "liquid_mp" | "liquidmp" => Ok(GroupKind::LiquidMp),
            _ => Err(format!("Unknown variable group: {}", s)),
        }
    }
}
