use once_cell::sync::Lazy;
use regex::Regex;

use crate::sport::SportMode;

/// Intensity target attached to an executable step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    NoTarget,
    PowerZone { zone_number: u8 },
}

impl TargetSpec {
    pub fn type_id(self) -> u32 {
        match self {
            TargetSpec::NoTarget => 1,
            TargetSpec::PowerZone { .. } => 2,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            TargetSpec::NoTarget => "no.target",
            TargetSpec::PowerZone { .. } => "power.zone",
        }
    }
}

/// `z` or `zone`, optional whitespace, one digit 1-9, all as a whole word.
static ZONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:zone|z)\s*([1-9])\b").expect("valid zone pattern"));

/// Find a zone number mentioned in a step name, e.g. `"Zone3 Push"` -> 3.
pub fn zone_number(name: &str) -> Option<u8> {
    ZONE_PATTERN
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Resolve the target for a step name. Only cycling plans carry zone targets.
pub fn resolve_target(name: &str, sport: SportMode) -> TargetSpec {
    if sport != SportMode::Cycling {
        return TargetSpec::NoTarget;
    }
    match zone_number(name) {
        Some(zone_number) => TargetSpec::PowerZone { zone_number },
        None => TargetSpec::NoTarget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_number_matching_rule() {
        assert_eq!(zone_number("Zone3 Push"), Some(3));
        assert_eq!(zone_number("Z1"), Some(1));
        assert_eq!(zone_number("z 4 steady"), Some(4));
        assert_eq!(zone_number("Easy ZONE 2"), Some(2));
        assert_eq!(zone_number("Easy Z1 Recovery"), Some(1));
        assert_eq!(zone_number("Z10"), None);
        assert_eq!(zone_number("Z0"), None);
        assert_eq!(zone_number("Hiz3"), None);
        assert_eq!(zone_number("Tempo"), None);
    }

    #[test]
    fn cycling_resolves_power_zones() {
        assert_eq!(
            resolve_target("Zone3 Push", SportMode::Cycling),
            TargetSpec::PowerZone { zone_number: 3 }
        );
        assert_eq!(
            resolve_target("Z1", SportMode::Cycling),
            TargetSpec::PowerZone { zone_number: 1 }
        );
        assert_eq!(resolve_target("Sprint", SportMode::Cycling), TargetSpec::NoTarget);
    }

    #[test]
    fn running_never_has_targets() {
        assert_eq!(
            resolve_target("Easy Z1 Recovery", SportMode::Running),
            TargetSpec::NoTarget
        );
        assert_eq!(resolve_target("Zone5", SportMode::Running), TargetSpec::NoTarget);
    }
}
