//! Resolves, once per signal set, which statistics are desired for each
//! signal and what metadata their output carries.
//!
//! The resolver applies a fixed rule sequence to the signal's free-text
//! selection expression: default, then the `<all>`/`<none>` sentinels, then
//! the per-name override. It never errors; anything in the expression that
//! is not a recognized token is ignored.

use crate::{
    catalog::{Catalog, StatisticDef, UnitClass},
    Real,
};

/// Sentinel token: include every statistic by default.
pub const ALL_TOKEN: &str = "<all>";
/// Sentinel token: exclude every statistic by default. When both sentinels
/// occur in one expression `<none>` wins, whatever their order.
pub const NONE_TOKEN: &str = "<none>";

/// Per-signal configuration, supplied once at configuration time.
#[derive(Debug, Clone, Default)]
pub struct SignalConfig {
    pub name: String,
    /// Physical units of the signal's samples, if known.
    pub units: Option<String>,
    /// Free-text selection expression; absent means everything is desired.
    pub selection: Option<String>,
}

/// Per (signal, statistic) storage: metadata resolved once, and the result
/// the analyzer overwrites on every call for which `desired` is set. The
/// result is meaningful only when `desired` is true and the call completed.
#[derive(Debug, Clone, PartialEq)]
pub struct StatSlot {
    pub id: crate::catalog::StatId,
    pub desired: bool,
    pub result: Real,
    /// Statistic name concatenated with the signal name.
    pub name: String,
    pub units: Option<String>,
    pub description: String,
}

/// Builds the catalog-ordered slot array for one signal. Runs once per
/// signal set at configuration time; the analyzer then reuses the array for
/// every acquisition.
pub fn resolve_slots(catalog: &Catalog, signal: &SignalConfig, time_units: &str) -> Vec<StatSlot> {
    catalog
        .iter()
        .map(|def| StatSlot {
            id: def.id,
            desired: desired_for(def, signal.selection.as_deref()),
            result: Real::default(),
            name: format!("{}{}", def.name, signal.name),
            units: slot_units(def.unit_class, signal.units.as_deref(), time_units),
            description: def.describe(&signal.name),
        })
        .collect()
}

fn desired_for(def: &StatisticDef, selection: Option<&str>) -> bool {
    let Some(expression) = selection else {
        return true;
    };
    let mut desired = false;
    if expression.contains(ALL_TOKEN) {
        desired = true;
    }
    if expression.contains(NONE_TOKEN) {
        desired = false;
    }
    // pad so a name at the end of the expression still carries its delimiter
    let padded = format!("{expression} ");
    if let Some(at) = padded.find(def.match_token()) {
        desired = !(at > 0 && padded.as_bytes()[at - 1] == b'-');
    }
    desired
}

fn slot_units(class: UnitClass, signal_units: Option<&str>, time_units: &str) -> Option<String> {
    match class {
        UnitClass::Signal => signal_units.map(str::to_owned),
        UnitClass::Time => Some(time_units.to_owned()),
        UnitClass::SignalPerTime => Some(format!(
            "{}/{}",
            signal_units.unwrap_or_default(),
            time_units
        )),
        UnitClass::Dimensionless => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StatId, CATALOG};

    fn signal(selection: Option<&str>) -> SignalConfig {
        SignalConfig {
            name: "B:PS1".into(),
            units: Some("A".into()),
            selection: selection.map(str::to_owned),
        }
    }

    fn desired_ids(selection: Option<&str>) -> Vec<StatId> {
        resolve_slots(&CATALOG, &signal(selection), "s")
            .into_iter()
            .filter(|slot| slot.desired)
            .map(|slot| slot.id)
            .collect()
    }

    #[test]
    fn no_expression_desires_everything() {
        assert_eq!(desired_ids(None).len(), CATALOG.len());
    }

    #[test]
    fn all_except_period() {
        let ids = desired_ids(Some("<all> -Period"));
        assert_eq!(ids.len(), CATALOG.len() - 1);
        assert!(!ids.contains(&StatId::Period));
    }

    #[test]
    fn bare_names_are_inclusion_tokens() {
        assert_eq!(
            desired_ids(Some("Min Max")),
            vec![StatId::Min, StatId::Max]
        );
    }

    #[test]
    fn none_overrides_all_whatever_the_order() {
        assert_eq!(desired_ids(Some("<all> <none>")), vec![]);
        assert_eq!(desired_ids(Some("<none> <all>")), vec![]);
    }

    #[test]
    fn named_overrides_survive_the_none_sentinel() {
        assert_eq!(desired_ids(Some("<none> Period")), vec![StatId::Period]);
    }

    #[test]
    fn prefix_names_do_not_cross_match() {
        let ids = desired_ids(Some("Mean"));
        assert_eq!(ids, vec![StatId::Mean]);
        let ids = desired_ids(Some("Slope1"));
        assert_eq!(ids, vec![StatId::Slope1]);
    }

    #[test]
    fn leading_marker_excludes() {
        let ids = desired_ids(Some("<all> -Mean -MaxExpRate"));
        assert!(!ids.contains(&StatId::Mean));
        assert!(!ids.contains(&StatId::MaxExpRate));
        assert!(ids.contains(&StatId::Mean1));
        assert!(ids.contains(&StatId::Max));
    }

    #[test]
    fn malformed_expressions_fall_back_to_the_default() {
        // comma-separated names carry no delimiter, so nothing matches
        assert_eq!(desired_ids(Some("Min,Max")), vec![]);
        assert_eq!(
            desired_ids(Some("<all> garbage tokens")).len(),
            CATALOG.len()
        );
    }

    #[test]
    fn output_metadata_is_fully_populated() {
        let slots = resolve_slots(&CATALOG, &signal(None), "s");
        let slope = &slots[StatId::Slope.index()];
        assert_eq!(slope.name, "SlopeB:PS1");
        assert_eq!(slope.units.as_deref(), Some("A/s"));
        assert_eq!(slope.description, "fitted slope of B:PS1");

        let chi = &slots[StatId::ChiSquared.index()];
        assert_eq!(chi.units, None);

        let period = &slots[StatId::Period.index()];
        assert_eq!(period.units.as_deref(), Some("s"));
    }

    #[test]
    fn missing_signal_units_propagate_as_absent() {
        let unitless = SignalConfig {
            name: "B:PS2".into(),
            units: None,
            selection: None,
        };
        let slots = resolve_slots(&CATALOG, &unitless, "s");
        assert_eq!(slots[StatId::Baseline.index()].units, None);
        assert_eq!(slots[StatId::Slope.index()].units.as_deref(), Some("/s"));
    }
}
