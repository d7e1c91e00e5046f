//! Feed and interaction scenarios for the route panel.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// TM-001: Panel mounts before data, then the fleet appears
    FirstArrival,

    /// TM-002: Feed drops to empty frames and comes back
    DataDropout,

    /// TM-003: Selector hops between vehicles while frames stream in
    SelectionChurn,

    /// TM-004: Overlay tiles and zoom edited through the options
    TileToggle,

    /// TM-005: Rows arrive shuffled, timestamps run backwards
    OutOfOrder,

    /// TM-006: Frames with missing columns mixed into the feed
    MalformedFeed,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::FirstArrival,
            ScenarioId::DataDropout,
            ScenarioId::SelectionChurn,
            ScenarioId::TileToggle,
            ScenarioId::OutOfOrder,
            ScenarioId::MalformedFeed,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::FirstArrival => "first_arrival",
            ScenarioId::DataDropout => "data_dropout",
            ScenarioId::SelectionChurn => "selection_churn",
            ScenarioId::TileToggle => "tile_toggle",
            ScenarioId::OutOfOrder => "out_of_order",
            ScenarioId::MalformedFeed => "malformed_feed",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::FirstArrival => "Mount on an empty frame, recenter exactly once when vehicles appear",
            ScenarioId::DataDropout => "Every fourth frame empty, route and selection cleared, recenter on recovery",
            ScenarioId::SelectionChurn => "Random selection swaps, one remove and one add per swap",
            ScenarioId::TileToggle => "Overlay off/on/swap/off and zoom edits, removals only for existing layers",
            ScenarioId::OutOfOrder => "Shuffled rows, negative segment durations rendered as-is",
            ScenarioId::MalformedFeed => "Truncated frames abort the cycle and leave the display untouched",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first_arrival" | "firstarrival" | "tm-001" => Ok(ScenarioId::FirstArrival),
            "data_dropout" | "datadropout" | "tm-002" => Ok(ScenarioId::DataDropout),
            "selection_churn" | "selectionchurn" | "tm-003" => Ok(ScenarioId::SelectionChurn),
            "tile_toggle" | "tiletoggle" | "tm-004" => Ok(ScenarioId::TileToggle),
            "out_of_order" | "outoforder" | "tm-005" => Ok(ScenarioId::OutOfOrder),
            "malformed_feed" | "malformedfeed" | "tm-006" => Ok(ScenarioId::MalformedFeed),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
            assert_eq!(scenario.to_string(), scenario.name());
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("TM-003".parse::<ScenarioId>(), Ok(ScenarioId::SelectionChurn));
        assert_eq!("TileToggle".parse::<ScenarioId>(), Ok(ScenarioId::TileToggle));
    }

    #[test]
    fn test_unknown_scenario() {
        let err = "split_brain".parse::<ScenarioId>().unwrap_err();
        assert!(err.contains("split_brain"));
    }
}
