//! End-of-race reports: athlete analysis, podium, medical report, bet.

use raceway_core::{Entity, RacerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a bet on one racer turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetOutcome {
    Won,
    Second,
    Third,
    Lost,
}

impl BetOutcome {
    /// Resolves a bet against the finish order. Places the podium does not
    /// have count as lost.
    pub fn resolve(bet: RacerId, podium: &[RacerId]) -> Self {
        match podium.iter().take(3).position(|&id| id == bet) {
            Some(0) => BetOutcome::Won,
            Some(1) => BetOutcome::Second,
            Some(2) => BetOutcome::Third,
            _ => BetOutcome::Lost,
        }
    }

    pub fn message(self, bet: RacerId) -> String {
        match self {
            BetOutcome::Won => format!("Congratulations! Your bet on racer {} won!", bet),
            BetOutcome::Second => format!("Your bet on racer {} finished second!", bet),
            BetOutcome::Third => format!("Your bet on racer {} finished third!", bet),
            BetOutcome::Lost => format!("Your bet on racer {} lost. Better luck next time!", bet),
        }
    }
}

impl fmt::Display for BetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BetOutcome::Won => "won",
            BetOutcome::Second => "second",
            BetOutcome::Third => "third",
            BetOutcome::Lost => "lost",
        };
        f.write_str(label)
    }
}

/// Pre-race table of every racer's attributes.
pub fn athlete_analysis(roster: &[Entity]) -> Vec<String> {
    let mut lines = vec!["--- Athlete Analysis ---".to_string()];
    lines.extend(roster.iter().map(|racer| racer.profile().to_string()));
    lines.push("-".repeat(27));
    lines
}

/// Top three finishers, or fewer when fewer finished.
pub fn podium_lines(podium: &[RacerId]) -> Vec<String> {
    let mut lines = vec!["--- Final Podium ---".to_string()];
    if podium.is_empty() {
        lines.push("No racer reached the finish line.".to_string());
        return lines;
    }
    for (place, id) in ["1st", "2nd", "3rd"].iter().zip(podium) {
        lines.push(format!("{} place: Racer {}", place, id));
    }
    lines
}

/// Racers that did not complete the race.
pub fn medical_report(eliminated: &[RacerId]) -> Vec<String> {
    let mut lines = vec!["--- Medical Report ---".to_string()];
    if eliminated.is_empty() {
        lines.push("All athletes finished the race well.".to_string());
    }
    for id in eliminated {
        lines.push(format!(
            "Racer {} suffered a serious injury and did not complete the race.",
            id
        ));
    }
    lines
}

/// Bet section, resolved against the podium.
pub fn bet_lines(bet: RacerId, podium: &[RacerId]) -> Vec<String> {
    vec![
        "--- Bet Result ---".to_string(),
        BetOutcome::resolve(bet, podium).message(bet),
    ]
}
