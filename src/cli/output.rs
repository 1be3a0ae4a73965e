//! Output formatting utilities for CLI.

use std::fmt::Write as _;

use serde::Serialize;
use skirmish::rollout::{EpisodeSummary, PolicyKind, RolloutStats};
use skirmish::{Outcome, Team};

/// Display label for a team.
pub(super) const fn team_label(team: Team) -> &'static str {
    match team {
        Team::Left => "Team 0",
        Team::Right => "Team 1",
    }
}

fn outcome_label(outcome: Outcome) -> String {
    match outcome {
        Outcome::Victory(team) => format!("{} wins", team_label(team)),
        Outcome::Draw => "Draw".to_string(),
    }
}

/// JSON-serializable episode result.
#[derive(Debug, Serialize)]
pub(super) struct JsonEpisodeResult {
    /// Seed passed to reset.
    pub(super) seed: u64,
    /// Winning team id (null if draw).
    pub(super) winner: Option<usize>,
    /// Steps played.
    pub(super) steps: u32,
    /// Per-team results.
    pub(super) teams: Vec<JsonTeamResult>,
}

/// JSON-serializable team result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTeamResult {
    /// Team id (0 or 1).
    pub(super) id: usize,
    /// Policy that drove the team.
    pub(super) policy: &'static str,
    /// Units of this team captured.
    pub(super) captured: u32,
    /// Downing blows dealt.
    pub(super) kills: u32,
    /// Heals given.
    pub(super) heals: u32,
    /// Summed unit returns.
    pub(super) total_return: f64,
}

impl JsonEpisodeResult {
    /// Create from an episode summary.
    pub(super) fn from_summary(summary: &EpisodeSummary, policies: [PolicyKind; 2]) -> Self {
        let winner = match summary.outcome {
            Outcome::Victory(team) => Some(team.index()),
            Outcome::Draw => None,
        };
        Self {
            seed: summary.seed,
            winner,
            steps: summary.steps,
            teams: Team::ALL
                .iter()
                .map(|team| {
                    let i = team.index();
                    let c = summary.counters[i];
                    JsonTeamResult {
                        id: i,
                        policy: policies[i].name(),
                        captured: c.captured,
                        kills: c.kills,
                        heals: c.heals,
                        total_return: summary.team_returns[i],
                    }
                })
                .collect(),
        }
    }
}

/// Format an episode summary as human-readable text.
pub(super) fn format_episode_text(summary: &EpisodeSummary, policies: [PolicyKind; 2]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Episode Result (seed: {})", summary.seed);
    let _ = writeln!(output, "  Outcome: {}", outcome_label(summary.outcome));
    let _ = writeln!(output, "  Steps: {}\n", summary.steps);

    for team in Team::ALL {
        let i = team.index();
        let c = summary.counters[i];
        let _ = writeln!(
            output,
            "  {} ({}): captured {}, kills {}, heals {}, return {:.1}",
            team_label(team),
            policies[i].name(),
            c.captured,
            c.kills,
            c.heals,
            summary.team_returns[i]
        );
    }

    output
}

/// JSON-serializable rollout result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRolloutResult {
    /// Episodes played.
    pub(super) episodes: u64,
    /// Fraction of drawn episodes.
    pub(super) draw_rate: f64,
    /// Mean episode length.
    pub(super) mean_steps: f64,
    /// Per-team aggregates.
    pub(super) teams: Vec<JsonTeamStats>,
}

/// JSON-serializable per-team aggregates.
#[derive(Debug, Serialize)]
pub(super) struct JsonTeamStats {
    /// Team id (0 or 1).
    pub(super) id: usize,
    /// Policy that drove the team.
    pub(super) policy: &'static str,
    /// Episodes won.
    pub(super) wins: u64,
    /// Fraction of episodes won.
    pub(super) win_rate: f64,
    /// Mean units captured per episode.
    pub(super) mean_captured: f64,
    /// Mean downing blows per episode.
    pub(super) mean_kills: f64,
    /// Mean heals per episode.
    pub(super) mean_heals: f64,
    /// Mean summed return per episode.
    pub(super) mean_return: f64,
}

impl JsonRolloutResult {
    /// Create from aggregated statistics.
    pub(super) fn from_stats(stats: &RolloutStats, policies: [PolicyKind; 2]) -> Self {
        Self {
            episodes: stats.episodes,
            draw_rate: stats.draw_rate(),
            mean_steps: stats.mean_steps(),
            teams: Team::ALL
                .iter()
                .map(|&team| JsonTeamStats {
                    id: team.index(),
                    policy: policies[team.index()].name(),
                    wins: stats.wins[team.index()],
                    win_rate: stats.win_rate(team),
                    mean_captured: stats.mean_captured(team),
                    mean_kills: stats.mean_kills(team),
                    mean_heals: stats.mean_heals(team),
                    mean_return: stats.mean_return(team),
                })
                .collect(),
        }
    }
}

/// Format rollout statistics as human-readable text.
pub(super) fn format_rollout_text(stats: &RolloutStats, policies: [PolicyKind; 2]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Rollout Results ({} episodes)", stats.episodes);
    let _ = writeln!(output, "{}", "=".repeat(50));
    let _ = writeln!(
        output,
        "  Draws: {} ({:.1}%)  Mean steps: {:.1}\n",
        stats.draws,
        stats.draw_rate() * 100.0,
        stats.mean_steps()
    );

    for team in Team::ALL {
        let i = team.index();
        let _ = writeln!(
            output,
            "  {} ({}): {} wins ({:.1}%)",
            team_label(team),
            policies[i].name(),
            stats.wins[i],
            stats.win_rate(team) * 100.0
        );
        let _ = writeln!(
            output,
            "    captured {:.2}  kills {:.2}  heals {:.2}  return {:.1}",
            stats.mean_captured(team),
            stats.mean_kills(team),
            stats.mean_heals(team),
            stats.mean_return(team)
        );
    }

    output
}

/// Format rollout statistics as CSV.
pub(super) fn format_rollout_csv(stats: &RolloutStats, policies: [PolicyKind; 2]) -> String {
    let mut output =
        String::from("team,policy,wins,win_rate,draws,mean_steps,mean_captured,mean_kills,mean_heals,mean_return\n");

    for team in Team::ALL {
        let i = team.index();
        let _ = writeln!(
            output,
            "{i},{},{},{:.4},{},{:.2},{:.4},{:.4},{:.4},{:.4}",
            policies[i].name(),
            stats.wins[i],
            stats.win_rate(team),
            stats.draws,
            stats.mean_steps(),
            stats.mean_captured(team),
            stats.mean_kills(team),
            stats.mean_heals(team),
            stats.mean_return(team)
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish::game::TeamCounters;

    fn summary() -> EpisodeSummary {
        EpisodeSummary {
            seed: 9,
            steps: 120,
            outcome: Outcome::Victory(Team::Left),
            counters: [
                TeamCounters::default(),
                TeamCounters {
                    captured: 2,
                    kills: 0,
                    heals: 1,
                },
            ],
            team_returns: [35.5, -12.0],
            actions: Vec::new(),
        }
    }

    const POLICIES: [PolicyKind; 2] = [PolicyKind::Heuristic, PolicyKind::Random];

    #[test]
    fn test_episode_text_names_winner() {
        let text = format_episode_text(&summary(), POLICIES);
        assert!(text.contains("seed: 9"));
        assert!(text.contains("Team 0 wins"));
        assert!(text.contains("Team 1 (random): captured 2"));
    }

    #[test]
    fn test_episode_json_shape() {
        let json = JsonEpisodeResult::from_summary(&summary(), POLICIES);
        assert_eq!(json.winner, Some(0));
        assert_eq!(json.teams.len(), 2);
        assert_eq!(json.teams[1].captured, 2);
        assert_eq!(json.teams[0].policy, "heuristic");
    }

    #[test]
    fn test_rollout_csv_rows() {
        let mut stats = RolloutStats::default();
        stats.add(&summary());
        let csv = format_rollout_csv(&stats, POLICIES);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("team,policy,wins"));
        assert!(lines[1].starts_with("0,heuristic,1,1.0000"));
        assert!(lines[2].starts_with("1,random,0,0.0000"));
    }
}
