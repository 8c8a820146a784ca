use std::collections::{HashMap, HashSet};

use super::models::{EveningStats, GameCount, Placement, PlayedGame, PlayerPoints};

/// Lowest place that is still recorded in the placements list
pub const MAX_RECORDED_PLACE: u32 = 3;

/// Largest points value a single score may carry
pub const MAX_SCORE_POINTS: u32 = 1_000_000;

/// Derives the results of one evening from its games and roster.
///
/// Scores without a participant are skipped. Game types count once per
/// evening no matter how often they were played. Placements are dense over
/// distinct totals: two players tied at the top both take place 1 and the
/// next lower total takes place 2.
pub fn calculate_evening_stats(games: &[PlayedGame], participant_ids: &[String]) -> EveningStats {
    let participant_count = participant_ids.len() as u32;

    let mut player_points: Vec<PlayerPoints> = Vec::new();
    let mut player_index: HashMap<&str, usize> = HashMap::new();
    let mut total_points = 0u32;
    let mut max_points = 0u32;

    for score in games.iter().flat_map(|game| game.scores.iter()) {
        let Some(user_id) = score.resolved_user_id() else {
            continue;
        };

        let index = *player_index.entry(user_id).or_insert_with(|| {
            player_points.push(PlayerPoints {
                user_id: user_id.to_string(),
                points: 0,
            });
            player_points.len() - 1
        });

        // Totals saturate instead of wrapping
        let player = &mut player_points[index];
        player.points = player.points.saturating_add(score.points);
        total_points = total_points.saturating_add(score.points);
        max_points = max_points.max(score.points);
    }

    if player_points.is_empty() {
        return EveningStats::empty(participant_count);
    }

    // Stable sort keeps first-seen order among equal totals
    player_points.sort_by(|a, b| b.points.cmp(&a.points));

    let top_points = player_points[0].points;
    let winner_ids = player_points
        .iter()
        .take_while(|p| p.points == top_points)
        .map(|p| p.user_id.clone())
        .collect();

    EveningStats {
        winner_ids,
        max_points,
        total_points,
        placements: rank_placements(&player_points),
        player_points,
        game_count: count_game_types(games),
        participant_count,
        games_played_count: games.len() as u32,
    }
}

/// Assigns places to players already sorted by points, descending
fn rank_placements(sorted: &[PlayerPoints]) -> Vec<Placement> {
    let mut placements = Vec::new();
    let mut place = 0;
    let mut previous_points = None;

    for entry in sorted {
        if previous_points != Some(entry.points) {
            place += 1;
            previous_points = Some(entry.points);
        }
        if place > MAX_RECORDED_PLACE {
            break;
        }
        placements.push(Placement {
            user_id: entry.user_id.clone(),
            place,
        });
    }

    placements
}

/// First score above [`MAX_SCORE_POINTS`], as (user id, points)
pub fn find_oversized_score(games: &[PlayedGame]) -> Option<(&str, u32)> {
    games
        .iter()
        .flat_map(|game| game.scores.iter())
        .find(|score| score.points > MAX_SCORE_POINTS)
        .map(|score| (score.user_id.as_deref().unwrap_or_default(), score.points))
}

fn count_game_types(games: &[PlayedGame]) -> Vec<GameCount> {
    let mut seen = HashSet::new();
    games
        .iter()
        .filter_map(PlayedGame::resolved_game_id)
        .filter(|game_id| seen.insert(*game_id))
        .map(|game_id| GameCount {
            game_id: game_id.to_string(),
            count: 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evening::models::Score;
    use rstest::rstest;

    fn roster(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn single_game(scores: &[(&str, u32)]) -> Vec<PlayedGame> {
        vec![PlayedGame::new(
            "game",
            scores.iter().map(|(id, pts)| Score::new(id, *pts)).collect(),
        )]
    }

    fn places(stats: &EveningStats) -> Vec<(&str, u32)> {
        stats
            .placements
            .iter()
            .map(|p| (p.user_id.as_str(), p.place))
            .collect()
    }

    #[test]
    fn empty_games_only_reports_participant_count() {
        let stats = calculate_evening_stats(&[], &roster(&["a", "b", "c"]));

        assert_eq!(stats, EveningStats::empty(3));
        assert_eq!(stats.participant_count, 3);
        assert_eq!(stats.games_played_count, 0);
        assert!(stats.winner_ids.is_empty());
        assert!(stats.game_count.is_empty());
    }

    #[test]
    fn games_without_resolvable_scores_match_empty_shape() {
        let games = vec![PlayedGame {
            game_id: Some("catan".to_string()),
            scores: vec![
                Score {
                    user_id: None,
                    points: 12,
                },
                Score {
                    user_id: Some(String::new()),
                    points: 4,
                },
            ],
            notes: None,
        }];

        let stats = calculate_evening_stats(&games, &roster(&["a", "b"]));
        assert_eq!(stats, EveningStats::empty(2));
    }

    #[test]
    fn repeated_game_type_counts_once_and_points_accumulate() {
        let games = vec![
            PlayedGame::new("x", vec![Score::new("A", 10), Score::new("B", 10)]),
            PlayedGame::new("x", vec![Score::new("A", 5)]),
        ];

        let stats = calculate_evening_stats(&games, &roster(&["A", "B"]));

        assert_eq!(
            stats.game_count,
            vec![GameCount {
                game_id: "x".to_string(),
                count: 1
            }]
        );
        assert_eq!(
            stats.player_points,
            vec![
                PlayerPoints {
                    user_id: "A".to_string(),
                    points: 15
                },
                PlayerPoints {
                    user_id: "B".to_string(),
                    points: 10
                },
            ]
        );
        assert_eq!(stats.winner_ids, vec!["A"]);
        assert_eq!(stats.games_played_count, 2);
        assert_eq!(stats.total_points, 25);
        assert_eq!(stats.max_points, 10);
    }

    #[test]
    fn skips_scores_without_participant() {
        let games = vec![PlayedGame::new(
            "x",
            vec![
                Score::new("A", 4),
                Score {
                    user_id: None,
                    points: 99,
                },
            ],
        )];

        let stats = calculate_evening_stats(&games, &roster(&["A"]));
        assert_eq!(stats.total_points, 4);
        assert_eq!(stats.max_points, 4);
        assert_eq!(stats.player_points.len(), 1);
    }

    #[test]
    fn games_without_type_are_not_counted() {
        let games = vec![
            PlayedGame {
                game_id: None,
                scores: vec![Score::new("A", 1)],
                notes: Some("house rules".to_string()),
            },
            PlayedGame::new("y", vec![Score::new("A", 2)]),
        ];

        let stats = calculate_evening_stats(&games, &roster(&["A"]));
        assert_eq!(stats.game_count.len(), 1);
        assert_eq!(stats.game_count[0].game_id, "y");
        assert_eq!(stats.games_played_count, 2);
    }

    #[rstest]
    #[case(&[("A", 30), ("B", 30), ("C", 20)], &[("A", 1), ("B", 1), ("C", 2)])]
    #[case(&[("A", 40), ("B", 30), ("C", 20), ("D", 10)], &[("A", 1), ("B", 2), ("C", 3)])]
    #[case(&[("A", 10), ("B", 10), ("C", 10), ("D", 10)], &[("A", 1), ("B", 1), ("C", 1), ("D", 1)])]
    #[case(&[("A", 9), ("B", 8), ("C", 7), ("D", 7), ("E", 6)], &[("A", 1), ("B", 2), ("C", 3), ("D", 3)])]
    #[case(&[("A", 5)], &[("A", 1)])]
    fn placements_share_places_on_ties(
        #[case] scores: &[(&str, u32)],
        #[case] expected: &[(&str, u32)],
    ) {
        let ids: Vec<&str> = scores.iter().map(|(id, _)| *id).collect();
        let stats = calculate_evening_stats(&single_game(scores), &roster(&ids));

        assert_eq!(places(&stats), expected.to_vec());
    }

    #[test]
    fn two_way_tie_at_the_top_yields_two_winners() {
        let stats = calculate_evening_stats(
            &single_game(&[("A", 12), ("B", 20), ("C", 20)]),
            &roster(&["A", "B", "C"]),
        );

        assert_eq!(stats.winner_ids, vec!["B", "C"]);
    }

    #[test]
    fn totals_and_maximum_are_consistent_with_player_points() {
        let games = vec![
            PlayedGame::new("x", vec![Score::new("A", 3), Score::new("B", 17)]),
            PlayedGame::new("y", vec![Score::new("B", 2), Score::new("C", 11)]),
            PlayedGame::new("z", vec![Score::new("A", 9), Score::new("C", 0)]),
        ];

        let stats = calculate_evening_stats(&games, &roster(&["A", "B", "C"]));

        let sum: u32 = stats.player_points.iter().map(|p| p.points).sum();
        assert_eq!(sum, stats.total_points);
        assert_eq!(stats.max_points, 17);
        assert_eq!(stats.player_points[0].user_id, "B");
        assert_eq!(stats.participant_count, 3);
    }

    #[test]
    fn scorers_outside_roster_still_count() {
        let stats = calculate_evening_stats(&single_game(&[("guest", 8)]), &roster(&["A"]));

        assert_eq!(stats.winner_ids, vec!["guest"]);
        assert_eq!(stats.participant_count, 1);
    }

    #[test]
    fn huge_totals_saturate_instead_of_overflowing() {
        let games = vec![
            PlayedGame::new("x", vec![Score::new("A", 3_000_000_000)]),
            PlayedGame::new("y", vec![Score::new("A", 3_000_000_000), Score::new("B", 1)]),
        ];

        let stats = calculate_evening_stats(&games, &roster(&["A", "B"]));

        assert_eq!(stats.points_of("A"), u32::MAX);
        assert_eq!(stats.total_points, u32::MAX);
        assert_eq!(stats.winner_ids, vec!["A"]);
        assert_eq!(places(&stats), vec![("A", 1), ("B", 2)]);
    }

    #[test]
    fn oversized_scores_are_found() {
        let games = vec![
            PlayedGame::new("x", vec![Score::new("A", MAX_SCORE_POINTS)]),
            PlayedGame::new("y", vec![Score::new("B", MAX_SCORE_POINTS + 1)]),
        ];

        assert_eq!(find_oversized_score(&games[..1]), None);
        assert_eq!(
            find_oversized_score(&games),
            Some(("B", MAX_SCORE_POINTS + 1))
        );
    }
}
