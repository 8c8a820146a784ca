use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

use super::models::{PlacementTrendEntry, ScoreTrendEntry, UserStat};
use crate::evening::models::{sort_chronologically, Evening};

/// Number of best evenings averaged into the peak performance
const PEAK_EVENINGS: usize = 3;

/// One attended evening from a single user's point of view
#[derive(Debug, Clone, PartialEq)]
struct TimelineEntry {
    evening_id: String,
    date: DateTime<Utc>,
    points: u32,
    placement: Option<u32>,
    was_winner: bool,
    was_host: bool,
}

/// `part` as a rounded percentage of `whole`, 0 when `whole` is 0
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

/// Sum that stops at `u32::MAX` instead of overflowing
pub fn saturating_sum(values: impl IntoIterator<Item = u32>) -> u32 {
    values.into_iter().fold(0, u32::saturating_add)
}

/// Computes every participant's statistics for `year` from its completed evenings.
///
/// Evenings that are not finalized or archived, or that belong to another year,
/// are ignored. Results are recomputed from each evening's games; the cached
/// copy on the evening is never read. Rows are ordered by user ID.
pub fn rebuild_year_stats(year: i32, evenings: &[Evening]) -> Vec<UserStat> {
    let mut completed: Vec<Evening> = evenings
        .iter()
        .filter(|e| e.year == year && e.status.is_completed())
        .cloned()
        .collect();
    sort_chronologically(&mut completed);

    let total_possible = completed.len() as u32;
    let evening_ids: Vec<&str> = completed.iter().map(|e| e.id.as_str()).collect();

    let mut timelines: BTreeMap<String, Vec<TimelineEntry>> = BTreeMap::new();
    for evening in &completed {
        let results = evening.compute_stats();
        let mut seen = HashSet::new();

        for user_id in &evening.participant_ids {
            if user_id.is_empty() || !seen.insert(user_id.as_str()) {
                continue;
            }
            timelines
                .entry(user_id.clone())
                .or_default()
                .push(TimelineEntry {
                    evening_id: evening.id.clone(),
                    date: evening.effective_date(),
                    points: results.points_of(user_id),
                    placement: results.placement_of(user_id),
                    was_winner: results.is_winner(user_id),
                    was_host: evening.is_hosted_by(user_id),
                });
        }
    }

    timelines
        .into_iter()
        .map(|(user_id, timeline)| {
            aggregate_user(user_id, year, &timeline, &evening_ids, total_possible)
        })
        .collect()
}

fn aggregate_user(
    user_id: String,
    year: i32,
    timeline: &[TimelineEntry],
    evening_ids: &[&str],
    total_possible: u32,
) -> UserStat {
    let attended = timeline.len() as u32;
    let total_points = saturating_sum(timeline.iter().map(|e| e.points));
    let total_wins = timeline.iter().filter(|e| e.was_winner).count() as u32;

    let count_place = |place: u32| {
        timeline
            .iter()
            .filter(|e| e.placement == Some(place))
            .count() as u32
    };
    let first_places = count_place(1);
    let second_places = count_place(2);
    let third_places = count_place(3);

    let placed: Vec<u32> = timeline.iter().filter_map(|e| e.placement).collect();
    let average_placement = if placed.is_empty() {
        None
    } else {
        Some(saturating_sum(placed.iter().copied()) as f64 / placed.len() as f64)
    };

    let (longest_win_streak, last_win_date) = win_streak(timeline);

    let attended_ids: HashSet<&str> = timeline.iter().map(|e| e.evening_id.as_str()).collect();
    let (longest_attendance_streak, longest_absence_streak) =
        presence_streaks(evening_ids, &attended_ids);

    UserStat {
        user_id,
        year,
        total_points,
        total_wins,
        evenings_attended: attended,
        total_possible_evenings: total_possible,
        avg_points: if attended == 0 {
            0.0
        } else {
            total_points as f64 / attended as f64
        },
        average_placement,
        best_evening_points: timeline.iter().map(|e| e.points).max().unwrap_or_default(),
        worst_evening_points: timeline.iter().map(|e| e.points).min().unwrap_or_default(),
        win_rate: percentage(total_wins, attended),
        attendance_rate: percentage(attended, total_possible),
        first_places,
        second_places,
        third_places,
        other_places: attended - first_places - second_places - third_places,
        host_count: timeline.iter().filter(|e| e.was_host).count() as u32,
        longest_win_streak,
        last_win_date,
        longest_attendance_streak,
        longest_absence_streak,
        peak_performance: peak_performance(timeline),
        score_trend: timeline
            .iter()
            .map(|e| ScoreTrendEntry {
                date: e.date,
                points: e.points,
                evening_id: e.evening_id.clone(),
            })
            .collect(),
        placement_trend: timeline
            .iter()
            .map(|e| PlacementTrendEntry {
                date: e.date,
                place: e.placement,
                evening_id: e.evening_id.clone(),
            })
            .collect(),
    }
}

/// Longest run of consecutive wins and the date of the latest win
fn win_streak(timeline: &[TimelineEntry]) -> (u32, Option<DateTime<Utc>>) {
    let mut current = 0;
    let mut longest = 0;
    let mut last_win = None;

    for entry in timeline {
        if entry.was_winner {
            current += 1;
            longest = longest.max(current);
            last_win = Some(entry.date);
        } else {
            current = 0;
        }
    }

    (longest, last_win)
}

/// Longest attendance and absence runs, walked over every evening of the year
fn presence_streaks(evening_ids: &[&str], attended: &HashSet<&str>) -> (u32, u32) {
    let (mut attendance, mut absence) = (0, 0);
    let (mut longest_attendance, mut longest_absence) = (0, 0);

    for evening_id in evening_ids {
        if attended.contains(evening_id) {
            attendance += 1;
            absence = 0;
            longest_attendance = longest_attendance.max(attendance);
        } else {
            absence += 1;
            attendance = 0;
            longest_absence = longest_absence.max(absence);
        }
    }

    (longest_attendance, longest_absence)
}

fn peak_performance(timeline: &[TimelineEntry]) -> f64 {
    let mut points: Vec<u32> = timeline.iter().map(|e| e.points).collect();
    points.sort_unstable_by(|a, b| b.cmp(a));
    let best = &points[..points.len().min(PEAK_EVENINGS)];

    if best.is_empty() {
        0.0
    } else {
        best.iter().map(|&p| f64::from(p)).sum::<f64>() / best.len() as f64
    }
}
