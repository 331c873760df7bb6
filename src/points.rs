use crate::ranking_context::RankingContext;

// Points for one side: each unit of own score is worth `win_value`, each unit of the opponent's
// score costs down to `loss_value`.
fn side_points(own_score: f64, opp_score: f64, win_value: f64, loss_value: f64) -> f64 {
    own_score * win_value + opp_score * loss_value
}

/// Ranking points earned by each side of a series, given both sides'
/// ratings when the series started. Returns `(home, away)`.
///
/// Drawn matches count as half a win each, the series winner gets a bonus
/// (split on a tied series), and every unit of score is valued against the
/// ratings: within the gap threshold both sides play for the opponent's
/// rating +/- the close step; beyond it the stronger side plays for its own
/// rating +10/-90 and the weaker side for its own rating +90/-10.
pub fn calc_points(num_matches: u32, home_score: u32, away_score: u32, home_rating: f64, away_rating: f64, ranking_context: &RankingContext) -> (f64, f64) {
    // One-off tests carry no bonus and don't move ratings
    if num_matches <= 1 {
        return (0.0, 0.0);
    }

    let drawn = num_matches as f64 - (home_score + away_score) as f64;
    let mut home = home_score as f64 + ranking_context.draw_share * drawn;
    let mut away = away_score as f64 + ranking_context.draw_share * drawn;

    if home > away {
        home += ranking_context.series_bonus;
    } else if away > home {
        away += ranking_context.series_bonus;
    } else {
        home += ranking_context.series_bonus / 2.0;
        away += ranking_context.series_bonus / 2.0;
    }

    let close = ranking_context.close_step;
    let small = ranking_context.mismatch_small_step;
    let large = ranking_context.mismatch_large_step;

    if (home_rating - away_rating).abs() < ranking_context.rating_gap_threshold {
        (
            side_points(home, away, away_rating + close, away_rating - close),
            side_points(away, home, home_rating + close, home_rating - close),
        )
    } else if home_rating > away_rating {
        (
            side_points(home, away, home_rating + small, home_rating - large),
            side_points(away, home, away_rating + large, away_rating - small),
        )
    } else {
        (
            side_points(home, away, home_rating + large, home_rating - small),
            side_points(away, home, away_rating + small, away_rating - large),
        )
    }
}
