//! Season documents in the `fglpool import` format.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

/// Two open gameweeks: gw1 has g1/g2, gw2 has g3/g4, all priced 1/2, 3/4,
/// 5/6 (home, draw, away). Gameweek 1 also opens a `title` pool.
pub fn two_gameweeks() -> Value {
    let deadline = |days: i64| (Utc::now() + Duration::days(days)).to_rfc3339();
    let game = |id: &str| {
        json!({
            "id": id,
            "home_team": format!("{id} home"),
            "away_team": format!("{id} away"),
            "home_odds": "1/2",
            "draw_odds": "3/4",
            "away_odds": "5/6",
        })
    };
    json!({
        "season": { "name": "Test season", "base_allowance": "100.00" },
        "gameweeks": [
            { "number": 1, "deadline": deadline(7), "games": [game("g1"), game("g2")] },
            { "number": 2, "deadline": deadline(14), "spiel": "Derby week", "games": [game("g3"), game("g4")] },
        ],
        "propositions": [
            {
                "id": "title",
                "gameweek": 1,
                "description": "Title winner",
                "allowance": "100.00",
                "options": [
                    { "id": "one", "description": "Team One", "odds": "10/11" },
                    { "id": "two", "description": "Team Two", "odds": "20/29" },
                ],
            },
        ],
    })
}
