use chrono::{DateTime, Duration, TimeZone, Utc};
use keyset::domain::{ContentModel, ContentType};
use keyset::Id;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Content row with every sortable attribute derived from `id` unless overridden.
pub fn content(id: Id, watcher_count: i64) -> ContentModel {
    let kind = match id % 3 {
        0 => ContentType::Movie,
        1 => ContentType::TvSeries,
        _ => ContentType::Sport,
    };

    ContentModel {
        id,
        kind,
        title: format!("Title {id}"),
        description: format!("Description of content {id}"),
        tags: vec![format!("tag-{}", id % 4)],
        average_rating: (id % 4) as f64 * 0.5,
        review_count: (id % 5) as i64,
        watcher_count,
        popularity_score: (id % 3) as f64 + 0.25,
        created_at: epoch() + Duration::hours((id % 6) as i64),
    }
}

/// 23 rows whose sort attributes collide heavily, so every sort field walks
/// through ties.
pub fn catalog() -> Vec<ContentModel> {
    let mut rows: Vec<_> = (1..=23).map(|id| content(id, ((id * 7) % 5) as i64)).collect();

    rows[3].title = "Dune".to_string();
    rows[8].title = "Dune: Part Two".to_string();
    rows[12].description = "A desert planet, spice and DUNE worms".to_string();
    rows.reverse();
    rows
}

/// The five rows of the classic tie scenario: watcher counts `[1, 2, 2, 3, 4]`
/// on ids 1 to 5, stored out of order.
pub fn tie_scenario() -> Vec<ContentModel> {
    vec![
        content(4, 3),
        content(2, 2),
        content(5, 4),
        content(1, 1),
        content(3, 2),
    ]
}
