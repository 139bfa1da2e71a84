//! Upstream course JSON → [`CourseRow`].

use coursecrawl_shared::CourseRow;
use serde_json::Value;

/// Map one raw course object onto the fixed list-mode shape.
///
/// Values are copied as-is; a missing key (or a non-object input) yields
/// `null` for the affected columns.
pub fn map_course(raw: &Value) -> CourseRow {
    let field = |key: &str| raw.get(key).cloned().unwrap_or(Value::Null);

    CourseRow {
        id: field("id"),
        title: field("title"),
        url: field("url"),
        price: field("price"),
        rating: field("avg_rating"),
        subscribers: field("num_subscribers"),
        reviews: field("num_reviews"),
        published_lectures: field("num_published_lectures"),
        level: field("instructional_level"),
        duration: field("content_info"),
        published_at: field("published_time"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_course() -> Value {
        json!({
            "_class": "course",
            "id": 567828,
            "title": "The Complete Python Course",
            "url": "/course/complete-python/",
            "price": "$94.99",
            "avg_rating": 4.61,
            "num_subscribers": 1_203_442,
            "num_reviews": 402_114,
            "num_published_lectures": 156,
            "instructional_level": "All Levels",
            "content_info": "22 total hours",
            "published_time": "2016-07-20T19:33:41Z",
            "is_paid": true
        })
    }

    #[test]
    fn renames_upstream_keys() {
        let row = map_course(&raw_course());
        assert_eq!(row.id, json!(567828));
        assert_eq!(row.rating, json!(4.61));
        assert_eq!(row.subscribers, json!(1_203_442));
        assert_eq!(row.reviews, json!(402_114));
        assert_eq!(row.published_lectures, json!(156));
        assert_eq!(row.level, json!("All Levels"));
        assert_eq!(row.duration, json!("22 total hours"));
        assert_eq!(row.published_at, json!("2016-07-20T19:33:41Z"));
    }

    #[test]
    fn missing_keys_become_null() {
        let row = map_course(&json!({"id": 1, "title": "Sparse"}));
        assert_eq!(row.title, json!("Sparse"));
        assert_eq!(row.price, Value::Null);
        assert_eq!(row.published_at, Value::Null);

        let row = map_course(&json!("not an object"));
        assert_eq!(row.id, Value::Null);
    }

    #[test]
    fn mapping_is_deterministic() {
        let raw = raw_course();
        assert_eq!(map_course(&raw), map_course(&raw));
    }
}
