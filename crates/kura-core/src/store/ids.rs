use chrono::Utc;

/// Source of ids for new list entries.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Millisecond-timestamp ids.
///
/// Ids never repeat within one generator: when the clock has not advanced
/// since the last id (or went backwards) the previous value plus one is used.
#[derive(Debug, Default)]
pub struct TimestampIds {
    last: i64,
}

impl TimestampIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for TimestampIds {
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last.to_string()
    }
}
