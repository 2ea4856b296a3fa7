#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use safepaste::clock::Clock;
use safepaste::config::Config;
use safepaste::store::MemoryStore;
use safepaste::App;

pub fn config(base_url: &str, max_upload_size: usize) -> Config {
    Config::parse(&format!(
        r#"
        base_url = "{base_url}"
        port = 0
        default_owner = "test-user"

        [database]
        url = "sqlite::memory:"

        [storage]
        kind = "memory"

        [limits]
        max_upload_size = {max_upload_size}
        "#
    ))
    .unwrap()
}

pub fn app(base_url: &str) -> App {
    App {
        config: config(base_url, 1024 * 1024),
        store: MemoryStore::new().into(),
    }
}

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new() -> Self {
        ManualClock(Arc::new(Mutex::new(Utc::now())))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
