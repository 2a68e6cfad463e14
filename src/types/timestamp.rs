// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::DateTime;
use chrono::Duration;
use chrono::Local;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

/// The number of milliseconds in a day.
pub const DAY_MS: i64 = 86_400_000;

/// A millisecond-precision UTC timestamp. Stored in the database as an
/// integer count of milliseconds since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// The timestamp `days` whole days after this one.
    pub fn plus_days(self, days: u32) -> Self {
        Self(self.0 + Duration::milliseconds(days as i64 * DAY_MS))
    }

    /// The local calendar date, for display.
    pub fn local_date_string(self) -> String {
        self.0.with_timezone(&Local).format("%Y-%m-%d").to_string()
    }

    #[cfg(test)]
    pub fn from_millis(ms: i64) -> Self {
        Self(DateTime::from_timestamp_millis(ms).unwrap())
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.millis()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let ms: i64 = FromSql::column_result(value)?;
        let ts = DateTime::from_timestamp_millis(ms).ok_or(FromSqlError::OutOfRange(ms))?;
        Ok(Timestamp(ts))
    }
}
