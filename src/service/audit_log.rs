use crate::error::JournalError;
use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// One submission as written to the audit log.
///
/// Serializes as a flat JSON object: `timestamp` first, then each key-value
/// entry, then `tab_name`. Entry names are written as given, so a key that
/// collides with `timestamp` or `tab_name` appears twice rather than
/// replacing the fixed field.
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub timestamp: String,
    pub key_values: &'a HashMap<String, String>,
    pub tab_name: &'a str,
}

impl<'a> AuditEntry<'a> {
    pub fn now(tab_name: &'a str, key_values: &'a HashMap<String, String>) -> Self {
        Self::at(Local::now(), tab_name, key_values)
    }

    pub fn at<Tz: TimeZone>(
        when: DateTime<Tz>,
        tab_name: &'a str,
        key_values: &'a HashMap<String, String>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            timestamp: when.to_rfc3339_opts(SecondsFormat::Secs, true),
            key_values,
            tab_name,
        }
    }

    pub fn to_line(&self) -> Result<String, JournalError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for AuditEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.key_values.len() + 2))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        for (key, value) in self.key_values {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("tab_name", self.tab_name)?;
        map.end()
    }
}

/// Append-only JSON-lines file shared by every request.
#[derive(Clone)]
pub struct AuditLog {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl AuditLog {
    /// Open the log for appending, creating it and its directory if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        info!(path = %path.display(), "audit log opened");
        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the entry as a single newline-terminated line.
    pub async fn append(&self, entry: &AuditEntry<'_>) -> Result<(), JournalError> {
        let mut line = entry.to_line()?;
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!(tab_name = %entry.tab_name, fields = entry.key_values.len(), "audit entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use serde_json::Value;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_log_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "keyjournal-audit-{tag}-{}-{}",
            std::process::id(),
            nanos
        ));
        path.push("app.log");
        path
    }

    /// Top-level field names in the order they appear in the raw line.
    fn field_order(line: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut de = serde_json::Deserializer::from_str(line);
        struct Collect<'n>(&'n mut Vec<String>);
        impl<'de> serde::de::Visitor<'de> for Collect<'_> {
            type Value = ();
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON object")
            }
            fn visit_map<A: serde::de::MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
                while let Some((k, _)) = map.next_entry::<String, Value>()? {
                    self.0.push(k);
                }
                Ok(())
            }
        }
        serde::Deserializer::deserialize_map(&mut de, Collect(&mut names)).unwrap();
        names
    }

    #[test]
    fn timestamp_first_and_tab_name_last() {
        let kvs: HashMap<String, String> = [("a", "1"), ("b", "2"), ("c", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let entry = AuditEntry::now("demo", &kvs);
        let line = entry.to_line().unwrap();

        let order = field_order(&line);
        assert_eq!(order.len(), 5);
        assert_eq!(order.first().map(String::as_str), Some("timestamp"));
        assert_eq!(order.last().map(String::as_str), Some("tab_name"));

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["a"], "1");
        assert_eq!(value["b"], "2");
        assert_eq!(value["c"], "3");
        assert_eq!(value["tab_name"], "demo");
    }

    #[test]
    fn timestamp_is_rfc3339_seconds() {
        let kvs = HashMap::new();
        let utc = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(
            AuditEntry::at(utc, "t", &kvs).timestamp,
            "2024-03-05T07:08:09Z"
        );

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 3, 5, 9, 8, 9).unwrap();
        assert_eq!(
            AuditEntry::at(local, "t", &kvs).timestamp,
            "2024-03-05T09:08:09+02:00"
        );
    }

    #[test]
    fn awkward_strings_stay_valid_json() {
        let kvs: HashMap<String, String> =
            [("quote\"key".to_string(), "line\nbreak \u{1F600}".to_string())].into();
        let line = AuditEntry::now("tab \"x\"", &kvs).to_line().unwrap();
        assert!(!line.contains('\n'));

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["quote\"key"], "line\nbreak \u{1F600}");
        assert_eq!(value["tab_name"], "tab \"x\"");
    }

    #[test]
    fn colliding_key_is_written_twice() {
        let kvs: HashMap<String, String> = [("tab_name".to_string(), "inner".to_string())].into();
        let line = AuditEntry::now("outer", &kvs).to_line().unwrap();
        assert_eq!(field_order(&line), vec!["timestamp", "tab_name", "tab_name"]);
    }

    #[tokio::test]
    async fn append_writes_one_line_per_entry() {
        let path = temp_log_path("append");
        let log = AuditLog::open(&path).await.unwrap();

        let first: HashMap<String, String> = [("a".to_string(), "1".to_string())].into();
        let second: HashMap<String, String> = [("b".to_string(), "2".to_string())].into();
        log.append(&AuditEntry::now("one", &first)).await.unwrap();
        log.append(&AuditEntry::now("two", &second)).await.unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(contents.ends_with('\n'));

        let v: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(v["tab_name"], "two");
        assert_eq!(v["b"], "2");

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[tokio::test]
    async fn reopening_appends_instead_of_truncating() {
        let path = temp_log_path("reopen");
        let kvs = HashMap::new();
        AuditLog::open(&path)
            .await
            .unwrap()
            .append(&AuditEntry::now("first", &kvs))
            .await
            .unwrap();
        AuditLog::open(&path)
            .await
            .unwrap()
            .append(&AuditEntry::now("second", &kvs))
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
