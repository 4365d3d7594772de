use log::warn;

use crate::container_management::ContainerRecord;

const SHORT_ID_LEN: usize = 12;
const NO_NAME: &str = "<unnamed>";
const NO_ID: &str = "<no id>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Healthy,
    Unhealthy,
}

/// One table row, computed from exactly one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Full identifier, used as the action target.
    pub id: String,
    pub short_id: String,
    pub display_name: String,
    pub status_label: String,
    pub status_class: StatusClass,
}

impl DisplayRow {
    /// Never fails: a malformed record gets placeholders instead.
    pub fn from_record(record: &ContainerRecord) -> Self {
        if let Err(e) = record.check() {
            warn!("{}, showing a degraded row", e);
        }

        let short_id = if record.id.is_empty() {
            NO_ID.to_string()
        } else {
            record.id.chars().take(SHORT_ID_LEN).collect()
        };

        let display_name = record
            .names
            .first()
            .map(|name| name.strip_prefix('/').unwrap_or(name.as_str()))
            .filter(|name| !name.is_empty())
            .unwrap_or(NO_NAME)
            .to_string();

        let status_class = if record.state.is_running() {
            StatusClass::Healthy
        } else {
            StatusClass::Unhealthy
        };

        Self {
            id: record.id.clone(),
            short_id,
            display_name,
            status_label: record.state.to_string().to_uppercase(),
            status_class,
        }
    }
}

/// Immutable, display-ready projection of one backend answer.
///
/// Rows keep the backend order and are not deduplicated. A refresh builds a new
/// snapshot; there is no way to patch one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    rows: Vec<DisplayRow>,
}

impl Snapshot {
    pub fn build(records: &[ContainerRecord]) -> Self {
        Self {
            rows: records.iter().map(DisplayRow::from_record).collect(),
        }
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&DisplayRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container_management::ContainerState;

    fn sample() -> Vec<ContainerRecord> {
        vec![
            ContainerRecord::new("abc123456789ffff", "/web", ContainerState::Running),
            ContainerRecord::new("def123456789ffff", "/db", ContainerState::Exited),
        ]
    }

    #[test]
    fn builds_display_fields() {
        let snapshot = Snapshot::build(&sample());

        assert_eq!(snapshot.len(), 2);
        let web = &snapshot.rows()[0];
        assert_eq!(web.short_id, "abc123456789");
        assert_eq!(web.display_name, "web");
        assert_eq!(web.status_label, "RUNNING");
        assert_eq!(web.status_class, StatusClass::Healthy);

        let db = &snapshot.rows()[1];
        assert_eq!(db.short_id, "def123456789");
        assert_eq!(db.display_name, "db");
        assert_eq!(db.status_label, "EXITED");
        assert_eq!(db.status_class, StatusClass::Unhealthy);
        assert_eq!(db.id, "def123456789ffff");
    }

    #[test]
    fn keeps_backend_order_and_duplicates() {
        let mut records = sample();
        records.push(records[0].clone());
        records.reverse();

        let snapshot = Snapshot::build(&records);

        let names: Vec<_> = snapshot
            .rows()
            .iter()
            .map(|r| r.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["web", "db", "web"]);
    }

    #[test]
    fn short_ids_shorter_than_twelve_are_kept_whole() {
        let record = ContainerRecord::new("abc", "/tiny", ContainerState::Paused);
        let row = DisplayRow::from_record(&record);
        assert_eq!(row.short_id, "abc");
        assert_eq!(row.status_class, StatusClass::Unhealthy);
    }

    #[test]
    fn malformed_records_degrade_to_placeholders() {
        let mut nameless = ContainerRecord::new("", "/x", ContainerState::Running);
        nameless.names.clear();
        let slash_only = ContainerRecord::new("f00", "/", ContainerState::Dead);
        let fine = ContainerRecord::new("aaa", "/ok", ContainerState::Created);

        let snapshot = Snapshot::build(&[nameless, slash_only, fine]);

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.rows()[0].display_name, NO_NAME);
        assert_eq!(snapshot.rows()[0].short_id, NO_ID);
        assert_eq!(snapshot.rows()[1].display_name, NO_NAME);
        assert_eq!(snapshot.rows()[2].display_name, "ok");
    }

    #[test]
    fn only_one_leading_separator_is_stripped() {
        let record = ContainerRecord::new("abc", "//nested", ContainerState::Running);
        assert_eq!(DisplayRow::from_record(&record).display_name, "/nested");
    }

    #[test]
    fn unknown_states_are_uppercased() {
        let record = ContainerRecord::new("abc", "/odd", ContainerState::from("hibernating"));
        let row = DisplayRow::from_record(&record);
        assert_eq!(row.status_label, "HIBERNATING");
        assert_eq!(row.status_class, StatusClass::Unhealthy);
    }

    #[test]
    fn empty_input_gives_empty_snapshot() {
        assert!(Snapshot::build(&[]).is_empty());
    }
}
