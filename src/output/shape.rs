use crate::{
    api::{int_to_date, Project, Task, TimeEntry},
    summary::GroupSummary,
};
use chrono::NaiveDate;
use serde_json::Value;

/// One row of tabular output. Cells are JSON scalars so the same rows can go to a CSV file or
/// straight into a spreadsheet.
pub type Row = Vec<Value>;

/// A record that can be flattened into a single row under a fixed header.
pub trait Tabular {
    /// The column names, in the order [`Tabular::row`] produces cells.
    const HEADER: &'static [&'static str];

    fn row(&self) -> Row;
}

/// Flattens the given records into rows. A single header row is prefixed when there's more than
/// one record.
pub fn rows<T: Tabular>(items: &[T]) -> Vec<Row> {
    let header: Option<Row> =
        (items.len() > 1).then(|| T::HEADER.iter().map(|h| Value::from(*h)).collect());
    header.into_iter().chain(items.iter().map(T::row)).collect()
}

impl Tabular for GroupSummary {
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "start-date",
        "due-date",
        "progress",
        "progress-percent",
        "estimated-minutes",
        "tasks",
        "completed",
        "completed-percent",
        "active",
        "late",
    ];

    fn row(&self) -> Row {
        let s = &self.summary;
        vec![
            self.id.into(),
            self.name.as_str().into(),
            date_cell(s.start_date),
            date_cell(s.due_date),
            s.progress_total.into(),
            s.progress_percent.into(),
            s.estimated_minutes.into(),
            s.task_count.into(),
            s.completed_count.into(),
            s.completed_percent.into(),
            s.active_count.into(),
            s.late_count.into(),
        ]
    }
}

impl Tabular for Task {
    const HEADER: &'static [&'static str] = &[
        "id",
        "project-id",
        "project-name",
        "content",
        "status",
        "completed",
        "progress",
        "start-date",
        "due-date",
        "estimated-minutes",
        "responsible",
        "creator",
    ];

    fn row(&self) -> Row {
        vec![
            self.id.into(),
            self.project_id.into(),
            self.project_name.clone().into(),
            self.content.clone().into(),
            self.status.clone().into(),
            self.completed.into(),
            self.progress.into(),
            int_date_cell(self.start_date),
            int_date_cell(self.due_date),
            self.estimated_minutes.into(),
            self.responsible_party_names.clone().into(),
            self.creator().into(),
        ]
    }
}

impl Tabular for Project {
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "status",
        "sub-status",
        "start-date",
        "end-date",
        "owner",
    ];

    fn row(&self) -> Row {
        vec![
            self.id.into(),
            self.name.as_str().into(),
            self.status.clone().into(),
            self.sub_status.clone().into(),
            int_date_cell(self.start_date),
            int_date_cell(self.end_date),
            self.owner.as_ref().and_then(|o| o.name.clone()).into(),
        ]
    }
}

impl Tabular for TimeEntry {
    const HEADER: &'static [&'static str] = &[
        "id",
        "project-id",
        "person-id",
        "task-id",
        "date",
        "hours",
        "minutes",
        "description",
        "billable",
    ];

    fn row(&self) -> Row {
        vec![
            self.id.into(),
            self.project_id.into(),
            self.person_id.into(),
            self.todo_item_id.into(),
            self.date.clone().into(),
            self.hours.into(),
            self.minutes.into(),
            self.description.clone().into(),
            self.isbillable.into(),
        ]
    }
}

/// Flattens a JSON record of no particular shape into `[field, value]` rows, naming nested fields
/// by their dotted path (`tasks.active`). Arrays stay whole, as JSON text. As with [`rows`], a
/// header is prefixed when there's more than one field.
pub fn field_rows(value: &Value) -> Vec<Row> {
    let mut fields = Vec::new();
    flatten_into("", value, &mut fields);
    let header: Option<Row> =
        (fields.len() > 1).then(|| vec![Value::from("field"), Value::from("value")]);
    header.into_iter().chain(fields).collect()
}

fn flatten_into(path: &str, value: &Value, rows: &mut Vec<Row>) {
    match value {
        Value::Object(fields) => {
            for (key, inner) in fields {
                let inner_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten_into(&inner_path, inner, rows);
            }
        }
        Value::Array(_) => rows.push(vec![path.into(), value.to_string().into()]),
        scalar => rows.push(vec![path.into(), scalar.clone()]),
    }
}

fn date_cell(date: Option<NaiveDate>) -> Value {
    date.map(|d| d.format("%Y-%m-%d").to_string()).into()
}

/// Dates the API sent that don't name a real day are passed through as numbers.
fn int_date_cell(date: Option<u32>) -> Value {
    match date {
        Some(value) => int_to_date(value).map_or(value.into(), |d| date_cell(Some(d))),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{fixtures::task_due, Summary};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn group(id: u64, name: &str) -> GroupSummary {
        GroupSummary {
            id,
            name: name.to_string(),
            summary: Summary {
                start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
                due_date: None,
                progress_total: 150,
                progress_percent: 0.75,
                estimated_minutes: 60,
                task_count: 2,
                completed_count: 1,
                completed_percent: 0.5,
                active_count: 1,
                late_count: 0,
                projects: Vec::new(),
            },
        }
    }

    #[test]
    fn group_summary_row_is_flat() {
        assert_eq!(
            group(10, "Tech").row(),
            vec![
                json!(10),
                json!("Tech"),
                json!("2020-01-01"),
                Value::Null,
                json!(150),
                json!(0.75),
                json!(60),
                json!(2),
                json!(1),
                json!(0.5),
                json!(1),
                json!(0),
            ]
        );
        assert_eq!(GroupSummary::HEADER.len(), group(10, "Tech").row().len());
    }

    #[test]
    fn header_only_for_multiple_records() {
        assert_eq!(rows(&[group(10, "Tech")]).len(), 1);

        let both = rows(&[group(10, "Tech"), group(20, "Marketing")]);
        assert_eq!(both.len(), 3);
        assert_eq!(both[0][0], json!("id"));
        assert_eq!(both[0][11], json!("late"));
        assert_eq!(both[2][1], json!("Marketing"));

        assert!(rows::<GroupSummary>(&[]).is_empty());
    }

    #[test]
    fn rows_never_carry_projects() {
        let mut g = group(10, "Tech");
        g.summary.projects.push(crate::summary::ProjectDescriptor {
            id: 1,
            name: "Tech Ticket A".to_string(),
            start_date: None,
            end_date: None,
            status: None,
            sub_status: None,
        });
        let row = g.row();
        assert_eq!(row.len(), GroupSummary::HEADER.len());
        assert!(row.iter().all(|cell| !cell.is_array() && !cell.is_object()));
    }

    #[test]
    fn task_rows_format_dates() {
        let row = task_due(4, "new", 20210315).row();
        assert_eq!(row.len(), Task::HEADER.len());
        assert_eq!(row[4], json!("new"));
        assert_eq!(row[7], Value::Null);
        assert_eq!(row[8], json!("2021-03-15"));
    }

    #[test]
    fn loose_records_flatten_to_fields() {
        let summary = json!({
            "tasks": { "active": 4, "late": 1 },
            "name": "Tech Ticket A",
            "tags": ["ops", "web"]
        });
        assert_eq!(
            field_rows(&summary),
            vec![
                vec![json!("field"), json!("value")],
                vec![json!("name"), json!("Tech Ticket A")],
                vec![json!("tags"), json!(r#"["ops","web"]"#)],
                vec![json!("tasks.active"), json!(4)],
                vec![json!("tasks.late"), json!(1)],
            ]
        );

        assert_eq!(field_rows(&json!({ "id": 1 })), vec![vec![json!("id"), json!(1)]]);
        assert!(field_rows(&json!({})).is_empty());
    }

    #[test]
    fn impossible_dates_pass_through() {
        assert_eq!(int_date_cell(Some(20201340)), json!(20201340));
    }
}
