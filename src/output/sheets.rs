use super::Row;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

/// Where in a spreadsheet rows should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    /// An A1-notation range, e.g. `Summary!A1`.
    pub range: String,
}
impl SheetTarget {
    fn url(&self) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(&self.range)
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    updated_cells: u64,
}

/// Overwrites the target range with the given rows, interpreting values as if a user had typed
/// them (so dates and numbers are formatted by the sheet). Returns the number of cells updated.
///
/// The access token is used as-is, getting and refreshing it is up to the caller.
pub fn write_rows(access_token: &str, target: &SheetTarget, rows: &[Row]) -> Result<u64> {
    let url = target.url();
    log::debug!("PUT {url}");
    let mut res = ureq::put(&url)
        .config()
        .http_status_as_error(false)
        .build()
        .header("Authorization", format!("Bearer {access_token}").as_str())
        .query("valueInputOption", "USER_ENTERED")
        .send_json(update_body(rows))?;
    if res.status() != 200 {
        bail!(
            "failed to write to spreadsheet {}, received status {}",
            target.spreadsheet_id,
            res.status()
        );
    }

    let update: UpdateResponse = res
        .body_mut()
        .read_json()
        .with_context(|| "failed to parse spreadsheet update response")?;
    Ok(update.updated_cells)
}

/// Sheets has no null cells, so absent values are written as blanks.
fn update_body(rows: &[Row]) -> Value {
    let values = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| if cell.is_null() { json!("") } else { cell.clone() })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    json!({ "majorDimension": "ROWS", "values": values })
}
