//! CSV statistics files.

use std::{collections::BTreeMap, fs::File, path::Path};

use anyhow::{Context, Result, bail};
use polars::{io::SerReader, prelude::CsvReadOptions};
use serde_json::{Map, Value, json};

/// Read a CSV with a header row; every cell is kept as text, empty cells as null.
pub(crate) fn read_rows(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let file = File::open(path)
        .with_context(|| format!("[feed::csv] Failed to open CSV file: {}", path.display()))?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[feed::csv] Failed to read CSV from {}", path.display()))?;

    let mut rows = vec![Map::new(); df.height()];
    for column in df.get_columns() {
        let name = column.name().trim().to_lowercase();
        let values = column.str()
            .with_context(|| format!("[feed::csv] Column {name:?} is not text"))?;
        for (row, value) in rows.iter_mut().zip(values.into_iter()) {
            let value = value.map(str::trim).filter(|v| !v.is_empty());
            row.insert(name.clone(), value.map_or(Value::Null, |v| Value::String(v.to_string())));
        }
    }
    Ok(rows)
}

fn precinct_key(row: &Map<String, Value>) -> Result<String> {
    match row.get("precinct_number").or_else(|| row.get("precinct")) {
        Some(Value::String(key)) => Ok(key.clone()),
        _ => bail!("[feed::csv] Row without a precinct_number: {}", Value::Object(row.clone())),
    }
}

/// One row per precinct: `precinct_number,votes,active_voters,inactive_voters[,total_registered][,precinct_name]`.
pub(crate) fn votes_payload(rows: Vec<Map<String, Value>>) -> Result<Value> {
    let mut payload = Map::new();
    for mut row in rows {
        let key = precinct_key(&row)?;
        row.remove("precinct_number");
        row.remove("precinct");
        row.retain(|_, v| !v.is_null());
        payload.insert(key, Value::Object(row));
    }
    Ok(Value::Object(payload))
}

/// One row per precinct and candidate:
/// `precinct_number,precinct_name,candidate_name,party,votes[,registered_voters]`.
pub(crate) fn results_payload(rows: Vec<Map<String, Value>>) -> Result<Value> {
    let mut precincts: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    let mut order = Vec::new();

    for row in rows {
        let key = precinct_key(&row)?;
        let name = row.get("candidate_name").or_else(|| row.get("name")).cloned().unwrap_or(Value::Null);
        if name.is_null() {
            bail!("[feed::csv] Row for precinct {key} has no candidate_name");
        }
        let entry = precincts.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            let registered = row.get("registered_voters").or_else(|| row.get("population")).cloned();
            let mut precinct = Map::new();
            precinct.insert("precinct_name".into(), row.get("precinct_name").cloned().unwrap_or(Value::Null));
            precinct.insert("registered_voters".into(), registered.unwrap_or(Value::Null));
            precinct.insert("candidates".into(), Value::Array(Vec::new()));
            precinct
        });
        if let Some(Value::Array(candidates)) = entry.get_mut("candidates") {
            candidates.push(json!({
                "name": name,
                "party": row.get("party").cloned().unwrap_or(Value::Null),
                "votes": row.get("votes").cloned().unwrap_or(Value::Null),
            }));
        }
    }

    let mut payload = Map::new();
    for key in order {
        if let Some(precinct) = precincts.remove(&key) {
            payload.insert(key, Value::Object(precinct));
        }
    }
    Ok(Value::Object(payload))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::{stats::StatsTable, types::PrecinctId};

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn votes_csv_becomes_a_stats_table() {
        let file = csv_file("precinct_number,votes,active_voters,inactive_voters\n-1,500,,\n001,120,400,20\n2,80,300,\n");
        let payload = votes_payload(read_rows(file.path()).unwrap()).unwrap();
        let table = StatsTable::from_votes_payload(&payload).unwrap();

        assert_eq!(table.total().map(|t| t.votes), Some(500));
        let first = table.get(&PrecinctId::new("1")).unwrap();
        assert_eq!((first.votes, first.active_voters, first.inactive_voters), (120, 400, 20));
        assert_eq!(table.get(&PrecinctId::new("2")).unwrap().inactive_voters, 0);
    }

    #[test]
    fn results_csv_groups_candidates_by_precinct() {
        let file = csv_file(
            "Precinct_Number,precinct_name,candidate_name,party,votes,registered_voters\n\
             7,Adna,A,Democratic,10,300\n\
             7,Adna,B,,15,300\n\
             8,Bunker,A,Democratic,4,90\n",
        );
        let payload = results_payload(read_rows(file.path()).unwrap()).unwrap();
        let table = StatsTable::from_results_payload(&payload).unwrap();

        let adna = table.get(&PrecinctId::new("7")).unwrap();
        assert_eq!(adna.votes, 25);
        assert_eq!(adna.total_registered, 300);
        let candidates = adna.candidates.as_ref().unwrap();
        assert_eq!(candidates[1].party, None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rows_need_a_precinct() {
        let file = csv_file("votes\n12\n");
        assert!(votes_payload(read_rows(file.path()).unwrap()).is_err());
    }
}
