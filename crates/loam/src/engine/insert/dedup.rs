use super::row::{RowId, RowSet, RowValue};

use std::collections::HashMap;

/// Merges non-feature rows that are structurally identical except for their
/// own primary key. The surviving row absorbs all links that pointed at the
/// discarded duplicate. Feature rows are never merged; each carries a
/// freshly assigned, unique id by construction.
pub(crate) fn merge_duplicates(rows: &mut RowSet) {
    let mut replaced: HashMap<RowId, RowId> = HashMap::new();

    // Merging two rows can make their dependents identical in turn, so the
    // scan repeats until it finds nothing new.
    loop {
        let mut seen: HashMap<String, RowId> = HashMap::new();
        let mut merged = vec![];

        for (id, row) in rows.iter() {
            if row.merged || row.is_feature {
                continue;
            }

            let signature = signature(rows, &replaced, id);
            match seen.get(&signature) {
                Some(&survivor) => {
                    replaced.insert(id, survivor);
                    merged.push(id);
                }
                None => {
                    seen.insert(signature, id);
                }
            }
        }

        if merged.is_empty() {
            break;
        }
        for id in merged {
            rows.get_mut(id).merged = true;
        }
    }

    if replaced.is_empty() {
        return;
    }

    // Redirect every link that pointed at a discarded duplicate
    for (_, row) in rows.iter_mut() {
        for value in row.columns.values_mut() {
            if let RowValue::Link(target) = value {
                *target = resolve(&replaced, *target);
            }
        }
        if let Some(after) = &mut row.after {
            *after = resolve(&replaced, *after);
        }
    }
}

/// Structural identity: target table plus every non-key column, with link
/// targets canonicalized through the replacement map.
fn signature(rows: &RowSet, replaced: &HashMap<RowId, RowId>, id: RowId) -> String {
    use std::fmt::Write;

    let row = rows.get(id);
    let key_column = row.key.as_ref().map(|key| key.column.as_str());

    let mut columns: Vec<(&String, &RowValue)> = row
        .columns
        .iter()
        .filter(|(name, _)| Some(name.as_str()) != key_column)
        .collect();
    columns.sort_by_key(|(name, _)| name.as_str());

    let mut out = format!("{}\x1f", row.table);
    for (name, value) in columns {
        match value {
            RowValue::Value(value) => write!(out, "{name}={value:?}\x1f").unwrap(),
            RowValue::Link(target) => {
                write!(out, "{name}->{}\x1f", resolve(replaced, *target).0).unwrap()
            }
        }
    }
    out
}

fn resolve(replaced: &HashMap<RowId, RowId>, mut id: RowId) -> RowId {
    while let Some(&next) = replaced.get(&id) {
        id = next;
    }
    id
}
