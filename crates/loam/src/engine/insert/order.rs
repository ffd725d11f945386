use super::row::{RowId, RowSet};

use std::collections::BTreeSet;

/// Arranges rows so that for every link, the referenced row is scheduled
/// before the referencing row. Among rows that are ready at the same time,
/// first-seen (document) order is kept.
///
/// When no such order exists because rows form a reference cycle, the
/// offending subset keeps its original relative order rather than failing;
/// the backing store's constraint model, or its absence, is responsible for
/// the remainder.
pub(crate) fn order(rows: &RowSet) -> Vec<RowId> {
    let n = rows.len();
    let mut indegree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![vec![]; n];

    for (id, row) in rows.iter() {
        if row.merged {
            continue;
        }
        for dependency in row.dependencies() {
            if dependency == id || rows.get(dependency).merged {
                continue;
            }
            indegree[id.0] += 1;
            dependents[dependency.0].push(id.0);
        }
    }

    let mut ready: BTreeSet<usize> = rows
        .iter()
        .filter(|(id, row)| !row.merged && indegree[id.0] == 0)
        .map(|(id, _)| id.0)
        .collect();

    let mut scheduled = vec![false; n];
    let mut out = Vec::with_capacity(n);

    while let Some(&index) = ready.iter().next() {
        ready.remove(&index);
        scheduled[index] = true;
        out.push(RowId(index));

        for &dependent in &dependents[index] {
            indegree[dependent] -= 1;
            if indegree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    // Anything left sits on a cycle
    let remainder: Vec<RowId> = rows
        .iter()
        .filter(|(id, row)| !row.merged && !scheduled[id.0])
        .map(|(id, _)| id)
        .collect();
    if !remainder.is_empty() {
        tracing::warn!(
            rows = remainder.len(),
            "insert ordering hit a reference cycle; keeping document order for the remainder"
        );
        out.extend(remainder);
    }

    out
}
