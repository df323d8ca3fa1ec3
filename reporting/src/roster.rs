//! Roster reconciliation: who is in the channel but did not report.

use std::collections::HashSet;

/// Every member of `present` that is absent from `reported`, in roster order.
pub fn not_reported<R, P>(reported: &[R], present: &[P]) -> Vec<String>
where
    R: AsRef<str>,
    P: AsRef<str>,
{
    let reported: HashSet<&str> = reported.iter().map(AsRef::as_ref).collect();
    present
        .iter()
        .map(AsRef::as_ref)
        .filter(|member| !reported.contains(member))
        .map(str::to_string)
        .collect()
}
