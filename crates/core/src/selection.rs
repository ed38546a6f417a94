//! Least-loaded backend selection.
//!
//! Callers probe every candidate's queue depth and hand the results here.
//! An unreachable candidate (`None`) ranks behind every reachable one.

/// Pick the candidate with the strictly smallest reported queue.
///
/// Ties go to the earliest candidate. Returns `None` when no candidate
/// reported a queue size.
pub fn pick_least_loaded<T>(probes: impl IntoIterator<Item = (T, Option<u32>)>) -> Option<(T, u32)> {
    let mut best: Option<(T, u32)> = None;
    for (candidate, queue) in probes {
        let Some(queue) = queue else { continue };
        match best {
            Some((_, current)) if current <= queue => {}
            _ => best = Some((candidate, queue)),
        }
    }
    best
}
