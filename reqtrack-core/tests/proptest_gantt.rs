use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use reqtrack_core::gantt::{flatten, rebuild, GanttRow};

/// Build a parent-before-child row list from generated shape data.
///
/// Row i gets id i+1; `parent_pick` selects one of the already emitted rows
/// as the parent (or none), so the ordering contract holds by construction.
fn rows_from_shape(shape: &[(bool, u32, u32, u32)]) -> Vec<GanttRow> {
    shape
        .iter()
        .enumerate()
        .map(|(i, &(is_root, parent_pick, duration_cents, progress_cents))| GanttRow {
            task_id: i as i64 + 1,
            task_name: format!("task-{}", i + 1),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            duration: f64::from(duration_cents % 10_000) / 100.0,
            progress: f64::from(progress_cents % 101) / 100.0,
            predecessor: None,
            parent_task_id: if is_root || i == 0 {
                None
            } else {
                Some((parent_pick as usize % i) as i64 + 1)
            },
        })
        .collect()
}

proptest! {
    /// Property: rebuilding well-ordered rows and flattening the result
    /// reproduces the rows exactly, values included.
    #[test]
    fn prop_rebuild_then_flatten_is_identity(
        shape in prop::collection::vec((any::<bool>(), any::<u32>(), any::<u32>(), any::<u32>()), 0..40)
    ) {
        let rows = rows_from_shape(&shape);
        let forest = rebuild(&rows);
        let roundtripped = flatten(&forest).unwrap();

        // Pre-order flattening of a forest rebuilt from pre-order rows may
        // reorder across subtrees but never loses or alters a row.
        prop_assert_eq!(roundtripped.len(), rows.len());
        let mut expected = rows.clone();
        let mut actual = roundtripped.clone();
        expected.sort_by_key(|r| r.task_id);
        actual.sort_by_key(|r| r.task_id);
        prop_assert_eq!(actual, expected);

        // And a second pass over the canonical order is a fixed point.
        prop_assert_eq!(rebuild(&roundtripped), forest);
    }

    /// Property: flatten always emits every parent before its children.
    #[test]
    fn prop_flatten_emits_parent_before_child(
        shape in prop::collection::vec((any::<bool>(), any::<u32>(), any::<u32>(), any::<u32>()), 1..40)
    ) {
        let forest = rebuild(&rows_from_shape(&shape));
        let rows = flatten(&forest).unwrap();
        for (pos, row) in rows.iter().enumerate() {
            if let Some(parent) = row.parent_task_id {
                let parent_pos = rows.iter().position(|r| r.task_id == parent);
                prop_assert!(parent_pos.is_some());
                prop_assert!(parent_pos.unwrap() < pos);
            }
        }
    }

    /// Property: rebuild never panics, on any row order; out-of-order rows
    /// may only shrink the forest, never corrupt it.
    #[test]
    fn prop_rebuild_tolerates_any_order(
        shape in prop::collection::vec((any::<bool>(), any::<u32>(), any::<u32>(), any::<u32>()), 0..30),
        seed in any::<u64>(),
    ) {
        let mut rows = rows_from_shape(&shape);
        // Cheap deterministic shuffle.
        let len = rows.len();
        if len > 1 {
            for i in 0..len {
                let j = (seed as usize).wrapping_mul(31).wrapping_add(i * 17) % len;
                rows.swap(i, j);
            }
        }
        let forest = rebuild(&rows);
        let flattened = flatten(&forest).unwrap();
        prop_assert!(flattened.len() <= rows.len());
    }
}
