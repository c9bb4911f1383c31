use chrono::{DateTime, Utc};
use shared::domain::{ArtworkId, ArtworkItem, ImageUri};

use super::*;

fn art(id: i64, uri: &str) -> ArtworkItem {
    let mut item = ArtworkItem::new(ArtworkId(id), "com.example.featured", uri);
    item.date_added = DateTime::<Utc>::UNIX_EPOCH;
    item
}

fn list(uris: &[&str]) -> Vec<ArtworkItem> {
    uris.iter()
        .enumerate()
        .map(|(index, uri)| art(index as i64 + 1, uri))
        .collect()
}

fn assert_transforms(old: &[ArtworkItem], new: &[ArtworkItem]) -> Vec<ListOp> {
    let ops = diff(old, new);
    let mut applied = old.to_vec();
    apply(&ops, &mut applied);
    assert_eq!(applied, new, "ops {ops:?} did not transform old into new");
    ops
}

#[test]
fn identical_snapshots_produce_no_ops() {
    let snapshot = list(&["a", "b", "c", "d"]);
    assert!(diff(&snapshot, &snapshot).is_empty());
    assert!(diff(&[], &[]).is_empty());
}

#[test]
fn title_change_is_a_single_update() {
    let old = vec![art(1, "a").with_title("Dawn"), art(2, "b")];
    let mut new = old.clone();
    new[0].title = Some("Dusk".to_string());

    let ops = assert_transforms(&old, &new);
    assert_eq!(
        ops,
        vec![ListOp::Update {
            index: 0,
            item: new[0].clone()
        }]
    );
}

#[test]
fn replacing_head_and_appending_tail() {
    let old = vec![art(1, "a"), art(2, "b")];
    let new = vec![art(2, "b"), art(3, "c")];

    let ops = assert_transforms(&old, &new);
    assert_eq!(
        ops,
        vec![
            ListOp::Remove {
                index: 0,
                image_uri: ImageUri::new("a")
            },
            ListOp::Insert {
                index: 1,
                item: art(3, "c")
            },
        ]
    );
}

#[test]
fn rotation_is_one_move() {
    let old = list(&["a", "b", "c", "d"]);
    let new = vec![
        old[1].clone(),
        old[2].clone(),
        old[3].clone(),
        old[0].clone(),
    ];

    let ops = assert_transforms(&old, &new);
    assert_eq!(ops, vec![ListOp::Move { from: 0, to: 3 }]);
}

#[test]
fn reversal_moves_all_but_one() {
    let old = list(&["a", "b", "c", "d", "e"]);
    let mut new = old.clone();
    new.reverse();

    let ops = assert_transforms(&old, &new);
    assert_eq!(ops.len(), 4);
    assert!(ops.iter().all(|op| matches!(op, ListOp::Move { .. })));
}

#[test]
fn empty_to_full_and_back() {
    let full = list(&["a", "b", "c"]);

    let inserts = assert_transforms(&[], &full);
    assert_eq!(inserts.len(), 3);
    assert!(inserts
        .iter()
        .all(|op| matches!(op, ListOp::Insert { .. })));

    let removes = assert_transforms(&full, &[]);
    assert_eq!(
        removes
            .iter()
            .map(|op| match op {
                ListOp::Remove { index, .. } => *index,
                other => panic!("unexpected op {other:?}"),
            })
            .collect::<Vec<_>>(),
        vec![2, 1, 0]
    );
}

#[test]
fn full_replacement_removes_then_inserts() {
    let old = list(&["a", "b"]);
    let new = vec![art(3, "x"), art(4, "y"), art(5, "z")];

    let ops = assert_transforms(&old, &new);
    assert_eq!(ops.len(), 5);
    assert!(matches!(ops[0], ListOp::Remove { .. }));
    assert!(matches!(ops[1], ListOp::Remove { .. }));
}

#[test]
fn mixed_reorder_insert_remove_update() {
    let old = list(&["a", "b", "c", "d", "e", "f"]);
    let mut moved_e = old[4].clone();
    moved_e.byline = Some("Updated byline".to_string());
    let new = vec![
        old[2].clone(),
        art(10, "n1"),
        old[0].clone(),
        moved_e,
        old[3].clone(),
        art(11, "n2"),
        old[5].clone(),
    ];

    let ops = assert_transforms(&old, &new);
    let updates = ops
        .iter()
        .filter(|op| matches!(op, ListOp::Update { .. }))
        .count();
    let removes = ops
        .iter()
        .filter(|op| matches!(op, ListOp::Remove { .. }))
        .count();
    assert_eq!(updates, 1);
    assert_eq!(removes, 1);
}

#[test]
fn duplicate_keys_are_tolerated() {
    let old = vec![art(1, "a"), art(2, "a"), art(3, "b")];
    let new = vec![art(3, "b"), art(1, "a"), art(4, "a"), art(5, "a")];

    let ops = assert_transforms(&old, &new);
    let inserts = ops
        .iter()
        .filter(|op| matches!(op, ListOp::Insert { .. }))
        .count();
    assert_eq!(inserts, 1);
    assert!(!ops.iter().any(|op| matches!(op, ListOp::Remove { .. })));
}

#[test]
fn identical_snapshots_with_repeated_keys_diff_to_nothing() {
    let twice = vec![art(1, "a"), art(1, "a")];
    assert!(diff(&twice, &twice).is_empty());

    let mixed = vec![art(1, "a"), art(2, "b"), art(3, "a"), art(4, "c"), art(5, "b")];
    assert!(diff(&mixed, &mixed).is_empty());
}

#[test]
fn repeated_key_keeps_its_occurrence_order() {
    let old = vec![art(1, "a"), art(2, "a")];
    let new = vec![art(1, "a"), art(9, "a")];

    let ops = assert_transforms(&old, &new);
    assert_eq!(
        ops,
        vec![ListOp::Update {
            index: 1,
            item: art(9, "a")
        }]
    );
}

#[test]
fn diff_is_deterministic() {
    let old = list(&["a", "b", "c", "d", "e"]);
    let new = vec![
        old[3].clone(),
        old[0].clone(),
        art(9, "z"),
        old[4].clone(),
        old[1].clone(),
    ];

    assert_eq!(diff(&old, &new), diff(&old, &new));
}

#[test]
fn longest_increasing_run_picks_longest() {
    let run = longest_increasing_run(&[3, 0, 4, 1, 2]);
    assert_eq!(run, vec![1, 3, 4]);
    assert!(longest_increasing_run(&[]).is_empty());
}
