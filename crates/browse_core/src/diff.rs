//! Minimal list diffing between two artwork snapshots.
//!
//! Rows are matched by `image_uri`, repeated keys pairing up in order; a matched row whose content changed is
//! reported as an update rather than a remove/insert pair. Matched rows that
//! are not part of the longest common subsequence are reported as moves.
//!
//! Operations are sequential: applying them in order to the old list, with
//! `Vec::remove`/`Vec::insert` semantics, yields the new list.

use std::collections::{HashMap, VecDeque};

use shared::domain::{ArtworkItem, ImageUri};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp {
    Insert { index: usize, item: ArtworkItem },
    Remove { index: usize, image_uri: ImageUri },
    /// Remove the row at `from`, then insert it at `to` in the shortened list.
    Move { from: usize, to: usize },
    Update { index: usize, item: ArtworkItem },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Old(usize),
    New(usize),
}

pub fn diff(old: &[ArtworkItem], new: &[ArtworkItem]) -> Vec<ListOp> {
    let mut unmatched_old: HashMap<&ImageUri, VecDeque<usize>> =
        HashMap::with_capacity(old.len());
    for (index, item) in old.iter().enumerate() {
        unmatched_old
            .entry(&item.image_uri)
            .or_default()
            .push_back(index);
    }
    // The k-th occurrence of a key in `new` pairs with the k-th one in `old`.
    let new_to_old: Vec<Option<usize>> = new
        .iter()
        .map(|item| {
            unmatched_old
                .get_mut(&item.image_uri)
                .and_then(VecDeque::pop_front)
        })
        .collect();

    let mut old_matched = vec![false; old.len()];
    let mut matched_new = Vec::new();
    let mut matched_old = Vec::new();
    for (new_index, old_index) in new_to_old.iter().enumerate() {
        if let Some(old_index) = *old_index {
            old_matched[old_index] = true;
            matched_new.push(new_index);
            matched_old.push(old_index);
        }
    }

    let mut stable = vec![false; new.len()];
    for position in longest_increasing_run(&matched_old) {
        stable[matched_new[position]] = true;
    }

    let mut ops = Vec::new();
    let mut working: Vec<Slot> = (0..old.len()).map(Slot::Old).collect();

    for index in (0..old.len()).rev() {
        if !old_matched[index] {
            working.remove(index);
            ops.push(ListOp::Remove {
                index,
                image_uri: old[index].image_uri.clone(),
            });
        }
    }

    let slot_for = |new_index: usize| match new_to_old[new_index] {
        Some(old_index) => Slot::Old(old_index),
        None => Slot::New(new_index),
    };

    for new_index in 0..new.len() {
        if stable[new_index] {
            continue;
        }
        let slot = slot_for(new_index);
        let from = match slot {
            Slot::Old(_) => {
                let from = position_of(&working, slot);
                working.remove(from);
                Some(from)
            }
            Slot::New(_) => None,
        };
        let to = if new_index == 0 {
            0
        } else {
            position_of(&working, slot_for(new_index - 1)) + 1
        };
        working.insert(to, slot);

        match from {
            Some(from) if from != to => ops.push(ListOp::Move { from, to }),
            Some(_) => {}
            None => ops.push(ListOp::Insert {
                index: to,
                item: new[new_index].clone(),
            }),
        }
    }

    for (index, item) in new.iter().enumerate() {
        if let Some(old_index) = new_to_old[index] {
            if old[old_index] != *item {
                ops.push(ListOp::Update {
                    index,
                    item: item.clone(),
                });
            }
        }
    }

    ops
}

/// Applies `ops` produced by [`diff`] against the same list.
pub fn apply(ops: &[ListOp], items: &mut Vec<ArtworkItem>) {
    for op in ops {
        match op {
            ListOp::Insert { index, item } => items.insert(*index, item.clone()),
            ListOp::Remove { index, .. } => {
                items.remove(*index);
            }
            ListOp::Move { from, to } => {
                let item = items.remove(*from);
                items.insert(*to, item);
            }
            ListOp::Update { index, item } => items[*index] = item.clone(),
        }
    }
}

// Every slot looked up here was placed in `working` earlier in the walk.
fn position_of(working: &[Slot], slot: Slot) -> usize {
    working
        .iter()
        .position(|candidate| *candidate == slot)
        .unwrap_or(working.len())
}

/// Positions (into `values`) of one longest strictly increasing subsequence.
fn longest_increasing_run(values: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (position, &value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&tail| values[tail] < value);
        if slot > 0 {
            previous[position] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(position);
        } else {
            tails[slot] = position;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(position) = cursor {
        run.push(position);
        cursor = previous[position];
    }
    run.reverse();
    run
}

#[cfg(test)]
#[path = "tests/diff_tests.rs"]
mod tests;
