use mysh::history::arena::BlockRun;
use mysh::history::error::HistoryError;
use mysh::history::list::{HistoryEntry, HistoryList};
use pretty_assertions::assert_eq;

fn entry(indices: &[usize], len: usize) -> HistoryEntry {
    let mut blocks = BlockRun::new();
    for &index in indices {
        blocks.push(index).unwrap();
    }
    HistoryEntry::new(blocks, len)
}

fn lens(list: &HistoryList) -> Vec<usize> {
    list.iter_oldest_first().map(|e| e.len).collect()
}

fn filled(count: usize) -> HistoryList {
    let mut list = HistoryList::new();
    for i in 1..=count {
        list.push_front(entry(&[i], i));
    }
    list
}

#[test]
fn test_push_front_orders_newest_last() {
    let list = filled(3);
    assert_eq!(list.len(), 3);
    assert_eq!(lens(&list), vec![1, 2, 3]);
    assert_eq!(
        list.iter_newest_first().map(|e| e.len).collect::<Vec<_>>(),
        vec![3, 2, 1]
    );
}

#[test]
fn test_iteration_is_restartable() {
    let list = filled(4);
    let first: Vec<usize> = lens(&list);
    let second: Vec<usize> = lens(&list);
    assert_eq!(first, second);
}

#[test]
fn test_oldest_first_can_stop_early() {
    let list = filled(5);
    let mut iter = list.iter_oldest_first();
    assert_eq!(iter.next().map(|e| e.len), Some(1));
    assert_eq!(iter.next().map(|e| e.len), Some(2));
    assert_eq!(list.iter_oldest_first().skip(3).map(|e| e.len).collect::<Vec<_>>(), vec![4, 5]);
}

#[test]
fn test_remove_tail_takes_oldest() {
    let mut list = filled(3);
    assert_eq!(list.remove_tail().unwrap().len, 1);
    assert_eq!(list.remove_tail().unwrap().len, 2);
    assert_eq!(list.remove_tail().unwrap().len, 3);
    assert!(list.is_empty());
    assert_eq!(list.remove_tail(), Err(HistoryError::EmptyList));
}

#[test]
fn test_remove_at_middle_keeps_order() {
    let mut list = filled(5);
    let removed = list.remove_at(3).unwrap();
    assert_eq!(removed.len, 3);
    assert_eq!(removed.blocks.as_slice(), &[3]);
    assert_eq!(lens(&list), vec![1, 2, 4, 5]);
}

#[test]
fn test_remove_at_newest_and_oldest() {
    let mut list = filled(3);
    assert_eq!(list.remove_at(3).unwrap().len, 3);
    assert_eq!(lens(&list), vec![1, 2]);

    assert_eq!(list.remove_at(1).unwrap().len, 1);
    assert_eq!(lens(&list), vec![2]);

    assert_eq!(list.remove_at(1).unwrap().len, 2);
    assert!(list.is_empty());
}

#[test]
fn test_remove_at_out_of_range() {
    let mut list = filled(2);
    assert_eq!(
        list.remove_at(0),
        Err(HistoryError::IndexOutOfRange { index: 0, max: 2 })
    );
    assert_eq!(
        list.remove_at(3),
        Err(HistoryError::IndexOutOfRange { index: 3, max: 2 })
    );
    assert_eq!(lens(&list), vec![1, 2]);

    let mut empty = HistoryList::new();
    assert_eq!(
        empty.remove_at(1),
        Err(HistoryError::IndexOutOfRange { index: 1, max: 0 })
    );
}

#[test]
fn test_get_by_display_index() {
    let list = filled(3);
    assert_eq!(list.get(1).map(|e| e.len), Some(1));
    assert_eq!(list.get(3).map(|e| e.len), Some(3));
    assert!(list.get(0).is_none());
    assert!(list.get(4).is_none());
}

#[test]
fn test_clear() {
    let mut list = filled(10);
    list.clear();
    assert!(list.is_empty());
    assert_eq!(list.iter_oldest_first().count(), 0);

    list.push_front(entry(&[0, 1], 12));
    assert_eq!(lens(&list), vec![12]);
}

#[test]
fn test_block_run_is_bounded() {
    let mut run = BlockRun::new();
    for index in 0..15 {
        run.push(index).unwrap();
    }
    assert_eq!(run.len(), 15);
    assert_eq!(run.push(15), Err(HistoryError::InvalidBlockCount(16)));
    assert_eq!(run.len(), 15);
}
