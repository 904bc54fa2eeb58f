use super::*;

#[test]
fn test_basic_push_pop() {
    let mut sm = VirtualStack::new();
    let a = sm.push_named("a");
    let b = sm.push_named("b");
    assert_eq!(sm.len(), 2);
    assert_eq!(sm.depth_of(b), Some(0));
    assert_eq!(sm.depth_of(a), Some(1));
    assert_eq!(sm.pop(), Some(b));
    assert_eq!(sm.len(), 1);
    assert_eq!(sm.depth_of(b), None);
}

#[test]
fn test_temp_push() {
    let mut sm = VirtualStack::new();
    let t = sm.push_temp();
    assert_eq!(sm.len(), 1);
    assert!(sm.last().unwrap().name.is_none());
    assert_eq!(sm.name_of(t), format!("%{}", 0));
}

#[test]
fn test_handles_are_unique_after_pop() {
    let mut sm = VirtualStack::new();
    let first = sm.push_temp();
    sm.pop();
    let second = sm.push_temp();
    assert_ne!(first, second);
}

#[test]
fn test_swap_top_tracks_both_slots() {
    let mut sm = VirtualStack::new();
    let q = sm.push_named("q");
    let s1 = sm.push_named("st1");
    let s0 = sm.push_named("st0");
    let sum = sm.push_temp();
    assert!(sm.swap_top(2));
    assert_eq!(sm.top(), Some(s1));
    assert_eq!(sm.depth_of(sum), Some(2));
    assert_eq!(sm.depth_of(s0), Some(1));
    assert_eq!(sm.depth_of(q), Some(3));
    assert!(!sm.swap_top(4));
}

#[test]
fn test_at_depth_and_pop_n() {
    let mut sm = VirtualStack::new();
    let a = sm.push_named("a");
    let b = sm.push_named("b");
    let c = sm.push_named("c");
    assert_eq!(sm.at_depth(0), Some(c));
    assert_eq!(sm.at_depth(2), Some(a));
    assert_eq!(sm.at_depth(3), None);
    assert_eq!(sm.pop_n(2), vec![c, b]);
    assert_eq!(sm.len(), 1);
}

#[test]
fn test_describe_top_first() {
    let mut sm = VirtualStack::new();
    sm.push_named("q");
    let x = sm.push_temp();
    sm.push_named("st0");
    sm.rename(x, "st1");
    assert_eq!(sm.describe(), "st0 st1 q");
}
