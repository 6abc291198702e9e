use super::*;

#[test]
fn guards_share_one_backend_while_alive() {
    let a = acquire().unwrap();
    let b = acquire().unwrap();
    assert_eq!(a.generation(), b.generation());
    assert!(live_guards() >= 2);

    let c = b.clone();
    assert_eq!(c.generation(), a.generation());
}

#[test]
fn concurrent_acquire_reuses_live_backend() {
    let held = acquire().unwrap();
    let generations: Vec<u64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| acquire().map(|g| g.generation())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });
    assert!(generations.iter().all(|&g| g == held.generation()));
}
