use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Barrier,
};
use std::thread;
use std::time::Duration;

use rand::Rng;
use taskpool::{ChannelQueue, LockedQueue, ResultCollection, TaskQueue};

const PRODUCERS: usize = 4;
const CONSUMERS: usize = 6;
const PER_PRODUCER: u32 = 2_000;

/// Producers and consumers run at the same time. Consumers keep polling until
/// every producer is done and the queue is observed empty.
fn stress<Q: TaskQueue>(queue: Q) {
    let queue = Arc::new(queue);
    let producers_done = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(PRODUCERS + CONSUMERS));

    let producers: Vec<_> = (0..PRODUCERS as u32)
        .map(|p| {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&producers_done);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut rng = rand::thread_rng();
                for i in 0..PER_PRODUCER {
                    queue.enqueue(p * PER_PRODUCER + i + 1);
                    if rng.gen_ratio(1, 64) {
                        thread::sleep(Duration::from_micros(rng.gen_range(0..50)));
                    }
                }
                done.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&producers_done);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut taken = Vec::new();
                loop {
                    match queue.dequeue() {
                        Some(task) => taken.push(task),
                        None if done.load(Ordering::SeqCst) == PRODUCERS && queue.is_empty() => {
                            break
                        }
                        None => thread::yield_now(),
                    }
                }
                taken
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }
    let mut all: Vec<_> = consumers
        .into_iter()
        .flat_map(|c| c.join().unwrap())
        .collect();

    let total = PRODUCERS * PER_PRODUCER as usize;
    assert_eq!(all.len(), total);
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), total, "a task was dequeued twice");
    assert!(queue.is_empty());
}

#[test]
fn test_locked_queue_under_contention() {
    stress(LockedQueue::new());
}

#[test]
fn test_channel_queue_under_contention() {
    stress(ChannelQueue::new());
}

#[test]
fn test_single_producer_order_is_fifo_per_consumer() {
    let queue = Arc::new(LockedQueue::new());
    for t in 1..=1_000 {
        queue.enqueue(t);
    }

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || std::iter::from_fn(|| queue.dequeue()).collect::<Vec<_>>())
        })
        .collect();

    let mut total = 0;
    for c in consumers {
        let taken = c.join().unwrap();
        // Each consumer sees a strictly increasing subsequence of the FIFO.
        assert!(taken.windows(2).all(|w| w[0] < w[1]));
        total += taken.len();
    }
    assert_eq!(total, 1_000);
}

#[test]
fn test_concurrent_appends_keep_every_entry() {
    let results = Arc::new(ResultCollection::new());
    let barrier = Arc::new(Barrier::new(5));

    let writers: Vec<_> = (1..=5)
        .map(|w| {
            let results = Arc::clone(&results);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for t in 1..=4 {
                    results.append(format!("Worker {} completed task {}", w, t));
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }

    let mut entries = results.snapshot();
    assert_eq!(entries.len(), 20);
    entries.sort();
    entries.dedup();
    assert_eq!(entries.len(), 20);
}
