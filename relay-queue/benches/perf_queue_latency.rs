//! Ping-pong latency benchmark for relay-queue
//!
//! Two capacity-1 queues, one message in flight. Every hop parks and wakes a
//! thread, so this measures the condvar handoff cost.
//!
//! Run: cargo bench --bench perf_queue_latency
//! Profile: sudo taskset -c 0,2 ./target/release/deps/perf_queue_latency-*

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use hdrhistogram::Histogram;
use relay_queue::BoundedQueue;

const WARMUP: u64 = 10_000;
const SAMPLES: u64 = 200_000;

fn main() {
    let forward = Arc::new(BoundedQueue::<u64>::new(1).unwrap());
    let back = Arc::new(BoundedQueue::<u64>::new(1).unwrap());

    let total = WARMUP + SAMPLES;

    // Echo thread: take and hand straight back
    let echo = {
        let forward = Arc::clone(&forward);
        let back = Arc::clone(&back);
        thread::spawn(move || {
            for _ in 0..total {
                let val = forward.take().unwrap();
                back.put(val).unwrap();
            }
        })
    };

    let mut hist = Histogram::<u64>::new_with_max(10_000_000, 3).unwrap();

    for i in 0..total {
        let start = Instant::now();

        forward.put(i).unwrap();
        back.take().unwrap();

        // RTT/2 for one-way estimate
        let elapsed = start.elapsed().as_nanos() as u64 / 2;
        if i >= WARMUP {
            hist.saturating_record(elapsed);
        }
    }

    echo.join().unwrap();

    println!("relay-queue one-way latency (ns):");
    println!("  min:   {:>9}", hist.min());
    println!("  mean:  {:>9.0}", hist.mean());
    println!("  p50:   {:>9}", hist.value_at_quantile(0.50));
    println!("  p99:   {:>9}", hist.value_at_quantile(0.99));
    println!("  p999:  {:>9}", hist.value_at_quantile(0.999));
    println!("  max:   {:>9}", hist.max());
    println!();
    println!("waits: {:?} / {:?}", forward.stats(), back.stats());
}
