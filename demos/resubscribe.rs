//! Re-subscribe pattern, with the channel swapped out under the subscribers.
//!
//! A subscriber whose receiver ends (evicted, or its channel closed) simply
//! registers again against whatever channel is current, and picks the
//! current state up from the returned last value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use fanout::Channel;
use tokio::sync::mpsc;

type Feed = Channel<u64, mpsc::Sender<u64>>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let current: spin::Mutex<Feed> = spin::Mutex::new(Feed::new());
    let stop = AtomicBool::new(false);

    std::thread::scope(|s| {
        for reader in 0..3 {
            let current = &current;
            let stop = &stop;
            s.spawn(move || {
                let mut subscriptions = 0;
                while !stop.load(Ordering::Acquire) {
                    let channel = current.lock().clone();
                    let mut subscription = channel.subscribe(4);
                    subscriptions += 1;
                    if let Some(last) = subscription.last {
                        log::debug!("reader {reader}: resumed at {last}");
                    }
                    while let Some(_value) = subscription.receiver.blocking_recv() {
                        std::thread::sleep(Duration::from_millis(reader));
                    }
                }
                log::info!("reader {reader}: subscribed {subscriptions} times");
            });
        }

        s.spawn(|| {
            for i in 0..300 {
                if i % 100 == 99 {
                    let retired = std::mem::replace(&mut *current.lock(), Feed::new());
                    // Carry the state over before subscribers move.
                    if let Some(last) = retired.last() {
                        current.lock().publish(last);
                    }
                    retired.close();
                }
                current.lock().publish(i);
                std::thread::sleep(Duration::from_millis(1));
            }
            stop.store(true, Ordering::Release);
            current.lock().close();
        });
    });

    Ok(())
}
