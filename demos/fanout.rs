//! One publisher, several readers of different speed.
//!
//! The slow reader can't keep up and gets evicted, the others see every value.
//! Run with `RUST_LOG=debug` to see evictions.

use std::time::Duration;
use fanout::Channel;
use tokio::sync::mpsc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    const MESSAGES: usize = 100;
    let channel: Channel<usize, mpsc::Sender<usize>> = Channel::new();

    std::thread::scope(|s| {
        for (name, delay) in [("fast", 0), ("medium", 1), ("slow", 20)] {
            let mut subscription = channel.subscribe(8);
            s.spawn(move || {
                let mut received = 0;
                while let Some(_value) = subscription.receiver.blocking_recv() {
                    received += 1;
                    std::thread::sleep(Duration::from_millis(delay));
                }
                log::info!("{name} reader: received {received} of {MESSAGES}");
            });
        }

        s.spawn(|| {
            for i in 0..MESSAGES {
                let report = channel.publish(i);
                if report.evicted > 0 {
                    log::info!("publish {i}: evicted {} reader(s)", report.evicted);
                }
                std::thread::sleep(Duration::from_millis(2));
            }
            channel.close();
        });
    });

    log::info!("last value: {:?}", channel.last());
    Ok(())
}
