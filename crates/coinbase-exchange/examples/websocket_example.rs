/*
[INPUT]:  Product identifier to stream
[OUTPUT]: Matches printed as they arrive
[POS]:    Examples - streaming feed on an owned runtime
[UPDATE]: When feed handler registration changes
*/

use coinbase_exchange::*;
use std::time::Duration;

/// Example: Print matches for ten seconds, reconnecting if the feed drops
fn main() {
    let handlers = FeedHandlers::new().on_match(|record| {
        println!(
            "match {:?} {:?} @ {:?}",
            record.str("side"),
            record.decimal("size"),
            record.decimal("price")
        );
    });

    let consumer = FeedConsumer::new(FeedConfig::default().with_keepalive(true), handlers);
    let handle = consumer.handle();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_secs(10));
        handle.stop();
    });

    // No runtime here, so the consumer builds one and blocks until stopped
    if let Err(e) = consumer.start() {
        eprintln!("Feed failed: {}", e);
    }
}
