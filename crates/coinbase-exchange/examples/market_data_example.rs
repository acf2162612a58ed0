/*
[INPUT]:  Product identifier (e.g., "BTC-USD")
[OUTPUT]: Market data (server time, ticker, order book, candles)
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints
*/

use coinbase_exchange::*;

/// Example: Query market data (no authentication required)
#[tokio::main]
async fn main() {
    println!("=== Coinbase Exchange Market Data Example ===\n");

    let client = match RestClient::new(Credentials::anonymous()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };

    match client.server_time().await {
        Ok(time) => println!("Server time: {:?}", time.data.get("iso")),
        Err(e) => println!("Error: {}", e),
    }

    match client.last_trade(Params::new()).await {
        Ok(ticker) => println!(
            "Last trade on {}: {:?} @ {:?}",
            client.default_product(),
            ticker.data.decimal("size"),
            ticker.data.decimal("price")
        ),
        Err(e) => println!("Error: {}", e),
    }

    match client.orderbook(Params::new().with("level", 1)).await {
        Ok(book) => println!("Best bid/ask: {:?} / {:?}", book.data.get("bids"), book.data.get("asks")),
        Err(e) => println!("Error: {}", e),
    }

    match client.price_history(Params::new().with("granularity", 3600)).await {
        Ok(candles) => {
            for candle in candles.data.iter().take(3) {
                println!("{:?} close {:?}", candle.str("start"), candle.decimal("close"));
            }
        }
        Err(e) => println!("Error: {}", e),
    }
}
