//! # Channel Pipeline Example
//!
//! Builds a three-stage pipeline with small buffers so backpressure is
//! visible:
//!
//! ```text
//! producer ──► source ──transform(×10)──► wide ──pipe_to──► sink ──► consumer
//! ```
//!
//! The producer pauses on every backpressured write and resumes on the
//! drained signal; the stages propagate that pressure end to end.
//!
//! ## Run
//! ```bash
//! cargo run --example pipeline
//! ```

use coflow::{Channel, ChannelConfig, ReadOutcome};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = ChannelConfig {
        capacity: 4,
        low_water: 1,
        ..ChannelConfig::default()
    };
    let source: Channel<u32> = Channel::with_config(cfg);
    let wide = source.transform(|n| n * 10);
    let sink: Channel<u32> = Channel::with_config(cfg);

    // Producer: writes 12 items, pausing whenever the source blocks.
    let producer_side = source.clone();
    let producer = tokio::spawn(async move {
        for n in 1..=12 {
            let outcome = producer_side.write(n).expect("source open");
            if outcome.backpressure {
                println!(" ├─► producer paused at item {n} (source blocked)");
                producer_side.drained().await;
            }
        }
        producer_side.close();
        println!(" ├─► producer done");
    });

    // Middle: move the transformed items into the sink, obeying its pressure.
    let pipe_src = wide.clone();
    let pipe_dst = sink.clone();
    let pipe = tokio::spawn(async move {
        let moved = pipe_src.pipe_to(&pipe_dst).await.expect("pipe");
        println!(" ├─► pipe moved {moved} items and closed the sink");
    });

    // Consumer: drain the sink in small batches.
    let mut total = 0u32;
    loop {
        match sink.recv(3).await {
            ReadOutcome::EndOfStream => break,
            ReadOutcome::Items(items) => {
                println!(" ├─► consumer got {items:?}");
                total += items.iter().sum::<u32>();
            }
        }
    }

    producer.await?;
    pipe.await?;
    println!(" └─► sum of transformed items: {total}");
    Ok(())
}
