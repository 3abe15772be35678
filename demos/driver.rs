//! # Task Driver Example
//!
//! Shows the two resumption modes of a suspendable task:
//! - manual: the driver injects values with `resume` / errors with `fail`
//! - automatic: the body awaits an external source and the scheduler resumes it
//!
//! Bus events trace each drive step so the ordering is visible.
//!
//! ## Run
//! ```bash
//! cargo run --example driver
//! ```

use std::time::Duration;

use coflow::{
    EventBus, Step, SuspendFn, SuspendRef, Suspender, TaskError, TaskHandle,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus: EventBus<String> = EventBus::new();
    bus.on("step", |msg: &String| {
        println!(" ├─► {msg}");
        Ok(())
    });
    bus.once("done", |msg: &String| {
        println!(" └─► {msg}");
        Ok(())
    });

    println!("Manual resumption:");
    let body: SuspendRef<u32, u32, u32> =
        SuspendFn::arc("manual", |ctx: Suspender<u32, u32>| async move {
            let first = ctx.suspend(1).await?;
            let second = ctx.suspend(first + 1).await?;
            Ok(second)
        });

    let mut handle = TaskHandle::new(body);
    let mut step = handle.start().await?;
    let mut injected = 10;
    while let Step::Suspended(yielded) = step {
        bus.emit("step", &format!("suspended with {yielded}, resuming with {injected}"))?;
        step = handle.resume(injected).await?;
        injected += 10;
    }
    match step {
        Step::Completed(value) => {
            bus.emit("done", &format!("completed with {value}"))?;
        }
        Step::Failed(err) => {
            bus.emit("done", &format!("failed: {}", err.as_message()))?;
        }
        Step::Suspended(_) => unreachable!("loop drains suspensions"),
    }

    println!("Automatic resumption:");
    let body: SuspendRef<u32, (), u64> =
        SuspendFn::arc("automatic", |ctx: Suspender<u32, ()>| async move {
            // The scheduler resumes the body once the timer settles; the
            // driver never calls resume.
            let waited = ctx
                .await_external(async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<u64, TaskError>(50)
                })
                .await?;
            Ok(waited)
        });

    let mut handle = TaskHandle::new(body);
    match handle.start().await? {
        Step::Completed(ms) => println!(" └─► settled after ~{ms}ms, no driver involved"),
        other => println!(" └─► unexpected step: {other:?}"),
    }

    Ok(())
}
