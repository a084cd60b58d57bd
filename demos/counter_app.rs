//! Counter application: store actions, selector subscriptions and middleware

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shelf::stores::CounterStore;

fn main() {
    shelf::logging::init_with_default("debug");

    println!("=== Counter Application ===\n");

    println!("1. Creating the counter store (with logger middleware)");
    let counter = CounterStore::new();

    println!("\n2. Subscribing to every commit");
    let _all = counter.store().subscribe(|next, prev| {
        println!("   [State] {} -> {}", prev.count, next.count);
    });

    println!("\n3. Subscribing to the sign of the count only");
    let sign_changes = Arc::new(AtomicUsize::new(0));
    let _sign = {
        let sign_changes = sign_changes.clone();
        counter.store().subscribe_select(
            |s| s.count.signum(),
            move |next, _prev| {
                sign_changes.fetch_add(1, Ordering::SeqCst);
                println!("   [Sign] now {next}");
            },
        )
    };

    println!("\n4. Incrementing...");
    counter.increment();
    counter.increment();
    counter.increment();

    println!("\n5. Incrementing by 5");
    counter.increment_by_amount(5);

    println!("\n6. Decrementing past zero");
    counter.increment_by_amount(-10);

    println!("\n7. Resetting (twice, the second is a no-op)");
    counter.reset();
    counter.reset();

    println!(
        "\nFinal count: {} | sign changes: {}",
        counter.count(),
        sign_changes.load(Ordering::SeqCst)
    );
}
