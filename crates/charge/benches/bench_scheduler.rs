use std::hint::black_box;
use std::time::Instant;

use chargefire_charge::{ChargeMode, ChargeProfile, ChargeScheduler};

fn bench_session(mode: ChargeMode, profile: ChargeProfile, dt: f32, iterations: usize) {
    let start = Instant::now();
    let mut samples = 0;
    for _ in 0..iterations {
        let Ok(mut scheduler) = ChargeScheduler::new(profile, mode) else {
            println!("  invalid profile, skipping");
            return;
        };
        samples += black_box(scheduler.run_to_completion(black_box(dt), 1_000_000)).len();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  {mode} session (dt={dt}, {} samples, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        samples / iterations
    );
}

fn main() {
    println!("=== Charge Scheduler Benchmarks ===\n");

    println!("Stepped:");
    bench_session(ChargeMode::Stepped, ChargeProfile::default(), 1.0 / 90.0, 1000);
    let fine = ChargeProfile {
        step_count: 1000,
        initial_duration: 0.05,
        min_duration: 0.001,
        ..ChargeProfile::default()
    };
    bench_session(ChargeMode::Stepped, fine, 1.0 / 90.0, 100);

    println!("\nLinear:");
    bench_session(ChargeMode::Linear, ChargeProfile::default(), 1.0 / 90.0, 1000);
    bench_session(ChargeMode::Linear, ChargeProfile::default(), 1.0 / 1000.0, 100);

    println!("\n=== Done ===");
}
