/// Example: Compare Euler and RK4 attitude integration against the exact answer
///
/// Usage: cargo run --example integrators -- [rate_rad_per_s] [duration_s]

use std::env;

use anyhow::Context;
use attitude_core::Quaternion;
use nalgebra::Vector3;

fn integrate(
    step: fn(&mut Quaternion, &Quaternion, f32, bool),
    rate: f32,
    duration: f32,
    dt: f32,
) -> Quaternion {
    let w = Quaternion::pure(&Vector3::new(0.0, rate, 0.0));
    let mut q = Quaternion::IDENTITY;
    for _ in 0..(duration / dt).round() as usize {
        step(&mut q, &w, dt, false);
    }
    q
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let rate: f32 = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("invalid rate {s:?}"))?,
        None => 4.0,
    };
    let duration: f32 = match args.get(2) {
        Some(s) => s.parse().with_context(|| format!("invalid duration {s:?}"))?,
        None => 2.0,
    };

    let exact = Quaternion::from_rotation_vector(&Vector3::new(0.0, rate * duration, 0.0));
    println!("{:>8} {:>14} {:>14}", "dt", "euler error", "rk4 error");

    let mut dt = 0.2;
    while dt > 0.01 {
        let euler = integrate(Quaternion::integrate_euler, rate, duration, dt);
        let rk4 = integrate(Quaternion::integrate_runge_kutta4, rate, duration, dt);
        println!(
            "{:>8.4} {:>14.3e} {:>14.3e}",
            dt,
            (euler - exact).norm(),
            (rk4 - exact).norm()
        );
        dt *= 0.5;
    }

    Ok(())
}
