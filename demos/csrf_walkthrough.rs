use chrono::{Duration, TimeZone, Utc};
use formseal::prelude::*;
use std::time::Instant;

// OWASP recommends at least 128 bits for both secrets
const SERVER_SECRET_HEX: &str = "0123456789ABCDEF0123456789ABCDEF";
const SESSION_SECRET_HEX: &str = "ABCDEF0123456789ABCDEF0123456789";

// Unique per form so a token leaked from one page is useless on another
const FORM_ID: &str = "example-login-form";

const KNOWN_TOKEN: &str = "v1|2018.06.17.10.43|9d7b9a77245c2e82a5ec51ae4c9d82ad|059098a094fcc900361b5fe16046c7eb78b5523a3a826535a88a5be9718da623";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    formseal::log::init();

    println!("🔒 Formseal CSRF Walkthrough");
    println!("============================\n");

    // Generate once per application, share across servers
    let server_secret = Secret::from_hex(SERVER_SECRET_HEX)?;
    // Generate once per user session (the session id works)
    let session_secret = Secret::from_hex(SESSION_SECRET_HEX)?;

    // 90 minutes of clock skew between servers, 36 hours of lifetime
    let window = Window::from_minutes(-90, 36 * 60)?;
    let codec = TokenCodec::v1();

    // Always UTC when more than one server is involved
    let now = Utc::now();

    println!("Benchmarking...");
    for iterations in [1u32, 10, 100, 1000] {
        let mut taken = Vec::with_capacity(5);
        for _ in 0..5 {
            let start = Instant::now();
            for _ in 0..iterations {
                codec.generate(server_secret.as_bytes(), session_secret.as_bytes(), FORM_ID, now)?;
            }
            taken.push(start.elapsed().as_secs_f64());
        }

        let min = taken.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = taken.iter().cloned().fold(0.0, f64::max);
        let avg = taken.iter().sum::<f64>() / taken.len() as f64;
        println!("{} iterations, repeated 5 times", iterations);
        println!("  Minimum: {:.6}s, {:.6} ms/token", min, 1000.0 * min / iterations as f64);
        println!("  Maximum: {:.6}s, {:.6} ms/token", max, 1000.0 * max / iterations as f64);
        println!("  Average: {:.6}s, {:.6} ms/token", avg, 1000.0 * avg / iterations as f64);
    }

    let token = codec.generate(server_secret.as_bytes(), session_secret.as_bytes(), FORM_ID, now)?;
    println!("\nExample token: {}", token);
    println!("Generated at:  {}\n", now);

    let valid_at = |time: DateTime<Utc>, token: &str| {
        codec.verify(
            server_secret.as_bytes(),
            session_secret.as_bytes(),
            FORM_ID,
            &window,
            time,
            token,
        )
    };

    // Seconds are dropped from the timestamp, so exact-minute offsets can go either way
    println!("Time window:");
    for (label, offset) in [
        ("-2h", -Duration::hours(2)),
        ("-91m", -Duration::minutes(91)),
        ("-90m", -Duration::minutes(90)),
        ("-1h", -Duration::hours(1)),
        ("now", Duration::zero()),
        ("+1h", Duration::hours(1)),
        ("+35h", Duration::hours(35)),
        ("+35h59m", Duration::hours(35) + Duration::minutes(59)),
        ("+36h1m", Duration::hours(36) + Duration::minutes(1)),
        ("+37h", Duration::hours(37)),
    ] {
        let verdict = if valid_at(now + offset, token.as_str()) { "✓ valid" } else { "✗ rejected" };
        println!("  {:>8}  {}", label, verdict);
    }

    let then = Utc.with_ymd_and_hms(2018, 6, 17, 10, 43, 8).unwrap() + Duration::microseconds(304_433);

    println!("\nKnown token at {}:", then);
    for (label, candidate) in [
        ("known good", KNOWN_TOKEN.to_string()),
        ("changed version", KNOWN_TOKEN.replacen("v1", "v0", 1)),
        ("changed date", KNOWN_TOKEN.replace("10.43", "10.44")),
        ("changed salt", KNOWN_TOKEN.replace("|9d7b", "|9e7b")),
        ("non-hex salt", KNOWN_TOKEN.replace("|9d7b9a", "|NOTHEX")),
        ("garbage", "invalid_token".to_string()),
    ] {
        let verdict = if valid_at(then, &candidate) { "✓ valid" } else { "✗ rejected" };
        println!("  {:>16}  {}", label, verdict);
    }

    println!("\nThrowing variant:");
    let guard = CsrfGuard::new(server_secret.clone(), window);
    let issued = guard.issue(session_secret.as_bytes(), FORM_ID)?;
    guard.validate(session_secret.as_bytes(), FORM_ID, issued.as_str())?;
    println!("  fresh token    ✓ accepted");
    match guard.validate(session_secret.as_bytes(), FORM_ID, "invalid_token") {
        Err(err) => println!("  invalid_token  ✗ {}", err),
        Ok(()) => println!("  invalid_token  accepted?!"),
    }

    Ok(())
}
