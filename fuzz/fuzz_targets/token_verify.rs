//! Fuzz target for CSRF token verification.
//!
//! Feeds arbitrary token text, secrets and form ids through the verifier,
//! plus near-miss mutations of a freshly generated token.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{TimeZone, Utc};
use formseal_csrf::{TokenCodec, Window};
use libfuzzer_sys::fuzz_target;

/// Arbitrary verification input for fuzzing.
#[derive(Debug, Arbitrary)]
struct FuzzToken {
    /// Raw token text
    raw: String,
    server_secret: Vec<u8>,
    session_secret: Vec<u8>,
    form_id: Vec<u8>,
    /// Seconds since the epoch for issue time
    issued: u32,
    /// Offset of the verifier's clock in minutes
    skew_minutes: i16,
    /// Byte position and replacement for the mutation test
    flip: (u8, u8),
}

fuzz_target!(|data: FuzzToken| {
    let codec = TokenCodec::v1();
    let window = Window::default();
    let Some(issued) = Utc.timestamp_opt(i64::from(data.issued), 0).single() else {
        return;
    };

    // Test 1: Arbitrary text must never panic or verify
    let accepted = codec.verify(
        &data.server_secret,
        &data.session_secret,
        &data.form_id,
        &window,
        issued,
        &data.raw,
    );
    // A random string hitting a valid digest is not a realistic outcome
    assert!(!accepted || data.raw.len() == codec.format().token_len());

    // Test 2: A fresh token verifies exactly when the skew is inside the window
    let Ok(token) = codec.generate(
        &data.server_secret,
        &data.session_secret,
        &data.form_id,
        issued,
    ) else {
        return;
    };
    let server_time = issued + chrono::Duration::minutes(i64::from(data.skew_minutes));
    let minute = issued - chrono::Duration::seconds(i64::from(data.issued % 60));
    let expected = window.contains(server_time - minute);
    assert_eq!(
        codec.verify(
            &data.server_secret,
            &data.session_secret,
            &data.form_id,
            &window,
            server_time,
            token.as_str(),
        ),
        expected
    );

    // Test 3: Any single-byte change is rejected
    let mut bytes = token.as_str().as_bytes().to_vec();
    let index = usize::from(data.flip.0) % bytes.len();
    if bytes[index] != data.flip.1 {
        bytes[index] = data.flip.1;
        let tampered = String::from_utf8_lossy(&bytes);
        assert!(!codec.verify(
            &data.server_secret,
            &data.session_secret,
            &data.form_id,
            &window,
            server_time,
            &tampered,
        ));
    }
});
