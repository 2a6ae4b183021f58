use crate::ipc::{ACTIVATION_MESSAGE, ActivationMessage};

/// **VALUE**: Verifies the exact literal is recognized.
///
/// **BUG THIS CATCHES**: Would catch the wire literal changing on one side only.
#[test]
fn given_exact_literal_when_parsed_then_activate() {
    assert_eq!(ACTIVATION_MESSAGE, b"ACTIVATE");
    assert_eq!(
        ActivationMessage::parse(b"ACTIVATE"),
        Some(ActivationMessage::Activate)
    );
    assert_eq!(ActivationMessage::Activate.as_bytes(), ACTIVATION_MESSAGE);
}

/// **VALUE**: Verifies near-misses are rejected.
///
/// **WHY THIS MATTERS**: The match is byte for byte. Trimming, case folding or
/// prefix matching would let arbitrary local traffic trigger activation.
///
/// **BUG THIS CATCHES**: Would catch a lenient comparison.
#[test]
fn given_near_miss_payloads_when_parsed_then_unrecognized() {
    let near_misses: [&[u8]; 7] = [
        b"",
        b"activate",
        b"ACTIVATE\n",
        b" ACTIVATE",
        b"ACTIVAT",
        b"ACTIVATEACTIVATE",
        b"ACTIVATE\0",
    ];

    for payload in near_misses {
        assert_eq!(
            ActivationMessage::parse(payload),
            None,
            "{:?} should not parse",
            String::from_utf8_lossy(payload)
        );
    }
}
