use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CapsuleError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CapsuleError::decode("a.png", "boom")
            .to_string()
            .contains("decode error: 'a.png'")
    );
    assert!(
        CapsuleError::DegenerateAlignment {
            width: 0,
            height: 4
        }
        .to_string()
        .contains("degenerate alignment: aligned region is 0x4")
    );
    assert!(
        CapsuleError::InsufficientInput { available: 1 }
            .to_string()
            .contains("found 1")
    );
}

#[test]
fn io_keeps_path_and_source() {
    let err = CapsuleError::io("out/x.png", std::io::Error::other("disk full"));
    let msg = err.to_string();
    assert!(msg.contains("out/x.png"));
    assert!(msg.contains("disk full"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CapsuleError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
