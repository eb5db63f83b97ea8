//! Configuration types serialize to stable JSON (requires the `serde` feature).
#![cfg(feature = "serde")]

use strata_core::{EngineId, NoteDivision, ProcessSpec, TransportInfo};

#[test]
fn process_spec_json() {
    let spec = ProcessSpec::new(44100.0, 256, 2);
    let json = serde_json::to_string(&spec).unwrap();
    assert_eq!(
        json,
        r#"{"sample_rate":44100.0,"max_block_size":256,"num_channels":2}"#
    );
    let back: ProcessSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);
    assert!(back.validate().is_ok());
}

#[test]
fn invalid_spec_deserializes_but_fails_validation() {
    let spec: ProcessSpec =
        serde_json::from_str(r#"{"sample_rate":-1.0,"max_block_size":256,"num_channels":2}"#)
            .unwrap();
    assert!(spec.validate().is_err());
}

#[test]
fn transport_and_ids() {
    let info: TransportInfo = serde_json::from_str(
        r#"{"bpm":90.0,"numerator":3,"denominator":4,"is_playing":true}"#,
    )
    .unwrap();
    assert_eq!(info.numerator, 3);
    assert!(info.is_playing);

    assert_eq!(serde_json::to_string(&EngineId(1)).unwrap(), "1");
    assert_eq!(
        serde_json::to_string(&NoteDivision::DottedEighth).unwrap(),
        r#""DottedEighth""#
    );
}
