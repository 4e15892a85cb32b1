#![no_main]

use adagg_core::{encode, pipeline, AggregationConfig, CampaignPolicy, ValidationMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input objects: invalid UTF-8, deep nesting, huge numbers,
    // non-object JSON. Nothing here may panic.
    for config in [
        AggregationConfig::default(),
        AggregationConfig {
            validation_mode: ValidationMode::Strict,
            campaign_policy: CampaignPolicy::Drop,
        },
    ] {
        let report = pipeline::process(data, &config);
        assert_eq!(
            report.events_folded as usize + report.rejected.len(),
            report.lines_read
        );

        // Overflowed totals are refused; anything encoded must decode.
        if let Ok(artifact) = encode::encode(&report.summary) {
            let decoded = encode::decode(&artifact).unwrap();
            assert_eq!(decoded, report.summary);
        }
    }
});
