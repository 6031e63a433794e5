//! Generate sample refine and rank output for validation testing

use senz_core::{Operation, SenzProcessor};

fn main() {
    let refine = r#"{
        "scaleType": "perHourScale",
        "startScaleValue": 22,
        "endScaleValue": 2,
        "senzList": [
            { "perHourScale": 23, "timestamp": 1297923712, "senzId": 1, "motionProb": { "Walking": 0.7, "Sitting": 0.3 } },
            { "perHourScale": 0, "timestamp": 1297927312, "senzId": 2, "motionProb": { "Walking": 0.4, "Sitting": 0.6 } },
            { "perHourScale": 2, "timestamp": 1297934512, "senzId": 3, "motionProb": { "Walking": 0.1, "Sitting": 0.9 } }
        ]
    }"#;

    let rank = r#"{
        "probSenzList": [
            { "motion": { "Walking": 0.6, "Running": 0.3, "Sitting": 0.1 }, "location": { "park": 0.8, "street": 0.2 }, "sound": { "talk": 0.5, "quiet": 0.5 }, "timestamp": 1297923712 },
            { "motion": { "Walking": 0.2, "Running": 0.7, "Sitting": 0.1 }, "location": { "park": 0.6, "street": 0.4 }, "sound": { "talk": 0.1, "quiet": 0.9 }, "timestamp": 1297927312 }
        ],
        "strategy": "SELECT_MAX_PROB"
    }"#;

    let processor = SenzProcessor::new();
    for (op, body) in [(Operation::Refine, refine), (Operation::Rank, rank)] {
        match processor.handle(op, body, None).to_json_pretty() {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: {e:?}"),
        }
    }
}
