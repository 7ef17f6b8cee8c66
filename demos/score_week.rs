//! Score a sample week for manual inspection

fn main() {
    let json = r#"{
        "answers": [
            { "score": 8 }, { "score": 7 }, { "score": 6, "note": "side project stalled" }, { "score": 7 }, { "score": 8 },
            { "score": 9, "note": "dinner with friends" }, { "score": 8 }, { "score": 7 }, { "score": 6 }, { "score": 7 },
            { "score": 4, "scenarioScore": 7 }, { "score": 5 }, { "score": 3, "note": "no say in deadlines" }, { "score": 5 }, { "score": 6 },
            { "score": 5 }, { "score": 4 }, { "score": 6 }, { "score": 2, "note": "slept badly" }, { "score": 5 },
            { "score": 6 }, { "score": 7 }, { "score": 5 }, { "score": 6 }
        ],
        "timeMap": [
            { "category": "Sleep", "hours": 49, "ri": 5 },
            { "category": "Work", "hours": 45, "ri": 3 },
            { "category": "Commute", "hours": 8, "ri": 4 },
            { "category": "Relationships", "hours": 14, "ri": 8 },
            { "category": "Gym", "hours": 4, "ri": 7 },
            { "category": "Leisure", "hours": 12, "ri": 6 }
        ],
        "ELI": 6,
        "config": { "crossLift": { "enabled": true } }
    }"#;

    let engine = life_morale::LmiEngine::new();
    match engine.score_report(json) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("Error: {e:?}"),
        },
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
