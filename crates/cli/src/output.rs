use zonequery_domain::{OutcomeResult, ResultBatch};

pub fn render_json(batch: &ResultBatch) -> serde_json::Result<String> {
    serde_json::to_string_pretty(batch)
}

/// Abbreviated output: batch warnings, then one line per target.
pub fn render_text(batch: &ResultBatch) -> String {
    let mut lines: Vec<String> = batch.info.iter().map(|info| format!("INFO: {}", info)).collect();

    for outcome in &batch.responses {
        let target = &outcome.target;
        let line = match &outcome.result {
            OutcomeResult::Success(data) => match &data.nsid {
                Some(nsid) => format!(
                    "{} {} {} {}",
                    data.short_answers, target.nsname, target.address, nsid
                ),
                None => format!("{} {} {}", data.short_answers, target.nsname, target.address),
            },
            OutcomeResult::Failure(failure) => format!(
                "ERROR: {} {} {} {}",
                failure.kind, failure.detail, target.nsname, target.address
            ),
        };
        lines.push(line);
    }

    lines.join("\n")
}
