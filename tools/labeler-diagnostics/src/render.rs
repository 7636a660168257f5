//! Terminal output.

use crate::orchestrator::TransportReport;
use label_assessment::PolicySet;

const INDENT: &str = "    ";

/// Lines reporting one transport.
pub fn render_transport(report: &TransportReport) -> Vec<String> {
    let prefix = format!("Testing service endpoint {}...", report.name);
    match &report.outcome {
        Ok(assessment) if assessment.flags().is_empty() => vec![format!(
            "{} {} scanned without warnings!",
            prefix,
            assessment.total()
        )],
        Ok(assessment) => {
            let mut lines = vec![format!(
                "{} {} scanned with {} warnings",
                prefix,
                assessment.total(),
                assessment.flags().len()
            )];
            lines.extend(
                assessment
                    .flags()
                    .iter()
                    .map(|(flag, count)| format!("{}{} (x{})", INDENT, flag, count)),
            );
            lines
        }
        Err(cause) => vec![format!("{} {}", prefix, cause)],
    }
}

/// Lines reporting a successful policy lookup.
pub fn render_policies(policies: &PolicySet) -> Vec<String> {
    let mut lines = vec![format!(
        "Resolving label policies... Found {} label policies",
        policies.len()
    )];
    if !policies.is_empty() {
        let values: Vec<&str> = policies.iter().map(String::as_str).collect();
        lines.push(format!("{}{}", INDENT, values.join(", ")));
    }
    lines
}

/// Line reporting a failed policy lookup.
pub fn render_policy_failure(cause: &str) -> String {
    format!("Resolving label policies... {}", cause)
}
