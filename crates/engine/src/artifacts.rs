//! Artifact naming
//!
//! Names are opaque identifiers; resolving them to bytes is up to whichever
//! artifact store the caller plugs in.

use uuid::Uuid;

use stepwise_common::StepStatus;

/// Screenshot name for one attempt of one step
pub fn screenshot_name(
    execution_id: Uuid,
    order: u32,
    status: StepStatus,
    attempt: u32,
) -> String {
    format!(
        "{}/step-{}-{}-attempt-{}.png",
        execution_id, order, status, attempt
    )
}

/// Video recording name for a whole execution
pub fn video_name(execution_id: Uuid) -> String {
    format!("{}/recording.webm", execution_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_scoped_to_execution() {
        let id = Uuid::nil();
        assert_eq!(
            screenshot_name(id, 3, StepStatus::Failed, 2),
            "00000000-0000-0000-0000-000000000000/step-3-failed-attempt-2.png"
        );
        assert_eq!(
            video_name(id),
            "00000000-0000-0000-0000-000000000000/recording.webm"
        );
    }
}
