// ABOUTME: Shared utility functions for Flowcraft
// ABOUTME: Sequential identifier formatting and parsing for issues and sprints

/// Kind of sequentially numbered entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Issue,
    Sprint,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Issue => "TSK",
            IdKind::Sprint => "SPR",
        }
    }

    pub fn format(&self, sequence: u32) -> String {
        format!("{}-{:03}", self.prefix(), sequence)
    }
}

/// Format an issue identifier (`TSK-007`)
pub fn format_issue_id(sequence: u32) -> String {
    IdKind::Issue.format(sequence)
}

/// Format a sprint identifier (`SPR-012`)
pub fn format_sprint_id(sequence: u32) -> String {
    IdKind::Sprint.format(sequence)
}

/// Extract the sequence number from an identifier of the given kind
pub fn parse_sequence(id: &str, kind: IdKind) -> Option<u32> {
    let digits = id.strip_prefix(kind.prefix())?.strip_prefix('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ids() {
        assert_eq!(format_issue_id(7), "TSK-007");
        assert_eq!(format_sprint_id(42), "SPR-042");
        assert_eq!(format_issue_id(1234), "TSK-1234");
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("TSK-007", IdKind::Issue), Some(7));
        assert_eq!(parse_sequence("TSK-1234", IdKind::Issue), Some(1234));
        assert_eq!(parse_sequence("SPR-003", IdKind::Sprint), Some(3));
        assert_eq!(parse_sequence("SPR-003", IdKind::Issue), None);
        assert_eq!(parse_sequence("TSK-", IdKind::Issue), None);
        assert_eq!(parse_sequence("TSK-+12", IdKind::Issue), None);
        assert_eq!(parse_sequence("legacy-id", IdKind::Issue), None);
    }
}
