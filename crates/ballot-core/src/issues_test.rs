use super::{IssueSeverity, StructuredIssue};
use crate::FieldPath;

#[test]
fn issues_are_sorted_stably() {
    let mut issues = vec![
        StructuredIssue {
            kind: "validation".to_string(),
            severity: IssueSeverity::Warning,
            field_path: FieldPath::root().key("b"),
            message: "second".to_string(),
            reference: None,
        },
        StructuredIssue::error(
            "validation",
            "scenario.first",
            FieldPath::root(),
            "first",
        ),
    ];

    StructuredIssue::sort_stable(&mut issues);

    assert_eq!(issues[0].severity, IssueSeverity::Error);
    assert_eq!(issues[1].severity, IssueSeverity::Warning);
}

#[test]
fn display_includes_path_and_reference() {
    let issue = StructuredIssue::error(
        "runner_config_error",
        "runner.config.rpc_url",
        FieldPath::from_keys(["chains", "eip155:42", "rpc_url"]),
        "rpc_url must be http(s) or ws(s)",
    );
    assert_eq!(
        issue.to_string(),
        "$.chains.eip155:42.rpc_url: rpc_url must be http(s) or ws(s) [runner.config.rpc_url]"
    );
    assert_eq!(StructuredIssue::join(&[issue.clone(), issue]).matches("; ").count(), 1);
}
