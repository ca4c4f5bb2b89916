use super::{validate_scenario, AccountRole, ScenarioPlan, ScenarioStep};
use alloy_primitives::U256;
use ballot_core::ProposalName;

fn proposals() -> Vec<ProposalName> {
    vec![
        ProposalName::from_text("proposal1").expect("name"),
        ProposalName::from_text("proposal2").expect("name"),
    ]
}

fn messages(plan: &ScenarioPlan) -> Vec<String> {
    validate_scenario(plan)
        .into_iter()
        .map(|issue| format!("{}: {}", issue.field_path, issue.message))
        .collect()
}

#[test]
fn ballot_demo_follows_lifecycle_order() {
    let plan = ScenarioPlan::ballot_demo(proposals(), U256::from(7u64), 1);
    let ids = plan.steps.iter().map(ScenarioStep::id).collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            "deploy",
            "give_right_to_vote",
            "delegate",
            "fund",
            "receive",
            "vote",
            "query_winner"
        ]
    );
    assert_eq!(plan.proposals().len(), 2);
    assert!(validate_scenario(&plan).is_empty());
    assert_eq!(
        plan.steps[4],
        ScenarioStep::Receive {
            account: AccountRole::Voter,
            min_balance: U256::from(7u64),
        }
    );
}

#[test]
fn rejects_empty_plan() {
    assert_eq!(messages(&ScenarioPlan::default()), vec!["$.steps: scenario has no steps"]);
}

#[test]
fn rejects_out_of_range_vote_and_zero_fund() {
    let plan = ScenarioPlan::ballot_demo(proposals(), U256::ZERO, 2);
    let messages = messages(&plan);
    assert!(messages.contains(&"$.steps[3].amount: fund amount must be > 0".to_string()));
    assert!(messages
        .contains(&"$.steps[5].proposal: proposal index 2 out of range for 2 proposal(s)".to_string()));
}

#[test]
fn rejects_contract_steps_before_deploy_and_second_deploy() {
    let plan = ScenarioPlan::new(vec![
        ScenarioStep::Vote {
            voter: AccountRole::Voter,
            proposal: 0,
        },
        ScenarioStep::Deploy {
            proposals: proposals(),
        },
        ScenarioStep::Deploy {
            proposals: Vec::new(),
        },
    ]);
    let messages = messages(&plan);
    assert!(messages.contains(&"$.steps[0]: first step must deploy the contract".to_string()));
    assert!(messages
        .contains(&"$.steps[0]: step `vote` runs before the contract is deployed".to_string()));
    assert!(messages.contains(&"$.steps[2]: contract is deployed more than once".to_string()));
    assert!(messages.contains(&"$.steps[2]: duplicate step `deploy`".to_string()));
    assert!(messages.contains(&"$.steps[2].proposals: at least one proposal is required".to_string()));
}

#[test]
fn rejects_self_delegation() {
    let plan = ScenarioPlan::new(vec![
        ScenarioStep::Deploy {
            proposals: proposals(),
        },
        ScenarioStep::Delegate {
            from: AccountRole::Voter,
            to: AccountRole::Voter,
        },
    ]);
    assert_eq!(
        messages(&plan),
        vec!["$.steps[1].to: voter cannot delegate to itself"]
    );
}

#[test]
fn plan_serializes_with_step_kinds() {
    let plan = ScenarioPlan::new(vec![ScenarioStep::QueryWinner {
        from: AccountRole::Owner,
    }]);
    let json = serde_json::to_value(&plan).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({"steps": [{"kind": "query_winner", "from": "owner"}]})
    );
}
